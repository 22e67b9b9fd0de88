//! Time resource for the ECS world.

use bevy_ecs::prelude::*;

/// Global time resource advanced once per frame by
/// [`EngineSchedules::run`](crate::EngineSchedules::run).
#[derive(Resource, Debug, Clone, Default)]
pub struct TimeRes {
    /// Seconds elapsed since the previous frame.
    pub delta: f32,
    /// Seconds elapsed since the first frame.
    pub elapsed: f64,
    /// Number of frames run so far.
    pub tick: u64,
}

impl TimeRes {
    /// Advance by one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.delta = dt as f32;
        self.elapsed += dt;
        self.tick += 1;
    }
}
