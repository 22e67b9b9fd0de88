//! Engine stage labels and the ordered schedule runner.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};

use crate::time::TimeRes;

/// Labels for each engine execution stage.
///
/// Stages run in the order listed, top to bottom, every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineSchedule {
    /// Time advance, input, camera movement.
    PreUpdate,
    /// Per-entity logic: parameter pushes, LOD rebuilds.
    Update,
    /// One-shot and late work: batching, overlays.
    PostUpdate,
}

const STAGES: [EngineSchedule; 3] = [
    EngineSchedule::PreUpdate,
    EngineSchedule::Update,
    EngineSchedule::PostUpdate,
];

/// Ordered collection of [`Schedule`]s that drives one frame.
///
/// Every stage runs on the calling thread; a rebuild triggered inside a
/// stage completes before the next system starts.
pub struct EngineSchedules {
    schedules: Vec<(EngineSchedule, Schedule)>,
}

impl EngineSchedules {
    /// Create the stage set with single-threaded executors.
    pub fn new() -> Self {
        let schedules = STAGES
            .into_iter()
            .map(|label| {
                let mut schedule = Schedule::default();
                schedule.set_executor_kind(ExecutorKind::SingleThreaded);
                (label, schedule)
            })
            .collect();

        Self { schedules }
    }

    /// Add a system, or a tuple of systems, to `stage`.
    pub fn add_system<M>(&mut self, stage: EngineSchedule, system: impl IntoSystemConfigs<M>) {
        if let Some((_, schedule)) = self.schedules.iter_mut().find(|(label, _)| *label == stage) {
            schedule.add_systems(system);
        }
    }

    /// One frame: advance [`TimeRes`] by `frame_dt` seconds when the world has
    /// it, then run every stage.
    pub fn run(&mut self, world: &mut World, frame_dt: f64) {
        if let Some(mut time) = world.get_resource_mut::<TimeRes>() {
            time.advance(frame_dt);
        }

        for (_label, schedule) in &mut self.schedules {
            schedule.run(world);
        }
    }
}

impl Default for EngineSchedules {
    fn default() -> Self {
        Self::new()
    }
}
