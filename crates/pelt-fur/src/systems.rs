use bevy_ecs::schedule::IntoSystemConfigs;
use pelt_ecs::{EngineSchedule, EngineSchedules};

use crate::batching::fur_batching_system;
use crate::lod::fur_lod_system;
use crate::params::fur_parameter_system;

/// Register the fur systems: parameters then LOD in `Update`, the one-shot
/// batching pass in `PostUpdate`.
pub fn add_fur_systems(schedules: &mut EngineSchedules) {
    schedules.add_system(
        EngineSchedule::Update,
        (fur_parameter_system, fur_lod_system).chain(),
    );
    schedules.add_system(EngineSchedule::PostUpdate, fur_batching_system);
}
