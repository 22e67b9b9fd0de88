//! World setup for hosting fur surfaces.

use bevy_ecs::prelude::*;
use pelt_materials::MaterialStore;

use crate::{CameraRes, TimeRes};

/// Insert the resources every fur system reads: frame time, the main camera
/// slot and the material store. Resources already present are kept.
pub fn register_core_resources(world: &mut World) {
    world.init_resource::<TimeRes>();
    world.init_resource::<CameraRes>();
    world.init_resource::<MaterialStore>();
}

/// Fresh world with the core resources registered.
pub fn create_world() -> World {
    let mut world = World::new();
    register_core_resources(&mut world);
    world
}
