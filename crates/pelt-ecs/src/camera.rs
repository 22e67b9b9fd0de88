//! Main camera tracking.

use bevy_ecs::prelude::*;

/// Marker for camera entities.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct MainCamera;

/// Tracks the active camera entity. `None` until a camera is registered,
/// which leaves distance-driven systems inert.
#[derive(Resource, Debug, Clone, Default)]
pub struct CameraRes {
    /// The entity that represents the active camera.
    pub entity: Option<Entity>,
}

impl CameraRes {
    /// Resolve the active camera, falling back to the first entity tagged
    /// [`MainCamera`] when none is registered or the registered one is gone.
    pub fn resolve(world: &mut World) -> Option<Entity> {
        let registered = world.get_resource::<CameraRes>().and_then(|c| c.entity);
        if let Some(entity) = registered
            && world.get_entity(entity).is_ok()
        {
            return Some(entity);
        }

        let mut query = world.query_filtered::<Entity, With<MainCamera>>();
        let found = query.iter(world).next();
        if let (Some(entity), Some(mut camera)) = (found, world.get_resource_mut::<CameraRes>()) {
            camera.entity = Some(entity);
        }
        found
    }
}
