//! Queries over the `bevy_hierarchy` parent/child tree.
//!
//! Attaching and recursive despawn come straight from `bevy_hierarchy`
//! (`BuildChildren::set_parent`, `DespawnRecursiveExt::despawn_recursive`);
//! this module only adds the world-level walks the fur systems need.

use bevy_ecs::prelude::*;
use bevy_hierarchy::{Children, Parent};
use glam::Vec3;

use crate::components::{Active, Transform};

/// All descendants of `root`, depth-first, excluding `root` itself.
pub fn descendants(world: &World, root: Entity) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack: Vec<Entity> = world
        .get::<Children>(root)
        .map(|c| c.iter().rev().copied().collect())
        .unwrap_or_default();

    while let Some(entity) = stack.pop() {
        out.push(entity);
        if let Some(children) = world.get::<Children>(entity) {
            stack.extend(children.iter().rev().copied());
        }
    }
    out
}

/// World-space position of `entity`, composing every ancestor's transform.
///
/// Entities without a [`Transform`] contribute an identity transform.
/// Returns `None` if the entity does not exist.
pub fn global_translation(world: &World, entity: Entity) -> Option<Vec3> {
    world.get_entity(entity).ok()?;

    let mut point = Vec3::ZERO;
    let mut current = Some(entity);
    while let Some(e) = current {
        if let Some(transform) = world.get::<Transform>(e) {
            point = transform.transform_point(point);
        }
        current = world.get::<Parent>(e).map(Parent::get);
    }
    Some(point)
}

/// Returns `true` if the entity and all of its ancestors are active.
/// Entities without an [`Active`] component count as active.
pub fn is_active_in_hierarchy(world: &World, entity: Entity) -> bool {
    if world.get_entity(entity).is_err() {
        return false;
    }
    let mut current = Some(entity);
    while let Some(e) = current {
        if world.get::<Active>(e).is_some_and(|a| !a.0) {
            return false;
        }
        current = world.get::<Parent>(e).map(Parent::get);
    }
    true
}
