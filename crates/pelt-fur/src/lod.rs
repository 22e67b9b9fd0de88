//! Distance-driven shell count.
//!
//! Each tick the LOD system measures the viewer's distance to every furry
//! host and, when the tier's shell count differs from the applied one,
//! rebuilds the shells and rewrites the physics flag. A failed rebuild is not
//! confirmed, so it is retried on the next tick.

use bevy_ecs::prelude::*;
use pelt_config::ShellAllocation;
use pelt_ecs::{CameraRes, MeshRenderer, global_translation, is_active_in_hierarchy};
use pelt_lod::{LodController, LodError, LodSettings, LodTransition, viewer_distance};
use pelt_materials::MaterialStore;
use tracing::trace;

use crate::error::FurError;
use crate::props::USE_PHYSICS;
use crate::surface::{BuildReason, FurSurface, ShellSet, try_build};

/// LOD state for one host.
#[derive(Component, Clone, Debug)]
pub struct FurLod {
    controller: LodController,
    /// Explicit viewpoint. `None` falls back to the main camera.
    pub target: Option<Entity>,
}

impl FurLod {
    /// LOD following the main camera.
    ///
    /// # Errors
    ///
    /// Returns [`LodError`] if the settings are inconsistent.
    pub fn new(settings: LodSettings) -> Result<Self, LodError> {
        Ok(Self {
            controller: LodController::new(settings)?,
            target: None,
        })
    }

    /// Measure distance from `target` instead of the main camera.
    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    /// The tier state machine.
    pub fn controller(&self) -> &LodController {
        &self.controller
    }
}

fn reference_point(world: &mut World, host: Entity) -> Option<Entity> {
    let explicit = world
        .get::<FurLod>(host)
        .and_then(|lod| lod.target)
        .filter(|&target| world.get_entity(target).is_ok());
    explicit.or_else(|| CameraRes::resolve(world))
}

/// Run one LOD evaluation for `host`. Returns the applied transition, or
/// `None` when the shell count is already right.
///
/// # Errors
///
/// - [`FurError::MissingReferenceTarget`] when there is no viewpoint; the
///   controller stays inert.
/// - [`FurError::MissingHost`] when the host lacks [`FurLod`] or a position.
/// - Any rebuild error from [`try_build`]; the transition is retried next tick.
pub fn update_lod(world: &mut World, host: Entity) -> Result<Option<LodTransition>, FurError> {
    if world.get::<FurLod>(host).is_none() {
        return Err(FurError::MissingHost(host));
    }
    let reference =
        reference_point(world, host).ok_or(FurError::MissingReferenceTarget(host))?;
    let viewer = global_translation(world, reference)
        .ok_or(FurError::MissingReferenceTarget(host))?;
    let position = global_translation(world, host).ok_or(FurError::MissingHost(host))?;
    let distance = viewer_distance(viewer, position);

    let transition = world
        .get_mut::<FurLod>(host)
        .and_then(|mut lod| lod.controller.evaluate(distance));
    let Some(transition) = transition else {
        return Ok(None);
    };

    let previous = {
        let mut surface = world
            .get_mut::<FurSurface>(host)
            .ok_or(FurError::MissingHost(host))?;
        std::mem::replace(&mut surface.shell_count, transition.shell_count)
    };
    if let Err(err) = try_build(world, host, BuildReason::Lod) {
        if let Some(mut surface) = world.get_mut::<FurSurface>(host) {
            surface.shell_count = previous;
        }
        return Err(err);
    }

    if let Some(mut lod) = world.get_mut::<FurLod>(host) {
        lod.controller.confirm(&transition);
    }
    apply_physics_flag(world, host, transition.physics_enabled);
    Ok(Some(transition))
}

/// Write `_UsePhysics` (1 or 0) to every shell whose material declares it.
/// Returns the number of shells written.
pub fn apply_physics_flag(world: &mut World, host: Entity, enabled: bool) -> usize {
    let Some(set) = world.get::<ShellSet>(host).cloned() else {
        return 0;
    };
    let value = if enabled { 1.0 } else { 0.0 };
    let mut written = 0;

    match set.allocation() {
        ShellAllocation::PerShell => {
            let Some(mut store) = world.get_resource_mut::<MaterialStore>() else {
                return 0;
            };
            for shell in set.shells() {
                if let Some(material) = store.get_mut(shell.material)
                    && material.has_float(USE_PHYSICS)
                {
                    material.set_float(USE_PHYSICS, value);
                    written += 1;
                }
            }
        }
        ShellAllocation::SharedWithOverrides => {
            let declared = world
                .get_resource::<MaterialStore>()
                .and_then(|store| store.get(set.base_material()))
                .is_some_and(|material| material.has_float(USE_PHYSICS));
            if !declared {
                return 0;
            }
            for shell in set.shells() {
                if let Some(mut renderer) = world.get_mut::<MeshRenderer>(shell.entity) {
                    let mut block = renderer.property_block();
                    block.set_float(USE_PHYSICS, value);
                    renderer.set_property_block(block);
                    written += 1;
                }
            }
        }
    }
    written
}

/// Exclusive system: evaluate LOD for every active host.
pub fn fur_lod_system(world: &mut World) {
    let hosts: Vec<Entity> = world
        .query_filtered::<Entity, (With<FurLod>, With<FurSurface>)>()
        .iter(world)
        .collect();

    for host in hosts {
        if !is_active_in_hierarchy(world, host) {
            continue;
        }
        if let Err(err) = update_lod(world, host) {
            trace!(?host, %err, "LOD evaluation skipped");
        }
    }
}
