//! One-shot batching pass over built shells.
//!
//! Two independent toggles: enable hardware instancing on every material the
//! host and its descendants draw with (and on the surface's base material),
//! and collapse the shells onto the base
//! material with per-renderer index/count overrides. The collapse only makes
//! sense when the surface already allocates shells that way.

use std::collections::HashSet;

use bevy_ecs::prelude::*;
use pelt_config::{BatchingConfig, ShellAllocation};
use pelt_ecs::{MeshRenderer, descendants};
use pelt_materials::MaterialStore;
use tracing::{info, warn};

use crate::error::FurError;
use crate::props::{SHELL_COUNT, SHELL_INDEX};
use crate::surface::{FurSurface, ShellSet};

/// Batching settings plus whether the pass has already run.
#[derive(Resource, Clone, Debug, Default)]
pub struct FurBatcher {
    /// Set the instancing flag on every discovered material.
    pub enable_instancing: bool,
    /// Point every shell at the base material with override blocks.
    pub convert_to_shared_material: bool,
    applied: bool,
}

impl FurBatcher {
    /// Batcher that has not run yet.
    pub fn new(enable_instancing: bool, convert_to_shared_material: bool) -> Self {
        Self {
            enable_instancing,
            convert_to_shared_material,
            applied: false,
        }
    }

    /// Batcher configured from the `batching` config section.
    pub fn from_config(config: &BatchingConfig) -> Self {
        Self::new(config.enable_instancing, config.convert_to_shared_material)
    }

    /// Returns `true` once the pass has run.
    pub fn is_applied(&self) -> bool {
        self.applied
    }
}

/// What a batching pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Distinct materials that now have instancing enabled.
    pub instanced_materials: usize,
    /// Shells pointed at the base material.
    pub converted_shells: usize,
}

/// Apply `batcher`'s settings to `host` and its descendants.
///
/// # Errors
///
/// - [`FurError::SharedMaterialConflict`] when conversion is requested but
///   the surface uses per-shell allocation. Instancing is still applied.
/// - [`FurError::MissingHost`] when conversion is requested and the host has
///   no surface or built shells.
pub fn apply_batching(
    world: &mut World,
    host: Entity,
    batcher: &FurBatcher,
) -> Result<BatchReport, FurError> {
    let mut report = BatchReport::default();

    if batcher.enable_instancing {
        let mut entities = descendants(world, host);
        entities.push(host);
        // The base is flagged too so copies made by later rebuilds inherit it.
        let handles: HashSet<_> = entities
            .iter()
            .filter_map(|&e| world.get::<MeshRenderer>(e).and_then(|r| r.material))
            .chain(
                world
                    .get::<FurSurface>(host)
                    .and_then(|surface| surface.fur_material),
            )
            .collect();
        if let Some(mut store) = world.get_resource_mut::<MaterialStore>() {
            for handle in handles {
                if let Some(material) = store.get_mut(handle) {
                    material.enable_instancing = true;
                    report.instanced_materials += 1;
                }
            }
        }
    }

    if !batcher.convert_to_shared_material {
        return Ok(report);
    }

    let allocation = world
        .get::<FurSurface>(host)
        .map(|surface| surface.allocation)
        .ok_or(FurError::MissingHost(host))?;
    if allocation == ShellAllocation::PerShell {
        return Err(FurError::SharedMaterialConflict(host));
    }
    let set = world
        .get::<ShellSet>(host)
        .cloned()
        .ok_or(FurError::MissingHost(host))?;

    let count = set.len() as f32;
    for shell in set.shells() {
        if let Some(mut renderer) = world.get_mut::<MeshRenderer>(shell.entity) {
            let mut block = renderer.property_block();
            block.set_float(SHELL_INDEX, shell.index as f32);
            block.set_float(SHELL_COUNT, count);
            renderer.material = Some(set.base_material());
            renderer.set_property_block(block);
            report.converted_shells += 1;
        }
    }
    Ok(report)
}

/// Exclusive system: run the batching pass once, as soon as shells exist.
pub fn fur_batching_system(world: &mut World) {
    let Some(batcher) = world.get_resource::<FurBatcher>().cloned() else {
        return;
    };
    if batcher.applied {
        return;
    }
    let hosts: Vec<Entity> = world
        .query_filtered::<Entity, With<ShellSet>>()
        .iter(world)
        .collect();
    if hosts.is_empty() {
        return;
    }

    for host in hosts {
        match apply_batching(world, host, &batcher) {
            Ok(report) => info!(
                ?host,
                instanced = report.instanced_materials,
                converted = report.converted_shells,
                "fur batching applied"
            ),
            Err(err) => warn!(?host, %err, "fur batching incomplete"),
        }
    }
    if let Some(mut batcher) = world.get_resource_mut::<FurBatcher>() {
        batcher.applied = true;
    }
}
