//! Per-tick parameter push: fur length, gravity and wind into every shell.

use bevy_ecs::prelude::*;
use glam::Vec3;
use pelt_config::ShellAllocation;
use pelt_ecs::{MeshRenderer, TimeRes, is_active_in_hierarchy};
use pelt_materials::MaterialStore;
use tracing::trace;

use crate::props::{FUR_LENGTH, GRAVITY, WIND_DIRECTION};
use crate::surface::{FurSurface, ShellSet, WindSettings};

/// Wind displacement at `elapsed` seconds:
/// `normalize(direction) * strength * (sin(elapsed * frequency) * 0.5 + 0.5)`.
///
/// A zero direction yields no wind.
pub fn wind_vector(wind: &WindSettings, elapsed: f64) -> Vec3 {
    let pulse = ((elapsed * f64::from(wind.frequency)).sin() * 0.5 + 0.5) as f32;
    wind.direction.normalize_or_zero() * wind.strength * pulse
}

/// Push the surface's current parameters into every shell of `host`.
/// Returns the number of shells written.
///
/// Per-shell materials are written directly; with shared allocation the
/// values go to each renderer's override block and the shared material is
/// left alone. Shells whose material or renderer has gone away are skipped.
pub fn update_parameters(world: &mut World, host: Entity, elapsed: f64) -> usize {
    let Some(surface) = world.get::<FurSurface>(host) else {
        return 0;
    };
    let fur_length = surface.fur_length.clamp(0.0, 1.0);
    let gravity = surface.gravity.clamp(0.0, 1.0);
    let wind = surface
        .wind
        .enabled
        .then(|| wind_vector(&surface.wind, elapsed).extend(0.0));
    let Some(set) = world.get::<ShellSet>(host).cloned() else {
        return 0;
    };

    let mut written = 0;
    match set.allocation() {
        ShellAllocation::PerShell => {
            let Some(mut store) = world.get_resource_mut::<MaterialStore>() else {
                return 0;
            };
            for shell in set.shells() {
                let Some(material) = store.get_mut(shell.material) else {
                    trace!(?host, index = shell.index, handle = %shell.material, "stale shell material skipped");
                    continue;
                };
                material.set_float(FUR_LENGTH, fur_length);
                material.set_float(GRAVITY, gravity);
                if let Some(wind) = wind {
                    material.set_vector(WIND_DIRECTION, wind);
                }
                written += 1;
            }
        }
        ShellAllocation::SharedWithOverrides => {
            for shell in set.shells() {
                let Some(mut renderer) = world.get_mut::<MeshRenderer>(shell.entity) else {
                    continue;
                };
                let mut block = renderer.property_block();
                block.set_float(FUR_LENGTH, fur_length);
                block.set_float(GRAVITY, gravity);
                if let Some(wind) = wind {
                    block.set_vector(WIND_DIRECTION, wind);
                }
                renderer.set_property_block(block);
                written += 1;
            }
        }
    }
    written
}

/// Exclusive system: update every active host with built shells.
pub fn fur_parameter_system(world: &mut World) {
    let elapsed = world
        .get_resource::<TimeRes>()
        .map_or(0.0, |time| time.elapsed);
    let hosts: Vec<Entity> = world
        .query_filtered::<Entity, (With<FurSurface>, With<ShellSet>)>()
        .iter(world)
        .collect();

    for host in hosts {
        if is_active_in_hierarchy(world, host) {
            update_parameters(world, host, elapsed);
        }
    }
}
