//! Conversions from config sections into fur and LOD settings.

use bevy_ecs::prelude::*;
use glam::Vec3;
use pelt_config::{Config, LodConfig, WindConfig};
use pelt_lod::{LodError, LodSettings, TierShellCounts, TierThresholds};
use pelt_materials::MaterialHandle;
use tracing::debug;

use crate::lod::FurLod;
use crate::surface::{FurSurface, WindSettings, validate_surface};

impl From<&WindConfig> for WindSettings {
    fn from(config: &WindConfig) -> Self {
        Self {
            enabled: config.enabled,
            direction: Vec3::from_array(config.direction),
            strength: config.strength,
            frequency: config.frequency,
        }
    }
}

impl FurSurface {
    /// Surface drawing with `material`, settings taken from the `fur` and
    /// `wind` sections.
    pub fn from_config(config: &Config, material: MaterialHandle) -> Self {
        let mut surface = Self::new(material);
        surface.shell_count = config.fur.shell_count;
        surface.fur_length = config.fur.fur_length;
        surface.gravity = config.fur.gravity;
        surface.allocation = config.fur.allocation;
        surface.wind = WindSettings::from(&config.wind);
        surface
    }
}

/// LOD settings from the `lod` section.
///
/// # Errors
///
/// Returns [`LodError`] when the thresholds are not positive and ascending.
pub fn lod_settings_from_config(config: &LodConfig) -> Result<LodSettings, LodError> {
    Ok(LodSettings {
        thresholds: TierThresholds::new(config.near_dist, config.mid_dist, config.far_dist)?,
        counts: TierShellCounts {
            near: config.near_shells,
            mid: config.mid_shells,
            far: config.far_shells,
            very_far: config.very_far_shells,
        },
        disable_physics_beyond_mid: config.disable_physics_beyond_mid,
        hysteresis: config.hysteresis,
    })
}

/// Push a hot-reloaded config into a live host.
///
/// Fur length, gravity and wind are picked up by the next parameter tick.
/// With LOD enabled the controller is replaced (keeping its explicit target),
/// so the next LOD tick rebuilds with the new allocation and tier counts.
/// Without LOD a changed shell count or allocation rebuilds right away.
///
/// # Errors
///
/// Returns [`LodError`] for an invalid `lod` section; the host is left
/// untouched in that case.
pub fn apply_reloaded_config(
    world: &mut World,
    host: Entity,
    config: &Config,
) -> Result<(), LodError> {
    let lod = if config.lod.enabled {
        Some(FurLod::new(lod_settings_from_config(&config.lod)?)?)
    } else {
        None
    };
    let Some(mut surface) = world.get_mut::<FurSurface>(host) else {
        return Ok(());
    };
    surface.fur_length = config.fur.fur_length;
    surface.gravity = config.fur.gravity;
    surface.wind = WindSettings::from(&config.wind);
    let reshaped =
        surface.shell_count != config.fur.shell_count || surface.allocation != config.fur.allocation;
    surface.allocation = config.fur.allocation;

    match lod {
        Some(mut lod) => {
            lod.target = world.get::<FurLod>(host).and_then(|old| old.target);
            world.entity_mut(host).insert(lod);
        }
        None => {
            if let Some(mut surface) = world.get_mut::<FurSurface>(host) {
                surface.shell_count = config.fur.shell_count;
            }
            world.entity_mut(host).remove::<FurLod>();
            if reshaped && let Err(err) = validate_surface(world, host) {
                debug!(?host, %err, "rebuild after config reload deferred");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pelt_config::ShellAllocation;
    use pelt_ecs::{MainCamera, MeshFilter, MeshId, MeshRenderer, Transform, create_world};
    use pelt_materials::{Material, MaterialStore};

    use super::*;
    use crate::lod::update_lod;
    use crate::props::default_fur_material;
    use crate::surface::ShellSet;

    fn live_host(world: &mut World, config: &Config) -> Entity {
        let base = world
            .resource_mut::<MaterialStore>()
            .insert(default_fur_material("fur"));
        let host = world
            .spawn((
                FurSurface::from_config(config, base),
                MeshFilter::new(MeshId(1)),
                MeshRenderer::new(base),
                Transform::IDENTITY,
            ))
            .id();
        validate_surface(world, host).unwrap();
        host
    }

    #[test]
    fn test_reload_updates_parameters_and_reshapes_without_lod() {
        let mut world = create_world();
        let mut config = Config::default();
        config.lod.enabled = false;
        let host = live_host(&mut world, &config);

        config.fur.fur_length = 0.9;
        config.fur.shell_count = 6;
        config.wind.enabled = false;
        apply_reloaded_config(&mut world, host, &config).unwrap();

        let surface = world.get::<FurSurface>(host).unwrap();
        assert_eq!(surface.fur_length, 0.9);
        assert!(!surface.wind.enabled);
        assert_eq!(world.get::<ShellSet>(host).unwrap().len(), 6);
        assert!(world.get::<FurLod>(host).is_none());
    }

    #[test]
    fn test_reload_replaces_lod_controller() {
        let mut world = create_world();
        let config = Config::default();
        let host = live_host(&mut world, &config);
        world
            .entity_mut(host)
            .insert(FurLod::new(lod_settings_from_config(&config.lod).unwrap()).unwrap());
        world.spawn((MainCamera, Transform::from_translation(Vec3::new(5.0, 0.0, 0.0))));
        update_lod(&mut world, host).unwrap();
        assert_eq!(world.get::<ShellSet>(host).unwrap().len(), 40);

        let mut reloaded = config.clone();
        reloaded.lod.near_shells = 24;
        apply_reloaded_config(&mut world, host, &reloaded).unwrap();
        assert_eq!(
            world.get::<FurLod>(host).unwrap().controller().applied_shell_count(),
            None
        );
        update_lod(&mut world, host).unwrap();
        assert_eq!(world.get::<ShellSet>(host).unwrap().len(), 24);
    }

    #[test]
    fn test_invalid_reload_leaves_host_untouched() {
        let mut world = create_world();
        let config = Config::default();
        let host = live_host(&mut world, &config);

        let mut reloaded = config.clone();
        reloaded.fur.fur_length = 0.8;
        reloaded.lod.mid_dist = 1.0;
        assert!(apply_reloaded_config(&mut world, host, &reloaded).is_err());
        assert_eq!(world.get::<FurSurface>(host).unwrap().fur_length, config.fur.fur_length);
    }

    #[test]
    fn test_default_config_matches_default_settings() {
        let settings = lod_settings_from_config(&LodConfig::default()).unwrap();
        assert_eq!(settings, LodSettings::default());

        let wind = WindSettings::from(&WindConfig::default());
        assert_eq!(wind, WindSettings::default());
    }

    #[test]
    fn test_surface_from_config() {
        let mut store = MaterialStore::new();
        let handle = store.insert(Material::new("fur", "Pelt/FurShell"));
        let mut config = Config::default();
        config.fur.shell_count = 12;
        config.fur.allocation = ShellAllocation::SharedWithOverrides;
        config.wind.enabled = false;

        let surface = FurSurface::from_config(&config, handle);
        assert_eq!(surface.shell_count, 12);
        assert_eq!(surface.fur_material, Some(handle));
        assert_eq!(surface.allocation, ShellAllocation::SharedWithOverrides);
        assert!(!surface.wind.enabled);
    }

    #[test]
    fn test_bad_thresholds_rejected() {
        let config = LodConfig {
            mid_dist: 4.0,
            ..LodConfig::default()
        };
        assert!(matches!(
            lod_settings_from_config(&config),
            Err(LodError::NotAscending { .. })
        ));
    }
}
