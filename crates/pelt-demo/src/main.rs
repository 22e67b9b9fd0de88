//! Headless fur demo.
//!
//! Builds a world with a camera and one furry host, then runs a fixed number
//! of frames while the camera dollies out and back so the LOD controller walks
//! through every tier. Configuration is loaded from `config.ron` and can be
//! overridden via CLI flags:
//! `cargo run -p pelt-demo -- --frames 1200 --shared-material`.

use std::path::Path;

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec3;
use pelt_config::{CliArgs, Config, default_config_dir};
use pelt_ecs::{
    CameraRes, EngineSchedules, MainCamera, MeshFilter, MeshId, MeshRenderer, Name, Transform,
    create_world,
};
use pelt_fur::{
    FurBatcher, FurLod, FurSurface, ShellSet, add_fur_systems, apply_reloaded_config,
    collect_shell_uniforms, default_fur_material, lod_settings_from_config, validate_surface,
};
use pelt_materials::MaterialStore;
use pelt_profiler::{CpuFrameTimer, FrameProfiler};
use pelt_ui::{SelectionSpeedControl, UiSelection, register_ui_events};
use tracing::{info, warn};

const FRAME_DT: f64 = 1.0 / 60.0;
const CLOSEST_VIEW: f32 = 2.0;
const FARTHEST_VIEW: f32 = 60.0;
const OVERLAY_EVERY: u32 = 120;
const RELOAD_EVERY: u32 = 60;

/// Camera distance at `progress` in `[0, 1]`: out to the far end at the
/// midpoint, back again at the end.
fn dolly_distance(progress: f32) -> f32 {
    let there_and_back = 1.0 - (2.0 * progress - 1.0).abs();
    CLOSEST_VIEW + (FARTHEST_VIEW - CLOSEST_VIEW) * there_and_back
}

struct Scene {
    host: Entity,
    camera: Entity,
    control: SelectionSpeedControl,
}

fn spawn_scene(world: &mut World, config: &Config) -> Scene {
    let material = default_fur_material("fur").with_float(&config.ui.speed_property_name, 0.0);
    let base = world.resource_mut::<MaterialStore>().insert(material);

    let camera = world
        .spawn((
            Name::new("Main Camera"),
            MainCamera,
            Transform::from_translation(Vec3::new(0.0, 0.0, CLOSEST_VIEW)),
        ))
        .id();
    world.resource_mut::<CameraRes>().entity = Some(camera);

    let host = world
        .spawn((
            Name::new("Furry Sphere"),
            Transform::IDENTITY,
            MeshFilter::new(MeshId(1)),
            MeshRenderer::new(base),
            FurSurface::from_config(config, base),
        ))
        .id();

    if config.lod.enabled {
        match lod_settings_from_config(&config.lod).and_then(FurLod::new) {
            Ok(lod) => {
                world.entity_mut(host).insert(lod);
            }
            Err(e) => warn!("LOD disabled: {e}"),
        }
    }

    let owner = world.spawn(Name::new("Speed Control")).id();
    let mut control = SelectionSpeedControl::from_config(owner, &config.ui);
    control.targets.push(host);

    Scene {
        host,
        camera,
        control,
    }
}

/// Pick up edits to `config.ron` while the demo runs. Invalid edits are
/// logged and the running config is kept.
fn hot_reload(world: &mut World, host: Entity, config_dir: &Path, config: &mut Config) {
    let reloaded = match config.reload(config_dir) {
        Ok(Some(reloaded)) => reloaded,
        Ok(None) => return,
        Err(e) => {
            warn!("Config reload failed: {e}");
            return;
        }
    };
    if let Err(e) = reloaded.validate() {
        warn!("Reloaded config rejected: {e}");
        return;
    }
    match apply_reloaded_config(world, host, &reloaded) {
        Ok(()) => {
            info!("Applied reloaded config");
            *config = reloaded;
        }
        Err(e) => warn!("Reloaded LOD settings rejected: {e}"),
    }
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    pelt_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let mut world = create_world();
    register_ui_events(&mut world);
    world.insert_resource(FurBatcher::from_config(&config.batching));

    let Scene {
        host,
        camera,
        mut control,
    } = spawn_scene(&mut world, &config);

    match validate_surface(&mut world, host) {
        Ok(Some(shells)) => info!("Fur surface ready with {shells} shells"),
        Ok(None) => info!("Fur host inactive, shells deferred"),
        Err(e) => warn!("Fur surface not built: {e}"),
    }

    control.on_awake(&mut world);
    world.insert_resource(UiSelection {
        current: Some(control.control),
    });
    control.on_enable(&mut world);

    let mut schedules = EngineSchedules::new();
    add_fur_systems(&mut schedules);

    let frames = config.debug.demo_frames.max(1);
    let mut profiler = FrameProfiler::from_config(&config.profiler);
    let mut timer = CpuFrameTimer::new();
    let mut last_shells = 0;

    info!("Running {frames} frames");
    for frame in 0..frames {
        let distance = dolly_distance(frame as f32 / frames as f32);
        if let Some(mut transform) = world.get_mut::<Transform>(camera) {
            transform.translation = Vec3::new(0.0, 0.0, distance);
        }
        if frame == frames / 2 {
            control.deselect(&mut world);
        }

        timer.begin_frame();
        schedules.run(&mut world, FRAME_DT);
        timer.end_frame();
        profiler.update(&timer, None);

        let shells = world.get::<ShellSet>(host).map_or(0, ShellSet::len);
        if shells != last_shells {
            info!(frame, distance, shells, "Shell count changed");
            last_shells = shells;
        }
        if (frame + 1) % RELOAD_EVERY == 0 {
            hot_reload(&mut world, host, &config_dir, &mut config);
        }
        if config.profiler.show_overlay && (frame + 1) % OVERLAY_EVERY == 0 {
            info!("\n{}", profiler.overlay_text());
        }
    }

    let uniforms = collect_shell_uniforms(&world, host);
    info!(
        shells = uniforms.len(),
        bytes = bytemuck::cast_slice::<_, u8>(uniforms.as_slice()).len(),
        "Shell uniforms packed"
    );
    info!(
        "Final speed {:.2} (selected: {})",
        control.current_speed(),
        control.is_selected()
    );
    match profiler.to_json() {
        Ok(json) => info!("Profiler snapshot: {json}"),
        Err(e) => warn!("Profiler snapshot failed: {e}"),
    }
}
