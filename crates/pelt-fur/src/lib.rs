//! Shell fur: builds layered copies of a host mesh with per-shell material
//! parameters, keeps those parameters animated, and rebuilds the layers when
//! the viewer's distance tier changes.
//!
//! Everything runs against a host [`World`](bevy_ecs::world::World). The host
//! entity carries a [`FurSurface`], a `MeshFilter` and a `MeshRenderer`; the
//! builder reuses the host's renderer as shell 0 and spawns shells
//! `1..N` as children.

mod batching;
mod builder;
mod config;
mod error;
mod gpu;
mod lod;
mod params;
mod props;
mod surface;
mod systems;

pub use batching::{BatchReport, FurBatcher, apply_batching, fur_batching_system};
pub use builder::{build_shells, teardown_shells};
pub use config::{apply_reloaded_config, lod_settings_from_config};
pub use error::FurError;
pub use gpu::{ShellGpuData, collect_shell_uniforms};
pub use lod::{FurLod, apply_physics_flag, fur_lod_system, update_lod};
pub use params::{fur_parameter_system, update_parameters, wind_vector};
pub use pelt_config::ShellAllocation;
pub use props::{
    BASE_RENDER_PRIORITY, FUR_LENGTH, FUR_SHADER, GRAVITY, MAX_SHELL_COUNT, MIN_LOD_SHELL_COUNT,
    MIN_SHELL_COUNT, SHELL_COUNT, SHELL_INDEX, USE_PHYSICS, WIND_DIRECTION, default_fur_material,
    shell_name,
};
pub use surface::{
    BuildReason, FurSurface, ShellDescriptor, ShellMarker, ShellSet, WindSettings, destroy_surface,
    disable_surface, enable_surface, rebuild_now, try_build, validate_surface,
};
pub use systems::add_fur_systems;
