//! Shader property names and shell constants.

use glam::Vec4;
use pelt_materials::{Material, TRANSPARENT_QUEUE};

/// Index of the shell a material draws, `0..count`.
pub const SHELL_INDEX: &str = "_ShellIndex";
/// Total shells in the set.
pub const SHELL_COUNT: &str = "_ShellCount";
/// Fur length in `[0, 1]`.
pub const FUR_LENGTH: &str = "_FurLength";
/// Gravity droop in `[0, 1]`.
pub const GRAVITY: &str = "_Gravity";
/// Wind displacement vector (xyz, w unused).
pub const WIND_DIRECTION: &str = "_WindDirection";
/// 1 when fur physics is on, 0 when off.
pub const USE_PHYSICS: &str = "_UsePhysics";

/// Shader the default fur material binds.
pub const FUR_SHADER: &str = "Pelt/FurShell";

/// Render priority of shell 0; shell `i` draws at `BASE_RENDER_PRIORITY + i`.
pub const BASE_RENDER_PRIORITY: i32 = TRANSPARENT_QUEUE;

/// Smallest shell count accepted on validation.
pub const MIN_SHELL_COUNT: u32 = 4;
/// Smallest shell count the LOD controller may request.
pub const MIN_LOD_SHELL_COUNT: u32 = 1;
/// Largest shell count.
pub const MAX_SHELL_COUNT: u32 = 64;

/// Entity name for shell `index`.
pub fn shell_name(index: u32) -> String {
    format!("FurShell_{index}")
}

/// Base fur material declaring every property the shells use.
pub fn default_fur_material(name: &str) -> Material {
    let mut material = Material::new(name, FUR_SHADER)
        .with_float(SHELL_INDEX, 0.0)
        .with_float(SHELL_COUNT, 1.0)
        .with_float(FUR_LENGTH, 0.3)
        .with_float(GRAVITY, 0.2)
        .with_float(USE_PHYSICS, 1.0)
        .with_vector(WIND_DIRECTION, Vec4::ZERO);
    material.render_queue = BASE_RENDER_PRIORITY;
    material
}
