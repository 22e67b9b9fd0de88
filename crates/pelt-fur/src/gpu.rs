//! Packed per-shell uniforms for upload.

use bevy_ecs::prelude::*;
use bytemuck::{Pod, Zeroable};
use pelt_ecs::MeshRenderer;
use pelt_materials::{Material, MaterialStore, PropertyBlock, resolve_float, resolve_vector};

use crate::props::{FUR_LENGTH, GRAVITY, SHELL_COUNT, SHELL_INDEX, USE_PHYSICS, WIND_DIRECTION};
use crate::surface::ShellSet;

/// Fur uniforms for one shell, laid out for a uniform or storage buffer.
///
/// 48 bytes, 16-byte aligned rows.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ShellGpuData {
    /// `_ShellIndex`.
    pub shell_index: f32,
    /// `_ShellCount`.
    pub shell_count: f32,
    /// `_FurLength`.
    pub fur_length: f32,
    /// `_Gravity`.
    pub gravity: f32,
    /// `_WindDirection`.
    pub wind: [f32; 4],
    /// `_UsePhysics`; 1 when the property is undeclared.
    pub use_physics: f32,
    pub _padding: [f32; 3],
}

static_assertions::assert_eq_size!(ShellGpuData, [u8; 48]);

impl ShellGpuData {
    /// Values a renderer draws with: block overrides first, then the material.
    pub fn resolve(material: &Material, block: Option<&PropertyBlock>) -> Self {
        let float = |name| resolve_float(material, block, name).unwrap_or(0.0);
        Self {
            shell_index: float(SHELL_INDEX),
            shell_count: float(SHELL_COUNT),
            fur_length: float(FUR_LENGTH),
            gravity: float(GRAVITY),
            wind: resolve_vector(material, block, WIND_DIRECTION)
                .unwrap_or_default()
                .to_array(),
            use_physics: resolve_float(material, block, USE_PHYSICS).unwrap_or(1.0),
            _padding: [0.0; 3],
        }
    }
}

/// Uniforms for every shell of `host`, in index order. Shells with a stale
/// material or no renderer are left out.
pub fn collect_shell_uniforms(world: &World, host: Entity) -> Vec<ShellGpuData> {
    let (Some(set), Some(store)) = (
        world.get::<ShellSet>(host),
        world.get_resource::<MaterialStore>(),
    ) else {
        return Vec::new();
    };

    set.shells()
        .iter()
        .filter_map(|shell| {
            let renderer = world.get::<MeshRenderer>(shell.entity)?;
            let material = store.get(shell.material)?;
            Some(ShellGpuData::resolve(
                material,
                renderer.property_block.as_ref(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pelt_config::ShellAllocation;
    use pelt_ecs::{MeshFilter, MeshId, create_world};

    use super::*;
    use crate::builder::build_shells;
    use crate::props::default_fur_material;
    use crate::surface::FurSurface;

    #[test]
    fn test_layout_is_48_bytes() {
        assert_eq!(std::mem::size_of::<ShellGpuData>(), 48);
        let data = [ShellGpuData::default(); 3];
        assert_eq!(bytemuck::cast_slice::<ShellGpuData, u8>(&data).len(), 144);
    }

    #[test]
    fn test_block_overrides_material_values() {
        let material = default_fur_material("fur");
        let mut block = PropertyBlock::new();
        block.set_float(SHELL_INDEX, 7.0);
        let data = ShellGpuData::resolve(&material, Some(&block));
        assert_eq!(data.shell_index, 7.0);
        assert_eq!(data.fur_length, 0.3);
        assert_eq!(data.use_physics, 1.0);
    }

    #[test]
    fn test_collects_one_entry_per_shell() {
        for allocation in [ShellAllocation::PerShell, ShellAllocation::SharedWithOverrides] {
            let mut world = create_world();
            let base = world
                .resource_mut::<MaterialStore>()
                .insert(default_fur_material("fur"));
            let mut surface = FurSurface::new(base);
            surface.shell_count = 6;
            surface.allocation = allocation;
            let host = world
                .spawn((surface, MeshFilter::new(MeshId(1)), MeshRenderer::new(base)))
                .id();
            build_shells(&mut world, host).unwrap();

            let uniforms = collect_shell_uniforms(&world, host);
            assert_eq!(uniforms.len(), 6);
            for (i, data) in uniforms.iter().enumerate() {
                assert_eq!(data.shell_index, i as f32);
                assert_eq!(data.shell_count, 6.0);
            }
        }
    }

    #[test]
    fn test_no_shells_yields_empty() {
        let mut world = create_world();
        let host = world.spawn_empty().id();
        assert!(collect_shell_uniforms(&world, host).is_empty());
    }
}
