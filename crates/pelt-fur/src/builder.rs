//! Shell construction and teardown.
//!
//! A build validates everything it needs before touching the old set, so a
//! failed build leaves the previous shells live. Shell 0 is the host's own
//! renderer; shells `1..N` are child entities sharing the host's mesh.

use bevy_ecs::prelude::*;
use pelt_config::ShellAllocation;
use pelt_ecs::{
    Active, BuildChildren, DespawnRecursiveExt, Layer, MeshFilter, MeshId, MeshRenderer, Name,
    Transform,
};
use pelt_materials::{MaterialHandle, MaterialStore, PropertyBlock};

use crate::error::FurError;
use crate::props::{
    BASE_RENDER_PRIORITY, FUR_LENGTH, GRAVITY, MAX_SHELL_COUNT, MIN_LOD_SHELL_COUNT, SHELL_COUNT,
    SHELL_INDEX, USE_PHYSICS, WIND_DIRECTION, shell_name,
};
use crate::surface::{FurSurface, ShellDescriptor, ShellMarker, ShellSet};

/// Properties the builder and updater stamp per shell; dropped from the
/// host's override block on teardown.
const SHELL_PROPERTIES: [&str; 6] = [
    SHELL_INDEX,
    SHELL_COUNT,
    FUR_LENGTH,
    GRAVITY,
    WIND_DIRECTION,
    USE_PHYSICS,
];

/// Inputs resolved and checked before the old set is torn down.
struct BuildPlan {
    base: MaterialHandle,
    mesh: MeshId,
    count: u32,
    fur_length: f32,
    gravity: f32,
    allocation: ShellAllocation,
    layer: Layer,
}

fn plan(world: &World, host: Entity) -> Result<BuildPlan, FurError> {
    let surface = world
        .get::<FurSurface>(host)
        .ok_or(FurError::MissingHost(host))?;
    let base = surface
        .fur_material
        .ok_or(FurError::MissingMaterial(host))?;
    let live = world
        .get_resource::<MaterialStore>()
        .is_some_and(|store| store.contains(base));
    if !live {
        return Err(FurError::StaleHandle(base));
    }
    let mesh = world
        .get::<MeshFilter>(host)
        .and_then(|filter| filter.mesh)
        .ok_or(FurError::MissingMesh(host))?;
    if world.get::<MeshRenderer>(host).is_none() {
        return Err(FurError::MissingHost(host));
    }

    Ok(BuildPlan {
        base,
        mesh,
        count: surface
            .shell_count
            .clamp(MIN_LOD_SHELL_COUNT, MAX_SHELL_COUNT),
        fur_length: surface.fur_length.clamp(0.0, 1.0),
        gravity: surface.gravity.clamp(0.0, 1.0),
        allocation: surface.allocation,
        layer: world.get::<Layer>(host).copied().unwrap_or_default(),
    })
}

fn stamp_block(block: &mut PropertyBlock, plan: &BuildPlan, index: u32) {
    block.set_float(SHELL_INDEX, index as f32);
    block.set_float(SHELL_COUNT, plan.count as f32);
    block.set_float(FUR_LENGTH, plan.fur_length);
    block.set_float(GRAVITY, plan.gravity);
}

/// Material and override block for shell `index`.
fn shell_material(
    world: &mut World,
    plan: &BuildPlan,
    index: u32,
    mut block: PropertyBlock,
) -> Result<(MaterialHandle, PropertyBlock), FurError> {
    match plan.allocation {
        ShellAllocation::PerShell => {
            let mut store = world
                .get_resource_mut::<MaterialStore>()
                .ok_or(FurError::StaleHandle(plan.base))?;
            let handle = store
                .instantiate(plan.base)
                .map_err(|_| FurError::StaleHandle(plan.base))?;
            if let Some(material) = store.get_mut(handle) {
                material.name = format!("{} (shell {index})", material.name);
                material.render_queue = BASE_RENDER_PRIORITY + index as i32;
                material.set_float(SHELL_INDEX, index as f32);
                material.set_float(SHELL_COUNT, plan.count as f32);
                material.set_float(FUR_LENGTH, plan.fur_length);
                material.set_float(GRAVITY, plan.gravity);
            }
            Ok((handle, block))
        }
        ShellAllocation::SharedWithOverrides => {
            stamp_block(&mut block, plan, index);
            Ok((plan.base, block))
        }
    }
}

fn build_from_plan(
    world: &mut World,
    host: Entity,
    plan: &BuildPlan,
    shells: &mut Vec<ShellDescriptor>,
) -> Result<(), FurError> {
    let host_block = world
        .get::<MeshRenderer>(host)
        .map(MeshRenderer::property_block)
        .unwrap_or_default();
    let (material, block) = shell_material(world, plan, 0, host_block)?;
    let mut renderer = world
        .get_mut::<MeshRenderer>(host)
        .ok_or(FurError::MissingHost(host))?;
    renderer.material = Some(material);
    renderer.priority = Some(BASE_RENDER_PRIORITY);
    renderer.set_property_block(block);
    shells.push(ShellDescriptor {
        index: 0,
        entity: host,
        material,
        render_priority: BASE_RENDER_PRIORITY,
    });

    for index in 1..plan.count {
        let (material, block) = shell_material(world, plan, index, PropertyBlock::new())?;
        let priority = BASE_RENDER_PRIORITY + index as i32;
        let mut renderer = MeshRenderer::new(material);
        renderer.priority = Some(priority);
        renderer.set_property_block(block);

        let entity = world
            .spawn((
                Name::new(shell_name(index)),
                Transform::IDENTITY,
                plan.layer,
                MeshFilter::new(plan.mesh),
                renderer,
                ShellMarker { index },
                Active(true),
            ))
            .set_parent(host)
            .id();
        shells.push(ShellDescriptor {
            index,
            entity,
            material,
            render_priority: priority,
        });
    }
    Ok(())
}

/// Tear down the host's current shells and build a fresh set from its
/// [`FurSurface`]. Returns the number of shells built.
///
/// The shell count is clamped to `[1, 64]`; callers wanting the general
/// `[4, 64]` range clamp before calling.
///
/// # Errors
///
/// - [`FurError::MissingHost`] if the host, its surface or its renderer is gone.
/// - [`FurError::MissingMaterial`] if no base material is assigned.
/// - [`FurError::StaleHandle`] if the base material was removed.
/// - [`FurError::MissingMesh`] if the host's filter has no mesh.
///
/// On error nothing is changed.
pub fn build_shells(world: &mut World, host: Entity) -> Result<usize, FurError> {
    let plan = plan(world, host)?;
    teardown_shells(world, host);

    let mut shells = Vec::with_capacity(plan.count as usize);
    if let Err(err) = build_from_plan(world, host, &plan, &mut shells) {
        let partial = ShellSet {
            shells,
            base_material: plan.base,
            allocation: plan.allocation,
        };
        release(world, host, partial);
        return Err(err);
    }

    let count = shells.len();
    world.entity_mut(host).insert(ShellSet {
        shells,
        base_material: plan.base,
        allocation: plan.allocation,
    });
    Ok(count)
}

/// Remove the host's shells: despawn the children, free per-shell material
/// copies and point the host renderer back at the base material. Returns the
/// number of shells removed; 0 if no set was built.
pub fn teardown_shells(world: &mut World, host: Entity) -> usize {
    let set = world
        .get_entity_mut(host)
        .ok()
        .and_then(|mut entity| entity.take::<ShellSet>());
    match set {
        Some(set) => release(world, host, set),
        None => 0,
    }
}

fn release(world: &mut World, host: Entity, set: ShellSet) -> usize {
    let removed = set.shells.len();
    for shell in set.shells.iter().filter(|s| s.entity != host) {
        if let Ok(entity) = world.get_entity_mut(shell.entity) {
            entity.despawn_recursive();
        }
    }

    if set.owns_materials()
        && let Some(mut store) = world.get_resource_mut::<MaterialStore>()
    {
        for shell in &set.shells {
            if shell.material != set.base_material {
                store.remove(shell.material);
            }
        }
    }

    if let Some(mut renderer) = world.get_mut::<MeshRenderer>(host) {
        let mut block = renderer.property_block();
        for name in SHELL_PROPERTIES {
            block.remove(name);
        }
        renderer.material = Some(set.base_material);
        renderer.priority = None;
        renderer.set_property_block(block);
    }
    removed
}

#[cfg(test)]
mod tests {
    use pelt_ecs::{Children, Parent, create_world};
    use pelt_materials::resolve_float;

    use super::*;
    use crate::props::default_fur_material;

    fn spawn_host(world: &mut World, count: u32, allocation: ShellAllocation) -> Entity {
        let base = world
            .resource_mut::<MaterialStore>()
            .insert(default_fur_material("fur"));
        let mut surface = FurSurface::new(base);
        surface.shell_count = count;
        surface.allocation = allocation;
        world
            .spawn((
                surface,
                MeshFilter::new(MeshId(9)),
                MeshRenderer::new(base),
                Layer(4),
            ))
            .id()
    }

    fn shell_float(world: &World, shell: &ShellDescriptor, name: &str) -> Option<f32> {
        let store = world.resource::<MaterialStore>();
        let renderer = world.get::<MeshRenderer>(shell.entity)?;
        resolve_float(
            store.get(shell.material)?,
            renderer.property_block.as_ref(),
            name,
        )
    }

    #[test]
    fn test_every_count_builds_exact_indices_and_ascending_priority() {
        let mut world = create_world();
        for count in 1..=64 {
            let host = spawn_host(&mut world, count, ShellAllocation::PerShell);
            assert_eq!(build_shells(&mut world, host), Ok(count as usize));

            let set = world.get::<ShellSet>(host).unwrap();
            assert_eq!(set.len(), count as usize);
            for (i, shell) in set.shells().iter().enumerate() {
                assert_eq!(shell.index, i as u32);
                assert_eq!(shell.render_priority, BASE_RENDER_PRIORITY + i as i32);
            }
            assert!(
                set.shells()
                    .windows(2)
                    .all(|w| w[0].render_priority < w[1].render_priority)
            );
        }
    }

    #[test]
    fn test_shell_zero_reuses_host_renderer() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 4, ShellAllocation::PerShell);
        build_shells(&mut world, host).unwrap();

        let set = world.get::<ShellSet>(host).unwrap().clone();
        assert_eq!(set.shells()[0].entity, host);
        let renderer = world.get::<MeshRenderer>(host).unwrap();
        assert_eq!(renderer.material, Some(set.shells()[0].material));
        assert_eq!(renderer.priority, Some(BASE_RENDER_PRIORITY));
        assert_eq!(world.get::<Children>(host).unwrap().len(), 3);
    }

    #[test]
    fn test_children_share_mesh_layer_and_parent() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 5, ShellAllocation::PerShell);
        build_shells(&mut world, host).unwrap();

        let set = world.get::<ShellSet>(host).unwrap().clone();
        for shell in &set.shells()[1..] {
            let e = shell.entity;
            assert_eq!(world.get::<Parent>(e).map(Parent::get), Some(host));
            assert_eq!(world.get::<MeshFilter>(e).unwrap().mesh, Some(MeshId(9)));
            assert_eq!(world.get::<Layer>(e), Some(&Layer(4)));
            assert_eq!(world.get::<Transform>(e), Some(&Transform::IDENTITY));
            assert_eq!(world.get::<Name>(e).unwrap().0, shell_name(shell.index));
            assert_eq!(world.get::<ShellMarker>(e).unwrap().index, shell.index);
        }
    }

    #[test]
    fn test_per_shell_materials_are_distinct_and_stamped() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 8, ShellAllocation::PerShell);
        build_shells(&mut world, host).unwrap();

        let set = world.get::<ShellSet>(host).unwrap().clone();
        let store = world.resource::<MaterialStore>();
        for shell in set.shells() {
            assert_ne!(shell.material, set.base_material());
            let mat = store.get(shell.material).unwrap();
            assert_eq!(mat.get_float(SHELL_INDEX), Some(shell.index as f32));
            assert_eq!(mat.get_float(SHELL_COUNT), Some(8.0));
            assert_eq!(mat.render_queue, shell.render_priority);
        }
        let base = store.get(set.base_material()).unwrap();
        assert_eq!(base.get_float(SHELL_INDEX), Some(0.0));
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn test_rebuild_is_idempotent_and_frees_old_materials() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 6, ShellAllocation::PerShell);
        build_shells(&mut world, host).unwrap();
        let first = world.get::<ShellSet>(host).unwrap().clone();
        let first_values: Vec<_> = first
            .shells()
            .iter()
            .map(|s| shell_float(&world, s, SHELL_INDEX))
            .collect();

        build_shells(&mut world, host).unwrap();
        let second = world.get::<ShellSet>(host).unwrap().clone();
        let second_values: Vec<_> = second
            .shells()
            .iter()
            .map(|s| shell_float(&world, s, SHELL_INDEX))
            .collect();

        assert_eq!(first.len(), second.len());
        assert_eq!(first_values, second_values);
        assert_eq!(world.resource::<MaterialStore>().len(), 7);
        for old in &first.shells()[1..] {
            assert!(world.get_entity(old.entity).is_err());
        }
        assert!(!world.resource::<MaterialStore>().contains(first.shells()[0].material));
    }

    #[test]
    fn test_missing_material_keeps_previous_set() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 6, ShellAllocation::PerShell);
        build_shells(&mut world, host).unwrap();
        let before = world.get::<ShellSet>(host).unwrap().clone();

        world.get_mut::<FurSurface>(host).unwrap().fur_material = None;
        assert_eq!(
            build_shells(&mut world, host),
            Err(FurError::MissingMaterial(host))
        );
        let after = world.get::<ShellSet>(host).unwrap();
        assert_eq!(after.shells(), before.shells());
    }

    #[test]
    fn test_missing_mesh_keeps_previous_set() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 3, ShellAllocation::PerShell);
        build_shells(&mut world, host).unwrap();
        let before = world.get::<ShellSet>(host).unwrap().clone();

        world.get_mut::<FurSurface>(host).unwrap().shell_count = 10;
        world.get_mut::<MeshFilter>(host).unwrap().mesh = None;
        assert_eq!(build_shells(&mut world, host), Err(FurError::MissingMesh(host)));
        assert_eq!(world.get::<ShellSet>(host).unwrap().shells(), before.shells());
    }

    #[test]
    fn test_stale_base_material_rejected() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 3, ShellAllocation::PerShell);
        let base = world.get::<FurSurface>(host).unwrap().fur_material.unwrap();
        world.resource_mut::<MaterialStore>().remove(base);

        assert_eq!(build_shells(&mut world, host), Err(FurError::StaleHandle(base)));
        assert!(world.get::<ShellSet>(host).is_none());
    }

    #[test]
    fn test_count_clamped_to_upper_bound() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 200, ShellAllocation::PerShell);
        assert_eq!(build_shells(&mut world, host), Ok(64));
        let host = spawn_host(&mut world, 0, ShellAllocation::PerShell);
        assert_eq!(build_shells(&mut world, host), Ok(1));
    }

    #[test]
    fn test_shared_allocation_stamps_override_blocks() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 5, ShellAllocation::SharedWithOverrides);
        build_shells(&mut world, host).unwrap();

        let set = world.get::<ShellSet>(host).unwrap().clone();
        assert!(!set.owns_materials());
        for shell in set.shells() {
            assert_eq!(shell.material, set.base_material());
            let block = world
                .get::<MeshRenderer>(shell.entity)
                .unwrap()
                .property_block();
            assert_eq!(block.get_float(SHELL_INDEX), Some(shell.index as f32));
            assert_eq!(block.get_float(SHELL_COUNT), Some(5.0));
        }
        let store = world.resource::<MaterialStore>();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(set.base_material()).unwrap().get_float(SHELL_INDEX),
            Some(0.0)
        );
    }

    #[test]
    fn test_teardown_restores_host_renderer() {
        let mut world = create_world();
        let host = spawn_host(&mut world, 4, ShellAllocation::SharedWithOverrides);
        world
            .get_mut::<MeshRenderer>(host)
            .unwrap()
            .property_block
            .get_or_insert_with(PropertyBlock::new)
            .set_float("_Speed", 2.0);
        let base = world.get::<FurSurface>(host).unwrap().fur_material.unwrap();
        build_shells(&mut world, host).unwrap();

        assert_eq!(teardown_shells(&mut world, host), 4);
        let renderer = world.get::<MeshRenderer>(host).unwrap();
        assert_eq!(renderer.material, Some(base));
        assert_eq!(renderer.priority, None);
        let block = renderer.property_block();
        assert_eq!(block.get_float("_Speed"), Some(2.0));
        assert_eq!(block.get_float(SHELL_INDEX), None);
        assert_eq!(teardown_shells(&mut world, host), 0);
    }
}
