//! Core host components: transform, mesh, renderer, naming and activity.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use pelt_materials::{MaterialHandle, MaterialStore, PropertyBlock};

/// Local transform relative to the parent entity (or the world for roots).
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Offset from the parent.
    pub translation: Vec3,
    /// Orientation relative to the parent.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No offset, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Identity transform moved to `translation`.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Map a point from this transform's local space into its parent's space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }
}

/// Identifier of a mesh asset owned by the host renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub u64);

/// Holds the shared mesh an entity draws.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshFilter {
    /// The mesh, if one has been assigned.
    pub mesh: Option<MeshId>,
}

impl MeshFilter {
    /// Filter referencing `mesh`.
    pub fn new(mesh: MeshId) -> Self {
        Self { mesh: Some(mesh) }
    }
}

/// Draws the entity's mesh with a material, optionally overriding some of
/// the material's properties for this renderer only.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct MeshRenderer {
    /// Material the mesh is drawn with.
    pub material: Option<MaterialHandle>,
    /// Per-renderer overrides layered over `material`.
    pub property_block: Option<PropertyBlock>,
    /// Draw priority for this renderer. `None` uses the material's queue.
    pub priority: Option<i32>,
}

impl MeshRenderer {
    /// Renderer drawing with `material` and no overrides.
    pub fn new(material: MaterialHandle) -> Self {
        Self {
            material: Some(material),
            property_block: None,
            priority: None,
        }
    }

    /// Priority the renderer draws at: the explicit priority if set, else the
    /// material's render queue. `None` if the material is missing or stale.
    pub fn effective_priority(&self, store: &MaterialStore) -> Option<i32> {
        self.priority
            .or_else(|| self.material.and_then(|h| store.get(h)).map(|m| m.render_queue))
    }

    /// Copy of the current overrides (empty if none are set).
    pub fn property_block(&self) -> PropertyBlock {
        self.property_block.clone().unwrap_or_default()
    }

    /// Replace the overrides. An empty block clears them.
    pub fn set_property_block(&mut self, block: PropertyBlock) {
        self.property_block = if block.is_empty() { None } else { Some(block) };
    }
}

/// Human-readable debug name for an entity.
#[derive(Component, Clone, Debug, PartialEq, Eq, Default)]
pub struct Name(pub String);

impl Name {
    /// Creates a new [`Name`] from anything that converts to `String`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Rendering/physics layer the entity belongs to.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Layer(pub u32);

/// Whether the entity is enabled. Inactive entities and their descendants
/// are skipped by per-frame systems.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Active(pub bool);

impl Default for Active {
    fn default() -> Self {
        Self(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_point_applies_scale_rotation_translation() {
        let t = Transform {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let p = t.transform_point(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_default_transform_is_identity() {
        assert_eq!(Transform::default(), Transform::IDENTITY);
        assert_eq!(Transform::IDENTITY.transform_point(Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn test_mesh_filter_can_be_added_to_entity() {
        let mut world = World::new();
        let entity = world.spawn(MeshFilter::new(MeshId(7))).id();
        assert_eq!(world.get::<MeshFilter>(entity).unwrap().mesh, Some(MeshId(7)));
    }

    #[test]
    fn test_empty_property_block_clears_overrides() {
        let mut renderer = MeshRenderer::default();
        let mut block = renderer.property_block();
        block.set_float("_Speed", 1.0);
        renderer.set_property_block(block);
        assert!(renderer.property_block.is_some());

        renderer.set_property_block(PropertyBlock::new());
        assert!(renderer.property_block.is_none());
    }

    #[test]
    fn test_effective_priority_prefers_explicit_value() {
        use pelt_materials::Material;

        let mut store = MaterialStore::new();
        let mut mat = Material::new("fur", "Pelt/Shell");
        mat.render_queue = 3000;
        let handle = store.insert(mat);

        let mut renderer = MeshRenderer::new(handle);
        assert_eq!(renderer.effective_priority(&store), Some(3000));
        renderer.priority = Some(3005);
        assert_eq!(renderer.effective_priority(&store), Some(3005));

        renderer.priority = None;
        store.remove(handle);
        assert_eq!(renderer.effective_priority(&store), None);
    }

    #[test]
    fn test_default_active_is_true() {
        assert!(Active::default().0);
    }

    #[test]
    fn test_name_can_be_added_to_entity() {
        let mut world = World::new();
        let entity = world.spawn(Name::new("FurShell_1")).id();
        assert_eq!(world.get::<Name>(entity).unwrap().0, "FurShell_1");
    }
}
