//! Generational material store.
//!
//! Handles stay valid until the material is removed; after that the slot's
//! generation is bumped so old handles resolve to `None` instead of aliasing
//! whatever material reuses the slot.

use std::fmt;

use bevy_ecs::prelude::*;

use crate::material::{Material, MaterialError};

/// Opaque reference to a material in a [`MaterialStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle {
    index: u32,
    generation: u32,
}

impl MaterialHandle {
    /// Slot index inside the store.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for MaterialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    material: Option<Material>,
}

/// Owns every live material. Inserted into the ECS world as a resource.
#[derive(Resource, Default)]
pub struct MaterialStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl MaterialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `material` and return a handle to it.
    pub fn insert(&mut self, material: Material) -> MaterialHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.material = Some(material);
            return MaterialHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            material: Some(material),
        });
        MaterialHandle {
            index,
            generation: 0,
        }
    }

    /// Look up a material. Stale handles return `None`.
    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.material.as_ref())
    }

    /// Mutable lookup. Stale handles return `None`.
    pub fn get_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.material.as_mut())
    }

    /// Returns `true` if the handle still refers to a live material.
    pub fn contains(&self, handle: MaterialHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Remove a material, invalidating every handle to it.
    pub fn remove(&mut self, handle: MaterialHandle) -> Option<Material> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let material = slot.material.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(material)
    }

    /// Copy the material behind `source` into a new, independently owned slot.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::StaleHandle`] if `source` is no longer live.
    pub fn instantiate(&mut self, source: MaterialHandle) -> Result<MaterialHandle, MaterialError> {
        let copy = self
            .get(source)
            .cloned()
            .ok_or(MaterialError::StaleHandle(source))?;
        Ok(self.insert(copy))
    }

    /// Number of live materials.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the store holds no materials.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fur() -> Material {
        Material::new("fur", "Pelt/Shell").with_float("_FurLength", 0.3)
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MaterialStore::new();
        let h = store.insert(fur());
        assert_eq!(store.get(h).unwrap().name, "fur");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut store = MaterialStore::new();
        let h = store.insert(fur());
        assert!(store.remove(h).is_some());
        assert!(store.get(h).is_none());
        assert!(!store.contains(h));
        assert!(store.is_empty());
    }

    #[test]
    fn test_slot_reuse_does_not_resurrect_old_handle() {
        let mut store = MaterialStore::new();
        let old = store.insert(fur());
        store.remove(old);
        let new = store.insert(Material::new("other", "Pelt/Shell"));

        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert!(store.get(old).is_none());
        assert_eq!(store.get(new).unwrap().name, "other");
    }

    #[test]
    fn test_double_remove_is_none() {
        let mut store = MaterialStore::new();
        let h = store.insert(fur());
        store.remove(h);
        assert!(store.remove(h).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_instantiate_copies() {
        let mut store = MaterialStore::new();
        let base = store.insert(fur());
        let copy = store.instantiate(base).unwrap();
        assert_ne!(base, copy);

        store.get_mut(copy).unwrap().set_float("_FurLength", 0.9);
        assert_eq!(store.get(base).unwrap().get_float("_FurLength"), Some(0.3));
        assert_eq!(store.get(copy).unwrap().get_float("_FurLength"), Some(0.9));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_instantiate_stale_handle_errors() {
        let mut store = MaterialStore::new();
        let base = store.insert(fur());
        store.remove(base);
        assert_eq!(
            store.instantiate(base),
            Err(MaterialError::StaleHandle(base))
        );
    }

    #[test]
    fn test_handle_display() {
        let mut store = MaterialStore::new();
        let h = store.insert(fur());
        assert_eq!(h.to_string(), "#0v0");
    }
}
