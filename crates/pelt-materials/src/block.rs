//! Per-renderer property overrides.

use std::collections::BTreeMap;

use glam::Vec4;

use crate::material::Material;

/// Per-instance property storage layered over a shared material.
///
/// Lets many renderers share one [`Material`] while each carries its own
/// values for a handful of properties, without copying the material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBlock {
    floats: BTreeMap<String, f32>,
    vectors: BTreeMap<String, Vec4>,
}

impl PropertyBlock {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a float property.
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    /// Read an overridden float.
    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    /// Override a vector property.
    pub fn set_vector(&mut self, name: &str, value: Vec4) {
        self.vectors.insert(name.to_string(), value);
    }

    /// Read an overridden vector.
    pub fn get_vector(&self, name: &str) -> Option<Vec4> {
        self.vectors.get(name).copied()
    }

    /// Drop the override for `name` (float or vector). Returns `true` if one
    /// was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let float = self.floats.remove(name).is_some();
        let vector = self.vectors.remove(name).is_some();
        float || vector
    }

    /// Returns `true` if nothing is overridden.
    pub fn is_empty(&self) -> bool {
        self.floats.is_empty() && self.vectors.is_empty()
    }

    /// Drop every override.
    pub fn clear(&mut self) {
        self.floats.clear();
        self.vectors.clear();
    }
}

/// The float a renderer actually draws with: the block override if present,
/// otherwise the material's value.
pub fn resolve_float(material: &Material, block: Option<&PropertyBlock>, name: &str) -> Option<f32> {
    block
        .and_then(|b| b.get_float(name))
        .or_else(|| material.get_float(name))
}

/// Vector counterpart of [`resolve_float`].
pub fn resolve_vector(
    material: &Material,
    block: Option<&PropertyBlock>,
    name: &str,
) -> Option<Vec4> {
    block
        .and_then(|b| b.get_vector(name))
        .or_else(|| material.get_vector(name))
}
