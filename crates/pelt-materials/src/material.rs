//! Core material type: [`Material`] with named float and vector properties.

use std::collections::BTreeMap;

use glam::Vec4;
use thiserror::Error;

use crate::store::MaterialHandle;

/// Render queue value where transparent geometry starts.
pub const TRANSPARENT_QUEUE: i32 = 3000;

/// Default render queue for opaque geometry.
const GEOMETRY_QUEUE: i32 = 2000;

// ---------------------------------------------------------------------------
// MaterialError
// ---------------------------------------------------------------------------

/// Errors returned by material validation and store lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaterialError {
    /// The material name must not be empty.
    #[error("material name must not be empty")]
    EmptyName,

    /// The handle refers to a material that was removed from the store.
    #[error("material handle {0} is stale")]
    StaleHandle(MaterialHandle),
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// A shader instance: a shader name plus the property values it is drawn with.
///
/// Properties are keyed by their shader reference name (e.g. `_FurLength`).
/// A property is considered declared once it has a value, so
/// [`Material::has_float`] mirrors what the shader exposes.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Human-readable name (e.g., "fur", "fur (shell 3)").
    pub name: String,
    /// Shader this material binds.
    pub shader: String,
    /// Draw order. Higher values draw later.
    pub render_queue: i32,
    /// Allow the renderer to draw this material with hardware instancing.
    pub enable_instancing: bool,
    floats: BTreeMap<String, f32>,
    vectors: BTreeMap<String, Vec4>,
}

impl Material {
    /// Create an empty material for `shader` in the opaque geometry queue.
    pub fn new(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: shader.into(),
            render_queue: GEOMETRY_QUEUE,
            enable_instancing: false,
            floats: BTreeMap::new(),
            vectors: BTreeMap::new(),
        }
    }

    /// Builder-style float declaration.
    pub fn with_float(mut self, name: &str, value: f32) -> Self {
        self.set_float(name, value);
        self
    }

    /// Builder-style vector declaration.
    pub fn with_vector(mut self, name: &str, value: Vec4) -> Self {
        self.set_vector(name, value);
        self
    }

    /// Validates the material.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::EmptyName`] if the name is empty.
    pub fn validated(self) -> Result<Self, MaterialError> {
        if self.name.is_empty() {
            return Err(MaterialError::EmptyName);
        }
        Ok(self)
    }

    /// Set a float property, declaring it if needed.
    pub fn set_float(&mut self, name: &str, value: f32) {
        match self.floats.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.floats.insert(name.to_string(), value);
            }
        }
    }

    /// Read a float property.
    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    /// Returns `true` if the float property is declared.
    pub fn has_float(&self, name: &str) -> bool {
        self.floats.contains_key(name)
    }

    /// Set a vector property, declaring it if needed.
    pub fn set_vector(&mut self, name: &str, value: Vec4) {
        match self.vectors.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.vectors.insert(name.to_string(), value);
            }
        }
    }

    /// Read a vector property.
    pub fn get_vector(&self, name: &str) -> Option<Vec4> {
        self.vectors.get(name).copied()
    }

    /// Returns `true` if the vector property is declared.
    pub fn has_vector(&self, name: &str) -> bool {
        self.vectors.contains_key(name)
    }

    /// Iterate declared float properties in name order.
    pub fn floats(&self) -> impl Iterator<Item = (&str, f32)> {
        self.floats.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns `true` if this material draws in the transparent range.
    pub fn is_transparent(&self) -> bool {
        self.render_queue >= TRANSPARENT_QUEUE
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
