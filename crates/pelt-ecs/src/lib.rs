//! Host-side ECS: the components, resources and schedule runner the fur
//! components are driven by.
//!
//! The host world plays the role of the rendering engine: entities carry a
//! [`MeshFilter`], a [`MeshRenderer`] and a [`Transform`], hierarchy is
//! expressed with [`Parent`]/[`Children`], and [`EngineSchedules`] is the
//! per-frame callback.

mod camera;
mod components;
mod hierarchy;
mod schedule;
mod time;
mod world;

pub use camera::{CameraRes, MainCamera};
pub use components::{Active, Layer, MeshFilter, MeshId, MeshRenderer, Name, Transform};
pub use bevy_hierarchy::{BuildChildren, Children, DespawnRecursiveExt, Parent};
pub use hierarchy::{descendants, global_translation, is_active_in_hierarchy};
pub use schedule::{EngineSchedule, EngineSchedules};
pub use time::TimeRes;
pub use world::{create_world, register_core_resources};
