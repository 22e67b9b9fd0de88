//! Fur error taxonomy. Every variant is recoverable: the tick-level systems
//! log it and skip the affected operation.

use bevy_ecs::entity::Entity;
use pelt_materials::MaterialHandle;
use thiserror::Error;

/// Errors returned by shell building, LOD and batching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FurError {
    /// No base fur material is assigned.
    #[error("no fur material assigned to {0:?}")]
    MissingMaterial(Entity),

    /// The host's mesh filter has no mesh.
    #[error("no mesh found on the mesh filter of {0:?}")]
    MissingMesh(Entity),

    /// Neither an explicit target nor a main camera is available.
    #[error("no reference viewpoint for {0:?}")]
    MissingReferenceTarget(Entity),

    /// A material handle outlived its material.
    #[error("material handle {0} is stale")]
    StaleHandle(MaterialHandle),

    /// The host entity, its fur surface or its renderer is gone.
    #[error("host {0:?} is missing or lacks a fur surface and renderer")]
    MissingHost(Entity),

    /// Shared-material conversion requested while shells own their materials.
    #[error("shared-material batching requires shared allocation on {0:?}; per-shell allocation is active")]
    SharedMaterialConflict(Entity),
}
