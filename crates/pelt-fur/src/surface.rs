//! The fur surface component and its lifecycle entry points.
//!
//! A host entity becomes furry by carrying a [`FurSurface`]. The lifecycle
//! functions here are what an owning loop calls on enable, on settings
//! changes, on demand, on disable and on destroy; each one either fully
//! rebuilds the host's [`ShellSet`] or leaves the previous set untouched.

use bevy_ecs::prelude::*;
use glam::Vec3;
use pelt_config::ShellAllocation;
use pelt_ecs::is_active_in_hierarchy;
use pelt_materials::MaterialHandle;
use tracing::{info, warn};

use crate::builder::{build_shells, teardown_shells};
use crate::error::FurError;
use crate::lod::{FurLod, apply_physics_flag};
use crate::props::{MAX_SHELL_COUNT, MIN_SHELL_COUNT};

// ---------------------------------------------------------------------------
// WindSettings
// ---------------------------------------------------------------------------

/// Procedural wind pushed into every shell each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindSettings {
    /// Push a wind vector at all.
    pub enabled: bool,
    /// Direction; normalized before use, a zero vector yields no wind.
    pub direction: Vec3,
    /// Peak magnitude.
    pub strength: f32,
    /// Oscillation rate in radians per second.
    pub frequency: f32,
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            direction: Vec3::new(0.5, 0.0, 1.0),
            strength: 0.7,
            frequency: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// FurSurface
// ---------------------------------------------------------------------------

/// Fur settings for one host entity.
#[derive(Component, Clone, Debug)]
pub struct FurSurface {
    /// Requested shell count, including the host's own renderer as shell 0.
    pub shell_count: u32,
    /// Base fur material every shell is derived from.
    pub fur_material: Option<MaterialHandle>,
    /// Fur length, `[0, 1]`.
    pub fur_length: f32,
    /// Gravity droop, `[0, 1]`.
    pub gravity: f32,
    /// Wind animation.
    pub wind: WindSettings,
    /// How shell materials are allocated.
    pub allocation: ShellAllocation,
    last_failure: Option<FurError>,
}

impl FurSurface {
    /// Surface with default settings drawing with `material`.
    pub fn new(material: MaterialHandle) -> Self {
        Self {
            fur_material: Some(material),
            ..Self::default()
        }
    }

    /// The failure most recently reported for this surface, cleared by the
    /// next successful build.
    pub fn last_failure(&self) -> Option<&FurError> {
        self.last_failure.as_ref()
    }
}

impl Default for FurSurface {
    fn default() -> Self {
        Self {
            shell_count: 32,
            fur_material: None,
            fur_length: 0.3,
            gravity: 0.2,
            wind: WindSettings::default(),
            allocation: ShellAllocation::PerShell,
            last_failure: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ShellSet
// ---------------------------------------------------------------------------

/// One built shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShellDescriptor {
    /// Position in the stack, `0..count`.
    pub index: u32,
    /// Entity drawing the shell; the host itself for index 0.
    pub entity: Entity,
    /// Material the shell draws with.
    pub material: MaterialHandle,
    /// `BASE_RENDER_PRIORITY + index`.
    pub render_priority: i32,
}

/// The shells currently built for a host. Lives on the host entity.
#[derive(Component, Clone, Debug)]
pub struct ShellSet {
    pub(crate) shells: Vec<ShellDescriptor>,
    pub(crate) base_material: MaterialHandle,
    pub(crate) allocation: ShellAllocation,
}

impl ShellSet {
    /// Shells in index order.
    pub fn shells(&self) -> &[ShellDescriptor] {
        &self.shells
    }

    /// Number of shells.
    pub fn len(&self) -> usize {
        self.shells.len()
    }

    /// Returns `true` if the set holds no shells.
    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// Shell at `index`.
    pub fn get(&self, index: u32) -> Option<&ShellDescriptor> {
        self.shells.get(index as usize)
    }

    /// Material the set was derived from.
    pub fn base_material(&self) -> MaterialHandle {
        self.base_material
    }

    /// Allocation mode the set was built with.
    pub fn allocation(&self) -> ShellAllocation {
        self.allocation
    }

    /// Returns `true` if the shell materials are per-set copies the set frees
    /// on teardown.
    pub fn owns_materials(&self) -> bool {
        self.allocation == ShellAllocation::PerShell
    }
}

/// Tags a spawned shell child with its index.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShellMarker {
    /// Position in the stack, `1..count`.
    pub index: u32,
}

/// What triggered a build. Carried in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildReason {
    /// The host was enabled.
    Enable,
    /// Settings were validated after an edit.
    Validate,
    /// An explicit [`rebuild_now`] call.
    Manual,
    /// The LOD controller changed the shell count.
    Lod,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Build the host's shells, logging a failure once until it changes or a
/// build succeeds. Returns the number of shells built.
///
/// # Errors
///
/// Propagates the [`FurError`] from [`build_shells`]; the previous set is
/// left untouched in that case.
pub fn try_build(world: &mut World, host: Entity, reason: BuildReason) -> Result<usize, FurError> {
    match build_shells(world, host) {
        Ok(count) => {
            if let Some(mut surface) = world.get_mut::<FurSurface>(host) {
                surface.last_failure = None;
            }
            // Fresh shells inherit the base material's physics flag; put the
            // LOD decision back unless the LOD path is about to write its own.
            if reason != BuildReason::Lod
                && let Some(physics) = world
                    .get::<FurLod>(host)
                    .and_then(|lod| lod.controller().applied_physics())
            {
                apply_physics_flag(world, host, physics);
            }
            info!(?host, ?reason, shells = count, "fur shells built");
            Ok(count)
        }
        Err(err) => {
            let mut surface = world.get_mut::<FurSurface>(host);
            let repeated = surface
                .as_ref()
                .is_some_and(|s| s.last_failure.as_ref() == Some(&err));
            if !repeated {
                warn!(?host, ?reason, %err, "fur shell build skipped");
                if let Some(surface) = surface.as_mut() {
                    surface.last_failure = Some(err.clone());
                }
            }
            Err(err)
        }
    }
}

/// Build shells when the host is enabled.
///
/// # Errors
///
/// See [`try_build`].
pub fn enable_surface(world: &mut World, host: Entity) -> Result<usize, FurError> {
    try_build(world, host, BuildReason::Enable)
}

/// Clamp the shell count to `[4, 64]` and rebuild if the host is active in
/// the hierarchy. Returns `Ok(None)` when the host is inactive.
///
/// # Errors
///
/// [`FurError::MissingHost`] if the host has no surface, else see
/// [`try_build`].
pub fn validate_surface(world: &mut World, host: Entity) -> Result<Option<usize>, FurError> {
    let mut surface = world
        .get_mut::<FurSurface>(host)
        .ok_or(FurError::MissingHost(host))?;
    surface.shell_count = surface.shell_count.clamp(MIN_SHELL_COUNT, MAX_SHELL_COUNT);

    if !is_active_in_hierarchy(world, host) {
        return Ok(None);
    }
    try_build(world, host, BuildReason::Validate).map(Some)
}

/// Rebuild immediately. Idempotent for unchanged settings.
///
/// # Errors
///
/// See [`try_build`].
pub fn rebuild_now(world: &mut World, host: Entity) -> Result<usize, FurError> {
    try_build(world, host, BuildReason::Manual)
}

/// Tear the shells down, keeping the surface so it can be enabled again.
/// Returns the number of shells removed.
pub fn disable_surface(world: &mut World, host: Entity) -> usize {
    teardown_shells(world, host)
}

/// Tear the shells down and remove every fur component from the host.
/// Returns the number of shells removed.
pub fn destroy_surface(world: &mut World, host: Entity) -> usize {
    let removed = teardown_shells(world, host);
    if let Ok(mut entity) = world.get_entity_mut(host) {
        entity.remove::<(FurSurface, FurLod)>();
    }
    removed
}
