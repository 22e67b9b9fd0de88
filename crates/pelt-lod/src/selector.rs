//! Distance-to-tier selection with three ascending thresholds and an optional
//! hysteresis band.

use glam::Vec3;
use thiserror::Error;

/// Fewest shells a tier may request.
pub const MIN_SHELLS: u32 = 1;
/// Most shells a tier may request.
pub const MAX_SHELLS: u32 = 64;

/// Discrete detail tier, finest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LodTier {
    /// Within `near` of the viewer.
    Near,
    /// Within `mid`.
    Mid,
    /// Within `far`.
    Far,
    /// Beyond `far`.
    VeryFar,
}

/// Errors returned when LOD settings are inconsistent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LodError {
    /// A threshold was zero, negative or NaN.
    #[error("threshold {name} must be positive, got {value}")]
    NonPositive {
        /// Which threshold.
        name: &'static str,
        /// The offending value.
        value: f32,
    },

    /// Thresholds were not strictly increasing.
    #[error("thresholds must be strictly increasing: near={near}, mid={mid}, far={far}")]
    NotAscending {
        /// Near threshold.
        near: f32,
        /// Mid threshold.
        mid: f32,
        /// Far threshold.
        far: f32,
    },

    /// Hysteresis outside `[0, 1)`.
    #[error("hysteresis must be in [0, 1), got {0}")]
    InvalidHysteresis(f32),
}

/// The three tier boundaries, `near < mid < far`, each inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierThresholds {
    near: f32,
    mid: f32,
    far: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            near: 8.0,
            mid: 16.0,
            far: 30.0,
        }
    }
}

impl TierThresholds {
    /// Create thresholds after checking they are positive and ascending.
    ///
    /// # Errors
    ///
    /// Returns [`LodError::NonPositive`] or [`LodError::NotAscending`].
    pub fn new(near: f32, mid: f32, far: f32) -> Result<Self, LodError> {
        for (name, value) in [("near", near), ("mid", mid), ("far", far)] {
            if !(value > 0.0) {
                return Err(LodError::NonPositive { name, value });
            }
        }
        if !(near < mid && mid < far) {
            return Err(LodError::NotAscending { near, mid, far });
        }
        Ok(Self { near, mid, far })
    }

    /// Near tier bound.
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Mid tier bound.
    pub fn mid(&self) -> f32 {
        self.mid
    }

    /// Far tier bound.
    pub fn far(&self) -> f32 {
        self.far
    }

    fn scaled(&self, factor: f32) -> Self {
        Self {
            near: self.near * factor,
            mid: self.mid * factor,
            far: self.far * factor,
        }
    }

    fn classify(&self, distance: f32) -> LodTier {
        if distance <= self.near {
            LodTier::Near
        } else if distance <= self.mid {
            LodTier::Mid
        } else if distance <= self.far {
            LodTier::Far
        } else {
            LodTier::VeryFar
        }
    }
}

/// Shell count configured for each tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierShellCounts {
    /// Near tier count.
    pub near: u32,
    /// Mid tier count.
    pub mid: u32,
    /// Far tier count.
    pub far: u32,
    /// VeryFar tier count.
    pub very_far: u32,
}

impl Default for TierShellCounts {
    fn default() -> Self {
        Self {
            near: 40,
            mid: 16,
            far: 8,
            very_far: 4,
        }
    }
}

impl TierShellCounts {
    /// Shell count for `tier`, clamped to `[MIN_SHELLS, MAX_SHELLS]`.
    pub fn count(&self, tier: LodTier) -> u32 {
        let raw = match tier {
            LodTier::Near => self.near,
            LodTier::Mid => self.mid,
            LodTier::Far => self.far,
            LodTier::VeryFar => self.very_far,
        };
        raw.clamp(MIN_SHELLS, MAX_SHELLS)
    }
}

/// Maps viewer distance to a [`LodTier`].
#[derive(Clone, Debug)]
pub struct LodSelector {
    thresholds: TierThresholds,
    hysteresis: f32,
}

impl LodSelector {
    /// Selector with no hysteresis band.
    pub fn new(thresholds: TierThresholds) -> Self {
        Self {
            thresholds,
            hysteresis: 0.0,
        }
    }

    /// Selector with a fractional hysteresis band in `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`LodError::InvalidHysteresis`] outside that range.
    pub fn with_hysteresis(thresholds: TierThresholds, hysteresis: f32) -> Result<Self, LodError> {
        if !(0.0..1.0).contains(&hysteresis) {
            return Err(LodError::InvalidHysteresis(hysteresis));
        }
        Ok(Self {
            thresholds,
            hysteresis,
        })
    }

    /// Pure tier selection: `Near` if `d <= near`, `Mid` if `d <= mid`,
    /// `Far` if `d <= far`, otherwise `VeryFar`.
    pub fn select_tier(&self, distance: f32) -> LodTier {
        self.thresholds.classify(distance)
    }

    /// Tier selection that only leaves `current` once the distance clears the
    /// boundary by the hysteresis fraction. With zero hysteresis this equals
    /// [`select_tier`](Self::select_tier).
    pub fn select_tier_from(&self, distance: f32, current: LodTier) -> LodTier {
        let target = self.select_tier(distance);
        if self.hysteresis <= 0.0 || target == current {
            return target;
        }

        if target > current {
            let widened = self.thresholds.scaled(1.0 + self.hysteresis);
            widened.classify(distance).max(current)
        } else {
            let narrowed = self.thresholds.scaled(1.0 - self.hysteresis);
            narrowed.classify(distance).min(current)
        }
    }

    /// Access the underlying thresholds.
    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    /// The hysteresis fraction.
    pub fn hysteresis(&self) -> f32 {
        self.hysteresis
    }
}

/// Euclidean distance between the viewer and the host.
pub fn viewer_distance(viewer: Vec3, host: Vec3) -> f32 {
    viewer.distance(host)
}
