//! Tier state machine: decides when the applied shell count must change.

use tracing::debug;

use crate::selector::{LodError, LodSelector, LodTier, TierShellCounts, TierThresholds};

/// Everything the controller needs, usually built from the config file.
#[derive(Clone, Debug, PartialEq)]
pub struct LodSettings {
    /// Tier boundaries.
    pub thresholds: TierThresholds,
    /// Shell count per tier.
    pub counts: TierShellCounts,
    /// Turn fur physics off once the viewer is beyond the mid threshold.
    pub disable_physics_beyond_mid: bool,
    /// Fractional deadband around thresholds; 0 switches exactly at them.
    pub hysteresis: f32,
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            thresholds: TierThresholds::default(),
            counts: TierShellCounts::default(),
            disable_physics_beyond_mid: true,
            hysteresis: 0.0,
        }
    }
}

/// A rebuild the controller wants applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodTransition {
    /// Tier the viewer is now in.
    pub tier: LodTier,
    /// Shell count to rebuild with, already clamped to `[1, 64]`.
    pub shell_count: u32,
    /// Value for the physics flag on every shell.
    pub physics_enabled: bool,
    /// Distance the decision was made at.
    pub distance: f32,
}

/// Tracks the last applied shell count and emits a [`LodTransition`] when the
/// count for the viewer's tier differs from it.
///
/// The caller applies the transition and reports success with
/// [`confirm`](Self::confirm); an unconfirmed transition is re-emitted on the
/// next evaluation.
#[derive(Clone, Debug)]
pub struct LodController {
    selector: LodSelector,
    counts: TierShellCounts,
    disable_physics_beyond_mid: bool,
    applied_shells: Option<u32>,
    applied_physics: Option<bool>,
    tier: Option<LodTier>,
}

impl LodController {
    /// Build a controller from settings.
    ///
    /// # Errors
    ///
    /// Returns [`LodError::InvalidHysteresis`] for a band outside `[0, 1)`.
    pub fn new(settings: LodSettings) -> Result<Self, LodError> {
        Ok(Self {
            selector: LodSelector::with_hysteresis(settings.thresholds, settings.hysteresis)?,
            counts: settings.counts,
            disable_physics_beyond_mid: settings.disable_physics_beyond_mid,
            applied_shells: None,
            applied_physics: None,
            tier: None,
        })
    }

    /// Evaluate one tick at `distance`. Returns a transition only when the
    /// resolved shell count differs from the last confirmed one.
    pub fn evaluate(&mut self, distance: f32) -> Option<LodTransition> {
        let tier = match self.tier {
            Some(current) => self.selector.select_tier_from(distance, current),
            None => self.selector.select_tier(distance),
        };
        let shell_count = self.counts.count(tier);

        if self.applied_shells == Some(shell_count) {
            self.tier = Some(tier);
            return None;
        }

        debug!(
            ?tier,
            shell_count,
            distance,
            previous = ?self.applied_shells,
            "LOD transition"
        );

        Some(LodTransition {
            tier,
            shell_count,
            physics_enabled: self.physics_enabled(distance),
            distance,
        })
    }

    /// Record that `transition` was applied.
    pub fn confirm(&mut self, transition: &LodTransition) {
        self.applied_shells = Some(transition.shell_count);
        self.applied_physics = Some(transition.physics_enabled);
        self.tier = Some(transition.tier);
    }

    /// Forget the applied state so the next evaluation always transitions.
    pub fn reset(&mut self) {
        self.applied_shells = None;
        self.applied_physics = None;
        self.tier = None;
    }

    /// Physics flag for a viewer at `distance`.
    pub fn physics_enabled(&self, distance: f32) -> bool {
        !(self.disable_physics_beyond_mid && distance > self.selector.thresholds().mid())
    }

    /// Last confirmed shell count.
    pub fn applied_shell_count(&self) -> Option<u32> {
        self.applied_shells
    }

    /// Physics flag of the last confirmed transition. Shells rebuilt for
    /// any other reason must carry this value.
    pub fn applied_physics(&self) -> Option<bool> {
        self.applied_physics
    }

    /// Last known tier.
    pub fn current_tier(&self) -> Option<LodTier> {
        self.tier
    }

    /// The tier selector.
    pub fn selector(&self) -> &LodSelector {
        &self.selector
    }
}
