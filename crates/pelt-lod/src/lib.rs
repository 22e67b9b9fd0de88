//! Level-of-detail for shell fur: distance tiers, per-tier shell counts, and
//! the controller that decides when a rebuild is due.

mod controller;
mod selector;

pub use controller::{LodController, LodSettings, LodTransition};
pub use selector::{
    LodError, LodSelector, LodTier, MAX_SHELLS, MIN_SHELLS, TierShellCounts, TierThresholds,
    viewer_distance,
};
