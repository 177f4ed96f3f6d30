//! Shared types for the guidance engine.

use serde::{Deserialize, Serialize};

use wayguide_providers::{ManeuverModifier, ManeuverType, ProviderError, StoreError};

/// A rendered instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Localized text
    pub text: String,
    /// Maneuver the text describes
    pub maneuver_type: ManeuverType,
    /// Direction qualifier, if any
    #[serde(default)]
    pub modifier: Option<ManeuverModifier>,
    /// Distance to the maneuver in meters
    pub distance_m: f64,
    /// True while the maneuver is still far off
    pub upcoming: bool,
}

/// Error types for the guidance engine.
///
/// Illegal phase transitions are not errors; they are reported as `false`.
#[derive(Debug, thiserror::Error)]
pub enum GuidanceError {
    /// External provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Snapshot store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Operation needs a destination that has not been resolved
    #[error("No destination resolved")]
    NoDestination,

    /// Operation needs a position that has not been reported
    #[error("No position reported")]
    NoPosition,
}

pub type Result<T> = std::result::Result<T, GuidanceError>;
