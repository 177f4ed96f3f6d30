//! Journey phases and the allowed-edge table.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Phase of a guidance session. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum NavigationPhase {
    #[default]
    Welcome,
    LocationPermission,
    LanguageSelection,
    VoiceConsent,
    DestinationInput,
    DestinationValidation,
    Navigating,
    Arrived,
    Recovery,
}

impl NavigationPhase {
    pub const ALL: [NavigationPhase; 9] = [
        Self::Welcome,
        Self::LocationPermission,
        Self::LanguageSelection,
        Self::VoiceConsent,
        Self::DestinationInput,
        Self::DestinationValidation,
        Self::Navigating,
        Self::Arrived,
        Self::Recovery,
    ];

    /// Phases reachable from this one in a single step.
    pub fn successors(&self) -> &'static [NavigationPhase] {
        use NavigationPhase::*;

        match self {
            Welcome => &[LocationPermission, LanguageSelection],
            LocationPermission => &[LanguageSelection, Navigating],
            LanguageSelection => &[VoiceConsent],
            VoiceConsent => &[DestinationInput],
            DestinationInput => &[DestinationValidation],
            DestinationValidation => &[Navigating, DestinationInput, LocationPermission],
            Navigating => &[Arrived, Recovery],
            Recovery => &[Navigating, DestinationInput],
            Arrived => &[Welcome, DestinationInput],
        }
    }

    /// Whether the edge `self -> to` exists. Guards are checked separately.
    pub fn can_transition_to(&self, to: NavigationPhase) -> bool {
        self.successors().contains(&to)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::LocationPermission => "location_permission",
            Self::LanguageSelection => "language_selection",
            Self::VoiceConsent => "voice_consent",
            Self::DestinationInput => "destination_input",
            Self::DestinationValidation => "destination_validation",
            Self::Navigating => "navigating",
            Self::Arrived => "arrived",
            Self::Recovery => "recovery",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == raw.trim())
    }
}

impl fmt::Display for NavigationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_table() {
        use NavigationPhase::*;

        assert!(Welcome.can_transition_to(LocationPermission));
        assert!(DestinationValidation.can_transition_to(LocationPermission));
        assert!(Arrived.can_transition_to(Welcome));
        assert!(!Welcome.can_transition_to(Navigating));
        assert!(!Navigating.can_transition_to(Welcome));
        assert!(!Recovery.can_transition_to(Arrived));
        assert!(!LanguageSelection.can_transition_to(LanguageSelection));
    }

    #[test]
    fn test_every_phase_has_an_exit() {
        for phase in NavigationPhase::ALL {
            assert!(!phase.successors().is_empty(), "{phase} is a dead end");
        }
    }

    #[test]
    fn test_names_roundtrip() {
        for phase in NavigationPhase::ALL {
            assert_eq!(NavigationPhase::parse(phase.as_str()), Some(phase));
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
        assert_eq!(NavigationPhase::parse("lost"), None);
    }
}
