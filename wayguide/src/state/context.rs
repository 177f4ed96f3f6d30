//! Session context owned by the state machine.

use chrono::{DateTime, Utc};
use geodesy::Coordinate;
use serde::{Deserialize, Serialize};

use wayguide_providers::Destination;

use super::phase::NavigationPhase;
use crate::localizer::Language;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Everything the journey has learned so far.
///
/// Only [`NavigationStateMachine`](super::NavigationStateMachine) mutates this;
/// everyone else sees clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct SessionContext {
    /// Code the walker entered or scanned
    pub destination_code: Option<String>,
    /// Record resolved from the code
    pub destination: Option<Destination>,
    pub location_permission_granted: bool,
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub language: Language,
    pub voice_enabled: bool,
    pub destination_validated: bool,
    pub navigating: bool,
    pub arrived: bool,
    /// Last reported position
    pub position: Option<Coordinate>,
    /// Last observed distance to the destination (meters)
    pub distance_to_destination_m: Option<f64>,
    /// Live location cannot be obtained
    pub location_unavailable: bool,
    /// No usable route could be fetched
    pub routing_failed: bool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::with_language(Language::default())
    }
}

impl SessionContext {
    pub fn with_language(language: Language) -> Self {
        Self {
            destination_code: None,
            destination: None,
            location_permission_granted: false,
            language,
            voice_enabled: false,
            destination_validated: false,
            navigating: false,
            arrived: false,
            position: None,
            distance_to_destination_m: None,
            location_unavailable: false,
            routing_failed: false,
        }
    }

    /// Drop everything tied to the current destination, keeping preferences.
    pub fn clear_destination(&mut self) {
        self.destination_code = None;
        self.destination = None;
        self.destination_validated = false;
        self.navigating = false;
        self.arrived = false;
        self.position = None;
        self.distance_to_destination_m = None;
        self.routing_failed = false;
    }

    /// A fresh context that keeps the walker's language, voice and permission choices.
    pub fn preferences_only(&self) -> Self {
        Self {
            location_permission_granted: self.location_permission_granted,
            voice_enabled: self.voice_enabled,
            location_unavailable: self.location_unavailable,
            ..Self::with_language(self.language)
        }
    }
}

/// Persisted `{phase, context}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: NavigationPhase,
    pub context: SessionContext,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn travelling() -> SessionContext {
        SessionContext {
            destination_code: Some("LIB-01".into()),
            destination: Some(Destination::new("Library", Coordinate::new(1.0, 1.0))),
            location_permission_granted: true,
            language: Language::French,
            voice_enabled: true,
            destination_validated: true,
            navigating: true,
            position: Some(Coordinate::new(1.001, 1.0)),
            distance_to_destination_m: Some(111.0),
            routing_failed: true,
            ..SessionContext::default()
        }
    }

    #[test]
    fn test_clear_destination_keeps_preferences() {
        let mut ctx = travelling();
        ctx.clear_destination();

        assert!(ctx.destination_code.is_none());
        assert!(ctx.destination.is_none());
        assert!(!ctx.destination_validated && !ctx.navigating && !ctx.routing_failed);
        assert!(ctx.position.is_none());
        assert!(ctx.location_permission_granted);
        assert!(ctx.voice_enabled);
        assert_eq!(ctx.language, Language::French);
    }

    #[test]
    fn test_preferences_only() {
        let fresh = travelling().preferences_only();
        assert_eq!(fresh.language, Language::French);
        assert!(fresh.voice_enabled);
        assert!(fresh.location_permission_granted);
        assert!(fresh.destination.is_none());
        assert!(fresh.distance_to_destination_m.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let ctx: SessionContext = serde_json::from_str(r#"{"language":"es"}"#).unwrap();
        assert_eq!(ctx.language, Language::Spanish);
        assert!(!ctx.navigating);
    }
}
