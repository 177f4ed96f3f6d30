//! Configuration for the guidance engine.
//!
//! Every threshold the engine uses lives here. The deviation hysteresis and the
//! continue-repeat distance are tuned empirically, so they stay adjustable.

use serde::{Deserialize, Serialize};

use crate::localizer::Language;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WayguideConfig {
    /// Turn-by-turn thresholds
    #[serde(default)]
    pub guidance: GuidanceConfig,
    /// Landmark discovery
    #[serde(default)]
    pub landmarks: LandmarkConfig,
    /// Session behavior
    #[serde(default)]
    pub session: SessionConfig,
}

impl WayguideConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Turn-by-turn configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Actionable maneuvers closer than this are announced (meters)
    pub announce_distance_m: f64,
    /// Instructions farther than this are flagged as upcoming (meters)
    pub upcoming_distance_m: f64,
    /// Width of the band within which a continue instruction is spoken once (meters)
    pub continue_repeat_m: f64,
    /// Rise in distance-to-destination between samples that raises deviation (meters)
    pub deviation_raise_m: f64,
    /// Drop below the raise point that clears deviation (meters)
    pub deviation_clear_m: f64,
    /// Distance-to-destination below which the walker has arrived (meters)
    pub arrival_radius_m: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            announce_distance_m: 100.0,
            upcoming_distance_m: 50.0,
            continue_repeat_m: 200.0,
            deviation_raise_m: 20.0,
            deviation_clear_m: 10.0,
            arrival_radius_m: 15.0,
        }
    }
}

/// Landmark discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Spacing of route sample points (meters)
    pub sample_interval_m: f64,
    /// Search radius around each sample point (meters)
    pub search_radius_m: f64,
    /// Stop collecting once this many landmarks are found
    pub max_landmarks: usize,
    /// Cap on landmarks returned for a single point
    pub near_point_limit: usize,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            sample_interval_m: 200.0,
            search_radius_m: 150.0,
            max_landmarks: 10,
            near_point_limit: 5,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Language used until the walker picks one
    pub default_language: Language,
    /// Assumed walking speed for straight-line estimates (m/s)
    pub walking_speed_mps: f64,
    /// Key prefix for persisted snapshots
    pub storage_prefix: String,
    /// Capacity of the change-event channel
    pub event_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_language: Language::English,
            walking_speed_mps: 1.4, // ~5 km/h
            storage_prefix: "wayguide".to_string(),
            event_buffer: 64,
        }
    }
}
