//! Boundary validation of provider payloads.
//!
//! Providers hand back loosely typed JSON where almost anything can be missing.
//! The raw shapes here mirror that looseness; converting them into the closed
//! types in [`crate::types`] happens exactly once, so instruction logic never
//! has to check for absent fields.

use geodesy::{distance_meters, Coordinate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::traits::ProviderError;
use crate::types::{Maneuver, ManeuverModifier, ManeuverType, PlaceCandidate, RouteResponse, RouteStep};

/// Maneuver as a provider sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawManeuver {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub modifier: Option<String>,
}

/// Route step as a provider sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRouteStep {
    #[serde(default)]
    pub start: Option<Coordinate>,
    #[serde(default)]
    pub end: Option<Coordinate>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub maneuver: Option<RawManeuver>,
    #[serde(default)]
    pub cumulative_distance: Option<f64>,
}

/// Route payload as a provider sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRoute {
    #[serde(default)]
    pub steps: Vec<RawRouteStep>,
    #[serde(default)]
    pub encoded_path: Option<String>,
}

impl RawRoute {
    /// Parse and validate a JSON route payload.
    pub fn parse_json(payload: &str) -> Result<RouteResponse, ProviderError> {
        let raw: RawRoute = serde_json::from_str(payload)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(raw.into_response())
    }

    /// Convert into a validated route. Unusable steps are dropped.
    pub fn into_response(self) -> RouteResponse {
        RouteResponse {
            steps: normalize_route_steps(self.steps),
            encoded_path: self.encoded_path.unwrap_or_default(),
        }
    }
}

/// Place as a provider sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "vicinity")]
    pub address: Option<String>,
    #[serde(default, alias = "location")]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl RawPlace {
    /// Validate a place; nameless or unlocated places are useless as landmarks.
    pub fn validate(self) -> Option<PlaceCandidate> {
        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
        let coordinate = self.coordinate.filter(Coordinate::is_valid)?;
        let address = self
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Some(PlaceCandidate {
            name,
            address,
            coordinate,
            types: self
                .types
                .into_iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
        })
    }

    /// Validate a batch, dropping unusable places.
    pub fn validate_all(raw: Vec<RawPlace>) -> Vec<PlaceCandidate> {
        let total = raw.len();
        let places: Vec<_> = raw.into_iter().filter_map(RawPlace::validate).collect();
        if places.len() < total {
            debug!(dropped = total - places.len(), "Dropped unusable places");
        }
        places
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

/// Normalize raw steps into closed [`RouteStep`]s.
///
/// - steps without valid start/end coordinates are rejected
/// - missing, negative or non-finite distances and durations become 0; a missing
///   distance falls back to the straight line between the step's endpoints
/// - cumulative distances are kept only if every surviving step has one and they
///   never decrease; otherwise they are recomputed as a running sum
pub fn normalize_route_steps(raw: Vec<RawRouteStep>) -> Vec<RouteStep> {
    let total = raw.len();
    let mut provider_cumulative = Vec::with_capacity(total);
    let mut steps = Vec::with_capacity(total);

    for (index, step) in raw.into_iter().enumerate() {
        let (Some(start), Some(end)) = (
            step.start.filter(Coordinate::is_valid),
            step.end.filter(Coordinate::is_valid),
        ) else {
            warn!(index, "Rejecting route step without valid coordinates");
            continue;
        };

        let distance_m = match step.distance {
            Some(d) => non_negative(Some(d)),
            None => distance_meters(&start, &end),
        };

        let maneuver = step.maneuver.and_then(|m| {
            let kind = m.kind.filter(|k| !k.trim().is_empty())?;
            Some(Maneuver {
                kind: ManeuverType::parse(&kind),
                modifier: m
                    .modifier
                    .filter(|m| !m.trim().is_empty())
                    .map(|m| ManeuverModifier::parse(&m)),
            })
        });

        provider_cumulative.push(step.cumulative_distance.filter(|c| c.is_finite() && *c >= 0.0));
        steps.push(RouteStep {
            start,
            end,
            distance_m,
            duration_s: non_negative(step.duration),
            maneuver,
            cumulative_distance_m: 0.0,
        });
    }

    let provider_is_consistent = provider_cumulative.iter().all(Option::is_some)
        && provider_cumulative
            .windows(2)
            .all(|pair| pair[0] <= pair[1]);

    if provider_is_consistent {
        for (step, cumulative) in steps.iter_mut().zip(provider_cumulative) {
            step.cumulative_distance_m = cumulative.unwrap_or(0.0);
        }
    } else {
        let mut running = 0.0;
        for step in &mut steps {
            running += step.distance_m;
            step.cumulative_distance_m = running;
        }
    }

    if steps.len() < total {
        warn!(kept = steps.len(), total, "Route steps dropped during validation");
    }

    steps
}
