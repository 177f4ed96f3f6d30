//! Closed record types exchanged with providers.
//!
//! These are validated once at the provider boundary (see [`crate::validation`]);
//! everything downstream can rely on every field being present and sane.
//!
//! With the `typescript` feature enabled, the records the presentation layer
//! renders are exported through ts-rs.

use geodesy::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Kind of maneuver at a route step.
///
/// Serialized as the provider's plain string (`"turn"`, `"new name"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ManeuverType {
    Turn,
    Continue,
    Straight,
    Merge,
    Fork,
    Arrive,
    Depart,
    /// Anything else the provider sends, kept verbatim
    Other(String),
}

impl ManeuverType {
    /// Parse a provider maneuver type, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "turn" => Self::Turn,
            "continue" => Self::Continue,
            "straight" => Self::Straight,
            "merge" => Self::Merge,
            "fork" => Self::Fork,
            "arrive" => Self::Arrive,
            "depart" => Self::Depart,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Turn => "turn",
            Self::Continue => "continue",
            Self::Straight => "straight",
            Self::Merge => "merge",
            Self::Fork => "fork",
            Self::Arrive => "arrive",
            Self::Depart => "depart",
            Self::Other(other) => other,
        }
    }

    /// Whether the walker has to do something at this maneuver.
    ///
    /// `continue` and `straight` only keep the walker oriented.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Continue | Self::Straight)
    }

    /// Maneuvers announced regardless of how far away they are.
    pub fn is_always_announced(&self) -> bool {
        matches!(self, Self::Arrive | Self::Merge | Self::Fork)
    }
}

impl From<String> for ManeuverType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ManeuverType> for String {
    fn from(kind: ManeuverType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ManeuverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction qualifier of a maneuver.
///
/// Accepts both `"slight left"` and `"slight-left"` spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ManeuverModifier {
    Left,
    Right,
    SlightLeft,
    SlightRight,
    SharpLeft,
    SharpRight,
    Straight,
    UTurn,
    Other(String),
}

impl ManeuverModifier {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            "slight-left" => Self::SlightLeft,
            "slight-right" => Self::SlightRight,
            "sharp-left" => Self::SharpLeft,
            "sharp-right" => Self::SharpRight,
            "straight" => Self::Straight,
            "uturn" | "u-turn" => Self::UTurn,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::SlightLeft => "slight-left",
            Self::SlightRight => "slight-right",
            Self::SharpLeft => "sharp-left",
            Self::SharpRight => "sharp-right",
            Self::Straight => "straight",
            Self::UTurn => "uturn",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ManeuverModifier {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ManeuverModifier> for String {
    fn from(modifier: ManeuverModifier) -> Self {
        modifier.as_str().to_string()
    }
}

impl fmt::Display for ManeuverModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A maneuver: what to do at a step, and in which direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maneuver {
    #[serde(rename = "type")]
    pub kind: ManeuverType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<ManeuverModifier>,
}

impl Maneuver {
    pub fn new(kind: ManeuverType) -> Self {
        Self {
            kind,
            modifier: None,
        }
    }

    pub fn with_modifier(mut self, modifier: ManeuverModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Shorthand for `turn` with a modifier.
    pub fn turn(modifier: ManeuverModifier) -> Self {
        Self::new(ManeuverType::Turn).with_modifier(modifier)
    }
}

/// One step of a walking route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Where the step begins
    pub start: Coordinate,
    /// Where the step ends
    pub end: Coordinate,
    /// Step length in meters
    pub distance_m: f64,
    /// Expected walking time in seconds
    pub duration_s: f64,
    /// Maneuver at this step, absent for plain continuation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<Maneuver>,
    /// Route length from the start to this step's end, in meters
    pub cumulative_distance_m: f64,
}

impl RouteStep {
    /// Whether this step carries a maneuver the walker must act on.
    pub fn is_actionable(&self) -> bool {
        self.maneuver
            .as_ref()
            .is_some_and(|m| m.kind.is_actionable())
    }
}

/// A route as returned by a directions provider, already validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Ordered steps
    pub steps: Vec<RouteStep>,
    /// Encoded polyline of the whole route
    pub encoded_path: String,
}

impl RouteResponse {
    /// Total route length in meters.
    pub fn total_distance_m(&self) -> f64 {
        self.steps
            .last()
            .map(|s| s.cumulative_distance_m)
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A resolved destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Destination {
    /// Display name
    pub name: String,
    /// Street address, if the directory has one
    #[serde(default)]
    pub address: Option<String>,
    /// Location
    pub coordinate: Coordinate,
}

impl Destination {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            address: None,
            coordinate,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Landmark categories, in search priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum LandmarkCategory {
    School,
    Mosque,
    Church,
    Market,
    BusStop,
    Other,
}

impl LandmarkCategory {
    /// All categories in the order they are searched and classified.
    pub const PRIORITY: [LandmarkCategory; 6] = [
        Self::School,
        Self::Mosque,
        Self::Church,
        Self::Market,
        Self::BusStop,
        Self::Other,
    ];

    /// Tag used when asking a places provider for this category.
    ///
    /// `Other` asks for generic establishments.
    pub fn query_tag(&self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Mosque => "mosque",
            Self::Church => "church",
            Self::Market => "market",
            Self::BusStop => "bus_station",
            Self::Other => "establishment",
        }
    }

    /// Provider type tags that classify a place into this category.
    pub fn matching_tags(&self) -> &'static [&'static str] {
        match self {
            Self::School => &["school", "primary_school", "secondary_school", "university"],
            Self::Mosque => &["mosque"],
            Self::Church => &["church", "place_of_worship"],
            Self::Market => &["market", "supermarket", "grocery_or_supermarket", "shopping_mall"],
            Self::BusStop => &["bus_station", "bus_stop", "transit_station"],
            Self::Other => &[],
        }
    }

    /// Classify a place by its type tags, first matching category wins.
    pub fn classify<S: AsRef<str>>(tags: &[S]) -> Self {
        Self::PRIORITY
            .into_iter()
            .find(|category| {
                tags.iter()
                    .any(|tag| category.matching_tags().contains(&tag.as_ref()))
            })
            .unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Mosque => "mosque",
            Self::Church => "church",
            Self::Market => "market",
            Self::BusStop => "bus_stop",
            Self::Other => "other",
        }
    }
}

/// A place returned by a places provider, validated but not yet classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub coordinate: Coordinate,
    /// Provider type tags (`"school"`, `"bus_station"`, ...)
    #[serde(default)]
    pub types: Vec<String>,
}

impl PlaceCandidate {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            address: None,
            coordinate,
            types: Vec::new(),
        }
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// A point of interest near the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Landmark {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub coordinate: Coordinate,
    pub category: LandmarkCategory,
    /// Distance from the point it was found from, in meters
    #[serde(default)]
    pub distance_m: Option<f64>,
}

impl Landmark {
    /// Build a landmark from a candidate found in `category`.
    pub fn from_candidate(candidate: PlaceCandidate, category: LandmarkCategory) -> Self {
        Self {
            name: candidate.name,
            address: candidate.address,
            coordinate: candidate.coordinate,
            category,
            distance_m: None,
        }
    }

    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = Some(distance_m);
        self
    }

    /// Identity of a landmark: lowercased name plus a ~100 m coordinate cell.
    pub fn identity_key(&self) -> (String, i64, i64) {
        let (lat, lon) = self.coordinate.grid_key(3);
        (self.name.to_lowercase(), lat, lon)
    }
}
