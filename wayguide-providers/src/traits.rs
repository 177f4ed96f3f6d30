//! Core traits for external providers.
//!
//! The guidance engine consumes three collaborators: a walking directions
//! provider, a places provider, and a destination directory. Each is an async
//! trait so HTTP-backed and in-memory implementations plug in the same way.

use async_trait::async_trait;
use geodesy::Coordinate;

use crate::types::{Destination, LandmarkCategory, PlaceCandidate, RouteResponse};

/// Error types for provider operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Provider is not reachable or disabled
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Request was rejected or failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Provider quota exhausted
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// No route between the two points
    #[error("No route found")]
    NoRoute,

    /// Payload could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of walking directions.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Provider identifier, for logs.
    fn id(&self) -> &str;

    /// Compute a walking route. Steps are ordered and already validated.
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResponse, ProviderError>;
}

/// Source of points of interest.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Places within `radius_m` of `point`, optionally restricted to a category.
    async fn nearby(
        &self,
        point: Coordinate,
        radius_m: f64,
        category: Option<LandmarkCategory>,
    ) -> Result<Vec<PlaceCandidate>, ProviderError>;
}

/// Directory resolving user-entered destination codes.
#[async_trait]
pub trait DestinationDirectory: Send + Sync {
    /// Look up a code. `Ok(None)` means the code does not exist.
    async fn lookup(&self, code: &str) -> Result<Option<Destination>, ProviderError>;
}
