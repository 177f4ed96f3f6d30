//! Wayguide Providers - the boundary between the guidance engine and the outside world
//!
//! The engine never computes routes or searches for places itself. This crate
//! defines what it consumes and how those records are checked on the way in:
//!
//! - Closed record types: [`RouteStep`], [`Maneuver`], [`Landmark`], [`Destination`]
//! - Trait-based providers: [`DirectionsProvider`], [`PlacesProvider`], [`DestinationDirectory`]
//! - Boundary validation of loosely typed provider payloads ([`validation`])
//! - Key-value session stores for snapshot persistence ([`SessionStore`])
//! - Mock providers for tests and demos ([`mock`])
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  raw JSON   ┌──────────────┐  closed types  ┌──────────────┐
//! │  Directions  │────────────▶│  validation  │───────────────▶│   wayguide   │
//! │  Places      │             │  (one pass)  │                │   engine     │
//! │  Directory   │             └──────────────┘                └──────┬───────┘
//! └──────────────┘                                                    │
//!                                                        ┌────────────▼───────┐
//!                                                        │   SessionStore     │
//!                                                        │ (memory / files)   │
//!                                                        └────────────────────┘
//! ```

pub mod mock;
pub mod store;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use store::{FileStore, MemoryStore, SessionStore, StoreError};
pub use traits::{DestinationDirectory, DirectionsProvider, PlacesProvider, ProviderError};
pub use types::*;
pub use validation::{normalize_route_steps, RawManeuver, RawPlace, RawRoute, RawRouteStep};
