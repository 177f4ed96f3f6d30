//! Wayguide - pedestrian navigation guidance engine.
//!
//! Walks a pedestrian from a live GPS position to a fixed destination:
//!
//! - **Journey state machine**: consent, destination selection, validation,
//!   guidance, arrival and recovery phases with guarded transitions
//! - **Turn-by-turn guidance**: next maneuver, distance to it, announce policy,
//!   wrong-direction detection
//! - **Landmark discovery**: points of interest sampled along the route
//! - **Localization**: English, French and Spanish instructions
//! - **Fallbacks**: static narration without location, straight-line estimates
//!   without a route, landmark narration without a path
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       GuidanceSession                        │
//! │                                                              │
//! │  ┌──────────────────┐  ┌────────────────┐  ┌──────────────┐  │
//! │  │ TurnByTurnEngine │  │ LandmarkSampler│  │  Localizer   │  │
//! │  └────────┬─────────┘  └───────┬────────┘  └──────────────┘  │
//! │           │                    │                             │
//! │  ┌────────▼────────────────────▼─────────┐                   │
//! │  │        NavigationStateMachine          │──► SessionEvent  │
//! │  └────────────────────────────────────────┘    stream        │
//! └───────────┬──────────────────┬───────────────────┬───────────┘
//!             │                  │                   │
//!    DirectionsProvider    PlacesProvider    DestinationDirectory
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wayguide::{GuidanceProviders, GuidanceSession, NavigationPhase, NavigationStateMachine};
//! use wayguide_providers::mock::{MockDirectory, MockDirections, MockPlaces};
//!
//! # async fn run() -> wayguide::Result<()> {
//! let machine = Arc::new(NavigationStateMachine::new());
//! let session = GuidanceSession::new(
//!     machine.clone(),
//!     GuidanceProviders {
//!         directions: Arc::new(MockDirections::new()),
//!         places: Arc::new(MockPlaces::new()),
//!         directory: Arc::new(MockDirectory::new()),
//!     },
//! );
//!
//! machine.transition_to(NavigationPhase::LocationPermission).await;
//! machine.grant_location_permission().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod guidance;
pub mod landmarks;
pub mod localizer;
pub mod session;
pub mod state;
pub mod types;

pub use config::{GuidanceConfig, LandmarkConfig, SessionConfig, WayguideConfig};
pub use guidance::{locate_current_step, DeviationDetector, StepLocation, TurnByTurnEngine};
pub use landmarks::{dedupe_landmarks, sample_route_points, LandmarkSampler};
pub use localizer::{format_distance, localize, Language};
pub use session::{GuidanceProviders, GuidanceSession, GuidanceUpdate, LandmarkReport, RouteStatus};
pub use state::{
    NavigationPhase, NavigationStateMachine, SessionContext, SessionEvent, SessionEventKind,
    SessionSnapshot,
};
pub use types::{GuidanceError, Instruction, Result};
