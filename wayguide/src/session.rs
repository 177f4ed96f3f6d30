//! GuidanceSession - drives one walker from validation to arrival.
//!
//! Owns the turn-by-turn engine, the landmark sampler and the provider
//! handles; the state machine is shared with the presentation layer, which
//! watches its change events.
//!
//! ```text
//!  GPS sample ──► handle_position ──► (single flight)
//!                      │
//!                      ├─ record_navigation_fix ───────► NavigationStateMachine ──► events
//!                      ├─ arrival?   ──► confirm_arrival
//!                      ├─ deviating? ──► turn-around
//!                      ├─ route?     ──► TurnByTurnEngine ──► Instruction
//!                      └─ no route   ──► straight-line estimate
//! ```
//!
//! Route and landmark fetches are tagged with a sequence number; a response
//! that arrives after a newer request was issued is dropped. Committing or
//! failing a route also drops any landmark search still running against the
//! previous one.

use geodesy::{decode_path, distance_meters, Coordinate};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use wayguide_providers::{
    DestinationDirectory, DirectionsProvider, Landmark, PlacesProvider, RouteStep,
};

use crate::config::WayguideConfig;
use crate::guidance::{locate_current_step, TurnByTurnEngine};
use crate::landmarks::LandmarkSampler;
use crate::localizer::{arrival, static_narration, straight_line, turn_around};
use crate::state::{NavigationPhase, NavigationStateMachine};
use crate::types::{GuidanceError, Instruction, Result};

/// External collaborators of a session.
#[derive(Clone)]
pub struct GuidanceProviders {
    pub directions: Arc<dyn DirectionsProvider>,
    pub places: Arc<dyn PlacesProvider>,
    pub directory: Arc<dyn DestinationDirectory>,
}

/// Output for one position sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuidanceUpdate {
    /// Normal turn-by-turn guidance
    Instruction {
        instruction: Instruction,
        announcement: Option<String>,
    },
    /// Walking away from the destination
    TurnAround {
        text: String,
        announcement: Option<String>,
    },
    /// No route; distance and walking time as the crow flies
    StraightLine {
        distance_m: f64,
        eta_minutes: u64,
        text: String,
    },
    /// Live location unavailable
    Static { text: String },
    /// Within the arrival radius; the session has moved to `arrived`
    Arrived { text: String },
    /// Not navigating
    Idle,
}

/// Result of a route fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    /// Route stored; `path_points` is zero when the encoded path was unusable
    Loaded { steps: usize, path_points: usize },
    /// Provider failed or returned no steps; straight-line fallback is active
    Unavailable,
    /// A newer fetch was issued while this one was in flight
    Superseded,
}

/// Landmarks found for the current route or position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkReport {
    pub landmarks: Vec<Landmark>,
    /// Sampled along the route path rather than around a single point
    pub along_route: bool,
    /// Spoken summary, present when there is no path to follow
    pub narration: Option<String>,
}

#[derive(Debug, Clone)]
struct LoadedRoute {
    steps: Vec<RouteStep>,
    path: Vec<Coordinate>,
    total_distance_m: f64,
}

/// One active guidance session.
pub struct GuidanceSession {
    machine: Arc<NavigationStateMachine>,
    providers: GuidanceProviders,
    config: WayguideConfig,
    sampler: LandmarkSampler,
    /// Held for the whole of a position update
    engine: Mutex<TurnByTurnEngine>,
    route: RwLock<Option<LoadedRoute>>,
    landmarks: RwLock<Vec<Landmark>>,
    route_sequence: AtomicU64,
    landmark_sequence: AtomicU64,
}

impl GuidanceSession {
    pub fn new(machine: Arc<NavigationStateMachine>, providers: GuidanceProviders) -> Self {
        let config = machine.config().clone();
        let sampler = LandmarkSampler::with_config(providers.places.clone(), config.landmarks.clone());
        let engine = TurnByTurnEngine::with_config(config.guidance.clone());

        Self {
            machine,
            providers,
            config,
            sampler,
            engine: Mutex::new(engine),
            route: RwLock::new(None),
            landmarks: RwLock::new(Vec::new()),
            route_sequence: AtomicU64::new(0),
            landmark_sequence: AtomicU64::new(0),
        }
    }

    pub fn machine(&self) -> &Arc<NavigationStateMachine> {
        &self.machine
    }

    /// Look up the submitted destination code.
    ///
    /// Returns whether the code resolved. An unknown code sends the journey back
    /// to destination input; a directory failure leaves the state as it was.
    pub async fn resolve_destination(&self) -> Result<bool> {
        let ctx = self.machine.context().await;
        let code = ctx.destination_code.ok_or(GuidanceError::NoDestination)?;

        match self.providers.directory.lookup(&code).await {
            Ok(Some(destination)) => {
                info!(code = %code, destination = %destination.name, "Destination resolved");
                self.machine.accept_destination(destination).await;
                Ok(true)
            }
            Ok(None) => {
                warn!(code = %code, "Unknown destination code");
                self.machine.validate_destination(false).await;
                Ok(false)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Destination lookup failed");
                Err(e.into())
            }
        }
    }

    /// Fetch the walking route and landmarks from `origin`.
    pub async fn start(&self, origin: Coordinate) -> Result<RouteStatus> {
        let status = self.load_route(origin).await?;
        if status != RouteStatus::Superseded {
            self.load_landmarks(origin).await;
        }
        Ok(status)
    }

    /// Fetch the walking route from `origin` to the destination.
    pub async fn load_route(&self, origin: Coordinate) -> Result<RouteStatus> {
        let destination = self
            .machine
            .context()
            .await
            .destination
            .ok_or(GuidanceError::NoDestination)?;

        let sequence = self.route_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self
            .providers
            .directions
            .walking_route(origin, destination.coordinate)
            .await;

        if self.route_sequence.load(Ordering::SeqCst) != sequence {
            warn!(sequence, "Route response superseded, discarding");
            return Ok(RouteStatus::Superseded);
        }

        let route = match result {
            Ok(route) if !route.is_empty() => route,
            Ok(_) => {
                warn!(provider = self.providers.directions.id(), "Route has no steps, using straight-line guidance");
                self.fail_route().await;
                return Ok(RouteStatus::Unavailable);
            }
            Err(e) => {
                warn!(
                    provider = self.providers.directions.id(),
                    error = %e,
                    "Route fetch failed, using straight-line guidance"
                );
                self.fail_route().await;
                return Ok(RouteStatus::Unavailable);
            }
        };

        let path = decode_path(&route.encoded_path);
        if path.is_empty() {
            warn!("Route path unusable, landmarks will be narrated around the walker");
        }

        let status = RouteStatus::Loaded {
            steps: route.steps.len(),
            path_points: path.len(),
        };
        let total_distance_m = route.total_distance_m();
        info!(
            steps = route.steps.len(),
            path_points = path.len(),
            total_distance_m,
            "Route loaded"
        );

        *self.route.write().await = Some(LoadedRoute {
            steps: route.steps,
            path,
            total_distance_m,
        });
        self.invalidate_landmarks().await;
        self.engine.lock().await.reset();
        self.machine.set_routing_failed(false).await;

        Ok(status)
    }

    async fn fail_route(&self) {
        *self.route.write().await = None;
        self.invalidate_landmarks().await;
        self.machine.set_routing_failed(true).await;
    }

    /// Forget landmarks of the previous route and supersede in-flight searches.
    async fn invalidate_landmarks(&self) {
        let mut landmarks = self.landmarks.write().await;
        self.landmark_sequence.fetch_add(1, Ordering::SeqCst);
        landmarks.clear();
    }

    /// Find landmarks along the route path, or around `around` when there is no path.
    ///
    /// Returns `None` when a newer request superseded this one.
    pub async fn load_landmarks(&self, around: Coordinate) -> Option<LandmarkReport> {
        let sequence = self.landmark_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self
            .route
            .read()
            .await
            .as_ref()
            .map(|r| r.path.clone())
            .unwrap_or_default();
        let radius = self.config.landmarks.search_radius_m;

        let report = if path.is_empty() {
            let landmarks = match self.sampler.landmarks_near_point(around, radius).await {
                Ok(landmarks) => landmarks,
                Err(e) => {
                    warn!(error = %e, "Nearby landmark search failed");
                    Vec::new()
                }
            };
            let language = self.machine.language().await;
            LandmarkReport {
                narration: Some(self.sampler.describe_landmarks(&landmarks, language)),
                landmarks,
                along_route: false,
            }
        } else {
            LandmarkReport {
                landmarks: self.sampler.extract_landmarks_along_route(&path, radius).await,
                along_route: true,
                narration: None,
            }
        };

        let mut committed = self.landmarks.write().await;
        if self.landmark_sequence.load(Ordering::SeqCst) != sequence {
            warn!(sequence, "Landmark response superseded, discarding");
            return None;
        }

        *committed = report.landmarks.clone();
        Some(report)
    }

    /// Landmarks from the latest completed search for the current route.
    pub async fn landmarks(&self) -> Vec<Landmark> {
        self.landmarks.read().await.clone()
    }

    /// Process one GPS sample.
    ///
    /// Samples are handled one at a time, in arrival order.
    pub async fn handle_position(&self, position: Coordinate) -> Result<GuidanceUpdate> {
        let mut engine = self.engine.lock().await;

        if self.machine.phase().await != NavigationPhase::Navigating {
            debug!("Position ignored outside navigation");
            return Ok(GuidanceUpdate::Idle);
        }

        let ctx = self.machine.context().await;
        let destination = ctx.destination.ok_or(GuidanceError::NoDestination)?;
        let language = ctx.language;
        let distance = distance_meters(&position, &destination.coordinate);

        if !self.machine.record_navigation_fix(position, distance).await {
            debug!("Position ignored, navigation ended");
            return Ok(GuidanceUpdate::Idle);
        }
        debug!(distance_m = distance, "Position recorded");

        if engine.is_arrival(distance) && self.machine.confirm_arrival().await {
            let text = arrival(Some(&destination.name), language);
            engine.announce_text(&text);
            info!(destination = %destination.name, "Arrived");
            return Ok(GuidanceUpdate::Arrived { text });
        }

        if engine.observe_distance(distance) {
            let text = turn_around(language);
            let announcement = engine.announce_text(&text);
            return Ok(GuidanceUpdate::TurnAround { text, announcement });
        }

        let route = self.route.read().await;
        if let Some(route) = route.as_ref().filter(|_| !ctx.routing_failed) {
            if let Some(location) = locate_current_step(&route.steps, &position, route.total_distance_m) {
                let instruction = engine.instruction_at(&route.steps, &location, language);
                let announcement = engine.announce(&instruction, &location);
                return Ok(GuidanceUpdate::Instruction {
                    instruction,
                    announcement,
                });
            }
        }

        let eta_minutes = self.walking_minutes(distance);
        Ok(GuidanceUpdate::StraightLine {
            distance_m: distance,
            eta_minutes,
            text: straight_line(distance, eta_minutes, language),
        })
    }

    /// Live location became unavailable; narrate the destination instead.
    pub async fn handle_location_unavailable(&self) -> Result<GuidanceUpdate> {
        let mut engine = self.engine.lock().await;

        self.machine.set_location_unavailable(true).await;
        engine.reset();

        let ctx = self.machine.context().await;
        let destination = ctx.destination.ok_or(GuidanceError::NoDestination)?;
        let text = static_narration(&destination, ctx.language);
        warn!(destination = %destination.name, "Location unavailable, static narration");

        Ok(GuidanceUpdate::Static { text })
    }

    fn walking_minutes(&self, distance_m: f64) -> u64 {
        let speed = self.config.session.walking_speed_mps.max(0.1);
        ((distance_m / speed) / 60.0).ceil().max(1.0) as u64
    }
}
