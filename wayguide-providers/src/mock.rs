//! Mock providers for testing.
//!
//! Configurable responses, failures and delays so the guidance engine can be
//! exercised without network access.

use async_trait::async_trait;
use geodesy::{distance_meters, Coordinate};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::traits::*;
use crate::types::{Destination, LandmarkCategory, PlaceCandidate, RouteResponse};

/// Scripted directions provider.
///
/// Queued responses are served first, each after its delay; once the queue is
/// empty the default route (if any) is returned.
pub struct MockDirections {
    default_route: Option<RouteResponse>,
    scripted: Mutex<VecDeque<(Result<RouteResponse, ProviderError>, Duration)>>,
    available: AtomicBool,
    call_count: AtomicU32,
}

impl MockDirections {
    pub fn new() -> Self {
        Self {
            default_route: None,
            scripted: Mutex::new(VecDeque::new()),
            available: AtomicBool::new(true),
            call_count: AtomicU32::new(0),
        }
    }

    /// Route returned whenever nothing is scripted.
    pub fn with_route(mut self, route: RouteResponse) -> Self {
        self.default_route = Some(route);
        self
    }

    /// Queue a one-shot response served after `delay`.
    pub fn with_scripted(
        self,
        response: Result<RouteResponse, ProviderError>,
        delay: Duration,
    ) -> Self {
        if let Ok(mut queue) = self.scripted.lock() {
            queue.push_back((response, delay));
        }
        self
    }

    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockDirections {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectionsProvider for MockDirections {
    fn id(&self) -> &str {
        "mock-directions"
    }

    async fn walking_route(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
    ) -> Result<RouteResponse, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if !self.available.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("Mock directions disabled".to_string()));
        }

        let scripted = self
            .scripted
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        match scripted {
            Some((response, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => self.default_route.clone().ok_or(ProviderError::NoRoute),
        }
    }
}

/// Places provider over a fixed set of candidates.
///
/// Candidates are registered per category; queries return those within the
/// requested radius. Uncategorized queries see every candidate.
pub struct MockPlaces {
    places: HashMap<LandmarkCategory, Vec<PlaceCandidate>>,
    failing: HashSet<LandmarkCategory>,
    fail_uncategorized: bool,
    delay: Duration,
    queries: Mutex<Vec<(Coordinate, Option<LandmarkCategory>)>>,
}

impl MockPlaces {
    pub fn new() -> Self {
        Self {
            places: HashMap::new(),
            failing: HashSet::new(),
            fail_uncategorized: false,
            delay: Duration::ZERO,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_place(mut self, category: LandmarkCategory, place: PlaceCandidate) -> Self {
        self.places.entry(category).or_default().push(place);
        self
    }

    /// Make queries for `category` fail.
    pub fn with_failure(mut self, category: LandmarkCategory) -> Self {
        self.failing.insert(category);
        self
    }

    /// Make uncategorized queries fail.
    pub fn with_uncategorized_failure(mut self) -> Self {
        self.fail_uncategorized = true;
        self
    }

    /// Answer every query after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every query made so far, in order.
    pub fn queries(&self) -> Vec<(Coordinate, Option<LandmarkCategory>)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Default for MockPlaces {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlacesProvider for MockPlaces {
    fn id(&self) -> &str {
        "mock-places"
    }

    async fn nearby(
        &self,
        point: Coordinate,
        radius_m: f64,
        category: Option<LandmarkCategory>,
    ) -> Result<Vec<PlaceCandidate>, ProviderError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((point, category));
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let within = |p: &&PlaceCandidate| distance_meters(&point, &p.coordinate) <= radius_m;

        match category {
            Some(category) if self.failing.contains(&category) => Err(
                ProviderError::RequestFailed(format!("{} search failed", category.as_str())),
            ),
            Some(category) => Ok(self
                .places
                .get(&category)
                .map(|places| places.iter().filter(within).cloned().collect())
                .unwrap_or_default()),
            None if self.fail_uncategorized => {
                Err(ProviderError::Unavailable("Mock places disabled".to_string()))
            }
            None => Ok(LandmarkCategory::PRIORITY
                .iter()
                .filter_map(|c| self.places.get(c))
                .flatten()
                .filter(within)
                .cloned()
                .collect()),
        }
    }
}

/// Destination directory over a fixed code table.
pub struct MockDirectory {
    destinations: HashMap<String, Destination>,
    available: AtomicBool,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            destinations: HashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    pub fn with_destination(mut self, code: impl Into<String>, destination: Destination) -> Self {
        self.destinations.insert(code.into(), destination);
        self
    }

    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DestinationDirectory for MockDirectory {
    async fn lookup(&self, code: &str) -> Result<Option<Destination>, ProviderError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("Mock directory disabled".to_string()));
        }
        Ok(self.destinations.get(code.trim()).cloned())
    }
}
