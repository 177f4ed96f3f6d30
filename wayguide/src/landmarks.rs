//! LandmarkSampler - points of interest along a route.
//!
//! The route's decoded path is thinned to one point per sampling interval, and
//! the places provider is asked about each sample, category by category in
//! priority order. Results are deduplicated by name within a pass and by
//! (name, ~100 m cell) at the end.

use geodesy::{distance_meters, Coordinate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use wayguide_providers::{Landmark, LandmarkCategory, PlacesProvider};

use crate::config::LandmarkConfig;
use crate::localizer::{landmark_narration, Language};
use crate::types::Result;

/// Thin `points` to one per `interval_m` of straight-line travel.
///
/// A point is emitted once the distance accumulated since the last emission
/// reaches the interval. The final point is always included, exactly once.
pub fn sample_route_points(points: &[Coordinate], interval_m: f64) -> Vec<Coordinate> {
    let Some(last) = points.last() else {
        return Vec::new();
    };

    let mut samples = Vec::new();
    let mut accumulated = 0.0;
    let mut last_emitted = None;

    for (i, pair) in points.windows(2).enumerate() {
        accumulated += distance_meters(&pair[0], &pair[1]);
        if accumulated >= interval_m {
            samples.push(pair[1]);
            last_emitted = Some(i + 1);
            accumulated = 0.0;
        }
    }

    if last_emitted != Some(points.len() - 1) {
        samples.push(*last);
    }
    samples
}

/// Collapse landmarks sharing a lowercased name and a 0.001 degree cell.
///
/// First occurrence wins.
pub fn dedupe_landmarks(landmarks: Vec<Landmark>) -> Vec<Landmark> {
    let mut seen = HashSet::new();
    landmarks
        .into_iter()
        .filter(|l| seen.insert(l.identity_key()))
        .collect()
}

/// Landmark discovery over a places provider.
pub struct LandmarkSampler {
    places: Arc<dyn PlacesProvider>,
    config: LandmarkConfig,
}

impl LandmarkSampler {
    pub fn new(places: Arc<dyn PlacesProvider>) -> Self {
        Self::with_config(places, LandmarkConfig::default())
    }

    pub fn with_config(places: Arc<dyn PlacesProvider>, config: LandmarkConfig) -> Self {
        Self { places, config }
    }

    pub fn config(&self) -> &LandmarkConfig {
        &self.config
    }

    /// Landmarks along a route path, at most `max_landmarks` before the final dedup.
    ///
    /// Provider failures are logged per sample point and category, then skipped.
    pub async fn extract_landmarks_along_route(
        &self,
        points: &[Coordinate],
        search_radius_m: f64,
    ) -> Vec<Landmark> {
        let samples = sample_route_points(points, self.config.sample_interval_m);
        let max = self.config.max_landmarks;

        let mut collected: Vec<Landmark> = Vec::new();
        let mut seen_names: HashSet<String> = HashSet::new();

        'samples: for point in &samples {
            for category in LandmarkCategory::PRIORITY {
                if collected.len() >= max {
                    break 'samples;
                }

                let candidates = match self.places.nearby(*point, search_radius_m, Some(category)).await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        warn!(
                            provider = self.places.id(),
                            category = category.as_str(),
                            latitude = point.latitude,
                            longitude = point.longitude,
                            error = %e,
                            "Landmark search failed"
                        );
                        continue;
                    }
                };

                for candidate in candidates {
                    if collected.len() >= max {
                        break;
                    }
                    if !seen_names.insert(candidate.name.clone()) {
                        continue;
                    }
                    let distance = distance_meters(point, &candidate.coordinate);
                    collected.push(Landmark::from_candidate(candidate, category).with_distance(distance));
                }
            }
        }

        let landmarks = dedupe_landmarks(collected);
        info!(
            samples = samples.len(),
            landmarks = landmarks.len(),
            "Route landmarks extracted"
        );
        landmarks
    }

    /// Landmarks around a single point, classified by their type tags.
    pub async fn landmarks_near_point(
        &self,
        point: Coordinate,
        search_radius_m: f64,
    ) -> Result<Vec<Landmark>> {
        let candidates = self.places.nearby(point, search_radius_m, None).await?;
        debug!(candidates = candidates.len(), "Nearby places fetched");

        Ok(candidates
            .into_iter()
            .take(self.config.near_point_limit)
            .map(|candidate| {
                let category = LandmarkCategory::classify(&candidate.types);
                let distance = distance_meters(&point, &candidate.coordinate);
                Landmark::from_candidate(candidate, category).with_distance(distance)
            })
            .collect())
    }

    /// Narration for a set of landmarks.
    pub fn describe_landmarks(&self, landmarks: &[Landmark], language: Language) -> String {
        landmark_narration(landmarks, language)
    }
}
