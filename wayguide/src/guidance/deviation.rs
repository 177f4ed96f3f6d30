//! Wrong-direction detection with hysteresis.

use tracing::debug;

/// Flags a walker moving away from the destination.
///
/// Raised when the distance to the destination grows by at least `raise_m`
/// between two consecutive samples; cleared once it has fallen at least
/// `clear_m` below the distance at which it was raised.
#[derive(Debug, Clone)]
pub struct DeviationDetector {
    raise_m: f64,
    clear_m: f64,
    previous_m: Option<f64>,
    raised_at_m: Option<f64>,
}

impl DeviationDetector {
    pub fn new(raise_m: f64, clear_m: f64) -> Self {
        Self {
            raise_m,
            clear_m,
            previous_m: None,
            raised_at_m: None,
        }
    }

    /// Feed one distance-to-destination sample; returns whether the flag is raised.
    pub fn observe(&mut self, distance_m: f64) -> bool {
        match (self.raised_at_m, self.previous_m) {
            (Some(raised_at), _) => {
                if raised_at - distance_m >= self.clear_m {
                    debug!(distance_m, raised_at, "Deviation cleared");
                    self.raised_at_m = None;
                }
            }
            (None, Some(previous)) if distance_m - previous >= self.raise_m => {
                debug!(distance_m, previous, "Deviation raised");
                self.raised_at_m = Some(distance_m);
            }
            _ => {}
        }

        self.previous_m = Some(distance_m);
        self.is_deviating()
    }

    pub fn is_deviating(&self) -> bool {
        self.raised_at_m.is_some()
    }

    /// Forget history, e.g. when a new route is loaded.
    pub fn reset(&mut self) {
        self.previous_m = None;
        self.raised_at_m = None;
    }
}

impl Default for DeviationDetector {
    fn default() -> Self {
        Self::new(20.0, 10.0)
    }
}
