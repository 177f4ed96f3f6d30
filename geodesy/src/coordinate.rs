//! WGS84 coordinate type.
//!
//! With the `typescript` feature enabled, [`Coordinate`] is exported through ts-rs
//! so the map overlay speaks the same shape as the engine.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Coordinate {
    /// Latitude in degrees, positive north
    pub latitude: f64,
    /// Longitude in degrees, positive east
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Snap to a grid of `decimals` decimal places.
    ///
    /// Three decimals is roughly a 100 m cell, which is what landmark identity uses.
    pub fn grid_key(&self, decimals: u32) -> (i64, i64) {
        let scale = 10f64.powi(decimals as i32);
        (
            (self.latitude * scale).round() as i64,
            (self.longitude * scale).round() as i64,
        )
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(Coordinate::new(6.5244, 3.3792).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_grid_key_rounds_to_cell() {
        let a = Coordinate::new(6.52431, 3.37921);
        let b = Coordinate::new(6.52449, 3.37938);
        assert_eq!(a.grid_key(3), b.grid_key(3));
        assert_eq!(a.grid_key(3), (6524, 3379));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Coordinate::new(1.5, -2.25)).unwrap();
        assert_eq!(json, serde_json::json!({"latitude": 1.5, "longitude": -2.25}));
    }
}
