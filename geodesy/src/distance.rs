//! Great-circle distance on a spherical Earth.

use crate::Coordinate;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates in meters.
///
/// Symmetric, and exactly zero for identical points.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` to `b` in degrees, in `[0, 360)`.
pub fn initial_bearing(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Total length of a polyline in meters.
pub fn path_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_meters(&pair[0], &pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn test_identical_points_are_zero() {
        let a = pt(6.5244, 3.3792);
        assert_eq!(distance_meters(&a, &a), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (pt(6.5244, 3.3792), pt(6.4550, 3.3841)),
            (pt(48.8566, 2.3522), pt(40.4168, -3.7038)),
            (pt(-33.8688, 151.2093), pt(51.5074, -0.1278)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_meters(&a, &b), distance_meters(&b, &a));
        }
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree along a meridian is R * pi / 180
        let d = distance_meters(&pt(0.0, 0.0), &pt(1.0, 0.0));
        let expected = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-6, "got {d}, expected {expected}");
    }

    #[test]
    fn test_known_city_pair() {
        // Paris to London is roughly 343.5 km on a 6371 km sphere
        let d = distance_meters(&pt(48.8566, 2.3522), &pt(51.5074, -0.1278));
        assert!((d - 343_556.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn test_bearing_cardinals() {
        let north = initial_bearing(&pt(0.0, 0.0), &pt(1.0, 0.0));
        let east = initial_bearing(&pt(0.0, 0.0), &pt(0.0, 1.0));
        let west = initial_bearing(&pt(0.0, 0.0), &pt(0.0, -1.0));
        assert!(north.abs() < 1e-9);
        assert!((east - 90.0).abs() < 1e-9);
        assert!((west - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_length() {
        let points = [pt(0.0, 0.0), pt(0.001, 0.0), pt(0.002, 0.0)];
        let total = path_length(&points);
        let direct = distance_meters(&points[0], &points[2]);
        assert!((total - direct).abs() < 1e-6);
        assert_eq!(path_length(&points[..1]), 0.0);
    }
}
