//! Geodesy - geospatial primitives for pedestrian guidance
//!
//! Pure functions with no state:
//!
//! - [`distance_meters`]: haversine great-circle distance on a spherical Earth
//! - [`decode_path`] / [`encode_path`]: the Google encoded polyline scheme (precision 1e-5)
//! - [`initial_bearing`] and [`path_length`] helpers used by route sampling
//!
//! # Example
//!
//! ```
//! use geodesy::{decode_path, distance_meters};
//!
//! let path = decode_path("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//! assert_eq!(path.len(), 3);
//! assert!(distance_meters(&path[0], &path[1]) > 0.0);
//! ```

pub mod coordinate;
pub mod distance;
pub mod polyline;

pub use coordinate::Coordinate;
pub use distance::{distance_meters, initial_bearing, path_length, EARTH_RADIUS_M};
pub use polyline::{decode_path, encode_path, try_decode_path, PolylineError};
