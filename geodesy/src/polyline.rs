//! Encoded polyline codec.
//!
//! Each coordinate is stored as a signed delta from the previous one, scaled by 1e5,
//! zig-zag encoded and split into 5-bit groups offset by 63. Decoding accumulates
//! integers and divides once per point so the reference vectors come back exactly.

use crate::Coordinate;

const PRECISION: f64 = 1e5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION_BIT: i64 = 0x20;
const ASCII_OFFSET: i64 = 63;
/// Longest group run that still fits a scaled coordinate.
const MAX_SHIFT: u32 = 35;

/// Errors from strict polyline decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolylineError {
    /// Byte outside the encoding alphabet
    #[error("Invalid character {character:?} at offset {offset}")]
    InvalidCharacter { character: char, offset: usize },

    /// Input ended in the middle of a value or between latitude and longitude
    #[error("Truncated polyline at offset {offset}")]
    Truncated { offset: usize },

    /// Value ran for more groups than a coordinate can use
    #[error("Value overflow at offset {offset}")]
    Overflow { offset: usize },
}

/// Decode an encoded path, returning an empty list for malformed or empty input.
///
/// Callers treat an empty list as "no path available".
pub fn decode_path(encoded: &str) -> Vec<Coordinate> {
    try_decode_path(encoded).unwrap_or_default()
}

/// Decode an encoded path, reporting where malformed input went wrong.
pub fn try_decode_path(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while offset < bytes.len() {
        lat += next_value(bytes, &mut offset)?;
        if offset >= bytes.len() {
            return Err(PolylineError::Truncated { offset });
        }
        lon += next_value(bytes, &mut offset)?;

        points.push(Coordinate::new(
            lat as f64 / PRECISION,
            lon as f64 / PRECISION,
        ));
    }

    Ok(points)
}

fn next_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*offset) else {
            return Err(PolylineError::Truncated { offset: *offset });
        };
        let group = i64::from(byte) - ASCII_OFFSET;
        if !(0..64).contains(&group) {
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                offset: *offset,
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: *offset });
        }

        result |= (group & CHUNK_MASK) << shift;
        shift += 5;
        *offset += 1;

        if group & CONTINUATION_BIT == 0 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encode coordinates into the polyline format.
pub fn encode_path(points: &[Coordinate]) -> String {
    let mut encoded = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for point in points {
        let lat = (point.latitude * PRECISION).round() as i64;
        let lon = (point.longitude * PRECISION).round() as i64;
        push_value(&mut encoded, lat - prev_lat);
        push_value(&mut encoded, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    encoded
}

fn push_value(out: &mut String, value: i64) {
    let mut rest = if value < 0 { !(value << 1) } else { value << 1 };
    while rest >= CONTINUATION_BIT {
        out.push((((rest & CHUNK_MASK) | CONTINUATION_BIT) + ASCII_OFFSET) as u8 as char);
        rest >>= 5;
    }
    out.push((rest + ASCII_OFFSET) as u8 as char);
}
