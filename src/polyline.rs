//! # Polyline Encoding
//!
//! Lossless compact encoding of coordinate sequences for the static map
//! service's `path=` parameter.
//!
//! ## Algorithm
//! 1. Each coordinate is taken as a delta from the previous point (the first
//!    point is relative to `(0, 0)`).
//! 2. The delta is scaled by `1e5` and rounded to an integer.
//! 3. Zig-zag: shift left one bit, complement if negative, so small negative
//!    and small positive values both stay small.
//! 4. The value is emitted in 5-bit chunks, least significant first, with
//!    `0x20` set on every chunk except the last.
//! 5. Every chunk is offset by 63 into printable ASCII.
//!
//! Encoded paths carry the `enc:` prefix so the service can tell them apart
//! from a literal `lat,lng|lat,lng` list.
//!
//! Reference: [Encoded Polyline Algorithm Format](https://developers.google.com/maps/documentation/utilities/polylinealgorithm)

use crate::LatLng;

/// Prefix marking an encoded point list.
pub const ENCODED_PREFIX: &str = "enc:";

const SCALE: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: i64 = 63;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a single value (typically a delta) without any prefix.
///
/// The complement step keys on the sign of the *rounded* value. A negative
/// value that rounds to zero, i.e. one in `(-0.000005, 0)`, therefore encodes as
/// `?`, the same as zero. Keying on the sign of the input instead would emit
/// `>`, which lies outside the encoding alphabet. Every other value encodes
/// identically under both rules.
///
/// # Example
/// ```
/// use static_map_url::polyline::encode_value;
///
/// assert_eq!(encode_value(0.0), "?");
/// assert_eq!(encode_value(-179.9832104), "`~oia@");
/// ```
pub fn encode_value(value: f64) -> String {
    let mut out = String::new();
    push_value(&mut out, value);
    out
}

/// Encode a latitude delta followed by a longitude delta.
pub fn encode_lat_lng(d_lat: f64, d_lng: f64) -> String {
    let mut out = String::new();
    push_value(&mut out, d_lat);
    push_value(&mut out, d_lng);
    out
}

/// Encode an ordered point sequence as an `enc:`-prefixed polyline.
///
/// An empty sequence yields just the prefix.
///
/// # Example
/// ```
/// use static_map_url::{polyline, LatLng};
///
/// assert_eq!(polyline::encode(&[]), "enc:");
/// assert_eq!(polyline::encode(&[LatLng::new(1.0, 1.0)]), "enc:_ibE_ibE");
/// ```
pub fn encode(points: &[LatLng]) -> String {
    let mut out = String::with_capacity(ENCODED_PREFIX.len() + points.len() * 8);
    out.push_str(ENCODED_PREFIX);

    let mut last_lat = 0.0;
    let mut last_lng = 0.0;
    for p in points {
        push_value(&mut out, p.latitude - last_lat);
        push_value(&mut out, p.longitude - last_lng);
        last_lat = p.latitude;
        last_lng = p.longitude;
    }

    out
}

fn push_value(out: &mut String, value: f64) {
    let rounded = round_half_up(value * SCALE);
    let mut num = rounded << 1;
    // Sign is taken from the rounded value: deltas below the 1e-5 resolution
    // encode as zero regardless of sign.
    if rounded < 0 {
        num = !num;
    }

    while num > CHUNK_MASK {
        out.push(to_char((num & CHUNK_MASK) | CONTINUATION));
        num >>= CHUNK_BITS;
    }
    out.push(to_char(num));
}

#[inline]
fn to_char(chunk: i64) -> char {
    // chunk is in 0..=63 so the result stays within '?'..='~'
    char::from((chunk + ASCII_OFFSET) as u8)
}

/// Round to nearest, ties towards positive infinity (`-2.5 -> -2`, `2.5 -> 3`).
#[inline]
fn round_half_up(v: f64) -> i64 {
    let floor = v.floor();
    if v - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a polyline back into points. The `enc:` prefix is optional.
///
/// Returns `None` if the input is truncated or contains characters outside
/// the encoding alphabet.
///
/// # Example
/// ```
/// use static_map_url::{polyline, LatLng};
///
/// let points = polyline::decode("enc:_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(points.len(), 3);
/// assert_eq!(points[2], LatLng::new(43.252, -126.453));
/// ```
pub fn decode(encoded: &str) -> Option<Vec<LatLng>> {
    let body = encoded.strip_prefix(ENCODED_PREFIX).unwrap_or(encoded);
    let mut bytes = body.bytes().peekable();
    let mut points = Vec::new();
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while bytes.peek().is_some() {
        lat += read_value(&mut bytes)?;
        lng += read_value(&mut bytes)?;
        points.push(LatLng::new(lat as f64 / SCALE, lng as f64 / SCALE));
    }

    Some(points)
}

/// Decode a single encoded value into its scaled integer (`round(v * 1e5)`).
///
/// Returns `None` unless the input is exactly one complete value.
pub fn decode_value(encoded: &str) -> Option<i64> {
    let mut bytes = encoded.bytes();
    let value = read_value(&mut bytes)?;
    if bytes.next().is_some() {
        return None;
    }
    Some(value)
}

fn read_value(bytes: &mut impl Iterator<Item = u8>) -> Option<i64> {
    let raw = read_raw_value(bytes)?;
    Some(if raw & 1 == 1 { !(raw >> 1) } else { raw >> 1 })
}

fn read_raw_value(bytes: &mut impl Iterator<Item = u8>) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let byte = bytes.next()?;
        if !(63..=126).contains(&byte) || shift > 60 {
            return None;
        }
        let chunk = byte as i64 - ASCII_OFFSET;
        result |= (chunk & CHUNK_MASK) << shift;
        if chunk & CONTINUATION == 0 {
            return Some(result);
        }
        shift += CHUNK_BITS;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_value_small_values() {
        assert_eq!(encode_value(0.0), "?");
        assert_eq!(encode_value(0.00001), "A");
        assert_eq!(encode_value(-0.00001), "@");
        assert_eq!(encode_value(1.0), "_ibE");
        assert_eq!(encode_value(180.0), "_gsia@");
    }

    #[test]
    fn test_encoded_length_grows_with_magnitude() {
        let lengths: Vec<usize> = [0.0, 0.00001, 1.0, 180.0]
            .iter()
            .map(|v| encode_value(*v).len())
            .collect();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]), "{:?}", lengths);
    }

    #[test]
    fn test_zig_zag_sign_recovered() {
        let pos = encode_value(0.00001);
        let neg = encode_value(-0.00001);
        assert_ne!(pos, neg);
        assert_eq!(decode_value(&pos), Some(1));
        assert_eq!(decode_value(&neg), Some(-1));

        assert_eq!(decode_value(&encode_value(-179.9832104)), Some(-17998321));
        assert_eq!(decode_value(&encode_value(123.45678)), Some(12345678));
    }

    #[test]
    fn test_rounding_ties_go_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        // Sub-resolution negative deltas encode as zero
        assert_eq!(encode_value(-0.000004), "?");
    }

    #[test]
    fn test_encode_lat_lng_concatenates() {
        assert_eq!(encode_lat_lng(1.0, -0.00001), "_ibE@");
    }

    #[test]
    fn test_encode_reference_polyline() {
        let points = vec![
            LatLng::new(38.5, -120.2),
            LatLng::new(40.7, -120.95),
            LatLng::new(43.252, -126.453),
        ];
        assert_eq!(encode(&points), "enc:_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_encode_empty_and_single() {
        assert_eq!(encode(&[]), "enc:");
        assert_eq!(encode(&[LatLng::new(1.0, 1.0)]), "enc:_ibE_ibE");
        assert_eq!(
            encode(&[LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)]),
            "enc:_ibE_ibE_ibE_ibE"
        );
    }

    #[test]
    fn test_decode_inverts_encode() {
        let points = vec![
            LatLng::new(51.5074, -0.1278),
            LatLng::new(51.508, -0.129),
            LatLng::new(12.34567, -45.6789),
        ];
        let decoded = decode(&encode(&points)).unwrap();
        assert_eq!(decoded.len(), points.len());
        for (a, b) in decoded.iter().zip(&points) {
            assert!((a.latitude - b.latitude).abs() < 1e-9);
            assert!((a.longitude - b.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        // Lat without lng
        assert!(decode("enc:_ibE").is_none());
        // Dangling continuation chunk
        assert!(decode("_").is_none());
        // Outside the alphabet
        assert!(decode("enc: !").is_none());
        assert!(decode_value("??").is_none());
        assert_eq!(decode("enc:"), Some(vec![]));
    }
}
