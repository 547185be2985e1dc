//! # Static Map URL
//!
//! Builds request URLs for a static map image service from the state of a
//! live interactive map: its viewport, its point markers and an optional route.
//!
//! This library provides:
//! - Polyline encoding (differential, zig-zag, 5-bit chunked) for coordinate sequences
//! - Marker grouping that coalesces markers with identical style into one `markers=` parameter
//! - Sparse query-string serialization of viewport, marker and path parameters
//! - An async builder that waits (bounded, cancellable) for a route to resolve
//!
//! ## Features
//!
//! - **`serde`** - Serde derives on configs, markers and directions
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use static_map_url::{group_markers, polyline, LatLng, Marker, MarkerStyle};
//!
//! let encoded = polyline::encode(&[
//!     LatLng::new(38.5, -120.2),
//!     LatLng::new(40.7, -120.95),
//!     LatLng::new(43.252, -126.453),
//! ]);
//! assert_eq!(encoded, "enc:_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//!
//! let red = MarkerStyle { color: Some("red".into()), ..Default::default() };
//! let markers = vec![
//!     Marker::new(LatLng::new(1.0, 1.0), red.clone()),
//!     Marker::new(LatLng::new(2.0, 2.0), MarkerStyle::default()),
//!     Marker::new(LatLng::new(3.0, 3.0), red),
//! ];
//! let groups = group_markers(&markers);
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[0].len(), 2);
//! ```

pub mod builder;
pub mod error;
pub mod markers;
pub mod params;
pub mod polyline;
pub mod route;

pub use builder::{LiveMap, StaticMapBuilder, StaticMapConfig};
pub use error::{Error, Result};
pub use markers::{
    group_markers, group_to_url_param, LiveMarker, Marker, MarkerGroup, MarkerOptions, MarkerSet,
    MarkerStyle,
};
pub use params::{to_url_params, MapSize, UrlParams, ViewportParams};
pub use route::{assemble_path, Directions, DirectionsRenderer, DirectionsRoute, StaticRoute};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("StaticMapUrlRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use static_map_url::LatLng;
/// let point = LatLng::new(51.5074, -0.1278); // London
/// assert_eq!(point.to_url_string(), "51.5074,-0.1278");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Format as `"lat,lng"`, the service's literal coordinate form.
    ///
    /// Numbers are printed the way a browser prints them: integral values
    /// carry no fractional part and negative zero prints as `0`.
    pub fn to_url_string(&self) -> String {
        let mut buf = ryu_js::Buffer::new();
        let mut out = String::with_capacity(24);
        out.push_str(buf.format(positive_zero(self.latitude)));
        out.push(',');
        out.push_str(buf.format(positive_zero(self.longitude)));
        out
    }
}

#[inline]
fn positive_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl From<geo::Coord> for LatLng {
    fn from(c: geo::Coord) -> Self {
        Self::new(c.y, c.x)
    }
}

impl From<LatLng> for geo::Coord {
    fn from(p: LatLng) -> Self {
        geo::Coord { x: p.longitude, y: p.latitude }
    }
}

/// Join points as the verbatim `lat,lng|lat,lng|...` representation.
pub fn points_to_url_string(points: &[LatLng]) -> String {
    points
        .iter()
        .map(LatLng::to_url_string)
        .collect::<Vec<_>>()
        .join("|")
}

// ============================================================================
// FFI Exports (only compiled when "ffi" feature is enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Snapshot of the live map, for callers that cannot implement [`LiveMap`].
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiMapSnapshot {
        pub width: u32,
        pub height: u32,
        pub zoom: i32,
        pub center: LatLng,
        pub map_type: String,
    }

    impl LiveMap for FfiMapSnapshot {
        fn div_size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn zoom(&self) -> i32 {
            self.zoom
        }

        fn center(&self) -> LatLng {
            self.center
        }

        fn map_type_id(&self) -> String {
            self.map_type.clone()
        }
    }

    /// Flattened marker group for FFI: shared style plus member locations.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiMarkerGroup {
        pub style: MarkerStyle,
        pub locations: Vec<LatLng>,
    }

    /// Encode points as an `enc:`-prefixed polyline.
    #[uniffi::export]
    pub fn ffi_encode_polyline(points: Vec<LatLng>) -> String {
        polyline::encode(&points)
    }

    /// Decode an encoded polyline. Returns an empty list for malformed input.
    #[uniffi::export]
    pub fn ffi_decode_polyline(encoded: String) -> Vec<LatLng> {
        polyline::decode(&encoded).unwrap_or_default()
    }

    /// Group markers by identical style.
    #[uniffi::export]
    pub fn ffi_group_markers(markers: Vec<Marker>) -> Vec<FfiMarkerGroup> {
        init_logging();
        group_markers(&markers)
            .into_iter()
            .map(|g| FfiMarkerGroup {
                style: g.style().clone(),
                locations: g.locations(),
            })
            .collect()
    }

    /// Build a static map URL from a map snapshot, markers and an optional
    /// already-resolved route path.
    #[uniffi::export]
    pub fn ffi_build_static_map_url(
        map: FfiMapSnapshot,
        markers: Vec<Marker>,
        route: Vec<LatLng>,
        config: StaticMapConfig,
    ) -> String {
        init_logging();
        info!(
            "[StaticMapUrlRust] build_static_map_url: {} markers, {} route points",
            markers.len(),
            route.len()
        );

        let mut builder = StaticMapBuilder::new(map, config);
        for marker in markers {
            builder.markers_mut().add_marker(marker);
        }
        builder.build_url_with_path(&route)
    }

    /// Get default builder configuration.
    #[uniffi::export]
    pub fn default_static_map_config() -> StaticMapConfig {
        StaticMapConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================
