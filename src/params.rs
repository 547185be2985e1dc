//! Sparse query-string serialization of the viewport parameters.

use std::fmt;

use crate::LatLng;

/// Largest image side for standard service keys, in pixels.
pub const STANDARD_MAX_SIZE: u32 = 640;
/// Largest image side for premium service keys, in pixels.
pub const PREMIUM_MAX_SIZE: u32 = 2048;

/// Requested image size in pixels, serialized as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl MapSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of a map element clamped to the service maximum for the key tier.
    pub fn clamped(width: u32, height: u32, premium: bool) -> Self {
        let max = if premium { PREMIUM_MAX_SIZE } else { STANDARD_MAX_SIZE };
        Self::new(width.min(max), height.min(max))
    }
}

impl fmt::Display for MapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Scalar viewport parameters. `None` fields are left out of the URL.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportParams {
    pub size: Option<MapSize>,
    pub zoom: Option<i32>,
    /// Lowercase map type token (`roadmap`, `satellite`, `hybrid`, `terrain`)
    pub map_type: Option<String>,
    pub center: Option<LatLng>,
}

impl Default for ViewportParams {
    fn default() -> Self {
        Self {
            size: Some(MapSize::new(300, 300)),
            zoom: Some(12),
            map_type: Some("roadmap".to_string()),
            center: None,
        }
    }
}

impl ViewportParams {
    /// Parameters in URL order: `size`, `zoom`, `maptype`, `center`.
    pub fn to_params(&self) -> UrlParams {
        let mut params = UrlParams::new();
        params.insert("size", self.size.map(|s| s.to_string()));
        params.insert("zoom", self.zoom.map(|z| z.to_string()));
        params.insert("maptype", self.map_type.clone());
        params.insert("center", self.center.map(|c| c.to_url_string()));
        params
    }
}

/// Ordered parameter mapping with omit-if-absent serialization.
///
/// Insertion order is the output order. Re-inserting a key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParams {
    entries: Vec<(String, Option<String>)>,
}

impl UrlParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// `&key=value` for every present value, in insertion order.
    pub fn to_query(&self) -> String {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| format!("&{}={}", k, v)))
            .collect()
    }
}

/// Serialize viewport parameters as a sparse query-string fragment.
///
/// # Example
/// ```
/// use static_map_url::{to_url_params, LatLng, MapSize, ViewportParams};
///
/// let params = ViewportParams {
///     size: Some(MapSize::new(300, 300)),
///     zoom: Some(12),
///     map_type: None,
///     center: Some(LatLng::new(10.0, 20.0)),
/// };
/// assert_eq!(to_url_params(&params), "&size=300x300&zoom=12&center=10,20");
/// ```
pub fn to_url_params(params: &ViewportParams) -> String {
    params.to_params().to_query()
}
