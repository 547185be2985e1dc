//! Static map URL builder.
//!
//! Reads the live map's viewport, waits for an attached route to resolve
//! (adding `A`/`B` markers at its ends), then assembles
//! `base_url + viewport params + marker groups + path`.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{AbortRegistration, Abortable, Aborted};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::markers::{Marker, MarkerSet, MarkerStyle};
use crate::params::{MapSize, ViewportParams};
use crate::route::{
    assemble_path_with_style, simplify_path, DirectionsRenderer, StaticRoute, DEFAULT_PATH_STYLE,
};
use crate::LatLng;

/// The interactive map the static image mirrors. Never mutated by the builder.
pub trait LiveMap {
    /// Size of the map element in pixels (width, height).
    fn div_size(&self) -> (u32, u32);
    fn zoom(&self) -> i32;
    fn center(&self) -> LatLng;
    /// Map type id as reported by the map; lowercased before use.
    fn map_type_id(&self) -> String;
}

/// Configuration for static map URL building.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StaticMapConfig {
    /// Service endpoint including any fixed query parameters.
    /// Default: `http://maps.googleapis.com/maps/api/staticmap?sensor=false`
    pub base_url: String,

    /// Premium keys allow images up to 2048px per side instead of 640px.
    /// Default: false
    pub premium: bool,

    /// How often to check whether an attached route resolved.
    /// Default: 20ms
    pub poll_interval_ms: u64,

    /// Give up waiting for the route after this long.
    /// Default: 10000ms
    pub resolve_timeout_ms: u64,

    /// Color of the `A`/`B` markers placed at the route's ends.
    /// Default: "green"
    pub endpoint_color: String,

    /// Style prefix of the `path=` parameter.
    /// Default: "color:0xff0000ff|weight:3"
    pub path_style: String,

    /// Douglas-Peucker tolerance (degrees) applied to the route before
    /// encoding. `None` sends the route as-is.
    /// Default: None
    pub simplify_tolerance: Option<f64>,

    /// URL length above which a warning is logged (the service rejects longer URLs).
    /// Default: 8192
    pub max_url_length: u32,
}

impl Default for StaticMapConfig {
    fn default() -> Self {
        Self {
            base_url: "http://maps.googleapis.com/maps/api/staticmap?sensor=false".to_string(),
            premium: false,
            poll_interval_ms: 20,
            resolve_timeout_ms: 10_000,
            endpoint_color: "green".to_string(),
            path_style: DEFAULT_PATH_STYLE.to_string(),
            simplify_tolerance: None,
            max_url_length: 8192,
        }
    }
}

impl StaticMapConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}

/// Builds static map URLs for one live map.
pub struct StaticMapBuilder<M> {
    map: M,
    config: StaticMapConfig,
    params: ViewportParams,
    markers: MarkerSet,
    route: StaticRoute,
}

impl<M: LiveMap> StaticMapBuilder<M> {
    pub fn new(map: M, config: StaticMapConfig) -> Self {
        Self {
            map,
            config,
            params: ViewportParams::default(),
            markers: MarkerSet::new(),
            route: StaticRoute::new(),
        }
    }

    pub fn config(&self) -> &StaticMapConfig {
        &self.config
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Viewport parameters as of the last build.
    pub fn params(&self) -> &ViewportParams {
        &self.params
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut MarkerSet {
        &mut self.markers
    }

    pub fn route(&self) -> &StaticRoute {
        &self.route
    }

    pub fn route_mut(&mut self) -> &mut StaticRoute {
        &mut self.route
    }

    /// Attach the directions renderer whose route should be drawn.
    pub fn set_route_renderer(&mut self, renderer: Arc<dyn DirectionsRenderer>) {
        self.route.set_renderer(renderer);
    }

    /// Prepare the URL, waiting for an attached route to resolve first.
    ///
    /// If the route is still loading, the wait is bounded by
    /// `resolve_timeout_ms`; once it resolves, `A` and `B` markers are added at
    /// its origin and destination. The returned future yields exactly one URL.
    pub async fn prepare_url(&mut self) -> Result<String> {
        if self.route.is_set() && self.route.is_loading() {
            self.route
                .resolve(self.config.poll_interval(), self.config.resolve_timeout())
                .await?;
            self.add_endpoint_markers()?;
        }
        self.build_url()
    }

    /// [`prepare_url`](Self::prepare_url) that can be aborted through the
    /// matching `AbortHandle`.
    ///
    /// An aborted build returns [`Error::Cancelled`] and leaves the markers
    /// untouched.
    ///
    /// # Example
    /// ```
    /// use futures::future::AbortHandle;
    /// use static_map_url::{Error, LatLng, LiveMap, StaticMapBuilder, StaticMapConfig};
    ///
    /// struct Map;
    /// impl LiveMap for Map {
    ///     fn div_size(&self) -> (u32, u32) { (400, 300) }
    ///     fn zoom(&self) -> i32 { 10 }
    ///     fn center(&self) -> LatLng { LatLng::new(0.0, 0.0) }
    ///     fn map_type_id(&self) -> String { "roadmap".into() }
    /// }
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
    /// let mut builder = StaticMapBuilder::new(Map, StaticMapConfig::default());
    /// let (handle, registration) = AbortHandle::new_pair();
    /// handle.abort();
    /// let result = rt.block_on(builder.prepare_url_abortable(registration));
    /// assert_eq!(result, Err(Error::Cancelled));
    /// ```
    pub async fn prepare_url_abortable(&mut self, registration: AbortRegistration) -> Result<String> {
        match Abortable::new(self.prepare_url(), registration).await {
            Ok(result) => result,
            Err(Aborted) => {
                debug!("URL preparation aborted");
                Err(Error::Cancelled)
            }
        }
    }

    /// Build the URL from the current state without waiting.
    ///
    /// A route that is still loading contributes no `path=` parameter.
    pub fn build_url(&mut self) -> Result<String> {
        self.read_viewport();
        let path = self
            .route
            .to_url_param(&self.config.path_style, self.config.simplify_tolerance)?;
        Ok(self.compose_url(&path))
    }

    /// Build the URL with an already-resolved route path instead of the
    /// attached renderer.
    pub fn build_url_with_path(&mut self, path: &[LatLng]) -> String {
        self.read_viewport();
        let path = match self.config.simplify_tolerance {
            Some(tolerance) => simplify_path(path, tolerance),
            None => path.to_vec(),
        };
        let path = assemble_path_with_style(&path, &self.config.path_style);
        self.compose_url(&path)
    }

    fn add_endpoint_markers(&mut self) -> Result<()> {
        match (self.route.origin(), self.route.destination()) {
            (Ok(origin), Ok(destination)) => {
                let a = self.endpoint_marker(origin, "A");
                let b = self.endpoint_marker(destination, "B");
                self.markers.add_marker(a);
                self.markers.add_marker(b);
                Ok(())
            }
            (Err(Error::EmptyRoute), _) => {
                debug!("Resolved route is empty, no endpoint markers");
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    fn endpoint_marker(&self, location: LatLng, label: &str) -> Marker {
        Marker::new(
            location,
            MarkerStyle {
                color: Some(self.config.endpoint_color.clone()),
                label: Some(label.to_string()),
                ..Default::default()
            },
        )
    }

    fn read_viewport(&mut self) {
        let (width, height) = self.map.div_size();
        self.params = ViewportParams {
            size: Some(MapSize::clamped(width, height, self.config.premium)),
            zoom: Some(self.map.zoom()),
            map_type: Some(self.map.map_type_id().to_lowercase()),
            center: Some(self.map.center()),
        };
    }

    fn compose_url(&self, path: &str) -> String {
        let mut url = self.config.base_url.clone();
        url.push_str(&self.params.to_params().to_query());
        url.push_str(&self.markers.to_url_param());
        url.push_str(path);

        info!(
            "Prepared static map URL ({} bytes, {} markers, path: {})",
            url.len(),
            self.markers.len(),
            !path.is_empty()
        );
        if url.len() > self.config.max_url_length as usize {
            warn!(
                "URL length exceeds {} bytes, request may fail (size={:.2}KB)",
                self.config.max_url_length,
                url.len() as f32 / 1024.0
            );
        }

        url
    }
}
