//! Route attached to the map and its `path=` parameter.
//!
//! A directions renderer resolves asynchronously. [`StaticRoute`] tracks
//! whether it is still loading, waits for it with a bounded poll, and reads
//! the selected route's overview path once directions are available.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use geo::{algorithm::simplify::Simplify, Coord, LineString};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::{points_to_url_string, polyline, LatLng};

/// Path style used when none is configured: opaque red, 3 px.
pub const DEFAULT_PATH_STYLE: &str = "color:0xff0000ff|weight:3";

/// Poll interval used while waiting for a freshly attached renderer.
pub const ATTACH_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One alternative route from a directions result.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionsRoute {
    /// Ordered, simplified points of the whole route
    pub overview_path: Vec<LatLng>,
}

/// A resolved directions result.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directions {
    pub routes: Vec<DirectionsRoute>,
}

/// The live directions renderer displaying a route on the map.
pub trait DirectionsRenderer: Send + Sync {
    /// Current directions; `None` while the request is still in flight.
    fn directions(&self) -> Option<Directions>;
    /// Index of the route alternative the user selected.
    fn route_index(&self) -> usize;
}

/// Route state of a static map: unset, loading or resolved.
#[derive(Default)]
pub struct StaticRoute {
    renderer: Option<Arc<dyn DirectionsRenderer>>,
    loading: bool,
}

impl fmt::Debug for StaticRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRoute")
            .field("set", &self.is_set())
            .field("loading", &self.is_loading())
            .finish()
    }
}

impl StaticRoute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a renderer. The route counts as loading until the renderer
    /// reports directions.
    pub fn set_renderer(&mut self, renderer: Arc<dyn DirectionsRenderer>) {
        self.renderer = Some(renderer);
        self.loading = true;
    }

    pub fn is_set(&self) -> bool {
        self.renderer.is_some()
    }

    /// True while a renderer is attached and its directions are not available.
    pub fn is_loading(&self) -> bool {
        self.loading && !self.renderer_ready()
    }

    fn renderer_ready(&self) -> bool {
        self.renderer
            .as_ref()
            .is_some_and(|r| r.directions().is_some())
    }

    /// Wait until the renderer has directions, checking every `poll_interval`.
    ///
    /// Returns immediately when no route is attached or it already resolved.
    /// The poll stops on the first successful check; it gives up with
    /// [`Error::RouteTimeout`] after `timeout`, leaving the route loading.
    pub async fn resolve(&mut self, poll_interval: Duration, timeout: Duration) -> Result<()> {
        let renderer = match &self.renderer {
            Some(r) if self.is_loading() => Arc::clone(r),
            Some(_) => {
                self.loading = false;
                return Ok(());
            }
            _ => return Ok(()),
        };

        debug!("Waiting for route directions (poll every {:?})", poll_interval);
        let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
        let wait = async {
            loop {
                ticker.tick().await;
                if renderer.directions().is_some() {
                    return;
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(()) => {
                self.loading = false;
                debug!("Route directions resolved");
                Ok(())
            }
            Err(_) => {
                warn!("Route directions did not resolve within {:?}", timeout);
                Err(Error::RouteTimeout(timeout))
            }
        }
    }

    /// Overview path of the selected route, or `None` when no renderer is
    /// attached or its directions are not available yet.
    pub fn current_path(&self) -> Result<Option<Vec<LatLng>>> {
        let Some(renderer) = &self.renderer else {
            return Ok(None);
        };
        let Some(directions) = renderer.directions() else {
            return Ok(None);
        };

        let index = renderer.route_index();
        let count = directions.routes.len();
        directions
            .routes
            .into_iter()
            .nth(index)
            .map(|route| Some(route.overview_path))
            .ok_or(Error::RouteIndexOutOfRange { index, count })
    }

    fn resolved_path(&self) -> Result<Vec<LatLng>> {
        if self.is_loading() {
            return Err(Error::RouteUnresolved);
        }
        self.current_path()?.ok_or(Error::RouteUnresolved)
    }

    /// First point of the selected route. Fails until the route resolved.
    pub fn origin(&self) -> Result<LatLng> {
        self.resolved_path()?.first().copied().ok_or(Error::EmptyRoute)
    }

    /// Last point of the selected route. Fails until the route resolved.
    pub fn destination(&self) -> Result<LatLng> {
        self.resolved_path()?.last().copied().ok_or(Error::EmptyRoute)
    }

    /// The `&path=` parameter for the current directions; empty when there is
    /// no route, it has not resolved, or it has no points.
    pub fn to_url_param(&self, path_style: &str, simplify_tolerance: Option<f64>) -> Result<String> {
        if self.is_loading() {
            return Ok(String::new());
        }
        let Some(points) = self.current_path()? else {
            return Ok(String::new());
        };
        let points = match simplify_tolerance {
            Some(tolerance) => simplify_path(&points, tolerance),
            None => points,
        };
        Ok(assemble_path_with_style(&points, path_style))
    }
}

/// Build the `&path=` parameter with the default style.
///
/// The points go out either verbatim (`lat,lng|lat,lng|...`) or encoded,
/// whichever is strictly shorter; ties keep the verbatim form. An empty
/// sequence produces no parameter at all.
///
/// # Example
/// ```
/// use static_map_url::{assemble_path, LatLng};
///
/// assert_eq!(
///     assemble_path(&[LatLng::new(1.0, 1.0)]),
///     "&path=color:0xff0000ff|weight:3|1,1"
/// );
/// assert_eq!(assemble_path(&[]), "");
/// ```
pub fn assemble_path(points: &[LatLng]) -> String {
    assemble_path_with_style(points, DEFAULT_PATH_STYLE)
}

/// Build the `&path=` parameter with an explicit style prefix.
pub fn assemble_path_with_style(points: &[LatLng], path_style: &str) -> String {
    if points.is_empty() {
        return String::new();
    }

    let verbatim = points_to_url_string(points);
    let encoded = polyline::encode(points);
    let chosen = if encoded.len() < verbatim.len() { encoded } else { verbatim };

    format!("&path={}|{}", path_style, chosen)
}

/// Douglas-Peucker simplification (tolerance in degrees). Endpoints are kept.
pub fn simplify_path(points: &[LatLng], tolerance: f64) -> Vec<LatLng> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let line: LineString = points.iter().map(|p| Coord::from(*p)).collect();
    let simplified = line.simplify(&tolerance);
    debug!(
        "Simplified route from {} to {} points",
        points.len(),
        simplified.0.len()
    );
    simplified.0.into_iter().map(LatLng::from).collect()
}
