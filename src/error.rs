//! Error types for static map URL building.
//!
//! Encoding, grouping and serialization never fail. Only reads of the route
//! geometry and the wait for route resolution can.

use std::time::Duration;

/// Errors surfaced while preparing a static map URL.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Route geometry was read before the directions became available.
    #[error("Route directions are not resolved yet")]
    RouteUnresolved,

    /// The renderer selected a route index the directions do not contain.
    #[error("Route index {index} out of range ({count} routes)")]
    RouteIndexOutOfRange { index: usize, count: usize },

    /// The selected route has no points.
    #[error("Empty route")]
    EmptyRoute,

    /// The readiness predicate stayed false for the whole wait bound.
    #[error("Route did not resolve within {0:?}")]
    RouteTimeout(Duration),

    /// The pending build was aborted by the caller.
    #[error("URL preparation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
