// Error types for route resolution and dispatch

use thiserror::Error;

/// Errors surfaced by route resolution and dispatch.
///
/// Every variant is a local, non-retryable condition: the router fails fast
/// and surfaces the error to the caller. Handler-internal failures are not
/// part of this taxonomy; handlers report those through their own result type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Filter not registered: {0}")]
    FilterNotRegistered(String),

    #[error("Filter rejected the request: {0}")]
    FilterFailed(String),

    #[error("Controller not found: {0}")]
    ControllerNotFound(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),
}
