// Core library for the Waypost router
// This module contains the pattern compiler, route registry, and dispatch engine

pub mod error;
pub mod method;
pub mod pattern;
pub mod request;
pub mod route;
pub mod router;

// Re-export commonly used types
pub use error::Error;
pub use method::Method;
pub use pattern::{Pattern, RouteVar, Segment};
pub use request::Request;
pub use route::{Controller, ControllerFactory, ExtraParams, FilterFn, Handler, HandlerFn, Route};
pub use router::{GroupOptions, Router};
