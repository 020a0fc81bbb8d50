// Routes: compiled pattern + method + handler + filter chain

use crate::pattern::{Pattern, RouteVar};
use crate::{Error, Method};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// Opaque extra parameters forwarded to handlers at dispatch time.
///
/// Closure handlers receive them directly; controller handlers receive them
/// through their factory, so the controller constructor can use them.
pub type ExtraParams = Arc<dyn Any + Send + Sync>;

/// A closure route handler: optional extra parameters plus the extracted
/// path variables, in pattern order.
pub type HandlerFn<T> = Arc<dyn Fn(Option<ExtraParams>, &[RouteVar]) -> T + Send + Sync>;

/// A named pre-dispatch guard. Returning `false` aborts dispatch before the
/// handler runs.
pub type FilterFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Builds a controller instance from the optional extra parameters.
pub type ControllerFactory<T> =
    Arc<dyn Fn(Option<ExtraParams>) -> Box<dyn Controller<T>> + Send + Sync>;

pub(crate) type FilterTable = Arc<RwLock<HashMap<String, FilterFn>>>;
pub(crate) type ControllerTable<T> = Arc<RwLock<HashMap<String, ControllerFactory<T>>>>;

/// A handler target constructed by name through the router's factory table.
///
/// `call` returns `None` when the requested action does not exist on this
/// controller, which dispatch reports as [`Error::MethodNotFound`].
pub trait Controller<T>: Send + Sync {
    fn call(&self, action: &str, vars: &[RouteVar]) -> Option<T>;
}

/// The closed set of handler shapes a route can carry.
pub enum Handler<T> {
    /// Invoked directly with the extracted variables.
    Closure(HandlerFn<T>),
    /// Resolved by name through the router's controller table at dispatch.
    Controller { name: String, action: String },
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        match self {
            Handler::Closure(f) => Handler::Closure(f.clone()),
            Handler::Controller { name, action } => Handler::Controller {
                name: name.clone(),
                action: action.clone(),
            },
        }
    }
}

impl<T> std::fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Closure(_) => f.debug_tuple("Closure").finish(),
            Handler::Controller { name, action } => f
                .debug_struct("Controller")
                .field("name", name)
                .field("action", action)
                .finish(),
        }
    }
}

impl<T> Handler<T> {
    /// Wrap a closure as a handler.
    pub fn closure(
        f: impl Fn(Option<ExtraParams>, &[RouteVar]) -> T + Send + Sync + 'static,
    ) -> Self {
        Handler::Closure(Arc::new(f))
    }

    /// Point at a registered controller by name and action.
    pub fn controller(name: impl Into<String>, action: impl Into<String>) -> Self {
        Handler::Controller {
            name: name.into(),
            action: action.into(),
        }
    }

    /// Parse a `Controller@action` target string. A target without `@`
    /// resolves to the whole string as controller name and an empty action,
    /// which surfaces as `MethodNotFound` at dispatch.
    pub fn target(target: &str) -> Self {
        let (name, action) = target.split_once('@').unwrap_or((target, ""));
        Handler::controller(name, action)
    }
}

/// A registered route: one HTTP method (or the `ANY` wildcard), a compiled
/// pattern, a handler, and an ordered list of filter names.
///
/// Method, pattern, handler, and filters are fixed at construction. The URL
/// is bound once per dispatch cycle: resolution clones the registered route
/// and calls [`Route::set_url`] on the clone, so the registry itself is never
/// mutated after startup.
pub struct Route<T> {
    method: Method,
    pattern: Pattern,
    handler: Handler<T>,
    filters: Vec<String>,
    url: Option<String>,
    filter_table: FilterTable,
    controller_table: ControllerTable<T>,
}

impl<T> Clone for Route<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            pattern: self.pattern.clone(),
            handler: self.handler.clone(),
            filters: self.filters.clone(),
            url: self.url.clone(),
            filter_table: self.filter_table.clone(),
            controller_table: self.controller_table.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("handler", &self.handler)
            .field("filters", &self.filters)
            .field("url", &self.url)
            .finish()
    }
}

impl<T> Route<T> {
    /// Create a standalone route with empty filter and controller tables.
    /// Routes registered through a [`crate::Router`] share its tables instead.
    pub fn new(method: Method, pattern: &str, handler: Handler<T>) -> Self {
        Self {
            method,
            pattern: Pattern::parse(pattern),
            handler,
            filters: Vec::new(),
            url: None,
            filter_table: Arc::new(RwLock::new(HashMap::new())),
            controller_table: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Attach the ordered list of named filters run before the handler.
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// The URL this route was resolved against, if bound.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Bind the URL this route was resolved against. Called once per
    /// dispatch cycle, before [`Route::dispatch`].
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    pub(crate) fn attach_tables(&mut self, filters: FilterTable, controllers: ControllerTable<T>) {
        self.filter_table = filters;
        self.controller_table = controllers;
    }

    /// True when the request method is accepted and the path satisfies the
    /// compiled pattern. Method comparison is case-insensitive; literal
    /// segment comparison is case-sensitive.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        match Method::from_str(method) {
            Some(requested) if self.method.accepts(requested) => self.pattern.matches(path),
            _ => false,
        }
    }

    /// Specificity score of `path` against this route. Zero on method
    /// mismatch or any hard segment failure.
    pub fn score(&self, path: &str, method: &str) -> u32 {
        match Method::from_str(method) {
            Some(requested) if self.method.accepts(requested) => self.pattern.score(path),
            _ => 0,
        }
    }

    /// Extract path variables from the bound URL. The raw pattern stands in
    /// when no URL is bound, as for the fallback route.
    pub fn vars(&self) -> Vec<RouteVar> {
        let url = self.url.as_deref().unwrap_or(self.pattern.as_str());
        self.pattern.vars(url)
    }

    /// Run the filter chain, then invoke the handler.
    ///
    /// A single linear pass with early-exit failure semantics: the first
    /// missing or rejecting filter aborts before the handler runs.
    pub fn dispatch(&self, extra: Option<ExtraParams>) -> Result<T, Error> {
        self.run_filters()?;

        let vars = self.vars();
        match &self.handler {
            Handler::Closure(handler) => Ok(handler(extra, &vars)),
            Handler::Controller { name, action } => {
                let factory = {
                    let table = self.controller_table.read().unwrap();
                    table.get(name).cloned()
                };
                let factory = factory.ok_or_else(|| {
                    debug!(controller = %name, "Controller factory missing at dispatch");
                    Error::ControllerNotFound(name.clone())
                })?;

                let instance = factory(extra);
                instance.call(action, &vars).ok_or_else(|| {
                    debug!(controller = %name, action = %action, "Action missing on controller");
                    Error::MethodNotFound(format!("'{action}' on controller '{name}'"))
                })
            }
        }
    }

    fn run_filters(&self) -> Result<(), Error> {
        for name in &self.filters {
            let filter = {
                let table = self.filter_table.read().unwrap();
                table.get(name).cloned()
            };
            let filter = filter.ok_or_else(|| Error::FilterNotRegistered(name.clone()))?;

            if !filter() {
                trace!(filter = %name, "Filter rejected dispatch");
                return Err(Error::FilterFailed(name.clone()));
            }
        }
        Ok(())
    }
}
