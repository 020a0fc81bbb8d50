// Route registry and resolution

use crate::route::{Controller, ControllerTable, FilterTable};
use crate::{Error, ExtraParams, Handler, Method, Request, Route};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// Shared configuration for a batch of grouped route registrations.
///
/// Every entry registered through [`Router::group`] gets the path prefix
/// prepended to its pattern, the controller prefix prepended to its target,
/// and the filter list attached.
#[derive(Clone, Default)]
pub struct GroupOptions {
    prefix: String,
    controller_prefix: String,
    filters: Vec<String>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix prepended to every pattern in the group.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Name prefix prepended to every controller target in the group.
    pub fn controller_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.controller_prefix = prefix.into();
        self
    }

    /// Named filter appended to every route in the group.
    pub fn filter(mut self, name: impl Into<String>) -> Self {
        self.filters.push(name.into());
        self
    }
}

/// Route registry: an insertion-ordered route collection keyed
/// `METHOD@pattern`, an optional fallback route, and the named filter and
/// controller tables shared with every registered route.
///
/// Registration is expected during startup; resolution afterwards takes
/// `&self` and never mutates the registry (resolved routes are clones with
/// the URL bound), so a finished `Router` can be shared behind an `Arc`.
///
/// `T` is the handler result type; the router is agnostic to whatever
/// response abstraction handlers produce.
pub struct Router<T> {
    routes: Vec<Route<T>>,
    index: HashMap<String, usize>,
    fallback: Option<Route<T>>,
    filters: FilterTable,
    controllers: ControllerTable<T>,
}

impl<T> Router<T> {
    pub fn new() -> Self {
        debug!("Creating new router");
        Self {
            routes: Vec::new(),
            index: HashMap::new(),
            fallback: None,
            filters: Arc::new(RwLock::new(HashMap::new())),
            controllers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn key(method: Method, pattern: &str) -> String {
        format!("{}@{}", method.as_str(), pattern)
    }

    /// Register a route. Re-registering the same method and pattern replaces
    /// the existing route in place, keeping its position in the scan order.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler<T>,
        filters: Vec<String>,
    ) {
        let mut route = Route::new(method, pattern, handler).with_filters(filters);
        route.attach_tables(self.filters.clone(), self.controllers.clone());

        let key = Self::key(method, pattern);
        match self.index.get(&key) {
            Some(&position) => {
                self.routes[position] = route;
            }
            None => {
                self.index.insert(key.clone(), self.routes.len());
                self.routes.push(route);
            }
        }

        debug!(route = %key, "Route registered");
    }

    /// Register a route for a GET request.
    pub fn get(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::GET, pattern, handler, Vec::new());
    }

    /// Register a route for a POST request.
    pub fn post(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::POST, pattern, handler, Vec::new());
    }

    pub fn put(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::PUT, pattern, handler, Vec::new());
    }

    pub fn patch(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::PATCH, pattern, handler, Vec::new());
    }

    pub fn delete(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::DELETE, pattern, handler, Vec::new());
    }

    pub fn head(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::HEAD, pattern, handler, Vec::new());
    }

    pub fn options(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::OPTIONS, pattern, handler, Vec::new());
    }

    /// Register a route for any HTTP method.
    pub fn any(&mut self, pattern: &str, handler: Handler<T>) {
        self.register(Method::ANY, pattern, handler, Vec::new());
    }

    /// Register a batch of `(method, pattern, "Controller@action")` entries
    /// sharing the group's prefixes and filters.
    pub fn group(&mut self, options: &GroupOptions, entries: &[(Method, &str, &str)]) {
        for (method, pattern, target) in entries {
            let pattern = format!("{}{}", options.prefix, pattern);
            let target = format!("{}{}", options.controller_prefix, target);
            self.register(
                *method,
                &pattern,
                Handler::target(&target),
                options.filters.clone(),
            );
        }
    }

    /// Register the route returned when nothing else matches. Its URL is
    /// never bound to the request path; it is a fixed handler.
    pub fn register_fallback(&mut self, handler: Handler<T>, filters: Vec<String>) {
        let mut route = Route::new(Method::ANY, "", handler).with_filters(filters);
        route.attach_tables(self.filters.clone(), self.controllers.clone());
        self.fallback = Some(route);
        debug!("Fallback route registered");
    }

    /// Register a named pre-dispatch filter.
    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        filter: impl Fn() -> bool + Send + Sync + 'static,
    ) {
        let name = name.into();
        self.filters
            .write()
            .unwrap()
            .insert(name.clone(), Arc::new(filter));
        debug!(filter = %name, "Filter registered");
    }

    /// Register a controller factory under a name. Routes with a
    /// `Controller` handler resolve through this table at dispatch.
    pub fn register_controller(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(Option<ExtraParams>) -> Box<dyn Controller<T>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        self.controllers
            .write()
            .unwrap()
            .insert(name.clone(), Arc::new(factory));
        debug!(controller = %name, "Controller registered");
    }

    /// Read-only view of the registered routes, in registration order.
    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    /// Resolve a request method and path to a bound route.
    ///
    /// Exact `METHOD@path` and `ANY@path` key lookups win outright; otherwise
    /// a linear scan in registration order keeps the first route with the
    /// strictly highest score, so ties go to the earlier registration. When
    /// nothing matches, the fallback route is returned if one is registered.
    pub fn resolve(&self, method: &str, path: &str) -> Result<Route<T>, Error> {
        if let Some(requested) = Method::from_str(method) {
            if let Some(&position) = self.index.get(&Self::key(requested, path)) {
                trace!(path = %path, "Resolved route by exact key");
                return Ok(Self::bind(&self.routes[position], path));
            }
        }
        if let Some(&position) = self.index.get(&Self::key(Method::ANY, path)) {
            trace!(path = %path, "Resolved route by ANY key");
            return Ok(Self::bind(&self.routes[position], path));
        }

        let mut best: Option<&Route<T>> = None;
        let mut best_score = 0;
        for route in &self.routes {
            let score = route.score(path, method);
            if score > best_score {
                best = Some(route);
                best_score = score;
            }
        }

        if let Some(route) = best {
            debug!(
                path = %path,
                pattern = %route.pattern().as_str(),
                score = best_score,
                "Resolved route by score"
            );
            return Ok(Self::bind(route, path));
        }

        if let Some(fallback) = &self.fallback {
            debug!(path = %path, "No route matched, using fallback");
            return Ok(fallback.clone());
        }

        Err(Error::RouteNotFound(format!(
            "{} {}",
            method.to_uppercase(),
            path
        )))
    }

    /// Resolve using a request's method and query-stripped path.
    pub fn route(&self, request: &Request) -> Result<Route<T>, Error> {
        self.resolve(request.method(), request.path())
    }

    fn bind(route: &Route<T>, path: &str) -> Route<T> {
        let mut bound = route.clone();
        bound.set_url(path);
        bound
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(tag: &'static str) -> Handler<&'static str> {
        Handler::closure(move |_, _| tag)
    }

    #[test]
    fn test_exact_key_lookup() {
        let mut router = Router::new();
        router.get("/home", handler("home"));

        let route = router.resolve("GET", "/home").unwrap();
        assert_eq!(route.pattern().as_str(), "/home");
        assert_eq!(route.url(), Some("/home"));
    }

    #[test]
    fn test_any_key_lookup() {
        let mut router = Router::new();
        router.any("/home", handler("home"));

        let route = router.resolve("POST", "/home").unwrap();
        assert_eq!(route.pattern().as_str(), "/home");
    }

    #[test]
    fn test_method_filter_in_scan() {
        let mut router = Router::new();
        router.post("/home/{board}", handler("post"));

        assert!(matches!(
            router.resolve("GET", "/home/dash"),
            Err(Error::RouteNotFound(_))
        ));
        assert!(router.resolve("POST", "/home/dash").is_ok());
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut router = Router::new();
        router.get("/a/{x}", handler("first"));
        router.get("/b/{x}", handler("second"));
        router.get("/a/{x}", handler("replacement"));

        assert_eq!(router.routes().len(), 2);
        assert_eq!(router.routes()[0].pattern().as_str(), "/a/{x}");

        let route = router.resolve("GET", "/a/1").unwrap();
        assert_eq!(route.dispatch(None).unwrap(), "replacement");
    }

    #[test]
    fn test_tie_break_keeps_first_registered() {
        let mut router = Router::new();
        router.get("/home/{first}", handler("first"));
        router.get("/home/{second}", handler("second"));

        let route = router.resolve("GET", "/home/dash").unwrap();
        assert_eq!(route.dispatch(None).unwrap(), "first");
    }

    #[test]
    fn test_group_applies_prefixes_and_filters() {
        let mut router: Router<()> = Router::new();
        let options = GroupOptions::new()
            .prefix("/admin")
            .controller_prefix("Admin")
            .filter("auth");
        router.group(
            &options,
            &[
                (Method::GET, "/users", "Users@list"),
                (Method::POST, "/users", "Users@create"),
            ],
        );

        let route = router.resolve("GET", "/admin/users").unwrap();
        assert_eq!(route.pattern().as_str(), "/admin/users");
        assert_eq!(route.filters(), &["auth".to_string()]);
        // Filter "auth" is not registered, so dispatch must refuse.
        assert!(matches!(
            route.dispatch(None),
            Err(Error::FilterNotRegistered(_))
        ));
    }

    #[test]
    fn test_fallback_has_no_bound_url() {
        let mut router = Router::new();
        router.register_fallback(handler("not found"), Vec::new());

        let route = router.resolve("GET", "/missing").unwrap();
        assert_eq!(route.url(), None);
        assert_eq!(route.dispatch(None).unwrap(), "not found");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut router = Router::new();
        router.get("/home/{board}/{?area}", handler("home"));

        let first = router.resolve("GET", "/home/dash").unwrap();
        let second = router.resolve("GET", "/home/dash").unwrap();
        assert_eq!(first.pattern().as_str(), second.pattern().as_str());
        assert_eq!(first.vars(), second.vars());
    }
}
