// HTTP methods accepted at registration and resolution time

use std::fmt;

/// HTTP methods
///
/// `ANY` is the registration wildcard: a route registered with `ANY`
/// accepts requests of every method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
    ANY,
}

impl Method {
    /// Parse a method name. Comparison is case-insensitive, so `"get"` and
    /// `"GET"` both parse to `Method::GET`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "ANY" => Some(Method::ANY),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::ANY => "ANY",
        }
    }

    /// True when a route registered with `self` accepts a request made with
    /// `requested`. `ANY` accepts everything; every other method only itself.
    pub fn accepts(&self, requested: Method) -> bool {
        *self == Method::ANY || *self == requested
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
