// Incoming request abstraction consumed by route resolution

use std::collections::HashMap;

/// A minimal view of an incoming request: method string, query-stripped
/// path, and a key-value accessor over server properties.
///
/// The router only reads the method and path; everything else is carried
/// for handlers and filters that want environment context. Header handling,
/// body buffering, and response construction belong to collaborators.
#[derive(Clone, Debug)]
pub struct Request {
    method: String,
    path: String,
    properties: HashMap<String, String>,
}

impl Request {
    /// Build a request from a method and URI. Any query string is stripped
    /// from the path; query parsing belongs to a collaborator.
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let path = uri.split_once('?').map(|(path, _)| path).unwrap_or(uri);
        Self {
            method: method.into(),
            path: path.to_string(),
            properties: HashMap::new(),
        }
    }

    /// Build a request from server-style properties with localhost defaults,
    /// overridden by `overrides`. Intended for tests.
    pub fn mock(overrides: HashMap<String, String>) -> Self {
        let mut properties: HashMap<String, String> = [
            ("SERVER_ADDR", "127.0.0.1"),
            ("REQUEST_METHOD", "GET"),
            ("QUERY_STRING", ""),
            ("SERVER_NAME", "localhost"),
            ("SERVER_PORT", "80"),
            ("REMOTE_ADDR", "127.0.0.1"),
            ("URL_SCHEME", "http"),
            ("REQUEST_URI", "/"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
        properties.extend(overrides);

        let method = properties
            .get("REQUEST_METHOD")
            .cloned()
            .unwrap_or_else(|| "GET".to_string());
        let uri = properties
            .get("REQUEST_URI")
            .cloned()
            .unwrap_or_else(|| "/".to_string());

        let mut request = Self::new(method, &uri);
        request.properties = properties;
        request
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path with any query string already stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Server/environment property accessor.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
