//! Mux core module - hot path for request multiplexing.
//!
//! The routing table is mutated only through [`Mux::handle`] and read through
//! [`Mux::serve`]; a shared-read/exclusive-write lock keeps interleaved
//! registration and serving safe without a "registration is finished" phase.

use http::Method;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::ids::RequestId;

/// An inbound HTTP request as seen by route handlers.
///
/// Carries the minimum a handler needs to produce a response: verb, path,
/// lowercased headers and the raw body. The body is kept unparsed so that
/// decoding failures stay the handler's responsibility.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path with any query string already stripped
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Raw request body, if one was sent
    pub body: Option<String>,
}

impl HandlerRequest {
    /// Create a request with the given verb and path and no headers or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Attach a raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a header. The name is lowercased to match parsed requests.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Decode the request body as JSON.
    ///
    /// An absent body is an error, same as an unparsable one: the caller
    /// asked for a payload that is not there.
    pub fn json_body<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("unexpected end of JSON input"))?;
        Ok(serde_json::from_str(body)?)
    }
}

/// Response under construction. Handlers write status, headers and body into
/// it; the server layer serializes the result onto the wire unmodified.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    /// A fresh writer defaulting to `200 OK` with an empty body, mirroring
    /// the host-default "no explicit status written" behavior.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Get a response header by name.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive on the name).
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }

    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Append bytes to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Write the stable error envelope `{"error": "<message>"}` with the
    /// given status and the host-default error content type.
    pub fn error(&mut self, status: u16, message: &str) {
        self.status = status;
        self.set_header("Content-Type", "text/plain; charset=utf-8");
        self.body = serde_json::json!({ "error": message }).to_string().into_bytes();
        self.body.push(b'\n');
    }

    fn not_found() -> Self {
        let mut rw = Self::new();
        rw.status = 404;
        rw.set_header("Content-Type", "text/plain; charset=utf-8");
        rw.body = b"404 page not found\n".to_vec();
        rw
    }

    fn method_not_allowed() -> Self {
        let mut rw = Self::new();
        rw.status = 405;
        rw
    }
}

/// A registered request handler. The mux stores these opaquely; validating
/// that a handler has the right shape happens upstream, at registration.
pub trait RouteHandler: Send + Sync {
    fn handle(&self, req: &HandlerRequest, rw: &mut ResponseWriter);
}

impl<F> RouteHandler for F
where
    F: Fn(&HandlerRequest, &mut ResponseWriter) + Send + Sync,
{
    fn handle(&self, req: &HandlerRequest, rw: &mut ResponseWriter) {
        self(req, rw)
    }
}

type VerbTable = HashMap<Method, Arc<dyn RouteHandler>>;

/// Two-level request multiplexer: pattern first, then verb.
///
/// Matching is exact on the registered pattern, with patterns ending in `/`
/// additionally matching any path they prefix; when several prefix patterns
/// match, the longest registered one wins. A path with no matching pattern
/// yields `404 Not Found`; a matched pattern whose verb table misses the
/// request verb yields `405 Method Not Allowed`. The two are never conflated.
pub struct Mux {
    table: RwLock<HashMap<String, VerbTable>>,
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mux").field("routes", &self.len()).finish()
    }
}

impl Mux {
    /// Allocate an empty mux.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
        }
    }

    /// Register `handler` for requests matching `(verb, pattern)`. Any
    /// existing handler for that pair gets overwritten; the last
    /// registration wins.
    ///
    /// # Panics
    ///
    /// Panics on an empty pattern. Registering nothing under nothing is a
    /// wiring bug, not a runtime condition.
    pub fn handle(&self, verb: Method, pattern: &str, handler: Arc<dyn RouteHandler>) {
        assert!(!pattern.is_empty(), "mux: invalid pattern");

        let mut table = self.table.write().expect("mux routing table poisoned");
        let verbs = table.entry(pattern.to_string()).or_default();
        let replaced = verbs.insert(verb.clone(), handler).is_some();

        if replaced {
            warn!(
                verb = %verb,
                pattern = %pattern,
                "Replaced existing route handler - last registration wins"
            );
        } else {
            info!(
                verb = %verb,
                pattern = %pattern,
                patterns_total = table.len(),
                "Route registered"
            );
        }
    }

    /// Register a closure for requests matching `(verb, pattern)`.
    pub fn handle_fn<F>(&self, verb: Method, pattern: &str, handler: F)
    where
        F: Fn(&HandlerRequest, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.handle(verb, pattern, Arc::new(handler));
    }

    /// Number of registered (verb, pattern) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table
            .read()
            .expect("mux routing table poisoned")
            .values()
            .map(HashMap::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a handler is registered for exactly `(verb, pattern)`.
    #[must_use]
    pub fn contains(&self, verb: &Method, pattern: &str) -> bool {
        self.table
            .read()
            .expect("mux routing table poisoned")
            .get(pattern)
            .is_some_and(|verbs| verbs.contains_key(verb))
    }

    /// Resolve and invoke the handler for `req`, returning its response.
    ///
    /// The read guard is held across the handler call so registration can
    /// never observe a handler mid-flight with a half-updated table.
    #[must_use]
    pub fn serve(&self, req: &HandlerRequest) -> ResponseWriter {
        debug!(
            request_id = %req.id,
            method = %req.method,
            path = %req.path,
            "Route match attempt"
        );

        let table = self.table.read().expect("mux routing table poisoned");

        let Some((pattern, verbs)) = Self::match_pattern(&table, &req.path) else {
            warn!(
                request_id = %req.id,
                method = %req.method,
                path = %req.path,
                "No pattern matched"
            );
            return ResponseWriter::not_found();
        };

        let Some(handler) = verbs.get(&req.method) else {
            warn!(
                request_id = %req.id,
                method = %req.method,
                path = %req.path,
                pattern = %pattern,
                allowed = ?verbs.keys().collect::<Vec<_>>(),
                "Pattern matched but verb did not"
            );
            return ResponseWriter::method_not_allowed();
        };

        debug!(
            request_id = %req.id,
            method = %req.method,
            path = %req.path,
            pattern = %pattern,
            "Route matched"
        );

        let mut rw = ResponseWriter::new();
        handler.handle(req, &mut rw);
        rw
    }

    /// Exact match wins; otherwise the longest registered trailing-slash
    /// pattern that prefixes the path, the `http.ServeMux` rule.
    fn match_pattern<'a>(
        table: &'a HashMap<String, VerbTable>,
        path: &str,
    ) -> Option<(&'a str, &'a VerbTable)> {
        if let Some((pattern, verbs)) = table.get_key_value(path) {
            return Some((pattern.as_str(), verbs));
        }

        table
            .iter()
            .filter(|(pattern, _)| pattern.ends_with('/') && path.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(pattern, verbs)| (pattern.as_str(), verbs))
    }
}
