//! Framework-agnostic view of a decoded HTTP request.
//!
//! Method, headers, and body are plain owned data with no dependency on any
//! particular web framework's request type — a host adapts its own
//! framework's request into this struct once per call.

use std::collections::HashMap;

use crate::validators;

/// HTTP method of the incoming request, as a plain string (`GET`, `POST`, ...).
/// Kept as a string rather than an enum: the library only ever compares it
/// against a small set of literals and a host's own HTTP method type need not
/// round-trip through ours.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    /// Header names are stored lower-cased; lookups are case-insensitive.
    headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// Parsed `application/x-www-form-urlencoded` body, when applicable.
    pub body: HashMap<String, String>,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Request {
            method: method.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_method(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }

    pub fn content_type_is_form(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.split(';').next().unwrap_or("").trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }

    /// Value present in both the body and the query string, preferring the
    /// body when both are present.
    pub fn body_or_query(&self, key: &str) -> Option<&str> {
        self.body.get(key).or_else(|| self.query.get(key)).map(String::as_str)
    }

    /// Decodes the HTTP Basic `Authorization` header into `(username, password)`.
    /// Returns `None` when absent, malformed, or not a `Basic` scheme.
    pub fn basic_auth(&self) -> Option<(String, String)> {
        let header = self.header("authorization")?;
        let rest = header.strip_prefix("Basic ")?;
        let decoded = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, rest).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, pass) = decoded.split_once(':')?;
        Some((user.to_string(), pass.to_string()))
    }

    /// Bearer token from the `Authorization` header, if present and well-formed.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("authorization")?.strip_prefix("Bearer ")
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn form_param(&self, key: &str) -> Option<&str> {
        self.body.get(key).map(String::as_str)
    }

    /// `true` if a syntactically valid scope string or absent; scope values
    /// are `NQSCHAR` per RFC 6749 Appendix A.
    pub fn valid_scope_syntax(scope: Option<&str>) -> bool {
        scope.map(validators::is_nqschar_str).unwrap_or(true)
    }
}

impl Default for Request {
    fn default() -> Self {
        Request::new("GET")
    }
}
