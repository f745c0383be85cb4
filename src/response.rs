//! Framework-agnostic HTTP response value object.
//!
//! Status, headers, and body are plain owned data; the `redirect_to` slot
//! lets `AuthorizeHandler` hand back a 302 without this crate importing a
//! framework's redirect type.

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub redirect_to: Option<String>,
}

impl Response {
    fn new(status: u16) -> Self {
        Response { status, headers: Vec::new(), body: Vec::new(), redirect_to: None }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// A `200 OK` JSON response with `Cache-Control: no-store` and
    /// `Pragma: no-cache`, as RFC 6749 §5.1 requires for token responses.
    pub fn json_ok(body: &Value) -> Self {
        Response::new(200)
            .header("Content-Type", "application/json")
            .header("Cache-Control", "no-store")
            .header("Pragma", "no-cache")
            .with_json_body(body)
    }

    /// A JSON error body at the error's own status code.
    pub fn json_error(status: u16, body: &Value) -> Self {
        Response::new(status).header("Content-Type", "application/json").with_json_body(body)
    }

    fn with_json_body(mut self, body: &Value) -> Self {
        self.body = serde_json::to_vec(body).unwrap_or_default();
        self
    }

    /// A `302 Found` redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        let location = location.into();
        Response::new(302).header("Location", location.clone()).with_redirect(location)
    }

    fn with_redirect(mut self, location: String) -> Self {
        self.redirect_to = Some(location);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_ok_sets_cache_headers() {
        let resp = Response::json_ok(&json!({"access_token": "t"}));
        assert_eq!(resp.status, 200);
        assert!(resp.headers.contains(&("Cache-Control".to_string(), "no-store".to_string())));
        assert!(resp.headers.contains(&("Pragma".to_string(), "no-cache".to_string())));
    }

    #[test]
    fn redirect_sets_location_and_status() {
        let resp = Response::redirect("https://x.test/cb?code=abc");
        assert_eq!(resp.status, 302);
        assert_eq!(resp.redirect_to.as_deref(), Some("https://x.test/cb?code=abc"));
        assert!(resp.headers.iter().any(|(k, v)| k == "Location" && v == "https://x.test/cb?code=abc"));
    }
}
