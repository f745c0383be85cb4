//! OAuth2 error taxonomy.
//!
//! Covers the full RFC 6749 §5.2/§4.1.2.1 error set, each kind mapped to a
//! stable machine code and default HTTP status, and carrying an optional
//! cause chain for logging.

use std::fmt;

use serde_json::{json, Map, Value};
use tracing::warn;

/// Stable machine name + HTTP status for each taxonomy error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthErrorKind {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    InvalidScope,
    InvalidToken,
    UnauthorizedClient,
    UnauthorizedRequest,
    UnsupportedGrantType,
    UnsupportedResponseType,
    AccessDenied,
    InsufficientScope,
    ServerError,
    /// Programmer/configuration error in host wiring (missing model capability, etc).
    InvalidArgument,
}

impl OAuthErrorKind {
    /// The `error` value sent in JSON bodies and redirect query parameters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidScope => "invalid_scope",
            Self::InvalidToken => "invalid_token",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnauthorizedRequest => "unauthorized_request",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::AccessDenied => "access_denied",
            Self::InsufficientScope => "insufficient_scope",
            Self::ServerError => "server_error",
            Self::InvalidArgument => "invalid_argument",
        }
    }

    /// Default HTTP status for this kind. `InvalidClient` may be upgraded to 401
    /// by the caller when credentials arrived via the `Authorization` header.
    pub fn default_status(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::InvalidClient => 400,
            Self::InvalidGrant => 400,
            Self::InvalidScope => 400,
            Self::InvalidToken => 401,
            Self::UnauthorizedClient => 400,
            Self::UnauthorizedRequest => 401,
            Self::UnsupportedGrantType => 400,
            Self::UnsupportedResponseType => 400,
            Self::AccessDenied => 400,
            Self::InsufficientScope => 403,
            Self::ServerError => 503,
            Self::InvalidArgument => 500,
        }
    }

    /// `true` for kinds whose `code` is a programmer error that must never be
    /// leaked through a redirect.
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::InvalidArgument)
    }
}

/// A taxonomy error: kind, human message, HTTP status override, optional cause,
/// and an optional `error_uri` per RFC 6749 §4.1.2.1 / §5.2.
pub struct OAuthError {
    kind: OAuthErrorKind,
    message: String,
    status: u16,
    error_uri: Option<String>,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    www_authenticate: Option<String>,
}

impl OAuthError {
    pub fn new(kind: OAuthErrorKind, message: impl Into<String>) -> Self {
        OAuthError {
            status: kind.default_status(),
            kind,
            message: message.into(),
            error_uri: None,
            cause: None,
            www_authenticate: None,
        }
    }

    /// `invalid_client` with the 401 status used when credentials were
    /// presented via the `Authorization` header, carrying the
    /// `WWW-Authenticate: Basic realm="Service"` challenge RFC 6749 §5.2
    /// requires a caller to echo back.
    pub fn invalid_client_via_header(message: impl Into<String>) -> Self {
        let mut err = Self::new(OAuthErrorKind::InvalidClient, message);
        err.status = 401;
        err.www_authenticate = Some(r#"Basic realm="Service""#.to_string());
        err
    }

    /// Attaches a `WWW-Authenticate: Bearer realm="Service", error="...",
    /// error_description="..."` challenge, per RFC 6750 §3, for a resource-side
    /// authentication failure.
    pub fn with_bearer_challenge(mut self, realm: &str) -> Self {
        let mut challenge = format!(r#"Bearer realm="{realm}", error="{}""#, self.kind.code());
        challenge.push_str(&format!(r#", error_description="{}""#, escape_quotes(&self.message)));
        self.www_authenticate = Some(challenge);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_error_uri(mut self, uri: impl Into<String>) -> Self {
        self.error_uri = Some(uri.into());
        self
    }

    /// The `WWW-Authenticate` header value a caller must echo on the
    /// response, if this error carries a challenge.
    pub fn www_authenticate(&self) -> Option<&str> {
        self.www_authenticate.as_deref()
    }

    pub fn kind(&self) -> OAuthErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_uri(&self) -> Option<&str> {
        self.error_uri.as_deref()
    }

    /// Wraps any non-taxonomy error as `server_error` at the handler
    /// boundary, logging the original cause before it is discarded from the
    /// response.
    pub fn wrap(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        warn!(error = %cause, "wrapping non-taxonomy error as server_error");
        Self::new(OAuthErrorKind::ServerError, "an unexpected error occurred").with_cause(cause)
    }

    /// The `{"error": ..., "error_description": ..., "error_uri"?: ...}` JSON body.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("error".into(), json!(self.kind.code()));
        map.insert("error_description".into(), json!(self.message));
        if let Some(uri) = &self.error_uri {
            map.insert("error_uri".into(), json!(uri));
        }
        Value::Object(map)
    }

    /// Query parameters to append to a redirect URI (RFC 6749 §4.1.2.1 / §4.2.2.1).
    /// Never called with a programmer error — callers must check
    /// `kind().is_programmer_error()` before redirecting.
    pub fn to_redirect_params(&self, state: Option<&str>) -> Vec<(String, String)> {
        let mut params = vec![("error".to_string(), self.kind.code().to_string())];
        params.push(("error_description".to_string(), self.message.clone()));
        if let Some(uri) = &self.error_uri {
            params.push(("error_uri".to_string(), uri.clone()));
        }
        if let Some(state) = state {
            params.push(("state".to_string(), state.to_string()));
        }
        params
    }

    /// Logs this error at `warn` (or `error` for server-side failures)
    /// before a handler builds a response body from it.
    pub fn log(&self) {
        if matches!(self.kind, OAuthErrorKind::ServerError | OAuthErrorKind::InvalidArgument) {
            tracing::error!(error_code = self.kind.code(), status = self.status, cause = ?self.cause, "{}", self.message);
        } else {
            warn!(error_code = self.kind.code(), status = self.status, "{}", self.message);
        }
    }
}

impl fmt::Debug for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("status", &self.status)
            .finish()
    }
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for OAuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Shorthand constructors, one per taxonomy kind, used throughout the handlers.
macro_rules! error_ctor {
    ($name:ident, $kind:ident) => {
        impl OAuthError {
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(OAuthErrorKind::$kind, message)
            }
        }
    };
}

error_ctor!(invalid_request, InvalidRequest);
error_ctor!(invalid_client, InvalidClient);
error_ctor!(invalid_grant, InvalidGrant);
error_ctor!(invalid_scope, InvalidScope);
error_ctor!(invalid_token, InvalidToken);
error_ctor!(unauthorized_client, UnauthorizedClient);
error_ctor!(unauthorized_request, UnauthorizedRequest);
error_ctor!(unsupported_grant_type, UnsupportedGrantType);
error_ctor!(unsupported_response_type, UnsupportedResponseType);
error_ctor!(access_denied, AccessDenied);
error_ctor!(insufficient_scope, InsufficientScope);
error_ctor!(server_error, ServerError);
error_ctor!(invalid_argument, InvalidArgument);

/// Quotes inside a challenge parameter would break the `WWW-Authenticate`
/// grammar; messages are library-authored so this only defends against an
/// accidental quote in a model's error text.
fn escape_quotes(s: &str) -> String {
    s.replace('"', "'")
}
