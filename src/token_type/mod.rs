//! `token_type` handling for bearer-token authentication (RFC 6750).

pub mod bearer;

pub use bearer::BearerTokenType;

use crate::error::OAuthError;
use crate::request::Request;

/// Extracts a presented token from a request, independent of which RFC 6750
/// delivery method (`Authorization` header, form body, or query parameter)
/// was used. `allow_query_string` gates the query-parameter method (RFC
/// 6750 §2.3 discourages it; `spec.md` §4.1 defaults it off).
pub trait TokenType: Send + Sync {
    fn extract(&self, request: &Request, allow_query_string: bool) -> Result<Option<String>, OAuthError>;
}
