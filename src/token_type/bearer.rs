//! Bearer token extraction per RFC 6750 §2: `Authorization` header (§2.1),
//! form-encoded body parameter (§2.2), or URI query parameter (§2.3).

use super::TokenType;
use crate::error::OAuthError;
use crate::request::Request;

pub struct BearerTokenType;

impl TokenType for BearerTokenType {
    fn extract(&self, request: &Request, allow_query_string: bool) -> Result<Option<String>, OAuthError> {
        let from_header = request.bearer_token().map(str::to_string);
        let from_body = if request.content_type_is_form() {
            request.form_param("access_token").map(str::to_string)
        } else {
            None
        };
        let from_query = if allow_query_string {
            request.query_param("access_token").map(str::to_string)
        } else {
            None
        };

        let present = [&from_header, &from_body, &from_query]
            .into_iter()
            .filter(|v| v.is_some())
            .count();
        if present > 1 {
            return Err(OAuthError::invalid_request(
                "access token must be presented via exactly one of the Authorization header, body, or query string",
            ));
        }

        Ok(from_header.or(from_body).or(from_query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_authorization_header() {
        let req = Request::new("GET").with_header("Authorization", "Bearer abc123");
        assert_eq!(BearerTokenType.extract(&req, false).unwrap(), Some("abc123".to_string()));
    }

    #[test]
    fn extracts_from_query_string_when_allowed() {
        let req = Request::new("GET").with_query("access_token", "abc123");
        assert_eq!(BearerTokenType.extract(&req, true).unwrap(), Some("abc123".to_string()));
    }

    #[test]
    fn query_string_ignored_when_not_allowed() {
        let req = Request::new("GET").with_query("access_token", "abc123");
        assert_eq!(BearerTokenType.extract(&req, false).unwrap(), None);
    }

    #[test]
    fn rejects_multiple_simultaneous_sources() {
        let req = Request::new("GET")
            .with_header("Authorization", "Bearer abc123")
            .with_query("access_token", "def456");
        let result = BearerTokenType.extract(&req, true);
        assert!(matches!(result, Err(ref e) if e.kind().code() == "invalid_request"));
    }

    #[test]
    fn absent_is_none() {
        let req = Request::new("GET");
        assert_eq!(BearerTokenType.extract(&req, false).unwrap(), None);
    }
}
