//! Resource-server-side bearer-token validation, scope enforcement, and
//! response decoration (RFC 6750).
//!
//! Unlike [`super::token::TokenHandler`] and [`super::authorize::AuthorizeHandler`],
//! a successful call does not itself produce a terminal HTTP response — the
//! host's protected resource continues handling the request. Failure does
//! produce one, carrying the `WWW-Authenticate` challenge RFC 6750 §3
//! requires.

use std::sync::Arc;

use crate::error::OAuthError;
use crate::model::Model;
use crate::request::Request;
use crate::response::Response;
use crate::token_type::{BearerTokenType, TokenType};
use crate::types::Token;

/// Tunables for [`AuthenticateHandler`]. Defaults follow `spec.md` §4.1.
#[derive(Debug, Clone)]
pub struct AuthenticateHandlerOptions {
    pub add_accepted_scopes_header: bool,
    pub add_authorized_scopes_header: bool,
    pub allow_bearer_tokens_in_query_string: bool,
    /// `realm` in the `WWW-Authenticate` challenge on failure.
    pub realm: String,
}

impl Default for AuthenticateHandlerOptions {
    fn default() -> Self {
        AuthenticateHandlerOptions {
            add_accepted_scopes_header: true,
            add_authorized_scopes_header: true,
            allow_bearer_tokens_in_query_string: false,
            realm: "Service".to_string(),
        }
    }
}

/// A successfully validated bearer token, plus the headers a host should
/// copy onto the resource response it is about to send.
#[derive(Debug)]
pub struct AuthenticatedAccess<U> {
    pub token: Token<U>,
    pub headers: Vec<(String, String)>,
}

pub struct AuthenticateHandler<M: Model> {
    model: Arc<M>,
    token_type: BearerTokenType,
    options: AuthenticateHandlerOptions,
}

impl<M: Model> AuthenticateHandler<M> {
    pub fn new(model: Arc<M>, options: AuthenticateHandlerOptions) -> Self {
        AuthenticateHandler { model, token_type: BearerTokenType, options }
    }

    /// Validates the request's bearer token, optionally enforcing
    /// `required_scope`. `Ok` carries the token and decoration headers for
    /// the host to attach to its own resource response; `Err` is a
    /// fully-formed 401/403 response (including `WWW-Authenticate`) the
    /// host returns as-is.
    pub async fn authenticate(&self, request: &Request, required_scope: Option<&str>) -> Result<AuthenticatedAccess<M::User>, Response> {
        match self.try_authenticate(request, required_scope).await {
            Ok(access) => Ok(access),
            Err(err) => {
                err.log();
                let response = Response::json_error(err.status_code(), &err.to_json());
                Err(match err.www_authenticate() {
                    Some(challenge) => response.header("WWW-Authenticate", challenge),
                    None => response,
                })
            }
        }
    }

    async fn try_authenticate(&self, request: &Request, required_scope: Option<&str>) -> Result<AuthenticatedAccess<M::User>, OAuthError> {
        let presented = self
            .token_type
            .extract(request, self.options.allow_bearer_tokens_in_query_string)?;
        let presented = presented.ok_or_else(|| {
            OAuthError::unauthorized_request("no access token was presented").with_bearer_challenge(&self.options.realm)
        })?;

        let token = self
            .model
            .get_access_token(&presented)
            .await?
            .ok_or_else(|| OAuthError::invalid_token("access token is invalid").with_bearer_challenge(&self.options.realm))?;

        let now = chrono::Utc::now();
        let expires_at = token
            .access_token_expires_at
            .ok_or_else(|| OAuthError::invalid_token("access token has no expiry").with_bearer_challenge(&self.options.realm))?;
        if expires_at <= now {
            return Err(OAuthError::invalid_token("access token has expired").with_bearer_challenge(&self.options.realm));
        }

        if let Some(scope) = required_scope {
            let granted = self.model.verify_scope(&token, scope).await?;
            if !granted {
                return Err(OAuthError::insufficient_scope("token does not carry the required scope").with_bearer_challenge(&self.options.realm));
            }
        }

        let mut headers = Vec::new();
        if self.options.add_accepted_scopes_header {
            if let Some(scope) = required_scope {
                headers.push(("X-Accepted-OAuth-Scopes".to_string(), scope.to_string()));
            }
        }
        if self.options.add_authorized_scopes_header {
            if let Some(scope) = &token.scope {
                headers.push(("X-OAuth-Scopes".to_string(), scope.clone()));
            }
        }

        Ok(AuthenticatedAccess { token, headers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::memory::{InMemoryModel, SimpleUser};
    use crate::types::Client;
    use std::sync::Arc;

    fn client() -> Client {
        Client {
            id: "c1".into(),
            secret: None,
            grants: vec!["password".into()],
            redirect_uris: vec![],
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        }
    }

    async fn model_with_token(scope: Option<&str>, expires_in_seconds: i64) -> Arc<InMemoryModel> {
        let model = Arc::new(InMemoryModel::new());
        model
            .save_token(Token {
                access_token: "tok1".into(),
                access_token_expires_at: Some(chrono::Utc::now() + chrono::Duration::seconds(expires_in_seconds)),
                refresh_token: None,
                refresh_token_expires_at: None,
                scope: scope.map(str::to_string),
                client: client(),
                user: SimpleUser::new("u1"),
                authorization_code: None,
                extended: serde_json::Map::new(),
            })
            .await
            .unwrap();
        model
    }

    #[tokio::test]
    async fn valid_token_is_accepted() {
        let model = model_with_token(Some("read write"), 3600).await;
        let handler = AuthenticateHandler::new(model, AuthenticateHandlerOptions::default());
        let request = Request::new("GET").with_header("Authorization", "Bearer tok1");
        let access = handler.authenticate(&request, Some("read")).await.ok().unwrap();
        assert_eq!(access.token.user.id, "u1");
        assert!(access.headers.contains(&("X-Accepted-OAuth-Scopes".to_string(), "read".to_string())));
        assert!(access.headers.contains(&("X-OAuth-Scopes".to_string(), "read write".to_string())));
    }

    #[tokio::test]
    async fn expired_token_is_invalid_token() {
        let model = model_with_token(None, -10).await;
        let handler = AuthenticateHandler::new(model, AuthenticateHandlerOptions::default());
        let request = Request::new("GET").with_header("Authorization", "Bearer tok1");
        let response = handler.authenticate(&request, None).await.err().unwrap();
        assert_eq!(response.status, 401);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "invalid_token");
        assert!(response.headers.iter().any(|(k, _)| k == "WWW-Authenticate"));
    }

    #[tokio::test]
    async fn missing_scope_is_insufficient_scope() {
        let model = model_with_token(Some("read"), 3600).await;
        let handler = AuthenticateHandler::new(model, AuthenticateHandlerOptions::default());
        let request = Request::new("GET").with_header("Authorization", "Bearer tok1");
        let response = handler.authenticate(&request, Some("write")).await.err().unwrap();
        assert_eq!(response.status, 403);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "insufficient_scope");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized_request() {
        let model = Arc::new(InMemoryModel::new());
        let handler = AuthenticateHandler::new(model, AuthenticateHandlerOptions::default());
        let request = Request::new("GET");
        let response = handler.authenticate(&request, None).await.err().unwrap();
        assert_eq!(response.status, 401);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "unauthorized_request");
    }

    #[tokio::test]
    async fn query_string_token_rejected_unless_allowed() {
        let model = model_with_token(None, 3600).await;
        let handler = AuthenticateHandler::new(model, AuthenticateHandlerOptions::default());
        let request = Request::new("GET").with_query("access_token", "tok1");
        let response = handler.authenticate(&request, None).await.err().unwrap();
        assert_eq!(response.status, 401);
    }
}
