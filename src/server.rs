//! The server façade: a thin dispatcher binding options to handler
//! instances, per `spec.md` §4.1.
//!
//! `OAuth2Server<M>` is the one type most hosts construct directly. It
//! registers the four standard grants and the `code` response type by
//! default; a host adds extension grants/response types via
//! [`OAuth2Server::with_grant_type`] / [`OAuth2Server::with_response_type`].

use std::sync::Arc;

use crate::grant::{AuthorizationCodeGrant, ClientCredentialsGrant, GrantType, PasswordGrant, RefreshTokenGrant};
use crate::handler::{
    AuthenticateHandler, AuthenticateHandlerOptions, AuthenticatedAccess, AuthorizeHandler, AuthorizeHandlerOptions, TokenHandler,
    TokenHandlerOptions,
};
use crate::model::Model;
use crate::request::Request;
use crate::response::Response;
use crate::response_type::{CodeResponseType, ResponseType};

/// An embeddable OAuth2 authorization server bound to one [`Model`].
///
/// Holds `Arc<M>` plus the three handlers' default options; per-call options
/// passed to [`OAuth2Server::token`]/[`OAuth2Server::authorize`]/
/// [`OAuth2Server::authenticate`] override the server-level defaults
/// constructed here, realizing `spec.md` §4.1's "per-call ▸ server-level ▸
/// defaults" precedence as plain `Option` substitution. Grants and response
/// types are held as `Arc<dyn _>` rather than `Box<dyn _>` so a fresh handler
/// can be assembled per call (picking up per-call option overrides) without
/// re-registering every grant by hand.
pub struct OAuth2Server<M: Model> {
    model: Arc<M>,
    token_options: TokenHandlerOptions,
    authorize_options: AuthorizeHandlerOptions,
    authenticate_options: AuthenticateHandlerOptions,
    grants: Vec<(String, Arc<dyn GrantType<M>>)>,
    response_types: Vec<(String, Arc<dyn ResponseType<M>>)>,
}

impl<M: Model> OAuth2Server<M> {
    /// A server with the four standard grants, the `code` response type,
    /// and every option at its RFC-suggested default.
    pub fn new(model: Arc<M>) -> Self {
        OAuth2Server {
            model,
            token_options: TokenHandlerOptions::default(),
            authorize_options: AuthorizeHandlerOptions::default(),
            authenticate_options: AuthenticateHandlerOptions::default(),
            grants: vec![
                ("authorization_code".to_string(), Arc::new(AuthorizationCodeGrant) as Arc<dyn GrantType<M>>),
                ("client_credentials".to_string(), Arc::new(ClientCredentialsGrant)),
                ("password".to_string(), Arc::new(PasswordGrant)),
                ("refresh_token".to_string(), Arc::new(RefreshTokenGrant)),
            ],
            response_types: vec![("code".to_string(), Arc::new(CodeResponseType) as Arc<dyn ResponseType<M>>)],
        }
    }

    pub fn with_token_options(mut self, options: TokenHandlerOptions) -> Self {
        self.token_options = options;
        self
    }

    pub fn with_authorize_options(mut self, options: AuthorizeHandlerOptions) -> Self {
        self.authorize_options = options;
        self
    }

    pub fn with_authenticate_options(mut self, options: AuthenticateHandlerOptions) -> Self {
        self.authenticate_options = options;
        self
    }

    /// Registers an extension grant type (or replaces a built-in one under
    /// the same name), the statically-typed analogue of the source's
    /// `server.js` grant-type option bag.
    pub fn with_grant_type(mut self, name: impl Into<String>, grant: Arc<dyn GrantType<M>>) -> Self {
        let name = name.into();
        self.grants.retain(|(existing, _)| existing != &name);
        self.grants.push((name, grant));
        self
    }

    pub fn with_response_type(mut self, name: impl Into<String>, response_type: Arc<dyn ResponseType<M>>) -> Self {
        let name = name.into();
        self.response_types.retain(|(existing, _)| existing != &name);
        self.response_types.push((name, response_type));
        self
    }

    fn token_handler(&self, overrides: Option<TokenHandlerOptions>) -> TokenHandler<M> {
        let options = overrides.unwrap_or_else(|| self.token_options.clone());
        let mut handler = TokenHandler::new(self.model.clone(), options);
        for (name, grant) in &self.grants {
            handler = handler.with_grant(name.clone(), grant.clone());
        }
        handler
    }

    fn authorize_handler(&self, overrides: Option<AuthorizeHandlerOptions>) -> AuthorizeHandler<M> {
        let options = overrides.unwrap_or_else(|| self.authorize_options.clone());
        let mut handler = AuthorizeHandler::new(self.model.clone(), options);
        for (name, response_type) in &self.response_types {
            handler = handler.with_response_type(name.clone(), response_type.clone());
        }
        handler
    }

    /// `POST /token`.
    pub async fn token(&self, request: &Request, overrides: Option<TokenHandlerOptions>) -> Response {
        self.token_handler(overrides).handle(request).await
    }

    /// `GET|POST /authorize`. `user` is `None` when the resource owner has
    /// not authenticated or denied consent.
    pub async fn authorize(&self, request: &Request, user: Option<&M::User>, overrides: Option<AuthorizeHandlerOptions>) -> Response {
        self.authorize_handler(overrides).handle(request, user).await
    }

    /// Resource-server bearer-token validation. `scope` is the required
    /// scope, if any (a bare string in the source's API; kept as
    /// `Option<&str>` here rather than overloading the options-or-string
    /// shape `spec.md` §4.1 describes for the untyped source).
    pub async fn authenticate(
        &self,
        request: &Request,
        scope: Option<&str>,
        overrides: Option<AuthenticateHandlerOptions>,
    ) -> Result<AuthenticatedAccess<M::User>, Response> {
        let options = overrides.unwrap_or_else(|| self.authenticate_options.clone());
        AuthenticateHandler::new(self.model.clone(), options).authenticate(request, scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::memory::{InMemoryModel, SimpleUser};
    use crate::types::Client;

    fn client() -> Client {
        Client {
            id: "c1".into(),
            secret: Some("s1".into()),
            grants: vec!["client_credentials".into()],
            redirect_uris: vec![],
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        }
    }

    #[tokio::test]
    async fn default_server_wires_standard_grants() {
        let model = Arc::new(InMemoryModel::new())
            .with_client(client())
            .with_client_user("c1", SimpleUser::new("service-account"));
        let server = OAuth2Server::new(model);
        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Authorization", "Basic YzE6czE=")
            .with_body_field("grant_type", "client_credentials");
        let response = server.token(&request, None).await;
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn per_call_token_options_override_server_defaults() {
        let model = Arc::new(InMemoryModel::new())
            .with_client(client())
            .with_client_user("c1", SimpleUser::new("service-account"));
        let server = OAuth2Server::new(model);
        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Authorization", "Basic YzE6czE=")
            .with_body_field("grant_type", "client_credentials");
        let response = server
            .token(&request, Some(TokenHandlerOptions { access_token_lifetime_seconds: 60, ..Default::default() }))
            .await;
        assert_eq!(response.status, 200);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["expires_in"], 60);
    }
}
