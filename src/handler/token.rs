//! `POST /token`: exchanges credentials/codes for access (and refresh) tokens.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{client_grant_error, client_lookup_error, resolve_client_credentials};
use crate::error::OAuthError;
use crate::grant::{GrantContext, GrantType};
use crate::model::Model;
use crate::request::Request;
use crate::response::Response;
use crate::types::{Token, RESERVED_TOKEN_RESPONSE_FIELDS};
use crate::validators::is_grant_or_response_type_name;

/// Tunables for [`TokenHandler`]. Defaults follow RFC 6749's suggested
/// lifetimes and leave extension attributes off.
#[derive(Debug, Clone)]
pub struct TokenHandlerOptions {
    pub access_token_lifetime_seconds: u64,
    pub refresh_token_lifetime_seconds: u64,
    pub always_issue_new_refresh_token: bool,
    pub allow_extended_token_attributes: bool,
    /// Per-grant override of whether client authentication is required. An
    /// empty map (the default) means every grant requires it — `spec.md`
    /// §9's open question warns against reading the empty map as "none
    /// required". Set an entry to `false` to let that grant accept a bare
    /// `client_id` with no secret.
    pub require_client_authentication: HashMap<String, bool>,
}

impl Default for TokenHandlerOptions {
    fn default() -> Self {
        TokenHandlerOptions {
            access_token_lifetime_seconds: 3600,
            refresh_token_lifetime_seconds: 1_209_600,
            always_issue_new_refresh_token: true,
            allow_extended_token_attributes: false,
            require_client_authentication: HashMap::new(),
        }
    }
}

/// Dispatches `POST /token` requests to the grant registered under the
/// request's `grant_type` value.
pub struct TokenHandler<M: Model> {
    model: Arc<M>,
    grants: HashMap<String, Arc<dyn GrantType<M>>>,
    options: TokenHandlerOptions,
}

impl<M: Model> TokenHandler<M> {
    pub fn new(model: Arc<M>, options: TokenHandlerOptions) -> Self {
        TokenHandler { model, grants: HashMap::new(), options }
    }

    pub fn with_grant(mut self, name: impl Into<String>, grant: Arc<dyn GrantType<M>>) -> Self {
        self.grants.insert(name.into(), grant);
        self
    }

    pub async fn handle(&self, request: &Request) -> Response {
        match self.try_handle(request).await {
            Ok(response) => response,
            Err(err) => {
                err.log();
                let response = Response::json_error(err.status_code(), &err.to_json());
                match err.www_authenticate() {
                    Some(challenge) => response.header("WWW-Authenticate", challenge),
                    None => response,
                }
            }
        }
    }

    async fn try_handle(&self, request: &Request) -> Result<Response, OAuthError> {
        if !request.is_method("POST") {
            return Err(OAuthError::invalid_request("token endpoint requires POST"));
        }
        if !request.content_type_is_form() {
            return Err(OAuthError::invalid_request(
                "token endpoint requires application/x-www-form-urlencoded",
            ));
        }

        let grant_type = request
            .form_param("grant_type")
            .ok_or_else(|| OAuthError::invalid_request("missing `grant_type` parameter"))?;
        if !is_grant_or_response_type_name(grant_type) {
            return Err(OAuthError::invalid_request("`grant_type` contains invalid characters"));
        }

        let requires_secret = *self.options.require_client_authentication.get(grant_type).unwrap_or(&true);
        let (client_id, client_secret, via_header) = resolve_client_credentials(request, requires_secret)?;
        let client = self
            .model
            .get_client(&client_id, client_secret.as_deref())
            .await?
            .ok_or_else(|| client_lookup_error(via_header, "unknown client or invalid client secret"))?;

        let grant = self
            .grants
            .get(grant_type)
            .ok_or_else(|| OAuthError::unsupported_grant_type(format!("grant type `{grant_type}` is not supported")))?;
        if let Some(err) = client_grant_error(&client, grant_type) {
            return Err(err);
        }
        if !grant.required_capability(&self.model.capabilities()) {
            return Err(OAuthError::invalid_argument(format!(
                "model does not implement the capability required by grant `{grant_type}`"
            )));
        }

        let ctx = GrantContext {
            model: self.model.as_ref(),
            access_token_lifetime: self.options.access_token_lifetime_seconds,
            refresh_token_lifetime: self.options.refresh_token_lifetime_seconds,
            always_issue_new_refresh_token: self.options.always_issue_new_refresh_token,
        };
        let token = grant.handle(&ctx, request, &client).await?;

        Ok(Response::json_ok(&self.token_body(&token)))
    }

    fn token_body(&self, token: &Token<M::User>) -> Value {
        let mut map = Map::new();
        map.insert("access_token".into(), json!(token.access_token));
        map.insert("token_type".into(), json!("Bearer"));
        if let Some(expires_in) = token.expires_in(chrono::Utc::now()) {
            map.insert("expires_in".into(), json!(expires_in));
        }
        if let Some(refresh) = &token.refresh_token {
            map.insert("refresh_token".into(), json!(refresh));
        }
        if let Some(scope) = &token.scope {
            map.insert("scope".into(), json!(scope));
        }
        if self.options.allow_extended_token_attributes {
            for (key, value) in &token.extended {
                if !RESERVED_TOKEN_RESPONSE_FIELDS.contains(&key.as_str()) {
                    map.insert(key.clone(), value.clone());
                }
            }
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{ClientCredentialsGrant, PasswordGrant};
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

    fn handler() -> TokenHandler<InMemoryModel> {
        let model = Arc::new(InMemoryModel::new())
            .with_client(client())
            .with_client_user("c1", SimpleUser::new("service-account"));
        TokenHandler::new(model, TokenHandlerOptions::default())
            .with_grant("client_credentials", Arc::new(ClientCredentialsGrant))
            // registered so `unauthorized_grant_is_rejected` exercises the
            // client-grants check rather than short-circuiting on a grant
            // the registry itself doesn't know
            .with_grant("password", Arc::new(PasswordGrant))
    }

    #[tokio::test]
    async fn issues_bearer_token_on_success() {
        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Authorization", "Basic YzE6czE=")
            .with_body_field("grant_type", "client_credentials");
        let response = handler().handle(&request).await;
        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["token_type"], "Bearer");
        assert!(body["access_token"].is_string());
    }

    #[tokio::test]
    async fn unauthorized_grant_is_rejected() {
        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Authorization", "Basic YzE6czE=")
            .with_body_field("grant_type", "password");
        let response = handler().handle(&request).await;
        assert_eq!(response.status, 400);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "unauthorized_client");
    }

    #[tokio::test]
    async fn both_client_credential_sources_is_invalid_request() {
        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Authorization", "Basic YzE6czE=")
            .with_body_field("client_id", "c1")
            .with_body_field("grant_type", "client_credentials");
        let response = handler().handle(&request).await;
        assert_eq!(response.status, 400);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "invalid_request");
    }

    #[tokio::test]
    async fn unauthenticated_client_id_accepted_when_grant_does_not_require_auth() {
        let client = Client {
            id: "public1".into(),
            secret: None,
            grants: vec!["client_credentials".into()],
            redirect_uris: vec![],
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        };
        let model = Arc::new(InMemoryModel::new())
            .with_client(client)
            .with_client_user("public1", SimpleUser::new("service-account"));
        let mut require_auth = HashMap::new();
        require_auth.insert("client_credentials".to_string(), false);
        let handler = TokenHandler::new(
            model,
            TokenHandlerOptions { require_client_authentication: require_auth, ..Default::default() },
        )
        .with_grant("client_credentials", Arc::new(ClientCredentialsGrant));

        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body_field("client_id", "public1")
            .with_body_field("grant_type", "client_credentials");
        let response = handler.handle(&request).await;
        assert_eq!(response.status, 200);
    }

    /// A model that declares `client_credentials: false` even though a
    /// `ClientCredentialsGrant` is registered against it — the handler must
    /// reject this before ever calling `get_user_from_client`, which this
    /// model doesn't implement.
    struct NoClientCredentialsCapability(Arc<InMemoryModel>);

    #[async_trait::async_trait]
    impl crate::model::Model for NoClientCredentialsCapability {
        type User = SimpleUser;

        fn capabilities(&self) -> crate::model::Capabilities {
            crate::model::Capabilities { client_credentials: false, ..self.0.capabilities() }
        }

        async fn get_client(&self, client_id: &str, client_secret: Option<&str>) -> Result<Option<Client>, OAuthError> {
            self.0.get_client(client_id, client_secret).await
        }

        async fn save_token(&self, token: Token<Self::User>) -> Result<Token<Self::User>, OAuthError> {
            self.0.save_token(token).await
        }

        async fn get_access_token(&self, access_token: &str) -> Result<Option<Token<Self::User>>, OAuthError> {
            self.0.get_access_token(access_token).await
        }
    }

    #[tokio::test]
    async fn missing_capability_is_invalid_argument_before_grant_runs() {
        let inner = Arc::new(InMemoryModel::new())
            .with_client(client())
            .with_client_user("c1", SimpleUser::new("service-account"));
        let model = Arc::new(NoClientCredentialsCapability(inner));
        let handler = TokenHandler::new(model, TokenHandlerOptions::default())
            .with_grant("client_credentials", Arc::new(ClientCredentialsGrant));

        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Authorization", "Basic YzE6czE=")
            .with_body_field("grant_type", "client_credentials");
        let response = handler.handle(&request).await;
        assert_eq!(response.status, 500);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "invalid_argument");
    }

    #[tokio::test]
    async fn bad_basic_credentials_return_401_with_challenge() {
        let request = Request::new("POST")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Authorization", "Basic YzE6d3Jvbmc=") // c1:wrong
            .with_body_field("grant_type", "client_credentials");
        let response = handler().handle(&request).await;
        assert_eq!(response.status, 401);
        assert!(response
            .headers
            .iter()
            .any(|(k, v)| k == "WWW-Authenticate" && v == r#"Basic realm="Service""#));
    }
}
