//! The `authorization_code` grant: exchanges a single-use code for tokens.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Map;

use super::{access_token_expires_at, generate_access_token, generate_refresh_token, refresh_token_expires_at, validate_scope, GrantContext, GrantType};
use crate::error::OAuthError;
use crate::model::Model;
use crate::request::Request;
use crate::types::{Client, Token};
use crate::validators::{is_uri, is_vschar_str};

pub struct AuthorizationCodeGrant;

#[async_trait]
impl<M: Model> GrantType<M> for AuthorizationCodeGrant {
    fn required_capability(&self, caps: &crate::model::Capabilities) -> bool {
        caps.authorization_code
    }

    async fn handle(&self, ctx: &GrantContext<'_, M>, request: &Request, client: &Client) -> Result<Token<M::User>, OAuthError> {
        // (a) `code` present and VSCHAR.
        let code = request
            .form_param("code")
            .ok_or_else(|| OAuthError::invalid_request("missing `code` parameter"))?;
        if !is_vschar_str(code) {
            return Err(OAuthError::invalid_request("`code` contains invalid characters"));
        }

        // (b) look up; must exist and belong to this client.
        let auth_code = ctx
            .model
            .get_authorization_code(code)
            .await?
            .ok_or_else(|| OAuthError::invalid_grant("authorization code is invalid"))?;
        if auth_code.client.id != client.id {
            return Err(OAuthError::invalid_grant("authorization code was not issued to this client"));
        }

        // (c) not expired.
        let now = Utc::now();
        if auth_code.expires_at <= now {
            return Err(OAuthError::invalid_grant("authorization code has expired"));
        }

        // (d) redirect_uri presence/match when the code was bound to one.
        if let Some(bound_uri) = &auth_code.redirect_uri {
            let supplied = request
                .form_param("redirect_uri")
                .ok_or_else(|| OAuthError::invalid_request("missing `redirect_uri` parameter"))?;
            if !is_uri(supplied) {
                return Err(OAuthError::invalid_request("`redirect_uri` is not a valid URI"));
            }
            if supplied != bound_uri {
                return Err(OAuthError::invalid_grant("`redirect_uri` does not match the authorization request"));
            }
        }

        // (e) revoke before issuing tokens: a replayed exchange must see
        // `invalid_grant` and must never reach `save_token`.
        let revoked = ctx.model.revoke_authorization_code(code).await?;
        if !revoked {
            return Err(OAuthError::invalid_grant("authorization code has already been used"));
        }

        // (f) issue access + refresh token, carrying the code for auditability.
        let scope = validate_scope(ctx.model, client, &auth_code.user, auth_code.scope.as_deref()).await?;
        let (access_token, refresh_token) = tokio::try_join!(
            generate_access_token(ctx.model, client, &auth_code.user, scope.as_deref()),
            generate_refresh_token(ctx.model, client, &auth_code.user, scope.as_deref()),
        )?;

        let token = Token {
            access_token,
            access_token_expires_at: Some(access_token_expires_at(now, client, ctx.access_token_lifetime)),
            refresh_token: Some(refresh_token),
            refresh_token_expires_at: Some(refresh_token_expires_at(now, client, ctx.refresh_token_lifetime)),
            scope,
            client: client.clone(),
            user: auth_code.user.clone(),
            authorization_code: Some(code.to_string()),
            extended: Map::new(),
        };
        ctx.model.save_token(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::memory::{InMemoryModel, SimpleUser};
    use crate::types::AuthorizationCode;
    use std::sync::Arc;

    fn client() -> Client {
        Client {
            id: "c1".into(),
            secret: Some("s1".into()),
            grants: vec!["authorization_code".into()],
            redirect_uris: vec!["https://x.test/cb".into()],
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        }
    }

    #[tokio::test]
    async fn replay_is_invalid_grant_and_does_not_save() {
        let model = Arc::new(InMemoryModel::new()).with_client(client());
        model.insert_authorization_code(AuthorizationCode {
            code: "abc".into(),
            expires_at: Utc::now() + chrono::Duration::seconds(60),
            redirect_uri: Some("https://x.test/cb".into()),
            scope: None,
            client: client(),
            user: SimpleUser::new("u1"),
        });
        let ctx = GrantContext { model: model.as_ref(), access_token_lifetime: 3600, refresh_token_lifetime: 1_209_600, always_issue_new_refresh_token: true };
        let request = Request::new("POST").with_body_field("code", "abc").with_body_field("redirect_uri", "https://x.test/cb");

        let first = AuthorizationCodeGrant.handle(&ctx, &request, &client()).await;
        assert!(first.is_ok());
        assert_eq!(model.save_token_calls(), 1);

        let second = AuthorizationCodeGrant.handle(&ctx, &request, &client()).await;
        assert!(matches!(second, Err(ref e) if e.kind().code() == "invalid_grant"));
        assert_eq!(model.save_token_calls(), 1, "saveToken must not be called on replay");
    }

    #[tokio::test]
    async fn expired_code_is_invalid_grant() {
        let model = Arc::new(InMemoryModel::new()).with_client(client());
        model.insert_authorization_code(AuthorizationCode {
            code: "stale".into(),
            expires_at: Utc::now() - chrono::Duration::seconds(1),
            redirect_uri: None,
            scope: None,
            client: client(),
            user: SimpleUser::new("u1"),
        });
        let ctx = GrantContext { model: model.as_ref(), access_token_lifetime: 3600, refresh_token_lifetime: 1_209_600, always_issue_new_refresh_token: true };
        let request = Request::new("POST").with_body_field("code", "stale");
        let result = AuthorizationCodeGrant.handle(&ctx, &request, &client()).await;
        assert!(matches!(result, Err(ref e) if e.kind().code() == "invalid_grant"));
        assert_eq!(model.save_token_calls(), 0);
    }

    #[tokio::test]
    async fn redirect_uri_mismatch_is_rejected() {
        let model = Arc::new(InMemoryModel::new()).with_client(client());
        model.insert_authorization_code(AuthorizationCode {
            code: "abc".into(),
            expires_at: Utc::now() + chrono::Duration::seconds(60),
            redirect_uri: Some("https://x.test/cb".into()),
            scope: None,
            client: client(),
            user: SimpleUser::new("u1"),
        });
        let ctx = GrantContext { model: model.as_ref(), access_token_lifetime: 3600, refresh_token_lifetime: 1_209_600, always_issue_new_refresh_token: true };
        let request = Request::new("POST").with_body_field("code", "abc").with_body_field("redirect_uri", "https://x.test/c");
        let result = AuthorizationCodeGrant.handle(&ctx, &request, &client()).await;
        assert!(matches!(result, Err(ref e) if e.kind().code() == "invalid_grant"));
    }
}
