//! The `refresh_token` grant: exchanges a refresh token for a new access
//! token, optionally rotating the refresh token itself.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Map;

use super::{access_token_expires_at, generate_access_token, generate_refresh_token, refresh_token_expires_at, validate_scope, GrantContext, GrantType};
use crate::error::OAuthError;
use crate::model::Model;
use crate::request::Request;
use crate::types::{Client, Token};
use crate::validators::is_vschar_str;

pub struct RefreshTokenGrant;

#[async_trait]
impl<M: Model> GrantType<M> for RefreshTokenGrant {
    fn required_capability(&self, caps: &crate::model::Capabilities) -> bool {
        caps.refresh_token
    }

    async fn handle(&self, ctx: &GrantContext<'_, M>, request: &Request, client: &Client) -> Result<Token<M::User>, OAuthError> {
        let supplied = request
            .form_param("refresh_token")
            .ok_or_else(|| OAuthError::invalid_request("missing `refresh_token` parameter"))?;
        if !is_vschar_str(supplied) {
            return Err(OAuthError::invalid_request("`refresh_token` contains invalid characters"));
        }

        let existing = ctx
            .model
            .get_refresh_token(supplied)
            .await?
            .ok_or_else(|| OAuthError::invalid_grant("refresh token is invalid"))?;
        if existing.client.id != client.id {
            return Err(OAuthError::invalid_grant("refresh token was not issued to this client"));
        }
        let now = Utc::now();
        if let Some(expires_at) = existing.refresh_token_expires_at {
            if expires_at <= now {
                return Err(OAuthError::invalid_grant("refresh token has expired"));
            }
        }

        // A requested scope must not exceed what the refresh token was
        // originally granted; the model's `validate_scope` is the place a
        // host enforces anything stricter than plain equality.
        let requested_scope = super::get_scope(request)?;
        let scope = match requested_scope {
            Some(ref requested) => {
                let granted = existing.scope.as_deref().unwrap_or("");
                let granted_set: Vec<&str> = granted.split(' ').filter(|s| !s.is_empty()).collect();
                let within_bounds = requested
                    .split(' ')
                    .filter(|s| !s.is_empty())
                    .all(|s| granted_set.contains(&s));
                if !within_bounds {
                    return Err(OAuthError::invalid_scope("requested scope exceeds the scope originally granted"));
                }
                validate_scope(ctx.model, client, &existing.user, Some(requested)).await?
            }
            None => existing.scope.clone(),
        };

        let (access_token, new_refresh_token) = if ctx.always_issue_new_refresh_token {
            ctx.model.revoke_token(supplied).await?;
            tokio::try_join!(
                generate_access_token(ctx.model, client, &existing.user, scope.as_deref()),
                generate_refresh_token(ctx.model, client, &existing.user, scope.as_deref()),
            )
            .map(|(access, refresh)| (access, Some(refresh)))?
        } else {
            let access = generate_access_token(ctx.model, client, &existing.user, scope.as_deref()).await?;
            (access, None)
        };

        let token = Token {
            access_token,
            access_token_expires_at: Some(access_token_expires_at(now, client, ctx.access_token_lifetime)),
            refresh_token_expires_at: new_refresh_token
                .as_ref()
                .map(|_| refresh_token_expires_at(now, client, ctx.refresh_token_lifetime)),
            refresh_token: new_refresh_token,
            scope,
            client: client.clone(),
            user: existing.user.clone(),
            authorization_code: None,
            extended: Map::new(),
        };
        ctx.model.save_token(token).await
    }
}
