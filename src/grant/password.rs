//! The Resource Owner Password Credentials grant.

use async_trait::async_trait;
use serde_json::Map;

use super::{access_token_expires_at, generate_access_token, generate_refresh_token, get_scope, refresh_token_expires_at, validate_scope, GrantContext, GrantType};
use crate::error::OAuthError;
use crate::model::Model;
use crate::request::Request;
use crate::types::{Client, Token};
use crate::validators::is_unicodecharnocrlf_str;

pub struct PasswordGrant;

#[async_trait]
impl<M: Model> GrantType<M> for PasswordGrant {
    fn required_capability(&self, caps: &crate::model::Capabilities) -> bool {
        caps.password
    }

    async fn handle(&self, ctx: &GrantContext<'_, M>, request: &Request, client: &Client) -> Result<Token<M::User>, OAuthError> {
        let username = request
            .form_param("username")
            .ok_or_else(|| OAuthError::invalid_request("missing `username` parameter"))?;
        let password = request
            .form_param("password")
            .ok_or_else(|| OAuthError::invalid_request("missing `password` parameter"))?;
        if !is_unicodecharnocrlf_str(username) || !is_unicodecharnocrlf_str(password) {
            return Err(OAuthError::invalid_request("`username`/`password` contain disallowed characters"));
        }

        let user = ctx
            .model
            .get_user(username, password)
            .await?
            .ok_or_else(|| OAuthError::invalid_grant("username or password is invalid"))?;

        let requested_scope = get_scope(request)?;
        let scope = validate_scope(ctx.model, client, &user, requested_scope.as_deref()).await?;
        let (access_token, refresh_token) = tokio::try_join!(
            generate_access_token(ctx.model, client, &user, scope.as_deref()),
            generate_refresh_token(ctx.model, client, &user, scope.as_deref()),
        )?;

        let now = chrono::Utc::now();
        let token = Token {
            access_token,
            access_token_expires_at: Some(access_token_expires_at(now, client, ctx.access_token_lifetime)),
            refresh_token: Some(refresh_token),
            refresh_token_expires_at: Some(refresh_token_expires_at(now, client, ctx.refresh_token_lifetime)),
            scope,
            client: client.clone(),
            user,
            authorization_code: None,
            extended: Map::new(),
        };
        ctx.model.save_token(token).await
    }
}
