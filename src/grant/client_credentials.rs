//! The `client_credentials` grant. Issues an access token only — RFC 6749
//! §4.4.3 forbids refresh tokens on this grant.

use async_trait::async_trait;
use serde_json::Map;

use super::{access_token_expires_at, generate_access_token, get_scope, validate_scope, GrantContext, GrantType};
use crate::error::OAuthError;
use crate::model::Model;
use crate::request::Request;
use crate::types::{Client, Token};

pub struct ClientCredentialsGrant;

#[async_trait]
impl<M: Model> GrantType<M> for ClientCredentialsGrant {
    fn required_capability(&self, caps: &crate::model::Capabilities) -> bool {
        caps.client_credentials
    }

    async fn handle(&self, ctx: &GrantContext<'_, M>, request: &Request, client: &Client) -> Result<Token<M::User>, OAuthError> {
        let user = ctx
            .model
            .get_user_from_client(client)
            .await?
            .ok_or_else(|| OAuthError::invalid_grant("client is not associated with a user"))?;

        let requested_scope = get_scope(request)?;
        let scope = validate_scope(ctx.model, client, &user, requested_scope.as_deref()).await?;
        let access_token = generate_access_token(ctx.model, client, &user, scope.as_deref()).await?;

        let now = chrono::Utc::now();
        let token = Token {
            access_token,
            access_token_expires_at: Some(access_token_expires_at(now, client, ctx.access_token_lifetime)),
            refresh_token: None,
            refresh_token_expires_at: None,
            scope,
            client: client.clone(),
            user,
            authorization_code: None,
            extended: Map::new(),
        };
        ctx.model.save_token(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::memory::{InMemoryModel, SimpleUser};
    use std::sync::Arc;

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
    async fn issues_access_token_without_refresh_token() {
        let model = Arc::new(InMemoryModel::new())
            .with_client(client())
            .with_client_user("c1", SimpleUser::new("service-account"));
        let ctx = GrantContext { model: model.as_ref(), access_token_lifetime: 3600, refresh_token_lifetime: 1_209_600, always_issue_new_refresh_token: true };
        let request = Request::new("POST");
        let token = ClientCredentialsGrant.handle(&ctx, &request, &client()).await.unwrap();
        assert!(token.refresh_token.is_none());
        assert_eq!(token.user.id, "service-account");
    }

    #[tokio::test]
    async fn unknown_client_user_is_invalid_grant() {
        let model = Arc::new(InMemoryModel::new()).with_client(client());
        let ctx = GrantContext { model: model.as_ref(), access_token_lifetime: 3600, refresh_token_lifetime: 1_209_600, always_issue_new_refresh_token: true };
        let request = Request::new("POST");
        let result = ClientCredentialsGrant.handle(&ctx, &request, &client()).await;
        assert!(matches!(result, Err(ref e) if e.kind().code() == "invalid_grant"));
    }
}
