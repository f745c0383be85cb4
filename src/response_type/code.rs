//! `response_type=code`: issues a single-use authorization code.

use async_trait::async_trait;

use super::ResponseType;
use crate::error::OAuthError;
use crate::grant::validate_scope;
use crate::model::Model;
use crate::token::generate_opaque_token;
use crate::types::{AuthorizationCode, Client};

pub struct CodeResponseType;

#[async_trait]
impl<M: Model> ResponseType<M> for CodeResponseType {
    fn required_grant_name(&self) -> &'static str {
        "authorization_code"
    }

    fn required_capability(&self, caps: &crate::model::Capabilities) -> bool {
        caps.authorization_code
    }

    async fn handle(
        &self,
        model: &M,
        client: &Client,
        user: &M::User,
        redirect_uri: &str,
        scope: Option<&str>,
        code_lifetime_seconds: i64,
    ) -> Result<Vec<(String, String)>, OAuthError> {
        let scope = validate_scope(model, client, user, scope).await?;
        let code = match model.generate_authorization_code(client, user).await?.filter(|c| !c.is_empty()) {
            Some(code) => code,
            None => generate_opaque_token()?,
        };

        let saved = model
            .save_authorization_code(AuthorizationCode {
                code,
                expires_at: chrono::Utc::now() + chrono::Duration::seconds(code_lifetime_seconds),
                redirect_uri: Some(redirect_uri.to_string()),
                scope,
                client: client.clone(),
                user: user.clone(),
            })
            .await?;

        Ok(vec![("code".to_string(), saved.code)])
    }
}
