//! `response_type` handlers for the authorize endpoint.

pub mod code;

use async_trait::async_trait;

use crate::error::OAuthError;
use crate::model::{Capabilities, Model};
use crate::types::Client;

pub use code::CodeResponseType;

/// What an authorize request wants back: a query-string fragment to append
/// to the client's redirect URI on success.
#[async_trait]
pub trait ResponseType<M: Model>: Send + Sync {
    /// The grant-type name `client.grants` must contain for this response
    /// type to be usable (e.g. `code` requires `authorization_code`) — the
    /// two are named differently in RFC 6749, so this is not the
    /// `response_type` string itself.
    fn required_grant_name(&self) -> &'static str;

    /// Whether `caps` declares the model capabilities this response type
    /// needs, checked before use for the same reason
    /// [`crate::grant::GrantType::required_capability`] is.
    fn required_capability(&self, caps: &Capabilities) -> bool {
        let _ = caps;
        true
    }

    async fn handle(
        &self,
        model: &M,
        client: &Client,
        user: &M::User,
        redirect_uri: &str,
        scope: Option<&str>,
        code_lifetime_seconds: i64,
    ) -> Result<Vec<(String, String)>, OAuthError>;
}
