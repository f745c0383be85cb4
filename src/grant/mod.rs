//! Grant-type handlers.
//!
//! Each grant is constructed with shared configuration and exposes one
//! `handle` entry point that validates its inputs against a [`Model`] and
//! issues a [`Token`].

pub mod authorization_code;
pub mod client_credentials;
pub mod password;
pub mod refresh_token;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::OAuthError;
use crate::model::{Capabilities, Model};
use crate::request::Request;
use crate::token::generate_opaque_token;
use crate::types::{Client, Token};

pub use authorization_code::AuthorizationCodeGrant;
pub use client_credentials::ClientCredentialsGrant;
pub use password::PasswordGrant;
pub use refresh_token::RefreshTokenGrant;

/// Per-request configuration shared by every grant.
pub struct GrantContext<'a, M: Model> {
    pub model: &'a M,
    pub access_token_lifetime: u64,
    pub refresh_token_lifetime: u64,
    /// `false` disables refresh-token rotation in `refresh_token`. A plain
    /// `bool` rather than `Option<bool>` so the caller must set it
    /// explicitly instead of relying on an "unset" state to mean anything.
    pub always_issue_new_refresh_token: bool,
}

/// Common shape every grant conforms to: `handle(request, client) -> Token`.
#[async_trait]
pub trait GrantType<M: Model>: Send + Sync {
    /// Whether `caps` declares the model capabilities this grant needs.
    /// Checked against `model.capabilities()` before a grant is invoked, so a
    /// model missing a required capability is caught as `invalid_argument`
    /// before any of its methods are called, rather than surfacing as
    /// whatever `OAuthError` that method's default body happens to return.
    /// Extension grants that don't correspond to one of `Capabilities`'s
    /// fields accept unconditionally.
    fn required_capability(&self, caps: &Capabilities) -> bool {
        let _ = caps;
        true
    }

    async fn handle(&self, ctx: &GrantContext<'_, M>, request: &Request, client: &Client) -> Result<Token<M::User>, OAuthError>;
}

/// Resolves the access token, using the model's override if it returns one,
/// else falling back to a random opaque token.
pub async fn generate_access_token<M: Model>(model: &M, client: &Client, user: &M::User, scope: Option<&str>) -> Result<String, OAuthError> {
    match model.generate_access_token(client, user, scope).await?.filter(|t| !t.is_empty()) {
        Some(token) => Ok(token),
        None => generate_opaque_token(),
    }
}

/// Same fallback rule as [`generate_access_token`], for refresh tokens.
pub async fn generate_refresh_token<M: Model>(model: &M, client: &Client, user: &M::User, scope: Option<&str>) -> Result<String, OAuthError> {
    match model.generate_refresh_token(client, user, scope).await?.filter(|t| !t.is_empty()) {
        Some(token) => Ok(token),
        None => generate_opaque_token(),
    }
}

pub fn access_token_expires_at(now: DateTime<Utc>, client: &Client, default_lifetime: u64) -> DateTime<Utc> {
    let lifetime = client.access_token_lifetime.unwrap_or(default_lifetime);
    now + chrono::Duration::seconds(lifetime as i64)
}

pub fn refresh_token_expires_at(now: DateTime<Utc>, client: &Client, default_lifetime: u64) -> DateTime<Utc> {
    let lifetime = client.refresh_token_lifetime.unwrap_or(default_lifetime);
    now + chrono::Duration::seconds(lifetime as i64)
}

/// Parses the `scope` form field, validating `NQSCHAR` syntax.
pub fn get_scope(request: &Request) -> Result<Option<String>, OAuthError> {
    match request.form_param("scope") {
        None => Ok(None),
        Some(scope) if crate::validators::is_nqschar_str(scope) => Ok(Some(scope.to_string())),
        Some(_) => Err(OAuthError::invalid_scope("scope contains invalid characters")),
    }
}

/// Runs the model's scope validation/transform hook, defaulting to
/// accepting the requested scope unchanged.
pub async fn validate_scope<M: Model>(
    model: &M,
    client: &Client,
    user: &M::User,
    scope: Option<&str>,
) -> Result<Option<String>, OAuthError> {
    model.validate_scope(client, user, scope).await
}
