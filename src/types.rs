//! Core OAuth2 entities — value objects owned for the lifetime of one request.
//!
//! Generic over the host's opaque `User` representation instead of assuming
//! a concrete struct, so a host's existing user type can be carried through
//! unchanged.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// An OAuth2 client application.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: String,
    pub secret: Option<String>,
    /// Grant-type names this client is permitted to use. Non-empty.
    pub grants: Vec<String>,
    /// Registered redirect URIs, in order. Non-empty whenever `authorization_code`
    /// is in `grants`.
    pub redirect_uris: Vec<String>,
    pub access_token_lifetime: Option<u64>,
    pub refresh_token_lifetime: Option<u64>,
}

impl Client {
    pub fn has_grant(&self, grant: &str) -> bool {
        self.grants.iter().any(|g| g == grant)
    }
}

/// A single-use authorization code, bound to `(client, redirect_uri, scope, user)`
/// at issuance time.
#[derive(Debug, Clone)]
pub struct AuthorizationCode<U> {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub client: Client,
    pub user: U,
}

/// An issued access token, optionally paired with a refresh token.
#[derive(Debug, Clone)]
pub struct Token<U> {
    pub access_token: String,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub client: Client,
    pub user: U,
    /// The authorization code this token was exchanged from, when
    /// applicable — carried for audit purposes.
    pub authorization_code: Option<String>,
    /// Extension attributes, flowed through only when
    /// `TokenOptions::allow_extended_token_attributes` is set and the key is
    /// not one of the reserved response field names.
    pub extended: Map<String, Value>,
}

impl<U> Token<U> {
    /// `floor((access_token_expires_at - now) / 1s)`, clamped to zero.
    pub fn expires_in(&self, now: DateTime<Utc>) -> Option<i64> {
        self.access_token_expires_at.map(|exp| (exp - now).num_seconds().max(0))
    }
}

/// A refresh token, resolving to a `(client, user, scope)` triple.
#[derive(Debug, Clone)]
pub struct RefreshToken<U> {
    pub refresh_token: String,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub client: Client,
    pub user: U,
}

/// Reserved top-level keys in a token response body; extension attributes
/// sharing one of these names are dropped rather than overriding the
/// protocol field.
pub const RESERVED_TOKEN_RESPONSE_FIELDS: &[&str] =
    &["access_token", "token_type", "expires_in", "refresh_token", "scope"];
