//! The persistence + policy adapter contract ("the model").
//!
//! A single `#[async_trait]` trait so a handler can hold one
//! `Arc<dyn Model<User = U>>` instead of juggling several trait objects with
//! a shared associated type.
//!
//! Optional capability presence is declared statically through
//! [`Capabilities`] rather than probed at runtime: a model author states
//! which optional grants/features it backs, and handler/grant construction
//! fails fast with `OAuthErrorKind::InvalidArgument` when a requested
//! capability is absent.

pub mod memory;
#[cfg(feature = "jwt")]
pub mod jwt;

use async_trait::async_trait;

use crate::error::OAuthError;
use crate::types::{AuthorizationCode, Client, RefreshToken, Token};

/// Which optional capabilities a [`Model`] implementation backs.
///
/// `get_client` / `save_token` / `get_access_token` are always required and
/// are not represented here — they are on every `Model` unconditionally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub authorization_code: bool,
    pub client_credentials: bool,
    pub password: bool,
    pub refresh_token: bool,
    pub verify_scope: bool,
}

/// The persistence and policy adapter a host supplies to the library.
///
/// `User` is opaque to the library — it is supplied by the model and never
/// constructed or inspected here.
#[async_trait]
pub trait Model: Send + Sync + 'static {
    type User: Clone + Send + Sync + 'static;

    /// Which optional capabilities this model backs. Consulted at handler and
    /// grant construction time, not on every request.
    fn capabilities(&self) -> Capabilities;

    /// Looks up a client by id, verifying `client_secret` if given. The model
    /// owns secret comparison and should use a constant-time compare rather
    /// than relying on this being bypassed.
    async fn get_client(&self, client_id: &str, client_secret: Option<&str>) -> Result<Option<Client>, OAuthError>;

    /// Persists an issued token atomically, returning the persisted form.
    async fn save_token(&self, token: Token<Self::User>) -> Result<Token<Self::User>, OAuthError>;

    /// Looks up a previously saved access token.
    async fn get_access_token(&self, access_token: &str) -> Result<Option<Token<Self::User>>, OAuthError>;

    /// Checks whether `token` was granted `scope`. Required when a caller
    /// supplies a required scope to `authenticate`; capability
    /// `verify_scope`.
    async fn verify_scope(&self, _token: &Token<Self::User>, _scope: &str) -> Result<bool, OAuthError> {
        Err(capability_missing("verify_scope"))
    }

    /// Capability `authorization_code`.
    async fn get_authorization_code(&self, _code: &str) -> Result<Option<AuthorizationCode<Self::User>>, OAuthError> {
        Err(capability_missing("get_authorization_code"))
    }

    /// Capability `authorization_code`. Returns `true` if a code existed and
    /// was revoked; `false` if it had already been consumed.
    async fn revoke_authorization_code(&self, _code: &str) -> Result<bool, OAuthError> {
        Err(capability_missing("revoke_authorization_code"))
    }

    /// Capability `authorization_code` (also used by the authorize handler).
    async fn save_authorization_code(
        &self,
        code: AuthorizationCode<Self::User>,
    ) -> Result<AuthorizationCode<Self::User>, OAuthError> {
        let _ = code;
        Err(capability_missing("save_authorization_code"))
    }

    /// Capability `password`.
    async fn get_user(&self, _username: &str, _password: &str) -> Result<Option<Self::User>, OAuthError> {
        Err(capability_missing("get_user"))
    }

    /// Capability `client_credentials`.
    async fn get_user_from_client(&self, _client: &Client) -> Result<Option<Self::User>, OAuthError> {
        Err(capability_missing("get_user_from_client"))
    }

    /// Capability `refresh_token`.
    async fn get_refresh_token(&self, _refresh_token: &str) -> Result<Option<RefreshToken<Self::User>>, OAuthError> {
        Err(capability_missing("get_refresh_token"))
    }

    /// Capability `refresh_token`. Returns `true` if a token existed and was
    /// revoked.
    async fn revoke_token(&self, _refresh_token: &str) -> Result<bool, OAuthError> {
        Err(capability_missing("revoke_token"))
    }

    /// Optional override of access-token generation. `Ok(None)` (the default)
    /// falls back to [`crate::token::generate_opaque_token`]; a non-empty
    /// value returned here is used instead.
    async fn generate_access_token(&self, _client: &Client, _user: &Self::User, _scope: Option<&str>) -> Result<Option<String>, OAuthError> {
        Ok(None)
    }

    /// Optional override of refresh-token generation; same fallback rule.
    async fn generate_refresh_token(&self, _client: &Client, _user: &Self::User, _scope: Option<&str>) -> Result<Option<String>, OAuthError> {
        Ok(None)
    }

    /// Optional override of authorization-code generation; same fallback rule.
    async fn generate_authorization_code(&self, _client: &Client, _user: &Self::User) -> Result<Option<String>, OAuthError> {
        Ok(None)
    }

    /// Optional scope transform/validation. The default accepts the
    /// requested scope unchanged; splitting scope into individual values is
    /// left to the model, which alone knows what its scope strings mean.
    async fn validate_scope(&self, _client: &Client, _user: &Self::User, scope: Option<&str>) -> Result<Option<String>, OAuthError> {
        Ok(scope.map(str::to_string))
    }
}

fn capability_missing(method: &'static str) -> OAuthError {
    OAuthError::invalid_argument(format!("model does not implement required capability `{method}`"))
}
