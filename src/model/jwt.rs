//! Optional JWT access-token extension point (`feature = "jwt"`).
//!
//! HS256 encode/decode helpers via `jsonwebtoken`, meant to be composed into
//! a `Model` implementation's `generate_access_token`/`get_access_token` so
//! access tokens can be self-contained signed JWTs instead of opaque lookup
//! keys, while authorization codes, refresh tokens, and clients remain in
//! whatever storage the model otherwise uses.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::OAuthError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    client_id: String,
    scope: Option<String>,
    exp: i64,
}

/// Encodes and verifies HS256 JWT access tokens carrying `(user id, client
/// id, scope)`.
pub struct JwtAccessTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAccessTokens {
    pub fn new_hs256(secret: &[u8]) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        JwtAccessTokens {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Encodes a signed access token valid for `lifetime_seconds`.
    pub fn encode(&self, user_id: &str, client_id: &str, scope: Option<&str>, lifetime_seconds: i64) -> Result<String, OAuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            client_id: client_id.to_string(),
            scope: scope.map(str::to_string),
            exp: (Utc::now() + chrono::Duration::seconds(lifetime_seconds)).timestamp(),
        };
        encode(&Header::new(jsonwebtoken::Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(OAuthError::wrap)
    }

    /// Decodes and validates a signed access token, returning
    /// `(user_id, client_id, scope, expires_at_unix)`.
    pub fn decode(&self, token: &str) -> Result<(String, String, Option<String>, i64), OAuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| OAuthError::invalid_token("malformed or expired JWT").with_cause(e))?;
        Ok((data.claims.sub, data.claims.client_id, data.claims.scope, data.claims.exp))
    }
}
