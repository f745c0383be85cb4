//! Cryptographically random opaque token generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::OAuthError;

/// Number of random bytes backing a generated opaque token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Generates a fresh, cryptographically random, base64url opaque token.
///
/// Used as the fallback whenever a `Model` does not override token
/// generation (`generate_access_token` / `generate_refresh_token` /
/// `generate_authorization_code`). A system RNG failure is vanishingly rare
/// but not a programmer error, so it is propagated as `server_error` rather
/// than panicking.
pub fn generate_opaque_token() -> Result<String, OAuthError> {
    let rng = SystemRandom::new();
    let mut buf = [0u8; TOKEN_BYTES];
    rng.fill(&mut buf).map_err(OAuthError::wrap)?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}
