//! Endpoint handlers: the library's entry points for a host's HTTP layer.

pub mod authenticate;
pub mod authorize;
pub mod token;

pub use authenticate::{AuthenticateHandler, AuthenticateHandlerOptions};
pub use authorize::{AuthorizeHandler, AuthorizeHandlerOptions};
pub use token::{TokenHandler, TokenHandlerOptions};

use crate::error::OAuthError;
use crate::request::Request;
use crate::types::Client;
use crate::validators::is_vschar_str;

/// Resolves client credentials from exactly one of the `Authorization`
/// header (HTTP Basic) or the request body's `client_id`/`client_secret`
/// fields. Presence of both is rejected symmetrically with how
/// [`crate::token_type::bearer`] rejects multiple simultaneous bearer-token
/// sources.
///
/// `requires_secret` is `false` only when the caller already knows the
/// dispatched grant does not require client authentication
/// (`TokenHandlerOptions::require_client_authentication`) — in that case a
/// bare `client_id` in the body is accepted unauthenticated.
///
/// Returns `(client_id, client_secret, presented_via_authorization_header)`.
pub(crate) fn resolve_client_credentials(request: &Request, requires_secret: bool) -> Result<(String, Option<String>, bool), OAuthError> {
    let from_header = request.basic_auth();
    let body_client_id = request.form_param("client_id").map(str::to_string);
    let body_client_secret = request.form_param("client_secret").map(str::to_string);

    let (client_id, client_secret, via_header) = match (from_header, body_client_id) {
        (Some(_), Some(_)) => {
            return Err(OAuthError::invalid_request(
                "client credentials must be presented via exactly one of the Authorization header or the request body",
            ))
        }
        (Some((id, secret)), None) => (id, Some(secret), true),
        (None, Some(id)) => {
            let secret = match body_client_secret {
                Some(secret) => Some(secret),
                None if requires_secret => {
                    return Err(OAuthError::invalid_request("missing `client_secret` parameter"))
                }
                None => None,
            };
            (id, secret, false)
        }
        (None, None) => return Err(OAuthError::invalid_client("no client credentials were presented")),
    };

    if client_id.is_empty() || !is_vschar_str(&client_id) {
        return Err(OAuthError::invalid_request("`client_id` contains invalid characters"));
    }
    if let Some(secret) = &client_secret {
        if !is_vschar_str(secret) {
            return Err(OAuthError::invalid_request("`client_secret` contains invalid characters"));
        }
    }

    Ok((client_id, client_secret, via_header))
}

pub(crate) fn client_lookup_error(via_header: bool, message: &str) -> OAuthError {
    if via_header {
        OAuthError::invalid_client_via_header(message.to_string())
    } else {
        OAuthError::invalid_client(message.to_string())
    }
}

pub(crate) fn client_grant_error(client: &Client, grant_type: &str) -> Option<OAuthError> {
    if client.has_grant(grant_type) {
        None
    } else {
        Some(OAuthError::unauthorized_client(format!(
            "client `{}` is not authorized to use grant type `{grant_type}`",
            client.id
        )))
    }
}
