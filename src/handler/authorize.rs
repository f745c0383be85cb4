//! `GET/POST /authorize`: validates an authorization request and redirects
//! back to the client with either a grant (code) or an error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::OAuthError;
use crate::model::Model;
use crate::request::Request;
use crate::response::Response;
use crate::response_type::ResponseType;
use crate::validators::{is_grant_or_response_type_name, is_uri, is_vschar_str};

/// Tunables for [`AuthorizeHandler`]. Defaults follow `spec.md` §4.1: a
/// five-minute authorization-code lifetime and a required `state`.
#[derive(Debug, Clone)]
pub struct AuthorizeHandlerOptions {
    /// `state` is required unless this is set — an un-set `state` on a
    /// public client is the easiest CSRF mistake to make, so the default
    /// does not allow skipping it silently.
    pub allow_empty_state: bool,
    pub authorization_code_lifetime_seconds: i64,
}

impl Default for AuthorizeHandlerOptions {
    fn default() -> Self {
        AuthorizeHandlerOptions { allow_empty_state: false, authorization_code_lifetime_seconds: 300 }
    }
}

/// Dispatches `/authorize` requests to the response type registered under
/// the request's `response_type` value, once a resource owner has approved
/// the request (`user` is the already-authenticated, already-consenting
/// principal — this handler does not perform login or consent UI; a host
/// runs its own authentication/consent step before calling `handle`, then
/// passes `None` for `user` when the resource owner denied consent).
pub struct AuthorizeHandler<M: Model> {
    model: Arc<M>,
    response_types: HashMap<String, Arc<dyn ResponseType<M>>>,
    options: AuthorizeHandlerOptions,
}

impl<M: Model> AuthorizeHandler<M> {
    pub fn new(model: Arc<M>, options: AuthorizeHandlerOptions) -> Self {
        AuthorizeHandler { model, response_types: HashMap::new(), options }
    }

    pub fn with_response_type(mut self, name: impl Into<String>, response_type: Arc<dyn ResponseType<M>>) -> Self {
        self.response_types.insert(name.into(), response_type);
        self
    }

    /// `user` is `None` when the resource owner denied consent (`allowed=false`)
    /// or has not yet authenticated; `Some` once a host's login/consent UI has
    /// approved the request.
    pub async fn handle(&self, request: &Request, user: Option<&M::User>) -> Response {
        match self.try_handle(request, user).await {
            Ok(response) => response,
            Err((err, redirect_uri, state)) => {
                err.log();
                match redirect_uri {
                    Some(uri) if !err.kind().is_programmer_error() => {
                        let params = err.to_redirect_params(state.as_deref());
                        Response::redirect(append_query(&uri, &params))
                    }
                    _ => Response::json_error(err.status_code(), &err.to_json()),
                }
            }
        }
    }

    async fn try_handle(
        &self,
        request: &Request,
        user: Option<&M::User>,
    ) -> Result<Response, (OAuthError, Option<String>, Option<String>)> {
        let client_id = request
            .body_or_query("client_id")
            .ok_or_else(|| (OAuthError::invalid_request("missing `client_id` parameter"), None, None))?;
        if !is_vschar_str(client_id) {
            return Err((OAuthError::invalid_request("`client_id` contains invalid characters"), None, None));
        }
        let client = self
            .model
            .get_client(client_id, None)
            .await
            .map_err(|e| (e, None, None))?
            .ok_or_else(|| (OAuthError::invalid_client("unknown client"), None, None))?;

        let state = request.body_or_query("state").map(str::to_string);
        let supplied_redirect_uri = request.body_or_query("redirect_uri");
        let redirect_uri = resolve_redirect_uri(&client, supplied_redirect_uri)
            .map_err(|e| (e, None, state.clone()))?;

        // From here on, a rejection is reported by redirecting back to
        // `redirect_uri` with error parameters rather than as a JSON body.
        let run = || async {
            if !self.options.allow_empty_state && state.as_deref().map(str::is_empty).unwrap_or(true) {
                return Err(OAuthError::invalid_request("missing `state` parameter"));
            }
            if let Some(s) = &state {
                if !is_vschar_str(s) {
                    return Err(OAuthError::invalid_request("`state` contains invalid characters"));
                }
            }

            if request.body_or_query("allowed") == Some("false") {
                return Err(OAuthError::access_denied("resource owner denied the authorization request"));
            }
            let user = user.ok_or_else(|| OAuthError::server_error("no authenticated user was supplied to the authorize handler"))?;

            let response_type = request
                .body_or_query("response_type")
                .ok_or_else(|| OAuthError::invalid_request("missing `response_type` parameter"))?;
            if !is_grant_or_response_type_name(response_type) {
                return Err(OAuthError::invalid_request("`response_type` contains invalid characters"));
            }
            let handler = self
                .response_types
                .get(response_type)
                .ok_or_else(|| OAuthError::unsupported_response_type(format!("response type `{response_type}` is not supported")))?;
            if !handler.required_capability(&self.model.capabilities()) {
                return Err(OAuthError::invalid_argument(format!(
                    "model does not implement the capability required by response type `{response_type}`"
                )));
            }
            if !client.has_grant(handler.required_grant_name()) {
                return Err(OAuthError::unauthorized_client(format!(
                    "client `{}` is not authorized for grant `{}`",
                    client.id,
                    handler.required_grant_name()
                )));
            }

            let scope = request.body_or_query("scope");
            if !Request::valid_scope_syntax(scope) {
                return Err(OAuthError::invalid_scope("scope contains invalid characters"));
            }

            handler
                .handle(self.model.as_ref(), &client, user, &redirect_uri, scope, self.options.authorization_code_lifetime_seconds)
                .await
        };

        match run().await {
            Ok(params) => {
                let mut params = params;
                if let Some(state) = &state {
                    params.push(("state".to_string(), state.clone()));
                }
                Ok(Response::redirect(append_query(&redirect_uri, &params)))
            }
            Err(err) => Err((err, Some(redirect_uri), state)),
        }
    }
}

fn resolve_redirect_uri(client: &crate::types::Client, supplied: Option<&str>) -> Result<String, OAuthError> {
    match supplied {
        Some(uri) => {
            if !is_uri(uri) {
                return Err(OAuthError::invalid_request("`redirect_uri` is not a valid URI"));
            }
            if !client.redirect_uris.iter().any(|registered| registered == uri) {
                return Err(OAuthError::invalid_request("`redirect_uri` does not match a registered URI"));
            }
            Ok(uri.to_string())
        }
        None => client
            .redirect_uris
            .first()
            .cloned()
            .ok_or_else(|| OAuthError::invalid_request("client has no registered redirect URI")),
    }
}

fn append_query(uri: &str, params: &[(String, String)]) -> String {
    let encoded = params
        .iter()
        .map(|(k, v)| format!("{}={}", starberry_lib::encode_url_owned(k), starberry_lib::encode_url_owned(v)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if uri.contains('?') { '&' } else { '?' };
    if encoded.is_empty() {
        uri.to_string()
    } else {
        format!("{uri}{separator}{encoded}")
    }
}
