//! An embeddable OAuth 2.0 authorization server core, conforming to RFC 6749
//! (the OAuth 2.0 framework) and RFC 6750 (Bearer Token usage).
//!
//! This crate owns no HTTP transport and no persistent storage. A host
//! decodes its own framework's request into [`request::Request`], drives one
//! of the three entry points on [`server::OAuth2Server`]
//! (`token`/`authorize`/`authenticate`), and renders the returned
//! [`response::Response`] back into its framework's response type. Persistence
//! and policy decisions are delegated to a host-supplied [`model::Model`].

pub mod error;
pub mod grant;
pub mod handler;
pub mod model;
pub mod request;
pub mod response;
pub mod response_type;
pub mod server;
pub mod token;
pub mod token_type;
pub mod types;
pub mod validators;

pub use error::{OAuthError, OAuthErrorKind};
pub use handler::{
    AuthenticateHandler, AuthenticateHandlerOptions, AuthenticatedAccess, AuthorizeHandler, AuthorizeHandlerOptions, TokenHandler,
    TokenHandlerOptions,
};
pub use model::{Capabilities, Model};
pub use request::Request;
pub use response::Response;
pub use server::OAuth2Server;
pub use types::{AuthorizationCode, Client, RefreshToken, Token};
