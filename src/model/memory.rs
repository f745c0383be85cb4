//! Reference in-memory [`Model`] implementation, for tests and the demo binary.
//!
//! Backed by `dashmap::DashMap`s behind `Arc`, with call counters exposed so
//! tests can assert persistence-call invariants directly (e.g. that
//! `save_token` is not called again when an authorization code is replayed).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Capabilities, Model};
use crate::error::OAuthError;
use crate::types::{AuthorizationCode, Client, RefreshToken, Token};

/// An opaque user identity for the in-memory reference model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleUser {
    pub id: String,
}

impl SimpleUser {
    pub fn new(id: impl Into<String>) -> Self {
        SimpleUser { id: id.into() }
    }
}

#[derive(Default)]
struct Counters {
    save_token: AtomicUsize,
    revoke_authorization_code: AtomicUsize,
    revoke_token: AtomicUsize,
    save_authorization_code: AtomicUsize,
}

/// An in-memory [`Model`] backed by `DashMap`s, with password and
/// client-credentials user stores and full capability support.
pub struct InMemoryModel {
    clients: DashMap<String, Client>,
    authorization_codes: DashMap<String, AuthorizationCode<SimpleUser>>,
    access_tokens: DashMap<String, Token<SimpleUser>>,
    refresh_tokens: DashMap<String, RefreshToken<SimpleUser>>,
    /// username -> (password, user)
    users: DashMap<String, (String, SimpleUser)>,
    /// client id -> user used for the `client_credentials` grant
    client_users: DashMap<String, SimpleUser>,
    counters: Counters,
}

impl InMemoryModel {
    pub fn new() -> Self {
        InMemoryModel {
            clients: DashMap::new(),
            authorization_codes: DashMap::new(),
            access_tokens: DashMap::new(),
            refresh_tokens: DashMap::new(),
            users: DashMap::new(),
            client_users: DashMap::new(),
            counters: Counters::default(),
        }
    }

    pub fn with_client(self: Arc<Self>, client: Client) -> Arc<Self> {
        self.clients.insert(client.id.clone(), client);
        self
    }

    pub fn with_user(self: Arc<Self>, username: impl Into<String>, password: impl Into<String>, user: SimpleUser) -> Arc<Self> {
        self.users.insert(username.into(), (password.into(), user));
        self
    }

    pub fn with_client_user(self: Arc<Self>, client_id: impl Into<String>, user: SimpleUser) -> Arc<Self> {
        self.client_users.insert(client_id.into(), user);
        self
    }

    pub fn insert_authorization_code(&self, code: AuthorizationCode<SimpleUser>) {
        self.authorization_codes.insert(code.code.clone(), code);
    }

    pub fn insert_refresh_token(&self, token: RefreshToken<SimpleUser>) {
        self.refresh_tokens.insert(token.refresh_token.clone(), token);
    }

    pub fn save_token_calls(&self) -> usize {
        self.counters.save_token.load(Ordering::SeqCst)
    }

    pub fn revoke_authorization_code_calls(&self) -> usize {
        self.counters.revoke_authorization_code.load(Ordering::SeqCst)
    }

    pub fn revoke_token_calls(&self) -> usize {
        self.counters.revoke_token.load(Ordering::SeqCst)
    }

    pub fn save_authorization_code_calls(&self) -> usize {
        self.counters.save_authorization_code.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Model for InMemoryModel {
    type User = SimpleUser;

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            authorization_code: true,
            client_credentials: true,
            password: true,
            refresh_token: true,
            verify_scope: true,
        }
    }

    async fn get_client(&self, client_id: &str, client_secret: Option<&str>) -> Result<Option<Client>, OAuthError> {
        let Some(client) = self.clients.get(client_id) else {
            return Ok(None);
        };
        if let Some(secret) = client_secret {
            if client.secret.as_deref() != Some(secret) {
                return Ok(None);
            }
        }
        Ok(Some(client.clone()))
    }

    async fn save_token(&self, token: Token<Self::User>) -> Result<Token<Self::User>, OAuthError> {
        self.counters.save_token.fetch_add(1, Ordering::SeqCst);
        self.access_tokens.insert(token.access_token.clone(), token.clone());
        if let Some(refresh) = &token.refresh_token {
            self.refresh_tokens.insert(
                refresh.clone(),
                RefreshToken {
                    refresh_token: refresh.clone(),
                    refresh_token_expires_at: token.refresh_token_expires_at,
                    scope: token.scope.clone(),
                    client: token.client.clone(),
                    user: token.user.clone(),
                },
            );
        }
        Ok(token)
    }

    async fn get_access_token(&self, access_token: &str) -> Result<Option<Token<Self::User>>, OAuthError> {
        Ok(self.access_tokens.get(access_token).map(|e| e.value().clone()))
    }

    async fn verify_scope(&self, token: &Token<Self::User>, scope: &str) -> Result<bool, OAuthError> {
        let granted = token.scope.as_deref().unwrap_or("");
        let granted: Vec<&str> = granted.split(' ').filter(|s| !s.is_empty()).collect();
        Ok(scope.split(' ').filter(|s| !s.is_empty()).all(|s| granted.contains(&s)))
    }

    async fn get_authorization_code(&self, code: &str) -> Result<Option<AuthorizationCode<Self::User>>, OAuthError> {
        Ok(self.authorization_codes.get(code).map(|e| e.value().clone()))
    }

    async fn revoke_authorization_code(&self, code: &str) -> Result<bool, OAuthError> {
        self.counters.revoke_authorization_code.fetch_add(1, Ordering::SeqCst);
        Ok(self.authorization_codes.remove(code).is_some())
    }

    async fn save_authorization_code(
        &self,
        code: AuthorizationCode<Self::User>,
    ) -> Result<AuthorizationCode<Self::User>, OAuthError> {
        self.counters.save_authorization_code.fetch_add(1, Ordering::SeqCst);
        self.authorization_codes.insert(code.code.clone(), code.clone());
        Ok(code)
    }

    async fn get_user(&self, username: &str, password: &str) -> Result<Option<Self::User>, OAuthError> {
        Ok(self.users.get(username).and_then(|e| {
            let (stored_password, user) = e.value();
            (stored_password == password).then(|| user.clone())
        }))
    }

    async fn get_user_from_client(&self, client: &Client) -> Result<Option<Self::User>, OAuthError> {
        Ok(self.client_users.get(&client.id).map(|e| e.value().clone()))
    }

    async fn get_refresh_token(&self, refresh_token: &str) -> Result<Option<RefreshToken<Self::User>>, OAuthError> {
        Ok(self.refresh_tokens.get(refresh_token).map(|e| e.value().clone()))
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<bool, OAuthError> {
        self.counters.revoke_token.fetch_add(1, Ordering::SeqCst);
        Ok(self.refresh_tokens.remove(refresh_token).is_some())
    }
}
