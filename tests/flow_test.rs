//! End-to-end `OAuth2Server` flows not covered by `scenarios.rs`: the
//! `password` and `client_credentials` grants, and using an issued access
//! token against `authenticate`.

use std::sync::Arc;

use oauth_core::model::memory::{InMemoryModel, SimpleUser};
use oauth_core::types::Client;
use oauth_core::{Model, OAuth2Server, Request};
use serde_json::Value;

fn client(grants: &[&str]) -> Client {
    Client {
        id: "c1".into(),
        secret: Some("s1".into()),
        grants: grants.iter().map(|g| g.to_string()).collect(),
        redirect_uris: vec![],
        access_token_lifetime: None,
        refresh_token_lifetime: None,
    }
}

fn basic_auth_header() -> (&'static str, &'static str) {
    ("Authorization", "Basic YzE6czE=")
}

#[tokio::test]
async fn password_grant_then_authenticate_round_trip() {
    let model = Arc::new(InMemoryModel::new())
        .with_client(client(&["password"]))
        .with_user("alice", "hunter2", SimpleUser::new("u1"));
    let server = OAuth2Server::new(model);
    let (header, value) = basic_auth_header();

    let token_request = Request::new("POST")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_header(header, value)
        .with_body_field("grant_type", "password")
        .with_body_field("username", "alice")
        .with_body_field("password", "hunter2")
        .with_body_field("scope", "read write");
    let token_response = server.token(&token_request, None).await;
    assert_eq!(token_response.status, 200);
    let body: Value = serde_json::from_slice(&token_response.body).unwrap();
    let access_token = body["access_token"].as_str().unwrap().to_string();

    let resource_request = Request::new("GET").with_header("Authorization", format!("Bearer {access_token}"));
    let access = server.authenticate(&resource_request, Some("read"), None).await.unwrap();
    assert_eq!(access.token.user.id, "u1");
}

#[tokio::test]
async fn client_credentials_grant_issues_no_refresh_token() {
    let model = Arc::new(InMemoryModel::new())
        .with_client(client(&["client_credentials"]))
        .with_client_user("c1", SimpleUser::new("service-account"));
    let server = OAuth2Server::new(model);
    let (header, value) = basic_auth_header();

    let request = Request::new("POST")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_header(header, value)
        .with_body_field("grant_type", "client_credentials");
    let response = server.token(&request, None).await;

    assert_eq!(response.status, 200);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert!(body.get("refresh_token").is_none());
}

#[tokio::test]
async fn authenticate_rejects_expired_token() {
    let model = Arc::new(InMemoryModel::new());
    model
        .save_token(oauth_core::types::Token {
            access_token: "stale-token".into(),
            access_token_expires_at: Some(chrono::Utc::now() - chrono::Duration::seconds(5)),
            refresh_token: None,
            refresh_token_expires_at: None,
            scope: None,
            client: client(&["password"]),
            user: SimpleUser::new("u1"),
            authorization_code: None,
            extended: serde_json::Map::new(),
        })
        .await
        .unwrap();
    let server = OAuth2Server::new(model);
    let request = Request::new("GET").with_header("Authorization", "Bearer stale-token");
    let response = server.authenticate(&request, None, None).await.unwrap_err();
    assert_eq!(response.status, 401);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn grant_not_in_client_grants_is_unauthorized_client() {
    let model = Arc::new(InMemoryModel::new()).with_client(client(&["client_credentials"]));
    let server = OAuth2Server::new(model);
    let (header, value) = basic_auth_header();
    let request = Request::new("POST")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_header(header, value)
        .with_body_field("grant_type", "password")
        .with_body_field("username", "alice")
        .with_body_field("password", "hunter2");
    let response = server.token(&request, None).await;
    assert_eq!(response.status, 400);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["error"], "unauthorized_client");
}
