//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use points_ledger::auth::TokenService;
use points_ledger::domain::{zero_birthday, Balance, Email, NewAccount};
use points_ledger::store::{AccountStore, MemoryAccountStore};
use points_ledger::{api, AppState};
use secrecy::SecretString;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn token_service() -> TokenService {
    TokenService::new(&SecretString::from(TEST_SECRET.to_string()), Duration::hours(72))
}

/// Application state over a fresh in-memory store with the default starter grant
pub fn memory_state() -> (AppState, MemoryAccountStore) {
    let store = MemoryAccountStore::new();
    let state = AppState::new(
        Arc::new(store.clone()),
        token_service(),
        Balance::new(100).unwrap(),
    );
    (state, store)
}

pub fn memory_app() -> (Router, AppState, MemoryAccountStore) {
    let (state, store) = memory_state();
    (api::create_router(state.clone()), state, store)
}

/// Insert an account directly, skipping password hashing
pub async fn seed_account(store: &dyn AccountStore, email: &str, points: i64) -> Uuid {
    let account = store
        .create(NewAccount {
            id: Uuid::new_v4(),
            email: Email::parse(email).unwrap(),
            password_hash: "$argon2id$unused".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            birthday: zero_birthday(),
            points: Balance::new(points).unwrap(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    account.id
}

pub async fn points_of(store: &dyn AccountStore, id: Uuid) -> i64 {
    store.find_by_id(id).await.unwrap().unwrap().points.value()
}

/// Send a JSON request, returning status and parsed body (`Null` if empty or not JSON)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn register(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/register",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration of {email} failed: {body}");
    body
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login of {email} failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Send a raw JSON-typed body that may not parse
pub async fn send_raw(app: &Router, uri: &str, token: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
