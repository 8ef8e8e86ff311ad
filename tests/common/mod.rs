// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use std::sync::Arc;
use timekeep_core::config::Config;
use timekeep_core::db::{MemoryDb, NewAccount};
use timekeep_core::models::{Role, Task, TaskStatus};
use timekeep_core::routes::create_router;
use timekeep_core::services::password::hash_password_with;
use timekeep_core::AppState;
use tower::ServiceExt;

#[allow(dead_code)]
pub const PASSWORD: &str = "password123";

/// IDs of the seeded fixtures.
#[allow(dead_code)]
pub struct Fixture {
    pub alice: u64,
    pub bob: u64,
    pub manager: u64,
    pub admin: u64,
    /// Assigned to alice
    pub alice_task: u64,
    /// Also assigned to alice
    pub alice_task_2: u64,
    /// Assigned to bob
    pub bob_task: u64,
}

async fn seed_account(db: &MemoryDb, username: &str, role: Role) -> u64 {
    db.create_account(NewAccount {
        username: username.to_string(),
        password_hash: hash_password_with(PASSWORD, 1_000).unwrap(),
        full_name: username.to_string(),
        job_title: String::new(),
        role,
        is_active: true,
    })
    .await
    .unwrap()
    .id
}

async fn seed_task(db: &MemoryDb, id: u64, assignee: u64) {
    db.upsert_task(Task {
        id,
        title: format!("Task {}", id),
        assignee_id: Some(assignee),
        estimated_hours: 2.0,
        deadline: None,
        assigned_at_utc: Some(chrono::Utc::now()),
        completed_at_utc: None,
        status: TaskStatus::InProgress,
    })
    .await
    .unwrap();
}

/// Create a test app backed by a fresh in-memory store with seeded
/// accounts and tasks.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, Fixture) {
    let db = MemoryDb::new();

    let alice = seed_account(&db, "alice", Role::Employee).await;
    let bob = seed_account(&db, "bob", Role::Employee).await;
    let manager = seed_account(&db, "mara", Role::Manager).await;
    let admin = seed_account(&db, "root", Role::Admin).await;

    seed_task(&db, 100, alice).await;
    seed_task(&db, 101, alice).await;
    seed_task(&db, 200, bob).await;

    let state = Arc::new(AppState::new(Config::default(), db));
    let fixture = Fixture {
        alice,
        bob,
        manager,
        admin,
        alice_task: 100,
        alice_task_2: 101,
        bob_task: 200,
    };

    (create_router(state.clone()), state, fixture)
}

/// Build a JSON request, optionally with a bearer token.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a body-less request, optionally with a bearer token.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in over HTTP and return the token.
#[allow(dead_code)]
pub async fn login(app: &axum::Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            serde_json::json!({ "username": username, "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200, "login for {} failed", username);
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}
