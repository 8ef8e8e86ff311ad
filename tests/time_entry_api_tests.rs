// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timer HTTP API tests.

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, empty_request, json_request, login};

#[tokio::test]
async fn test_start_stop_round_trip() {
    let (app, _, fx) = create_test_app().await;
    let token = login(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/time-entries/start",
            Some(&token),
            json!({ "task_id": fx.alice_task }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let started = body_json(response).await;
    assert!(started["end_time"].is_null());

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/time-entries/active", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], started["id"]);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/time-entries/stop-active",
            Some(&token),
            json!({ "comment": "done for now" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stopped = body_json(response).await;
    assert_eq!(stopped["id"], started["id"]);
    assert!(!stopped["end_time"].is_null());
    assert_eq!(stopped["comment"], "done for now");

    let response = app
        .oneshot(empty_request("GET", "/api/time-entries/active", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_start_conflicts() {
    let (app, _, fx) = create_test_app().await;
    let token = login(&app, "alice").await;

    for (task_id, expected) in [
        (fx.alice_task, StatusCode::CREATED),
        (fx.alice_task_2, StatusCode::CONFLICT),
        (fx.alice_task, StatusCode::CONFLICT),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/time-entries/start",
                Some(&token),
                json!({ "task_id": task_id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn test_stop_without_timer_is_not_found() {
    let (app, _, _) = create_test_app().await;
    let token = login(&app, "alice").await;

    let response = app
        .oneshot(empty_request(
            "POST",
            "/api/time-entries/stop-active",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_cannot_track_unassigned_task() {
    let (app, _, fx) = create_test_app().await;
    let token = login(&app, "alice").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/time-entries/start",
            Some(&token),
            json!({ "task_id": fx.bob_task }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_manager_may_track_any_task() {
    let (app, _, fx) = create_test_app().await;
    let token = login(&app, "mara").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/time-entries/start",
            Some(&token),
            json!({ "task_id": fx.bob_task }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let (app, _, _) = create_test_app().await;
    let token = login(&app, "alice").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/time-entries/start",
            Some(&token),
            json!({ "task_id": 9999 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_entry() {
    let (app, _, fx) = create_test_app().await;
    let token = login(&app, "alice").await;
    let today = Utc::now().date_naive();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/time-entries/manual",
            Some(&token),
            json!({
                "task_id": fx.alice_task,
                "day": today.to_string(),
                "duration_minutes": 45,
                "comment": "call with client"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let entry = body_json(response).await;
    assert_eq!(entry["is_manual"], true);
    assert!(entry["start_time"]
        .as_str()
        .unwrap()
        .starts_with(&format!("{}T00:00:00", today)));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/time-entries/today", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/time-entries/task/{}", fx.alice_task),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_manual_entry_rejects_non_positive_duration() {
    let (app, _, fx) = create_test_app().await;
    let token = login(&app, "alice").await;

    for minutes in [0, -30] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/time-entries/manual",
                Some(&token),
                json!({
                    "task_id": fx.alice_task,
                    "day": "2026-10-14",
                    "duration_minutes": minutes
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_duration");
    }
}

#[tokio::test]
async fn test_manual_entry_allowed_while_timer_runs() {
    let (app, state, fx) = create_test_app().await;
    let token = login(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/time-entries/start",
            Some(&token),
            json!({ "task_id": fx.alice_task }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/time-entries/manual",
            Some(&token),
            json!({
                "task_id": fx.alice_task_2,
                "day": "2026-10-14",
                "duration_minutes": 60
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(state.db.count_open_entries(fx.alice).await.unwrap(), 1);
}

#[tokio::test]
async fn test_manual_entry_past_calendar_end_is_rejected() {
    let (app, state, fx) = create_test_app().await;
    let token = login(&app, "alice").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/time-entries/manual",
            Some(&token),
            json!({
                "task_id": fx.alice_task,
                "day": "+262142-12-31",
                "duration_minutes": 1440
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state
        .db
        .entries_for_account(fx.alice)
        .await
        .unwrap()
        .is_empty());
}
