// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timer routes: start/stop, manual entries and timesheet queries.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::TimeEntry;
use crate::services::ManualEntry;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/time-entries/active", get(get_active))
        .route("/api/time-entries/today", get(get_today))
        .route("/api/time-entries/task/{task_id}", get(get_for_task))
        .route("/api/time-entries/start", post(start_timer))
        .route("/api/time-entries/stop-active", post(stop_active))
        .route("/api/time-entries/manual", post(add_manual))
}

// ─── Queries ─────────────────────────────────────────────────

async fn get_active(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TimeEntry>> {
    state
        .timer
        .active_entry(user.account_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No running timer".to_string()))
}

/// Entries overlapping the current UTC day, newest first.
async fn get_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<TimeEntry>>> {
    let now = Utc::now();
    let entries = state
        .timer
        .entries_for_day(user.account_id, now.date_naive(), now)
        .await?;
    Ok(Json(entries))
}

async fn get_for_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<u64>,
) -> Result<Json<Vec<TimeEntry>>> {
    let entries = state
        .timer
        .entries_for_task(user.account_id, task_id)
        .await?;
    Ok(Json(entries))
}

// ─── Mutations ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StartRequest {
    pub task_id: u64,
}

async fn start_timer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<StartRequest>,
) -> Result<(StatusCode, Json<TimeEntry>)> {
    let entry = state
        .timer
        .start(user.account_id, user.role, body.task_id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Deserialize, Default, Validate)]
pub struct StopRequest {
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

async fn stop_active(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Option<Json<StopRequest>>,
) -> Result<Json<TimeEntry>> {
    let Json(body) = body.unwrap_or_default();
    body.validate()?;

    state
        .timer
        .stop(user.account_id, body.comment, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No running timer".to_string()))
}

#[derive(Deserialize, Validate)]
pub struct ManualEntryRequest {
    pub task_id: u64,
    /// UTC calendar day the work happened on
    pub day: NaiveDate,
    #[validate(range(max = 1440))]
    pub duration_minutes: i64,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub comment: String,
}

async fn add_manual(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ManualEntryRequest>,
) -> Result<(StatusCode, Json<TimeEntry>)> {
    body.validate()?;

    let entry = state
        .timer
        .add_manual_entry(
            user.account_id,
            user.role,
            ManualEntry {
                task_id: body.task_id,
                day: body.day,
                duration: Duration::minutes(body.duration_minutes),
                comment: body.comment,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
