// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Productivity routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ProductivityResult, ScoreSettings, Task, TimeEntry};
use crate::services::compute_weekly_score;
use crate::time_utils::{format_utc_rfc3339, week_bounds};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/productivity/week", get(get_week_score))
        .route("/api/productivity/score", post(score_snapshot))
}

#[derive(Deserialize)]
pub struct WeekParams {
    /// Any day inside the week; defaults to today
    #[serde(default)]
    week_start: Option<NaiveDate>,
    /// Account to score; only managers and admins may ask for others
    #[serde(default)]
    account_id: Option<u64>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeekScoreResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub account_id: u64,
    pub week_start: String,
    pub week_end: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub result: ProductivityResult,
}

/// Score one account over a Monday-based week, using default settings.
async fn get_week_score(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<WeekParams>,
) -> Result<Json<WeekScoreResponse>> {
    let account_id = match params.account_id {
        Some(id) if id != user.account_id => {
            if !user.role.is_elevated() {
                return Err(AppError::Forbidden(
                    "Only managers may view other accounts".to_string(),
                ));
            }
            id
        }
        _ => user.account_id,
    };

    let day = params
        .week_start
        .unwrap_or_else(|| Utc::now().date_naive());
    let (start, end) = week_bounds(day)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported week {}", day)))?;

    let tasks = state.db.tasks_for_assignee(account_id).await?;
    let task_ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    let entries = state.db.entries_for_tasks(&task_ids).await?;

    let result = compute_weekly_score(&tasks, &entries, start, end, &ScoreSettings::default());
    tracing::debug!(
        account_id,
        week_start = %start,
        score = result.score_percent,
        "Weekly score computed"
    );

    Ok(Json(WeekScoreResponse {
        account_id,
        week_start: format_utc_rfc3339(start),
        week_end: format_utc_rfc3339(end),
        result,
    }))
}

#[derive(Deserialize)]
pub struct ScoreRequest {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub entries: Vec<TimeEntry>,
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    #[serde(default)]
    pub settings: ScoreSettings,
}

/// Evaluate the scorer on a caller-supplied snapshot.
async fn score_snapshot(Json(body): Json<ScoreRequest>) -> Result<Json<ProductivityResult>> {
    if body.week_end <= body.week_start {
        return Err(AppError::BadRequest(
            "week_end must be after week_start".to_string(),
        ));
    }

    Ok(Json(compute_weekly_score(
        &body.tasks,
        &body.entries,
        body.week_start,
        body.week_end,
        &body.settings,
    )))
}
