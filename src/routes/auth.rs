// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public authentication routes: registration and login.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::Result;
use crate::middleware::SESSION_COOKIE;
use crate::models::Role;
use crate::services::LoginOutcome;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub job_title: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub account_id: u64,
    pub session_id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token,
            account_id: outcome.account.id,
            session_id: outcome.session_id,
            username: outcome.account.username,
            full_name: outcome.account.full_name,
            role: outcome.account.role,
        }
    }
}

/// Attach the session cookie for browser clients.
pub(crate) fn with_session_cookie(jar: CookieJar, token: &str) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/"),
    )
}

/// Create an employee account and start its first session.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    body.validate()?;

    let outcome = state
        .sessions
        .register(&body.username, &body.password, &body.full_name, &body.job_title)
        .await?;

    let jar = with_session_cookie(jar, &outcome.token);
    Ok((jar, Json(outcome.into())))
}

/// Log in, replacing any session the account had on another device.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    body.validate()?;

    let outcome = state.sessions.login(&body.username, &body.password).await?;

    let jar = with_session_cookie(jar, &outcome.token);
    Ok((jar, Json(outcome.into())))
}
