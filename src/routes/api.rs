// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::models::{AccountView, Role};
use crate::routes::auth::{with_session_cookie, LoginResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Account routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/profile", put(update_profile))
        .route("/api/me/password", put(change_password))
        .route("/api/users", get(list_accounts))
        .route("/api/users/{id}/role", put(change_role))
        .route("/api/users/{id}/deactivate", put(deactivate_account))
        .route("/api/users/{id}/activate", put(activate_account))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get current account profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AccountView>> {
    let account = state
        .db
        .get_account(user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {} not found", user.account_id)))?;

    Ok(Json(AccountView::from(&account)))
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub job_title: String,
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<AccountView>> {
    body.validate()?;

    let account = state
        .db
        .update_account(user.account_id, |a| {
            a.full_name = body.full_name;
            a.job_title = body.job_title;
        })
        .await?;

    tracing::info!(account_id = user.account_id, "Profile updated");
    Ok(Json(AccountView::from(&account)))
}

// ─── Password ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Change the password. Other devices are signed out; the caller receives a
/// fresh token for the new session.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    body.validate()?;

    let outcome = state
        .sessions
        .change_password(user.account_id, &body.current_password, &body.new_password)
        .await?;

    let jar = with_session_cookie(jar, &outcome.token);
    Ok((jar, Json(outcome.into())))
}

// ─── Administration ──────────────────────────────────────────

/// List every account (admin only).
async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<AccountView>>> {
    require_admin(&user)?;

    let accounts = state.db.list_accounts().await?;
    Ok(Json(accounts.iter().map(AccountView::from).collect()))
}

#[derive(Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// Change an account's role (admin only). Takes effect on the account's next
/// request since roles are read from the store, not the token.
async fn change_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<Json<AccountView>> {
    require_admin(&user)?;
    if id == user.account_id && body.role != Role::Admin {
        return Err(AppError::BadRequest(
            "Cannot remove your own admin role".to_string(),
        ));
    }

    let account = state
        .db
        .update_account(id, |a| a.role = body.role)
        .await?;

    tracing::info!(
        admin_id = user.account_id,
        account_id = id,
        role = ?body.role,
        "Account role changed"
    );
    Ok(Json(AccountView::from(&account)))
}

async fn set_active(
    state: &AppState,
    admin: &AuthUser,
    account_id: u64,
    is_active: bool,
) -> Result<Json<AccountView>> {
    require_admin(admin)?;
    if !is_active && account_id == admin.account_id {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own account".to_string(),
        ));
    }

    let account = state
        .db
        .update_account(account_id, |a| a.is_active = is_active)
        .await?;

    tracing::info!(
        admin_id = admin.account_id,
        account_id,
        is_active,
        "Account activation changed"
    );
    Ok(Json(AccountView::from(&account)))
}

/// Deactivate an account (admin only). Its tokens stop validating at once.
async fn deactivate_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<AccountView>> {
    set_active(&state, &user, id, false).await
}

async fn activate_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<AccountView>> {
    set_active(&state, &user, id, true).await
}
