// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presence routes: heartbeat, logout and presence queries.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::middleware::SESSION_COOKIE;
use crate::models::PresenceState;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/presence", get(get_presence))
        .route("/api/presence/heartbeat", post(heartbeat))
        .route("/api/presence/logout", post(logout))
}

async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode> {
    state.presence.heartbeat(user.account_id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Go offline and drop the cookie. The session itself is not revoked.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    state.sessions.logout(user.account_id).await?;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

#[derive(Deserialize)]
pub struct PresenceParams {
    /// Comma-separated account IDs; all accounts when absent
    #[serde(default)]
    ids: Option<String>,
}

fn parse_ids(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| AppError::BadRequest(format!("Invalid account id: {}", s)))
        })
        .collect()
}

/// Employees may only ask about themselves.
fn check_presence_scope(user: &AuthUser, ids: Option<&[u64]>) -> Result<()> {
    if user.role.is_elevated() {
        return Ok(());
    }
    match ids {
        Some(ids) if ids.iter().all(|&id| id == user.account_id) => Ok(()),
        _ => Err(AppError::Forbidden(
            "Only managers may view other accounts".to_string(),
        )),
    }
}

async fn get_presence(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PresenceParams>,
) -> Result<Json<BTreeMap<u64, PresenceState>>> {
    let ids = params.ids.as_deref().map(parse_ids).transpose()?;
    check_presence_scope(&user, ids.as_deref())?;
    let states = state
        .presence
        .presence_for(ids.as_deref(), Utc::now())
        .await?;
    Ok(Json(states))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_ids("4,,").unwrap(), vec![4]);
        assert!(matches!(parse_ids("1,x"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_presence_scope() {
        let employee = AuthUser {
            account_id: 7,
            role: Role::Employee,
        };
        assert!(check_presence_scope(&employee, Some(&[7][..])).is_ok());
        assert!(matches!(
            check_presence_scope(&employee, Some(&[7, 8][..])),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_presence_scope(&employee, None),
            Err(AppError::Forbidden(_))
        ));

        let manager = AuthUser {
            account_id: 9,
            role: Role::Manager,
        };
        assert!(check_presence_scope(&manager, None).is_ok());
        assert!(check_presence_scope(&manager, Some(&[7, 8][..])).is_ok());
    }
}
