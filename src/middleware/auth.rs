// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token authentication middleware.

use crate::error::AppError;
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Name of the HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "timekeep_token";

/// Authenticated account extracted from a validated token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: u64,
    pub role: Role,
}

/// Middleware that requires a token for the account's current session.
///
/// A superseded token is answered with `401 session_revoked` so clients can
/// tell "signed in elsewhere" apart from a plain expiry.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
            .ok_or(AppError::Unauthenticated)?
    };

    let account = state.sessions.validate(&token).await?;

    request.extensions_mut().insert(AuthUser {
        account_id: account.id,
        role: account.role,
    });

    Ok(next.run(request).await)
}

/// Reject callers that are not admins.
pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".to_string()))
    }
}
