// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token tests.
//!
//! These tests verify that tokens issued by the session authority carry the
//! claims the middleware expects, catching compatibility issues early.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use timekeep_core::error::AppError;
use timekeep_core::models::Role;
use timekeep_core::services::Claims;

mod common;
use common::create_test_app;

#[tokio::test]
async fn test_issued_token_claims() {
    let (_, state, fx) = create_test_app().await;
    let outcome = state
        .sessions
        .login("mara", common::PASSWORD)
        .await
        .unwrap();

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let claims = decode::<Claims>(&outcome.token, &key, &Validation::new(Algorithm::HS256))
        .expect("issued token decodes")
        .claims;

    assert_eq!(claims.sub, fx.manager.to_string());
    assert_eq!(claims.sid, outcome.session_id);
    assert_eq!(claims.role, Role::Manager);

    // Default lifetime is 12 hours
    assert_eq!(claims.exp - claims.iat, 12 * 3600);
}

#[tokio::test]
async fn test_expired_token_is_unauthenticated() {
    let (_, state, fx) = create_test_app().await;
    let outcome = state
        .sessions
        .login("alice", common::PASSWORD)
        .await
        .unwrap();

    // Right key and current session, but long expired
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: fx.alice.to_string(),
        sid: outcome.session_id,
        role: Role::Employee,
        iat: now - 2 * 86400,
        exp: now - 86400,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&state.config.jwt_signing_key),
    )
    .unwrap();

    let err = state.sessions.validate(&token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn test_non_numeric_subject_is_unauthenticated() {
    let (_, state, _) = create_test_app().await;
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "alice".to_string(),
        sid: "abc".to_string(),
        role: Role::Admin,
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&state.config.jwt_signing_key),
    )
    .unwrap();

    let err = state.sessions.validate(&token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn test_role_comes_from_account_not_token() {
    let (_, state, fx) = create_test_app().await;
    let outcome = state
        .sessions
        .login("alice", common::PASSWORD)
        .await
        .unwrap();

    // Same session, but the token claims Admin
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: fx.alice.to_string(),
        sid: outcome.session_id,
        role: Role::Admin,
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&state.config.jwt_signing_key),
    )
    .unwrap();

    let account = state.sessions.validate(&token).await.unwrap();
    assert_eq!(account.role, Role::Employee);
}
