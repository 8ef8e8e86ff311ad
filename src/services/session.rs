// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authority: login, token validation and the one-live-session rule.
//!
//! Each account stores a single `current_session_id`. Every token embeds the
//! session ID it was issued for, and validation only accepts tokens whose ID
//! matches the stored one. A new login overwrites the pointer, so all older
//! tokens for the account stop working on their next request without any
//! revocation list.
//!
//! Logout only clears liveness. A token replayed after logout stays valid
//! until it expires; that gap is accepted.

use crate::config::Config;
use crate::db::{MemoryDb, NewAccount};
use crate::error::AppError;
use crate::models::{Account, Role};
use crate::services::password::{hash_password_with, verify_password};
use crate::services::timer::TimerEngine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Session ID this token belongs to
    pub sid: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub session_id: String,
    pub account: Account,
}

/// Issues and validates login sessions.
#[derive(Clone)]
pub struct SessionAuthority {
    db: MemoryDb,
    timer: TimerEngine,
    signing_key: Vec<u8>,
    ttl: Duration,
    password_iterations: u32,
}

impl SessionAuthority {
    pub fn new(db: MemoryDb, timer: TimerEngine, config: &Config) -> Self {
        Self {
            db,
            timer,
            signing_key: config.jwt_signing_key.clone(),
            ttl: Duration::hours(config.session_ttl_hours),
            password_iterations: config.password_iterations,
        }
    }

    /// Create an active employee account and log it in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        job_title: &str,
    ) -> Result<LoginOutcome, AppError> {
        let account = self
            .db
            .create_account(NewAccount {
                username: username.to_string(),
                password_hash: hash_password_with(password, self.password_iterations)?,
                full_name: full_name.to_string(),
                job_title: job_title.to_string(),
                role: Role::Employee,
                is_active: true,
            })
            .await?;

        tracing::info!(account_id = account.id, username = %account.username, "Account registered");

        self.start_session(account).await
    }

    /// Verify credentials and rotate the account's session.
    ///
    /// Also closes any timer left running by a previous session. That sweep
    /// is best-effort: its failure is logged and the login still succeeds.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let account = self
            .db
            .find_account_by_username(username)
            .await?
            .filter(|a| verify_password(password, &a.password_hash))
            .ok_or_else(|| {
                tracing::info!(username = %username, "Rejected login with invalid credentials");
                AppError::InvalidCredentials
            })?;

        if !account.is_active {
            tracing::info!(account_id = account.id, "Rejected login for deactivated account");
            return Err(AppError::AccountDeactivated);
        }

        // Only timers from before this login are orphans
        let login_at = Utc::now();
        let outcome = self.start_session(account).await?;

        match self
            .timer
            .recover_open_entries(outcome.account.id, login_at)
            .await
        {
            Ok(closed) if !closed.is_empty() => {
                tracing::info!(
                    account_id = outcome.account.id,
                    count = closed.len(),
                    "Closed timers orphaned by a previous session"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    account_id = outcome.account.id,
                    error = %e,
                    "Failed to recover orphaned timers, continuing anyway"
                );
            }
        }

        Ok(outcome)
    }

    /// Validate a bearer token and load its account.
    ///
    /// Fails with `Unauthenticated` for bad signatures, expiry, or a missing or
    /// deactivated account, and with `SessionRevoked` when a newer login has
    /// replaced the token's session.
    pub async fn validate(&self, token: &str) -> Result<Account, AppError> {
        let key = DecodingKey::from_secret(&self.signing_key);
        let validation = Validation::new(Algorithm::HS256);

        let claims = decode::<Claims>(token, &key, &validation)
            .map_err(|_| AppError::Unauthenticated)?
            .claims;

        let account_id: u64 = claims.sub.parse().map_err(|_| AppError::Unauthenticated)?;

        let account = self
            .db
            .get_account(account_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(AppError::Unauthenticated)?;

        let current = account.current_session_id.as_deref().unwrap_or_default();
        let matches: bool = current.as_bytes().ct_eq(claims.sid.as_bytes()).into();
        if current.is_empty() || !matches {
            tracing::debug!(account_id, "Token belongs to a superseded session");
            return Err(AppError::SessionRevoked);
        }

        Ok(account)
    }

    /// Mark the account offline. The session pointer is left untouched.
    pub async fn logout(&self, account_id: u64) -> Result<(), AppError> {
        self.db
            .update_account(account_id, |a| a.last_seen_utc = None)
            .await?;
        tracing::info!(account_id, "Logged out");
        Ok(())
    }

    /// Replace the password and rotate the session.
    ///
    /// The caller receives a fresh token; every other device must log in again.
    pub async fn change_password(
        &self,
        account_id: u64,
        current_password: &str,
        new_password: &str,
    ) -> Result<LoginOutcome, AppError> {
        let account = self
            .db
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", account_id)))?;

        if !verify_password(current_password, &account.password_hash) {
            return Err(AppError::BadRequest("Invalid current password".to_string()));
        }

        let new_hash = hash_password_with(new_password, self.password_iterations)?;
        let account = self
            .db
            .update_account(account_id, |a| a.password_hash = new_hash)
            .await?;

        tracing::info!(account_id, "Password changed, rotating session");
        self.start_session(account).await
    }

    /// Store a fresh session ID on the account and sign a token for it.
    async fn start_session(&self, account: Account) -> Result<LoginOutcome, AppError> {
        let session_id = new_session_id()?;
        let sid = session_id.clone();
        let account = self
            .db
            .update_account(account.id, move |a| a.current_session_id = Some(sid))
            .await?;

        let token = self.create_jwt(&account, &session_id)?;
        tracing::info!(account_id = account.id, "Session started");

        Ok(LoginOutcome {
            token,
            session_id,
            account,
        })
    }

    /// Create a signed token for an account session.
    pub fn create_jwt(&self, account: &Account, session_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.to_string(),
            sid: session_id.to_string(),
            role: account.role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))
    }
}

/// 128 random bits, hex encoded.
fn new_session_id() -> Result<String, AppError> {
    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}
