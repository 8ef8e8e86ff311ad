// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Authorization role carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl Role {
    /// Managers and admins may track time against tasks assigned to others.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

/// Account stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Numeric account ID (also used as token subject)
    pub id: u64,
    /// Unique login name
    pub username: String,
    /// PBKDF2 credential hash, see `services::password`
    pub password_hash: String,
    pub full_name: String,
    pub job_title: String,
    pub role: Role,
    /// Deactivated accounts can neither log in nor appear online
    pub is_active: bool,
    /// Last heartbeat; cleared by explicit logout
    pub last_seen_utc: Option<DateTime<Utc>>,
    /// The one session ID whose tokens are currently accepted.
    /// Rotated on every successful login.
    pub current_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account fields that are safe to return from the API.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AccountView {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub username: String,
    pub full_name: String,
    pub job_title: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            full_name: account.full_name.clone(),
            job_title: account.job_title.clone(),
            role: account.role,
            is_active: account.is_active,
        }
    }
}
