// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data loading.
//!
//! A seed file lists accounts (with plaintext demo passwords), tasks and
//! closed time entries. Tasks and entries name accounts by username so the
//! file does not depend on generated IDs.

use crate::db::{MemoryDb, NewAccount};
use crate::models::{Role, Task, TaskStatus};
use crate::services::password::hash_password_with;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
    #[serde(default)]
    pub tasks: Vec<SeedTask>,
    #[serde(default)]
    pub entries: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SeedTask {
    pub id: u64,
    pub title: String,
    /// Username of the assignee
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_at_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
}

/// A finished block of work, recorded as a manual entry.
#[derive(Debug, Deserialize)]
pub struct SeedEntry {
    pub account: String,
    pub task_id: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub comment: String,
}

/// Counts of what a seed run inserted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub accounts: usize,
    pub tasks: usize,
    pub entries: usize,
}

impl SeedFile {
    /// Load a seed file from disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| SeedError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    pub fn load_from_json(json_data: &str) -> Result<Self, SeedError> {
        serde_json::from_str(json_data).map_err(|e| SeedError::ParseError(e.to_string()))
    }

    /// Insert everything into `db`.
    ///
    /// Accounts whose username already exists are skipped and tasks are
    /// upserted by ID. Entries are always appended.
    pub async fn apply(self, db: &MemoryDb, iterations: u32) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();
        let mut ids: HashMap<String, u64> = HashMap::new();

        for seed in self.accounts {
            let key = seed.username.to_lowercase();
            if let Some(existing) = db.find_account_by_username(&seed.username).await? {
                tracing::debug!(username = %seed.username, "Seed account already exists");
                ids.insert(key, existing.id);
                continue;
            }

            let account = db
                .create_account(NewAccount {
                    username: seed.username,
                    password_hash: hash_password_with(&seed.password, iterations)?,
                    full_name: seed.full_name,
                    job_title: seed.job_title,
                    role: seed.role,
                    is_active: seed.is_active,
                })
                .await?;
            ids.insert(key, account.id);
            summary.accounts += 1;
        }

        for seed in self.tasks {
            let assignee_id = match seed.assignee {
                Some(username) => Some(resolve(db, &ids, username).await?),
                None => None,
            };

            db.upsert_task(Task {
                id: seed.id,
                title: seed.title,
                assignee_id,
                estimated_hours: seed.estimated_hours,
                deadline: seed.deadline,
                assigned_at_utc: seed.assigned_at_utc,
                completed_at_utc: seed.completed_at_utc,
                status: seed.status,
            })
            .await?;
            summary.tasks += 1;
        }

        for seed in self.entries {
            let account_id = resolve(db, &ids, seed.account).await?;
            if db.get_task(seed.task_id).await?.is_none() {
                return Err(SeedError::UnknownTask(seed.task_id));
            }
            db.insert_closed_entry(
                account_id,
                seed.task_id,
                seed.start_time,
                seed.end_time,
                seed.comment,
                true,
            )
            .await?;
            summary.entries += 1;
        }

        tracing::info!(
            accounts = summary.accounts,
            tasks = summary.tasks,
            entries = summary.entries,
            "Seed data loaded"
        );
        Ok(summary)
    }
}

/// Map a username to its account ID, preferring accounts created by this run.
async fn resolve(
    db: &MemoryDb,
    ids: &HashMap<String, u64>,
    username: String,
) -> Result<u64, SeedError> {
    if let Some(&id) = ids.get(&username.to_lowercase()) {
        return Ok(id);
    }
    db.find_account_by_username(&username)
        .await?
        .map(|a| a.id)
        .ok_or(SeedError::UnknownAccount(username))
}

/// Errors from seed loading.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse seed JSON: {0}")]
    ParseError(String),

    #[error("{0} is not a known account")]
    UnknownAccount(String),

    #[error("Entry references unknown task {0}")]
    UnknownTask(u64),

    #[error(transparent)]
    Store(#[from] crate::error::AppError),
}
