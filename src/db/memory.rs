// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (profile, liveness and session pointer)
//! - Tasks (read-mostly, owned by the surrounding application)
//! - Time entries (with the one-open-entry-per-account guard)
//!
//! Lock order is always `open_entries` before `entries`; never acquire an
//! `open_entries` guard while holding or iterating `entries`.

use crate::error::AppError;
use crate::models::{Account, Role, Task, TimeEntry};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fields supplied when creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub job_title: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Default)]
struct Tables {
    accounts: DashMap<u64, Account>,
    /// Lowercased username -> account ID
    usernames: DashMap<String, u64>,
    tasks: DashMap<u64, Task>,
    entries: DashMap<u64, TimeEntry>,
    /// Account ID -> ID of its single open entry.
    /// Equivalent of `UNIQUE (account_id) WHERE end_time IS NULL`.
    open_entries: DashMap<u64, u64>,
    next_account_id: AtomicU64,
    next_entry_id: AtomicU64,
    #[cfg(debug_assertions)]
    entries_offline: std::sync::atomic::AtomicBool,
}

/// Shared database handle. Cloning is cheap and every clone sees the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every time-entry operation fail as if storage were unreachable.
    /// Only available in debug/test builds.
    #[cfg(debug_assertions)]
    pub fn set_entries_offline(&self, offline: bool) {
        self.tables
            .entries_offline
            .store(offline, Ordering::SeqCst);
    }

    /// Insert an open row without claiming the account's open slot, the way a
    /// row written outside the guard would look.
    /// Only available in debug/test builds.
    #[cfg(debug_assertions)]
    pub async fn insert_untracked_open_entry(
        &self,
        account_id: u64,
        task_id: u64,
        start_time: DateTime<Utc>,
        comment: &str,
    ) -> Result<TimeEntry, AppError> {
        self.entries_available()?;
        let entry = TimeEntry {
            id: self.next_entry_id(),
            task_id,
            account_id,
            start_time,
            end_time: None,
            comment: comment.to_string(),
            is_manual: false,
        };
        self.tables.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn entries_available(&self) -> Result<(), AppError> {
        #[cfg(debug_assertions)]
        {
            if self.tables.entries_offline.load(Ordering::SeqCst) {
                return Err(AppError::Database(
                    "Time entry storage unavailable (offline mode)".to_string(),
                ));
            }
        }
        Ok(())
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Create an account. Usernames are unique, compared case-insensitively.
    pub async fn create_account(&self, new: NewAccount) -> Result<Account, AppError> {
        match self.tables.usernames.entry(new.username.to_lowercase()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Username {} already exists",
                new.username
            ))),
            Entry::Vacant(slot) => {
                let id = self.tables.next_account_id.fetch_add(1, Ordering::SeqCst) + 1;
                let account = Account {
                    id,
                    username: new.username,
                    password_hash: new.password_hash,
                    full_name: new.full_name,
                    job_title: new.job_title,
                    role: new.role,
                    is_active: new.is_active,
                    last_seen_utc: None,
                    current_session_id: None,
                    created_at: Utc::now(),
                };
                self.tables.accounts.insert(id, account.clone());
                slot.insert(id);
                Ok(account)
            }
        }
    }

    pub async fn get_account(&self, account_id: u64) -> Result<Option<Account>, AppError> {
        Ok(self
            .tables
            .accounts
            .get(&account_id)
            .map(|a| a.value().clone()))
    }

    pub async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AppError> {
        let id = match self.tables.usernames.get(&username.to_lowercase()) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.get_account(id).await
    }

    /// All accounts ordered by ID.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        let mut accounts: Vec<Account> = self
            .tables
            .accounts
            .iter()
            .map(|a| a.value().clone())
            .collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    /// Apply `change` to an account row atomically and return the new row.
    ///
    /// Concurrent updates to the same row are serialized; the last writer wins.
    pub async fn update_account<F>(&self, account_id: u64, change: F) -> Result<Account, AppError>
    where
        F: FnOnce(&mut Account),
    {
        let mut account = self
            .tables
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", account_id)))?;
        change(account.value_mut());
        Ok(account.value().clone())
    }

    // ─── Task Operations ─────────────────────────────────────────

    pub async fn upsert_task(&self, task: Task) -> Result<(), AppError> {
        self.tables.tasks.insert(task.id, task);
        Ok(())
    }

    pub async fn get_task(&self, task_id: u64) -> Result<Option<Task>, AppError> {
        Ok(self.tables.tasks.get(&task_id).map(|t| t.value().clone()))
    }

    /// Tasks assigned to an account, ordered by ID.
    pub async fn tasks_for_assignee(&self, account_id: u64) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .tables
            .tasks
            .iter()
            .filter(|t| t.assignee_id == Some(account_id))
            .map(|t| t.value().clone())
            .collect();
        tasks.sort_by_key(|t| t.id);
        Ok(tasks)
    }

    // ─── Time Entry Operations ───────────────────────────────────

    /// Insert a running entry, failing with `Conflict` if the account already
    /// has one. The check and the insert happen under the same slot lock.
    pub async fn insert_open_entry(
        &self,
        account_id: u64,
        task_id: u64,
        start_time: DateTime<Utc>,
    ) -> Result<TimeEntry, AppError> {
        self.entries_available()?;

        match self.tables.open_entries.entry(account_id) {
            Entry::Occupied(existing) => Err(AppError::Conflict(format!(
                "Timer already running (entry {})",
                existing.get()
            ))),
            Entry::Vacant(slot) => {
                let entry = TimeEntry {
                    id: self.next_entry_id(),
                    task_id,
                    account_id,
                    start_time,
                    end_time: None,
                    comment: String::new(),
                    is_manual: false,
                };
                self.tables.entries.insert(entry.id, entry.clone());
                slot.insert(entry.id);
                Ok(entry)
            }
        }
    }

    /// Insert an entry that is already closed. Never touches the open slot.
    pub async fn insert_closed_entry(
        &self,
        account_id: u64,
        task_id: u64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        comment: String,
        is_manual: bool,
    ) -> Result<TimeEntry, AppError> {
        self.entries_available()?;

        if end_time < start_time {
            return Err(AppError::BadRequest(
                "End time cannot be earlier than start time".to_string(),
            ));
        }

        let entry = TimeEntry {
            id: self.next_entry_id(),
            task_id,
            account_id,
            start_time,
            end_time: Some(end_time),
            comment,
            is_manual,
        };
        self.tables.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    /// Close the account's open entry, if any.
    ///
    /// `comment` replaces the existing comment only when given.
    pub async fn close_open_entry(
        &self,
        account_id: u64,
        end_time: DateTime<Utc>,
        comment: Option<String>,
    ) -> Result<Option<TimeEntry>, AppError> {
        self.entries_available()?;

        let slot = match self.tables.open_entries.entry(account_id) {
            Entry::Occupied(slot) => slot,
            Entry::Vacant(_) => return Ok(None),
        };

        let closed = self.tables.entries.get_mut(slot.get()).map(|mut entry| {
            entry.end_time = Some(end_time.max(entry.start_time));
            if let Some(comment) = comment {
                entry.comment = comment;
            }
            entry.is_manual = false;
            entry.clone()
        });

        // Release the slot only after the row is closed so no observer ever
        // sees two open rows for the account.
        slot.remove();
        Ok(closed)
    }

    /// Close every open row for the account started before `end_time`, indexed
    /// or not, appending `marker` to each comment. Returns the rows that were
    /// closed.
    pub async fn force_close_open_entries(
        &self,
        account_id: u64,
        end_time: DateTime<Utc>,
        marker: &str,
    ) -> Result<Vec<TimeEntry>, AppError> {
        self.entries_available()?;

        let open_ids: Vec<u64> = self
            .tables
            .entries
            .iter()
            .filter(|e| {
                e.account_id == account_id && e.is_open() && e.start_time < end_time
            })
            .map(|e| e.id)
            .collect();

        let mut closed = Vec::with_capacity(open_ids.len());
        for entry_id in open_ids {
            let slot = match self.tables.open_entries.entry(account_id) {
                Entry::Occupied(slot) if *slot.get() == entry_id => Some(slot),
                _ => None,
            };

            if let Some(mut entry) = self.tables.entries.get_mut(&entry_id) {
                if entry.is_open() {
                    entry.end_time = Some(end_time.max(entry.start_time));
                    entry.comment = if entry.comment.trim().is_empty() {
                        marker.to_string()
                    } else {
                        format!("{} {}", entry.comment, marker)
                    };
                    closed.push(entry.clone());
                }
            }

            if let Some(slot) = slot {
                slot.remove();
            }
        }

        Ok(closed)
    }

    /// The account's running entry, if any.
    pub async fn open_entry_for(&self, account_id: u64) -> Result<Option<TimeEntry>, AppError> {
        self.entries_available()?;

        let entry_id = match self.tables.open_entries.get(&account_id) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self
            .tables
            .entries
            .get(&entry_id)
            .map(|e| e.value().clone())
            .filter(|e| e.is_open()))
    }

    /// IDs of every account with a running entry.
    pub async fn accounts_with_open_entries(&self) -> Result<HashSet<u64>, AppError> {
        self.entries_available()?;
        Ok(self.tables.open_entries.iter().map(|e| *e.key()).collect())
    }

    /// Number of rows with no end time for an account, read from the entry
    /// table itself rather than the open slot.
    ///
    /// Holds the account's slot lock while scanning so a concurrent
    /// stop-then-start cannot be observed halfway.
    pub async fn count_open_entries(&self, account_id: u64) -> Result<usize, AppError> {
        self.entries_available()?;

        let _slot = self.tables.open_entries.entry(account_id);
        Ok(self
            .tables
            .entries
            .iter()
            .filter(|e| e.account_id == account_id && e.is_open())
            .count())
    }

    /// All entries matching `filter`, newest first.
    async fn collect_entries<F>(&self, filter: F) -> Result<Vec<TimeEntry>, AppError>
    where
        F: Fn(&TimeEntry) -> bool,
    {
        self.entries_available()?;

        let mut entries: Vec<TimeEntry> = self
            .tables
            .entries
            .iter()
            .filter(|e| filter(e.value()))
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    pub async fn entries_for_account(&self, account_id: u64) -> Result<Vec<TimeEntry>, AppError> {
        self.collect_entries(|e| e.account_id == account_id).await
    }

    pub async fn entries_for_account_task(
        &self,
        account_id: u64,
        task_id: u64,
    ) -> Result<Vec<TimeEntry>, AppError> {
        self.collect_entries(|e| e.account_id == account_id && e.task_id == task_id)
            .await
    }

    /// Entries of any account logged against the given tasks.
    pub async fn entries_for_tasks(&self, task_ids: &[u64]) -> Result<Vec<TimeEntry>, AppError> {
        let wanted: HashSet<u64> = task_ids.iter().copied().collect();
        self.collect_entries(|e| wanted.contains(&e.task_id)).await
    }

    /// The account's entries intersecting `[start, end)`; open entries count
    /// as running until `now`.
    pub async fn entries_overlapping(
        &self,
        account_id: u64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, AppError> {
        self.collect_entries(|e| e.account_id == account_id && e.overlaps(start, end, now))
            .await
    }

    fn next_entry_id(&self) -> u64 {
        self.tables.next_entry_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}
