// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timer engine: start/stop, manual entries and crash recovery.
//!
//! Per account the engine is a two-state machine, Idle (no open entry) and
//! Running (exactly one open entry). The open-entry guard lives in the store,
//! so concurrent `start` calls for one account resolve to a single winner and
//! `Conflict` for everyone else.

use crate::db::MemoryDb;
use crate::error::AppError;
use crate::models::{Role, Task, TimeEntry};
use crate::time_utils::{day_bounds, start_of_day};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Appended to the comment of entries closed by the login sweep.
pub const RECOVERY_MARKER: &str = "[auto-stopped on login]";

/// A closed block of time recorded after the fact.
#[derive(Debug, Clone)]
pub struct ManualEntry {
    pub task_id: u64,
    pub day: NaiveDate,
    pub duration: Duration,
    pub comment: String,
}

#[derive(Clone)]
pub struct TimerEngine {
    db: MemoryDb,
}

impl TimerEngine {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }

    /// Load a task and check the caller may log time against it.
    ///
    /// The assignee may always track; managers and admins may track any task.
    async fn authorize_task(&self, account_id: u64, role: Role, task_id: u64) -> Result<Task, AppError> {
        let task = self
            .db
            .get_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))?;

        if task.assignee_id != Some(account_id) && !role.is_elevated() {
            tracing::warn!(account_id, task_id, "Blocked time tracking on unassigned task");
            return Err(AppError::Forbidden(format!(
                "Task {} is not assigned to you",
                task_id
            )));
        }

        Ok(task)
    }

    /// Start a timer. Fails with `Conflict` when one is already running.
    pub async fn start(
        &self,
        account_id: u64,
        role: Role,
        task_id: u64,
        now: DateTime<Utc>,
    ) -> Result<TimeEntry, AppError> {
        self.authorize_task(account_id, role, task_id).await?;

        let entry = self
            .db
            .insert_open_entry(account_id, task_id, now)
            .await
            .inspect_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    tracing::info!(account_id, task_id, "Timer start rejected, already running");
                }
            })?;

        tracing::info!(account_id, task_id, entry_id = entry.id, "Timer started");
        Ok(entry)
    }

    /// Stop the running timer, if any.
    ///
    /// Returns `None` when nothing was running; callers decide whether that is
    /// an error.
    pub async fn stop(
        &self,
        account_id: u64,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<TimeEntry>, AppError> {
        let closed = self.db.close_open_entry(account_id, now, comment).await?;

        match &closed {
            Some(entry) => tracing::info!(
                account_id,
                entry_id = entry.id,
                seconds = entry.duration(now).num_seconds(),
                "Timer stopped"
            ),
            None => tracing::debug!(account_id, "Stop requested with no running timer"),
        }

        Ok(closed)
    }

    /// Record a closed entry starting at midnight UTC of `entry.day`.
    ///
    /// Never passes through the running state, so it cannot conflict with an
    /// open timer.
    pub async fn add_manual_entry(
        &self,
        account_id: u64,
        role: Role,
        entry: ManualEntry,
    ) -> Result<TimeEntry, AppError> {
        if entry.duration <= Duration::zero() {
            return Err(AppError::InvalidDuration);
        }

        self.authorize_task(account_id, role, entry.task_id).await?;

        let start = start_of_day(entry.day);
        let end = start.checked_add_signed(entry.duration).ok_or_else(|| {
            AppError::BadRequest("Entry ends past the supported date range".to_string())
        })?;
        let created = self
            .db
            .insert_closed_entry(
                account_id,
                entry.task_id,
                start,
                end,
                entry.comment,
                true,
            )
            .await?;

        tracing::info!(
            account_id,
            task_id = created.task_id,
            entry_id = created.id,
            minutes = entry.duration.num_minutes(),
            "Manual entry added"
        );
        Ok(created)
    }

    /// Force-close every open entry of the account started before `now`.
    ///
    /// Runs on login so a session that died mid-timer cannot leave the account
    /// stuck in the running state. Tolerates more than one open row. Timers
    /// started at or after `now` belong to a newer session and are left alone.
    pub async fn recover_open_entries(
        &self,
        account_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, AppError> {
        let closed = self
            .db
            .force_close_open_entries(account_id, now, RECOVERY_MARKER)
            .await?;

        for entry in &closed {
            tracing::warn!(
                account_id,
                entry_id = entry.id,
                task_id = entry.task_id,
                "Auto-stopped orphaned timer"
            );
        }
        Ok(closed)
    }

    pub async fn active_entry(&self, account_id: u64) -> Result<Option<TimeEntry>, AppError> {
        self.db.open_entry_for(account_id).await
    }

    /// The account's entries touching the UTC calendar `day`, newest first.
    pub async fn entries_for_day(
        &self,
        account_id: u64,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, AppError> {
        let (start, end) = day_bounds(day)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported date {}", day)))?;
        self.db
            .entries_overlapping(account_id, start, end, now)
            .await
    }

    pub async fn entries_for_task(
        &self,
        account_id: u64,
        task_id: u64,
    ) -> Result<Vec<TimeEntry>, AppError> {
        self.db.entries_for_account_task(account_id, task_id).await
    }
}
