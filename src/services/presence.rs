// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presence: heartbeats and the three-state liveness signal.
//!
//! State is recomputed from stored data on every query. Nothing is cached or
//! pushed, so a missed heartbeat simply ages the account into `Offline`.

use crate::db::MemoryDb;
use crate::error::AppError;
use crate::models::PresenceState;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Classify one account.
///
/// Deactivation overrides every other signal.
pub fn classify(
    is_active: bool,
    last_seen: Option<DateTime<Utc>>,
    has_open_entry: bool,
    now: DateTime<Utc>,
    threshold: Duration,
) -> PresenceState {
    let live = is_active && last_seen.is_some_and(|seen| now - seen <= threshold);

    match (live, has_open_entry) {
        (false, _) => PresenceState::Offline,
        (true, true) => PresenceState::OnlineActive,
        (true, false) => PresenceState::OnlineIdle,
    }
}

#[derive(Clone)]
pub struct PresenceService {
    db: MemoryDb,
    threshold: Duration,
}

impl PresenceService {
    pub fn new(db: MemoryDb, threshold_secs: i64) -> Self {
        Self {
            db,
            threshold: Duration::seconds(threshold_secs),
        }
    }

    /// Record that the account is alive.
    pub async fn heartbeat(&self, account_id: u64, now: DateTime<Utc>) -> Result<(), AppError> {
        self.db
            .update_account(account_id, |a| a.last_seen_utc = Some(now))
            .await?;
        tracing::trace!(account_id, "Heartbeat");
        Ok(())
    }

    /// Presence for the given accounts, or for every account when `ids` is
    /// `None`. Unknown IDs report `Offline`.
    pub async fn presence_for(
        &self,
        ids: Option<&[u64]>,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<u64, PresenceState>, AppError> {
        let running = self.db.accounts_with_open_entries().await?;

        let mut states = BTreeMap::new();
        match ids {
            Some(ids) => {
                for &id in ids {
                    let state = match self.db.get_account(id).await? {
                        Some(a) => classify(
                            a.is_active,
                            a.last_seen_utc,
                            running.contains(&id),
                            now,
                            self.threshold,
                        ),
                        None => PresenceState::Offline,
                    };
                    states.insert(id, state);
                }
            }
            None => {
                for a in self.db.list_accounts().await? {
                    let state = classify(
                        a.is_active,
                        a.last_seen_utc,
                        running.contains(&a.id),
                        now,
                        self.threshold,
                    );
                    states.insert(a.id, state);
                }
            }
        }

        Ok(states)
    }
}
