// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Timekeep: time tracking and session consistency core
//!
//! This crate provides the backend API for per-task timers, single-session
//! logins, presence and the weekly productivity score.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::MemoryDb;
use services::{PresenceService, SessionAuthority, TimerEngine};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
    pub sessions: SessionAuthority,
    pub timer: TimerEngine,
    pub presence: PresenceService,
}

impl AppState {
    /// Wire every service onto one shared store.
    pub fn new(config: Config, db: MemoryDb) -> Self {
        let timer = TimerEngine::new(db.clone());
        let sessions = SessionAuthority::new(db.clone(), timer.clone(), &config);
        let presence = PresenceService::new(db.clone(), config.presence_threshold_secs);

        Self {
            config,
            db,
            sessions,
            timer,
            presence,
        }
    }
}
