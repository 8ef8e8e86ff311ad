// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod presence;
pub mod productivity;
pub mod task;
pub mod time_entry;

pub use account::{Account, AccountView, Role};
pub use presence::PresenceState;
pub use productivity::{PlanningHint, ProductivityResult, ScoreSettings};
pub use task::{Task, TaskStatus};
pub use time_entry::TimeEntry;
