// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod password;
pub mod presence;
pub mod productivity;
pub mod seed;
pub mod session;
pub mod timer;

pub use presence::PresenceService;
pub use productivity::compute_weekly_score;
pub use seed::{SeedError, SeedFile};
pub use session::{Claims, LoginOutcome, SessionAuthority};
pub use timer::{ManualEntry, TimerEngine, RECOVERY_MARKER};
