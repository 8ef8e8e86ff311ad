//! Task model.
//!
//! Tasks are owned by the surrounding project-management application; this
//! crate only reads them for authorization and scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Task {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub assignee_id: Option<u64>,
    /// Planned effort; zero or negative means "no estimate"
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
