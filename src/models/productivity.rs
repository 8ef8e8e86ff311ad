//! Weekly productivity score inputs and outputs.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Tunables for the weekly score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSettings {
    // ─── Bayesian Smoothing ──────────────────────────────────────
    /// Pseudo-count of tasks blended into every week
    pub prior_total_tasks: f64,
    /// Pseudo-count of completed tasks (3 of 5 → 60% baseline)
    pub prior_done_tasks: f64,

    // ─── Efficiency ──────────────────────────────────────────────
    pub efficiency_multiplier_min: f64,
    pub efficiency_multiplier_max: f64,
    /// Used when no task has both an estimate and logged time
    pub neutral_efficiency: f64,

    // ─── Clamping ────────────────────────────────────────────────
    pub min_score_percent: f64,
    pub max_score_percent: f64,

    // ─── Overdue Penalty ─────────────────────────────────────────
    pub overdue_per_task_penalty: f64,
    pub overdue_max_penalty: f64,

    // ─── Planning Hints ──────────────────────────────────────────
    /// Share of tasks without an estimate that triggers a hint
    pub missing_estimate_threshold: f64,
    /// Average relative estimate error that triggers a hint
    pub deviation_threshold: f64,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            prior_total_tasks: 5.0,
            prior_done_tasks: 3.0,
            efficiency_multiplier_min: 0.8,
            efficiency_multiplier_max: 1.2,
            neutral_efficiency: 0.5,
            min_score_percent: 0.0,
            max_score_percent: 100.0,
            overdue_per_task_penalty: 0.05,
            overdue_max_penalty: 0.30,
            missing_estimate_threshold: 0.30,
            deviation_threshold: 0.60,
        }
    }
}

/// Advisory nudge about estimate quality. Never affects the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PlanningHint {
    AddEstimates,
    ReviewEstimates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProductivityResult {
    /// Final score in percent, one decimal
    pub score_percent: f64,
    pub total_tasks: u32,
    pub done_tasks: u32,
    /// Raw done/total, 0 when nothing was assigned
    pub completion_rate: f64,
    pub smoothed_completion_rate: f64,
    pub efficiency_rate: f64,
    pub efficiency_multiplier: f64,
    pub overdue_count: u32,
    pub overdue_penalty: f64,
    pub estimate_coverage: f64,
    pub average_deviation: f64,
    pub planning_quality_rate: f64,
    pub planning_hint: Option<PlanningHint>,
}
