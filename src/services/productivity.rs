// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly productivity score.
//!
//! A pure function of a task/entry snapshot and a `[week_start, week_end)`
//! window:
//!
//! ```text
//! score = smoothed_completion × efficiency_multiplier × (1 − overdue_penalty) × 100
//! ```
//!
//! Completion is Bayesian-smoothed with prior pseudo-counts so a week with one
//! or two tasks cannot swing to 0% or 100%. With no tasks at all the score is
//! the prior baseline (60% with default settings), not zero.

use crate::models::{PlanningHint, ProductivityResult, ScoreSettings, Task, TimeEntry};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

const SECONDS_PER_HOUR: f64 = 3600.0;

fn in_window(t: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    t >= start && t < end
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Round to `decimals` places, ties to even.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Compute the score for one account-week.
///
/// `tasks` should be the tasks of the account being scored; `entries` may
/// contain anything, only entries whose task is in `tasks` are used.
pub fn compute_weekly_score(
    tasks: &[Task],
    entries: &[TimeEntry],
    week_start: DateTime<Utc>,
    week_end: DateTime<Utc>,
    settings: &ScoreSettings,
) -> ProductivityResult {
    let in_week = |t: DateTime<Utc>| in_window(t, week_start, week_end);

    // ─── Completion ──────────────────────────────────────────────
    let assigned: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.assigned_at_utc.is_some_and(in_week))
        .collect();

    let total = assigned.len() as u32;
    let done = assigned
        .iter()
        .filter(|t| t.completed_at_utc.is_some_and(in_week))
        .count() as u32;

    let completion = ratio(done as f64, total as f64);

    let prior_total = settings.prior_total_tasks.max(0.0);
    let prior_done = settings.prior_done_tasks.clamp(0.0, prior_total);
    let smoothed = ratio(done as f64 + prior_done, total as f64 + prior_total);

    // ─── Efficiency & Estimate Deviation ─────────────────────────
    // Actual hours per task from closed entries that ended inside the week.
    let mut actual_seconds: HashMap<u64, i64> = HashMap::new();
    for entry in entries {
        if let (Some(end), Some(duration)) = (entry.end_time, entry.closed_duration()) {
            if in_week(end) {
                *actual_seconds.entry(entry.task_id).or_insert(0) += duration.num_seconds();
            }
        }
    }

    let mut efficiencies = Vec::new();
    let mut deviations = Vec::new();
    let mut missing_estimates = 0u32;

    for task in &assigned {
        let has_estimate = task.estimated_hours > 0.0;
        if !has_estimate {
            missing_estimates += 1;
        }

        let actual_hours =
            actual_seconds.get(&task.id).copied().unwrap_or(0) as f64 / SECONDS_PER_HOUR;
        if actual_hours <= 0.0 || !has_estimate {
            continue;
        }

        deviations.push((actual_hours - task.estimated_hours).abs() / task.estimated_hours);
        // Finishing early is not rewarded beyond 1.0
        efficiencies.push((task.estimated_hours / actual_hours).clamp(0.0, 1.0));
    }

    let efficiency = mean(&efficiencies)
        .unwrap_or(settings.neutral_efficiency)
        .clamp(0.0, 1.0);
    let multiplier = settings.efficiency_multiplier_min
        + (settings.efficiency_multiplier_max - settings.efficiency_multiplier_min) * efficiency;

    // ─── Overdue Penalty ─────────────────────────────────────────
    let overdue_count = assigned
        .iter()
        .filter(|t| match t.deadline {
            Some(deadline) if deadline < week_end => {
                t.completed_at_utc.is_none_or(|completed| completed > deadline)
            }
            _ => false,
        })
        .count() as u32;

    let overdue_penalty = (overdue_count as f64 * settings.overdue_per_task_penalty)
        .min(settings.overdue_max_penalty)
        .clamp(0.0, 1.0);

    // ─── Final Score ─────────────────────────────────────────────
    let raw_score = smoothed * multiplier * (1.0 - overdue_penalty) * 100.0;
    // Bounds are caller-supplied; keep min <= max inside [0, 100]
    let min_score = settings.min_score_percent.clamp(0.0, 100.0);
    let max_score = settings.max_score_percent.clamp(min_score, 100.0);
    let score = round_to(raw_score.clamp(min_score, max_score), 1);

    // ─── Planning Quality (advisory) ─────────────────────────────
    let estimate_coverage = if total == 0 {
        1.0
    } else {
        (1.0 - ratio(missing_estimates as f64, total as f64)).clamp(0.0, 1.0)
    };
    let average_deviation = mean(&deviations).unwrap_or(0.0);
    let deviation_quality = 1.0 - average_deviation.clamp(0.0, 1.0);
    let planning_quality =
        (estimate_coverage * 0.6 + deviation_quality * 0.4).clamp(0.0, 1.0);

    let planning_hint = if total == 0 {
        None
    } else if 1.0 - estimate_coverage >= settings.missing_estimate_threshold {
        Some(PlanningHint::AddEstimates)
    } else if average_deviation >= settings.deviation_threshold {
        Some(PlanningHint::ReviewEstimates)
    } else {
        None
    };

    ProductivityResult {
        score_percent: score,
        total_tasks: total,
        done_tasks: done,
        completion_rate: completion,
        smoothed_completion_rate: smoothed,
        efficiency_rate: efficiency,
        efficiency_multiplier: multiplier,
        overdue_count,
        overdue_penalty,
        estimate_coverage,
        average_deviation,
        planning_quality_rate: round_to(planning_quality, 3),
        planning_hint,
    }
}
