//! Derived statistics over a task list
//!
//! Everything here is a pure function of the task slice and the current
//! instant. Malformed input is coerced rather than rejected: a missing
//! progress value counts as zero and values above 100 are clamped.

use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use standup_api::{DerivedStats, PriorityCounts, StatusCounts, TaskPriority, TaskRecord, TaskStatus};
use std::collections::BTreeMap;

/// Days scanned backward from today when computing the completion streak
pub const STREAK_WINDOW_DAYS: u32 = 30;

const MAX_OVERDUE_PENALTY: f64 = 40.0;
const OVERDUE_PENALTY_PER_TASK: f64 = 10.0;
const COMPLETION_TARGET: f64 = 0.5;
const COMPLETION_PENALTY_WEIGHT: f64 = 60.0;
const LARGE_LIST_THRESHOLD: usize = 50;
const LARGE_LIST_PENALTY_PER_TASK: f64 = 0.5;
const MAX_LARGE_LIST_PENALTY: f64 = 20.0;

/// Compute every derived statistic for `tasks` as of `now`
pub fn aggregate(tasks: &[TaskRecord], now: DateTime<Local>) -> DerivedStats {
    let total = tasks.len();
    let by_status = status_counts(tasks);
    let overdue = overdue_count(tasks, now);

    DerivedStats {
        total,
        completion_rate: completion_rate(by_status.completed, total),
        overdue,
        average_progress: average_progress(tasks),
        health_score: health_score(overdue, completion_fraction(by_status.completed, total), total),
        streak: streak(tasks, now.date_naive()),
        by_type: type_counts(tasks),
        by_priority: priority_counts(tasks),
        by_status,
    }
}

/// Percent of tasks completed, one decimal. Zero for an empty list.
pub fn completion_rate(completed: usize, total: usize) -> f64 {
    round1(completion_fraction(completed, total) * 100.0)
}

fn completion_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

/// Open tasks whose due date has passed
pub fn overdue_count(tasks: &[TaskRecord], now: DateTime<Local>) -> usize {
    tasks.iter().filter(|t| t.is_overdue(now)).count()
}

/// Heuristic 0-100 score.
///
/// Starts at 100 and loses up to 40 points for overdue tasks, up to 30 for a
/// completion fraction under one half, and up to 20 for lists longer than 50.
pub fn health_score(overdue: usize, completion_fraction: f64, total: usize) -> u8 {
    let mut score = 100.0;

    score -= (overdue as f64 * OVERDUE_PENALTY_PER_TASK).min(MAX_OVERDUE_PENALTY);

    if completion_fraction < COMPLETION_TARGET {
        score -= (COMPLETION_TARGET - completion_fraction) * COMPLETION_PENALTY_WEIGHT;
    }

    if total > LARGE_LIST_THRESHOLD {
        score -= ((total - LARGE_LIST_THRESHOLD) as f64 * LARGE_LIST_PENALTY_PER_TASK)
            .min(MAX_LARGE_LIST_PENALTY);
    }

    score.max(0.0).round().min(100.0) as u8
}

/// Consecutive days ending today with at least one completion.
///
/// Today without a completion does not end the streak; any earlier empty day
/// does.
pub fn streak(tasks: &[TaskRecord], today: NaiveDate) -> u32 {
    let mut streak = 0;

    for offset in 0..STREAK_WINDOW_DAYS {
        let day = today - TimeDelta::days(i64::from(offset));
        let completed_that_day = tasks
            .iter()
            .filter_map(|t| t.completed_at)
            .any(|at| at.date_naive() == day);

        if completed_that_day {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }

    streak
}

/// Mean progress percent, one decimal. Missing progress counts as zero.
pub fn average_progress(tasks: &[TaskRecord]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let sum: u64 = tasks.iter().map(|t| u64::from(t.progress_or_zero())).sum();
    round1(sum as f64 / tasks.len() as f64)
}

fn status_counts(tasks: &[TaskRecord]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Pending => counts.pending += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Completed => counts.completed += 1,
            TaskStatus::Cancelled => counts.cancelled += 1,
        }
    }
    counts
}

fn priority_counts(tasks: &[TaskRecord]) -> PriorityCounts {
    let mut counts = PriorityCounts::default();
    for task in tasks {
        match task.priority {
            TaskPriority::Low => counts.low += 1,
            TaskPriority::Medium => counts.medium += 1,
            TaskPriority::High => counts.high += 1,
        }
    }
    counts
}

fn type_counts(tasks: &[TaskRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.task_type.clone()).or_insert(0) += 1;
    }
    counts
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
