//! Due-date status relative to a caller-supplied "today".
//!
//! # Invariants
//! - A past due date is overdue regardless of the threshold.
//! - Due today counts as due soon.
//! - The threshold is carried by `ClassifierConfig`, never read from globals.

use crate::model::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default look-ahead window for the due-soon state, in days.
pub const DEFAULT_DUE_SOON_DAYS: u32 = 3;

/// Deadline state of a task relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    /// No due date.
    None,
    Normal,
    /// Due today or within the threshold.
    DueSoon,
    /// Due date is before today.
    Overdue,
}

/// Tunables for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Tasks due within this many days (inclusive) are `DueSoon`.
    pub due_soon_days: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

/// Classifier bound to one configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskClassifier {
    config: ClassifierConfig,
}

impl TaskClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    pub fn due_status(&self, task: &Task, today: NaiveDate) -> DueStatus {
        due_status(task, today, self.config.due_soon_days)
    }

    pub fn summarize(&self, tasks: &[Task], today: NaiveDate) -> DueSummary {
        summarize(tasks, today, self.config.due_soon_days)
    }
}

/// Classifies `task` against `today`.
///
/// Zero days left counts as due-soon, not overdue.
pub fn due_status(task: &Task, today: NaiveDate, threshold_days: u32) -> DueStatus {
    let Some(due) = task.due_date else {
        return DueStatus::None;
    };
    let days_left = due.signed_duration_since(today).num_days();
    if days_left < 0 {
        DueStatus::Overdue
    } else if days_left <= i64::from(threshold_days) {
        DueStatus::DueSoon
    } else {
        DueStatus::Normal
    }
}

/// Per-status counts, e.g. for a reminder badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSummary {
    pub overdue: usize,
    pub due_soon: usize,
    pub normal: usize,
    pub no_due_date: usize,
}

impl DueSummary {
    /// Tasks that need attention now.
    pub fn attention(&self) -> usize {
        self.overdue + self.due_soon
    }
}

pub fn summarize(tasks: &[Task], today: NaiveDate, threshold_days: u32) -> DueSummary {
    let mut summary = DueSummary::default();
    for task in tasks {
        match due_status(task, today, threshold_days) {
            DueStatus::Overdue => summary.overdue += 1,
            DueStatus::DueSoon => summary.due_soon += 1,
            DueStatus::Normal => summary.normal += 1,
            DueStatus::None => summary.no_due_date += 1,
        }
    }
    summary
}
