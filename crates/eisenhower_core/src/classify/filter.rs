//! Filter predicate for the matrix view.
//!
//! # Invariants
//! - Every supplied criterion must hold (logical AND).
//! - The default filter matches every task.

use crate::model::tags::TagSet;
use crate::model::task::{Level, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive due-date window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// A range with no bounds places no constraint.
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Filter options; every supplied field must match (logical AND).
///
/// The default value matches every task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title; blank means any.
    pub search_text: Option<String>,
    /// Exact importance; `None` means any.
    pub importance: Option<Level>,
    /// Matches when the task shares at least one tag; empty means any.
    pub tags: TagSet,
    /// Tasks without a due date fail any non-empty range.
    pub date_range: Option<DateRange>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        normalized_search(self).is_none()
            && self.importance.is_none()
            && self.tags.is_empty()
            && self.date_range.map_or(true, |range| range.is_empty())
    }
}

pub fn matches(task: &Task, filter: &TaskFilter) -> bool {
    if let Some(needle) = normalized_search(filter) {
        if !task.title.to_lowercase().contains(&needle) {
            return false;
        }
    }

    if let Some(importance) = filter.importance {
        if task.importance != importance {
            return false;
        }
    }

    if !filter.tags.is_empty() && !task.tags.intersects(&filter.tags) {
        return false;
    }

    if let Some(range) = filter.date_range.filter(|range| !range.is_empty()) {
        match task.due_date {
            Some(due) if range.contains(due) => {}
            _ => return false,
        }
    }

    true
}

fn normalized_search(filter: &TaskFilter) -> Option<String> {
    filter
        .search_text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase)
}
