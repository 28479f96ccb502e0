//! Presentation order inside one matrix cell.

use crate::model::task::Task;
use chrono::NaiveDate;

/// Ascending key: earliest due date first, undated tasks last, then title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub has_no_due_date: bool,
    pub due_date: Option<NaiveDate>,
    pub title_lowercase: String,
}

pub fn sort_key(task: &Task) -> SortKey {
    SortKey {
        has_no_due_date: task.due_date.is_none(),
        due_date: task.due_date,
        title_lowercase: task.title.to_lowercase(),
    }
}

/// Stable ascending sort by [`sort_key`].
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_cached_key(sort_key);
}
