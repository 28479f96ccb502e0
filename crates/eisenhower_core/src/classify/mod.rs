//! Pure classification of tasks for presentation.
//!
//! # Responsibility
//! - Derive matrix placement, due-date status, filter membership and sort
//!   order from a task and a caller-supplied "today".
//!
//! # Invariants
//! - Every function here is side-effect free and independent of storage.
//! - Thresholds arrive through `ClassifierConfig`, never through globals.

mod due;
mod filter;
mod order;
mod view;

pub use due::{
    due_status, summarize, ClassifierConfig, DueStatus, DueSummary, TaskClassifier,
    DEFAULT_DUE_SOON_DAYS,
};
pub use filter::{matches, DateRange, TaskFilter};
pub use order::{sort_key, sort_tasks, SortKey};
pub use view::{build_matrix_view, CellView, ClassifiedTask, MatrixView};

use crate::model::task::{MatrixCell, Task};

/// Matrix cell holding `task`; always one of the nine valid pairs.
pub fn cell_of(task: &Task) -> MatrixCell {
    task.cell()
}
