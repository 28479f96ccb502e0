//! Nine-cell snapshot assembled for rendering.
//!
//! # Responsibility
//! - Bucket filtered tasks by cell, sort each bucket and annotate due status.
//!
//! # Invariants
//! - Cells appear in `MatrixCell::all()` order, including empty ones.

use super::due::{DueStatus, TaskClassifier};
use super::filter::{matches, TaskFilter};
use super::order::sort_key;
use crate::model::task::{MatrixCell, Task};
use chrono::NaiveDate;

/// Task paired with its derived deadline state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTask {
    pub task: Task,
    pub due_status: DueStatus,
}

/// Contents of one matrix cell, sorted by due date then title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub cell: MatrixCell,
    pub items: Vec<ClassifiedTask>,
}

/// Snapshot of all nine cells, in [`MatrixCell::all`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixView {
    pub cells: Vec<CellView>,
}

impl MatrixView {
    pub fn cell(&self, cell: MatrixCell) -> &CellView {
        &self.cells[cell.grid_index()]
    }

    /// Number of tasks across all cells.
    pub fn total(&self) -> usize {
        self.cells.iter().map(|cell| cell.items.len()).sum()
    }
}

/// Buckets the tasks passing `filter` into their cells.
pub fn build_matrix_view(
    tasks: Vec<Task>,
    filter: &TaskFilter,
    today: NaiveDate,
    classifier: &TaskClassifier,
) -> MatrixView {
    let mut cells: Vec<CellView> = MatrixCell::all()
        .into_iter()
        .map(|cell| CellView {
            cell,
            items: Vec::new(),
        })
        .collect();

    for task in tasks.into_iter().filter(|task| matches(task, filter)) {
        let due_status = classifier.due_status(&task, today);
        cells[task.cell().grid_index()]
            .items
            .push(ClassifiedTask { task, due_status });
    }

    for cell in &mut cells {
        cell.items.sort_by_cached_key(|item| sort_key(&item.task));
    }

    MatrixView { cells }
}
