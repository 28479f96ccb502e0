//! Task use-case service.
//!
//! # Responsibility
//! - Provide the create/edit/move/delete entry points the UI layer calls.
//! - Return records read back from storage so callers re-sync from the store
//!   instead of trusting a long-lived cache.
//! - Assemble the filtered, classified matrix snapshot.
//!
//! # Invariants
//! - Titles are validated before any storage call.
//! - `id` and `created_at` never change after creation.
//! - Every mutation refreshes `updated_at`.

use crate::classify::{build_matrix_view, MatrixView, TaskClassifier, TaskFilter};
use crate::model::tags::TagSet;
use crate::model::task::{Level, MatrixCell, Task, TaskId, TaskValidationError, DEFAULT_STATUS};
use crate::repo::task_repo::{StoreError, TaskRepository};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before reaching storage.
    Validation(TaskValidationError),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Persistence-layer failure.
    Store(StoreError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub importance: Level,
    pub urgency: Level,
    pub due_date: Option<NaiveDate>,
    pub tags: TagSet,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Full replacement of every editable field of an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: String,
    pub description: Option<String>,
    pub importance: Level,
    pub urgency: Level,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub tags: TagSet,
}

impl TaskEdit {
    /// Prefills an edit from the current record.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            importance: task.importance,
            urgency: task.urgency,
            due_date: task.due_date,
            status: task.status.clone(),
            tags: task.tags.clone(),
        }
    }
}

/// Use-case service over a task repository.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates and persists a task, returning the stored record.
    pub fn create_task(&self, draft: NewTask) -> Result<Task, ServiceError> {
        let title = normalize_title(&draft.title)?;
        let mut task = Task::new(title);
        task.description = normalize_description(draft.description);
        task.importance = draft.importance;
        task.urgency = draft.urgency;
        task.due_date = draft.due_date;
        task.tags = draft.tags;

        self.repo.upsert(&task)?;
        self.read_back(task.id, "created task not found in read-back")
    }

    /// Replaces the editable fields of an existing task.
    pub fn update_task(&self, id: TaskId, edit: TaskEdit) -> Result<Task, ServiceError> {
        let title = normalize_title(&edit.title)?;
        let mut task = self.repo.get(id)?.ok_or(ServiceError::NotFound(id))?;
        task.title = title;
        task.description = normalize_description(edit.description);
        task.importance = edit.importance;
        task.urgency = edit.urgency;
        task.due_date = edit.due_date;
        task.status = if edit.status.trim().is_empty() {
            DEFAULT_STATUS.to_string()
        } else {
            edit.status.trim().to_string()
        };
        task.tags = edit.tags;
        task.touch();

        self.repo.upsert(&task)?;
        self.read_back(id, "updated task not found in read-back")
    }

    /// Moves a task to another matrix cell (drag and drop).
    pub fn move_task(&self, id: TaskId, cell: MatrixCell) -> Result<Task, ServiceError> {
        let mut task = self.repo.get(id)?.ok_or(ServiceError::NotFound(id))?;
        task.move_to(cell);
        self.repo.upsert(&task)?;
        self.read_back(id, "moved task not found in read-back")
    }

    /// Permanently deletes a task; unknown ids are ignored.
    pub fn delete_task(&self, id: TaskId) -> Result<(), ServiceError> {
        self.repo.delete(id)?;
        Ok(())
    }

    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, ServiceError> {
        Ok(self.repo.get(id)?)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.repo.load_all()?)
    }

    /// Loads all tasks and arranges the ones passing `filter` into cells.
    pub fn matrix_view(
        &self,
        filter: &TaskFilter,
        today: NaiveDate,
        classifier: &TaskClassifier,
    ) -> Result<MatrixView, ServiceError> {
        let tasks = self.repo.load_all()?;
        Ok(build_matrix_view(tasks, filter, today, classifier))
    }

    fn read_back(&self, id: TaskId, details: &'static str) -> Result<Task, ServiceError> {
        self.repo
            .get(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}

fn normalize_title(title: &str) -> Result<String, TaskValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
