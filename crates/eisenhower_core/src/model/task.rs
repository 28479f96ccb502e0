//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record rendered in one matrix cell.
//! - Provide lifecycle helpers for edits and moves between cells.
//!
//! # Invariants
//! - `id` is stable, never nil, and never reused for another task.
//! - `(importance, urgency)` always names exactly one of nine matrix cells.
//! - `title` is non-empty after trimming for every task that reaches storage.
//! - `created_at` is set once; `updated_at` is refreshed on every mutation.

use crate::model::tags::TagSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for one task.
pub type TaskId = Uuid;

/// Lifecycle tag assigned to new tasks.
pub const DEFAULT_STATUS: &str = "todo";

/// Three-step scale shared by the importance and urgency axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 3] = [Level::Low, Level::Medium, Level::High];

    /// Canonical lowercase text form used in storage and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name a known level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl Display for ParseLevelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown level `{}`; expected low|medium|high", self.0)
    }
}

impl Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses case-insensitively so legacy `High`/`LOW` values are accepted.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseLevelError(value.to_string())),
        }
    }
}

/// One of the nine `(importance, urgency)` buckets of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixCell {
    pub importance: Level,
    pub urgency: Level,
}

impl MatrixCell {
    pub const fn new(importance: Level, urgency: Level) -> Self {
        Self {
            importance,
            urgency,
        }
    }

    /// Returns all nine cells in grid order.
    ///
    /// Rows run from high to low importance, columns from low to high urgency.
    pub fn all() -> [MatrixCell; 9] {
        let mut cells = [MatrixCell::new(Level::Medium, Level::Medium); 9];
        for (row, importance) in [Level::High, Level::Medium, Level::Low]
            .into_iter()
            .enumerate()
        {
            for (col, urgency) in Level::ALL.into_iter().enumerate() {
                cells[row * 3 + col] = MatrixCell::new(importance, urgency);
            }
        }
        cells
    }

    /// Zero-based `(row, column)` of this cell in the rendered grid.
    pub fn grid_position(self) -> (usize, usize) {
        let row = match self.importance {
            Level::High => 0,
            Level::Medium => 1,
            Level::Low => 2,
        };
        let col = match self.urgency {
            Level::Low => 0,
            Level::Medium => 1,
            Level::High => 2,
        };
        (row, col)
    }

    /// Flat index into the row-major grid returned by [`MatrixCell::all`].
    pub fn grid_index(self) -> usize {
        let (row, col) = self.grid_position();
        row * 3 + col
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
    /// Nil UUID is reserved and cannot identify a task.
    NilId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::NilId => write!(f, "task id cannot be the nil uuid"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskWire")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub importance: Level,
    pub urgency: Level,
    /// Naive calendar date, compared against the caller's local "today".
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// `None` until the first mutation after creation.
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-form lifecycle tag; not interpreted by classification.
    pub status: String,
    pub tags: TagSet,
}

#[derive(Deserialize)]
struct TaskWire {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    importance: Level,
    #[serde(default)]
    urgency: Level,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_status")]
    status: String,
    #[serde(default)]
    tags: TagSet,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl TryFrom<TaskWire> for Task {
    type Error = TaskValidationError;

    fn try_from(wire: TaskWire) -> Result<Self, Self::Error> {
        let task = Task {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            importance: wire.importance,
            urgency: wire.urgency,
            due_date: wire.due_date,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            status: wire.status,
            tags: wire.tags,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Creates a task with a generated id and `created_at = now`.
    ///
    /// Importance and urgency start at `medium`, status at `todo`.
    pub fn new(title: impl Into<String>) -> Self {
        Self::build(Uuid::new_v4(), title.into())
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: TaskId, title: impl Into<String>) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        Ok(Self::build(id, title.into()))
    }

    fn build(id: TaskId, title: String) -> Self {
        Self {
            id,
            title,
            description: None,
            importance: Level::default(),
            urgency: Level::default(),
            due_date: None,
            created_at: Utc::now(),
            updated_at: None,
            status: default_status(),
            tags: TagSet::new(),
        }
    }

    /// Checks record invariants required before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Matrix cell currently holding this task.
    pub fn cell(&self) -> MatrixCell {
        MatrixCell::new(self.importance, self.urgency)
    }

    /// Moves the task to another cell and records the mutation time.
    pub fn move_to(&mut self, cell: MatrixCell) {
        self.importance = cell.importance;
        self.urgency = cell.urgency;
        self.touch();
    }

    /// Marks the task as mutated now.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
