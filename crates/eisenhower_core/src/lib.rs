//! Core domain logic for the Eisenhower 3x3 task organizer.
//! This crate is the single source of truth for task invariants; UI layers
//! call into it and re-sync from the store after every mutation.

pub mod classify;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod transfer;

pub use classify::{
    cell_of, due_status, matches, sort_key, sort_tasks, ClassifierConfig, DateRange, DueStatus,
    MatrixView, SortKey, TaskClassifier, TaskFilter,
};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::tags::TagSet;
pub use model::task::{Level, MatrixCell, Task, TaskId, TaskValidationError};
pub use repo::task_repo::{
    LoadOutcome, MalformedRecord, Recovery, SqliteTaskStore, StoreError, StoreResult,
    TaskRepository,
};
pub use service::task_service::{NewTask, ServiceError, TaskEdit, TaskService};
pub use transfer::{
    export_csv, export_xlsx, import_csv, import_xlsx, ImportOptions, ImportReport, TransferError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
