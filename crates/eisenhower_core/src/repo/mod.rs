//! Repository layer for durable task storage.
//!
//! # Responsibility
//! - Define the storage contract consumed by services and bulk transfer.
//! - Isolate SQLite query details from classification and use-case code.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - Repositories never filter or sort on behalf of callers.

pub mod task_repo;
