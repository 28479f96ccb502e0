//! Domain model for tasks placed on the 3x3 importance/urgency matrix.
//!
//! # Responsibility
//! - Define the canonical task record shared by storage, classification and
//!   bulk transfer.
//! - Own normalization of tags and the canonical text forms of levels,
//!   dates and timestamps.
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod dates;
pub mod tags;
pub mod task;
