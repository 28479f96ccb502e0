//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and classifier calls into UI-level operations.
//! - Keep UI layers decoupled from storage details.

pub mod task_service;
