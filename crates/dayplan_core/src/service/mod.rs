//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into planner use-cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod feedback;
pub mod session;
pub mod task_store;
pub mod week_roller;
