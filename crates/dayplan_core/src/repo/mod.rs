//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the whole-list persistence contract used by the task store.
//! - Isolate SQLite and blob encoding details from store orchestration.
//!
//! # Invariants
//! - The on-disk shape is one encoded array of `{date, tasks}` pairs.
//! - Repository APIs surface storage failures as `RepoError`; nothing is
//!   swallowed.

pub mod codec;
pub mod day_repo;
