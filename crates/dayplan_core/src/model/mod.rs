//! Date-keyed planner domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by store and rollover logic.
//! - Keep the persisted shape to `{date, tasks}` pairs only.
//!
//! # Invariants
//! - At most one `DayRecord` exists per calendar day inside a `DayBook`.
//! - Task text is normalized before it is stored.

pub mod day_book;
pub mod day_record;
