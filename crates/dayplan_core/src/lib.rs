//! Core domain logic for the DayPlan weekly planner.
//! This crate is the single source of truth for day and task invariants.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::{local_now, local_today, CalendarDay};
pub use config::{ConfigError, PlannerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::day_book::DayBook;
pub use model::day_record::{normalize_task_text, DayRecord};
pub use repo::codec::{decode_days, encode_days, CodecError, TASKS_STORAGE_KEY};
pub use repo::day_repo::{
    DayRepository, MemoryDayRepository, RepoError, RepoResult, SqliteDayRepository,
};
pub use service::feedback::{FeedbackCue, FeedbackSink, NoopFeedback};
pub use service::session::PlannerSession;
pub use service::task_store::{
    StoreChange, StoreChangeKind, StoreError, StoreResult, SubscriptionId, TaskStore,
};
pub use service::week_roller::{
    DayChangeTicker, RolloverReport, RolloverScope, WeekAnchor, WeekRoller,
    DEFAULT_TICK_INTERVAL, WEEK_LEN,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
