//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level planner functions to Dart via FRB.
//! - Own the process-wide planner session behind a mutex.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Days cross the boundary as `YYYY-MM-DD` strings.
//! - Store failures come back as `ok=false` envelopes; nothing is swallowed.

use chrono::NaiveDate;
use dayplan_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, local_now,
    local_today, ping as ping_inner, DayRecord, NoopFeedback, PlannerConfig, PlannerSession,
    RolloverReport, SqliteDayRepository, StoreResult,
};
use log::{error, info};
use std::sync::{Mutex, PoisonError};

const DAY_FORMAT: &str = "%Y-%m-%d";

static SESSION: Mutex<Option<PlannerSession<SqliteDayRepository>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One day tile as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayItem {
    /// Calendar day in `YYYY-MM-DD` form.
    pub day: String,
    /// Task texts, newest first.
    pub tasks: Vec<String>,
}

/// Week window envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerWeekResponse {
    pub ok: bool,
    /// Seven consecutive days, ascending. Empty on failure.
    pub days: Vec<DayItem>,
    pub selected_day: String,
    pub message: String,
}

/// Tasks-of-one-day envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerTasksResponse {
    pub ok: bool,
    pub tasks: Vec<String>,
    pub message: String,
}

/// Mutation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerActionResponse {
    /// Whether the call completed without error.
    pub ok: bool,
    /// Whether stored state changed. Duplicate adds and missing tasks
    /// report `ok=true, changed=false`.
    pub changed: bool,
    pub message: String,
}

impl PlannerActionResponse {
    fn from_result(label: &str, result: Result<bool, String>) -> Self {
        match result {
            Ok(true) => Self {
                ok: true,
                changed: true,
                message: format!("{label} done."),
            },
            Ok(false) => Self {
                ok: true,
                changed: false,
                message: "Nothing changed.".to_string(),
            },
            Err(err) => Self {
                ok: false,
                changed: false,
                message: format!("{label} failed: {err}"),
            },
        }
    }
}

/// Foreground/tick envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerRefreshResponse {
    pub ok: bool,
    /// Whether expired days were folded into today.
    pub rolled_over: bool,
    pub migrated: u32,
    pub message: String,
}

/// Returns the week window anchored at `today` (`""` means the device day).
#[flutter_rust_bridge::frb(sync)]
pub fn planner_week(today: String) -> PlannerWeekResponse {
    let result = parse_optional_day(&today).and_then(|today| {
        with_session(|session| {
            session.refresh_week(today)?;
            Ok((to_day_items(session.week()), session.selected_day()))
        })
    });

    match result {
        Ok((days, selected)) => PlannerWeekResponse {
            ok: true,
            days,
            selected_day: format_day(selected),
            message: String::new(),
        },
        Err(err) => PlannerWeekResponse {
            ok: false,
            days: Vec::new(),
            selected_day: String::new(),
            message: format!("planner_week failed: {err}"),
        },
    }
}

/// Returns the tasks stored for one day.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_tasks(day: String) -> PlannerTasksResponse {
    let result = parse_day(&day)
        .and_then(|day| with_session(|session| Ok(session.store().tasks_for(day))));
    match result {
        Ok(tasks) => PlannerTasksResponse {
            ok: true,
            tasks,
            message: String::new(),
        },
        Err(err) => PlannerTasksResponse {
            ok: false,
            tasks: Vec::new(),
            message: format!("planner_tasks failed: {err}"),
        },
    }
}

/// Adds a task at the front of `day`.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_add_task(day: String, text: String) -> PlannerActionResponse {
    let result =
        parse_day(&day).and_then(|day| with_session(|session| session.add_task_on(&text, day)));
    PlannerActionResponse::from_result("planner_add_task", result)
}

/// Deletes the first matching task from `day`.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_delete_task(day: String, text: String) -> PlannerActionResponse {
    let result =
        parse_day(&day).and_then(|day| with_session(|session| session.delete_task(&text, day)));
    PlannerActionResponse::from_result("planner_delete_task", result)
}

/// Moves a task from `from` to the front of `to`.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_move_task(from: String, to: String, text: String) -> PlannerActionResponse {
    let result = parse_day(&from).and_then(|from| {
        let to = parse_day(&to)?;
        with_session(|session| session.move_task(&text, from, to))
    });
    PlannerActionResponse::from_result("planner_move_task", result)
}

/// Moves a task from `day` to the following day.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_move_task_to_next_day(day: String, text: String) -> PlannerActionResponse {
    let result = parse_day(&day)
        .and_then(|day| with_session(|session| session.move_task_to_next_day(&text, day)));
    PlannerActionResponse::from_result("planner_move_task_to_next_day", result)
}

/// Host regained foreground; rolls over when the day advanced.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_refresh() -> PlannerRefreshResponse {
    let result = with_session(|session| session.on_foreground(local_now()));
    to_refresh_response("planner_refresh", result)
}

/// Periodic host timer tick; cheap when the tick interval has not elapsed.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_tick() -> PlannerRefreshResponse {
    let result = with_session(|session| session.on_tick(local_now()));
    to_refresh_response("planner_tick", result)
}

fn to_refresh_response(
    label: &str,
    result: Result<Option<RolloverReport>, String>,
) -> PlannerRefreshResponse {
    match result {
        Ok(Some(report)) => PlannerRefreshResponse {
            ok: true,
            rolled_over: true,
            migrated: u32::try_from(report.migrated).unwrap_or(u32::MAX),
            message: format!("Rolled over into {}.", format_day(report.target_day)),
        },
        Ok(None) => PlannerRefreshResponse {
            ok: true,
            rolled_over: false,
            migrated: 0,
            message: String::new(),
        },
        Err(err) => PlannerRefreshResponse {
            ok: false,
            rolled_over: false,
            migrated: 0,
            message: format!("{label} failed: {err}"),
        },
    }
}

fn with_session<T>(
    f: impl FnOnce(&mut PlannerSession<SqliteDayRepository>) -> StoreResult<T>,
) -> Result<T, String> {
    // A panic while holding the lock cannot leave a half-applied store
    // change, so a poisoned session is still usable.
    let mut guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        *guard = Some(open_session()?);
    }
    let session = guard
        .as_mut()
        .ok_or_else(|| "planner session unavailable".to_string())?;
    f(session).map_err(|err| err.to_string())
}

fn open_session() -> Result<PlannerSession<SqliteDayRepository>, String> {
    let config =
        PlannerConfig::from_env().map_err(|err| format!("planner config invalid: {err}"))?;
    let repo = SqliteDayRepository::open(&config.db_path)
        .map_err(|err| format!("planner DB open failed: {err}"))?;
    let session = PlannerSession::from_config(repo, &config, Box::new(NoopFeedback), local_now())
        .map_err(|err| {
            error!(
                "event=ffi_session_open module=ffi status=error error={}",
                err
            );
            format!("planner init failed: {err}")
        })?;
    info!(
        "event=ffi_session_open module=ffi status=ok db_path={}",
        config.db_path.display()
    );
    Ok(session)
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DAY_FORMAT)
        .map_err(|_| format!("invalid day `{trimmed}`; expected YYYY-MM-DD"))
}

fn parse_optional_day(raw: &str) -> Result<NaiveDate, String> {
    if raw.trim().is_empty() {
        return Ok(local_today());
    }
    parse_day(raw)
}

fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn to_day_items(records: &[DayRecord]) -> Vec<DayItem> {
    records
        .iter()
        .map(|record| DayItem {
            day: format_day(record.date),
            tasks: record.tasks.clone(),
        })
        .collect()
}
