//! Week window derivation and day rollover.
//!
//! # Responsibility
//! - Derive the seven visible days from today and an anchor policy.
//! - Migrate unfinished tasks from expired days into today.
//! - Detect calendar day changes for host-driven periodic checks.
//!
//! # Invariants
//! - The week window always holds exactly `WEEK_LEN` consecutive days.
//! - Rollover walks each expired day in list order and prepends every task
//!   to today, so a migrated day lands above today's tasks in reverse order.
//!   A task already listed today is never duplicated.
//! - A rollover and a window refresh are each persisted as a single write.

use crate::calendar::{monday_on_or_before, shift_day, CalendarDay};
use crate::model::day_record::DayRecord;
use crate::repo::day_repo::DayRepository;
use crate::service::task_store::{StoreChange, StoreChangeKind, StoreError, StoreResult, TaskStore};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::time::Duration;

/// Number of days in the visible window.
pub const WEEK_LEN: usize = 7;

/// Interval between host-driven day change checks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// First day of the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekAnchor {
    /// `today..=today + 6`.
    #[default]
    Today,
    /// Monday on or before today through the following Sunday.
    Monday,
}

/// Which expired days a rollover drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloverScope {
    /// Only the day immediately before today.
    #[default]
    PreviousDay,
    /// Every stored day before today, oldest first.
    AllStaleDays,
}

/// Outcome of a rollover that found something to migrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverReport {
    pub target_day: NaiveDate,
    /// Expired days whose records were deleted, oldest first.
    pub source_days: Vec<NaiveDate>,
    /// Tasks that landed on the target day. Tasks already present there
    /// are not counted.
    pub migrated: usize,
}

/// Stateless week and rollover policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekRoller {
    anchor: WeekAnchor,
    scope: RolloverScope,
}

impl WeekRoller {
    pub fn new(anchor: WeekAnchor, scope: RolloverScope) -> Self {
        Self { anchor, scope }
    }

    pub fn anchor(&self) -> WeekAnchor {
        self.anchor
    }

    pub fn scope(&self) -> RolloverScope {
        self.scope
    }

    /// Returns the seven days of the window containing `today`.
    pub fn week_days(&self, today: impl CalendarDay) -> StoreResult<Vec<NaiveDate>> {
        let today = today.calendar_day();
        let start = match self.anchor {
            WeekAnchor::Today => Some(today),
            WeekAnchor::Monday => monday_on_or_before(today),
        }
        .ok_or(StoreError::DateOutOfRange(today))?;

        (0..WEEK_LEN as i64)
            .map(|offset| shift_day(start, offset).ok_or(StoreError::DateOutOfRange(start)))
            .collect()
    }

    /// Returns the week's records, persisting empty ones for missing days.
    pub fn current_week_window<R: DayRepository>(
        &self,
        store: &mut TaskStore<R>,
        today: impl CalendarDay,
    ) -> StoreResult<Vec<DayRecord>> {
        let days = self.week_days(today)?;
        let mut next = store.staged();
        let mut created = Vec::new();

        for day in &days {
            if !next.contains_day(*day) {
                next.upsert(DayRecord::new(*day));
                created.push(*day);
            }
        }
        if !created.is_empty() {
            store.commit(
                next,
                StoreChange::new(StoreChangeKind::DayInserted, created.iter().copied()),
            )?;
        }

        let window = days
            .iter()
            .map(|day| store.day(*day).cloned().unwrap_or_else(|| DayRecord::new(*day)))
            .collect();
        debug!(
            "event=week_window module=roller status=ok created={}",
            created.len()
        );
        Ok(window)
    }

    /// Moves tasks from expired days into `today` and deletes those days.
    ///
    /// Returns `Ok(None)` when no expired day in scope has a record.
    pub fn roll_over_day<R: DayRepository>(
        &self,
        store: &mut TaskStore<R>,
        today: impl CalendarDay,
    ) -> StoreResult<Option<RolloverReport>> {
        let today = today.calendar_day();
        let mut next = store.staged();

        let source_days = match self.scope {
            RolloverScope::PreviousDay => {
                let yesterday = shift_day(today, -1).ok_or(StoreError::DateOutOfRange(today))?;
                if next.contains_day(yesterday) {
                    vec![yesterday]
                } else {
                    Vec::new()
                }
            }
            RolloverScope::AllStaleDays => next.days_before(today),
        };
        if source_days.is_empty() {
            return Ok(None);
        }

        let mut migrated = 0;
        for source in &source_days {
            let Some(record) = next.remove(*source) else {
                continue;
            };
            if record.is_empty() {
                continue;
            }
            let target = next.entry(today);
            for task in record.tasks {
                if target.prepend(task) {
                    migrated += 1;
                }
            }
        }

        let mut changed = source_days.clone();
        changed.push(today);
        store.commit(
            next,
            StoreChange::new(StoreChangeKind::DaysRolledOver, changed),
        )?;

        info!(
            "event=day_rollover module=roller status=ok target={} sources={} migrated={}",
            today,
            source_days.len(),
            migrated
        );
        Ok(Some(RolloverReport {
            target_day: today,
            source_days,
            migrated,
        }))
    }
}

/// Tracks the last observed day for periodic day change checks.
#[derive(Debug, Clone)]
pub struct DayChangeTicker {
    interval: Duration,
    last_day: NaiveDate,
    last_check: Option<NaiveDateTime>,
}

impl DayChangeTicker {
    pub fn new(interval: Duration, today: impl CalendarDay) -> Self {
        Self {
            interval,
            last_day: today.calendar_day(),
            last_check: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Whether a periodic check should run at `now`.
    ///
    /// A clock that moved backwards counts as due.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        match self.last_check {
            None => true,
            Some(last) => match now.signed_duration_since(last).to_std() {
                Ok(elapsed) => elapsed >= self.interval,
                Err(_) => true,
            },
        }
    }

    /// Returns the last observed day when `now` falls on a later day.
    ///
    /// Unlike `observe`, this leaves the ticker untouched.
    pub fn pending_change(&self, now: NaiveDateTime) -> Option<NaiveDate> {
        (now.date() > self.last_day).then_some(self.last_day)
    }

    /// Records a check at `now`.
    ///
    /// Returns the previously observed day when the calendar day advanced.
    /// A day that moved backwards is adopted silently.
    pub fn observe(&mut self, now: NaiveDateTime) -> Option<NaiveDate> {
        self.last_check = Some(now);
        let today = now.date();
        if today == self.last_day {
            return None;
        }
        let previous = self.last_day;
        self.last_day = today;
        (today > previous).then_some(previous)
    }
}
