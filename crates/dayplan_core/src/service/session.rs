//! Planner session state for UI hosts.
//!
//! # Responsibility
//! - Hold the selected day and the cached week window.
//! - Route user actions to the task store and emit feedback cues.
//! - Run rollover when the host returns to foreground or ticks.
//!
//! # Invariants
//! - The cached week is refreshed after every successful mutation.
//! - Rollover runs only when the observed calendar day advanced, never
//!   because the user selected another day.

use crate::calendar::{day_distance, CalendarDay};
use crate::config::PlannerConfig;
use crate::model::day_record::DayRecord;
use crate::repo::day_repo::DayRepository;
use crate::service::feedback::{FeedbackCue, FeedbackSink};
use crate::service::task_store::{StoreError, StoreResult, TaskStore};
use crate::service::week_roller::{DayChangeTicker, RolloverReport, WeekRoller};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use std::time::Duration;

/// Session over one task store.
pub struct PlannerSession<R: DayRepository> {
    store: TaskStore<R>,
    roller: WeekRoller,
    ticker: DayChangeTicker,
    selected_day: NaiveDate,
    week: Vec<DayRecord>,
    feedback: Box<dyn FeedbackSink + Send>,
}

impl<R: DayRepository> PlannerSession<R> {
    /// Starts a session at `now`.
    ///
    /// Startup counts as a foreground transition: yesterday is rolled over
    /// and the week window is materialized before returning.
    pub fn start(
        store: TaskStore<R>,
        roller: WeekRoller,
        tick_interval: Duration,
        feedback: Box<dyn FeedbackSink + Send>,
        now: NaiveDateTime,
    ) -> StoreResult<Self> {
        let today = now.date();
        let mut session = Self {
            store,
            roller,
            ticker: DayChangeTicker::new(tick_interval, today),
            selected_day: today,
            week: Vec::new(),
            feedback,
        };
        session.ticker.observe(now);
        session.roller.roll_over_day(&mut session.store, today)?;
        session.refresh_week(today)?;
        info!(
            "event=session_start module=session status=ok today={} days={}",
            today,
            session.store.list_days().len()
        );
        Ok(session)
    }

    /// Opens the store over `repo` and starts a session with config policy.
    pub fn from_config(
        repo: R,
        config: &PlannerConfig,
        feedback: Box<dyn FeedbackSink + Send>,
        now: NaiveDateTime,
    ) -> StoreResult<Self> {
        let store = TaskStore::open_at(repo, now)?;
        let roller = WeekRoller::new(config.week_anchor, config.rollover_scope);
        Self::start(store, roller, config.tick_interval, feedback, now)
    }

    pub fn store(&self) -> &TaskStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore<R> {
        &mut self.store
    }

    pub fn week(&self) -> &[DayRecord] {
        &self.week
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.selected_day
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Adds a task to the selected day.
    ///
    /// Blank input is ignored and returns `Ok(false)`.
    pub fn add_task(&mut self, text: &str) -> StoreResult<bool> {
        self.add_task_on(text, self.selected_day)
    }

    pub fn add_task_on(&mut self, text: &str, day: impl CalendarDay) -> StoreResult<bool> {
        if text.trim().is_empty() {
            return Ok(false);
        }
        let added = match self.store.add_task(text, day) {
            Ok(added) => added,
            Err(StoreError::EmptyTask) => return Ok(false),
            Err(err) => return Err(err),
        };
        self.after_change(added, FeedbackCue::TaskAdded)
    }

    pub fn delete_task(&mut self, text: &str, day: impl CalendarDay) -> StoreResult<bool> {
        let deleted = self.store.delete_task(text, day)?;
        self.after_change(deleted, FeedbackCue::TaskDeleted)
    }

    pub fn move_task(
        &mut self,
        text: &str,
        from: impl CalendarDay,
        to: impl CalendarDay,
    ) -> StoreResult<bool> {
        let moved = self.store.move_task(text, from, to)?;
        self.after_change(moved, FeedbackCue::TaskMoved)
    }

    pub fn move_task_to_next_day(&mut self, text: &str, day: impl CalendarDay) -> StoreResult<bool> {
        let moved = self.store.move_task_to_next_day(text, day)?;
        self.after_change(moved, FeedbackCue::TaskMoved)
    }

    /// Applies the tile tap rule.
    ///
    /// Tapping the selected tile, or tapping today while another day is
    /// selected, returns the selection to today. Any other tap selects it.
    pub fn select_day(&mut self, day: impl CalendarDay, today: impl CalendarDay) -> NaiveDate {
        let day = day.calendar_day();
        let today = today.calendar_day();
        self.selected_day = if day == self.selected_day || day == today {
            today
        } else {
            day
        };
        self.selected_day
    }

    /// Day distance between `day` and the selected day.
    pub fn distance_from_selected(&self, day: impl CalendarDay) -> i64 {
        day_distance(self.selected_day, day.calendar_day())
    }

    /// Host regained foreground at `now`.
    pub fn on_foreground(&mut self, now: NaiveDateTime) -> StoreResult<Option<RolloverReport>> {
        let report = self.check_day_change(now)?;
        if report.is_none() {
            self.refresh_week(now.date())?;
        }
        Ok(report)
    }

    /// Periodic host tick. Checks only when the tick interval elapsed.
    pub fn on_tick(&mut self, now: NaiveDateTime) -> StoreResult<Option<RolloverReport>> {
        if !self.ticker.is_due(now) {
            return Ok(None);
        }
        self.check_day_change(now)
    }

    /// Re-derives the cached week window for `today`.
    pub fn refresh_week(&mut self, today: impl CalendarDay) -> StoreResult<()> {
        self.week = self.roller.current_week_window(&mut self.store, today)?;
        Ok(())
    }

    fn check_day_change(&mut self, now: NaiveDateTime) -> StoreResult<Option<RolloverReport>> {
        let Some(previous) = self.ticker.pending_change(now) else {
            self.ticker.observe(now);
            return Ok(None);
        };
        let today = now.date();
        info!("event=day_change module=session status=start previous={previous} today={today}");

        // The ticker only advances once the new day is fully applied, so a
        // failed write is retried on the next tick or foreground.
        let report = self.roller.roll_over_day(&mut self.store, today)?;
        self.refresh_week(today)?;
        self.selected_day = today;
        self.ticker.observe(now);
        self.feedback.emit(FeedbackCue::DayChanged);
        Ok(report)
    }

    fn after_change(&mut self, changed: bool, cue: FeedbackCue) -> StoreResult<bool> {
        if changed {
            let today = self.ticker.last_day();
            self.refresh_week(today)?;
            self.feedback.emit(cue);
        }
        Ok(changed)
    }
}
