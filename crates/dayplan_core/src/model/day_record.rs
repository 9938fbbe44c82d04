//! Day record domain model.
//!
//! # Responsibility
//! - Define the persisted unit: one calendar day plus its ordered tasks.
//! - Normalize task text before it reaches storage.
//!
//! # Invariants
//! - `tasks` is ordered newest first; additions are prepended.
//! - A record never holds the same task text twice.

use crate::calendar::CalendarDay;
use chrono::NaiveDate;

/// One calendar day with its ordered task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    /// Calendar day key. Time-of-day is never stored.
    pub date: NaiveDate,
    /// Task texts, newest first.
    pub tasks: Vec<String>,
}

impl DayRecord {
    /// Creates an empty record for the given day.
    pub fn new(day: impl CalendarDay) -> Self {
        Self {
            date: day.calendar_day(),
            tasks: Vec::new(),
        }
    }

    /// Creates a record from raw task texts.
    ///
    /// Texts are normalized; blanks and repeats are dropped while keeping
    /// the first occurrence in its original position.
    pub fn with_tasks<I, S>(day: impl CalendarDay, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self::new(day);
        for raw in tasks {
            let task = normalize_task_text(raw.as_ref());
            if !task.is_empty() && !record.contains(&task) {
                record.tasks.push(task);
            }
        }
        record
    }

    pub fn contains(&self, task: &str) -> bool {
        self.tasks.iter().any(|existing| existing == task)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Puts `task` at the front. Returns `false` when it is already listed.
    pub fn prepend(&mut self, task: String) -> bool {
        if self.contains(&task) {
            return false;
        }
        self.tasks.insert(0, task);
        true
    }

    /// Moves `task` to the front, inserting it when absent.
    pub fn bring_to_front(&mut self, task: String) {
        self.remove(&task);
        self.tasks.insert(0, task);
    }

    /// Removes the first entry equal to `task`.
    pub fn remove(&mut self, task: &str) -> bool {
        match self.tasks.iter().position(|existing| existing == task) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Strips list-bullet decoration from user input.
///
/// Leading and trailing runs of `-` and whitespace are removed, so
/// `"- buy milk "` and `"buy milk"` name the same task.
pub fn normalize_task_text(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}
