//! Date-bucketed task store.
//!
//! # Responsibility
//! - Own the in-memory day book and keep it in sync with the repository.
//! - Provide task add/delete/move and day upsert/delete use-cases.
//! - Publish change events to subscribers after successful writes.
//!
//! # Invariants
//! - Every mutation is staged on a copy, persisted, then committed. A failed
//!   save leaves the in-memory book untouched.
//! - No-op calls neither write nor publish.
//! - Task text never appears in log output.

use crate::calendar::{local_today, shift_day, CalendarDay};
use crate::model::day_book::DayBook;
use crate::model::day_record::{normalize_task_text, DayRecord};
use crate::repo::day_repo::{DayRepository, RepoError};
use chrono::NaiveDate;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from task store use-cases.
#[derive(Debug)]
pub enum StoreError {
    /// Task text is blank after normalization.
    EmptyTask,
    /// Day arithmetic left the representable calendar range.
    DateOutOfRange(NaiveDate),
    /// Persistence-layer failure; in-memory state was not changed.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTask => write!(f, "task text must not be blank"),
            Self::DateOutOfRange(day) => write!(f, "date out of range near {day}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Kind of state change carried by a `StoreChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChangeKind {
    TaskAdded,
    TaskDeleted,
    TaskMoved,
    DayInserted,
    DayDeleted,
    DaysRolledOver,
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub kind: StoreChangeKind,
    /// Days whose records changed, ascending, without repeats.
    pub days: Vec<NaiveDate>,
}

impl StoreChange {
    pub fn new(kind: StoreChangeKind, days: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut days: Vec<NaiveDate> = days.into_iter().collect();
        days.sort();
        days.dedup();
        Self { kind, days }
    }
}

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&StoreChange) + Send>;

/// Task store over a whole-list repository.
pub struct TaskStore<R: DayRepository> {
    repo: R,
    book: DayBook,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl<R: DayRepository> TaskStore<R> {
    /// Loads persisted days; seeds an empty record for today when the
    /// store holds nothing yet.
    pub fn open(repo: R) -> StoreResult<Self> {
        Self::open_at(repo, local_today())
    }

    /// Same as `open` with an explicit notion of today.
    pub fn open_at(repo: R, today: impl CalendarDay) -> StoreResult<Self> {
        let book = repo.load_days()?;
        let mut store = Self {
            repo,
            book,
            listeners: Vec::new(),
            next_subscription: 1,
        };

        if store.book.is_empty() {
            let mut seeded = DayBook::new();
            seeded.upsert(DayRecord::new(today));
            store.persist(seeded)?;
        }

        info!(
            "event=store_open module=store status=ok days={}",
            store.book.len()
        );
        Ok(store)
    }

    /// Returns all persisted days sorted by date ascending.
    pub fn list_days(&self) -> &[DayRecord] {
        self.book.records()
    }

    pub fn day(&self, day: impl CalendarDay) -> Option<&DayRecord> {
        self.book.get(day)
    }

    /// Returns the tasks of the record for `day`, or an empty list.
    pub fn tasks_for(&self, day: impl CalendarDay) -> Vec<String> {
        self.book
            .get(day)
            .map(|record| record.tasks.clone())
            .unwrap_or_default()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    /// Prepends `text` to the day's list, creating the day when absent.
    ///
    /// Returns `Ok(false)` when the normalized text is already listed.
    ///
    /// # Errors
    /// - `EmptyTask` when the text is blank after normalization.
    /// - `Repo` when persisting fails.
    pub fn add_task(&mut self, text: &str, day: impl CalendarDay) -> StoreResult<bool> {
        let task = normalize_task_text(text);
        if task.is_empty() {
            return Err(StoreError::EmptyTask);
        }
        let day = day.calendar_day();

        let mut next = self.book.clone();
        if !next.entry(day).prepend(task) {
            debug!("event=task_add module=store status=skipped reason=duplicate day={day}");
            return Ok(false);
        }

        self.commit(next, StoreChange::new(StoreChangeKind::TaskAdded, [day]))?;
        info!(
            "event=task_add module=store status=ok day={} count={}",
            day,
            self.tasks_len(day)
        );
        Ok(true)
    }

    /// Removes the first entry matching `text` from the day.
    pub fn delete_task(&mut self, text: &str, day: impl CalendarDay) -> StoreResult<bool> {
        let task = normalize_task_text(text);
        let day = day.calendar_day();

        let mut next = self.book.clone();
        let removed = next
            .get_mut(day)
            .map(|record| record.remove(&task))
            .unwrap_or(false);
        if !removed {
            return Ok(false);
        }

        self.commit(next, StoreChange::new(StoreChangeKind::TaskDeleted, [day]))?;
        info!(
            "event=task_delete module=store status=ok day={} count={}",
            day,
            self.tasks_len(day)
        );
        Ok(true)
    }

    /// Moves `text` from one day to the front of another.
    ///
    /// The destination day is created when absent. A destination that
    /// already lists the text gets it moved to the front rather than
    /// duplicated. Returns `Ok(false)` when the source does not hold it.
    pub fn move_task(
        &mut self,
        text: &str,
        from: impl CalendarDay,
        to: impl CalendarDay,
    ) -> StoreResult<bool> {
        let task = normalize_task_text(text);
        let from = from.calendar_day();
        let to = to.calendar_day();

        let mut next = self.book.clone();
        let removed = next
            .get_mut(from)
            .map(|record| record.remove(&task))
            .unwrap_or(false);
        if !removed {
            return Ok(false);
        }
        next.entry(to).bring_to_front(task);

        self.commit(next, StoreChange::new(StoreChangeKind::TaskMoved, [from, to]))?;
        info!("event=task_move module=store status=ok from={from} to={to}");
        Ok(true)
    }

    /// Moves `text` from `day` to the following day.
    pub fn move_task_to_next_day(&mut self, text: &str, day: impl CalendarDay) -> StoreResult<bool> {
        let day = day.calendar_day();
        let next_day = shift_day(day, 1).ok_or(StoreError::DateOutOfRange(day))?;
        self.move_task(text, day, next_day)
    }

    /// Upserts a whole record, replacing any record for the same day.
    ///
    /// Task texts are normalized on the way in.
    pub fn insert(&mut self, record: DayRecord) -> StoreResult<()> {
        let record = DayRecord::with_tasks(record.date, &record.tasks);
        if self.book.get(record.date) == Some(&record) {
            return Ok(());
        }
        let day = record.date;

        let mut next = self.book.clone();
        next.upsert(record);

        self.commit(next, StoreChange::new(StoreChangeKind::DayInserted, [day]))?;
        debug!("event=day_insert module=store status=ok day={day}");
        Ok(())
    }

    /// Deletes the record for `day`. Returns `Ok(false)` when absent.
    pub fn delete_day(&mut self, day: impl CalendarDay) -> StoreResult<bool> {
        let day = day.calendar_day();
        let mut next = self.book.clone();
        if next.remove(day).is_none() {
            return Ok(false);
        }

        self.commit(next, StoreChange::new(StoreChangeKind::DayDeleted, [day]))?;
        info!("event=day_delete module=store status=ok day={day}");
        Ok(true)
    }

    /// Registers a listener called after every successful change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StoreChange) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Copy of the current book for multi-step staged mutations.
    pub(crate) fn staged(&self) -> DayBook {
        self.book.clone()
    }

    /// Persists a staged book, swaps it in, then notifies subscribers.
    pub(crate) fn commit(&mut self, next: DayBook, change: StoreChange) -> StoreResult<()> {
        self.persist(next)?;
        self.publish(&change);
        Ok(())
    }

    fn persist(&mut self, next: DayBook) -> StoreResult<()> {
        if let Err(err) = self.repo.save_days(next.records()) {
            error!(
                "event=store_save module=store status=error error_code=save_failed error={}",
                err
            );
            return Err(err.into());
        }
        self.book = next;
        Ok(())
    }

    fn publish(&mut self, change: &StoreChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
    }

    fn tasks_len(&self, day: NaiveDate) -> usize {
        self.book.get(day).map_or(0, |record| record.tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreChange, StoreChangeKind, StoreError, TaskStore};
    use crate::model::day_record::DayRecord;
    use crate::repo::day_repo::MemoryDayRepository;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn store() -> TaskStore<MemoryDayRepository> {
        TaskStore::open_at(MemoryDayRepository::new(), jan(1)).unwrap()
    }

    #[test]
    fn open_seeds_today_on_empty_storage() {
        let store = store();
        assert_eq!(store.list_days(), &[DayRecord::new(jan(1))]);
        assert_eq!(store.repository().save_count(), 1);
    }

    #[test]
    fn add_task_rejects_blank_text() {
        let mut store = store();
        let err = store.add_task(" - ", jan(5)).unwrap_err();
        assert!(matches!(err, StoreError::EmptyTask));
    }

    #[test]
    fn failed_save_leaves_memory_unchanged() {
        let mut store = store();
        store.add_task("keep", jan(5)).unwrap();
        store.repository_mut().set_fail_writes(true);

        let err = store.add_task("lost", jan(5)).unwrap_err();
        assert!(matches!(err, StoreError::Repo(_)));
        assert_eq!(store.tasks_for(jan(5)), vec!["keep"]);
        assert!(!store.delete_day(jan(9)).unwrap());
    }

    #[test]
    fn subscribers_see_changes_but_not_no_ops() {
        let mut store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        store.add_task("a", jan(5)).unwrap();
        store.add_task("a", jan(5)).unwrap();
        store.move_task("a", jan(5), jan(6)).unwrap();
        assert!(store.unsubscribe(id));
        store.delete_task("a", jan(6)).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                StoreChange::new(StoreChangeKind::TaskAdded, [jan(5)]),
                StoreChange::new(StoreChangeKind::TaskMoved, [jan(6), jan(5)]),
            ]
        );
    }

    #[test]
    fn insert_is_skipped_when_record_is_identical() {
        let mut store = store();
        store.insert(DayRecord::with_tasks(jan(3), ["x"])).unwrap();
        let saves = store.repository().save_count();

        store.insert(DayRecord::with_tasks(jan(3), ["- x"])).unwrap();
        assert_eq!(store.repository().save_count(), saves);
    }
}
