//! Date-keyed collection of day records.
//!
//! # Responsibility
//! - Keep day records sorted by date with one record per calendar day.
//! - Offer get-or-create access used by store mutations.
//!
//! # Invariants
//! - `records` is strictly ascending by `date`.

use super::day_record::DayRecord;
use crate::calendar::CalendarDay;
use chrono::NaiveDate;

/// Sorted, de-duplicated set of day records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayBook {
    records: Vec<DayRecord>,
}

impl DayBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from records in any order.
    ///
    /// Records sharing a day are merged: the first one keeps its task order
    /// and later ones contribute only tasks it does not already hold.
    pub fn from_records(records: impl IntoIterator<Item = DayRecord>) -> Self {
        let mut book = Self::new();
        for record in records {
            match book.position(record.date) {
                Ok(index) => {
                    let target = &mut book.records[index];
                    for task in record.tasks {
                        if !target.contains(&task) {
                            target.tasks.push(task);
                        }
                    }
                }
                Err(index) => book.records.insert(index, record),
            }
        }
        book
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DayRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, day: impl CalendarDay) -> Option<&DayRecord> {
        self.position(day.calendar_day())
            .ok()
            .map(|index| &self.records[index])
    }

    pub fn get_mut(&mut self, day: impl CalendarDay) -> Option<&mut DayRecord> {
        match self.position(day.calendar_day()) {
            Ok(index) => Some(&mut self.records[index]),
            Err(_) => None,
        }
    }

    pub fn contains_day(&self, day: impl CalendarDay) -> bool {
        self.position(day.calendar_day()).is_ok()
    }

    /// Returns the record for `day`, creating an empty one when absent.
    pub fn entry(&mut self, day: impl CalendarDay) -> &mut DayRecord {
        let day = day.calendar_day();
        let index = match self.position(day) {
            Ok(index) => index,
            Err(index) => {
                self.records.insert(index, DayRecord::new(day));
                index
            }
        };
        &mut self.records[index]
    }

    /// Replaces the record with the same day, or inserts it in order.
    pub fn upsert(&mut self, record: DayRecord) {
        match self.position(record.date) {
            Ok(index) => self.records[index] = record,
            Err(index) => self.records.insert(index, record),
        }
    }

    pub fn remove(&mut self, day: impl CalendarDay) -> Option<DayRecord> {
        match self.position(day.calendar_day()) {
            Ok(index) => Some(self.records.remove(index)),
            Err(_) => None,
        }
    }

    /// Days strictly before `day`, oldest first.
    pub fn days_before(&self, day: NaiveDate) -> Vec<NaiveDate> {
        self.records
            .iter()
            .take_while(|record| record.date < day)
            .map(|record| record.date)
            .collect()
    }

    fn position(&self, day: NaiveDate) -> Result<usize, usize> {
        self.records
            .binary_search_by(|record| record.date.cmp(&day))
    }
}

#[cfg(test)]
mod tests {
    use super::DayBook;
    use crate::model::day_record::DayRecord;
    use chrono::NaiveDate;

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn from_records_sorts_and_merges_same_day() {
        let book = DayBook::from_records([
            DayRecord::with_tasks(jan(7), ["x"]),
            DayRecord::with_tasks(jan(5), ["a", "b"]),
            DayRecord::with_tasks(jan(5), ["b", "c"]),
        ]);

        let dates: Vec<_> = book.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![jan(5), jan(7)]);
        assert_eq!(book.get(jan(5)).unwrap().tasks, vec!["a", "b", "c"]);
    }

    #[test]
    fn entry_creates_missing_day_in_order() {
        let mut book = DayBook::from_records([DayRecord::new(jan(3)), DayRecord::new(jan(9))]);
        book.entry(jan(6)).prepend("mid".to_string());

        let dates: Vec<_> = book.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![jan(3), jan(6), jan(9)]);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn days_before_is_exclusive() {
        let book = DayBook::from_records([
            DayRecord::new(jan(1)),
            DayRecord::new(jan(4)),
            DayRecord::new(jan(5)),
        ]);
        assert_eq!(book.days_before(jan(5)), vec![jan(1), jan(4)]);
    }
}
