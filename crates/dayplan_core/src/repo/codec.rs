//! Persisted blob codec for the day store.
//!
//! # Responsibility
//! - Encode the full day list into one JSON blob and back.
//!
//! # Invariants
//! - Blob shape is an array of `{ "date": <epoch ms>, "tasks": [..] }`
//!   ordered by date.
//! - `date` is the UTC midnight of the calendar day; decoding floors any
//!   other timestamp to its UTC day.
//! - Decoding merges entries that share a day instead of failing.

use crate::calendar::{day_to_epoch_ms, epoch_ms_to_day};
use crate::model::day_book::DayBook;
use crate::model::day_record::DayRecord;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key the day list blob lives under.
pub const TASKS_STORAGE_KEY: &str = "savedTasks";

#[derive(Debug, Serialize, Deserialize)]
struct BlobEntry {
    date: i64,
    tasks: Vec<String>,
}

#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    /// Timestamp cannot be represented as a calendar day.
    DateOutOfRange(i64),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode day blob: {err}"),
            Self::Decode(err) => write!(f, "failed to decode day blob: {err}"),
            Self::DateOutOfRange(value) => {
                write!(f, "day blob date `{value}` is out of range")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::DateOutOfRange(_) => None,
        }
    }
}

/// Encodes day records into the persisted blob form.
pub fn encode_days(days: &[DayRecord]) -> Result<Vec<u8>, CodecError> {
    let entries: Vec<BlobEntry> = days
        .iter()
        .map(|record| BlobEntry {
            date: day_to_epoch_ms(record.date),
            tasks: record.tasks.clone(),
        })
        .collect();
    serde_json::to_vec(&entries).map_err(CodecError::Encode)
}

/// Decodes a persisted blob into a sorted day book.
pub fn decode_days(bytes: &[u8]) -> Result<DayBook, CodecError> {
    let entries: Vec<BlobEntry> = serde_json::from_slice(bytes).map_err(CodecError::Decode)?;
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let date = epoch_ms_to_day(entry.date).ok_or(CodecError::DateOutOfRange(entry.date))?;
        records.push(DayRecord {
            date,
            tasks: entry.tasks,
        });
    }
    Ok(DayBook::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::{decode_days, encode_days, CodecError};
    use crate::calendar::day_to_epoch_ms;
    use crate::model::day_record::DayRecord;
    use chrono::NaiveDate;

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn blob_round_trip_preserves_dates_and_task_order() {
        let days = vec![
            DayRecord::with_tasks(jan(5), ["b", "a"]),
            DayRecord::new(jan(6)),
            DayRecord::with_tasks(jan(9), ["z"]),
        ];

        let blob = encode_days(&days).unwrap();
        let decoded = decode_days(&blob).unwrap();

        assert_eq!(decoded.records(), days.as_slice());
    }

    #[test]
    fn blob_uses_date_and_tasks_fields() {
        let blob = encode_days(&[DayRecord::with_tasks(jan(5), ["a"])]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&blob).unwrap();

        assert_eq!(value[0]["date"], day_to_epoch_ms(jan(5)));
        assert_eq!(value[0]["tasks"][0], "a");
    }

    #[test]
    fn decode_floors_time_of_day_and_merges_same_day_entries() {
        let noon = day_to_epoch_ms(jan(5)) + 12 * 3_600_000;
        let blob = format!(
            r#"[{{"date":{noon},"tasks":["late"]}},{{"date":{},"tasks":["early","late"]}}]"#,
            day_to_epoch_ms(jan(5))
        );

        let decoded = decode_days(blob.as_bytes()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get(jan(5)).unwrap().tasks, vec!["late", "early"]);
    }

    #[test]
    fn decode_rejects_malformed_blob() {
        let err = decode_days(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
