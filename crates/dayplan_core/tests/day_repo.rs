use chrono::NaiveDate;
use dayplan_core::db::open_db_in_memory;
use dayplan_core::{
    decode_days, encode_days, DayRecord, DayRepository, RepoError, SqliteDayRepository,
    TASKS_STORAGE_KEY,
};

fn jan(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn sample_days() -> Vec<DayRecord> {
    vec![
        DayRecord::with_tasks(jan(5), ["b", "a"]),
        DayRecord::new(jan(6)),
        DayRecord::with_tasks(jan(12), ["dentist", "pay rent"]),
    ]
}

#[test]
fn missing_blob_loads_empty() {
    let repo = SqliteDayRepository::open_in_memory().unwrap();
    assert!(repo.load_days().unwrap().is_empty());
}

#[test]
fn save_then_load_round_trips_through_sqlite() {
    let mut repo = SqliteDayRepository::open_in_memory().unwrap();
    let days = sample_days();

    repo.save_days(&days).unwrap();
    let loaded = repo.load_days().unwrap();

    assert_eq!(loaded.records(), days.as_slice());
}

#[test]
fn save_overwrites_previous_blob_under_one_key() {
    let mut repo = SqliteDayRepository::open_in_memory().unwrap();
    repo.save_days(&sample_days()).unwrap();
    repo.save_days(&[DayRecord::with_tasks(jan(20), ["only"])]).unwrap();

    let rows: i64 = repo
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    let key: String = repo
        .connection()
        .query_row("SELECT key FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(key, TASKS_STORAGE_KEY);

    let loaded = repo.load_days().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get(jan(20)).unwrap().tasks, vec!["only"]);
}

#[test]
fn custom_keys_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDayRepository::with_key(conn, "profile-a");
    repo.save_days(&sample_days()).unwrap();

    let blob: Vec<u8> = repo
        .connection()
        .query_row(
            "SELECT value FROM kv_store WHERE key = 'profile-a';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(decode_days(&blob).unwrap().records(), sample_days().as_slice());
}

#[test]
fn corrupted_blob_surfaces_codec_error() {
    let repo = SqliteDayRepository::open_in_memory().unwrap();
    repo.connection()
        .execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2);",
            rusqlite::params![TASKS_STORAGE_KEY, b"not json".to_vec()],
        )
        .unwrap();

    let err = repo.load_days().unwrap_err();
    assert!(matches!(err, RepoError::Codec(_)));
}

#[test]
fn encoded_blob_decodes_to_equal_store() {
    let days = sample_days();
    let blob = encode_days(&days).unwrap();

    let decoded = decode_days(&blob).unwrap();

    assert_eq!(decoded.into_records(), days);
}
