use chrono::{NaiveDate, NaiveDateTime};
use dayplan_core::{
    DayRecord, FeedbackCue, MemoryDayRepository, PlannerConfig, PlannerSession, RolloverScope,
    SqliteDayRepository, WeekAnchor, WEEK_LEN,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn jan(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    jan(d).and_hms_opt(h, m, s).unwrap()
}

type Cues = Arc<Mutex<Vec<FeedbackCue>>>;

fn session_with(
    records: &[DayRecord],
    now: NaiveDateTime,
) -> (PlannerSession<MemoryDayRepository>, Cues) {
    let cues: Cues = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&cues);
    let repo = MemoryDayRepository::with_days(records).unwrap();
    let session = PlannerSession::from_config(
        repo,
        &PlannerConfig::default(),
        Box::new(move |cue: FeedbackCue| sink.lock().unwrap().push(cue)),
        now,
    )
    .unwrap();
    (session, cues)
}

#[test]
fn start_materializes_week_and_selects_today() {
    let (session, cues) = session_with(&[], at(5, 9, 0, 0));

    assert_eq!(session.selected_day(), jan(5));
    assert_eq!(session.week().len(), WEEK_LEN);
    assert_eq!(session.week()[0].date, jan(5));
    assert_eq!(session.tick_interval(), Duration::from_secs(60));
    assert!(cues.lock().unwrap().is_empty());
}

#[test]
fn start_rolls_over_yesterday_left_from_previous_run() {
    let (session, _) = session_with(
        &[DayRecord::with_tasks(jan(4), ["unfinished"])],
        at(5, 8, 0, 0),
    );

    assert!(session.store().day(jan(4)).is_none());
    assert_eq!(session.week()[0].tasks, vec!["unfinished"]);
}

#[test]
fn add_task_targets_selected_day_and_emits_cue() {
    let (mut session, cues) = session_with(&[], at(5, 9, 0, 0));
    session.select_day(jan(7), jan(5));

    assert!(session.add_task("- water plants").unwrap());
    assert!(!session.add_task("water plants").unwrap());
    assert!(!session.add_task("   ").unwrap());

    assert_eq!(session.store().tasks_for(jan(7)), vec!["water plants"]);
    assert_eq!(session.week()[2].tasks, vec!["water plants"]);
    assert_eq!(*cues.lock().unwrap(), vec![FeedbackCue::TaskAdded]);
}

#[test]
fn move_and_delete_refresh_week_and_emit_cues() {
    let (mut session, cues) = session_with(&[], at(5, 9, 0, 0));
    session.add_task("a").unwrap();

    assert!(session.move_task_to_next_day("a", jan(5)).unwrap());
    assert_eq!(session.week()[1].tasks, vec!["a"]);
    assert!(session.delete_task("a", jan(6)).unwrap());
    assert!(session.week()[1].tasks.is_empty());
    assert!(!session.delete_task("a", jan(6)).unwrap());

    assert_eq!(
        *cues.lock().unwrap(),
        vec![
            FeedbackCue::TaskAdded,
            FeedbackCue::TaskMoved,
            FeedbackCue::TaskDeleted
        ]
    );
}

#[test]
fn select_day_toggles_back_to_today() {
    let (mut session, _) = session_with(&[], at(5, 9, 0, 0));

    assert_eq!(session.select_day(jan(8), jan(5)), jan(8));
    assert_eq!(session.distance_from_selected(jan(5)), 3);
    assert_eq!(session.select_day(jan(8), jan(5)), jan(5));
    assert_eq!(session.select_day(jan(9), jan(5)), jan(9));
    assert_eq!(session.select_day(jan(5), jan(5)), jan(5));
}

#[test]
fn tick_after_midnight_rolls_over_and_reselects_today() {
    let (mut session, cues) = session_with(&[], at(5, 23, 58, 0));
    session.add_task("b").unwrap();
    session.add_task("a").unwrap();
    session.select_day(jan(9), jan(5));

    assert!(session.on_tick(at(5, 23, 58, 30)).unwrap().is_none());
    assert!(session.on_tick(at(5, 23, 59, 0)).unwrap().is_none());

    let report = session.on_tick(at(6, 0, 0, 5)).unwrap().unwrap();
    assert_eq!(report.source_days, vec![jan(5)]);
    assert_eq!(report.migrated, 2);
    assert_eq!(session.selected_day(), jan(6));
    assert_eq!(session.week()[0].date, jan(6));
    assert_eq!(session.week()[0].tasks, vec!["b", "a"]);
    assert!(session.store().day(jan(5)).is_none());
    assert_eq!(cues.lock().unwrap().last(), Some(&FeedbackCue::DayChanged));
}

#[test]
fn rollover_after_failed_midnight_write_is_retried() {
    let (mut session, cues) = session_with(&[], at(5, 23, 58, 0));
    session.add_task("a").unwrap();

    session.store_mut().repository_mut().set_fail_writes(true);
    assert!(session.on_tick(at(6, 0, 0, 5)).is_err());
    assert_eq!(session.selected_day(), jan(5));
    assert_eq!(session.store().tasks_for(jan(5)), vec!["a"]);
    assert!(session.store().tasks_for(jan(6)).is_empty());
    assert_ne!(cues.lock().unwrap().last(), Some(&FeedbackCue::DayChanged));

    session.store_mut().repository_mut().set_fail_writes(false);
    let report = session.on_tick(at(6, 0, 1, 10)).unwrap().unwrap();

    assert_eq!(report.source_days, vec![jan(5)]);
    assert!(session.store().day(jan(5)).is_none());
    assert_eq!(session.store().tasks_for(jan(6)), vec!["a"]);
    assert_eq!(session.selected_day(), jan(6));
    assert_eq!(session.week()[0].date, jan(6));
    assert_eq!(cues.lock().unwrap().last(), Some(&FeedbackCue::DayChanged));
}

#[test]
fn selecting_another_day_does_not_trigger_rollover() {
    let (mut session, _) = session_with(&[], at(5, 10, 0, 0));
    session.add_task("stay").unwrap();
    session.select_day(jan(7), jan(5));

    assert!(session.on_foreground(at(5, 15, 0, 0)).unwrap().is_none());
    assert_eq!(session.selected_day(), jan(7));
    assert_eq!(session.store().tasks_for(jan(5)), vec!["stay"]);
}

#[test]
fn foreground_after_days_away_with_all_stale_scope_sweeps_everything() {
    let config = PlannerConfig {
        rollover_scope: RolloverScope::AllStaleDays,
        week_anchor: WeekAnchor::Today,
        ..PlannerConfig::default()
    };
    let repo = SqliteDayRepository::open_in_memory().unwrap();
    let mut session = PlannerSession::from_config(
        repo,
        &config,
        Box::new(dayplan_core::NoopFeedback),
        at(5, 9, 0, 0),
    )
    .unwrap();
    session.add_task("first").unwrap();
    session.add_task_on("second", jan(6)).unwrap();

    let report = session.on_foreground(at(9, 7, 0, 0)).unwrap().unwrap();

    assert_eq!(report.target_day, jan(9));
    assert_eq!(report.source_days, vec![jan(5), jan(6), jan(7), jan(8)]);
    assert_eq!(session.store().tasks_for(jan(9)), vec!["second", "first"]);
    assert_eq!(session.store().list_days().first().map(|d| d.date), Some(jan(9)));
}
