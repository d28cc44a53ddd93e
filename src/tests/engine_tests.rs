// src/tests/engine_tests.rs

//! tests for `engine.rs`, `config.rs`, and `error.rs`

#![allow(non_snake_case)]

use crate::analysis::classifier::{Category, Classifier, RuleTable};
use crate::analysis::config::{AnalysisConfig, POLL_INTERVAL_DEFAULT, POLL_INTERVAL_MIN, TOP_N_DEFAULT};
use crate::analysis::engine::{AnalysisEngine, EngineState, EngineStatus, TailEvent};
use crate::analysis::error::AnalysisError;
use crate::common::{Compression, FPath, FileOffset, FileTypeArchive};
use crate::data::logline::LogLine;
use crate::debug::helpers::{
    append_to_file,
    create_temp_file,
    create_temp_file_gz,
    create_temp_file_gz_members,
    create_temp_file_with_suffix,
    ntf_fpath,
    rewrite_file,
    tempdir,
    TempDir,
};
use crate::readers::helpers::path_to_fpath;
use crate::tests::common::{
    LINE_CONN_REFUSED_A,
    LINE_CONN_REFUSED_B,
    LINE_SSHD_FAIL,
    LOG_TIMESTAMPED,
    LOG_TIMESTAMPED_LINES,
};
use crate::tests::logsource_tests::gz_truncated;

use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ::crossbeam_channel::Receiver;
use ::more_asserts::assert_ge;
use ::test_case::test_case;

// -------------------------------------------------------------------------------------------------

/// poll quickly so tail tests are fast
const POLL_FAST: Duration = Duration::from_millis(10);

/// longest wait for an expected `TailEvent`
const WAIT_MAX: Duration = Duration::from_secs(10);

fn config_fast() -> AnalysisConfig {
    AnalysisConfig::default().with_poll_interval(POLL_FAST)
}

/// helper to wrap the match and panic checks
fn open_engine(path: &FPath, config: AnalysisConfig) -> AnalysisEngine {
    let engine = AnalysisEngine::new(config);
    if let Err(err) = engine.open(path) {
        panic!("ERROR: AnalysisEngine::open({:?}) failed {}", path, err);
    }
    assert_eq!(engine.status(), EngineStatus::Ready);

    engine
}

/// receive events until one matches `pred`; panic after `WAIT_MAX`
fn wait_for<F>(events: &Receiver<TailEvent>, pred: F) -> TailEvent
where
    F: Fn(&TailEvent) -> bool,
{
    let start = Instant::now();
    loop {
        let remain = WAIT_MAX.saturating_sub(start.elapsed());
        match events.recv_timeout(remain) {
            Ok(event) => {
                eprintln!("wait_for: event {:?}", event);
                if pred(&event) {
                    return event;
                }
            }
            Err(err) => panic!("wait_for: no matching event within {:?}: {}", WAIT_MAX, err),
        }
    }
}

/// the next event, panic after `WAIT_MAX`
fn next_event(events: &Receiver<TailEvent>) -> TailEvent {
    match events.recv_timeout(WAIT_MAX) {
        Ok(event) => event,
        Err(err) => panic!("next_event: no event within {:?}: {}", WAIT_MAX, err),
    }
}

/// all four reports, for comparing whole analyses
type Reports = (
    Vec<(String, u64, String)>,
    [u64; 24],
    Vec<(String, u64, String)>,
    Vec<(Category, u64, Vec<String>)>,
);

fn reports(engine: &AnalysisEngine) -> Reports {
    let frequency = engine
        .frequency_report(usize::MAX)
        .into_iter()
        .map(|entry| (entry.message, entry.count, format!("{:.2}", entry.percentage)))
        .collect();
    let histogram = engine.hour_histogram().buckets;
    let ips = engine
        .ip_report()
        .into_iter()
        .map(|entry| {
            let seen = entry.last_seen_iso8601();
            (entry.address, entry.count, seen)
        })
        .collect();
    let errors = engine
        .error_summary()
        .into_iter()
        .map(|(category, entry)| (category, entry.count, entry.examples))
        .collect();

    (frequency, histogram, ips, errors)
}

fn assert_reports_empty(engine: &AnalysisEngine) {
    assert!(engine.frequency_report(TOP_N_DEFAULT).is_empty());
    assert_eq!(engine.hour_histogram().total(), 0);
    assert!(engine.ip_report().is_empty());
    assert!(engine.error_summary().is_empty());
    assert_eq!(engine.total_lines(), 0);
    assert_eq!(engine.processed_offset(), 0);
}

/// a writable log file in a temporary directory that the test may remove
fn dir_log(data: &str) -> (TempDir, FPath) {
    let dir = tempdir().unwrap();
    let path: FPath = path_to_fpath(&dir.path().join("tail.log"));
    std::fs::write(&path, data).unwrap();

    (dir, path)
}

// -------------------------------------------------------------------------------------------------
// scans

#[test]
fn test_AnalysisEngine_scenario_A() {
    let ntf = create_temp_file(&format!("{}\n", LINE_SSHD_FAIL));
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default());
    assert_eq!(engine.total_lines(), 1);
    assert_eq!(engine.hour_histogram().buckets[10], 1);
    assert_eq!(engine.hour_histogram().total(), 1);
    let ips = engine.ip_report();
    assert_eq!(ips.len(), 1);
    assert_eq!(ips[0].address, "10.0.0.5");
    assert_eq!(ips[0].count, 1);
    let summary = engine.error_summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[&Category::Authentication].count, 1);
    assert_eq!(summary[&Category::Authentication].examples, vec![LINE_SSHD_FAIL]);
    let top = engine.frequency_report(10);
    assert_eq!(top[0].message, "Failed password for root from 10.0.0.5");
}

#[test_case(""; "plain")]
#[test_case(".gz"; "gz")]
fn test_AnalysisEngine_scenario_B_empty(suffix: &str) {
    let ntf = create_temp_file_with_suffix(b"", suffix);
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default());
    assert_reports_empty(&engine);
}

#[test]
fn test_AnalysisEngine_scenario_C_bad_magic() {
    let ntf = create_temp_file_with_suffix(b"plain text in disguise\n", ".gz");
    let engine = AnalysisEngine::default();
    match engine.open(&ntf_fpath(&ntf)) {
        Err(AnalysisError::CorruptArchive(_)) => {}
        other => panic!("expected CorruptArchive, got {:?}", other),
    }
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_reports_empty(&engine);
}

#[test]
fn test_AnalysisEngine_scenario_E() {
    let ntf = create_temp_file(&format!("{}\n{}\n", LINE_CONN_REFUSED_A, LINE_CONN_REFUSED_B));
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default());
    let top = engine.frequency_report(TOP_N_DEFAULT);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].message, "connection refused");
    assert_eq!(top[0].count, 2);
}

#[test]
fn test_AnalysisEngine_truncated_gz_discards() {
    let ntf = create_temp_file_with_suffix(&gz_truncated(), ".gz");
    let engine = AnalysisEngine::default();
    match engine.open(&ntf_fpath(&ntf)) {
        Err(AnalysisError::CorruptArchive(_)) => {}
        other => panic!("expected CorruptArchive, got {:?}", other),
    }
    // no half-populated reports
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_reports_empty(&engine);
    assert_eq!(engine.path(), None);
}

#[test]
fn test_AnalysisEngine_not_found() {
    let (dir, path) = dir_log("");
    std::fs::remove_file(&path).unwrap();
    let engine = AnalysisEngine::default();
    match engine.open(&path) {
        Err(AnalysisError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert_eq!(engine.status(), EngineStatus::Idle);
    drop(dir);
}

#[test]
fn test_AnalysisEngine_failed_open_discards_previous() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default());
    assert_eq!(engine.total_lines(), LOG_TIMESTAMPED_LINES);
    let (_dir, path) = dir_log("");
    std::fs::remove_file(&path).unwrap();
    assert!(engine.open(&path).is_err());
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_reports_empty(&engine);
}

#[test]
fn test_AnalysisEngine_reports_timestamped() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let path = ntf_fpath(&ntf);
    let engine = open_engine(&path, AnalysisConfig::default());
    assert_eq!(engine.path(), Some(path));
    assert_eq!(engine.total_lines(), LOG_TIMESTAMPED_LINES);
    assert_eq!(engine.processed_offset(), LOG_TIMESTAMPED.len() as FileOffset);

    let top = engine.frequency_report(2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].message, "Failed password for root from 10.0.0.5");
    assert_eq!(top[0].count, 2);
    assert_eq!(top[0].percentage, 22.22);
    assert_eq!(top[1].message, "warning low memory");
    assert_eq!(top[1].count, 2);
    let sum: u64 = engine.frequency_report(usize::MAX).iter().map(|e| e.count).sum();
    assert_eq!(sum, LOG_TIMESTAMPED_LINES);

    let hh = engine.hour_histogram();
    assert_eq!(hh.total(), LOG_TIMESTAMPED_LINES);
    assert_eq!(hh.max_bucket, 2);

    let ips = engine.ip_report();
    assert_eq!(ips[0].address, "10.0.0.5");
    assert_eq!(ips[0].count, 3);
    assert_eq!(ips[0].last_seen_iso8601(), "2024-01-05T10:05:00");

    let summary = engine.error_summary();
    let rows: Vec<(Category, u64)> = summary.iter().map(|(c, e)| (*c, e.count)).collect();
    assert_eq!(
        rows,
        vec![
            (Category::System, 1),
            (Category::Authentication, 2),
            (Category::Uncategorized, 2),
        ]
    );
}

#[test]
fn test_AnalysisEngine_round_trip() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let path = ntf_fpath(&ntf);
    let engine = open_engine(&path, AnalysisConfig::default());
    let first = reports(&engine);
    engine.open(&path).unwrap();
    let second = reports(&engine);
    assert_eq!(first, second);
    // a fresh engine agrees
    let engine2 = open_engine(&path, AnalysisConfig::default());
    assert_eq!(first, reports(&engine2));
}

#[test]
fn test_AnalysisEngine_gz_same_as_plain() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let ntf_gz = create_temp_file_gz(LOG_TIMESTAMPED);
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default());
    let engine_gz = open_engine(&ntf_fpath(&ntf_gz), AnalysisConfig::default());
    assert_eq!(reports(&engine), reports(&engine_gz));
    assert_eq!(engine.processed_offset(), engine_gz.processed_offset());
}

#[test]
fn test_AnalysisEngine_search_errors() {
    let engine = AnalysisEngine::default();
    match engine.search_errors() {
        Err(AnalysisError::InvalidState { operation: "search errors", state: EngineStatus::Idle }) => {}
        other => panic!("expected InvalidState, got {:?}", other),
    }
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default());
    assert_eq!(engine.search_errors().unwrap().len(), 5);
}

// -------------------------------------------------------------------------------------------------
// state machine

#[test]
fn test_AnalysisEngine_start_tail_idle() {
    let engine = AnalysisEngine::default();
    match engine.start_tail() {
        Err(AnalysisError::InvalidState { operation: "start tail", state: EngineStatus::Idle }) => {}
        other => panic!("expected InvalidState, got {:?}", other),
    }
    assert_eq!(engine.status(), EngineStatus::Idle);
}

#[test]
fn test_AnalysisEngine_stop_tail_not_tailing() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default());
    match engine.stop_tail() {
        Err(AnalysisError::InvalidState { operation: "stop tail", state: EngineStatus::Ready }) => {}
        other => panic!("expected InvalidState, got {:?}", other),
    }
    assert_eq!(engine.status(), EngineStatus::Ready);
}

#[test]
fn test_AnalysisEngine_start_tail_twice() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let engine = open_engine(&ntf_fpath(&ntf), config_fast());
    engine.start_tail().unwrap();
    match engine.start_tail() {
        Err(AnalysisError::InvalidState { state: EngineStatus::Tailing, .. }) => {}
        other => panic!("expected InvalidState, got {:?}", other),
    }
    engine.stop_tail().unwrap();
    assert_eq!(engine.status(), EngineStatus::Ready);
}

#[test]
fn test_AnalysisEngine_start_tail_file_removed() {
    let (_dir, path) = dir_log(LOG_TIMESTAMPED);
    let engine = open_engine(&path, config_fast());
    std::fs::remove_file(&path).unwrap();
    match engine.start_tail() {
        Err(AnalysisError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
    // reports of the scan remain
    assert_eq!(engine.status(), EngineStatus::Ready);
    assert_eq!(engine.total_lines(), LOG_TIMESTAMPED_LINES);
}

#[test]
fn test_AnalysisEngine_close() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let engine = open_engine(&ntf_fpath(&ntf), config_fast());
    engine.start_tail().unwrap();
    engine.close();
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_eq!(engine.path(), None);
    assert_reports_empty(&engine);
    // close is allowed in any state
    engine.close();
    assert_eq!(engine.status(), EngineStatus::Idle);
}

// -------------------------------------------------------------------------------------------------
// tailing

#[test]
fn test_AnalysisEngine_tail_append() {
    let (_dir, path) = dir_log("2024-01-05 08:00:00 host a[1]: one\n");
    let engine = open_engine(&path, config_fast());
    let offset0 = engine.processed_offset();
    let events = engine.subscribe();
    engine.start_tail().unwrap();
    assert_eq!(engine.status(), EngineStatus::Tailing);

    // a partial line is left for a later poll
    let line2 = "2024-01-05 09:00:00 host a[1]: two\n";
    append_to_file(&path, &format!("{}2024-01-05 10:00:00 host a[1]: thr", line2));
    let event = next_event(&events);
    let offset1 = offset0 + line2.len() as FileOffset;
    assert_eq!(event, TailEvent::Appended { lines: 1, offset: offset1 });
    assert_eq!(engine.total_lines(), 2);
    assert_eq!(engine.hour_histogram().buckets[10], 0);

    append_to_file(&path, "ee from 10.1.1.1\n");
    let event = next_event(&events);
    match event {
        TailEvent::Appended { lines: 1, offset } => assert_eq!(offset, engine.processed_offset()),
        other => panic!("expected Appended, got {:?}", other),
    }
    assert_eq!(engine.total_lines(), 3);
    assert_eq!(engine.hour_histogram().buckets[10], 1);
    assert_eq!(engine.frequency_report(10).len(), 3);
    assert_eq!(engine.ip_report()[0].address, "10.1.1.1");
    assert_eq!(engine.ip_report()[0].last_seen_iso8601(), "2024-01-05T10:00:00");

    engine.stop_tail().unwrap();
    assert_eq!(wait_for(&events, |e| *e == TailEvent::Stopped), TailEvent::Stopped);
    assert_eq!(engine.status(), EngineStatus::Ready);
    // aggregates survive stop
    assert_eq!(engine.total_lines(), 3);
}

#[test]
fn test_AnalysisEngine_tail_completes_partial_last_line() {
    let line1 = "2024-01-05 08:00:00 host a[1]: one\n";
    let (_dir, path) = dir_log(&format!("{}2024-01-05 10:00:00 host a[1]: thr", line1));
    let engine = open_engine(&path, config_fast());
    // a full scan counts the unterminated last line
    assert_eq!(engine.total_lines(), 2);
    let events = engine.subscribe();
    engine.start_tail().unwrap();

    // still unterminated; nothing changes
    append_to_file(&path, "ee");
    std::thread::sleep(POLL_FAST * 10);
    assert!(events.try_iter().next().is_none());
    assert_eq!(engine.total_lines(), 2);
    assert_eq!(engine.frequency_report(10)[1].message, "thr");

    append_to_file(&path, " from 10.1.1.1\n");
    let event = wait_for(&events, |e| matches!(e, TailEvent::Appended { .. }));
    let size: FileOffset = std::fs::metadata(&path).unwrap().len();
    assert_eq!(event, TailEvent::Appended { lines: 1, offset: size });
    // the completed line replaced the partial one
    assert_eq!(engine.total_lines(), 2);
    assert_eq!(engine.processed_offset(), size);
    let messages: Vec<String> = engine
        .frequency_report(10)
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(messages, vec!["one", "three from 10.1.1.1"]);
    assert_eq!(engine.hour_histogram().buckets[10], 1);
    assert_eq!(engine.hour_histogram().total(), 2);
    let ips = engine.ip_report();
    assert_eq!(ips.len(), 1);
    assert_eq!(ips[0].count, 1);
    assert_eq!(ips[0].last_seen_iso8601(), "2024-01-05T10:00:00");
    engine.stop_tail().unwrap();
}

#[test]
fn test_AnalysisEngine_tail_gz_members_unchanged() {
    let ntf = create_temp_file_gz_members(&[
        "2024-01-05 08:00:00 host a[1]: one\n",
        "2024-01-05 09:00:00 host a[1]: two\n",
    ]);
    let engine = open_engine(&ntf_fpath(&ntf), config_fast());
    assert_eq!(engine.total_lines(), 2);
    let offset = engine.processed_offset();
    let events = engine.subscribe();
    engine.start_tail().unwrap();
    std::thread::sleep(POLL_FAST * 30);
    engine.stop_tail().unwrap();

    // no poll saw a change of an unchanged file
    let events: Vec<TailEvent> = events.try_iter().collect();
    assert_eq!(events, vec![TailEvent::Stopped]);
    assert_eq!(engine.total_lines(), 2);
    assert_eq!(engine.processed_offset(), offset);
    assert_eq!(engine.hour_histogram().total(), 2);
}

#[test]
fn test_AnalysisEngine_tail_scenario_D_truncation() {
    let (_dir, path) = dir_log(LOG_TIMESTAMPED);
    let engine = open_engine(&path, config_fast());
    let before = engine.hour_histogram();
    let events = engine.subscribe();
    engine.start_tail().unwrap();

    let line_new = "2024-01-05 11:00:00 host a[1]: after rotation\n";
    rewrite_file(&path, line_new);
    let event = wait_for(&events, |e| matches!(e, TailEvent::Truncated { .. }));
    assert_eq!(
        event,
        TailEvent::Truncated { previous_offset: LOG_TIMESTAMPED.len() as FileOffset }
    );
    let event = wait_for(&events, |e| matches!(e, TailEvent::Appended { .. }));
    assert_eq!(event, TailEvent::Appended { lines: 1, offset: line_new.len() as FileOffset });

    // aggregators were not cleared
    let after = engine.hour_histogram();
    assert_eq!(after.total(), before.total() + 1);
    assert_eq!(after.buckets[11], before.buckets[11] + 1);
    assert_eq!(engine.total_lines(), LOG_TIMESTAMPED_LINES + 1);
    assert_eq!(engine.processed_offset(), line_new.len() as FileOffset);
    engine.stop_tail().unwrap();
}

#[test]
fn test_AnalysisEngine_tail_poll_failed_continues() {
    let (dir, path) = dir_log(LOG_TIMESTAMPED);
    let engine = open_engine(&path, config_fast());
    let events = engine.subscribe();
    engine.start_tail().unwrap();
    assert_eq!(engine.last_tail_error(), None);

    std::fs::remove_file(&path).unwrap();
    let event = wait_for(&events, |e| matches!(e, TailEvent::PollFailed(_)));
    match event {
        TailEvent::PollFailed(AnalysisError::TailPollFailed(_)) => {}
        other => panic!("expected PollFailed(TailPollFailed), got {:?}", other),
    }
    assert_ge!(engine.tail_poll_failures(), 1);
    match engine.last_tail_error() {
        Some(err) => assert!(err.is_transient()),
        None => panic!("expected last_tail_error"),
    }
    // still tailing
    assert_eq!(engine.status(), EngineStatus::Tailing);

    // the file comes back larger; polling recovers
    // written aside then renamed so no poll sees a partial file
    let line_new = "2024-01-05 12:00:00 host a[1]: back\n";
    let staging = dir.path().join("staging");
    std::fs::write(&staging, format!("{}{}", LOG_TIMESTAMPED, line_new)).unwrap();
    std::fs::rename(&staging, &path).unwrap();
    let event = wait_for(&events, |e| matches!(e, TailEvent::Appended { .. }));
    assert_eq!(
        event,
        TailEvent::Appended {
            lines: 1,
            offset: (LOG_TIMESTAMPED.len() + line_new.len()) as FileOffset
        }
    );
    engine.stop_tail().unwrap();
}

#[test]
fn test_AnalysisEngine_stop_tail_other_thread() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    // a slow poll; stop must not wait for it
    let config = AnalysisConfig::default().with_poll_interval(Duration::from_secs(60));
    let engine = Arc::new(open_engine(&ntf_fpath(&ntf), config));
    let events = engine.subscribe();
    engine.start_tail().unwrap();

    let engine2 = Arc::clone(&engine);
    let start = Instant::now();
    let handle = std::thread::spawn(move || engine2.stop_tail());
    handle.join().unwrap().unwrap();
    assert!(start.elapsed() < Duration::from_secs(30), "stop_tail waited for the poll interval");
    assert_eq!(next_event(&events), TailEvent::Stopped);
    assert_eq!(engine.status(), EngineStatus::Ready);
}

#[test]
fn test_AnalysisEngine_close_other_thread() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let engine = Arc::new(open_engine(&ntf_fpath(&ntf), config_fast()));
    let events = engine.subscribe();
    engine.start_tail().unwrap();

    let engine2 = Arc::clone(&engine);
    std::thread::spawn(move || engine2.close()).join().unwrap();
    assert_eq!(wait_for(&events, |e| *e == TailEvent::Stopped), TailEvent::Stopped);
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_reports_empty(&engine);
}

#[test]
fn test_AnalysisEngine_open_while_tailing() {
    let ntf1 = create_temp_file(LOG_TIMESTAMPED);
    let ntf2 = create_temp_file(&format!("{}\n", LINE_SSHD_FAIL));
    let engine = open_engine(&ntf_fpath(&ntf1), config_fast());
    let events = engine.subscribe();
    engine.start_tail().unwrap();

    engine.open(&ntf_fpath(&ntf2)).unwrap();
    assert_eq!(wait_for(&events, |e| *e == TailEvent::Stopped), TailEvent::Stopped);
    assert_eq!(engine.status(), EngineStatus::Ready);
    assert_eq!(engine.total_lines(), 1);
    assert_eq!(engine.path(), Some(ntf_fpath(&ntf2)));
}

#[test]
fn test_AnalysisEngine_subscriber_dropped() {
    let (_dir, path) = dir_log("");
    let engine = open_engine(&path, config_fast());
    let events_dropped = engine.subscribe();
    drop(events_dropped);
    let events = engine.subscribe();
    engine.start_tail().unwrap();
    append_to_file(&path, "a line\n");
    assert_eq!(next_event(&events), TailEvent::Appended { lines: 1, offset: 7 });
    engine.stop_tail().unwrap();
}

// -------------------------------------------------------------------------------------------------
// EngineState, AnalysisConfig, AnalysisError

#[test]
fn test_EngineState_observe() {
    let rules = RuleTable::default();
    let classifier = Classifier::new(&rules);
    let mut state = EngineState::new();
    let raw = String::from(LINE_SSHD_FAIL);
    let len = raw.len() as u64 + 1;
    let line = LogLine::new(raw, 100, len);
    state.observe(&line, &classifier);
    assert_eq!(state.lines(), 1);
    assert_eq!(state.offset(), 100 + len);
    assert_eq!(state.frequency.total_observed(), 1);
    assert_eq!(state.histogram.snapshot().buckets[10], 1);
    assert_eq!(state.ipregistry.len(), 1);
    assert_eq!(state.errorsummary.total(), 1);
}

#[test]
fn test_EngineState_rewind_partial_line() {
    let rules = RuleTable::default();
    let classifier = Classifier::new(&rules);
    let mut state = EngineState::new();
    let raw1 = String::from(LINE_SSHD_FAIL);
    let len1 = raw1.len() as u64 + 1;
    state.observe(&LogLine::new(raw1, 0, len1), &classifier);
    assert_eq!(state.partial_line_offset(), None);
    assert!(!state.clone().rewind_partial_line());

    let raw2 = String::from("kernel: usb error at 10.0.0.9");
    let len2 = raw2.len() as u64;
    state.observe(&LogLine::new_unterminated(raw2, len1, len2), &classifier);
    assert_eq!(state.lines(), 2);
    assert_eq!(state.offset(), len1 + len2);
    assert_eq!(state.partial_line_offset(), Some(len1));
    assert_eq!(state.ipregistry.len(), 2);

    assert!(state.rewind_partial_line());
    assert_eq!(state.lines(), 1);
    assert_eq!(state.offset(), len1);
    assert_eq!(state.ipregistry.len(), 1);
    assert_eq!(state.frequency.total_observed(), 1);
    assert_eq!(state.errorsummary.total(), 1);
    assert_eq!(state.partial_line_offset(), None);
}

#[test]
fn test_AnalysisEngine_top_messages() {
    let ntf = create_temp_file(LOG_TIMESTAMPED);
    let engine = open_engine(&ntf_fpath(&ntf), AnalysisConfig::default().with_top_n(2));
    let top = engine.top_messages();
    assert_eq!(top.len(), 2);
    assert_eq!(top, engine.frequency_report(2));
    assert_eq!(top[0].message, "Failed password for root from 10.0.0.5");
}

#[test]
fn test_AnalysisConfig() {
    let config = AnalysisConfig::default();
    assert_eq!(config.poll_interval, POLL_INTERVAL_DEFAULT);
    assert_eq!(config.compression, Compression::Infer);
    assert_eq!(config.top_n, TOP_N_DEFAULT);
    let config = config
        .with_poll_interval(Duration::from_millis(1))
        .with_compression(Compression::Gzip)
        .with_top_n(5);
    assert_eq!(config.poll_interval, POLL_INTERVAL_MIN);
    assert_eq!(config.compression, Compression::Gzip);
    assert_eq!(config.top_n, 5);
}

#[test_case(ErrorKind::NotFound, FileTypeArchive::Normal, "NotFound")]
#[test_case(ErrorKind::PermissionDenied, FileTypeArchive::Gz, "PermissionDenied")]
#[test_case(ErrorKind::InvalidData, FileTypeArchive::Gz, "CorruptArchive")]
#[test_case(ErrorKind::UnexpectedEof, FileTypeArchive::Lz4, "CorruptArchive"; "eof lz4")]
#[test_case(ErrorKind::InvalidData, FileTypeArchive::Normal, "Io"; "invalid plain")]
#[test_case(ErrorKind::Other, FileTypeArchive::Bz2, "Io")]
fn test_AnalysisError_from_open(kind: ErrorKind, archive: FileTypeArchive, expect: &str) {
    let err = AnalysisError::from_open(&Error::new(kind, "x"), archive);
    let name = format!("{:?}", err);
    assert!(name.starts_with(expect), "{:?} is not {}", err, expect);
}

#[test_case(ErrorKind::InvalidInput, FileTypeArchive::Gz, "CorruptArchive")]
#[test_case(ErrorKind::InvalidData, FileTypeArchive::Normal, "ScanFailed")]
#[test_case(ErrorKind::Other, FileTypeArchive::Gz, "ScanFailed")]
fn test_AnalysisError_from_scan(kind: ErrorKind, archive: FileTypeArchive, expect: &str) {
    let err = AnalysisError::from_scan(&Error::new(kind, "x"), archive);
    let name = format!("{:?}", err);
    assert!(name.starts_with(expect), "{:?} is not {}", err, expect);
}

#[test]
fn test_AnalysisError_display() {
    let err = AnalysisError::InvalidState {
        operation: "start tail",
        state: EngineStatus::Scanning,
    };
    assert_eq!(err.to_string(), "cannot start tail while engine is Scanning");
    assert!(!err.is_transient());
    let err = AnalysisError::from_tail(&Error::new(ErrorKind::Other, "gone"));
    assert_eq!(err.to_string(), "tail poll failed: gone");
    assert!(err.is_transient());
}
