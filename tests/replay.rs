//! End-to-end replay tests
//!
//! Real sleeps are used throughout, so timing assertions only bound
//! elapsed time from below plus a generous scheduling tolerance.

mod common;

use std::time::{Duration, Instant};

use keyreplay::backend::{KeyAction, RecordingBackend};
use keyreplay::scheduler::{RunEnd, TimingScheduler};
use keyreplay::session::replay_file;
use keyreplay::{
    CancelToken, InjectableKey, NamedKey, Outcome, ReplayOptions, ReplaySession, SessionState,
};

use common::{sequence, sequence_file, CancellingBackend};

/// Upper bound on scheduling overhead for short test sequences
const TOLERANCE: Duration = Duration::from_millis(250);

fn lit(c: char) -> InjectableKey {
    InjectableKey::Literal(c)
}

// ========================================================================
// Ordering and timing
// ========================================================================

#[test]
fn test_two_key_example_order_and_gaps() {
    let file = sequence_file("key|dwell|flight\na|40|0\nb|35|60\n");
    let mut backend = RecordingBackend::new();
    let start = Instant::now();
    let report = replay_file(
        file.path(),
        ReplayOptions::default(),
        CancelToken::new(),
        &mut backend,
    );
    let total = start.elapsed();

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(
        backend.actions(),
        vec![
            (KeyAction::Down, lit('a')),
            (KeyAction::Up, lit('a')),
            (KeyAction::Down, lit('b')),
            (KeyAction::Up, lit('b')),
        ]
    );

    let calls = backend.calls();
    let dwell_a = calls[1].at - calls[0].at;
    let flight_b = calls[2].at - calls[1].at;
    let dwell_b = calls[3].at - calls[2].at;
    assert!(dwell_a >= Duration::from_millis(40), "dwell a {:?}", dwell_a);
    assert!(flight_b >= Duration::from_millis(60), "flight b {:?}", flight_b);
    assert!(dwell_b >= Duration::from_millis(35), "dwell b {:?}", dwell_b);

    assert!(total >= Duration::from_millis(135));
    assert!(total < Duration::from_millis(135) + TOLERANCE, "took {:?}", total);
}

#[test]
fn test_measurement_only_elapsed_bounds() {
    let seq = sequence(&[
        ("a", 20, 0),
        ("b", 15, 25),
        ("{Enter}", 10, 30),
        ("c", 5, 15),
    ]);
    let planned = seq.planned_duration();
    assert_eq!(planned, Duration::from_millis(120));

    let mut scheduler =
        TimingScheduler::new(RecordingBackend::new(), CancelToken::new()).measurement_only(true);
    let summary = scheduler.run(&seq);

    assert_eq!(summary.end, RunEnd::Finished);
    assert_eq!(summary.dispatched, 4);
    assert!(scheduler.backend().calls().is_empty());
    assert!(summary.elapsed >= planned);
    assert!(summary.elapsed < planned + TOLERANCE, "took {:?}", summary.elapsed);
}

#[test]
fn test_every_pressed_key_is_released() {
    let seq = sequence(&[("shift", 5, 0), ("x", 5, 2), ("shift", 5, 2), ("{Bad}", 5, 2)]);
    let mut scheduler = TimingScheduler::new(RecordingBackend::new(), CancelToken::new());
    scheduler.run(&seq);
    assert!(scheduler.backend().held_keys().is_empty());
}

// ========================================================================
// Cancellation
// ========================================================================

#[test]
fn test_cancel_before_event_stops_dispatch() {
    // Abort raised right after event 1 is released, i.e. during the wait before event 2
    let cancel = CancelToken::new();
    let mut backend = CancellingBackend::new(cancel.clone(), 2);
    let seq = sequence(&[("a", 1, 0), ("b", 1, 5), ("c", 1, 5), ("d", 1, 5)]);

    let mut session = ReplaySession::new(ReplayOptions::default(), cancel);
    session.load_text(&keyreplay::sequence::write_sequence(&seq)).unwrap();
    let report = session.run(&mut backend);

    assert_eq!(session.state(), SessionState::Aborted);
    assert_eq!(report.outcome, Outcome::Aborted { at_index: 2 });
    assert_eq!(report.processed, 2);
    assert_eq!(report.dispatched, 2);
    assert_eq!(report.last_completed, Some(1));
    assert_eq!(
        backend.actions(),
        vec![
            (KeyAction::Down, lit('a')),
            (KeyAction::Up, lit('a')),
            (KeyAction::Down, lit('b')),
            (KeyAction::Up, lit('b')),
        ]
    );
}

#[test]
fn test_cancel_during_long_flight_is_prompt() {
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let seq = sequence(&[("a", 1, 0), ("b", 1, 10_000)]);

    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        remote.cancel();
    });

    let mut scheduler = TimingScheduler::new(RecordingBackend::new(), cancel);
    let start = Instant::now();
    let summary = scheduler.run(&seq);
    handle.join().unwrap();

    assert_eq!(summary.end, RunEnd::Cancelled { at_index: 1 });
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(scheduler.backend().calls().len(), 2);
}

#[test]
fn test_cancel_never_interrupts_dwell() {
    // Cancel lands while 'a' is held; it must still be released
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let seq = sequence(&[("a", 80, 0), ("b", 1, 0)]);

    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        remote.cancel();
    });

    let mut scheduler = TimingScheduler::new(RecordingBackend::new(), cancel);
    let summary = scheduler.run(&seq);
    handle.join().unwrap();

    assert_eq!(summary.end, RunEnd::Cancelled { at_index: 1 });
    assert_eq!(
        scheduler.backend().actions(),
        vec![(KeyAction::Down, lit('a')), (KeyAction::Up, lit('a'))]
    );
    assert!(scheduler.backend().held_keys().is_empty());
}

// ========================================================================
// Fatal injection errors
// ========================================================================

#[test]
fn test_key_up_failure_is_fatal() {
    let seq = sequence(&[("a", 1, 0), ("{Tab}", 1, 0), ("c", 1, 0), ("d", 1, 0)]);
    let mut scheduler = TimingScheduler::new(
        RecordingBackend::failing_on(KeyAction::Up, 1),
        CancelToken::new(),
    );
    let summary = scheduler.run(&seq);

    match &summary.end {
        RunEnd::Failed {
            at_index,
            action,
            key,
            ..
        } => {
            assert_eq!(*at_index, 1);
            assert_eq!(*action, KeyAction::Up);
            assert_eq!(*key, InjectableKey::Named(NamedKey::Tab));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    // Nothing after event 1 was attempted
    let keys: Vec<InjectableKey> = scheduler.backend().calls().iter().map(|c| c.key).collect();
    assert!(!keys.contains(&lit('c')));
    assert!(!keys.contains(&lit('d')));
}

#[test]
fn test_failed_session_references_index() {
    let file = sequence_file("key|dwell|flight\na|1|0\nb|1|0\nc|1|0\n");
    let report = replay_file(
        file.path(),
        ReplayOptions::default(),
        CancelToken::new(),
        RecordingBackend::failing_on(KeyAction::Down, 2),
    );
    assert!(matches!(
        report.outcome,
        Outcome::Failed {
            at_index: Some(2),
            ..
        }
    ));
    assert_eq!(report.processed, 2);
    assert_eq!(report.exit_code(), 1);
    assert!(report.to_string().starts_with("Replay failed at event 3 of 3 (last completed: event 2)"));
    assert_eq!(report.last_completed, Some(1));
}

// ========================================================================
// Load failures
// ========================================================================

#[test]
fn test_bad_header_never_runs() {
    let file = sequence_file("dwell|flight|key\na|1|0\n");
    let mut backend = RecordingBackend::new();
    let report = replay_file(
        file.path(),
        ReplayOptions::default(),
        CancelToken::new(),
        &mut backend,
    );
    assert!(matches!(
        report.outcome,
        Outcome::Failed { at_index: None, .. }
    ));
    assert!(backend.calls().is_empty());
}

#[test]
fn test_progress_observer_sees_final_count() {
    let text = {
        let mut text = String::from("key|dwell|flight\n");
        for _ in 0..12 {
            text.push_str("k|0|0\n");
        }
        text
    };
    let mut session = ReplaySession::new(
        ReplayOptions {
            progress_every: 5,
            ..ReplayOptions::default()
        },
        CancelToken::new(),
    );
    session.load_text(&text).unwrap();

    let mut seen = Vec::new();
    let report = session.run_with_progress(RecordingBackend::new(), |p| {
        seen.push((p.processed, p.total))
    });

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(seen, vec![(5, 12), (10, 12), (12, 12)]);
}
