//! End-to-end session scenarios driven by a manual clock.

use workout_tracker::{
    ActivityCategory, IngestOutcome, LocationSample, ManualClock, MemoryRecordStore, RecordStore,
    RejectReason, SessionEngine, SessionError, SessionEvent, StateKind, WorkoutStatistics,
};

const LON: f64 = -0.1278;
const LAT: f64 = 51.5074;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Latitude offset for `meters` due north.
fn north(meters: f64) -> f64 {
    (meters / 6_371_008.8_f64).to_degrees()
}

fn sample_at(meters_north: f64, timestamp: f64, accuracy: f64) -> LocationSample {
    LocationSample::new(LAT + north(meters_north), LON, timestamp, Some(accuracy))
}

fn engine() -> (SessionEngine<ManualClock>, ManualClock) {
    init();
    let clock = ManualClock::new(0.0);
    (SessionEngine::new(clock.clone()), clock)
}

#[test]
fn test_simple_session() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Running).unwrap();

    engine.ingest(sample_at(0.0, 0.0, 5.0)).unwrap();
    clock.set(10.0);
    engine.ingest(sample_at(100.0, 10.0, 5.0)).unwrap();
    engine.finish().unwrap();

    let session = engine.session().unwrap();
    assert!((session.metrics.total_distance_m - 100.0).abs() < 0.01);
    assert!((session.metrics.current_speed_mps - 10.0).abs() < 0.001);
    assert!((session.metrics.average_speed_mps - 10.0).abs() < 0.001);
    assert_eq!(engine.duration().unwrap(), 10.0);

    let record = engine.record().unwrap();
    assert_eq!(record.duration_seconds, 10.0);
    assert!((record.distance_meters.unwrap() - 100.0).abs() < 0.01);
}

#[test]
fn test_pause_resume_excluded_from_duration() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Cycling).unwrap();

    clock.set(5.0);
    engine.pause().unwrap();
    clock.set(10.0);
    engine.resume().unwrap();
    clock.set(20.0);
    engine.finish().unwrap();

    assert_eq!(engine.session().unwrap().accumulated_pause_s, 5.0);
    assert_eq!(engine.duration().unwrap(), 15.0);
}

#[test]
fn test_long_pause_excluded_from_duration() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Cycling).unwrap();

    clock.set(5.0);
    engine.pause().unwrap();
    clock.set(15.0);
    engine.resume().unwrap();
    clock.set(20.0);
    engine.finish().unwrap();

    assert_eq!(engine.session().unwrap().accumulated_pause_s, 10.0);
    assert_eq!(engine.duration().unwrap(), 10.0);
}

#[test]
fn test_repeated_pauses_accumulate_exactly() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Running).unwrap();

    // (pause at, resume at), uneven gaps
    let pauses = [(12.0, 19.5), (40.0, 41.0), (70.0, 130.0)];
    let mut meters = 0.0;
    let mut last_duration = 0.0;
    let mut segment_start = 0.0;

    for (pause_at, resume_at) in pauses {
        let mut t = segment_start;
        while t < pause_at {
            clock.set(t);
            engine.ingest(sample_at(meters, t, 5.0)).unwrap();
            meters += 7.0;

            let duration = engine.duration().unwrap();
            assert!(duration >= last_duration, "{duration} < {last_duration}");
            last_duration = duration;
            t += 2.5;
        }

        clock.set(pause_at);
        engine.pause().unwrap();
        let frozen = engine.duration().unwrap();
        assert!(frozen >= last_duration);

        for k in 1..=3 {
            let t = pause_at + (resume_at - pause_at) * k as f64 / 4.0;
            clock.set(t);
            let outcome = engine.ingest(sample_at(meters + 500.0, t, 5.0)).unwrap();
            assert_eq!(outcome, IngestOutcome::Recorded);
            assert!((engine.duration().unwrap() - frozen).abs() < 1e-9);
        }

        clock.set(resume_at);
        engine.resume().unwrap();
        assert!((engine.duration().unwrap() - frozen).abs() < 1e-9);
        last_duration = frozen;
        segment_start = resume_at;
    }

    clock.set(135.0);
    engine.finish().unwrap();

    let paused_total: f64 = pauses.iter().map(|(p, r)| r - p).sum();
    let session = engine.session().unwrap();
    assert!((session.accumulated_pause_s - paused_total).abs() < 1e-9);
    assert!((paused_total - 68.5).abs() < 1e-9);
    // 4 + 8 + 11 active steps of 7 m; nothing across the pauses
    assert!((session.metrics.total_distance_m - 161.0).abs() < 0.01);
    assert!((engine.duration().unwrap() - (135.0 - 68.5)).abs() < 1e-9);
}

#[test]
fn test_inaccurate_sample_dropped() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Running).unwrap();
    engine.ingest(sample_at(0.0, 0.0, 5.0)).unwrap();
    let before = engine.session().unwrap().clone();

    clock.set(5.0);
    let outcome = engine.ingest(sample_at(40.0, 5.0, 25.0)).unwrap();
    assert_eq!(
        outcome,
        IngestOutcome::Rejected(RejectReason::PoorAccuracy { accuracy_m: 25.0 })
    );
    assert_eq!(engine.session().unwrap(), &before);

    // Exactly at the limit is accepted
    clock.set(10.0);
    let outcome = engine.ingest(sample_at(40.0, 10.0, 20.0)).unwrap();
    assert_eq!(outcome, IngestOutcome::Aggregated);
    assert_eq!(engine.session().unwrap().samples.len(), 2);
}

#[test]
fn test_pause_from_idle_is_an_error() {
    let (mut engine, _) = engine();
    let err = engine.pause().unwrap_err();
    assert_eq!(
        err,
        SessionError::InvalidTransition {
            state: StateKind::Idle,
            event: SessionEvent::Pause,
        }
    );
    assert_eq!(engine.kind(), StateKind::Idle);
}

#[test]
fn test_identical_timestamps_give_zero_speed() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Running).unwrap();
    engine.ingest(sample_at(0.0, 100.0, 5.0)).unwrap();
    clock.set(1.0);
    engine.ingest(sample_at(15.0, 100.0, 5.0)).unwrap();

    let m = &engine.session().unwrap().metrics;
    assert_eq!(m.current_speed_mps, 0.0);
    assert!(m.current_speed_mps.is_finite());
    assert!((m.total_distance_m - 15.0).abs() < 0.01);
    assert!(!m.is_currently_moving);
}

#[test]
fn test_out_of_order_timestamps_never_negative() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Running).unwrap();
    engine.ingest(sample_at(0.0, 100.0, 5.0)).unwrap();
    clock.set(1.0);
    engine.ingest(sample_at(10.0, 90.0, 5.0)).unwrap();

    let m = &engine.session().unwrap().metrics;
    assert_eq!(m.current_speed_mps, 0.0);
    assert!(m.max_speed_mps >= 0.0);
}

#[test]
fn test_duration_monotonic_while_active() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Walking).unwrap();

    let mut last = engine.duration().unwrap();
    for step in 1..=20 {
        clock.set(step as f64 * 1.5);
        let current = engine.duration().unwrap();
        assert!(current >= last);
        last = current;
    }
}

#[test]
fn test_duration_frozen_while_paused_and_finished() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Walking).unwrap();
    clock.set(30.0);
    engine.pause().unwrap();
    clock.set(300.0);
    assert_eq!(engine.duration().unwrap(), 30.0);

    engine.resume().unwrap();
    clock.set(310.0);
    engine.finish().unwrap();
    clock.set(10_000.0);
    assert_eq!(engine.duration().unwrap(), 40.0);
}

#[test]
fn test_paused_samples_do_not_move_metrics() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Running).unwrap();
    engine.ingest(sample_at(0.0, 0.0, 5.0)).unwrap();
    clock.set(10.0);
    engine.ingest(sample_at(50.0, 10.0, 5.0)).unwrap();
    engine.pause().unwrap();
    let frozen = engine.session().unwrap().metrics.total_distance_m;

    for i in 1..=5 {
        clock.set(10.0 + i as f64 * 10.0);
        let outcome = engine
            .ingest(sample_at(50.0 + i as f64 * 100.0, 10.0 + i as f64 * 10.0, 5.0))
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Recorded);
    }

    let session = engine.session().unwrap();
    assert_eq!(session.metrics.total_distance_m, frozen);
    assert_eq!(session.samples.len(), 7);
}

#[test]
fn test_finish_from_paused() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Hiking).unwrap();
    clock.set(100.0);
    engine.pause().unwrap();
    clock.set(160.0);
    engine.finish().unwrap();

    assert_eq!(engine.kind(), StateKind::Finished);
    let session = engine.session().unwrap();
    assert_eq!(session.current_pause_start, None);
    assert_eq!(session.end_time, Some(160.0));
    assert_eq!(engine.record().unwrap().duration_seconds, 100.0);
}

#[test]
fn test_record_store_round_and_new_session() {
    let (mut engine, clock) = engine();
    let mut store = MemoryRecordStore::new();

    engine.start(ActivityCategory::Running).unwrap();
    engine.ingest(sample_at(0.0, 0.0, 5.0)).unwrap();
    clock.set(60.0);
    engine.ingest(sample_at(200.0, 60.0, 5.0)).unwrap();
    engine.set_calorie_count(Some(25)).unwrap();
    engine.finish().unwrap();
    let first = engine.take_record().unwrap();
    store.save(&first).unwrap();

    assert_eq!(engine.kind(), StateKind::Idle);
    let second_id = engine.start(ActivityCategory::Yoga).unwrap();
    assert_ne!(second_id, first.id);
    clock.set(660.0);
    engine.finish().unwrap();
    let second = engine.take_record().unwrap();
    store.save(&second).unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);

    let today = first.date_time().unwrap().date_naive();
    let stats = WorkoutStatistics::from_records(&listed, today);
    assert_eq!(stats.total_workouts, 2);
    assert_eq!(stats.total_duration_s, 660.0);
    assert_eq!(stats.total_calories, 25);
    assert_eq!(stats.current_streak_days, 1);
}

#[test]
fn test_route_length_matches_total_distance() {
    let (mut engine, clock) = engine();
    engine.start(ActivityCategory::Running).unwrap();

    for i in 0..10 {
        let t = i as f64 * 5.0;
        clock.set(t);
        engine.ingest(sample_at(i as f64 * 12.0, t, 5.0)).unwrap();
    }

    let session = engine.session().unwrap();
    let route_length = session.route_length_m();
    assert!((route_length - session.metrics.total_distance_m).abs() < 1e-6);
    assert!((route_length - 108.0).abs() < 0.01);
}
