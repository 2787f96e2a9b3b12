//! Multi-batch envelope lifecycle tests for the activity detector
//!
//! Exercises the open/extend/close state machine across detector calls,
//! the decision trace it emits, and the store invariants that hold
//! between calls.

mod common;

use common::*;

use fuelguard_core::events::DetectionEvent;
use fuelguard_core::store::{ActivityWindow, EventKey, EventStateStore};
use fuelguard_core::{FuelActivityKind, Reading};

use proptest::collection::vec;
use proptest::prelude::*;

#[test]
fn drain_lifecycle_across_three_batches() {
    let mut engine = detector();
    let mut store = EventStateStore::new();
    let key = EventKey::new(7, 1);

    // Batch 1 crosses the threshold: diff in means ~13.7 over 5 L
    let opening = batch(7, 0, &[60.0, 60.0, 59.0, 40.0, 39.0]);
    let activity = engine.check_for_activity(&opening, &mut store, &sensor()).unwrap();
    assert!(!activity.is_event());
    assert!(store.contains(&key));

    // Batch 2 overlaps batch 1 and stays above the threshold
    let continuation = batch(7, 2 * MINUTE, &[59.0, 40.0, 39.0, 25.0, 24.0]);
    let activity = engine
        .check_for_activity(&continuation, &mut store, &sensor())
        .unwrap();
    assert!(!activity.is_event());
    assert_eq!(store.get_mut(&key).unwrap().window.len(), 7);

    // Batch 3 has settled: the envelope closes and the drain confirms
    let closing = batch(7, 10 * MINUTE, &[24.0; 5]);
    let activity = engine.check_for_activity(&closing, &mut store, &sensor()).unwrap();

    assert_eq!(activity.kind, FuelActivityKind::FuelDrain);
    assert_eq!(activity.change_volume, -36.0); // median 24 - median 60
    assert_eq!(activity.start_time, 2 * MINUTE);
    assert_eq!(activity.end_time, 12 * MINUTE);
    assert!(store.is_empty());

    // The decision trace tells the same story in order
    let events = engine.decisions().events();
    assert!(matches!(
        events[0],
        DetectionEvent::ThresholdEvaluated { tracking: false, .. }
    ));
    assert!(matches!(
        events[1],
        DetectionEvent::ActivityStarted { start_level, .. } if start_level == 60.0
    ));
    assert!(matches!(events[2], DetectionEvent::WindowMerged { appended: 5, .. }));
    assert!(matches!(
        events[3],
        DetectionEvent::ThresholdEvaluated { tracking: true, .. }
    ));
    assert!(matches!(events[4], DetectionEvent::WindowMerged { appended: 2, .. }));
    assert!(matches!(
        events[5],
        DetectionEvent::ThresholdEvaluated { tracking: true, .. }
    ));
    assert!(matches!(
        events[6],
        DetectionEvent::ActivityClosed { change_volume, .. } if change_volume == -36.0
    ));
    assert!(matches!(
        events[7],
        DetectionEvent::EventConfirmed { kind: FuelActivityKind::FuelDrain, .. }
    ));
}

#[test]
fn noisy_quiet_fleet_never_opens_an_envelope() {
    let mut engine = detector();
    let mut store = EventStateStore::new();
    let mut series = LevelSeries::new(7);

    // An hour of jittery but stable readings, batch by batch
    for batch_index in 0..12u64 {
        let levels = series.noisy(55.0, 1.5, 5);
        let readings = batch(7, batch_index * 5 * MINUTE, &levels);

        let activity = engine
            .check_for_activity(&readings, &mut store, &sensor())
            .unwrap();
        assert!(!activity.is_event());
    }

    assert!(store.is_empty());
    let opened = engine
        .decisions()
        .events()
        .iter()
        .any(|e| matches!(e, DetectionEvent::ActivityStarted { .. }));
    assert!(!opened);
}

#[test]
fn fill_with_mid_event_spike_flags_the_spike() {
    let mut engine = detector();
    let mut store = EventStateStore::new();

    let opening = batch(7, 0, &[20.0, 20.0, 21.0, 45.0, 50.0]);
    engine.check_for_activity(&opening, &mut store, &sensor()).unwrap();

    // Sloshing spike to 90 while the pump is still running
    let continuation = batch(7, 2 * MINUTE, &[21.0, 45.0, 50.0, 90.0, 55.0]);
    engine
        .check_for_activity(&continuation, &mut store, &sensor())
        .unwrap();

    let closing = batch(7, 10 * MINUTE, &[55.0, 60.0, 60.0, 60.0, 60.0]);
    let activity = engine.check_for_activity(&closing, &mut store, &sensor()).unwrap();

    assert_eq!(activity.kind, FuelActivityKind::FuelFill);
    assert_eq!(activity.change_volume, 40.0);

    // Fill band [20 - 5, 60 + 5]: only the 90 spike falls outside
    assert_eq!(engine.outlier_writer().flagged(), &[(7, 5 * MINUTE)]);
}

#[test]
fn devices_share_a_store_independently() {
    let mut engine = detector();
    let mut store = EventStateStore::new();
    let key_a = EventKey::new(7, 1);
    let key_b = EventKey::new(8, 1);

    // Both devices start draining in the same period
    let opening_a = batch(7, 0, &[60.0, 60.0, 59.0, 40.0, 39.0]);
    let opening_b = batch(8, 0, &[90.0, 90.0, 89.0, 70.0, 69.0]);
    engine.check_for_activity(&opening_a, &mut store, &sensor()).unwrap();
    engine.check_for_activity(&opening_b, &mut store, &sensor()).unwrap();
    assert_eq!(store.len(), 2);

    // Closing one envelope leaves the other in flight
    let closing_a = batch(7, 10 * MINUTE, &[24.0; 5]);
    let activity_a = engine.check_for_activity(&closing_a, &mut store, &sensor()).unwrap();
    assert_eq!(activity_a.kind, FuelActivityKind::FuelDrain);
    assert!(!store.contains(&key_a));
    assert!(store.contains(&key_b));

    let closing_b = batch(8, 10 * MINUTE, &[54.0; 5]);
    let activity_b = engine.check_for_activity(&closing_b, &mut store, &sensor()).unwrap();
    assert_eq!(activity_b.kind, FuelActivityKind::FuelDrain);
    assert_eq!(activity_b.change_volume, -36.0); // 54 - 90
    assert!(store.is_empty());
}

#[test]
fn replaying_the_closing_batch_concludes_nothing() {
    let mut engine = detector();
    let mut store = EventStateStore::new();

    let opening = batch(7, 0, &[60.0, 60.0, 59.0, 40.0, 39.0]);
    engine.check_for_activity(&opening, &mut store, &sensor()).unwrap();

    let closing = batch(7, 10 * MINUTE, &[24.0; 5]);
    let activity = engine.check_for_activity(&closing, &mut store, &sensor()).unwrap();
    assert!(activity.is_event());

    // The envelope is gone; a redelivered batch finds nothing to close
    let replayed = engine.check_for_activity(&closing, &mut store, &sensor()).unwrap();
    assert!(!replayed.is_event());
    assert!(store.is_empty());
}

proptest! {
    /// A flat fuel level never opens an envelope, whatever the level or
    /// batch size
    #[test]
    fn constant_level_never_opens(level in 0.0f64..100.0, len in 1usize..33) {
        let mut engine = detector();
        let mut store = EventStateStore::new();

        let levels = vec![level; len];
        let readings = batch(7, 0, &levels);
        let activity = engine
            .check_for_activity(&readings, &mut store, &sensor())
            .unwrap();

        prop_assert!(!activity.is_event());
        prop_assert!(store.is_empty());
    }

    /// Window union is idempotent: merging the same batch twice changes
    /// nothing
    #[test]
    fn window_union_is_idempotent(times in vec(any::<u64>(), 0..40)) {
        let readings: Vec<Reading> = times
            .iter()
            .map(|t| Reading::new(1, *t).with_float("fuel_calibrated", 50.0))
            .collect();

        let mut window = ActivityWindow::new();
        window.merge(&readings);
        let len_after_first = window.len();

        let appended = window.merge(&readings);
        prop_assert_eq!(appended, 0);
        prop_assert_eq!(window.len(), len_after_first);
    }
}
