//! Basic Drain Detection Example
//!
//! This example demonstrates the simplest use case of FuelGuard:
//! running batches of fuel-level readings through the activity detector
//! and watching a theft-style drain get detected and confirmed.
//!
//! ## What You'll Learn
//!
//! - Wiring a detector with profile and outlier-writer collaborators
//! - Feeding time-ordered reading batches through the state machine
//! - Reading the decision trace the engine emits
//! - How mid-event sensor spikes get flagged as outliers
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_drain_detection
//! ```

use fuelguard_core::{
    events::{DetectionEvent, MemorySink},
    traits::{RecordingOutlierWriter, StaticProfiles},
    ActivityDetector, ConsumptionProfile, EventStateStore, Reading, SensorConfig,
};

const MINUTE: u64 = 60_000;

fn main() {
    println!("FuelGuard Drain Detection Example");
    println!("=================================\n");

    // A mid-size truck: 5 L of mean-difference calls an activity,
    // 2 L/h idle burn, 4 L/h worst case, 0.3 L/km driven
    let profile = ConsumptionProfile {
        activity_threshold: 5.0,
        idle_rate_lph: 2.0,
        max_rate_lph: 4.0,
        distance_rate_lpkm: 0.3,
    };
    println!("Consumption profile:");
    println!("  Activity threshold: {} L", profile.activity_threshold);
    println!("  Idle burn:          {} L/h", profile.idle_rate_lph);
    println!("  Worst-case burn:    {} L/h", profile.max_rate_lph);
    println!();

    let mut detector = ActivityDetector::with_decisions(
        StaticProfiles::new(profile),
        RecordingOutlierWriter::new(),
        MemorySink::new(),
    );
    let mut store = EventStateStore::new();
    let sensor = SensorConfig::new(1, "fuel_calibrated", "fuel_outlier").unwrap();

    // Three batches from device 7: level stable at ~60 L, then a rapid
    // siphon down to 24 L with a sensor spike mid-event
    let batches: [&[f64]; 3] = [
        &[60.0, 60.0, 59.0, 40.0, 39.0], // drop begins
        &[30.0, 85.0, 26.0, 25.0, 24.0], // still falling; 85 is sensor slosh
        &[24.0, 24.0, 24.0, 24.0, 24.0], // settled
    ];
    let batch_starts = [0, 5 * MINUTE, 10 * MINUTE];

    for (levels, start) in batches.iter().zip(batch_starts) {
        let readings: Vec<Reading> = levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                Reading::new(7, start + i as u64 * MINUTE).with_float("fuel_calibrated", *level)
            })
            .collect();

        println!("Batch at t={:2} min: {:?}", start / MINUTE, levels);
        let activity = detector
            .check_for_activity(&readings, &mut store, &sensor)
            .unwrap();

        if activity.is_event() {
            println!(
                "  => {} of {:.1} L between t={} min and t={} min",
                activity.kind.name(),
                activity.change_volume.abs(),
                activity.start_time / MINUTE,
                activity.end_time / MINUTE,
            );
        } else {
            println!("  => nothing concluded yet ({} envelope(s) open)", store.len());
        }
    }

    println!("\nDecision trace:");
    for event in detector.decisions().events() {
        match event {
            DetectionEvent::ThresholdEvaluated { diff_in_means, threshold, tracking, .. } => {
                println!(
                    "  threshold check: diff {:.2} vs {} (tracking: {})",
                    diff_in_means, threshold, tracking
                );
            }
            DetectionEvent::ActivityStarted { start_level, start_time, .. } => {
                println!(
                    "  envelope opened: level {} L at t={} min",
                    start_level,
                    start_time / MINUTE
                );
            }
            DetectionEvent::ActivityClosed { end_level, change_volume, .. } => {
                println!(
                    "  envelope closed: level {} L, change {:+.1} L",
                    end_level, change_volume
                );
            }
            DetectionEvent::EventConfirmed { kind, change_volume, .. } => {
                println!("  confirmed: {} ({:+.1} L)", kind.name(), change_volume);
            }
            DetectionEvent::OutlierFlagged { device_time, value, min_bound, max_bound, .. } => {
                println!(
                    "  outlier: {} L at t={} min outside [{}, {}]",
                    value,
                    device_time / MINUTE,
                    min_bound,
                    max_bound
                );
            }
            _ => {}
        }
    }

    println!("\nPersisted outlier flags: {:?}", detector.outlier_writer().flagged());

    println!("\n{}", "=".repeat(60));
    println!("Key Insights:");
    println!("- Events are decided at envelope close, not at first crossing");
    println!("- Start/end levels are medians, so single spikes don't skew them");
    println!("- The spike reading is flagged retroactively once the event is known");
    println!("- All state lives in the caller-owned store; nothing is global");
}
