//! Shared fixtures and data generators for integration tests
//!
//! Provides:
//! - Batch builders producing time-ordered reading sequences
//! - A seeded noise generator for sensor-realistic level series
//! - Standard detector/profile fixtures used across scenarios

#![allow(dead_code)]

use fuelguard_core::config::{ConsumptionProfile, SensorConfig};
use fuelguard_core::detector::ActivityDetector;
use fuelguard_core::events::MemorySink;
use fuelguard_core::reading::{DeviceId, Reading};
use fuelguard_core::time::Timestamp;
use fuelguard_core::traits::{RecordingOutlierWriter, StaticProfiles};

/// One minute in device-time milliseconds
pub const MINUTE: u64 = 60_000;

/// Standard sensor configuration used by every scenario
pub fn sensor() -> SensorConfig {
    SensorConfig::new(1, "fuel_calibrated", "fuel_outlier").unwrap()
}

/// A mid-size truck profile: 5 L threshold, 2/4 L/h idle/max burn
pub fn fleet_profile() -> ConsumptionProfile {
    ConsumptionProfile {
        activity_threshold: 5.0,
        idle_rate_lph: 2.0,
        max_rate_lph: 4.0,
        distance_rate_lpkm: 0.3,
    }
}

/// Time-ordered batch for one device, one reading per minute
pub fn batch(device: DeviceId, start_time: Timestamp, levels: &[f64]) -> Vec<Reading> {
    levels
        .iter()
        .enumerate()
        .map(|(i, level)| {
            Reading::new(device, start_time + i as u64 * MINUTE)
                .with_float("fuel_calibrated", *level)
        })
        .collect()
}

/// Detector wired with recording collaborators for assertions
pub fn detector() -> ActivityDetector<StaticProfiles, RecordingOutlierWriter, MemorySink> {
    ActivityDetector::with_decisions(
        StaticProfiles::new(fleet_profile()),
        RecordingOutlierWriter::new(),
        MemorySink::new(),
    )
}

/// Deterministic pseudo-random level generator
///
/// Produces sensor-like jitter around a base level so quiet-fleet
/// scenarios are noisy without ever crossing a detection threshold.
pub struct LevelSeries {
    seed: u32,
}

impl LevelSeries {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// `count` levels jittered within `base +/- amplitude`
    pub fn noisy(&mut self, base: f64, amplitude: f64, count: usize) -> Vec<f64> {
        (0..count)
            .map(|_| base + (self.next_uniform() - 0.5) * 2.0 * amplitude)
            .collect()
    }

    fn next_uniform(&mut self) -> f64 {
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        f64::from(self.seed >> 8) / f64::from(u32::MAX >> 8)
    }
}
