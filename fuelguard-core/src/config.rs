//! Per-Sensor and Per-Device Configuration
//!
//! Both structures are immutable snapshots resolved by collaborators
//! outside the engine (see `traits`): the engine never loads or caches
//! configuration itself, it just reads whatever the caller hands it for
//! the current batch.

use crate::reading::{FieldName, Reading, SensorId};

/// Configuration for one fuel sensor on a device
///
/// Identifies the sensor and names the reading attributes the engine
/// reads (calibrated fuel level) and writes (outlier flag). Field names
/// are configuration because different tracker models report the
/// calibrated level under different attribute names.
#[derive(Debug, Clone, Copy)]
pub struct SensorConfig {
    /// Sensor identity, unique within the device
    pub sensor_id: SensorId,
    /// Attribute holding the calibrated fuel level in litres
    pub fuel_field: FieldName,
    /// Attribute the engine sets when it flags a reading as an outlier
    pub outlier_field: FieldName,
}

impl SensorConfig {
    /// Create a sensor config; `None` when a field name is too long
    pub fn new(sensor_id: SensorId, fuel_field: &str, outlier_field: &str) -> Option<Self> {
        Some(Self {
            sensor_id,
            fuel_field: FieldName::new(fuel_field)?,
            outlier_field: FieldName::new(outlier_field)?,
        })
    }

    /// Calibrated fuel level of a reading, if present
    ///
    /// This is the typed accessor the whole engine goes through; a `None`
    /// here on a detector batch is a precondition violation upstream.
    pub fn fuel_level(&self, reading: &Reading) -> Option<f64> {
        reading.float(&self.fuel_field)
    }
}

/// Expected-consumption profile for one device
///
/// Drives both event confirmation (is a detected level change explainable
/// as ordinary burn?) and gap estimation. Rates are fleet-configured per
/// vehicle class; the threshold is in litres of mean-difference.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumptionProfile {
    /// Minimum difference-in-means (litres) to call an activity
    pub activity_threshold: f64,
    /// Baseline burn at rest, litres per hour
    pub idle_rate_lph: f64,
    /// Worst-case burn under load, litres per hour
    pub max_rate_lph: f64,
    /// Distance-based burn, litres per kilometre driven
    pub distance_rate_lpkm: f64,
}

impl Default for ConsumptionProfile {
    fn default() -> Self {
        // Mid-size diesel truck numbers; fleets override per vehicle class
        Self {
            activity_threshold: 5.0,
            idle_rate_lph: 2.0,
            max_rate_lph: 4.0,
            distance_rate_lpkm: 0.35,
        }
    }
}

impl ConsumptionProfile {
    /// Profile for stationary assets (generators, pumps)
    ///
    /// No distance term; tighter threshold since levels only move with
    /// burn or tampering.
    pub fn stationary(idle_rate_lph: f64, max_rate_lph: f64) -> Self {
        Self {
            activity_threshold: 3.0,
            idle_rate_lph,
            max_rate_lph,
            distance_rate_lpkm: 0.0,
        }
    }
}
