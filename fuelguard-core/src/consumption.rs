//! Expected-Consumption Model
//!
//! ## Overview
//!
//! Separates real fuel events from ordinary engine burn. Given the time
//! and distance between two readings and the device's consumption profile,
//! the model predicts how much fuel the engine should have used:
//!
//! ```text
//! expected_current = idle_rate * hours + distance_rate * km
//! expected_max     = max_rate  * hours + distance_rate * km
//! ```
//!
//! Both predictions are capped at the tank capacity when it is known - no
//! single interval can plausibly burn (or lose) more than one tank.
//!
//! The model is pure: no state, no lookups. Profiles and capacities are
//! resolved by the caller and passed in.
//!
//! ## Two different questions
//!
//! The detector and the gap analyzer ask differently shaped questions:
//!
//! - [`is_change_explained`] (detector, event confirmation): "could burn
//!   alone account for this level change?" A drop is explained up to
//!   `expected_max + allowed_deviation`; a rise only within the deviation
//!   band, because engines do not create fuel.
//! - [`is_drop_within_expected_burn`] (gap analysis): "does this drop
//!   match the burn we predicted?" Here the band is two-sided around
//!   `expected_current`: losing much *less* than predicted across a gap
//!   is itself evidence - of a fill that happened while the device was
//!   silent.

use libm::fabs;

use crate::config::ConsumptionProfile;
use crate::reading::Reading;
use crate::time::{delta_ms, elapsed_hours};

/// Meters per kilometre, for odometer conversion
const M_PER_KM: f64 = 1000.0;

/// Predicted burn over one interval
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpectedConsumption {
    /// Level noise tolerated before any conclusion is drawn (litres)
    pub allowed_deviation: f64,
    /// Burn predicted from the profile's nominal rates (litres)
    pub expected_current_fuel_consumed: f64,
    /// Burn predicted from the profile's worst-case rates (litres)
    pub expected_max_fuel_consumed: f64,
}

impl ExpectedConsumption {
    /// Predict burn between two readings
    ///
    /// Distance comes from the cumulative odometer attribute when both
    /// readings carry it (negative odometer deltas are treated as zero -
    /// trackers reset). Returns `None` for a non-positive time interval,
    /// where burn predicts nothing.
    pub fn between(
        previous: &Reading,
        current: &Reading,
        tank_capacity: Option<f64>,
        profile: &ConsumptionProfile,
    ) -> Option<Self> {
        if delta_ms(previous.device_time, current.device_time) == 0 {
            return None;
        }

        let hours = elapsed_hours(previous.device_time, current.device_time);

        let km = match (previous.total_distance(), current.total_distance()) {
            (Some(start_m), Some(end_m)) if end_m > start_m => (end_m - start_m) / M_PER_KM,
            _ => 0.0,
        };

        let mut expected_current = profile.idle_rate_lph * hours + profile.distance_rate_lpkm * km;
        let mut expected_max = profile.max_rate_lph * hours + profile.distance_rate_lpkm * km;

        // One interval cannot plausibly move more fuel than the tank holds
        if let Some(capacity) = tank_capacity {
            expected_current = expected_current.min(capacity);
            expected_max = expected_max.min(capacity);
        }

        Some(Self {
            allowed_deviation: profile.activity_threshold,
            expected_current_fuel_consumed: expected_current,
            expected_max_fuel_consumed: expected_max,
        })
    }
}

/// Can ordinary burn account for this signed level change?
///
/// Used at event close to reject false positives. Drops are explained up
/// to worst-case burn plus the deviation band; rises are explained only
/// within the deviation band.
pub fn is_change_explained(volume: f64, expected: &ExpectedConsumption) -> bool {
    if volume <= 0.0 {
        fabs(volume) <= expected.expected_max_fuel_consumed + expected.allowed_deviation
    } else {
        volume <= expected.allowed_deviation
    }
}

/// Does a gap-spanning drop match the predicted burn?
///
/// Two-sided: the drop magnitude must land within `allowed_deviation` of
/// `expected_current_fuel_consumed`. A drop well below the prediction
/// suggests an invisible fill; well above it, an invisible drain.
pub fn is_drop_within_expected_burn(volume: f64, expected: &ExpectedConsumption) -> bool {
    let magnitude = fabs(volume);
    magnitude >= expected.expected_current_fuel_consumed - expected.allowed_deviation
        && magnitude <= expected.expected_current_fuel_consumed + expected.allowed_deviation
}
