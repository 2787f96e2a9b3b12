//! Gap Analysis: Estimating Events Across Reporting Gaps
//!
//! ## Overview
//!
//! When a device goes silent - parked underground, out of coverage, power
//! cut - fills and drains can happen invisibly between the last accepted
//! reading and the next one. The windowed detector cannot see them; this
//! analyzer estimates them instead, from just the two readings that
//! bracket the gap and the expected-consumption model.
//!
//! Unlike the detector this path is stateless and best-effort: it holds
//! no store, every call stands alone, and anything it cannot resolve
//! (unknown device, missing fuel attributes, zero-length interval) is
//! simply "no result", never an error. The ingestion pipeline invokes it
//! whenever it notices a time gap between consecutive accepted readings.
//!
//! ## Classification
//!
//! With `change = current - previous` and predicted burn `expected`:
//!
//! - `|change|` within the deviation band: noise, no result.
//! - Drop matching predicted burn: ordinary consumption, no result.
//! - Drop exceeding worst-case burn: PROBABLE_FUEL_DRAIN of
//!   `|change| - expected_current`.
//! - Any other drop off the prediction: PROBABLE_FUEL_FILL of
//!   `expected_current - |change|`. Below the prediction, that is the
//!   fuel that must have entered while the device was silent; between
//!   the prediction band and worst case the estimate goes negative, and
//!   the kind itself marks the interval for scrutiny. Both sides of this
//!   inversion (a drop classified as a fill) are deliberate and pinned
//!   by tests.
//! - Rise beyond the deviation band: EXPECTED_FUEL_FILL of
//!   `change + expected_current` (the fill had to cover the burn too).
//!
//! Drain and rise estimates are always positive; only the
//! PROBABLE_FUEL_FILL estimate can go negative.

use libm::fabs;

use crate::activity::{FuelActivity, FuelActivityKind};
use crate::config::SensorConfig;
use crate::consumption::{is_drop_within_expected_burn, ExpectedConsumption};
use crate::events::{DecisionSink, DetectionEvent, NullSink};
use crate::reading::Reading;
use crate::traits::ProfileProvider;

/// Stateless estimator for events hidden inside reporting gaps
pub struct GapAnalyzer<P, D = NullSink> {
    profiles: P,
    decisions: D,
}

impl<P: ProfileProvider> GapAnalyzer<P, NullSink> {
    /// Analyzer without a decision trace
    pub fn new(profiles: P) -> Self {
        Self { profiles, decisions: NullSink }
    }
}

impl<P, D> GapAnalyzer<P, D>
where
    P: ProfileProvider,
    D: DecisionSink,
{
    /// Analyzer emitting its decisions to `decisions`
    pub fn with_decisions(profiles: P, decisions: D) -> Self {
        Self { profiles, decisions }
    }

    /// The decision sink, for asserting on recorded decisions
    pub fn decisions(&self) -> &D {
        &self.decisions
    }

    /// Estimate a probable fuel event across a reporting gap
    ///
    /// `previous` is the last accepted reading before the gap, `current`
    /// the first after it. Returns `None` when required inputs are
    /// missing or the level change is explainable - gap analysis never
    /// errors, it just declines to guess.
    pub fn check_for_activity_if_data_loss(
        &mut self,
        current: &Reading,
        previous: &Reading,
        tank_capacity: Option<f64>,
        sensor: &SensorConfig,
    ) -> Option<FuelActivity> {
        let profile = self.profiles.consumption_profile(current.device_id).ok()?;
        let previous_fuel = sensor.fuel_level(previous)?;
        let current_fuel = sensor.fuel_level(current)?;

        let expected = ExpectedConsumption::between(previous, current, tank_capacity, &profile)?;
        let actual_change = current_fuel - previous_fuel;

        if fabs(actual_change) <= expected.allowed_deviation {
            // Within normal sensor variance
            return self.conclude(current, actual_change, None);
        }

        if actual_change < 0.0 {
            if is_drop_within_expected_burn(actual_change, &expected) {
                // The gap's drop is just the burn we predicted
                return self.conclude(current, actual_change, None);
            }

            if fabs(actual_change) > expected.expected_max_fuel_consumed {
                let volume = fabs(actual_change) - expected.expected_current_fuel_consumed;
                return self.conclude(
                    current,
                    actual_change,
                    Some(FuelActivity::spanning(
                        FuelActivityKind::ProbableFuelDrain,
                        volume,
                        previous,
                        current,
                    )),
                );
            }

            // Level dropped less than the engine burned: something topped
            // the tank up during the silence
            let volume = expected.expected_current_fuel_consumed - fabs(actual_change);
            return self.conclude(
                current,
                actual_change,
                Some(FuelActivity::spanning(
                    FuelActivityKind::ProbableFuelFill,
                    volume,
                    previous,
                    current,
                )),
            );
        }

        // Unexpected rise: the fill also had to cover the interval's burn
        let volume = actual_change + expected.expected_current_fuel_consumed;
        self.conclude(
            current,
            actual_change,
            Some(FuelActivity::spanning(
                FuelActivityKind::ExpectedFuelFill,
                volume,
                previous,
                current,
            )),
        )
    }

    fn conclude(
        &mut self,
        current: &Reading,
        actual_change: f64,
        outcome: Option<FuelActivity>,
    ) -> Option<FuelActivity> {
        let kind = outcome
            .as_ref()
            .map(|a| a.kind)
            .unwrap_or(FuelActivityKind::None);
        self.decisions.record(DetectionEvent::GapEvaluated {
            device: current.device_id,
            actual_change,
            kind,
        });
        outcome
    }
}
