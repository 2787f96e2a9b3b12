//! Fuel Activity Results
//!
//! A [`FuelActivity`] is the immutable outcome of one detector or
//! gap-analysis call. Most calls conclude nothing and return the NONE
//! sentinel; a confirmed result carries the event boundaries so callers
//! can persist or alert on it without re-querying engine state.

use crate::reading::Reading;
use crate::time::Timestamp;

/// Kind of detected (or estimated) fuel event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FuelActivityKind {
    /// Nothing concluded this call
    None = 0,
    /// Confirmed fill observed through the reading window
    FuelFill = 1,
    /// Confirmed drain observed through the reading window
    FuelDrain = 2,
    /// Fill inferred across a reporting gap
    ProbableFuelFill = 3,
    /// Drain inferred across a reporting gap
    ProbableFuelDrain = 4,
    /// Level rise across a gap where only burn was expected
    ExpectedFuelFill = 5,
}

impl FuelActivityKind {
    /// Human-readable name for logs and exports
    pub const fn name(&self) -> &'static str {
        match self {
            FuelActivityKind::None => "none",
            FuelActivityKind::FuelFill => "fuel_fill",
            FuelActivityKind::FuelDrain => "fuel_drain",
            FuelActivityKind::ProbableFuelFill => "probable_fuel_fill",
            FuelActivityKind::ProbableFuelDrain => "probable_fuel_drain",
            FuelActivityKind::ExpectedFuelFill => "expected_fuel_fill",
        }
    }

    /// True for the window-confirmed kinds that carry an outlier pass
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, FuelActivityKind::FuelFill | FuelActivityKind::FuelDrain)
    }
}

/// Immutable result of one detection or gap-analysis call
#[derive(Debug, Clone)]
pub struct FuelActivity {
    /// What kind of event, if any
    pub kind: FuelActivityKind,
    /// Volume in litres: signed for confirmed events (negative for
    /// drains), estimated for gap-analysis kinds (the probable-fill
    /// estimate can go negative, see `gap`)
    pub change_volume: f64,
    /// Event start (midpoint of the opening batch)
    pub start_time: Timestamp,
    /// Event end (midpoint of the closing batch)
    pub end_time: Timestamp,
    /// Reading at the event start boundary
    pub start_reading: Option<Reading>,
    /// Reading at the event end boundary
    pub end_reading: Option<Reading>,
}

impl FuelActivity {
    /// The NONE sentinel: nothing concluded
    pub const fn none() -> Self {
        Self {
            kind: FuelActivityKind::None,
            change_volume: 0.0,
            start_time: 0,
            end_time: 0,
            start_reading: None,
            end_reading: None,
        }
    }

    /// Gap-analysis result spanning two readings
    pub fn spanning(
        kind: FuelActivityKind,
        change_volume: f64,
        previous: &Reading,
        current: &Reading,
    ) -> Self {
        Self {
            kind,
            change_volume,
            start_time: previous.device_time,
            end_time: current.device_time,
            start_reading: Some(previous.clone()),
            end_reading: Some(current.clone()),
        }
    }

    /// True unless this is the NONE sentinel
    pub fn is_event(&self) -> bool {
        self.kind != FuelActivityKind::None
    }
}

impl Default for FuelActivity {
    fn default() -> Self {
        Self::none()
    }
}
