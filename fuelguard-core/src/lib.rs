//! Core fuel activity detection engine for FuelGuard
//!
//! Detects discrete refuel and drain events in noisy vehicle fuel-level
//! telemetry. Two entry points cover the two ways events become visible:
//!
//! - [`ActivityDetector`]: a stateful per-device/per-sensor state machine
//!   over batches of readings, comparing sliding half-window means
//!   against a per-device threshold, validating candidate events against
//!   an expected-consumption model, and retroactively flagging outlier
//!   readings once an event boundary is known.
//! - [`GapAnalyzer`]: a stateless estimator for events that happened
//!   invisibly during a reporting gap, from the two readings that
//!   bracket it.
//!
//! The engine holds no global state and performs no I/O of its own:
//! configuration lookups and outlier persistence go through injected
//! collaborator traits, candidate-event state lives in a caller-owned
//! [`EventStateStore`], and every decision is emitted to a
//! [`events::DecisionSink`]. Protocol decoding, framing, sessions and
//! persistence all live upstream.
//!
//! ```no_run
//! use fuelguard_core::{
//!     ActivityDetector, EventStateStore, SensorConfig, ConsumptionProfile,
//! };
//! use fuelguard_core::traits::{StaticProfiles, NullOutlierWriter};
//!
//! let mut detector = ActivityDetector::new(
//!     StaticProfiles::new(ConsumptionProfile::default()),
//!     NullOutlierWriter,
//! );
//! let mut store = EventStateStore::new();
//! let sensor = SensorConfig::new(1, "fuel_calibrated", "fuel_outlier").unwrap();
//!
//! // batch: time-ordered readings for one device
//! # let batch = vec![];
//! match detector.check_for_activity(&batch, &mut store, &sensor) {
//!     Ok(activity) if activity.is_event() => { /* persist / alert */ }
//!     Ok(_) => {} // nothing concluded this call
//!     Err(_) => { /* ingestion bug or unknown device */ }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod activity;
pub mod config;
pub mod consumption;
pub mod detector;
pub mod errors;
pub mod events;
pub mod gap;
pub mod reading;
pub mod stats;
pub mod store;
pub mod time;
pub mod traits;

// Public API
pub use activity::{FuelActivity, FuelActivityKind};
pub use config::{ConsumptionProfile, SensorConfig};
pub use detector::ActivityDetector;
pub use errors::{DetectionError, DetectionResult, WriteError};
pub use gap::GapAnalyzer;
pub use reading::{DeviceId, Reading, SensorId};
pub use store::{EventKey, EventStateStore};
pub use traits::{OutlierWriter, ProfileProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
