//! Error Types for Fuel Activity Detection
//!
//! ## Design Philosophy
//!
//! The detection engine runs inside per-device telemetry pipelines, so its
//! error type follows the same rules the rest of the engine does:
//!
//! 1. **Small Size**: every variant is a few machine words - errors travel
//!    through hot per-batch paths and may be queued by callers.
//!
//! 2. **No Heap Allocation**: no `String` payloads; identifiers and indices
//!    are carried inline so the type works without `std`.
//!
//! 3. **Copy Semantics**: errors implement `Copy` so callers can log and
//!    re-route them without move gymnastics.
//!
//! ## Error Categories
//!
//! ### Precondition violations (ingestion bugs - do not retry)
//! - `EmptyBatch`: the upstream contract guarantees non-empty batches
//! - `MissingFuelField`: a reading arrived without the calibrated fuel
//!   attribute named by its sensor config
//! - `BatchTooLarge`: batch exceeds the engine's fixed evaluation bound
//!
//! ### Unresolvable configuration (skip this batch, state untouched)
//! - `ProfileNotFound`: no consumption profile for the device
//!
//! ### Resource exhaustion
//! - `StoreFull`: too many concurrently tracked candidate events
//!
//! Best-effort persistence failures deliberately do NOT appear here: an
//! outlier-flag write that fails is logged and swallowed by the detector
//! (the flag is diagnostic metadata, not the event record) and surfaces
//! only through the decision trace.

use thiserror_no_std::Error;

use crate::reading::DeviceId;

/// Result type for detection operations
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Detection errors - kept small and `Copy` for hot-path use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionError {
    /// Caller passed an empty batch; the delivery contract forbids this
    #[error("reading batch is empty")]
    EmptyBatch,

    /// A reading lacks the calibrated fuel attribute
    #[error("reading {index} is missing the calibrated fuel field")]
    MissingFuelField {
        /// Index of the offending reading within the batch
        index: usize,
    },

    /// Batch exceeds the engine's fixed evaluation window
    #[error("batch of {actual} readings exceeds limit of {max}")]
    BatchTooLarge {
        /// Maximum batch size the engine evaluates
        max: usize,
        /// Size of the batch that was passed in
        actual: usize,
    },

    /// No consumption profile is configured for the device
    #[error("no consumption profile for device {device}")]
    ProfileNotFound {
        /// Device whose profile lookup failed
        device: DeviceId,
    },

    /// Too many candidate events tracked at once
    #[error("event state store is full ({capacity} keys)")]
    StoreFull {
        /// Fixed capacity of the state store
        capacity: usize,
    },
}

/// Failure from the best-effort outlier persistence seam
///
/// Never propagated out of the detector; carried on the decision trace.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// Backing store rejected or dropped the write
    #[error("outlier flag write failed: {reason}")]
    Failed {
        /// Short description from the backing store
        reason: &'static str,
    },
    /// Backing store is not reachable right now
    #[error("outlier flag store unavailable")]
    Unavailable,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DetectionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::EmptyBatch =>
                defmt::write!(fmt, "empty batch"),
            Self::MissingFuelField { index } =>
                defmt::write!(fmt, "reading {} missing fuel field", index),
            Self::BatchTooLarge { max, actual } =>
                defmt::write!(fmt, "batch {} exceeds limit {}", actual, max),
            Self::ProfileNotFound { device } =>
                defmt::write!(fmt, "no profile for device {}", device),
            Self::StoreFull { capacity } =>
                defmt::write!(fmt, "state store full ({})", capacity),
        }
    }
}
