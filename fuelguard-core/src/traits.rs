//! Collaborator Seams for the Detection Engine
//!
//! The engine consumes two external services and nothing else:
//!
//! - [`ProfileProvider`]: resolves the per-device consumption profile and
//!   the optional tank capacity for a sensor. In production this fronts
//!   the fleet configuration store; an unknown device is a typed
//!   `ProfileNotFound`, which makes the caller skip that batch without
//!   touching any other device's state.
//! - [`OutlierWriter`]: persists positive outlier flags back onto stored
//!   readings. Fire-and-forget: the detector logs and swallows failures
//!   because the flag is diagnostic metadata, not the event record.
//!
//! Both are injected into the detector at construction. There is no
//! process-global context object; whatever owns the device-processing
//! pipeline owns these collaborators and the event state store.

use crate::config::ConsumptionProfile;
use crate::errors::{DetectionResult, WriteError};
use crate::reading::{DeviceId, FieldName, Reading, SensorId};

/// Resolves per-device configuration at detection time
pub trait ProfileProvider {
    /// Consumption profile for a device
    ///
    /// Fails with `DetectionError::ProfileNotFound` for unknown devices.
    fn consumption_profile(&self, device: DeviceId) -> DetectionResult<ConsumptionProfile>;

    /// Maximum tank capacity in litres for a device sensor, when known
    fn tank_capacity(&self, device: DeviceId, sensor: SensorId) -> Option<f64>;
}

/// Best-effort persistence of outlier flags
///
/// Only positively-flagged readings are written; in-band readings are
/// never explicitly cleared. That asymmetry keeps write volume bounded by
/// actual anomalies instead of batch size.
pub trait OutlierWriter {
    /// Persist the outlier flag already set on `reading` under `field`
    fn persist_outlier_flag(&mut self, reading: &Reading, field: &FieldName)
        -> Result<(), WriteError>;
}

/// Fixed-profile provider for tests and single-vehicle deployments
///
/// Serves the same profile and capacity for every device.
#[derive(Debug, Clone, Copy)]
pub struct StaticProfiles {
    profile: ConsumptionProfile,
    capacity: Option<f64>,
}

impl StaticProfiles {
    /// Provider answering every lookup with `profile`
    pub fn new(profile: ConsumptionProfile) -> Self {
        Self { profile, capacity: None }
    }

    /// Also answer tank capacity lookups with `litres`
    pub fn with_capacity(mut self, litres: f64) -> Self {
        self.capacity = Some(litres);
        self
    }
}

impl ProfileProvider for StaticProfiles {
    fn consumption_profile(&self, _device: DeviceId) -> DetectionResult<ConsumptionProfile> {
        Ok(self.profile)
    }

    fn tank_capacity(&self, _device: DeviceId, _sensor: SensorId) -> Option<f64> {
        self.capacity
    }
}

/// Provider that knows no devices; every lookup is `ProfileNotFound`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfiles;

impl ProfileProvider for NoProfiles {
    fn consumption_profile(&self, device: DeviceId) -> DetectionResult<ConsumptionProfile> {
        Err(crate::errors::DetectionError::ProfileNotFound { device })
    }

    fn tank_capacity(&self, _device: DeviceId, _sensor: SensorId) -> Option<f64> {
        None
    }
}

/// Writer that drops flags on the floor
///
/// For deployments that only consume the decision trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutlierWriter;

impl OutlierWriter for NullOutlierWriter {
    fn persist_outlier_flag(&mut self, _reading: &Reading, _field: &FieldName)
        -> Result<(), WriteError> {
        Ok(())
    }
}

/// Recording writer for tests: captures every persisted flag, optionally
/// failing each write to exercise the swallow path
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct RecordingOutlierWriter {
    flagged: std::vec::Vec<(DeviceId, crate::time::Timestamp)>,
    fail_writes: bool,
}

#[cfg(feature = "std")]
impl RecordingOutlierWriter {
    /// Writer that accepts and records every write
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail
    pub fn failing() -> Self {
        Self { flagged: std::vec::Vec::new(), fail_writes: true }
    }

    /// Device/timestamp pairs of readings persisted so far
    pub fn flagged(&self) -> &[(DeviceId, crate::time::Timestamp)] {
        &self.flagged
    }
}

#[cfg(feature = "std")]
impl OutlierWriter for RecordingOutlierWriter {
    fn persist_outlier_flag(&mut self, reading: &Reading, _field: &FieldName)
        -> Result<(), WriteError> {
        if self.fail_writes {
            return Err(WriteError::Unavailable);
        }
        self.flagged.push((reading.device_id, reading.device_time));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_profiles_answer_everything() {
        let provider = StaticProfiles::new(ConsumptionProfile::default()).with_capacity(200.0);

        assert!(provider.consumption_profile(1).is_ok());
        assert!(provider.consumption_profile(9999).is_ok());
        assert_eq!(provider.tank_capacity(1, 2), Some(200.0));
    }

    #[test]
    fn no_profiles_is_typed_not_found() {
        use crate::errors::DetectionError;

        let provider = NoProfiles;
        assert_eq!(
            provider.consumption_profile(42),
            Err(DetectionError::ProfileNotFound { device: 42 })
        );
    }

    #[test]
    fn recording_writer_captures_and_fails() {
        let reading = Reading::new(3, 500);
        let field = FieldName::new("fuel_outlier").unwrap();

        let mut writer = RecordingOutlierWriter::new();
        writer.persist_outlier_flag(&reading, &field).unwrap();
        assert_eq!(writer.flagged(), &[(3, 500)]);

        let mut failing = RecordingOutlierWriter::failing();
        assert!(failing.persist_outlier_flag(&reading, &field).is_err());
        assert!(failing.flagged().is_empty());
    }
}
