//! Telemetry Reading Model
//!
//! ## Overview
//!
//! A [`Reading`] is one position report from a vehicle tracker: the device
//! it came from, the device-side timestamp, and a small bag of named
//! attributes. Upstream decoding has already calibrated the raw fuel probe
//! value into a linear litre scale, so the engine only ever sees calibrated
//! attributes.
//!
//! ## Why a bounded attribute map?
//!
//! The upstream system stores attributes as an open `string -> value` map
//! and reads them back with unchecked casts. Here the map is:
//!
//! - **Bounded**: `heapless::FnvIndexMap` with a fixed slot count, so a
//!   reading has a known worst-case size and works without `std`.
//! - **Typed**: values are [`AttributeValue`] variants; accessors return
//!   `Option` instead of casting, and absence is an explicit outcome the
//!   caller must handle.
//! - **Keyed inline**: [`FieldName`] stores the attribute name inline
//!   (no heap), mirroring how sensor configs name their fields.
//!
//! Which attribute holds the calibrated fuel level is *configuration*, not
//! a hardcoded name - see `SensorConfig::fuel_level` for the typed
//! accessor keyed by sensor config.

use core::fmt;

use heapless::FnvIndexMap;

use crate::time::Timestamp;

/// Device identifier as assigned by the ingestion layer
pub type DeviceId = u64;

/// Peripheral sensor identifier, unique within a device
pub type SensorId = u32;

/// Maximum length of an inline attribute name
pub const MAX_FIELD_NAME: usize = 15;

/// Attribute slots per reading
///
/// Position reports carry a handful of attributes each; eight slots cover
/// the fuel fields, odometer and flags with headroom.
pub const MAX_ATTRIBUTES: usize = 8;

/// Well-known attribute: cumulative odometer in meters
pub const TOTAL_DISTANCE: &str = "total_distance";

/// Inline, copyable attribute name
///
/// Avoids heap allocation for the short field names sensor configs use
/// ("fuel_calibrated", "fuel_outlier", ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldName {
    len: u8,
    data: [u8; MAX_FIELD_NAME],
}

impl FieldName {
    /// Create from a string slice; `None` if longer than [`MAX_FIELD_NAME`]
    pub fn new(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_FIELD_NAME {
            return None;
        }

        let mut data = [0u8; MAX_FIELD_NAME];
        data[..bytes.len()].copy_from_slice(bytes);

        Some(Self {
            len: bytes.len() as u8,
            data,
        })
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        // Only valid UTF-8 enters through new()
        core::str::from_utf8(&self.data[..self.len as usize])
            .unwrap_or("")
    }
}

impl fmt::Debug for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

/// Typed attribute value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    /// Numeric attribute (fuel litres, odometer meters, ...)
    Float(f64),
    /// Boolean attribute (outlier flag, ignition, ...)
    Flag(bool),
}

/// Bounded attribute map carried by each reading
pub type AttributeMap = FnvIndexMap<FieldName, AttributeValue, MAX_ATTRIBUTES>;

/// One position report from a device
///
/// Immutable from the engine's point of view except for the outlier flag,
/// which the detector sets on its own working copy before requesting an
/// external persistence update.
#[derive(Debug, Clone)]
pub struct Reading {
    /// Device that produced this reading
    pub device_id: DeviceId,
    /// Device-side timestamp in milliseconds
    pub device_time: Timestamp,
    /// Named attribute values
    attributes: AttributeMap,
}

impl Reading {
    /// Create a reading with no attributes
    pub fn new(device_id: DeviceId, device_time: Timestamp) -> Self {
        Self {
            device_id,
            device_time,
            attributes: AttributeMap::new(),
        }
    }

    /// Builder-style float attribute; silently ignored when out of slots
    /// or the name is too long (both indicate a fixture bug, caught by
    /// the absence checks downstream)
    pub fn with_float(mut self, name: &str, value: f64) -> Self {
        self.set_float(name, value);
        self
    }

    /// Builder-style flag attribute
    pub fn with_flag(mut self, name: &str, value: bool) -> Self {
        self.set_flag(name, value);
        self
    }

    /// Set a float attribute; returns false if it could not be stored
    pub fn set_float(&mut self, name: &str, value: f64) -> bool {
        match FieldName::new(name) {
            Some(key) => self.attributes.insert(key, AttributeValue::Float(value)).is_ok(),
            None => false,
        }
    }

    /// Set a flag attribute; returns false if it could not be stored
    pub fn set_flag(&mut self, name: &str, value: bool) -> bool {
        match FieldName::new(name) {
            Some(key) => self.attributes.insert(key, AttributeValue::Flag(value)).is_ok(),
            None => false,
        }
    }

    /// Typed float lookup; `None` when absent or not a float
    pub fn float(&self, name: &FieldName) -> Option<f64> {
        match self.attributes.get(name) {
            Some(AttributeValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Typed flag lookup; `None` when absent or not a flag
    pub fn flag(&self, name: &FieldName) -> Option<bool> {
        match self.attributes.get(name) {
            Some(AttributeValue::Flag(v)) => Some(*v),
            _ => None,
        }
    }

    /// Cumulative odometer in meters, when the tracker reports one
    pub fn total_distance(&self) -> Option<f64> {
        let key = FieldName::new(TOTAL_DISTANCE)?;
        self.float(&key)
    }
}
