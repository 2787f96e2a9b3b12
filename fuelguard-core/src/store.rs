//! Event State Store and Candidate-Event Metadata
//!
//! ## Overview
//!
//! The only mutable state in the engine lives here: at most one in-flight
//! [`EventMetadata`] per `(device, sensor)` key, held between detector
//! calls while a candidate event's threshold envelope is open.
//!
//! The store is owned by the device-processing context and injected into
//! every detector call. Nothing in the engine is process-global: drop the
//! store and all candidate state for its devices disappears with it.
//!
//! ## Lifecycle invariant
//!
//! One threshold-crossing envelope produces exactly one metadata
//! lifecycle: created when the difference-in-means first rises above the
//! device threshold, mutated by every subsequent batch for that key, and
//! removed exactly once when the difference falls back below - whether or
//! not the closed event survives consumption validation.
//!
//! ## The activity window
//!
//! [`ActivityWindow`] is an insertion-ordered dedup set of the readings
//! spanned by the candidate event, kept so the detector can re-examine
//! individual points once the event boundary is known. Consecutive
//! batches overlap, so `merge` appends only readings whose device time
//! has not been seen; merging the same batch twice is a no-op. Within one
//! `(device, sensor)` key the device time identifies a reading.
//!
//! The window saturates at capacity rather than failing: a close must
//! never abort half-way through its state transition, so an over-long
//! event keeps its earliest readings and counts the rest as dropped.

use heapless::{FnvIndexMap, Vec};

use crate::errors::{DetectionError, DetectionResult};
use crate::reading::{DeviceId, Reading, SensorId};
use crate::time::Timestamp;

/// Maximum readings retained per candidate event
pub const MAX_ACTIVITY_WINDOW: usize = 64;

/// Maximum concurrently tracked `(device, sensor)` keys per store
pub const MAX_TRACKED_KEYS: usize = 16;

/// Key identifying one fuel sensor on one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKey {
    /// Device the sensor is mounted on
    pub device: DeviceId,
    /// Sensor identity within the device
    pub sensor: SensorId,
}

impl EventKey {
    /// Key for one fuel sensor on one device
    pub const fn new(device: DeviceId, sensor: SensorId) -> Self {
        Self { device, sensor }
    }
}

/// Insertion-ordered dedup set of readings spanned by a candidate event
#[derive(Debug, Clone, Default)]
pub struct ActivityWindow {
    readings: Vec<Reading, MAX_ACTIVITY_WINDOW>,
    dropped: u32,
}

impl ActivityWindow {
    /// Empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Union-merge a batch into the window
    ///
    /// Appends, in batch order, only readings whose device time is not
    /// already present. Returns how many were appended. Idempotent:
    /// merging the same batch again appends nothing.
    pub fn merge(&mut self, batch: &[Reading]) -> usize {
        let mut appended = 0;
        for reading in batch {
            if self.contains_time(reading.device_time) {
                continue;
            }
            if self.readings.push(reading.clone()).is_ok() {
                appended += 1;
            } else {
                self.dropped = self.dropped.saturating_add(1);
            }
        }
        appended
    }

    fn contains_time(&self, device_time: Timestamp) -> bool {
        self.readings.iter().any(|r| r.device_time == device_time)
    }

    /// Readings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Number of buffered readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when nothing has been merged yet
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings discarded because the window was at capacity
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Mutable bookkeeping for one in-flight candidate event
///
/// Start fields are fixed at creation; end fields are filled when the
/// envelope closes. The `error_check_*` pair carries the raw boundary
/// fuel values for diagnostics only - medians, not raw values, decide
/// the event volume.
#[derive(Debug, Clone)]
pub struct EventMetadata {
    /// Median of the left half-window at event start (litres)
    pub start_level: f64,
    /// Median of the right half-window at event end (litres)
    pub end_level: f64,
    /// Device time of the opening batch's midpoint reading
    pub start_time: Timestamp,
    /// Device time of the closing batch's midpoint reading
    pub end_time: Timestamp,
    /// Midpoint reading of the opening batch
    pub start_reading: Reading,
    /// Midpoint reading of the closing batch, set at close
    pub end_reading: Option<Reading>,
    /// Raw fuel value of the first reading of the opening batch
    pub error_check_start: f64,
    /// Raw fuel value of the last reading of the closing batch
    pub error_check_end: f64,
    /// Readings spanned by the candidate event
    pub window: ActivityWindow,
}

impl EventMetadata {
    /// Metadata for a freshly opened envelope
    pub fn opened(start_level: f64, error_check_start: f64, start_reading: Reading) -> Self {
        let start_time = start_reading.device_time;
        Self {
            start_level,
            end_level: 0.0,
            start_time,
            end_time: 0,
            start_reading,
            end_reading: None,
            error_check_start,
            error_check_end: 0.0,
            window: ActivityWindow::new(),
        }
    }
}

/// Per-context store of in-flight candidate events
///
/// Thin wrapper over a fixed-capacity map; the wrapper exists so the
/// lifecycle operations have names (`open`, `close`) instead of being ad
/// hoc map calls scattered through the detector.
#[derive(Debug, Default)]
pub struct EventStateStore {
    entries: FnvIndexMap<EventKey, EventMetadata, MAX_TRACKED_KEYS>,
}

impl EventStateStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Is a candidate event in flight for this key?
    pub fn contains(&self, key: &EventKey) -> bool {
        self.entries.contains_key(key)
    }

    /// In-flight metadata for this key
    pub fn get_mut(&mut self, key: &EventKey) -> Option<&mut EventMetadata> {
        self.entries.get_mut(key)
    }

    /// Open a candidate event for `key`
    ///
    /// Typed `StoreFull` when too many keys are already tracked; an
    /// existing entry for the same key is replaced (callers check
    /// `contains` first - replacement only happens on caller bugs, and
    /// replacing keeps the one-live-entry invariant either way).
    pub fn open(&mut self, key: EventKey, metadata: EventMetadata) -> DetectionResult<()> {
        self.entries
            .insert(key, metadata)
            .map(|_| ())
            .map_err(|_| DetectionError::StoreFull { capacity: MAX_TRACKED_KEYS })
    }

    /// Close the envelope for `key`, removing and returning its metadata
    pub fn close(&mut self, key: &EventKey) -> Option<EventMetadata> {
        self.entries.remove(key)
    }

    /// Number of in-flight candidate events
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no candidate event is in flight
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(t: Timestamp) -> Reading {
        Reading::new(1, t).with_float("fuel_calibrated", 50.0)
    }

    #[test]
    fn window_merge_dedups_by_time() {
        let mut window = ActivityWindow::new();
        let first = [reading(0), reading(60_000), reading(120_000)];
        let overlapping = [reading(60_000), reading(120_000), reading(180_000)];

        assert_eq!(window.merge(&first), 3);
        assert_eq!(window.merge(&overlapping), 1);
        assert_eq!(window.len(), 4);

        // Insertion order preserved
        let times: std::vec::Vec<_> = window.iter().map(|r| r.device_time).collect();
        assert_eq!(times, vec![0, 60_000, 120_000, 180_000]);
    }

    #[test]
    fn window_merge_is_idempotent() {
        let batch = [reading(0), reading(60_000)];

        let mut once = ActivityWindow::new();
        once.merge(&batch);

        let mut twice = ActivityWindow::new();
        twice.merge(&batch);
        assert_eq!(twice.merge(&batch), 0);

        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn window_saturates_with_drop_count() {
        let mut window = ActivityWindow::new();
        for i in 0..(MAX_ACTIVITY_WINDOW as u64 + 5) {
            window.merge(&[reading(i * 1000)]);
        }

        assert_eq!(window.len(), MAX_ACTIVITY_WINDOW);
        assert_eq!(window.dropped(), 5);
    }

    #[test]
    fn store_lifecycle() {
        let mut store = EventStateStore::new();
        let key = EventKey::new(7, 1);

        assert!(!store.contains(&key));

        let metadata = EventMetadata::opened(50.0, 50.0, reading(120_000));
        store.open(key, metadata).unwrap();
        assert!(store.contains(&key));
        assert_eq!(store.len(), 1);

        let closed = store.close(&key).unwrap();
        assert_eq!(closed.start_level, 50.0);
        assert_eq!(closed.start_time, 120_000);

        // Removed exactly once; a second close finds nothing
        assert!(store.close(&key).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn store_full_is_typed() {
        let mut store = EventStateStore::new();
        for i in 0..MAX_TRACKED_KEYS as u64 {
            store
                .open(EventKey::new(i, 0), EventMetadata::opened(0.0, 0.0, reading(0)))
                .unwrap();
        }

        let overflow = store.open(
            EventKey::new(999, 0),
            EventMetadata::opened(0.0, 0.0, reading(0)),
        );
        assert_eq!(
            overflow.unwrap_err(),
            DetectionError::StoreFull { capacity: MAX_TRACKED_KEYS }
        );
    }
}
