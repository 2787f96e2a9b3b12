//! Fuel Activity Detector
//!
//! ## Overview
//!
//! The stateful heart of the engine. Each call takes one time-ordered
//! batch of readings for a single device sensor and classifies it as the
//! start, continuation, or end of a fuel-level activity by comparing
//! sliding half-window means against the device's activity threshold:
//!
//! ```text
//!          diff-in-means
//!               ^
//!     threshold |........*----*----*........    * = batch evaluations
//!               |       /               \
//!               |  ----*                 *----
//!               +-------------------------------> time
//!                      open    extend    close
//! ```
//!
//! Crossing above the threshold opens a candidate envelope in the
//! [`EventStateStore`]; batches inside the envelope extend its activity
//! window; falling back below closes it. Only at close does the engine
//! decide anything: the level change between the start and end medians is
//! validated against the expected-consumption model, and ordinary engine
//! burn is rejected as a false positive. Confirmed events then get a
//! retroactive outlier pass over the buffered window.
//!
//! ## Ordering contract
//!
//! Calls for one `(device, sensor)` key must be strictly ordered - the
//! algorithm accumulates window state across calls. Different keys are
//! independent; run one detector per device pipeline or serialize per
//! key. A single call is a bounded in-memory computation; the only I/O
//! is the best-effort outlier persistence at close.

use libm::fabs;

use crate::activity::{FuelActivity, FuelActivityKind};
use crate::config::SensorConfig;
use crate::consumption::{is_change_explained, ExpectedConsumption};
use crate::errors::{DetectionError, DetectionResult};
use crate::events::{DecisionSink, DetectionEvent, NullSink};
use crate::reading::Reading;
use crate::stats::{self, MAX_BATCH_READINGS};
use crate::store::{EventKey, EventMetadata, EventStateStore};
use crate::traits::{OutlierWriter, ProfileProvider};

// Optional logging, compiled out without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Stateful per-batch fuel activity detector
///
/// Owns its collaborator seams: the profile/capacity resolver, the
/// best-effort outlier writer, and the decision sink. The event state
/// store is *not* owned - the caller's device-processing context owns it
/// and injects it into every call.
pub struct ActivityDetector<P, W, D = NullSink> {
    profiles: P,
    outliers: W,
    decisions: D,
}

impl<P, W> ActivityDetector<P, W, NullSink>
where
    P: ProfileProvider,
    W: OutlierWriter,
{
    /// Detector without a decision trace
    pub fn new(profiles: P, outliers: W) -> Self {
        Self::with_decisions(profiles, outliers, NullSink)
    }
}

impl<P, W, D> ActivityDetector<P, W, D>
where
    P: ProfileProvider,
    W: OutlierWriter,
    D: DecisionSink,
{
    /// Detector emitting its decisions to `decisions`
    pub fn with_decisions(profiles: P, outliers: W, decisions: D) -> Self {
        Self { profiles, outliers, decisions }
    }

    /// The decision sink, for asserting on recorded decisions
    pub fn decisions(&self) -> &D {
        &self.decisions
    }

    /// The outlier writer, for inspecting persisted flags
    pub fn outlier_writer(&self) -> &W {
        &self.outliers
    }

    /// Classify one batch of readings for a single device sensor
    ///
    /// The batch must be non-empty, time-ordered, single-device, and
    /// every reading must carry the calibrated fuel attribute named by
    /// `sensor` - violations are typed errors, not recoverable
    /// conditions, because they indicate ingestion bugs. An unknown
    /// device skips the batch with `ProfileNotFound` and leaves all
    /// state untouched.
    ///
    /// Returns the NONE sentinel unless this batch closed an envelope
    /// whose level change survived consumption validation.
    pub fn check_for_activity(
        &mut self,
        batch: &[Reading],
        store: &mut EventStateStore,
        sensor: &SensorConfig,
    ) -> DetectionResult<FuelActivity> {
        if batch.is_empty() {
            return Err(DetectionError::EmptyBatch);
        }
        if batch.len() > MAX_BATCH_READINGS {
            return Err(DetectionError::BatchTooLarge {
                max: MAX_BATCH_READINGS,
                actual: batch.len(),
            });
        }

        // Fail fast on a missing fuel attribute before touching any state
        let mut values: heapless::Vec<f64, MAX_BATCH_READINGS> = heapless::Vec::new();
        for (index, reading) in batch.iter().enumerate() {
            let value = sensor
                .fuel_level(reading)
                .ok_or(DetectionError::MissingFuelField { index })?;
            // Length already bounds-checked above
            let _ = values.push(value);
        }

        let device = batch[0].device_id;
        let profile = self.profiles.consumption_profile(device)?;
        let threshold = profile.activity_threshold;
        let key = EventKey::new(device, sensor.sensor_id);

        let m = stats::midpoint(batch.len());
        let Some((left_mean, right_mean)) = stats::half_window_means(&values) else {
            return Ok(FuelActivity::none());
        };
        let diff_in_means = fabs(left_mean - right_mean);

        let tracking = store.contains(&key);
        self.decisions.record(DetectionEvent::ThresholdEvaluated {
            key,
            diff_in_means,
            threshold,
            tracking,
        });

        if diff_in_means > threshold {
            if !tracking {
                self.open_envelope(key, batch, &values, m, store)?;
            } else if let Some(metadata) = store.get_mut(&key) {
                // Between start and end of the envelope: extend the window
                let appended = metadata.window.merge(batch);
                let window_len = metadata.window.len();
                self.decisions.record(DetectionEvent::WindowMerged { key, appended, window_len });
            }
        }

        if diff_in_means < threshold && store.contains(&key) {
            return self.close_envelope(key, batch, &values, m, store, sensor, &profile);
        }

        Ok(FuelActivity::none())
    }

    /// First threshold crossing for this key: record the start boundary
    /// and seed the activity window with the full batch
    fn open_envelope(
        &mut self,
        key: EventKey,
        batch: &[Reading],
        values: &[f64],
        m: usize,
        store: &mut EventStateStore,
    ) -> DetectionResult<()> {
        let Some(start_level) = stats::median_of(values, 0, m + 1) else {
            return Ok(());
        };
        let error_check_start = values[0];

        let mut metadata = EventMetadata::opened(start_level, error_check_start, batch[m].clone());
        let appended = metadata.window.merge(batch);
        let window_len = metadata.window.len();
        let start_time = metadata.start_time;

        // The trace must only report envelopes the store actually tracks
        store.open(key, metadata)?;

        self.decisions.record(DetectionEvent::ActivityStarted {
            key,
            start_level,
            error_check_start,
            start_time,
        });
        self.decisions.record(DetectionEvent::WindowMerged { key, appended, window_len });

        Ok(())
    }

    /// Falling below the threshold while tracked: close the envelope,
    /// validate against expected burn, and decide
    ///
    /// The metadata entry is removed exactly once regardless of outcome -
    /// a rejected close must not leave a stale envelope behind.
    #[allow(clippy::too_many_arguments)]
    fn close_envelope(
        &mut self,
        key: EventKey,
        batch: &[Reading],
        values: &[f64],
        m: usize,
        store: &mut EventStateStore,
        sensor: &SensorConfig,
        profile: &crate::config::ConsumptionProfile,
    ) -> DetectionResult<FuelActivity> {
        let Some(mut metadata) = store.close(&key) else {
            return Ok(FuelActivity::none());
        };

        let end_level = stats::median_of(values, m, values.len()).unwrap_or(values[m]);
        let end_reading = batch[m].clone();

        metadata.end_level = end_level;
        metadata.error_check_end = values[values.len() - 1];
        metadata.end_time = end_reading.device_time;
        metadata.end_reading = Some(end_reading.clone());
        metadata.window.merge(batch);

        let change_volume = metadata.end_level - metadata.start_level;
        let error_check_change = metadata.error_check_end - metadata.error_check_start;

        self.decisions.record(DetectionEvent::ActivityClosed {
            key,
            end_level,
            error_check_end: metadata.error_check_end,
            end_time: metadata.end_time,
            change_volume,
            error_check_change,
        });

        let capacity = self.profiles.tank_capacity(key.device, key.sensor);
        let explained = ExpectedConsumption::between(
            &metadata.start_reading,
            &end_reading,
            capacity,
            profile,
        )
        .map(|expected| is_change_explained(change_volume, &expected))
        .unwrap_or(false);

        let kind = if !explained && change_volume < 0.0 {
            FuelActivityKind::FuelDrain
        } else if !explained && change_volume > 0.0 {
            FuelActivityKind::FuelFill
        } else {
            // False-positive start: ordinary burn explains the change
            self.decisions.record(DetectionEvent::EventRejected { key, change_volume });
            return Ok(FuelActivity::none());
        };

        self.decisions.record(DetectionEvent::EventConfirmed { key, kind, change_volume });
        self.flag_outliers(key, kind, &metadata, profile.activity_threshold, sensor);

        Ok(FuelActivity {
            kind,
            change_volume,
            start_time: metadata.start_time,
            end_time: metadata.end_time,
            start_reading: Some(metadata.start_reading.clone()),
            end_reading: metadata.end_reading.clone(),
        })
    }

    /// Retroactive outlier pass over a confirmed event's window
    ///
    /// Readings outside the event's acceptance band get their outlier
    /// attribute set and persisted; in-band readings are left unmarked so
    /// write volume stays proportional to actual anomalies. Persistence
    /// failures are logged and recorded but never propagated.
    fn flag_outliers(
        &mut self,
        key: EventKey,
        kind: FuelActivityKind,
        metadata: &EventMetadata,
        threshold: f64,
        sensor: &SensorConfig,
    ) {
        let (min_bound, max_bound) = stats::outlier_band(
            kind == FuelActivityKind::FuelFill,
            metadata.start_level,
            metadata.end_level,
            threshold,
        );

        for reading in metadata.window.iter() {
            let Some(value) = sensor.fuel_level(reading) else {
                continue;
            };
            if value >= min_bound && value <= max_bound {
                continue;
            }

            self.decisions.record(DetectionEvent::OutlierFlagged {
                key,
                device_time: reading.device_time,
                value,
                min_bound,
                max_bound,
            });

            let mut flagged = reading.clone();
            flagged.set_flag(sensor.outlier_field.as_str(), true);

            if let Err(_err) = self.outliers.persist_outlier_flag(&flagged, &sensor.outlier_field) {
                log_warn!(
                    "outlier flag write failed for device {} at {}: {}",
                    key.device,
                    reading.device_time,
                    _err
                );
                self.decisions.record(DetectionEvent::OutlierPersistFailed {
                    key,
                    device_time: reading.device_time,
                });
            }
        }
    }
}
