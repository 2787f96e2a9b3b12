//! Decision Trace for Detection Runs
//!
//! ## Overview
//!
//! Every judgement the engine makes - threshold comparisons, envelope
//! opens and closes, confirmations, rejections, outlier flags - is
//! emitted as a structured [`DetectionEvent`] to a caller-supplied
//! [`DecisionSink`]. Diagnostic detail lives on the events themselves
//! instead of in formatted log strings, so tests assert on decisions and
//! production sinks forward them to whatever observability stack the
//! deployment runs.
//!
//! A detector wired with [`NullSink`] pays one match-and-discard per
//! decision and nothing else.

use crate::activity::FuelActivityKind;
use crate::reading::DeviceId;
use crate::store::EventKey;
use crate::time::Timestamp;

/// One engine decision, with the inputs that drove it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionEvent {
    /// The per-batch mean comparison against the device threshold
    ThresholdEvaluated {
        /// Device sensor being evaluated
        key: EventKey,
        /// Absolute difference between the half-window means
        diff_in_means: f64,
        /// Device activity threshold the difference was compared to
        threshold: f64,
        /// Was a candidate event already in flight for this key?
        tracking: bool,
    },

    /// A candidate envelope opened
    ActivityStarted {
        /// Device sensor the envelope belongs to
        key: EventKey,
        /// Median fuel level of the opening half-window
        start_level: f64,
        /// Raw fuel value of the batch's first reading (diagnostic)
        error_check_start: f64,
        /// Device time of the opening batch's midpoint reading
        start_time: Timestamp,
    },

    /// A batch merged into an open envelope's window
    WindowMerged {
        /// Device sensor the envelope belongs to
        key: EventKey,
        /// Readings actually appended after deduplication
        appended: usize,
        /// Window size after the merge
        window_len: usize,
    },

    /// The envelope closed; volume is known but not yet validated
    ActivityClosed {
        /// Device sensor the envelope belongs to
        key: EventKey,
        /// Median fuel level of the closing half-window
        end_level: f64,
        /// Raw fuel value of the batch's last reading (diagnostic)
        error_check_end: f64,
        /// Device time of the closing batch's midpoint reading
        end_time: Timestamp,
        /// End median minus start median
        change_volume: f64,
        /// Raw end minus raw start, for comparison against the medians
        error_check_change: f64,
    },

    /// The closed event survived consumption validation
    EventConfirmed {
        /// Device sensor the event belongs to
        key: EventKey,
        /// Confirmed kind, fill or drain
        kind: FuelActivityKind,
        /// Signed event volume in litres
        change_volume: f64,
    },

    /// The closed event was ordinary burn; no activity reported
    EventRejected {
        /// Device sensor the candidate belonged to
        key: EventKey,
        /// Signed level change that was explained away
        change_volume: f64,
    },

    /// A window reading fell outside the event's acceptance band
    OutlierFlagged {
        /// Device sensor the event belongs to
        key: EventKey,
        /// Device time of the outlier reading
        device_time: Timestamp,
        /// Fuel value that fell outside the band
        value: f64,
        /// Lower edge of the acceptance band
        min_bound: f64,
        /// Upper edge of the acceptance band
        max_bound: f64,
    },

    /// Best-effort outlier persistence failed (logged, never propagated)
    OutlierPersistFailed {
        /// Device sensor the event belongs to
        key: EventKey,
        /// Device time of the reading whose flag was lost
        device_time: Timestamp,
    },

    /// Gap analysis ran; `kind` is `None` when nothing was concluded
    GapEvaluated {
        /// Device the gap belongs to
        device: DeviceId,
        /// Signed fuel level change across the gap
        actual_change: f64,
        /// Estimated kind, or `None`
        kind: FuelActivityKind,
    },
}

/// Receiver for engine decisions
pub trait DecisionSink {
    /// Accept one decision; called in emission order
    fn record(&mut self, event: DetectionEvent);
}

/// Discards every decision
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DecisionSink for NullSink {
    fn record(&mut self, _event: DetectionEvent) {}
}

/// Buffers decisions in memory for assertions and debugging
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct MemorySink {
    events: std::vec::Vec<DetectionEvent>,
}

#[cfg(feature = "std")]
impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded decisions in emission order
    pub fn events(&self) -> &[DetectionEvent] {
        &self.events
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(feature = "std")]
impl DecisionSink for MemorySink {
    fn record(&mut self, event: DetectionEvent) {
        self.events.push(event);
    }
}
