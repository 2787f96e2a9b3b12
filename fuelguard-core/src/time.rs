//! Time primitives for telemetry intervals
//!
//! Device time arrives with each reading; the engine never consults a
//! clock of its own. All it needs is millisecond timestamps and
//! saturating interval arithmetic between them.

/// Timestamp in milliseconds since epoch, as reported by the device
pub type Timestamp = u64;

/// Milliseconds per hour, used for consumption-rate conversions
pub const MS_PER_HOUR: u64 = 3_600_000;

/// Interval between two timestamps in milliseconds
///
/// Saturates to zero when `later` precedes `earlier` - device clocks
/// occasionally step backwards and a negative interval is never useful.
pub fn delta_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Interval between two timestamps in fractional hours
pub fn elapsed_hours(earlier: Timestamp, later: Timestamp) -> f64 {
    delta_ms(earlier, later) as f64 / MS_PER_HOUR as f64
}
