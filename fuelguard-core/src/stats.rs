//! Window Statistics for Batch Classification
//!
//! ## Overview
//!
//! Pure helpers over an ordered slice of calibrated fuel values. The
//! detector splits each batch at the midpoint `m = (n-1)/2` and compares
//! the mean of the left half against the mean of an equal-width window
//! starting at `m`; a large difference means the level is moving.
//!
//! ## Window arithmetic
//!
//! ```text
//! n = 5:  values [a b c d e]   m = 2
//!         left  = mean(a b c)        indices [0, m]
//!         right = mean(c d e)        indices [m, 2m]
//!
//! n = 4:  values [a b c d]     m = 1
//!         left  = mean(a b)          indices [0, m]
//!         right = mean(b c)          indices [m, 2m]  <- d never enters
//! ```
//!
//! For even-length batches the right window stops at `2m = n-2`, so the
//! final element is ignored by the means (though it still participates in
//! medians and the activity window). `2m <= n-1` holds for every `n`, so
//! the window is always in bounds. This asymmetry is pinned by tests and
//! by the integration suite; callers should prefer odd batch sizes.
//!
//! Medians use the lower-median convention: sort ascending, take index
//! `(len-1)/2`. For the skewed sample windows the engine sees, the lower
//! median tracks the pre-event plateau better than an interpolated one.

use heapless::Vec;

/// Maximum batch size the engine evaluates in one call
///
/// Bounds the median scratch buffer; upstream batching uses single-digit
/// batch sizes, so 32 leaves generous headroom.
pub const MAX_BATCH_READINGS: usize = 32;

/// Midpoint index used for all window splits: `(n - 1) / 2`
pub const fn midpoint(len: usize) -> usize {
    if len == 0 { 0 } else { (len - 1) / 2 }
}

/// Mean of `values[start..=end]`; `None` on empty or out-of-range input
pub fn mean_of(values: &[f64], start: usize, end: usize) -> Option<f64> {
    if start > end || end >= values.len() {
        return None;
    }

    let window = &values[start..=end];
    let sum: f64 = window.iter().sum();
    Some(sum / window.len() as f64)
}

/// Left and right half-window means around the midpoint
///
/// Left covers `[0, m]`, right covers `[m, 2m]` (equal width, midpoint
/// shared). Always in bounds; `None` only for an empty slice.
pub fn half_window_means(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let m = midpoint(values.len());
    let left = mean_of(values, 0, m)?;
    let right = mean_of(values, m, 2 * m)?;
    Some((left, right))
}

/// Lower median of `values[start..end)` (half-open, matching slicing)
///
/// Sorts a copy ascending and takes index `(len - 1) / 2`: the smaller of
/// the two central values for even-length ranges. `None` on empty range,
/// bad bounds, or a range wider than [`MAX_BATCH_READINGS`].
pub fn median_of(values: &[f64], start: usize, end: usize) -> Option<f64> {
    if start >= end || end > values.len() {
        return None;
    }

    let mut sorted: Vec<f64, MAX_BATCH_READINGS> = Vec::new();
    for value in &values[start..end] {
        sorted.push(*value).ok()?;
    }

    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    sorted.get((sorted.len() - 1) / 2).copied()
}

/// Acceptance band for the post-event outlier pass
///
/// The band spans the event's level travel, padded by the activity
/// threshold on both sides. Fills travel upward (start low, end high),
/// drains downward, hence the asymmetric pairing.
pub fn outlier_band(is_fill: bool, start_level: f64, end_level: f64, threshold: f64) -> (f64, f64) {
    if is_fill {
        (start_level - threshold, end_level + threshold)
    } else {
        (end_level - threshold, start_level + threshold)
    }
}
