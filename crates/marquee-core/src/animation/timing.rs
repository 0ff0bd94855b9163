//! L4 Atomic Layer: Time calculation utilities

use std::time::Duration;

/// Fraction of `duration` covered by `elapsed`, clamped to [0, 1]
#[inline]
pub fn fraction(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Advance a looping progress value by `delta` loops, wrapping into [0, 1)
/// in both directions
#[inline]
pub fn wrap_progress(progress: f64, delta: f64) -> f64 {
    let next = (progress + delta).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if next >= 1.0 {
        0.0
    } else {
        next
    }
}
