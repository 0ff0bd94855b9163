//! L4 Atomic Layer: scroll-reactive direction
//!
//! Tracks the sign of successive page scroll deltas and reports when it
//! flips. Equal consecutive offsets count as "not forward": only a strictly
//! greater offset yields +1.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollReverseController {
    last_offset: f64,
    current_sign: f64,
}

impl Default for ScrollReverseController {
    fn default() -> Self {
        Self {
            last_offset: 0.0,
            current_sign: 1.0,
        }
    }
}

impl ScrollReverseController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one scroll sample. Returns the new playback sign when it differs
    /// from the current one.
    pub fn observe(&mut self, offset: f64) -> Option<f64> {
        let sign = if offset > self.last_offset { 1.0 } else { -1.0 };
        self.last_offset = offset;

        if sign == self.current_sign {
            return None;
        }

        debug!(offset, sign, "Scroll direction flipped");
        self.current_sign = sign;
        Some(sign)
    }

    pub fn current_sign(&self) -> f64 {
        self.current_sign
    }

    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }
}
