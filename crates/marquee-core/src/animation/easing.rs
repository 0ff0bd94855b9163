//! L4 Atomic Layer: Pure easing functions
//!
//! Maps input [0, 1] to output [0, 1]. The strip itself always moves
//! linearly; curves only shape time-scale changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// f(t) = t
    Linear,
    /// Quadratic ease-out, the default for property tweens
    #[default]
    Power1Out,
    /// Cubic ease-out
    Power2Out,
}

impl Easing {
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power1Out => quad_ease_out(t),
            Easing::Power2Out => cubic_ease_out(t),
        }
    }
}

/// f(t) = 1 - (1-t)²
#[inline]
fn quad_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv
}

/// f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}
