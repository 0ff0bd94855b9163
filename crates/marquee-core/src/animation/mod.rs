//! Looping strip animation
//!
//! # Layers
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing curves for time-scale tweens
//! - `timing` - Progress wrapping and interpolation
//!
//! ## L3 Molecular Layer
//! - `director` - Owns the single timeline and its playback state

// L4 Atomic Layer
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod director;

pub use director::{AnimationDirector, PlaybackState};
pub use easing::Easing;
