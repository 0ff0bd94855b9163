//! Deterministic in-memory host
//!
//! Implements every collaborator trait over a virtual document, a virtual
//! clock and a simulated viewport. The preview UI, the scenario runner and
//! the integration tests all drive the widget through it.

mod document;
mod engine;
mod host;

pub use document::{SimDocument, SimNode};
pub use engine::{SimEngine, SimTimeline, TIME_SCALE_TWEEN};
pub use host::{SimHost, SimPage};
