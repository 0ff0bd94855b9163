//! Viewport conditions
//!
//! A `MediaQuery` is a single predicate over the viewport. The widget never
//! evaluates queries itself; a `ConditionMatcher` does. `Viewport::matches`
//! is the reference evaluation used by the in-memory host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary pointing device precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Mouse, trackpad, stylus
    #[default]
    Fine,
    /// Touch
    Coarse,
}

impl PointerKind {
    pub fn toggled(self) -> Self {
        match self {
            PointerKind::Fine => PointerKind::Coarse,
            PointerKind::Coarse => PointerKind::Fine,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PointerKind::Fine => "fine",
            PointerKind::Coarse => "coarse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// A single viewport predicate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MediaQuery {
    /// Empty expression, always satisfied
    #[default]
    Always,
    /// Viewport width at most this many px
    MaxWidth(f64),
    /// Viewport width at least this many px
    MinWidth(f64),
    /// Some available pointer has this precision
    AnyPointer(PointerKind),
    Orientation(Orientation),
}

impl MediaQuery {
    /// Offset subtracted from a max-width breakpoint so the breakpoint
    /// value itself belongs to the min-width side.
    pub const MAX_WIDTH_EPSILON: f64 = 0.02;

    /// Upper-bound breakpoint for `max` px
    pub fn below(max: f64) -> Self {
        MediaQuery::MaxWidth(max - Self::MAX_WIDTH_EPSILON)
    }

    /// Lower-bound breakpoint for `min` px
    pub fn at_least(min: f64) -> Self {
        MediaQuery::MinWidth(min)
    }

    pub fn is_always(&self) -> bool {
        matches!(self, MediaQuery::Always)
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaQuery::Always => Ok(()),
            MediaQuery::MaxWidth(px) => write!(f, "(max-width: {}px)", px),
            MediaQuery::MinWidth(px) => write!(f, "(min-width: {}px)", px),
            MediaQuery::AnyPointer(kind) => write!(f, "(any-pointer: {})", kind.as_str()),
            MediaQuery::Orientation(o) => write!(f, "(orientation: {})", o.as_str()),
        }
    }
}

/// Snapshot of the viewport a query is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pointer: PointerKind,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pointer: PointerKind) -> Self {
        Self {
            width,
            height,
            pointer,
        }
    }

    /// Portrait when the viewport is at least as tall as it is wide
    pub fn orientation(&self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    pub fn matches(&self, query: &MediaQuery) -> bool {
        match *query {
            MediaQuery::Always => true,
            MediaQuery::MaxWidth(px) => self.width <= px,
            MediaQuery::MinWidth(px) => self.width >= px,
            MediaQuery::AnyPointer(kind) => self.pointer == kind,
            MediaQuery::Orientation(o) => self.orientation() == o,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0, PointerKind::Fine)
    }
}
