//! Collaborator seams
//!
//! The widget never touches a document, an animation engine or a timer
//! directly. Everything it needs from its environment goes through the
//! traits in this module, and everything the environment reports back
//! arrives as a [`HostEvent`] handed to `Marquee::handle`.

use std::fmt;
use std::time::Duration;

use crate::media::MediaQuery;

macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle_id!(
    /// A child element of the widget's container
    NodeId
);
handle_id!(
    /// Animation handle owned by the engine
    TimelineId
);
handle_id!(
    /// Registration with the condition matcher
    WatchId
);
handle_id!(
    /// Registration with the visibility tracker
    ObserverId
);
handle_id!(
    /// Window-level event listener
    ListenerId
);
handle_id!(
    /// Pending one-shot timer
    TimerId
);

/// Inline style properties the widget writes on its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    TransformOrigin,
    Transform,
    MinHeight,
}

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::TransformOrigin => "transform-origin",
            StyleProperty::Transform => "transform",
            StyleProperty::MinHeight => "min-height",
        }
    }
}

/// Window-level event families the widget may listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Scroll,
    Resize,
    OrientationChange,
}

/// Bounding box crossing the viewport edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityEdge {
    /// Top edge crossed the viewport bottom while scrolling down
    Enter,
    /// Bottom edge crossed the viewport top while scrolling down
    Leave,
    /// Bottom edge crossed the viewport top while scrolling up
    EnterBack,
    /// Top edge crossed the viewport bottom while scrolling up
    LeaveBack,
}

impl VisibilityEdge {
    pub fn is_entering(self) -> bool {
        matches!(self, VisibilityEdge::Enter | VisibilityEdge::EnterBack)
    }
}

/// Everything the environment reports back to a widget
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ConditionChanged { query: MediaQuery, matches: bool },
    Scroll { offset: f64 },
    Resize,
    OrientationChanged { portrait: bool },
    Visibility(VisibilityEdge),
    TimerFired(TimerId),
}

/// The container element and its children
pub trait Surface {
    /// Children in document order
    fn children(&self) -> Vec<NodeId>;

    fn remove_child(&mut self, node: NodeId);

    /// Deep-clone `node` and append the copy as the last child
    fn append_clone(&mut self, node: NodeId) -> NodeId;

    /// Inner width of the container in px
    fn client_width(&self) -> f64;

    /// Measured width of a child in px
    fn node_width(&self, node: NodeId) -> f64;

    fn style(&self, property: StyleProperty) -> Option<String>;

    fn set_style(&mut self, property: StyleProperty, value: String);

    fn remove_style(&mut self, property: StyleProperty);
}

/// Parameters of the marquee's single looping tween
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSpec {
    pub targets: Vec<NodeId>,
    pub duration: Duration,
    /// Horizontal translation at the end of one loop, in percent of each
    /// target's own width
    pub x_percent: f64,
}

/// Timeline primitives
pub trait AnimationEngine {
    /// Create an infinitely repeating, linear timeline. The timeline runs
    /// until paused.
    fn create_loop(&mut self, spec: LoopSpec) -> TimelineId;

    fn set_will_change_transform(&mut self, targets: &[NodeId]);

    /// Drop every inline property the engine wrote on `targets`
    fn clear_props(&mut self, targets: &[NodeId]);

    fn set_time_scale(&mut self, timeline: TimelineId, scale: f64);

    /// Smoothly move the time scale to `scale`, replacing any running
    /// time-scale tween on the same timeline
    fn tween_time_scale(&mut self, timeline: TimelineId, scale: f64);

    /// Seek across all repeats, `progress` in [0, 1]
    fn set_total_progress(&mut self, timeline: TimelineId, progress: f64);

    fn pause(&mut self, timeline: TimelineId);

    fn resume(&mut self, timeline: TimelineId);

    /// Stop and dispose; unknown ids are ignored
    fn kill(&mut self, timeline: TimelineId);
}

/// Viewport condition matcher
pub trait ConditionMatcher {
    fn matches(&self, query: &MediaQuery) -> bool;

    /// Start reporting `ConditionChanged` for `query`
    fn watch(&mut self, query: MediaQuery) -> WatchId;

    fn unwatch(&mut self, watch: WatchId);
}

/// Scroll-intersection tracker for the widget's own bounding box
pub trait VisibilityTracker {
    /// Start reporting `Visibility` edges; the trigger spans from the
    /// widget's top reaching the viewport bottom to its bottom leaving the
    /// viewport top
    fn observe(&mut self) -> ObserverId;

    fn unobserve(&mut self, observer: ObserverId);
}

/// Window-level event listeners
pub trait Listeners {
    fn listen(&mut self, kind: ListenerKind) -> ListenerId;

    fn unlisten(&mut self, listener: ListenerId);
}

/// One-shot timers
pub trait Timers {
    /// Report `TimerFired` after `delay`
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a pending timer; fired or unknown ids are ignored
    fn cancel(&mut self, timer: TimerId);
}

/// Full environment of a widget
pub trait Host:
    Surface + AnimationEngine + ConditionMatcher + VisibilityTracker + Listeners + Timers
{
}

impl<T> Host for T where
    T: Surface + AnimationEngine + ConditionMatcher + VisibilityTracker + Listeners + Timers
{
}
