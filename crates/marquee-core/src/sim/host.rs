use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use tracing::debug;

use crate::config::{EngineConfig, ViewportConfig};
use crate::host::{
    AnimationEngine, ConditionMatcher, HostEvent, ListenerId, ListenerKind, Listeners, LoopSpec,
    NodeId, ObserverId, StyleProperty, Surface, TimelineId, TimerId, Timers, VisibilityEdge,
    VisibilityTracker, WatchId,
};
use crate::media::{MediaQuery, Orientation, PointerKind, Viewport};
use crate::widget::Marquee;

use super::document::SimDocument;
use super::engine::SimEngine;

/// Where the widget sits on the simulated page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimPage {
    pub widget_top: f64,
    pub widget_height: f64,
    pub page_height: f64,
}

impl Default for SimPage {
    fn default() -> Self {
        Self {
            widget_top: 1200.0,
            widget_height: 120.0,
            page_height: 4000.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Watch {
    query: MediaQuery,
    matches: bool,
}

/// Browser-like environment for a single widget
#[derive(Debug, Clone)]
pub struct SimHost {
    document: SimDocument,
    engine: SimEngine,
    viewport: Viewport,
    page: SimPage,
    scroll_offset: f64,
    clock: Duration,
    watches: BTreeMap<WatchId, Watch>,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    observers: BTreeMap<ObserverId, bool>,
    timers: BTreeMap<TimerId, Duration>,
    queue: VecDeque<HostEvent>,
    next_id: u64,
}

impl SimHost {
    pub fn new(viewport: Viewport, page: SimPage, engine: EngineConfig) -> Self {
        Self {
            document: SimDocument::new(viewport.width),
            engine: SimEngine::new(engine),
            viewport,
            page,
            scroll_offset: 0.0,
            clock: Duration::ZERO,
            watches: BTreeMap::new(),
            listeners: BTreeMap::new(),
            observers: BTreeMap::new(),
            timers: BTreeMap::new(),
            queue: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Page and template described by a `[viewport]` config section
    pub fn from_config(viewport: &ViewportConfig, engine: &EngineConfig) -> Self {
        let page = SimPage {
            widget_top: viewport.widget_top,
            widget_height: viewport.widget_height,
            page_height: viewport.page_height,
        };
        let mut host = Self::new(viewport.viewport(), page, engine.clone());
        host.document.push_child(viewport.template_width);
        host
    }

    pub fn document(&self) -> &SimDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut SimDocument {
        &mut self.document
    }

    pub fn engine(&self) -> &SimEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SimEngine {
        &mut self.engine
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn page(&self) -> SimPage {
        self.page
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn live_watches(&self) -> usize {
        self.watches.len()
    }

    pub fn live_observers(&self) -> usize {
        self.observers.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn next_event(&mut self) -> Option<HostEvent> {
        self.queue.pop_front()
    }

    /// Deliver every queued event to the widget, including events the
    /// widget's own reactions enqueue
    pub fn pump(&mut self, marquee: &mut Marquee) {
        while let Some(event) = self.queue.pop_front() {
            marquee.handle(self, event);
        }
    }

    /// Replace the viewport, reporting condition flips, resize and
    /// orientation changes to whoever listens
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let previous = self.viewport;
        if previous == viewport {
            return;
        }
        self.viewport = viewport;
        self.document.set_client_width(viewport.width);
        debug!(?viewport, "Viewport changed");

        for watch in self.watches.values_mut() {
            let matches = viewport.matches(&watch.query);
            if matches != watch.matches {
                watch.matches = matches;
                self.queue.push_back(HostEvent::ConditionChanged {
                    query: watch.query,
                    matches,
                });
            }
        }

        let resized = previous.width != viewport.width || previous.height != viewport.height;
        if resized && self.has_listener(ListenerKind::Resize) {
            self.queue.push_back(HostEvent::Resize);
        }

        let orientation = viewport.orientation();
        if orientation != previous.orientation()
            && self.has_listener(ListenerKind::OrientationChange)
        {
            self.queue.push_back(HostEvent::OrientationChanged {
                portrait: orientation == Orientation::Portrait,
            });
        }

        if resized {
            self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll());
            self.refresh_visibility();
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.set_viewport(Viewport::new(width, height, self.viewport.pointer));
    }

    /// Swap width and height, as a handheld device does when turned
    pub fn rotate(&mut self) {
        let v = self.viewport;
        self.set_viewport(Viewport::new(v.height, v.width, v.pointer));
    }

    pub fn set_pointer(&mut self, pointer: PointerKind) {
        let v = self.viewport;
        self.set_viewport(Viewport::new(v.width, v.height, pointer));
    }

    pub fn max_scroll(&self) -> f64 {
        (self.page.page_height - self.viewport.height).max(0.0)
    }

    /// Scroll the page. Nothing is reported when the offset does not move.
    pub fn scroll_to(&mut self, offset: f64) {
        let offset = offset.clamp(0.0, self.max_scroll());
        let previous = self.scroll_offset;
        if offset == previous {
            return;
        }
        self.scroll_offset = offset;

        if self.has_listener(ListenerKind::Scroll) {
            self.queue.push_back(HostEvent::Scroll { offset });
        }

        let (start, end) = self.trigger_range();
        let ids: Vec<ObserverId> = self.observers.keys().copied().collect();
        for id in ids {
            let was_inside = self.observers[&id];
            let inside = start <= offset && offset <= end;
            let forward = offset > previous;

            let edges: &[VisibilityEdge] = match (was_inside, inside, forward) {
                (false, true, true) => &[VisibilityEdge::Enter],
                (false, true, false) => &[VisibilityEdge::EnterBack],
                (true, false, true) => &[VisibilityEdge::Leave],
                (true, false, false) => &[VisibilityEdge::LeaveBack],
                (false, false, true) if previous < start && offset > end => {
                    &[VisibilityEdge::Enter, VisibilityEdge::Leave]
                }
                (false, false, false) if previous > end && offset < start => {
                    &[VisibilityEdge::EnterBack, VisibilityEdge::LeaveBack]
                }
                _ => &[],
            };
            self.queue.extend(edges.iter().map(|edge| HostEvent::Visibility(*edge)));
            self.observers.insert(id, inside);
        }
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll_offset + delta);
    }

    /// Whether the widget currently intersects the viewport
    pub fn is_widget_visible(&self) -> bool {
        let (start, end) = self.trigger_range();
        start <= self.scroll_offset && self.scroll_offset <= end
    }

    /// Move the clock, ticking timelines and queueing timer fires. Events
    /// stay queued until pumped.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.clock + dt;
        while let Some((timer, due)) = self.next_due(target) {
            self.step_to(due);
            self.timers.remove(&timer);
            self.queue.push_back(HostEvent::TimerFired(timer));
        }
        self.step_to(target);
    }

    /// Like `advance`, but hands each fired timer to the widget as soon as
    /// it fires so resets land at the right moment
    pub fn advance_with(&mut self, marquee: &mut Marquee, dt: Duration) {
        self.pump(marquee);
        let target = self.clock + dt;
        while let Some((timer, due)) = self.next_due(target) {
            self.step_to(due);
            self.timers.remove(&timer);
            self.queue.push_back(HostEvent::TimerFired(timer));
            self.pump(marquee);
        }
        self.step_to(target);
        self.pump(marquee);
    }

    fn next_due(&self, limit: Duration) -> Option<(TimerId, Duration)> {
        self.timers
            .iter()
            .filter(|(_, due)| **due <= limit)
            .min_by_key(|(id, due)| (**due, **id))
            .map(|(id, due)| (*id, *due))
    }

    fn step_to(&mut self, at: Duration) {
        if at > self.clock {
            self.engine.tick(at - self.clock);
            self.clock = at;
        }
    }

    /// Scroll offsets between the widget's top meeting the viewport bottom
    /// and its bottom meeting the viewport top
    fn trigger_range(&self) -> (f64, f64) {
        (
            self.page.widget_top - self.viewport.height,
            self.page.widget_top + self.page.widget_height,
        )
    }

    fn refresh_visibility(&mut self) {
        let inside = self.is_widget_visible();
        let (_, end) = self.trigger_range();
        let ids: Vec<ObserverId> = self.observers.keys().copied().collect();
        for id in ids {
            if self.observers[&id] == inside {
                continue;
            }
            let edge = match (inside, self.scroll_offset > end) {
                (true, _) => VisibilityEdge::Enter,
                (false, true) => VisibilityEdge::Leave,
                (false, false) => VisibilityEdge::LeaveBack,
            };
            self.queue.push_back(HostEvent::Visibility(edge));
            self.observers.insert(id, inside);
        }
    }

    fn has_listener(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Surface for SimHost {
    fn children(&self) -> Vec<NodeId> {
        self.document.children()
    }

    fn remove_child(&mut self, node: NodeId) {
        self.document.remove_child(node);
    }

    fn append_clone(&mut self, node: NodeId) -> NodeId {
        self.document.append_clone(node)
    }

    fn client_width(&self) -> f64 {
        self.document.client_width()
    }

    fn node_width(&self, node: NodeId) -> f64 {
        self.document.node_width(node)
    }

    fn style(&self, property: StyleProperty) -> Option<String> {
        self.document.style(property)
    }

    fn set_style(&mut self, property: StyleProperty, value: String) {
        self.document.set_style(property, value);
    }

    fn remove_style(&mut self, property: StyleProperty) {
        self.document.remove_style(property);
    }
}

impl AnimationEngine for SimHost {
    fn create_loop(&mut self, spec: LoopSpec) -> TimelineId {
        self.engine.create_loop(spec)
    }

    fn set_will_change_transform(&mut self, targets: &[NodeId]) {
        self.engine.set_will_change_transform(targets);
    }

    fn clear_props(&mut self, targets: &[NodeId]) {
        self.engine.clear_props(targets);
    }

    fn set_time_scale(&mut self, timeline: TimelineId, scale: f64) {
        self.engine.set_time_scale(timeline, scale);
    }

    fn tween_time_scale(&mut self, timeline: TimelineId, scale: f64) {
        self.engine.tween_time_scale(timeline, scale);
    }

    fn set_total_progress(&mut self, timeline: TimelineId, progress: f64) {
        self.engine.set_total_progress(timeline, progress);
    }

    fn pause(&mut self, timeline: TimelineId) {
        self.engine.pause(timeline);
    }

    fn resume(&mut self, timeline: TimelineId) {
        self.engine.resume(timeline);
    }

    fn kill(&mut self, timeline: TimelineId) {
        self.engine.kill(timeline);
    }
}

impl ConditionMatcher for SimHost {
    fn matches(&self, query: &MediaQuery) -> bool {
        self.viewport.matches(query)
    }

    fn watch(&mut self, query: MediaQuery) -> WatchId {
        let id = WatchId(self.allocate());
        let matches = self.viewport.matches(&query);
        self.watches.insert(id, Watch { query, matches });
        id
    }

    fn unwatch(&mut self, watch: WatchId) {
        self.watches.remove(&watch);
    }
}

impl VisibilityTracker for SimHost {
    fn observe(&mut self) -> ObserverId {
        let id = ObserverId(self.allocate());
        let inside = self.is_widget_visible();
        self.observers.insert(id, inside);
        if inside {
            self.queue.push_back(HostEvent::Visibility(VisibilityEdge::Enter));
        }
        id
    }

    fn unobserve(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
    }
}

impl Listeners for SimHost {
    fn listen(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.allocate());
        self.listeners.insert(id, kind);
        id
    }

    fn unlisten(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }
}

impl Timers for SimHost {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.allocate());
        self.timers.insert(id, self.clock + delay);
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        self.timers.remove(&timer);
    }
}
