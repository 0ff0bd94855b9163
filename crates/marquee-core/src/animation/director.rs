//! L3 Molecular Layer: timeline ownership and playback gating
//!
//! The director holds at most one timeline. Building always destroys the
//! previous one first, so callers never mutate a timeline they did not
//! create.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Direction;
use crate::host::{
    AnimationEngine, LoopSpec, NodeId, ObserverId, Surface, TimelineId, VisibilityEdge,
    VisibilityTracker,
};

/// Translation reached at the end of one loop, in percent of item width
pub const LOOP_X_PERCENT: f64 = -100.0;

/// Seek applied to a fresh timeline so the loop starts mid-way
pub const INITIAL_PROGRESS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Paused,
    Playing,
}

#[derive(Debug, Clone)]
struct ActiveTimeline {
    timeline: TimelineId,
    observer: ObserverId,
    targets: Vec<NodeId>,
    state: PlaybackState,
    time_scale: f64,
}

/// Owns the marquee's looping timeline
#[derive(Debug, Clone)]
pub struct AnimationDirector {
    duration: Duration,
    direction: Direction,
    active: Option<ActiveTimeline>,
}

impl AnimationDirector {
    pub fn new(duration: Duration, direction: Direction) -> Self {
        Self {
            duration,
            direction,
            active: None,
        }
    }

    /// Create the timeline over the container's current children, paused,
    /// half-way through, and start watching the widget's visibility
    pub fn build<H>(&mut self, host: &mut H)
    where
        H: Surface + AnimationEngine + VisibilityTracker + ?Sized,
    {
        self.teardown(host);

        let targets = host.children();
        let time_scale = self.direction.initial_time_scale();

        host.set_will_change_transform(&targets);
        let timeline = host.create_loop(LoopSpec {
            targets: targets.clone(),
            duration: self.duration,
            x_percent: LOOP_X_PERCENT,
        });
        host.pause(timeline);
        host.set_time_scale(timeline, time_scale);
        host.set_total_progress(timeline, INITIAL_PROGRESS);
        let observer = host.observe();

        info!(
            %timeline,
            targets = targets.len(),
            duration_secs = self.duration.as_secs_f64(),
            time_scale,
            "Built marquee timeline"
        );

        self.active = Some(ActiveTimeline {
            timeline,
            observer,
            targets,
            state: PlaybackState::Paused,
            time_scale,
        });
    }

    /// Play while the widget intersects the viewport, pause otherwise
    pub fn on_visibility<E>(&mut self, engine: &mut E, edge: VisibilityEdge)
    where
        E: AnimationEngine + ?Sized,
    {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        if edge.is_entering() {
            engine.resume(active.timeline);
            active.state = PlaybackState::Playing;
        } else {
            engine.pause(active.timeline);
            active.state = PlaybackState::Paused;
        }
        debug!(?edge, state = ?active.state, "Visibility changed");
    }

    /// Tween playback speed to `scale`, replacing any speed tween in flight
    pub fn retarget_speed<E: AnimationEngine + ?Sized>(&mut self, engine: &mut E, scale: f64) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        engine.tween_time_scale(active.timeline, scale);
        active.time_scale = scale;
    }

    /// Kill the timeline, stop observing and clear the inline properties it
    /// wrote. Returns whether there was anything to tear down.
    pub fn teardown<H>(&mut self, host: &mut H) -> bool
    where
        H: AnimationEngine + VisibilityTracker + ?Sized,
    {
        let Some(active) = self.active.take() else {
            return false;
        };

        host.kill(active.timeline);
        host.unobserve(active.observer);
        host.clear_props(&active.targets);
        debug!(timeline = %active.timeline, "Destroyed marquee timeline");
        true
    }

    pub fn is_built(&self) -> bool {
        self.active.is_some()
    }

    pub fn timeline(&self) -> Option<TimelineId> {
        self.active.as_ref().map(|a| a.timeline)
    }

    pub fn state(&self) -> PlaybackState {
        self.active
            .as_ref()
            .map(|a| a.state)
            .unwrap_or(PlaybackState::Paused)
    }

    /// Target playback speed last requested from the engine
    pub fn time_scale(&self) -> Option<f64> {
        self.active.as_ref().map(|a| a.time_scale)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::media::Viewport;
    use crate::sim::{SimHost, SimPage};

    fn host_with_items(items: usize) -> SimHost {
        let mut host = SimHost::new(
            Viewport::default(),
            SimPage::default(),
            EngineConfig::default(),
        );
        for _ in 0..items {
            host.document_mut().push_child(300.0);
        }
        host
    }

    #[test]
    fn test_build_starts_paused_mid_loop() {
        let mut host = host_with_items(3);
        let mut director = AnimationDirector::new(Duration::from_secs(20), Direction::Rtl);

        director.build(&mut host);

        let timeline = director.timeline().unwrap();
        let state = host.engine().timeline(timeline).unwrap();
        assert!(state.paused);
        assert_eq!(state.time_scale, 1.0);
        assert!((state.progress - 0.5).abs() < 1e-9);
        assert_eq!(state.targets.len(), 3);
        assert_eq!(director.state(), PlaybackState::Paused);
        assert_eq!(host.live_observers(), 1);
        assert!(host
            .document()
            .children()
            .iter()
            .all(|n| host.engine().will_change(*n)));
    }

    #[test]
    fn test_ltr_runs_backwards() {
        let mut host = host_with_items(1);
        let mut director = AnimationDirector::new(Duration::from_secs(20), Direction::Ltr);
        director.build(&mut host);

        let timeline = director.timeline().unwrap();
        assert_eq!(host.engine().timeline(timeline).unwrap().time_scale, -1.0);
        assert_eq!(director.time_scale(), Some(-1.0));
    }

    #[test]
    fn test_visibility_gating() {
        let mut host = host_with_items(2);
        let mut director = AnimationDirector::new(Duration::from_secs(20), Direction::Rtl);
        director.build(&mut host);
        let timeline = director.timeline().unwrap();

        director.on_visibility(host.engine_mut(), VisibilityEdge::Enter);
        assert_eq!(director.state(), PlaybackState::Playing);
        assert!(!host.engine().timeline(timeline).unwrap().paused);

        director.on_visibility(host.engine_mut(), VisibilityEdge::Leave);
        assert_eq!(director.state(), PlaybackState::Paused);

        director.on_visibility(host.engine_mut(), VisibilityEdge::EnterBack);
        assert_eq!(director.state(), PlaybackState::Playing);

        director.on_visibility(host.engine_mut(), VisibilityEdge::LeaveBack);
        assert!(host.engine().timeline(timeline).unwrap().paused);
    }

    #[test]
    fn test_rebuild_replaces_timeline() {
        let mut host = host_with_items(2);
        let mut director = AnimationDirector::new(Duration::from_secs(20), Direction::Rtl);

        director.build(&mut host);
        let first = director.timeline().unwrap();
        director.build(&mut host);
        let second = director.timeline().unwrap();

        assert_ne!(first, second);
        assert!(host.engine().timeline(first).is_none());
        assert_eq!(host.engine().live_timelines(), 1);
        assert_eq!(host.live_observers(), 1);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut host = host_with_items(2);
        let mut director = AnimationDirector::new(Duration::from_secs(20), Direction::Auto);
        director.build(&mut host);

        assert!(director.teardown(&mut host));
        assert!(!director.teardown(&mut host));
        assert_eq!(host.engine().live_timelines(), 0);
        assert_eq!(host.live_observers(), 0);
        assert!(host
            .document()
            .children()
            .iter()
            .all(|n| !host.engine().will_change(*n)));
    }

    #[test]
    fn test_build_without_children_is_harmless() {
        let mut host = host_with_items(0);
        let mut director = AnimationDirector::new(Duration::from_secs(20), Direction::Rtl);
        director.build(&mut host);
        director.on_visibility(host.engine_mut(), VisibilityEdge::Enter);
        director.retarget_speed(host.engine_mut(), -1.0);
        assert!(director.teardown(&mut host));
    }
}
