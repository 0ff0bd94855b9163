use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use tracing::warn;

use crate::animation::easing::Easing;
use crate::animation::timing::{fraction, lerp, wrap_progress};
use crate::config::EngineConfig;
use crate::host::{AnimationEngine, LoopSpec, NodeId, TimelineId};

/// Length of a time-scale tween
pub const TIME_SCALE_TWEEN: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
struct ScaleTween {
    from: f64,
    to: f64,
    elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimTimeline {
    pub targets: Vec<NodeId>,
    pub duration: Duration,
    pub x_percent: f64,
    pub time_scale: f64,
    pub paused: bool,
    /// Position inside the current loop, [0, 1)
    pub progress: f64,
    tween: Option<ScaleTween>,
}

impl SimTimeline {
    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    /// Time scale the running tween is heading for
    pub fn target_time_scale(&self) -> f64 {
        self.tween.as_ref().map(|t| t.to).unwrap_or(self.time_scale)
    }

    fn tick(&mut self, dt: Duration) {
        if let Some(tween) = self.tween.as_mut() {
            tween.elapsed += dt;
            let t = Easing::Power1Out.apply(fraction(tween.elapsed, TIME_SCALE_TWEEN));
            self.time_scale = lerp(tween.from, tween.to, t);
            if tween.elapsed >= TIME_SCALE_TWEEN {
                self.time_scale = tween.to;
                self.tween = None;
            }
        }

        if self.paused || self.duration.is_zero() {
            return;
        }
        let loops = dt.as_secs_f64() / self.duration.as_secs_f64() * self.time_scale;
        self.progress = wrap_progress(self.progress, loops);
    }
}

/// Timelines advanced by an explicit clock
#[derive(Debug, Clone, Default)]
pub struct SimEngine {
    config: EngineConfig,
    timelines: BTreeMap<TimelineId, SimTimeline>,
    will_change: BTreeSet<NodeId>,
    next_id: u64,
    created: u64,
}

impl SimEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeline(&self, timeline: TimelineId) -> Option<&SimTimeline> {
        self.timelines.get(&timeline)
    }

    pub fn live_timelines(&self) -> usize {
        self.timelines.len()
    }

    /// Timelines created over the engine's lifetime
    pub fn created_timelines(&self) -> u64 {
        self.created
    }

    pub fn will_change(&self, node: NodeId) -> bool {
        self.will_change.contains(&node)
    }

    /// Current horizontal translation of `node`, in percent of its width
    pub fn translate_percent(&self, node: NodeId) -> f64 {
        self.timelines
            .values()
            .find(|t| t.targets.contains(&node))
            .map(|t| t.x_percent * t.progress)
            .unwrap_or(0.0)
    }

    pub fn tick(&mut self, dt: Duration) {
        for timeline in self.timelines.values_mut() {
            timeline.tick(dt);
        }
    }
}

impl AnimationEngine for SimEngine {
    fn create_loop(&mut self, spec: LoopSpec) -> TimelineId {
        if spec.targets.is_empty() && self.config.null_target_warn {
            warn!("Loop created without targets");
        }

        self.next_id += 1;
        self.created += 1;
        let id = TimelineId(self.next_id);
        self.timelines.insert(
            id,
            SimTimeline {
                targets: spec.targets,
                duration: spec.duration,
                x_percent: spec.x_percent,
                time_scale: 1.0,
                paused: false,
                progress: 0.0,
                tween: None,
            },
        );
        id
    }

    fn set_will_change_transform(&mut self, targets: &[NodeId]) {
        self.will_change.extend(targets.iter().copied());
    }

    fn clear_props(&mut self, targets: &[NodeId]) {
        for node in targets {
            self.will_change.remove(node);
        }
    }

    fn set_time_scale(&mut self, timeline: TimelineId, scale: f64) {
        if let Some(t) = self.timelines.get_mut(&timeline) {
            t.time_scale = scale;
        }
    }

    fn tween_time_scale(&mut self, timeline: TimelineId, scale: f64) {
        if let Some(t) = self.timelines.get_mut(&timeline) {
            t.tween = Some(ScaleTween {
                from: t.time_scale,
                to: scale,
                elapsed: Duration::ZERO,
            });
        }
    }

    fn set_total_progress(&mut self, timeline: TimelineId, progress: f64) {
        if let Some(t) = self.timelines.get_mut(&timeline) {
            t.progress = wrap_progress(progress.clamp(0.0, 1.0), 0.0);
        }
    }

    fn pause(&mut self, timeline: TimelineId) {
        if let Some(t) = self.timelines.get_mut(&timeline) {
            t.paused = true;
        }
    }

    fn resume(&mut self, timeline: TimelineId) {
        if let Some(t) = self.timelines.get_mut(&timeline) {
            t.paused = false;
        }
    }

    fn kill(&mut self, timeline: TimelineId) {
        self.timelines.remove(&timeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looping(engine: &mut SimEngine, seconds: u64) -> TimelineId {
        engine.create_loop(LoopSpec {
            targets: vec![NodeId(1), NodeId(2)],
            duration: Duration::from_secs(seconds),
            x_percent: -100.0,
        })
    }

    #[test]
    fn test_progress_wraps_both_ways() {
        let mut engine = SimEngine::default();
        let timeline = looping(&mut engine, 10);
        engine.set_total_progress(timeline, 0.5);

        engine.tick(Duration::from_secs(7));
        assert!((engine.timeline(timeline).unwrap().progress - 0.2).abs() < 1e-9);

        engine.set_time_scale(timeline, -1.0);
        engine.tick(Duration::from_secs(3));
        assert!((engine.timeline(timeline).unwrap().progress - 0.9).abs() < 1e-9);
        assert!((engine.translate_percent(NodeId(2)) + 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_paused_timeline_holds_position() {
        let mut engine = SimEngine::default();
        let timeline = looping(&mut engine, 10);
        engine.pause(timeline);
        engine.tick(Duration::from_secs(3));
        assert_eq!(engine.timeline(timeline).unwrap().progress, 0.0);
    }

    #[test]
    fn test_time_scale_tween_overwrites() {
        let mut engine = SimEngine::default();
        let timeline = looping(&mut engine, 10);

        engine.tween_time_scale(timeline, -1.0);
        engine.tick(Duration::from_millis(250));
        let midway = engine.timeline(timeline).unwrap().time_scale;
        assert!(midway < 1.0 && midway > -1.0);

        engine.tween_time_scale(timeline, 1.0);
        assert_eq!(engine.timeline(timeline).unwrap().target_time_scale(), 1.0);
        engine.tick(TIME_SCALE_TWEEN);
        let t = engine.timeline(timeline).unwrap();
        assert_eq!(t.time_scale, 1.0);
        assert!(!t.is_tweening());
    }

    #[test]
    fn test_kill_and_clear() {
        let mut engine = SimEngine::new(EngineConfig {
            null_target_warn: true,
        });
        let timeline = looping(&mut engine, 10);
        engine.set_will_change_transform(&[NodeId(1), NodeId(2)]);
        engine.clear_props(&[NodeId(1)]);
        assert!(!engine.will_change(NodeId(1)));
        assert!(engine.will_change(NodeId(2)));

        engine.kill(timeline);
        engine.kill(timeline);
        assert_eq!(engine.live_timelines(), 0);
        assert_eq!(engine.translate_percent(NodeId(1)), 0.0);

        let empty = engine.create_loop(LoopSpec {
            targets: Vec::new(),
            duration: Duration::from_secs(1),
            x_percent: -100.0,
        });
        assert!(engine.timeline(empty).is_some());
        assert_eq!(engine.created_timelines(), 2);
    }
}
