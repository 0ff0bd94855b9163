//! L2 Organism Layer: the marquee widget
//!
//! `Marquee::connect` registers every setup block under its viewport
//! condition and runs the ones that currently hold. From then on the host
//! feeds [`HostEvent`]s to [`Marquee::handle`], which routes them to the
//! registry, the scroll controller, the reset coordinator or the director.
//! `Marquee::disconnect` reverts everything that is still set up.

use serde::Serialize;
use tracing::{debug, info};

use crate::animation::{AnimationDirector, PlaybackState};
use crate::condition::{ConditionHandler, ConditionRegistry};
use crate::config::{Direction, MarqueeConfig};
use crate::host::{ConditionMatcher, Host, HostEvent, ListenerId, ListenerKind, TimelineId};
use crate::media::{MediaQuery, PointerKind};
use crate::replicator::ContentReplicator;
use crate::reset::ResetCoordinator;
use crate::scroll::ScrollReverseController;
use crate::skew::{apply_skew, revert_skew, SkewSnapshot};

/// Setup blocks, each run when its condition becomes active
#[derive(Debug, Clone, PartialEq)]
enum Setup {
    Replicate,
    Skew(f64),
    Animate,
    ScrollReverse,
    OrientationReset,
    ResizeReset,
}

/// Undo records produced by the setups above
#[derive(Debug)]
enum Teardown {
    RemoveClones,
    RevertSkew(SkewSnapshot),
    StopAnimation,
    StopScrollReverse,
    StopOrientationReset,
    StopResizeReset,
}

#[derive(Debug)]
struct ScrollReverse {
    listener: ListenerId,
    controller: ScrollReverseController,
}

/// Everything the setups touch, kept apart from the registry that drives them
#[derive(Debug)]
struct Parts {
    replicator: ContentReplicator,
    director: AnimationDirector,
    scroll: Option<ScrollReverse>,
    reset: ResetCoordinator,
    resets: u64,
    speed_flips: u64,
}

struct Effects<'a, H> {
    host: &'a mut H,
    parts: &'a mut Parts,
}

impl<H: Host> ConditionHandler<Setup, Teardown> for Effects<'_, H> {
    fn matcher(&mut self) -> &mut dyn ConditionMatcher {
        &mut *self.host
    }

    fn setup(&mut self, setup: &Setup) -> Option<Teardown> {
        let host = &mut *self.host;
        let parts = &mut *self.parts;

        match *setup {
            Setup::Replicate => {
                parts.replicator.normalize(host);
                Some(Teardown::RemoveClones)
            }
            Setup::Skew(angle) => Some(Teardown::RevertSkew(apply_skew(host, angle))),
            Setup::Animate => {
                parts.director.build(host);
                Some(Teardown::StopAnimation)
            }
            Setup::ScrollReverse => {
                parts.scroll = Some(ScrollReverse {
                    listener: host.listen(ListenerKind::Scroll),
                    controller: ScrollReverseController::new(),
                });
                Some(Teardown::StopScrollReverse)
            }
            Setup::OrientationReset => {
                parts.reset.watch_orientation(host);
                Some(Teardown::StopOrientationReset)
            }
            Setup::ResizeReset => {
                parts.reset.watch_resize(host);
                Some(Teardown::StopResizeReset)
            }
        }
    }

    fn teardown(&mut self, teardown: Teardown) {
        let host = &mut *self.host;
        let parts = &mut *self.parts;

        match teardown {
            Teardown::RemoveClones => parts.replicator.remove_clones(host),
            Teardown::RevertSkew(snapshot) => revert_skew(host, snapshot),
            Teardown::StopAnimation => {
                parts.director.teardown(host);
            }
            Teardown::StopScrollReverse => {
                if let Some(scroll) = parts.scroll.take() {
                    host.unlisten(scroll.listener);
                }
            }
            Teardown::StopOrientationReset => parts.reset.unwatch_orientation(host),
            Teardown::StopResizeReset => parts.reset.unwatch_resize(host),
        }
    }
}

/// Externally visible widget state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarqueeStatus {
    pub connected: bool,
    pub breakpoint: String,
    pub breakpoint_active: bool,
    pub direction: Direction,
    pub items: usize,
    pub state: PlaybackState,
    pub time_scale: Option<f64>,
    pub scroll_sign: Option<f64>,
    pub resets: u64,
    pub speed_flips: u64,
    pub debouncing: bool,
}

/// One marquee widget instance
#[derive(Debug)]
pub struct Marquee {
    config: MarqueeConfig,
    registry: ConditionRegistry<Setup, Teardown>,
    parts: Parts,
    connected: bool,
}

impl Marquee {
    /// Attach the widget to its container and run every setup whose
    /// condition currently holds
    pub fn connect<H: Host>(config: MarqueeConfig, host: &mut H) -> Self {
        let parts = Parts {
            replicator: ContentReplicator::new(config.clone_padding, config.max_items),
            director: AnimationDirector::new(config.duration, config.direction),
            scroll: None,
            reset: ResetCoordinator::new(config.debounce),
            resets: 0,
            speed_flips: 0,
        };
        let mut marquee = Self {
            config,
            registry: ConditionRegistry::new(),
            parts,
            connected: true,
        };

        // Clones left over from a previous connection are stale whatever
        // the breakpoint says
        marquee.parts.replicator.remove_clones(host);

        let breakpoint = marquee.config.breakpoint;
        let mut setups = vec![(breakpoint, Setup::Replicate)];
        if let Some(angle) = marquee.config.skew_degrees {
            setups.push((breakpoint, Setup::Skew(angle)));
        }
        setups.push((breakpoint, Setup::Animate));
        if marquee.config.direction == Direction::Auto {
            setups.push((breakpoint, Setup::ScrollReverse));
        }
        setups.push((
            MediaQuery::AnyPointer(PointerKind::Coarse),
            Setup::OrientationReset,
        ));
        setups.push((MediaQuery::AnyPointer(PointerKind::Fine), Setup::ResizeReset));

        for (query, setup) in setups {
            marquee.registry.register(
                query,
                setup,
                &mut Effects {
                    host: &mut *host,
                    parts: &mut marquee.parts,
                },
            );
        }

        info!(
            breakpoint = %marquee.config.breakpoint,
            direction = %marquee.config.direction,
            active = marquee.registry.is_active(&breakpoint),
            "Marquee connected"
        );
        marquee
    }

    /// Route one host notification
    pub fn handle<H: Host>(&mut self, host: &mut H, event: HostEvent) {
        if !self.connected {
            return;
        }

        match event {
            HostEvent::ConditionChanged { query, matches } => {
                self.registry.on_change(
                    &query,
                    matches,
                    &mut Effects {
                        host,
                        parts: &mut self.parts,
                    },
                );
            }
            HostEvent::Scroll { offset } => {
                let Some(scroll) = self.parts.scroll.as_mut() else {
                    return;
                };
                if let Some(sign) = scroll.controller.observe(offset) {
                    self.parts.director.retarget_speed(host, sign);
                    self.parts.speed_flips += 1;
                }
            }
            HostEvent::Resize => self.parts.reset.on_resize(host),
            HostEvent::OrientationChanged { portrait } => {
                if self.parts.reset.on_orientation_change(portrait) {
                    debug!("Orientation changed to landscape");
                    self.reset(host);
                }
            }
            HostEvent::Visibility(edge) => self.parts.director.on_visibility(host, edge),
            HostEvent::TimerFired(timer) => {
                if self.parts.reset.on_timer(timer) {
                    debug!(%timer, "Resize settled");
                    self.reset(host);
                }
            }
        }
    }

    /// Destroy the timeline, re-measure and rebuild. Does nothing while the
    /// breakpoint condition is inactive. Returns whether a reset happened.
    pub fn reset<H: Host>(&mut self, host: &mut H) -> bool {
        if !self.connected || !self.registry.is_active(&self.config.breakpoint) {
            return false;
        }

        let parts = &mut self.parts;
        parts.director.teardown(host);
        let children = host.children();
        host.clear_props(&children);
        let items = parts.replicator.normalize(host);
        parts.director.build(host);
        parts.resets += 1;

        info!(items, resets = parts.resets, "Marquee reset");
        true
    }

    /// Revert every active setup and release every registration
    pub fn disconnect<H: Host>(&mut self, host: &mut H) {
        if !self.connected {
            return;
        }
        self.registry.revert_all(&mut Effects {
            host,
            parts: &mut self.parts,
        });
        self.connected = false;
        info!("Marquee disconnected");
    }

    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_breakpoint_active(&self) -> bool {
        self.registry.is_active(&self.config.breakpoint)
    }

    pub fn state(&self) -> PlaybackState {
        self.parts.director.state()
    }

    pub fn timeline(&self) -> Option<TimelineId> {
        self.parts.director.timeline()
    }

    pub fn resets(&self) -> u64 {
        self.parts.resets
    }

    pub fn speed_flips(&self) -> u64 {
        self.parts.speed_flips
    }

    pub fn scroll_sign(&self) -> Option<f64> {
        self.parts.scroll.as_ref().map(|s| s.controller.current_sign())
    }

    pub fn status<H: Host>(&self, host: &H) -> MarqueeStatus {
        MarqueeStatus {
            connected: self.connected,
            breakpoint: self.config.breakpoint.to_string(),
            breakpoint_active: self.is_breakpoint_active(),
            direction: self.config.direction,
            items: host.children().len(),
            state: self.state(),
            time_scale: self.parts.director.time_scale(),
            scroll_sign: self.scroll_sign(),
            resets: self.parts.resets,
            speed_flips: self.parts.speed_flips,
            debouncing: self.parts.reset.is_debouncing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, MarqueeAttributes};
    use crate::host::{StyleProperty, Surface};
    use crate::media::Viewport;
    use crate::sim::{SimHost, SimPage};

    fn host(width: f64, pointer: PointerKind) -> SimHost {
        let mut host = SimHost::new(
            Viewport::new(width, 800.0, pointer),
            SimPage::default(),
            EngineConfig::default(),
        );
        host.document_mut().push_child(300.0);
        host
    }

    fn config(attrs: MarqueeAttributes) -> MarqueeConfig {
        MarqueeConfig::resolve(&attrs).unwrap()
    }

    #[test]
    fn test_connect_runs_setups() {
        let mut host = host(1000.0, PointerKind::Fine);
        let marquee = Marquee::connect(config(MarqueeAttributes::default()), &mut host);

        assert_eq!(host.children().len(), 7);
        assert!(marquee.timeline().is_some());
        assert_eq!(marquee.state(), PlaybackState::Paused);
        // no skew configured, no inline styles written
        assert!(host.document().styles().is_empty());
        // resize listener only, no scroll listener outside auto mode
        assert_eq!(host.live_listeners(), 1);
        assert_eq!(host.live_watches(), 2);
    }

    #[test]
    fn test_inactive_breakpoint_leaves_content_alone() {
        let mut host = host(600.0, PointerKind::Fine);
        let attrs = MarqueeAttributes {
            min: Some(768.0),
            skew: Some(5.0),
            ..Default::default()
        };
        let mut marquee = Marquee::connect(config(attrs), &mut host);

        assert_eq!(host.children().len(), 1);
        assert!(marquee.timeline().is_none());
        assert_eq!(host.style(StyleProperty::Transform), None);
        assert!(!marquee.reset(&mut host));
    }

    #[test]
    fn test_breakpoint_toggle_reverts_and_rebuilds() {
        let mut host = host(1000.0, PointerKind::Fine);
        let attrs = MarqueeAttributes {
            min: Some(768.0),
            skew: Some(-4.0),
            direction: Direction::Auto,
            ..Default::default()
        };
        let mut marquee = Marquee::connect(config(attrs), &mut host);
        assert_eq!(
            host.style(StyleProperty::Transform).as_deref(),
            Some("skew(0deg, -4deg)")
        );
        assert_eq!(host.live_listeners(), 2);

        let breakpoint = MediaQuery::at_least(768.0);
        marquee.handle(
            &mut host,
            HostEvent::ConditionChanged {
                query: breakpoint,
                matches: false,
            },
        );
        assert_eq!(host.children().len(), 1);
        assert_eq!(host.style(StyleProperty::Transform), None);
        assert!(marquee.timeline().is_none());
        assert_eq!(marquee.scroll_sign(), None);
        assert_eq!(host.engine().live_timelines(), 0);
        assert_eq!(host.live_listeners(), 1);

        marquee.handle(
            &mut host,
            HostEvent::ConditionChanged {
                query: breakpoint,
                matches: true,
            },
        );
        assert_eq!(host.children().len(), 7);
        assert!(marquee.timeline().is_some());
        assert_eq!(marquee.scroll_sign(), Some(1.0));
        assert_eq!(host.engine().live_timelines(), 1);
    }

    #[test]
    fn test_scroll_flips_only_in_auto_mode() {
        let mut host = host(1000.0, PointerKind::Fine);
        let mut marquee = Marquee::connect(config(MarqueeAttributes::default()), &mut host);
        marquee.handle(&mut host, HostEvent::Scroll { offset: 10.0 });
        marquee.handle(&mut host, HostEvent::Scroll { offset: 5.0 });
        assert_eq!(marquee.speed_flips(), 0);
        assert_eq!(marquee.status(&host).time_scale, Some(1.0));

        let mut host = self::host(1000.0, PointerKind::Fine);
        let attrs = MarqueeAttributes {
            direction: Direction::Auto,
            ..Default::default()
        };
        let mut marquee = Marquee::connect(config(attrs), &mut host);
        marquee.handle(&mut host, HostEvent::Scroll { offset: 10.0 });
        marquee.handle(&mut host, HostEvent::Scroll { offset: 5.0 });
        assert_eq!(marquee.speed_flips(), 1);
        assert_eq!(marquee.status(&host).time_scale, Some(-1.0));
    }

    #[test]
    fn test_orientation_reset_needs_coarse_pointer() {
        let mut host = host(1000.0, PointerKind::Fine);
        let mut marquee = Marquee::connect(config(MarqueeAttributes::default()), &mut host);
        marquee.handle(&mut host, HostEvent::OrientationChanged { portrait: false });
        assert_eq!(marquee.resets(), 0);

        let mut host = self::host(1000.0, PointerKind::Coarse);
        let mut marquee = Marquee::connect(config(MarqueeAttributes::default()), &mut host);
        marquee.handle(&mut host, HostEvent::OrientationChanged { portrait: true });
        assert_eq!(marquee.resets(), 0);
        marquee.handle(&mut host, HostEvent::OrientationChanged { portrait: false });
        assert_eq!(marquee.resets(), 1);
    }

    #[test]
    fn test_disconnect_releases_everything() {
        let mut host = host(1000.0, PointerKind::Fine);
        let attrs = MarqueeAttributes {
            direction: Direction::Auto,
            skew: Some(3.0),
            ..Default::default()
        };
        let mut marquee = Marquee::connect(config(attrs), &mut host);
        marquee.handle(&mut host, HostEvent::Resize);

        marquee.disconnect(&mut host);
        marquee.disconnect(&mut host);

        assert!(!marquee.is_connected());
        assert_eq!(host.children().len(), 1);
        assert_eq!(host.live_listeners(), 0);
        assert_eq!(host.live_watches(), 0);
        assert_eq!(host.live_observers(), 0);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.engine().live_timelines(), 0);
        assert!(host.document().styles().is_empty());

        marquee.handle(&mut host, HostEvent::OrientationChanged { portrait: false });
        assert_eq!(marquee.resets(), 0);
    }

    #[test]
    fn test_connect_removes_stale_clones() {
        let mut host = host(1000.0, PointerKind::Fine);
        let template = host.children()[0];
        host.append_clone(template);
        host.append_clone(template);

        let attrs = MarqueeAttributes {
            max: Some(500.0),
            ..Default::default()
        };
        let _marquee = Marquee::connect(config(attrs), &mut host);
        assert_eq!(host.children(), vec![template]);
    }
}
