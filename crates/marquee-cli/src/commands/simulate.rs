use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use marquee_core::config::{TuningConfig, ViewportConfig};
use marquee_core::sim::SimHost;
use marquee_core::{
    EngineConfig, Marquee, MarqueeAttributes, MarqueeConfig, MarqueeStatus, Orientation,
    PointerKind,
};

/// A scripted session: widget attributes, the page it lives on and a list
/// of timed actions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub marquee: MarqueeAttributes,
    #[serde(default)]
    pub tuning: TuningConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Milliseconds since the widget connected
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    Resize { width: f64, height: f64 },
    Orientation { orientation: Orientation },
    Pointer { pointer: PointerKind },
    Scroll { offset: f64 },
    /// Let time pass after the step's start
    Advance { ms: u64 },
    Reset,
    Disconnect,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub progress: f64,
    pub time_scale: f64,
    pub paused: bool,
}

/// Registrations still held on the host
#[derive(Debug, Clone, Serialize)]
pub struct LiveCounts {
    pub listeners: usize,
    pub watches: usize,
    pub observers: usize,
    pub timelines: usize,
    pub timers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub clock_ms: u64,
    pub steps: usize,
    pub status: MarqueeStatus,
    pub timeline: Option<TimelineReport>,
    pub created_timelines: u64,
    pub live: LiveCounts,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut scenario: Self = toml::from_str(content).context("Invalid scenario")?;
        scenario.steps.sort_by_key(|s| s.at_ms);
        Ok(scenario)
    }
}

pub async fn run(path: &Path, realtime: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let report = simulate(&scenario, realtime).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Replay every step against a fresh in-memory host
pub async fn simulate(scenario: &Scenario, realtime: bool) -> Result<Report> {
    let config = MarqueeConfig::resolve_with(&scenario.marquee, &scenario.tuning)?;
    let mut host = SimHost::from_config(&scenario.viewport, &scenario.engine);
    let mut marquee = Marquee::connect(config, &mut host);
    host.pump(&mut marquee);

    info!(steps = scenario.steps.len(), "Scenario started");

    for step in &scenario.steps {
        let due = Duration::from_millis(step.at_ms);
        let wait = due.saturating_sub(host.clock());
        pass_time(&mut host, &mut marquee, wait, realtime).await;

        debug!(at_ms = step.at_ms, action = ?step.action, "Step");
        match step.action {
            StepAction::Resize { width, height } => host.resize(width, height),
            StepAction::Orientation { orientation } => {
                if host.viewport().orientation() != orientation {
                    host.rotate();
                }
            }
            StepAction::Pointer { pointer } => host.set_pointer(pointer),
            StepAction::Scroll { offset } => host.scroll_to(offset),
            StepAction::Advance { ms } => {
                pass_time(&mut host, &mut marquee, Duration::from_millis(ms), realtime).await
            }
            StepAction::Reset => {
                marquee.reset(&mut host);
            }
            StepAction::Disconnect => marquee.disconnect(&mut host),
        }
        host.pump(&mut marquee);
    }

    let timeline = marquee
        .timeline()
        .and_then(|t| host.engine().timeline(t))
        .map(|t| TimelineReport {
            progress: t.progress,
            time_scale: t.time_scale,
            paused: t.paused,
        });

    Ok(Report {
        clock_ms: u64::try_from(host.clock().as_millis()).unwrap_or(u64::MAX),
        steps: scenario.steps.len(),
        status: marquee.status(&host),
        timeline,
        created_timelines: host.engine().created_timelines(),
        live: LiveCounts {
            listeners: host.live_listeners(),
            watches: host.live_watches(),
            observers: host.live_observers(),
            timelines: host.engine().live_timelines(),
            timers: host.pending_timers(),
        },
    })
}

async fn pass_time(host: &mut SimHost, marquee: &mut Marquee, dt: Duration, realtime: bool) {
    if dt.is_zero() {
        return;
    }
    if realtime {
        tokio::time::sleep(dt).await;
    }
    host.advance_with(marquee, dt);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
[marquee]
direction = "auto"
max = 768.0

[viewport]
width = 700.0
height = 900.0
pointer = "fine"
template_width = 300.0
widget_top = 1200.0
widget_height = 120.0
page_height = 4000.0

[[steps]]
at_ms = 0
action = "scroll"
offset = 400.0

[[steps]]
at_ms = 100
action = "scroll"
offset = 350.0

[[steps]]
at_ms = 200
action = "resize"
width = 720.0
height = 900.0

[[steps]]
at_ms = 1000
action = "advance"
ms = 500
"#;

    #[tokio::test]
    async fn test_scenario_report() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        assert_eq!(scenario.steps.len(), 4);
        assert_eq!(
            scenario.steps[2].action,
            StepAction::Resize {
                width: 720.0,
                height: 900.0
            }
        );

        let report = simulate(&scenario, false).await.unwrap();
        assert_eq!(report.clock_ms, 1500);
        assert!(report.status.breakpoint_active);
        assert_eq!(report.status.speed_flips, 1);
        assert_eq!(report.status.scroll_sign, Some(-1.0));
        // the resize settled 250ms after it happened
        assert_eq!(report.status.resets, 1);
        assert_eq!(report.status.items, 6);
        assert_eq!(report.live.timelines, 1);
        assert_eq!(report.live.timers, 0);
    }

    #[tokio::test]
    async fn test_disconnect_releases_everything() {
        let scenario = Scenario::parse(
            r#"
[[steps]]
at_ms = 10
action = "disconnect"
"#,
        )
        .unwrap();

        let report = simulate(&scenario, false).await.unwrap();
        assert!(!report.status.connected);
        assert!(report.timeline.is_none());
        assert_eq!(report.live.listeners, 0);
        assert_eq!(report.live.watches, 0);
        assert_eq!(report.live.observers, 0);
        assert_eq!(report.live.timelines, 0);
    }

    #[test]
    fn test_steps_are_ordered() {
        let scenario = Scenario::parse(
            r#"
[[steps]]
at_ms = 300
action = "reset"

[[steps]]
at_ms = 100
action = "pointer"
pointer = "coarse"
"#,
        )
        .unwrap();
        assert_eq!(
            scenario.steps[0].action,
            StepAction::Pointer {
                pointer: PointerKind::Coarse
            }
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = Scenario::parse(
            r#"
[[steps]]
at_ms = 0
action = "explode"
"#,
        );
        assert!(result.is_err());
    }
}
