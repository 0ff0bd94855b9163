use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::debug;

use marquee_core::animation::PlaybackState;
use marquee_core::sim::SimHost;
use marquee_core::{AppConfig, Marquee, MarqueeStatus};

use crate::input::Action;
use crate::theme::Theme;

/// Simulated pixels covered by one terminal column
pub const PX_PER_COLUMN: f64 = 8.0;
/// Simulated pixels covered by one terminal row
pub const PX_PER_ROW: f64 = 16.0;

/// Rows moved by a single j/k press
const SCROLL_STEP_ROWS: f64 = 3.0;

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub host: SimHost,
    pub marquee: Marquee,
    pub status_message: Option<String>,
    pub should_quit: bool,
    last_tick: Instant,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme) -> Result<Self> {
        let marquee_config = config.marquee_config()?;
        let mut host = SimHost::from_config(&config.viewport, &config.engine);
        let mut marquee = Marquee::connect(marquee_config, &mut host);
        host.pump(&mut marquee);

        Ok(Self {
            config,
            theme,
            host,
            marquee,
            status_message: None,
            should_quit: false,
            last_tick: Instant::now(),
        })
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.host.scroll_by(SCROLL_STEP_ROWS * PX_PER_ROW),
            Action::ScrollUp => self.host.scroll_by(-SCROLL_STEP_ROWS * PX_PER_ROW),
            Action::PageDown => self.host.scroll_by(self.host.viewport().height / 2.0),
            Action::PageUp => self.host.scroll_by(-self.host.viewport().height / 2.0),
            Action::JumpToTop => self.host.scroll_to(0.0),
            Action::JumpToBottom => self.host.scroll_to(self.host.max_scroll()),
            Action::TogglePointer => {
                let pointer = self.host.viewport().pointer.toggled();
                self.host.set_pointer(pointer);
                self.status_message = Some(format!("Pointer: {}", pointer.as_str()));
            }
            Action::Rotate => {
                self.host.rotate();
                let orientation = self.host.viewport().orientation();
                self.status_message = Some(format!("Orientation: {}", orientation.as_str()));
            }
            Action::Reset => {
                let message = if self.marquee.reset(&mut self.host) {
                    "Reset"
                } else {
                    "Breakpoint inactive, nothing to reset"
                };
                self.status_message = Some(message.to_string());
            }
            Action::None => {}
        }
        self.host.pump(&mut self.marquee);
    }

    /// Map the terminal size onto the simulated viewport. The last row is
    /// taken by the status bar.
    pub fn resize_terminal(&mut self, columns: u16, rows: u16) {
        let width = f64::from(columns) * PX_PER_COLUMN;
        let height = f64::from(rows.saturating_sub(1).max(1)) * PX_PER_ROW;
        debug!(columns, rows, width, height, "Terminal resized");
        self.host.resize(width, height);
        self.host.pump(&mut self.marquee);
    }

    /// Advance the simulated clock by the wall time since the last tick
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.host.advance_with(&mut self.marquee, dt);
    }

    /// Whether the next frame should come at the animation frame rate
    pub fn needs_fast_update(&self) -> bool {
        let tweening = self
            .marquee
            .timeline()
            .and_then(|t| self.host.engine().timeline(t))
            .is_some_and(|t| t.is_tweening());
        self.marquee.state() == PlaybackState::Playing || tweening
    }

    pub fn status(&self) -> MarqueeStatus {
        self.marquee.status(&self.host)
    }

    /// Release everything the widget registered with the host
    pub fn shutdown(&mut self) {
        self.marquee.disconnect(&mut self.host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Arc::new(AppConfig::default()), Theme::default()).unwrap()
    }

    #[test]
    fn test_starts_paused_off_screen() {
        let app = app();
        assert_eq!(app.marquee.state(), PlaybackState::Paused);
        assert!(!app.needs_fast_update());
        // 1280 / 300 rounds up to 5, plus padding
        assert_eq!(app.status().items, 8);
    }

    #[test]
    fn test_scrolling_into_view_starts_playback() {
        let mut app = app();
        app.handle_action(Action::PageDown);
        assert_eq!(app.host.scroll_offset(), 400.0);
        assert_eq!(app.marquee.state(), PlaybackState::Playing);
        assert!(app.needs_fast_update());

        app.handle_action(Action::JumpToBottom);
        assert_eq!(app.marquee.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_device_toggles_report_status() {
        let mut app = app();
        app.handle_action(Action::TogglePointer);
        assert_eq!(app.status_message.as_deref(), Some("Pointer: coarse"));

        app.handle_action(Action::Rotate);
        assert_eq!(app.status_message.as_deref(), Some("Orientation: portrait"));
        // coarse pointer turned back to landscape resets immediately
        app.handle_action(Action::Rotate);
        assert_eq!(app.status().resets, 1);
    }

    #[test]
    fn test_quit_and_shutdown() {
        let mut app = app();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);

        app.shutdown();
        assert_eq!(app.host.live_listeners(), 0);
        assert_eq!(app.host.live_watches(), 0);
        assert_eq!(app.host.engine().live_timelines(), 0);
    }
}
