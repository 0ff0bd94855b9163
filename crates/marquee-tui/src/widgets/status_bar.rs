use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use marquee_core::animation::PlaybackState;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let status = app.status();
        let viewport = app.host.viewport();

        let (state_str, state_color) = match status.state {
            PlaybackState::Playing => (" PLAYING ", theme.playing),
            PlaybackState::Paused => (" PAUSED ", theme.paused),
        };
        let state_str = if status.breakpoint_active {
            state_str
        } else {
            " INACTIVE "
        };

        let scale = status
            .time_scale
            .map(|s| format!("{:+.2}", s))
            .unwrap_or_else(|| "-".to_string());

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            format!(
                " items {} | scale {} | resets {} | flips {} | {} {} {}x{} | scroll {:.0}/{:.0}",
                status.items,
                scale,
                status.resets,
                status.speed_flips,
                viewport.pointer.as_str(),
                viewport.orientation().as_str(),
                viewport.width,
                viewport.height,
                app.host.scroll_offset(),
                app.host.max_scroll(),
            )
        };
        let debounce = if status.debouncing { " ~" } else { "" };

        let help_hint = " q:quit j/k:scroll p:pointer o:rotate r:reset ";
        let used = state_str.len() + status_text.len() + debounce.len() + help_hint.len();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(
                state_str,
                Style::default().fg(theme.bg0).bg(state_color),
            ),
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(debounce, Style::default().fg(theme.warning).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
