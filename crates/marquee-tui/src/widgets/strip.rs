use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use marquee_core::sim::SimPage;

use crate::app::{App, PX_PER_COLUMN, PX_PER_ROW};
use crate::theme::Theme;

/// The page viewport with the marquee band drawn where it sits
pub struct StripWidget;

impl StripWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let Some((first, last)) = band_rows(app.host.page(), app.host.scroll_offset(), area.height)
        else {
            return;
        };

        let viewport_columns = (app.host.viewport().width / PX_PER_COLUMN) as u16;
        let band = Rect {
            x: area.x,
            y: area.y + first,
            width: area.width.min(viewport_columns),
            height: last - first,
        };
        let line = band_line(app, theme, band.width);
        let lines = vec![line; band.height as usize];

        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(theme.bg1)),
            band,
        );
    }
}

/// Terminal rows covered by the band, as `[first, last)`, or `None` when
/// the band is scrolled out of view
fn band_rows(page: SimPage, scroll_offset: f64, height: u16) -> Option<(u16, u16)> {
    let top = (page.widget_top - scroll_offset) / PX_PER_ROW;
    let bottom = top + (page.widget_height / PX_PER_ROW).ceil().max(1.0);
    if bottom <= 0.0 || top >= f64::from(height) {
        return None;
    }

    let first = top.max(0.0).floor() as u16;
    let last = bottom.min(f64::from(height)).ceil() as u16;
    (last > first).then_some((first, last))
}

/// One row of the band: every item laid out left to right and shifted by
/// its current translation
fn band_line(app: &App, theme: &Theme, columns: u16) -> Line<'static> {
    let text: Vec<char> = app.config.ui.item_text.chars().collect();
    let engine = app.host.engine();

    let mut left = 0.0;
    let placed: Vec<(f64, f64, bool)> = app
        .host
        .document()
        .nodes()
        .iter()
        .map(|node| {
            let shift = engine.translate_percent(node.id) / 100.0 * node.width;
            let start = left + shift;
            left += node.width;
            (start, node.width, node.source == node.id)
        })
        .collect();

    let spans: Vec<Span<'static>> = (0..columns)
        .map(|column| {
            let px = (f64::from(column) + 0.5) * PX_PER_COLUMN;
            let cell = placed
                .iter()
                .find(|(start, width, _)| px >= *start && px < start + width);
            match cell {
                Some((start, _, original)) if !text.is_empty() => {
                    let index = ((px - start) / PX_PER_COLUMN) as usize % text.len();
                    let color = if *original { theme.original } else { theme.cloned };
                    Span::styled(text[index].to_string(), Style::default().fg(color))
                }
                _ => Span::raw(" "),
            }
        })
        .collect();

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> SimPage {
        SimPage {
            widget_top: 1600.0,
            widget_height: 120.0,
            page_height: 4000.0,
        }
    }

    #[test]
    fn test_band_below_the_fold() {
        // 40 rows cover 640px
        assert_eq!(band_rows(page(), 0.0, 40), None);
    }

    #[test]
    fn test_band_in_view() {
        // top at (1600 - 1000) / 16 = 37.5, 8 rows tall
        assert_eq!(band_rows(page(), 1000.0, 40), Some((37, 40)));
        assert_eq!(band_rows(page(), 1600.0, 40), Some((0, 8)));
    }

    #[test]
    fn test_band_scrolled_past() {
        assert_eq!(band_rows(page(), 1800.0, 40), None);
    }
}
