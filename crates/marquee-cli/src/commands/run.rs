use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use marquee_core::AppConfig;
use marquee_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    widgets::{StatusBarWidget, StripWidget},
    Theme,
};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    // Build the widget before touching the terminal so config errors print normally
    let mut app = App::new(config.clone(), Theme::default())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("Marquee"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.resize_terminal(size.width, size.height);

    // Create event handler with animation FPS support
    let event_handler =
        EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.frame_duration());

    // Main loop
    loop {
        app.tick();

        terminal.draw(|frame| {
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            StripWidget::render(frame, main_layout[0], &app);
            StatusBarWidget::render(frame, main_layout[1], &app);
        })?;

        // Handle events (use faster tick rate while the strip is moving)
        let event = if app.needs_fast_update() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    app.status_message = None;
                    app.handle_action(handle_key_event(key));
                }
                AppEvent::Resize(columns, rows) => app.resize_terminal(columns, rows),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
