use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::info;

use scrollview_core::AppConfig;
use scrollview_tui::{
    app::{App, PageRequest},
    event::{load_page, AppEvent, EventHandler, PageLoadResult},
    input::{handle_key_event, Action},
    widgets::{ListViewWidget, StatusBarWidget},
    Theme,
};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    info!(
        duration_ms = config.scroll.animation_duration_ms,
        fps = config.scroll.animation_fps,
        page_size = config.ui.page_size,
        "Starting scrollview"
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("scrollview"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Arc<AppConfig>,
) -> Result<()> {
    let mut app = App::new(config.clone(), Theme::default());

    // Frames follow the animation rate while scrolling, the tick rate otherwise
    let event_handler = EventHandler::new(config.ui.tick_rate_ms, config.scroll.animation_tick_duration());
    let load_delay = Duration::from_millis(config.ui.load_delay_ms);

    // Create channel for async page loads
    let (page_tx, mut page_rx) = mpsc::unbounded_channel::<PageLoadResult>();

    loop {
        // Process any completed page loads (non-blocking)
        while let Ok(result) = page_rx.try_recv() {
            app.apply_page(result);
        }

        // Advance the scroll animation, then report the new offset
        app.tick_frame();
        if let Some(request) = app.dispatch_scroll() {
            spawn_page_load(request, load_delay, page_tx.clone());
        }

        // Draw UI
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            ListViewWidget::render(frame, layout[0], &mut app);
            StatusBarWidget::render(frame, layout[1], &app);
        })?;

        // Use the frame interval while an animation is in flight
        let event = if app.frames().has_pending() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key);
                    handle_action(&mut app, action);
                }
                AppEvent::Resize(_, _) => {
                    // The list pane re-measures itself on the next draw
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_action(app: &mut App, action: Action) {
    if action != Action::None {
        app.clear_status();
    }
    let lines = app.config.scroll.scroll_lines as i32;

    match action {
        Action::Quit => app.should_quit = true,
        Action::ScrollDown => app.scroll_lines(lines),
        Action::ScrollUp => app.scroll_lines(-lines),
        Action::ScrollLeft => app.scroll_columns(-4),
        Action::ScrollRight => app.scroll_columns(4),
        Action::ScrollHalfPageDown => app.scroll_half_page_down(),
        Action::ScrollHalfPageUp => app.scroll_half_page_up(),
        Action::JumpToTop => app.jump_to_top(),
        Action::JumpToBottom => app.jump_to_bottom(),
        Action::MarkRow => app.mark_top_row(),
        Action::ScrollToMarked => app.scroll_to_marked(),
        Action::ToggleAnimated => app.toggle_animated(),
        Action::ResetScroll => app.reset_scroll(),
        Action::None => {}
    }
}

/// Spawn an async task delivering the requested page through `tx`
fn spawn_page_load(request: PageRequest, delay: Duration, tx: mpsc::UnboundedSender<PageLoadResult>) {
    tokio::spawn(async move {
        let result = load_page(request, delay).await;
        let _ = tx.send(result);
    });
}
