use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::app::PageRequest;
use crate::surface::Row;

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
    animation_tick: Duration,
}

/// Result of an async page load
#[derive(Debug)]
pub enum PageLoadResult {
    Success { start: usize, rows: Vec<Row> },
    Failure { start: usize, error: String },
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64, animation_tick: Duration) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            animation_tick,
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.tick_rate)
    }

    /// Poll with the frame interval, used while an animation is in flight
    pub fn next_animation(&self) -> Result<Option<AppEvent>> {
        self.poll(self.animation_tick)
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events, ignore release events
                    // (crossterm 0.27+ sends release events on some systems)
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Tick event for periodic updates
    Tick,
}

/// Produce the rows of `request` after `delay`, standing in for a remote source
pub async fn load_page(request: PageRequest, delay: Duration) -> PageLoadResult {
    tokio::time::sleep(delay).await;
    if request.count == 0 {
        return PageLoadResult::Failure {
            start: request.start,
            error: "empty page requested".to_string(),
        };
    }
    PageLoadResult::Success {
        start: request.start,
        rows: page_rows(request.start, request.count),
    }
}

const WORDS: &[&str] = &[
    "frame", "easing", "offset", "viewport", "content", "threshold", "timer", "surface",
    "momentum", "ratio", "cursor", "buffer",
];

/// Deterministic filler rows `start..start + count`
pub fn page_rows(start: usize, count: usize) -> Vec<Row> {
    (start..start + count)
        .map(|n| {
            let words: Vec<&str> = (0..3 + n % 9).map(|i| WORDS[(n * 7 + i * 3) % WORDS.len()]).collect();
            Row::new(format!("row-{}", n), format!("{:>5}  {}", n, words.join(" ")))
        })
        .collect()
}
