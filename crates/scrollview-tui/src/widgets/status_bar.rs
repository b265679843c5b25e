use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use scrollview_core::surface::ScrollSurface;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let (offset, max_offset) = {
            let surface = app.view.surface().borrow();
            (surface.scroll_top(), surface.max_scroll_top())
        };

        let state_str = if app.is_animating() {
            "ANIM"
        } else if app.is_loading {
            "LOAD"
        } else {
            "IDLE"
        };
        let mode_str = if app.animated { "smooth" } else { "instant" };
        let end_str = app
            .last_end_reached()
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} | {}", state_str, msg)
        } else {
            format!(
                " {} | {} | offset {:.1}/{:.0} | rows {} | end reached {}",
                state_str,
                mode_str,
                offset,
                max_offset,
                app.loaded(),
                end_str
            )
        };

        let state_style = if app.is_animating() {
            Style::default().fg(theme.animating).bg(theme.bg2)
        } else {
            Style::default().fg(theme.fg0).bg(theme.bg2)
        };

        let help_hint = " q:quit j/k:line ^d/^u:half g/G:ends space/m:mark a:smooth r:reset ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, state_style),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
