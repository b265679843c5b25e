use ratatui::{
    layout::{Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::app::App;

/// Every n-th row is drawn as a milestone
const MILESTONE_EVERY: usize = 25;

pub struct ListViewWidget;

impl ListViewWidget {
    /// Render the scrolled rows; measures the pane into the app first
    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = app.theme.clone();
        let border_style = if app.is_animating() {
            Style::default().fg(theme.animating)
        } else {
            Style::default().fg(theme.accent)
        };

        let block = Block::default()
            .title(format!(" Rows ({}) ", app.loaded()))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(theme.bg0));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let show_scrollbar = app.config.ui.show_scroll_indicator;
        let text_width = if show_scrollbar {
            inner.width.saturating_sub(1)
        } else {
            inner.width
        };
        app.resize(text_width, inner.height);

        let surface = app.view.surface().borrow();
        let column = surface.first_visible_column();
        let marked = app.marked.as_deref();

        let mut lines: Vec<Line> = surface.rows()[surface.visible_rows()]
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let index = surface.first_visible_row() + i;
                let style = if Some(row.id.as_str()) == marked {
                    Style::default().fg(theme.bg0).bg(theme.marked)
                } else if index % MILESTONE_EVERY == 0 {
                    Style::default().fg(theme.milestone).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.fg0)
                };
                let visible: String = row.text.chars().skip(column).take(text_width as usize).collect();
                Line::from(Span::styled(visible, style))
            })
            .collect();

        if app.is_loading && lines.len() < inner.height as usize {
            lines.push(Line::from(Span::styled(
                "  Loading more rows…",
                Style::default().fg(theme.loading).add_modifier(Modifier::ITALIC),
            )));
        }

        let text_area = Rect {
            width: text_width,
            ..inner
        };
        frame.render_widget(Paragraph::new(lines), text_area);

        if show_scrollbar {
            let max_scroll = surface.max_scroll_top() as usize;
            let mut state = ScrollbarState::new(max_scroll)
                .position(surface.first_visible_row())
                .viewport_content_length(inner.height as usize);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .style(Style::default().fg(theme.grey1));
            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut state,
            );
        }
    }
}
