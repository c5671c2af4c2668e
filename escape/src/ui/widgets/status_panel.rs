//! Sidebar showing the clock, hints and what the player has found

use chrono::TimeDelta;
use escape_core::policy::format_clock;
use escape_core::GameStatus;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::GameTheme;

/// Sidebar widget for an active game
pub struct StatusPanelWidget<'a> {
    status: &'a GameStatus,
    remaining_secs: i64,
    theme: &'a GameTheme,
}

impl<'a> StatusPanelWidget<'a> {
    pub fn new(status: &'a GameStatus, theme: &'a GameTheme) -> Self {
        Self {
            status,
            remaining_secs: status.remaining_secs,
            theme,
        }
    }

    /// Override the clock with a locally counted value
    pub fn remaining_secs(mut self, secs: i64) -> Self {
        self.remaining_secs = secs;
        self
    }

    fn heading(&self, text: &'static str) -> Line<'static> {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    }

    fn list(&self, lines: &mut Vec<Line<'static>>, items: &[String]) {
        if items.is_empty() {
            lines.push(Line::from(Span::styled("  (none)", self.theme.system_style())));
        }
        for item in items {
            lines.push(Line::from(format!("  • {item}")));
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let status = self.status;
        let clock = format_clock(TimeDelta::seconds(self.remaining_secs));
        let hints = "●".repeat(status.hint_count as usize)
            + &"○".repeat(status.max_hints.saturating_sub(status.hint_count) as usize);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("Time  "),
                Span::styled(
                    clock,
                    Style::default()
                        .fg(self.theme.time_color(self.remaining_secs))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::raw("Hints "),
                Span::styled(hints, self.theme.hint_style()),
            ]),
        ];

        if let Some(attempts) = status.remaining_attempts {
            lines.push(Line::from(Span::styled(
                format!("Actions left: {attempts}"),
                Style::default().fg(self.theme.time_critical),
            )));
        }

        lines.push(Line::from(""));
        lines.push(self.heading("Location"));
        lines.push(Line::from(format!("  {}", status.location)));
        lines.push(Line::from(""));
        lines.push(self.heading("Inventory"));
        self.list(&mut lines, &status.inventory);
        lines.push(Line::from(""));
        lines.push(self.heading("Clues"));
        self.list(&mut lines, &status.clues);

        lines
    }
}

impl Widget for StatusPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.status.difficulty.stars()))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.lines())
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
