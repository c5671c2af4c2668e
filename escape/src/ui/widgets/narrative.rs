//! Transcript display widget

use escape_core::{Speaker, TranscriptEntry};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use crate::ui::theme::GameTheme;

/// Widget for displaying the game transcript
pub struct NarrativeWidget<'a> {
    entries: &'a [TranscriptEntry],
    scroll: usize,
    theme: &'a GameTheme,
    focused: bool,
    pending: Option<&'a str>,
}

impl<'a> NarrativeWidget<'a> {
    pub fn new(entries: &'a [TranscriptEntry], theme: &'a GameTheme) -> Self {
        Self {
            entries,
            scroll: 0,
            theme,
            focused: false,
            pending: None,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Dimmed line shown while the game master is working
    pub fn pending(mut self, text: Option<&'a str>) -> Self {
        self.pending = text;
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for entry in self.entries {
            let (prefix, style) = match (entry.speaker, entry.hint) {
                (Speaker::Player, _) => ("> ", self.theme.player_style()),
                (Speaker::Narrator, true) => ("Hint: ", self.theme.hint_style()),
                (Speaker::Narrator, false) => ("", self.theme.gm_style()),
            };

            let text = format!("{prefix}{}", entry.text);
            for line in text.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), style)));
            }

            // Blank line between entries
            lines.push(Line::from(""));
        }

        if let Some(pending) = self.pending {
            lines.push(Line::from(Span::styled(
                pending.to_string(),
                self.theme.system_style(),
            )));
        }

        lines
    }
}

fn draw_hint(buf: &mut Buffer, inner: Rect, y: u16, hint: &str) {
    let style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
    for (i, ch) in hint.chars().enumerate() {
        let x = inner.x + (i as u16);
        if x < inner.x + inner.width.saturating_sub(2) {
            buf[(x, y)].set_char(ch).set_style(style);
        }
    }
}

impl Widget for NarrativeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " Story [j/k scroll] "
        } else {
            " Story "
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.lines();

        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        if total_lines <= visible_height {
            return;
        }

        let scrollbar_area = Rect {
            x: inner.x + inner.width.saturating_sub(1),
            y: inner.y,
            width: 1,
            height: inner.height,
        };

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(scrollbar::VERTICAL)
            .thumb_style(Style::default().fg(Color::DarkGray))
            .track_style(Style::default().fg(Color::Black))
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
        scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);

        if scroll > 0 {
            draw_hint(buf, inner, inner.y, &format!(" ↑{scroll} "));
        }
        if scroll < max_scroll {
            let bottom = inner.y + inner.height.saturating_sub(1);
            draw_hint(buf, inner, bottom, &format!(" ↓{} more ", max_scroll - scroll));
        }
    }
}
