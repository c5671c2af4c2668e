//! Scenario picker

use escape_core::Scenario;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::GameTheme;

/// List of scenarios with one highlighted
pub struct ScenarioListWidget<'a> {
    scenarios: &'a [Scenario],
    selected: usize,
    theme: &'a GameTheme,
}

impl<'a> ScenarioListWidget<'a> {
    pub fn new(scenarios: &'a [Scenario], selected: usize, theme: &'a GameTheme) -> Self {
        Self {
            scenarios,
            selected,
            theme,
        }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        self.scenarios
            .iter()
            .enumerate()
            .map(|(i, scenario)| {
                let selected = i == self.selected;
                let marker = if selected { "▶ " } else { "  " };
                let style = self.theme.title_style(selected);
                Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(scenario.title, style),
                    Span::raw(" "),
                    Span::styled(scenario.difficulty.stars(), self.theme.hint_style()),
                ])
            })
            .collect()
    }
}

impl Widget for ScenarioListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Scenarios [j/k, Enter] ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        for line in self.lines() {
            lines.push(line);
            lines.push(Line::from(""));
        }
        Paragraph::new(lines).render(inner, buf);
    }
}

/// Description of the highlighted scenario
pub fn scenario_details<'a>(scenario: &'a Scenario, theme: &GameTheme) -> Paragraph<'a> {
    let lines = vec![
        Line::from(Span::styled(
            scenario.title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} {} · {} minutes",
                scenario.difficulty.stars(),
                scenario.difficulty.name(),
                scenario.difficulty.duration().num_minutes()
            ),
            theme.hint_style(),
        )),
        Line::from(""),
        Line::from(scenario.description),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Briefing ")
                .borders(Borders::ALL)
                .border_style(theme.border_style(false)),
        )
        .wrap(Wrap { trim: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_core::scenario::catalog;

    #[test]
    fn test_marker_follows_selection() {
        let theme = GameTheme::default();
        let lines = ScenarioListWidget::new(catalog(), 1, &theme).lines();
        assert_eq!(lines.len(), catalog().len());
        assert_eq!(lines[0].spans[0].content, "  ");
        assert_eq!(lines[1].spans[0].content, "▶ ");
        assert_eq!(lines[1].spans[1].content, catalog()[1].title);
    }
}
