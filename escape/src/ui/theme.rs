//! Color theme and styling for the escape room TUI

use ratatui::style::{Color, Modifier, Style};

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Clock colors
    pub time_plenty: Color,
    pub time_low: Color,
    pub time_critical: Color,

    // Text colors
    pub player_text: Color,
    pub gm_text: Color,
    pub hint_text: Color,
    pub system_text: Color,

    // Outcome colors
    pub won: Color,
    pub lost: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            time_plenty: Color::Green,
            time_low: Color::Yellow,
            time_critical: Color::Red,

            player_text: Color::Cyan,
            gm_text: Color::White,
            hint_text: Color::Yellow,
            system_text: Color::DarkGray,

            won: Color::LightGreen,
            lost: Color::LightRed,
        }
    }
}

impl GameTheme {
    /// Get style for game master narration
    pub fn gm_style(&self) -> Style {
        Style::default().fg(self.gm_text)
    }

    /// Get style for player actions
    pub fn player_style(&self) -> Style {
        Style::default()
            .fg(self.player_text)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get style for hints
    pub fn hint_style(&self) -> Style {
        Style::default().fg(self.hint_text)
    }

    /// Get style for system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Clock color for the seconds left out of the budget
    pub fn time_color(&self, remaining_secs: i64) -> Color {
        if remaining_secs > 5 * 60 {
            self.time_plenty
        } else if remaining_secs > 60 {
            self.time_low
        } else {
            self.time_critical
        }
    }

    /// Get style for the end-of-game banner
    pub fn outcome_style(&self, won: bool) -> Style {
        Style::default()
            .fg(if won { self.won } else { self.lost })
            .add_modifier(Modifier::BOLD)
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Get title style
    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.border_focused
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_color_thresholds() {
        let theme = GameTheme::default();
        assert_eq!(theme.time_color(20 * 60), Color::Green);
        assert_eq!(theme.time_color(3 * 60), Color::Yellow);
        assert_eq!(theme.time_color(30), Color::Red);
    }
}
