//! Screen layout calculations

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the in-game screen (70/30 split)
#[derive(Debug, Clone, Copy)]
pub struct GameLayout {
    pub title_area: Rect,
    pub narrative_area: Rect,
    pub sidebar_area: Rect,
    pub status_bar: Rect,
    pub input_area: Rect,
}

impl GameLayout {
    pub fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[1]);

        Self {
            title_area: rows[0],
            narrative_area: columns[0],
            sidebar_area: columns[1],
            status_bar: rows[2],
            input_area: rows[3],
        }
    }
}

/// Areas of the scenario selection screen
#[derive(Debug, Clone, Copy)]
pub struct SelectLayout {
    pub title_area: Rect,
    pub list_area: Rect,
    pub detail_area: Rect,
    pub status_bar: Rect,
}

impl SelectLayout {
    pub fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);

        Self {
            title_area: rows[0],
            list_area: columns[0],
            detail_area: columns[1],
            status_bar: rows[2],
        }
    }
}

/// A rectangle of fixed size centered in `area`, clamped to fit
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(50, 6, area);
        assert_eq!(rect, Rect::new(0, 2, 40, 6));
    }

    #[test]
    fn test_game_layout_fills_area() {
        let layout = GameLayout::calculate(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.title_area.height, 1);
        assert_eq!(layout.input_area.height, 3);
        assert_eq!(layout.narrative_area.width + layout.sidebar_area.width, 100);
    }
}
