//! Render orchestration for the escape room TUI

use escape_core::{LossReason, Outcome, Phase};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Screen};
use crate::ui::layout::{centered_rect_fixed, GameLayout, SelectLayout};
use crate::ui::widgets::scenario_list::scenario_details;
use crate::ui::widgets::{InputWidget, NarrativeWidget, ScenarioListWidget, StatusPanelWidget};

/// Overlay types
#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
}

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.screen() {
        Screen::ScenarioSelect => render_selection(frame, app, area),
        Screen::Game => render_game(frame, app, area),
        Screen::GameOver => {
            render_game(frame, app, area);
            render_game_over(frame, app, area);
        }
    }

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the scenario selection screen
fn render_selection(frame: &mut Frame, app: &App, area: Rect) {
    let layout = SelectLayout::calculate(area);

    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            "ESCAPE ROOM",
            Style::default()
                .fg(app.theme.border_focused)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Pick a room. The clock starts when the door locks.",
            app.theme.system_style(),
        )),
    ]);
    frame.render_widget(banner, layout.title_area);

    let scenarios = app.scenarios();
    frame.render_widget(
        ScenarioListWidget::new(scenarios, app.selected_scenario, &app.theme),
        layout.list_area,
    );
    if let Some(scenario) = scenarios.get(app.selected_scenario) {
        frame.render_widget(scenario_details(scenario, &app.theme), layout.detail_area);
    }

    render_status_bar(frame, app, layout.status_bar);
}

/// Render the in-game screen (70/30 split)
fn render_game(frame: &mut Frame, app: &App, area: Rect) {
    let layout = GameLayout::calculate(area);

    render_title_bar(frame, app, layout.title_area);

    let pending = app
        .ai_processing
        .then(|| SPINNER[app.animation_frame as usize % SPINNER.len()]);
    let narrative = NarrativeWidget::new(&app.transcript, &app.theme)
        .scroll(app.narrative_scroll)
        .focused(app.input_mode == InputMode::Normal)
        .pending(pending);
    frame.render_widget(narrative, layout.narrative_area);

    if let Some(status) = app.game_status() {
        let panel =
            StatusPanelWidget::new(status, &app.theme).remaining_secs(app.remaining_secs());
        frame.render_widget(panel, layout.sidebar_area);
    }

    render_status_bar(frame, app, layout.status_bar);
    render_input(frame, app, layout.input_area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.game_status() {
        Some(status) => format!(" {} | {} ", status.scenario_title, status.location),
        None => " Escape Room ".to_string(),
    };

    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the one-line status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Insert => " INSERT ",
        InputMode::Command => " COMMAND ",
    };

    let keys = match app.screen() {
        Screen::ScenarioSelect => "j/k select  Enter start  ? help  q quit",
        Screen::Game => "i type  h hint  :q quit  ? help",
        Screen::GameOver => "n new game  q quit",
    };

    let mut spans = vec![
        Span::styled(
            mode,
            Style::default()
                .fg(Color::Black)
                .bg(app.theme.border_focused)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    match app.status_message() {
        Some(message) => spans.push(Span::styled(message.to_string(), app.theme.hint_style())),
        None => spans.push(Span::styled(keys, app.theme.system_style())),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the input area
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = matches!(app.input_mode, InputMode::Insert | InputMode::Command);
    let is_command = matches!(app.input_mode, InputMode::Command);

    let placeholder = if app.ai_processing {
        "The game master is thinking..."
    } else if is_active {
        "What do you do?"
    } else {
        "Press i to act, h for a hint"
    };

    let input_widget = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .active(is_active)
        .command_mode(is_command)
        .placeholder(placeholder);

    frame.render_widget(input_widget, area);
}

/// Render the end-of-game banner over the final transcript
fn render_game_over(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(44, 7, area);
    frame.render_widget(Clear, popup_area);

    let won = app.phase == Phase::Won;
    let reason = app.game_status().and_then(|status| match status.outcome {
        Outcome::Lost(reason) => reason,
        _ => None,
    });
    let (headline, detail) = match (won, reason) {
        (true, _) => ("YOU ESCAPED!", "Congratulations, you made it out."),
        (false, Some(LossReason::TimeUp)) => ("GAME OVER", "Time limit exceeded."),
        (false, Some(LossReason::HintsExhausted)) => {
            ("GAME OVER", "Out of hints and out of chances.")
        }
        (false, None) => ("GAME OVER", "You failed to escape."),
    };

    let lines = vec![
        Line::from(Span::styled(headline, app.theme.outcome_style(won))),
        Line::from(""),
        Line::from(detail),
        Line::from(""),
        Line::from(Span::styled(
            "n: new game   q: quit",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if won { app.theme.won } else { app.theme.lost }));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(ratatui::layout::Alignment::Center),
        popup_area,
    );
}

/// Render overlay
fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(50, 22, area);

    frame.render_widget(Clear, popup_area);

    let underlined = Style::default().add_modifier(Modifier::UNDERLINED);
    let help_text = vec![
        Line::from(Span::styled(
            " Escape Room - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Input Modes:", underlined)),
        Line::from("  i       Enter INSERT mode (type actions)"),
        Line::from("  :       Enter COMMAND mode"),
        Line::from("  Esc     Return to NORMAL mode"),
        Line::from(""),
        Line::from(Span::styled("Navigation (NORMAL mode):", underlined)),
        Line::from("  j/k or ↑/↓     Scroll up/down"),
        Line::from("  Ctrl+u/d       Scroll by half page"),
        Line::from("  g/G            Jump to top/bottom"),
        Line::from("  h              Ask for a hint"),
        Line::from(""),
        Line::from(Span::styled("Commands:", underlined)),
        Line::from("  :hint   Ask for a hint"),
        Line::from("  :new    Abandon and pick another room"),
        Line::from("  :q      Quit"),
        Line::from(""),
        Line::from("Three hints per puzzle. Once they are gone,"),
        Line::from("three more actions and the game is lost."),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}
