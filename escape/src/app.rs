//! Main application state and logic

use std::collections::VecDeque;
use std::time::Instant;

use escape_core::scenario::{self, Scenario};
use escape_core::{GameEvent, GameStatus, Phase, TranscriptEntry};
use tokio::sync::mpsc;

use crate::ui::theme::GameTheme;
use crate::ui::Overlay;
use crate::worker::{GameSnapshot, WorkerRequest, WorkerResponse};

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - free text input
    Insert,
    /// Command mode - entering : commands
    Command,
}

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ScenarioSelect,
    Game,
    GameOver,
}

/// Main application state
pub struct App {
    // Channel communication with the worker
    pub request_tx: mpsc::Sender<WorkerRequest>,
    pub response_rx: mpsc::Receiver<WorkerResponse>,

    // Local game snapshot for rendering
    pub phase: Phase,
    status: Option<GameStatus>,
    status_received: Instant,
    pub transcript: Vec<TranscriptEntry>,

    // UI state
    pub theme: GameTheme,
    overlay: Option<Overlay>,
    pub selected_scenario: usize,

    // Transcript display
    pub narrative_scroll: usize,
    pub scroll_locked_to_bottom: bool, // True = auto-scroll on new content

    // Input state
    pub input_mode: InputMode,
    input_buffer: String,
    cursor_position: usize,
    pub input_history: VecDeque<String>,
    pub history_index: Option<usize>,
    pub saved_input: Option<String>, // Saved current input when browsing history

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,

    // Worker processing
    pub ai_processing: bool,
}

impl App {
    /// Create a new application with channel endpoints and initial game state
    pub fn new(
        request_tx: mpsc::Sender<WorkerRequest>,
        response_rx: mpsc::Receiver<WorkerResponse>,
        snapshot: GameSnapshot,
    ) -> Self {
        let mut app = Self {
            request_tx,
            response_rx,
            phase: Phase::Selecting,
            status: None,
            status_received: Instant::now(),
            transcript: Vec::new(),
            theme: GameTheme::default(),
            overlay: None,
            selected_scenario: 0,
            narrative_scroll: 0,
            scroll_locked_to_bottom: true,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            input_history: VecDeque::with_capacity(100),
            history_index: None,
            saved_input: None,
            status_message: None,
            should_quit: false,
            animation_frame: 0,
            ai_processing: false,
        };
        app.apply_snapshot(snapshot);
        app
    }

    pub fn screen(&self) -> Screen {
        match self.phase {
            Phase::Selecting => Screen::ScenarioSelect,
            Phase::Playing => Screen::Game,
            Phase::Won | Phase::Lost => Screen::GameOver,
        }
    }

    /// The catalog shown on the selection screen
    pub fn scenarios(&self) -> &'static [Scenario] {
        scenario::catalog()
    }

    pub fn select_next(&mut self) {
        let count = self.scenarios().len();
        self.selected_scenario = (self.selected_scenario + 1) % count;
    }

    pub fn select_prev(&mut self) {
        let count = self.scenarios().len();
        self.selected_scenario = (self.selected_scenario + count - 1) % count;
    }

    /// Ask the worker to start the highlighted scenario
    pub fn start_selected(&mut self) {
        let Some(scenario) = self.scenarios().get(self.selected_scenario) else {
            return;
        };
        self.send_request(
            WorkerRequest::SelectScenario(scenario.id.to_string()),
            format!("Entering {}...", scenario.title),
        );
    }

    /// Enter command mode (starts with :)
    pub fn enter_command_mode(&mut self) {
        self.input_mode = InputMode::Command;
        self.input_buffer.clear();
        self.input_buffer.push(':');
        self.cursor_position = 1;
    }

    /// Exit to normal mode
    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        // Clear command buffer when leaving command mode
        if self.input_buffer.starts_with(':') {
            self.input_buffer.clear();
            self.cursor_position = 0;
        }
    }

    /// Replace the local snapshot with one from the worker
    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        let grew = snapshot.transcript.len() != self.transcript.len();
        self.phase = snapshot.phase;
        self.set_game_status(snapshot.status);
        self.transcript = snapshot.transcript;

        if self.phase == Phase::Selecting {
            self.narrative_scroll = 0;
            self.scroll_locked_to_bottom = true;
        } else if grew && self.scroll_locked_to_bottom {
            self.scroll_to_bottom();
        }
    }

    fn set_game_status(&mut self, status: Option<GameStatus>) {
        self.status = status;
        self.status_received = Instant::now();
    }

    /// Latest status from the worker
    pub fn game_status(&self) -> Option<&GameStatus> {
        self.status.as_ref()
    }

    /// Seconds left, counted down locally between worker updates
    pub fn remaining_secs(&self) -> i64 {
        let Some(ref status) = self.status else {
            return 0;
        };
        if status.outcome.is_over() {
            return status.remaining_secs;
        }
        let elapsed = self.status_received.elapsed().as_secs() as i64;
        (status.remaining_secs - elapsed).max(0)
    }

    /// Drain worker responses without blocking
    pub fn poll_worker(&mut self) {
        while let Ok(response) = self.response_rx.try_recv() {
            self.handle_response(response);
        }
    }

    pub fn handle_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Complete { events, snapshot } => {
                self.ai_processing = false;
                self.apply_snapshot(snapshot);
                self.announce(&events);
            }
            WorkerResponse::Error { message, snapshot } => {
                self.ai_processing = false;
                self.apply_snapshot(snapshot);
                self.set_status(format!("Error: {message}"));
            }
            WorkerResponse::Status { phase, status } => {
                self.phase = phase;
                self.set_game_status(status);
            }
        }
    }

    fn announce(&mut self, events: &[GameEvent]) {
        if events.is_empty() {
            self.clear_status();
            return;
        }
        let notices: Vec<String> = events.iter().map(GameEvent::describe).collect();
        self.set_status(notices.join(" | "));
    }

    /// Scroll transcript to bottom and lock to bottom
    pub fn scroll_to_bottom(&mut self) {
        // Set to max value - the widget will cap it to actual max_scroll
        self.narrative_scroll = usize::MAX / 2;
        self.scroll_locked_to_bottom = true;
    }

    /// Estimate max scroll based on transcript content
    /// Uses conservative estimate assuming ~60 char effective width
    fn estimate_max_scroll(&self) -> usize {
        const ESTIMATED_WIDTH: usize = 60;
        const ESTIMATED_VISIBLE_HEIGHT: usize = 20;

        let estimated_lines: usize = self
            .transcript
            .iter()
            .map(|entry| {
                entry
                    .text
                    .lines()
                    .map(|line| (line.len() / ESTIMATED_WIDTH).max(1))
                    .sum::<usize>()
                    + 1 // blank line between entries
            })
            .sum();

        estimated_lines.saturating_sub(ESTIMATED_VISIBLE_HEIGHT)
    }

    /// Scroll transcript up (unlocks from bottom)
    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.estimate_max_scroll();
        if self.narrative_scroll > max_scroll {
            self.narrative_scroll = max_scroll;
        }
        self.narrative_scroll = self.narrative_scroll.saturating_sub(lines);
        self.scroll_locked_to_bottom = false;
    }

    /// Scroll transcript down
    pub fn scroll_down(&mut self, lines: usize) {
        self.narrative_scroll = self.narrative_scroll.saturating_add(lines);
        let max_scroll = self.estimate_max_scroll();
        self.narrative_scroll = self.narrative_scroll.min(max_scroll + 100);
    }

    /// Submit current input
    pub fn submit_input(&mut self) -> Option<String> {
        if self.input_buffer.is_empty() {
            return None;
        }

        let input = std::mem::take(&mut self.input_buffer);
        self.cursor_position = 0;

        // Add to history (if not a command)
        if !input.starts_with(':') {
            self.input_history.push_front(input.clone());
            if self.input_history.len() > 100 {
                self.input_history.pop_back();
            }
        }
        self.history_index = None;
        self.saved_input = None;

        Some(input)
    }

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position)
            {
                self.input_buffer
                    .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position) {
            self.input_buffer
                .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    /// Move cursor to start
    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    /// Move cursor to end (unicode-safe)
    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Navigate to previous input in history
    pub fn history_prev(&mut self) {
        if self.input_history.is_empty() {
            return;
        }

        // Save current input if we're just starting to browse history
        if self.history_index.is_none() && !self.input_buffer.is_empty() {
            self.saved_input = Some(self.input_buffer.clone());
        }

        let new_index = match self.history_index {
            None => 0,
            Some(i) if i + 1 < self.input_history.len() => i + 1,
            Some(i) => i, // Already at oldest
        };

        if let Some(entry) = self.input_history.get(new_index) {
            self.input_buffer = entry.clone();
            self.cursor_position = self.input_buffer.chars().count();
            self.history_index = Some(new_index);
        }
    }

    /// Navigate to next input in history
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                // Return to saved input or empty
                self.input_buffer = self.saved_input.take().unwrap_or_default();
                self.cursor_position = self.input_buffer.chars().count();
                self.history_index = None;
            }
            Some(i) => {
                if let Some(entry) = self.input_history.get(i - 1) {
                    self.input_buffer = entry.clone();
                    self.cursor_position = self.input_buffer.chars().count();
                    self.history_index = Some(i - 1);
                }
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    /// Close any open overlay
    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Process a colon command
    pub fn process_command(&mut self, command: &str) {
        let cmd = command.trim_start_matches(':');
        let parts: Vec<&str> = cmd.split_whitespace().collect();

        let Some(&name) = parts.first() else {
            return;
        };

        match name {
            "q" | "quit" | "exit" => {
                self.should_quit = true;
            }
            "hint" => self.request_hint(),
            "new" | "reset" => self.request_reset(),
            "help" | "h" => self.toggle_help(),
            _ => {
                self.set_status(format!("Unknown command: {name}"));
            }
        }
    }

    /// Send a player action to the worker
    pub fn send_player_action(&mut self, input: String) {
        if input.trim().is_empty() {
            return;
        }
        self.send_request(WorkerRequest::PlayerAction(input), "The game master is thinking...");
    }

    /// Ask the worker for a hint
    pub fn request_hint(&mut self) {
        if self.screen() != Screen::Game {
            return;
        }
        if self.status.as_ref().is_some_and(|s| s.hint_count == 0) {
            self.set_status("No hints left");
            return;
        }
        self.send_request(WorkerRequest::Hint, "Asking for a hint...");
    }

    /// Ask the worker to discard the game
    pub fn request_reset(&mut self) {
        self.send_request(WorkerRequest::Reset, "Starting over...");
    }

    fn send_request(&mut self, request: WorkerRequest, status: impl Into<String>) {
        if self.ai_processing {
            self.set_status("Please wait for the game master...");
            return;
        }

        self.ai_processing = true;
        self.set_status(status);

        // Try to send the request (non-blocking)
        if self.request_tx.try_send(request).is_err() {
            self.set_status("Worker busy, please wait...");
            self.ai_processing = false;
        }
    }

    /// Tick for animations and the timeout check
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);

        // A pending command will bring a fresh snapshot anyway
        if self.phase == Phase::Playing && !self.ai_processing {
            let _ = self.request_tx.try_send(WorkerRequest::Tick);
        }
    }

    /// Set status message (always overwrites)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // =========================================================================
    // Getters for private fields
    // =========================================================================

    /// Get the current overlay
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Get the current status message
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Get the current input buffer
    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    /// Get the current cursor position
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Check if an overlay is currently open
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Clear the input buffer
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> (App, mpsc::Receiver<WorkerRequest>, mpsc::Sender<WorkerResponse>) {
        let (request_tx, request_rx) = mpsc::channel(8);
        let (response_tx, response_rx) = mpsc::channel(8);
        let snapshot = GameSnapshot {
            phase: Phase::Selecting,
            status: None,
            transcript: Vec::new(),
        };
        (App::new(request_tx, response_rx, snapshot), request_rx, response_tx)
    }

    #[test]
    fn test_unicode_editing() {
        let (mut app, _rx, _tx) = test_app();
        for c in "열쇠 key".chars() {
            app.type_char(c);
        }
        app.cursor_home();
        app.cursor_right();
        app.backspace();
        assert_eq!(app.input_buffer(), "쇠 key");
        app.delete();
        assert_eq!(app.input_buffer(), " key");
    }

    #[test]
    fn test_history_navigation() {
        let (mut app, _rx, _tx) = test_app();
        for entry in ["look", "open door"] {
            for c in entry.chars() {
                app.type_char(c);
            }
            app.submit_input();
        }

        app.type_char('x');
        app.history_prev();
        assert_eq!(app.input_buffer(), "open door");
        app.history_prev();
        assert_eq!(app.input_buffer(), "look");
        app.history_next();
        app.history_next();
        assert_eq!(app.input_buffer(), "x");
    }

    #[test]
    fn test_scenario_selection_wraps() {
        let (mut app, mut rx, _tx) = test_app();
        app.select_prev();
        assert_eq!(app.selected_scenario, app.scenarios().len() - 1);
        app.select_next();
        assert_eq!(app.selected_scenario, 0);

        app.start_selected();
        assert!(app.ai_processing);
        assert!(matches!(
            rx.try_recv(),
            Ok(WorkerRequest::SelectScenario(ref id)) if id == "laboratory"
        ));
    }

    #[test]
    fn test_one_request_at_a_time() {
        let (mut app, mut rx, _tx) = test_app();
        app.phase = Phase::Playing;
        app.send_player_action("look".to_string());
        app.send_player_action("run".to_string());

        assert!(matches!(rx.try_recv(), Ok(WorkerRequest::PlayerAction(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(app.status_message(), Some("Please wait for the game master..."));
    }

    #[test]
    fn test_error_response_clears_processing() {
        let (mut app, _rx, _tx) = test_app();
        app.phase = Phase::Playing;
        app.send_player_action("look".to_string());
        app.handle_response(WorkerResponse::Error {
            message: "overloaded".to_string(),
            snapshot: GameSnapshot {
                phase: Phase::Playing,
                status: None,
                transcript: Vec::new(),
            },
        });
        assert!(!app.ai_processing);
        assert_eq!(app.status_message(), Some("Error: overloaded"));
    }

    #[test]
    fn test_game_over_screen() {
        let (mut app, _rx, _tx) = test_app();
        app.handle_response(WorkerResponse::Status {
            phase: Phase::Lost,
            status: None,
        });
        assert_eq!(app.screen(), Screen::GameOver);
    }
}
