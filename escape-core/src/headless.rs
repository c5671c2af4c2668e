//! Headless game interface for programmatic use.
//!
//! This module provides a simplified interface for running escape rooms
//! without a TUI. It's designed for:
//! - Automated testing with real AI responses
//! - Coding agents playing the game
//! - Script-driven game sessions
//!
//! # Example
//!
//! ```ignore
//! use escape_core::headless::{HeadlessConfig, HeadlessGame};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut game, opening) = HeadlessGame::new(HeadlessConfig::new("laboratory")).await?;
//!     println!("{}", opening.narrative);
//!
//!     let response = game.send("I look around the lab").await?;
//!     println!("{}", response.narrative);
//!
//!     println!("Hints: {}", game.hint_count());
//!     println!("Inventory: {:?}", game.inventory());
//!     Ok(())
//! }
//! ```

use crate::generator::Generator;
use crate::gm::GameMaster;
use crate::session::{GameController, GameStatus, SessionConfig, SessionError, TurnReport};
use crate::state::{Outcome, Speaker, TranscriptEntry};
use crate::tags::GameEvent;

/// Configuration for a headless game.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Scenario to play.
    pub scenario: String,
    /// Generator settings.
    pub session: SessionConfig,
}

impl HeadlessConfig {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            session: SessionConfig::default(),
        }
    }

    /// Set the generator settings.
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}

/// Response from a headless command.
#[derive(Debug, Clone)]
pub struct GameResponse {
    /// Cleaned narration, empty when the turn ended the game without one.
    pub narrative: String,
    /// Notifications from the narration's tags.
    pub events: Vec<GameEvent>,
    pub outcome: Outcome,
}

impl From<TurnReport> for GameResponse {
    fn from(report: TurnReport) -> Self {
        Self {
            narrative: report.narration.unwrap_or_default(),
            events: report.events,
            outcome: report.outcome,
        }
    }
}

/// A headless escape room game.
pub struct HeadlessGame<G = GameMaster> {
    controller: GameController<G>,
    scenario: String,
}

impl HeadlessGame<GameMaster> {
    /// Start a game backed by Claude.
    ///
    /// Requires `ANTHROPIC_API_KEY` environment variable to be set.
    pub async fn new(config: HeadlessConfig) -> Result<(Self, GameResponse), SessionError> {
        let controller = GameController::from_env(&config.session)?;
        Self::start(controller, config.scenario).await
    }
}

impl<G: Generator> HeadlessGame<G> {
    /// Start a game with any generator.
    pub async fn with_generator(
        generator: G,
        config: HeadlessConfig,
    ) -> Result<(Self, GameResponse), SessionError> {
        Self::start(GameController::new(generator), config.scenario).await
    }

    async fn start(
        mut controller: GameController<G>,
        scenario: String,
    ) -> Result<(Self, GameResponse), SessionError> {
        let opening = controller.select_scenario(&scenario).await?;
        Ok((Self { controller, scenario }, opening.into()))
    }

    /// Send a player action.
    pub async fn send(&mut self, input: &str) -> Result<GameResponse, SessionError> {
        self.controller.submit_action(input).await.map(Into::into)
    }

    /// Ask for a hint.
    pub async fn hint(&mut self) -> Result<GameResponse, SessionError> {
        self.controller.request_hint().await.map(Into::into)
    }

    /// Discard the game and start the same scenario again.
    pub async fn restart(&mut self) -> Result<GameResponse, SessionError> {
        self.controller.reset();
        self.controller
            .select_scenario(&self.scenario)
            .await
            .map(Into::into)
    }

    /// Current status; an expired clock reads as lost.
    pub fn status(&mut self) -> Option<GameStatus> {
        self.controller.status()
    }

    pub fn is_over(&mut self) -> bool {
        self.controller.tick();
        self.outcome().is_over()
    }

    pub fn outcome(&self) -> Outcome {
        self.controller
            .state()
            .map(|state| state.outcome())
            .unwrap_or(Outcome::Playing)
    }

    pub fn hint_count(&self) -> u8 {
        self.controller.state().map(|s| s.hint_count).unwrap_or_default()
    }

    pub fn inventory(&self) -> &[String] {
        self.controller.state().map(|s| s.inventory()).unwrap_or_default()
    }

    pub fn clues(&self) -> &[String] {
        self.controller.state().map(|s| s.clues()).unwrap_or_default()
    }

    pub fn current_location(&self) -> &str {
        self.controller
            .state()
            .map(|s| s.location.as_str())
            .unwrap_or_default()
    }

    /// Get the full transcript.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        self.controller.transcript()
    }

    /// Get the number of player actions taken.
    pub fn turn_count(&self) -> usize {
        self.transcript()
            .iter()
            .filter(|e| e.speaker == Speaker::Player)
            .count()
    }

    /// Get the last narrator response.
    pub fn last_response(&self) -> Option<&str> {
        self.transcript()
            .iter()
            .rev()
            .find(|e| e.speaker == Speaker::Narrator)
            .map(|e| e.text.as_str())
    }

    /// Get the underlying controller.
    pub fn controller(&self) -> &GameController<G> {
        &self.controller
    }

    /// Get mutable access to the underlying controller.
    pub fn controller_mut(&mut self) -> &mut GameController<G> {
        &mut self.controller
    }

    /// Give up the facade and keep driving the controller directly.
    pub fn into_controller(self) -> GameController<G> {
        self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;

    #[tokio::test]
    async fn test_headless_flow() {
        let mock = MockGenerator::new()
            .with_response("You wake up on a couch.")
            .with_response("A photo frame. [ITEM_ADD: \"photo\"]");

        let (mut game, opening) = HeadlessGame::with_generator(mock, HeadlessConfig::new("apartment"))
            .await
            .unwrap();
        assert_eq!(opening.narrative, "You wake up on a couch.");

        let response = game.send("look at the shelf").await.unwrap();
        assert_eq!(response.events, vec![GameEvent::ItemAcquired("photo".to_string())]);
        assert_eq!(game.inventory(), ["photo"]);
        assert_eq!(game.turn_count(), 1);
        assert_eq!(game.last_response(), Some("A photo frame."));
        assert!(!game.is_over());
    }

    #[tokio::test]
    async fn test_headless_restart() {
        let mock = MockGenerator::new()
            .with_response("Intro.")
            .with_response("Found it. [ITEM_ADD: \"key\"]")
            .with_response("Intro again.");

        let (mut game, _) = HeadlessGame::with_generator(mock, HeadlessConfig::new("library"))
            .await
            .unwrap();
        game.send("search").await.unwrap();

        let response = game.restart().await.unwrap();
        assert_eq!(response.narrative, "Intro again.");
        assert!(game.inventory().is_empty());
        assert_eq!(game.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_scenario() {
        let result =
            HeadlessGame::with_generator(MockGenerator::new(), HeadlessConfig::new("spaceship")).await;
        assert!(matches!(result, Err(SessionError::UnknownScenario(_))));
    }
}
