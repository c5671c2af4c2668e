//! GameController - the primary public API for escape room play.
//!
//! The controller owns the generator and, while a scenario is being played,
//! the [`SessionState`]. Every command takes `&mut self`, so only one turn can
//! be pending at a time. Turns are computed on a copy of the state and only
//! committed once the narration has arrived and been applied; a failed or
//! dropped call leaves the game exactly as it was.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::generator::{GenerationError, GenerationRequest, Generator, StateSummary};
use crate::gm::{GameMaster, GmConfig};
use crate::policy::{check_exhaustion, check_timeout, remaining_attempts, remaining_time};
use crate::scenario::{self, Difficulty, Scenario};
use crate::state::{Outcome, SessionState, TranscriptEntry, MAX_HINTS};
use crate::tags::{self, GameEvent};

/// Errors from GameController operations.
///
/// Everything except [`SessionError::NoApiKey`] is recoverable and leaves the
/// game untouched.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Generation failed{advice}: {0}", advice = retry_advice(.0))]
    Generation(#[from] GenerationError),

    #[error("No game in progress - select a scenario first")]
    NoActiveGame,

    #[error("A game is already in progress")]
    GameInProgress,

    #[error("The game is over - reset to play again")]
    GameOver,

    #[error("No hints left")]
    NoHintsLeft,

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Nothing to submit")]
    EmptyInput,

    #[error("No API key configured - set ANTHROPIC_API_KEY environment variable")]
    NoApiKey,
}

/// Only transient failures invite the player to resubmit.
fn retry_advice(err: &GenerationError) -> &'static str {
    if err.is_retryable() {
        ", try again"
    } else {
        ""
    }
}

/// Configuration for creating a controller.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Scenario to start immediately, if any.
    pub scenario: Option<String>,

    /// Custom game master instructions.
    pub custom_gm_prompt: Option<String>,

    /// Model to use for the game master.
    pub model: Option<String>,

    /// Maximum tokens for narration.
    pub max_tokens: Option<usize>,

    /// Temperature for generation.
    pub temperature: Option<f32>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start this scenario as soon as the session is up.
    pub fn with_scenario(mut self, id: impl Into<String>) -> Self {
        self.scenario = Some(id.into());
        self
    }

    /// Append instructions to the game master prompt.
    pub fn with_gm_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_gm_prompt = Some(prompt.into());
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens for responses.
    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set temperature for generation.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// The game master configuration this session asks for.
    pub fn gm_config(&self) -> GmConfig {
        let defaults = GmConfig::default();
        GmConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            custom_system_prompt: self.custom_gm_prompt.clone(),
        }
    }
}

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// No scenario chosen.
    Selecting,
    Playing,
    Won,
    Lost,
}

impl From<Outcome> for Phase {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Playing => Phase::Playing,
            Outcome::Won => Phase::Won,
            Outcome::Lost(_) => Phase::Lost,
        }
    }
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Cleaned narration, absent when the turn ended the game before a call.
    pub narration: Option<String>,

    /// Notifications from the tags in the narration.
    pub events: Vec<GameEvent>,

    /// The outcome after the turn.
    pub outcome: Outcome,
}

/// Everything a display needs to draw the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStatus {
    pub game_id: String,
    pub scenario_id: &'static str,
    pub scenario_title: &'static str,
    pub difficulty: Difficulty,
    pub location: String,
    pub inventory: Vec<String>,
    pub clues: Vec<String>,
    pub hint_count: u8,
    pub max_hints: u8,
    /// Grace actions left, only once hints are used up.
    pub remaining_attempts: Option<u32>,
    /// Seconds left on the clock.
    pub remaining_secs: i64,
    pub outcome: Outcome,
}

impl GameStatus {
    /// Remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        crate::policy::format_clock(chrono::TimeDelta::seconds(self.remaining_secs))
    }
}

struct ActiveGame {
    id: Uuid,
    scenario: &'static Scenario,
    state: SessionState,
}

/// Drives one escape room game at a time.
pub struct GameController<G> {
    generator: G,
    game: Option<ActiveGame>,
}

impl GameController<GameMaster> {
    /// Create a controller backed by Claude.
    ///
    /// Requires `ANTHROPIC_API_KEY` environment variable to be set. Does not
    /// start the configured scenario; see [`crate::headless::HeadlessGame`].
    pub fn from_env(config: &SessionConfig) -> Result<Self, SessionError> {
        let gm = GameMaster::from_env()
            .map_err(|_| SessionError::NoApiKey)?
            .with_config(config.gm_config());
        Ok(Self::new(gm))
    }
}

impl<G: Generator> GameController<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            game: None,
        }
    }

    /// Begin a scenario and play its opening narration.
    pub async fn select_scenario(&mut self, id: &str) -> Result<TurnReport, SessionError> {
        if let Some(ref game) = self.game {
            return Err(if game.state.game_over {
                SessionError::GameOver
            } else {
                SessionError::GameInProgress
            });
        }
        let scenario = scenario::find(id).ok_or_else(|| SessionError::UnknownScenario(id.to_string()))?;

        let mut state = SessionState::started(scenario.difficulty, Utc::now());
        self.generator.reset();
        let raw = self
            .generator
            .generate(GenerationRequest::start(scenario.start_prompt))
            .await?;

        let parsed = tags::parse(&raw, &mut state);
        state.record(TranscriptEntry::narrator(raw, parsed.text.clone()));

        let id = Uuid::new_v4();
        info!(game_id = %id, scenario = scenario.id, difficulty = scenario.difficulty.level(), "game started");
        let outcome = state.outcome();
        self.game = Some(ActiveGame { id, scenario, state });

        Ok(TurnReport {
            narration: Some(parsed.text),
            events: parsed.events,
            outcome,
        })
    }

    /// Play one player action.
    pub async fn submit_action(&mut self, input: &str) -> Result<TurnReport, SessionError> {
        let Some(game) = self.game.as_mut() else {
            return Err(SessionError::NoActiveGame);
        };
        ensure_playing(game, Utc::now())?;

        let input = input.trim();
        if input.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let mut working = game.state.clone();
        working.record(TranscriptEntry::player(input));
        check_exhaustion(&mut working);

        if working.game_over {
            info!(game_id = %game.id, "game ended before narration");
            let outcome = working.outcome();
            game.state = working;
            return Ok(TurnReport {
                narration: None,
                events: Vec::new(),
                outcome,
            });
        }

        let summary = StateSummary::capture(&working, game.scenario.difficulty);
        let raw = self
            .generator
            .generate(GenerationRequest::action(summary, input))
            .await
            .inspect_err(|err| warn!(game_id = %game.id, error = %err, "action not recorded"))?;

        let parsed = tags::parse(&raw, &mut working);
        working.record(TranscriptEntry::narrator(raw, parsed.text.clone()));
        debug!(game_id = %game.id, events = parsed.events.len(), "action applied");

        let outcome = working.outcome();
        if outcome.is_over() {
            info!(game_id = %game.id, ?outcome, "game finished");
        }
        game.state = working;

        Ok(TurnReport {
            narration: Some(parsed.text),
            events: parsed.events,
            outcome,
        })
    }

    /// Spend a hint and play the game master's answer.
    ///
    /// Hint narration is only cleaned; tags in it are not applied.
    pub async fn request_hint(&mut self) -> Result<TurnReport, SessionError> {
        let Some(game) = self.game.as_mut() else {
            return Err(SessionError::NoActiveGame);
        };
        ensure_playing(game, Utc::now())?;

        let mut working = game.state.clone();
        if !working.take_hint() {
            return Err(SessionError::NoHintsLeft);
        }

        let raw = self
            .generator
            .generate(GenerationRequest::hint())
            .await
            .inspect_err(|err| warn!(game_id = %game.id, error = %err, "hint refunded"))?;

        let text = tags::clean(&raw);
        working.record(TranscriptEntry::hint(raw, text.clone()));
        info!(game_id = %game.id, hints_left = working.hint_count, "hint given");

        let outcome = working.outcome();
        game.state = working;

        Ok(TurnReport {
            narration: Some(text),
            events: Vec::new(),
            outcome,
        })
    }

    /// Discard the game and the generator's conversation.
    pub fn reset(&mut self) {
        if let Some(game) = self.game.take() {
            info!(game_id = %game.id, "game reset");
        }
        self.generator.reset();
    }

    /// Run the timeout check against the current time.
    pub fn tick(&mut self) -> Phase {
        self.tick_at(Utc::now())
    }

    /// Run the timeout check as of `now`.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Phase {
        if let Some(ref mut game) = self.game {
            check_timeout(&mut game.state, now);
        }
        self.phase()
    }

    pub fn phase(&self) -> Phase {
        match self.game {
            Some(ref game) => game.state.outcome().into(),
            None => Phase::Selecting,
        }
    }

    /// The transcript of the current game, empty while selecting.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        self.game
            .as_ref()
            .map(|game| game.state.history())
            .unwrap_or_default()
    }

    /// Sidebar status as of now, or `None` while selecting.
    ///
    /// Runs the timeout check first, so an expired clock reads as lost.
    pub fn status(&mut self) -> Option<GameStatus> {
        self.status_at(Utc::now())
    }

    pub fn status_at(&mut self, now: DateTime<Utc>) -> Option<GameStatus> {
        self.tick_at(now);
        let game = self.game.as_ref()?;
        let state = &game.state;
        Some(GameStatus {
            game_id: game.id.to_string(),
            scenario_id: game.scenario.id,
            scenario_title: game.scenario.title,
            difficulty: game.scenario.difficulty,
            location: state.location.clone(),
            inventory: state.inventory().to_vec(),
            clues: state.clues().to_vec(),
            hint_count: state.hint_count,
            max_hints: MAX_HINTS,
            remaining_attempts: remaining_attempts(state),
            remaining_secs: remaining_time(state, now)
                .map(|left| left.num_seconds())
                .unwrap_or_default(),
            outcome: state.outcome(),
        })
    }

    /// The live game state, if a scenario is active.
    pub fn state(&self) -> Option<&SessionState> {
        self.game.as_ref().map(|game| &game.state)
    }

    pub fn scenario(&self) -> Option<&'static Scenario> {
        self.game.as_ref().map(|game| game.scenario)
    }

    /// Get a reference to the generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Get a mutable reference to the generator.
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }
}

/// Apply the timeout check and refuse finished games.
fn ensure_playing(game: &mut ActiveGame, now: DateTime<Utc>) -> Result<(), SessionError> {
    check_timeout(&mut game.state, now);
    if game.state.game_over {
        return Err(SessionError::GameOver);
    }
    Ok(())
}
