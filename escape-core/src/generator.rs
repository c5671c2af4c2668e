//! The narrative generation seam.
//!
//! The controller never talks to a model directly. It builds a
//! [`GenerationRequest`] and hands it to a [`Generator`], which returns raw
//! narrative text that may contain control tags.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::scenario::Difficulty;
use crate::state::SessionState;

/// Instruction sent in place of player text when a hint is requested.
pub const HINT_INSTRUCTION: &str = "The player has asked for a hint. Give a hint that \
    matches how far they have progressed on the current puzzle, following the hint rules.";

/// Errors from a generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Claude API error: {0}")]
    Api(#[from] claude::Error),

    #[error("Generation unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    /// Whether sending the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Api(err) => err.is_retryable(),
            GenerationError::Unavailable(_) => true,
        }
    }
}

/// What a generation call is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestKind {
    /// Opening narration for a newly selected scenario.
    Start,
    /// A player action.
    Action,
    /// A hint for the current puzzle.
    Hint,
}

/// Snapshot of the game state sent ahead of a player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub location: String,
    pub inventory: Vec<String>,
    pub clues: Vec<String>,
    pub hint_count: u8,
    pub difficulty: Difficulty,
}

impl StateSummary {
    pub fn capture(state: &SessionState, difficulty: Difficulty) -> Self {
        Self {
            location: state.location.clone(),
            inventory: state.inventory().to_vec(),
            clues: state.clues().to_vec(),
            hint_count: state.hint_count,
            difficulty,
        }
    }

    /// Render the summary as the block that precedes the player's text.
    pub fn render(&self) -> String {
        format!(
            "Current game state:\n\
             - Location: {}\n\
             - Inventory: {}\n\
             - Clues found: {}\n\
             - Hints remaining: {}\n\
             - Difficulty: {}",
            self.location,
            list_or_none(&self.inventory),
            list_or_none(&self.clues),
            self.hint_count,
            self.difficulty.name(),
        )
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// One call to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub kind: RequestKind,
    /// Present only for [`RequestKind::Action`].
    pub context: Option<StateSummary>,
    pub text: String,
}

impl GenerationRequest {
    /// The opening call for a scenario.
    pub fn start(opening_prompt: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Start,
            context: None,
            text: opening_prompt.into(),
        }
    }

    /// A player action with the state it was taken in.
    pub fn action(context: StateSummary, text: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Action,
            context: Some(context),
            text: text.into(),
        }
    }

    /// A hint request.
    pub fn hint() -> Self {
        Self {
            kind: RequestKind::Hint,
            context: None,
            text: HINT_INSTRUCTION.to_string(),
        }
    }

    /// The user-turn text actually sent to the model.
    pub fn prompt(&self) -> String {
        match &self.context {
            Some(context) => format!("{}\n\n{}", context.render(), self.text),
            None => self.text.clone(),
        }
    }
}

/// A source of narrative text.
#[async_trait]
pub trait Generator: Send {
    /// Produce narration for `request`. Failing leaves any memory unchanged.
    async fn generate(&mut self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// Forget the conversation so far.
    fn reset(&mut self);
}
