//! Testing utilities for the escape room.
//!
//! This module provides tools for integration testing:
//! - `MockGenerator` for deterministic testing without API calls
//! - `TestHarness` for scripted games
//! - Assertion helpers for verifying game state

use async_trait::async_trait;

use crate::generator::{GenerationError, GenerationRequest, Generator};
use crate::session::{GameController, SessionError, TurnReport};
use crate::state::{Outcome, SessionState};

/// A generator that returns scripted responses.
///
/// Every request it receives is recorded so tests can check what would have
/// been sent to the model.
#[derive(Debug, Default)]
pub struct MockGenerator {
    /// Scripted responses to return in order.
    responses: Vec<MockResponse>,
    /// Index of next response to return.
    response_index: usize,
    requests: Vec<GenerationRequest>,
    reset_count: usize,
}

/// A scripted generator result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Raw narration, tags included.
    Narrative(String),
    /// Fail the call with this message.
    Failure(String),
}

impl MockResponse {
    pub fn narrative(text: impl Into<String>) -> Self {
        MockResponse::Narrative(text.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        MockResponse::Failure(message.into())
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a narrative response.
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.queue_response(MockResponse::narrative(text));
        self
    }

    /// Queue a failing call.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.queue_response(MockResponse::failure(message));
        self
    }

    /// Add a response to the queue.
    pub fn queue_response(&mut self, response: MockResponse) {
        self.responses.push(response);
    }

    /// Every request received so far, including failed ones.
    pub fn requests(&self) -> &[GenerationRequest] {
        &self.requests
    }

    /// How many times the conversation was reset.
    pub fn reset_count(&self) -> usize {
        self.reset_count
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&mut self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.requests.push(request);

        let response = match self.responses.get(self.response_index) {
            Some(response) => {
                self.response_index += 1;
                response.clone()
            }
            None => MockResponse::narrative("The game master has no more scripted responses."),
        };

        match response {
            MockResponse::Narrative(text) => Ok(text),
            MockResponse::Failure(message) => Err(GenerationError::Unavailable(message)),
        }
    }

    fn reset(&mut self) {
        self.reset_count += 1;
    }
}

/// Test harness for running scripted games.
pub struct TestHarness {
    pub controller: GameController<MockGenerator>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            controller: GameController::new(MockGenerator::new()),
        }
    }

    /// Queue a narrative response.
    pub fn expect_narrative(&mut self, text: impl Into<String>) -> &mut Self {
        self.controller
            .generator_mut()
            .queue_response(MockResponse::narrative(text));
        self
    }

    /// Queue a failing generation call.
    pub fn expect_failure(&mut self, message: impl Into<String>) -> &mut Self {
        self.controller
            .generator_mut()
            .queue_response(MockResponse::failure(message));
        self
    }

    /// Select a scenario.
    pub async fn start(&mut self, scenario: &str) -> Result<TurnReport, SessionError> {
        self.controller.select_scenario(scenario).await
    }

    /// Send player input.
    pub async fn input(&mut self, text: &str) -> Result<TurnReport, SessionError> {
        self.controller.submit_action(text).await
    }

    /// Ask for a hint.
    pub async fn hint(&mut self) -> Result<TurnReport, SessionError> {
        self.controller.request_hint().await
    }

    /// The live state. Panics while no game is active.
    #[track_caller]
    pub fn state(&self) -> &SessionState {
        match self.controller.state() {
            Some(state) => state,
            None => panic!("Expected an active game"),
        }
    }

    /// Requests the mock has received.
    pub fn requests(&self) -> &[GenerationRequest] {
        self.controller.generator().requests()
    }

    /// Get the last cleaned transcript line.
    pub fn last_text(&self) -> Option<&str> {
        self.controller
            .transcript()
            .last()
            .map(|entry| entry.text.as_str())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that the inventory holds an item.
#[track_caller]
pub fn assert_has_item(harness: &TestHarness, item: &str) {
    assert!(
        harness.state().inventory().iter().any(|i| i == item),
        "Expected item '{item}' in inventory {:?}",
        harness.state().inventory()
    );
}

/// Assert that a clue has been discovered.
#[track_caller]
pub fn assert_has_clue(harness: &TestHarness, clue: &str) {
    assert!(
        harness.state().clues().iter().any(|c| c == clue),
        "Expected clue '{clue}' in {:?}",
        harness.state().clues()
    );
}

/// Assert the remaining hint count.
#[track_caller]
pub fn assert_hints(harness: &TestHarness, expected: u8) {
    let actual = harness.state().hint_count;
    assert_eq!(actual, expected, "Expected {expected} hints, got {actual}");
}

/// Assert the current outcome.
#[track_caller]
pub fn assert_outcome(harness: &TestHarness, expected: Outcome) {
    let actual = harness.state().outcome();
    assert_eq!(actual, expected, "Expected outcome {expected:?}, got {actual:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::RequestKind;
    use crate::state::MAX_HINTS;

    #[tokio::test]
    async fn test_mock_returns_in_order() {
        let mut mock = MockGenerator::new()
            .with_response("Response 1")
            .with_response("Response 2");

        assert_eq!(mock.generate(GenerationRequest::hint()).await.unwrap(), "Response 1");
        assert_eq!(mock.generate(GenerationRequest::hint()).await.unwrap(), "Response 2");

        // After scripted responses exhausted, get default
        let fallback = mock.generate(GenerationRequest::hint()).await.unwrap();
        assert!(fallback.contains("no more scripted"));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mut mock = MockGenerator::new().with_failure("rate limited");
        let err = mock.generate(GenerationRequest::start("go")).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(ref m) if m == "rate limited"));
        assert_eq!(mock.requests()[0].kind, RequestKind::Start);
    }

    #[tokio::test]
    async fn test_harness_basic() {
        let mut harness = TestHarness::new();
        harness
            .expect_narrative("A cold lab. [LOCATION_UPDATE: \"Lab\"]")
            .expect_narrative("You find a keycard. [ITEM_ADD: \"keycard\"]");

        harness.start("laboratory").await.unwrap();
        let report = harness.input("search the desk").await.unwrap();

        assert_eq!(report.narration.as_deref(), Some("You find a keycard."));
        assert_has_item(&harness, "keycard");
        assert_hints(&harness, MAX_HINTS);
        assert_outcome(&harness, Outcome::Playing);
        assert_eq!(harness.last_text(), Some("You find a keycard."));
    }

    #[tokio::test]
    async fn test_harness_clue_and_win() {
        let mut harness = TestHarness::new();
        harness
            .expect_narrative("Dusty shelves.")
            .expect_narrative("A note: the code is 4-1-7. [CLUE_ADD: \"code 417\"]")
            .expect_narrative("The door swings open! [GAME_WIN]");

        harness.start("library").await.unwrap();
        harness.input("read the note").await.unwrap();
        assert_has_clue(&harness, "code 417");

        harness.input("enter 417").await.unwrap();
        assert_outcome(&harness, Outcome::Won);
    }
}
