//! Full game flows through the controller with scripted narration.

use chrono::{TimeDelta, Utc};
use escape_core::generator::RequestKind;
use escape_core::state::{LossReason, Outcome, SessionState, MAX_HINTS};
use escape_core::testing::{assert_has_item, assert_hints, assert_outcome, TestHarness};
use escape_core::{GameEvent, Phase, SessionError, Speaker};

async fn started(scenario: &str) -> TestHarness {
    let mut harness = TestHarness::new();
    harness.expect_narrative("The door locks behind you.");
    harness.start(scenario).await.unwrap();
    harness
}

#[tokio::test]
async fn test_opening_request_has_no_summary() {
    let harness = started("laboratory").await;

    let requests = harness.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, RequestKind::Start);
    assert!(requests[0].context.is_none());
    assert!(requests[0].text.contains("Laboratory"));
}

#[tokio::test]
async fn test_action_request_carries_summary() {
    let mut harness = started("laboratory").await;
    harness.expect_narrative("A drawer. [ITEM_ADD: \"fuse\"]");
    harness.input("open the drawer").await.unwrap();
    harness.expect_narrative("Nothing else.");
    harness.input("look under the desk").await.unwrap();

    let request = &harness.requests()[2];
    assert_eq!(request.kind, RequestKind::Action);
    assert_eq!(request.text, "look under the desk");
    let context = request.context.as_ref().unwrap();
    assert_eq!(context.inventory, ["fuse"]);
    assert!(request.prompt().contains("Inventory: fuse"));
}

#[tokio::test]
async fn test_transcript_keeps_raw_and_clean() {
    let mut harness = started("library").await;
    harness.expect_narrative("A hidden lever! [CLUE_ADD: \"lever behind the atlas\"]");
    harness.input("pull the atlas").await.unwrap();

    let transcript = harness.controller.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].speaker, Speaker::Player);
    assert_eq!(transcript[1].text, "pull the atlas");
    assert_eq!(transcript[2].text, "A hidden lever!");
    assert!(transcript[2].raw.contains("[CLUE_ADD:"));
}

#[tokio::test]
async fn test_hint_spends_budget_and_skips_tags() {
    let mut harness = started("library").await;
    harness.expect_narrative("Think about the clock. [ITEM_ADD: \"freebie\"]");

    let report = harness.hint().await.unwrap();
    assert_eq!(report.narration.as_deref(), Some("Think about the clock."));
    assert_hints(&harness, MAX_HINTS - 1);
    assert!(harness.state().inventory().is_empty());

    let last = harness.controller.transcript().last().unwrap();
    assert!(last.hint);
    assert_eq!(harness.requests()[1].kind, RequestKind::Hint);
    assert!(harness.requests()[1].context.is_none());
}

#[tokio::test]
async fn test_no_hints_left() {
    let mut harness = started("library").await;
    for _ in 0..MAX_HINTS {
        harness.expect_narrative("A hint.");
        harness.hint().await.unwrap();
    }

    let before = harness.state().clone();
    let err = harness.hint().await.unwrap_err();
    assert!(matches!(err, SessionError::NoHintsLeft));
    assert_eq!(harness.state(), &before);
}

#[tokio::test]
async fn test_puzzle_solved_refills_hints() {
    let mut harness = started("laboratory").await;
    harness.expect_narrative("Hint one.");
    harness.hint().await.unwrap();
    harness.expect_narrative("The panel opens. [PUZZLE_SOLVED]");

    let report = harness.input("enter the code").await.unwrap();
    assert_eq!(report.events, vec![GameEvent::PuzzleSolved]);
    assert_hints(&harness, MAX_HINTS);
}

#[tokio::test]
async fn test_exhaustion_ends_game_without_call() {
    let mut harness = started("apartment").await;
    for _ in 0..MAX_HINTS {
        harness.expect_narrative("A hint.");
        harness.hint().await.unwrap();
    }

    for attempt in 1..=3 {
        harness.expect_narrative("Still stuck.");
        harness.input("try the door").await.unwrap();
        assert_eq!(harness.state().post_hint_attempts, attempt);
        assert_outcome(&harness, Outcome::Playing);
    }

    let calls_before = harness.requests().len();
    let report = harness.input("try the door again").await.unwrap();
    assert!(report.narration.is_none());
    assert_eq!(report.outcome, Outcome::Lost(Some(LossReason::HintsExhausted)));
    assert_eq!(harness.requests().len(), calls_before);

    let last = harness.controller.transcript().last().unwrap();
    assert_eq!(last.speaker, Speaker::Player);
    assert_eq!(last.text, "try the door again");

    let err = harness.input("anything").await.unwrap_err();
    assert!(matches!(err, SessionError::GameOver));
}

#[tokio::test]
async fn test_generation_failure_leaves_state_untouched() {
    let mut harness = started("laboratory").await;
    let before = harness.state().clone();

    harness.expect_failure("overloaded");
    let err = harness.input("open the vent").await.unwrap_err();
    assert!(matches!(err, SessionError::Generation(_)));
    assert_eq!(harness.state(), &before);

    harness.expect_failure("overloaded");
    harness.hint().await.unwrap_err();
    assert_eq!(harness.state(), &before);
    assert_hints(&harness, MAX_HINTS);

    harness.expect_narrative("The vent creaks open.");
    harness.input("open the vent").await.unwrap();
    assert_eq!(harness.controller.transcript().len(), 3);
}

#[tokio::test]
async fn test_win_with_item_in_same_response() {
    let mut harness = started("laboratory").await;
    harness.expect_narrative("[GAME_WIN] Sunlight! [ITEM_ADD: \"notebook\"]");

    let report = harness.input("run outside").await.unwrap();
    assert_eq!(report.outcome, Outcome::Won);
    assert_eq!(report.narration.as_deref(), Some("Sunlight!"));
    assert_has_item(&harness, "notebook");
    assert_eq!(harness.controller.phase(), Phase::Won);
}

#[tokio::test]
async fn test_timeout_blocks_turns() {
    let mut harness = started("laboratory").await;
    let start = harness.state().start_time.unwrap();

    assert_eq!(harness.controller.tick_at(start + TimeDelta::minutes(29)), Phase::Playing);
    assert_eq!(harness.controller.tick_at(start + TimeDelta::minutes(30)), Phase::Lost);

    let err = harness.input("hurry").await.unwrap_err();
    assert!(matches!(err, SessionError::GameOver));
    assert_outcome(&harness, Outcome::Lost(Some(LossReason::TimeUp)));
}

#[tokio::test]
async fn test_wrong_phase_commands() {
    let mut harness = TestHarness::new();
    assert!(matches!(harness.input("hello").await, Err(SessionError::NoActiveGame)));
    assert!(matches!(harness.hint().await, Err(SessionError::NoActiveGame)));

    harness.expect_narrative("Intro.");
    harness.start("library").await.unwrap();
    assert!(matches!(harness.start("laboratory").await, Err(SessionError::GameInProgress)));
    assert!(matches!(harness.input("   ").await, Err(SessionError::EmptyInput)));
    assert_eq!(harness.requests().len(), 1);
}

#[tokio::test]
async fn test_reset_then_new_game_is_fresh() {
    let mut harness = started("laboratory").await;
    harness.expect_narrative("Got it. [ITEM_ADD: \"key\"] [LOCATION_UPDATE: \"Hall\"]");
    harness.input("take key").await.unwrap();
    harness.expect_narrative("Hint.");
    harness.hint().await.unwrap();

    harness.controller.reset();
    assert_eq!(harness.controller.phase(), Phase::Selecting);
    assert!(harness.controller.status().is_none());

    harness.expect_narrative("A new beginning.");
    harness.start("library").await.unwrap();

    let state = harness.state();
    let mut expected = SessionState::started(
        escape_core::Difficulty::Normal,
        state.start_time.unwrap(),
    );
    expected.record(state.history()[0].clone());
    assert_eq!(state, &expected);
    assert!(state.start_time.unwrap() <= Utc::now());
}
