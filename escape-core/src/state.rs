//! Session state model.
//!
//! One [`SessionState`] exists per running game. It is created when a
//! scenario is selected and thrown away on reset; nothing here survives a
//! process restart.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::scenario::Difficulty;

/// Hints available at the start of a game and after each solved puzzle.
pub const MAX_HINTS: u8 = 3;

/// Free actions allowed once the hint budget is spent. The next one loses.
pub const POST_HINT_GRACE: u32 = 3;

/// Location label used before the narrator names a place.
pub const START_LOCATION: &str = "Starting point";

/// Why a game ended without an escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// The wall-clock budget ran out.
    TimeUp,
    /// Every hint was used and the grace actions ran out.
    HintsExhausted,
}

/// The three mutually exclusive conditions a game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Playing,
    Won,
    Lost(Option<LossReason>),
}

impl Outcome {
    /// Whether the game has ended.
    pub fn is_over(self) -> bool {
        !matches!(self, Outcome::Playing)
    }
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Player,
    Narrator,
}

/// One line of the game transcript.
///
/// Narrator text is kept twice: `raw` with control tags intact for replay
/// and debugging, `text` with tags stripped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub raw: String,
    pub text: String,
    /// Set on narrator entries produced by a hint request.
    pub hint: bool,
}

impl TranscriptEntry {
    /// A player line. Player text carries no tags, so raw and display match.
    pub fn player(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            speaker: Speaker::Player,
            raw: text.clone(),
            text,
            hint: false,
        }
    }

    /// A narrator line with its raw and cleaned forms.
    pub fn narrator(raw: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Narrator,
            raw: raw.into(),
            text: text.into(),
            hint: false,
        }
    }

    /// A narrator line answering a hint request.
    pub fn hint(raw: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            hint: true,
            ..Self::narrator(raw, text)
        }
    }
}

/// Everything the game tracks while a scenario is being played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub location: String,
    inventory: Vec<String>,
    clues: Vec<String>,
    pub hint_count: u8,
    pub post_hint_attempts: u32,
    pub game_over: bool,
    pub game_won: bool,
    pub loss_reason: Option<LossReason>,
    pub start_time: Option<DateTime<Utc>>,
    #[serde(with = "budget_secs")]
    pub duration_budget: TimeDelta,
    history: Vec<TranscriptEntry>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A state with full hints, no items and no clock running.
    pub fn new() -> Self {
        Self {
            location: START_LOCATION.to_string(),
            inventory: Vec::new(),
            clues: Vec::new(),
            hint_count: MAX_HINTS,
            post_hint_attempts: 0,
            game_over: false,
            game_won: false,
            loss_reason: None,
            start_time: None,
            duration_budget: Difficulty::default_duration(),
            history: Vec::new(),
        }
    }

    /// A fresh state whose clock starts at `now` with the difficulty's budget.
    pub fn started(difficulty: Difficulty, now: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(now),
            duration_budget: difficulty.duration(),
            ..Self::new()
        }
    }

    /// Acquired items in the order they were found.
    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    /// Discovered clues in the order they were found.
    pub fn clues(&self) -> &[String] {
        &self.clues
    }

    /// The transcript so far.
    pub fn history(&self) -> &[TranscriptEntry] {
        &self.history
    }

    /// Add an item unless it is empty or already held. Returns whether it was added.
    pub fn add_item(&mut self, item: &str) -> bool {
        insert_unique(&mut self.inventory, item)
    }

    /// Add a clue unless it is empty or already known. Returns whether it was added.
    pub fn add_clue(&mut self, clue: &str) -> bool {
        insert_unique(&mut self.clues, clue)
    }

    /// Move to `location`. Returns false when it is empty or unchanged.
    pub fn move_to(&mut self, location: &str) -> bool {
        if location.is_empty() || self.location == location {
            return false;
        }
        self.location = location.to_string();
        true
    }

    /// Refill the hint budget after a solved puzzle.
    ///
    /// Only acts when something was actually spent, so a full budget does not
    /// produce a notification. Returns whether the budget was refilled.
    pub fn refill_hints(&mut self) -> bool {
        if self.hint_count < MAX_HINTS || self.post_hint_attempts > 0 {
            self.hint_count = MAX_HINTS;
            self.post_hint_attempts = 0;
            true
        } else {
            false
        }
    }

    /// Spend one hint. Returns false when none are left.
    pub fn take_hint(&mut self) -> bool {
        if self.hint_count == 0 {
            return false;
        }
        self.hint_count -= 1;
        true
    }

    /// Mark the game as escaped.
    pub fn win(&mut self) {
        self.game_over = true;
        self.game_won = true;
        self.loss_reason = None;
    }

    /// Mark the game as lost. A finished game keeps its first outcome.
    pub fn lose(&mut self, reason: LossReason) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.game_won = false;
        self.loss_reason = Some(reason);
    }

    /// The current outcome, derived from the terminal flags.
    pub fn outcome(&self) -> Outcome {
        match (self.game_over, self.game_won) {
            (false, _) => Outcome::Playing,
            (true, true) => Outcome::Won,
            (true, false) => Outcome::Lost(self.loss_reason),
        }
    }

    /// Append a transcript entry.
    pub fn record(&mut self, entry: TranscriptEntry) {
        self.history.push(entry);
    }
}

/// Serializes the time budget as whole seconds.
mod budget_secs {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(budget: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(budget.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        TimeDelta::try_seconds(secs).ok_or_else(|| serde::de::Error::custom("time budget out of range"))
    }
}

fn insert_unique(set: &mut Vec<String>, value: &str) -> bool {
    if value.is_empty() || set.iter().any(|existing| existing == value) {
        return false;
    }
    set.push(value.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = SessionState::new();
        assert_eq!(state.location, START_LOCATION);
        assert_eq!(state.hint_count, MAX_HINTS);
        assert_eq!(state.post_hint_attempts, 0);
        assert!(state.inventory().is_empty());
        assert!(state.clues().is_empty());
        assert!(state.start_time.is_none());
        assert_eq!(state.outcome(), Outcome::Playing);
    }

    #[test]
    fn test_started_uses_difficulty_budget() {
        let now = Utc::now();
        let state = SessionState::started(Difficulty::Hard, now);
        assert_eq!(state.start_time, Some(now));
        assert_eq!(state.duration_budget, TimeDelta::minutes(90));
    }

    #[test]
    fn test_inventory_rejects_duplicates_and_empty() {
        let mut state = SessionState::new();
        assert!(state.add_item("brass key"));
        assert!(!state.add_item("brass key"));
        assert!(!state.add_item(""));
        assert!(state.add_item("Brass key"));
        assert_eq!(state.inventory(), ["brass key", "Brass key"]);
    }

    #[test]
    fn test_clues_are_separate_from_inventory() {
        let mut state = SessionState::new();
        assert!(state.add_item("note"));
        assert!(state.add_clue("note"));
        assert_eq!(state.inventory().len(), 1);
        assert_eq!(state.clues().len(), 1);
    }

    #[test]
    fn test_move_to_ignores_same_and_empty() {
        let mut state = SessionState::new();
        assert!(!state.move_to(""));
        assert!(!state.move_to(START_LOCATION));
        assert!(state.move_to("Hallway"));
        assert_eq!(state.location, "Hallway");
    }

    #[test]
    fn test_refill_hints_only_when_spent() {
        let mut state = SessionState::new();
        assert!(!state.refill_hints());

        assert!(state.take_hint());
        assert!(state.refill_hints());
        assert_eq!(state.hint_count, MAX_HINTS);

        state.post_hint_attempts = 2;
        assert!(state.refill_hints());
        assert_eq!(state.post_hint_attempts, 0);
    }

    #[test]
    fn test_take_hint_stops_at_zero() {
        let mut state = SessionState::new();
        for _ in 0..MAX_HINTS {
            assert!(state.take_hint());
        }
        assert!(!state.take_hint());
        assert_eq!(state.hint_count, 0);
    }

    #[test]
    fn test_win_implies_over() {
        let mut state = SessionState::new();
        state.win();
        assert!(state.game_over);
        assert!(state.game_won);
        assert_eq!(state.outcome(), Outcome::Won);
    }

    #[test]
    fn test_lose_keeps_first_outcome() {
        let mut state = SessionState::new();
        state.win();
        state.lose(LossReason::TimeUp);
        assert_eq!(state.outcome(), Outcome::Won);

        let mut state = SessionState::new();
        state.lose(LossReason::HintsExhausted);
        state.lose(LossReason::TimeUp);
        assert_eq!(state.outcome(), Outcome::Lost(Some(LossReason::HintsExhausted)));
    }

    #[test]
    fn test_budget_serialized_as_seconds() {
        let state = SessionState::started(Difficulty::Easy, Utc::now());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["duration_budget"], 1800);

        let restored: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_hint_entry_flag() {
        let entry = TranscriptEntry::hint("Look [up]", "Look");
        assert_eq!(entry.speaker, Speaker::Narrator);
        assert!(entry.hint);
        assert_eq!(entry.raw, "Look [up]");
        assert_eq!(entry.text, "Look");
    }
}
