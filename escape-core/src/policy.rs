//! Hint exhaustion and timeout rules.
//!
//! Both checks only ever move a game from playing to lost. They never touch
//! a finished game, so calling them repeatedly is safe.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::state::{LossReason, SessionState, POST_HINT_GRACE};

/// Count one player action against the grace allowance once hints run out.
///
/// With hints left this does nothing. Otherwise the attempt counter goes up,
/// and the game is lost once it passes [`POST_HINT_GRACE`].
pub fn check_exhaustion(state: &mut SessionState) {
    if state.game_over || state.hint_count > 0 {
        return;
    }

    state.post_hint_attempts += 1;
    if state.post_hint_attempts > POST_HINT_GRACE {
        info!(attempts = state.post_hint_attempts, "hints exhausted, game lost");
        state.lose(LossReason::HintsExhausted);
    }
}

/// End the game if its time budget has run out at `now`.
pub fn check_timeout(state: &mut SessionState, now: DateTime<Utc>) {
    if state.game_over {
        return;
    }
    let Some(start) = state.start_time else {
        return;
    };

    if now - start >= state.duration_budget {
        info!(budget_secs = state.duration_budget.num_seconds(), "time is up, game lost");
        state.lose(LossReason::TimeUp);
    }
}

/// Grace actions left while the hint budget is empty, or `None` while hints remain.
pub fn remaining_attempts(state: &SessionState) -> Option<u32> {
    if state.hint_count > 0 {
        return None;
    }
    Some(POST_HINT_GRACE.saturating_sub(state.post_hint_attempts))
}

/// Time left on the clock, never negative. `None` before the clock starts.
pub fn remaining_time(state: &SessionState, now: DateTime<Utc>) -> Option<TimeDelta> {
    let start = state.start_time?;
    let left = state.duration_budget - (now - start);
    Some(left.max(TimeDelta::zero()))
}

/// Format a duration as `MM:SS`.
pub fn format_clock(time: TimeDelta) -> String {
    let secs = time.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
