//! Control tag parsing.
//!
//! The narrator embeds machine-readable directives in its prose:
//!
//! ```text
//! [ITEM_ADD: "name"]        [CLUE_ADD: "summary"]
//! [LOCATION_UPDATE: "name"] [PUZZLE_SOLVED]
//! [GAME_WIN]
//! ```
//!
//! A tag is any `[` followed by the next `]`. Tags are recognized left to
//! right, applied to the [`SessionState`], and stripped before the text is
//! shown to the player. Anything that does not parse as a known tag is
//! skipped without error, since the prose around it must still display.
//!
//! This module is the only place that looks at raw tagged text.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, trace};

use crate::state::SessionState;

/// A recognized directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlTag {
    ItemAdd(String),
    ClueAdd(String),
    LocationUpdate(String),
    PuzzleSolved,
    GameWin,
}

/// Something the player should be told about after a tag was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ItemAcquired(String),
    ClueDiscovered(String),
    LocationChanged(String),
    /// A puzzle was solved and the hint budget refilled.
    PuzzleSolved,
    /// The player escaped.
    Escaped,
}

impl GameEvent {
    /// Short notification text for the UI.
    pub fn describe(&self) -> String {
        match self {
            GameEvent::ItemAcquired(item) => format!("Item acquired: {item}"),
            GameEvent::ClueDiscovered(_) => "Clue discovered!".to_string(),
            GameEvent::LocationChanged(location) => format!("Location changed: {location}"),
            GameEvent::PuzzleSolved => "Puzzle solved! Hints have been refilled.".to_string(),
            GameEvent::Escaped => "You escaped!".to_string(),
        }
    }
}

/// Narrative text after its tags were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNarrative {
    /// The text with all tags removed, ready for display.
    pub text: String,
    /// Notifications produced while applying the tags, in tag order.
    pub events: Vec<GameEvent>,
}

/// Byte ranges of every `[...]` group, left to right.
///
/// A group ends at the first `]` after its `[`, so `[a[b]c]` yields `[a[b]`
/// and leaves `c]` behind. An unterminated `[` is not a group.
fn tag_spans(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        let open = cursor + text[cursor..].find('[')?;
        let close = open + text[open..].find(']')?;
        cursor = close + 1;
        Some(open..close + 1)
    })
}

/// Interpret the inside of one bracket group.
pub fn parse_tag(body: &str) -> Option<ControlTag> {
    let body = body.trim_matches(|c| c == '[' || c == ']');

    // Signal tags match exactly; `[ GAME_WIN ]` is not a signal.
    let Some((name, payload)) = body.split_once(':') else {
        return match body {
            "PUZZLE_SOLVED" => Some(ControlTag::PuzzleSolved),
            "GAME_WIN" => Some(ControlTag::GameWin),
            _ => None,
        };
    };

    let value = tag_value(payload.trim()).to_string();
    match name.trim() {
        "ITEM_ADD" => Some(ControlTag::ItemAdd(value)),
        "CLUE_ADD" => Some(ControlTag::ClueAdd(value)),
        "LOCATION_UPDATE" => Some(ControlTag::LocationUpdate(value)),
        _ => None,
    }
}

/// The quoted part of a payload, or the whole payload when it has no quotes.
fn tag_value(payload: &str) -> &str {
    match (payload.find('"'), payload.rfind('"')) {
        (Some(first), Some(last)) if first < last => &payload[first + 1..last],
        _ => payload,
    }
}

/// Every recognized tag in `text`, in order of appearance.
pub fn extract(text: &str) -> Vec<ControlTag> {
    tag_spans(text)
        .filter_map(|span| {
            let tag = parse_tag(&text[span.clone()]);
            if tag.is_none() {
                trace!(tag = &text[span], "ignoring unrecognized tag");
            }
            tag
        })
        .collect()
}

/// Remove every bracket group and trim the result.
///
/// Cleaning already-clean text returns it unchanged.
pub fn clean(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut last = 0;
    for span in tag_spans(text) {
        cleaned.push_str(&text[last..span.start]);
        last = span.end;
    }
    cleaned.push_str(&text[last..]);
    cleaned.trim().to_string()
}

/// Apply already-extracted tags to `state`, returning the resulting events.
pub fn apply(tags: &[ControlTag], state: &mut SessionState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for tag in tags {
        match tag {
            ControlTag::ItemAdd(item) => {
                if state.add_item(item) {
                    debug!(%item, "item added");
                    events.push(GameEvent::ItemAcquired(item.clone()));
                }
            }
            ControlTag::ClueAdd(clue) => {
                if state.add_clue(clue) {
                    debug!(%clue, "clue added");
                    events.push(GameEvent::ClueDiscovered(clue.clone()));
                }
            }
            ControlTag::LocationUpdate(location) => {
                if state.move_to(location) {
                    debug!(%location, "location changed");
                    events.push(GameEvent::LocationChanged(location.clone()));
                }
            }
            ControlTag::PuzzleSolved => {
                if state.refill_hints() {
                    debug!("puzzle solved, hints refilled");
                    events.push(GameEvent::PuzzleSolved);
                }
            }
            ControlTag::GameWin => {
                if !state.game_won {
                    debug!("game won");
                    events.push(GameEvent::Escaped);
                }
                state.win();
            }
        }
    }
    events
}

/// Apply every tag in `text` to `state` and return the cleaned text.
///
/// All tags are recognized before any is applied, so the state only changes
/// once the whole response has been read.
pub fn parse(text: &str, state: &mut SessionState) -> ParsedNarrative {
    if text.is_empty() {
        return ParsedNarrative {
            text: String::new(),
            events: Vec::new(),
        };
    }

    let tags = extract(text);
    let events = apply(&tags, state);
    ParsedNarrative {
        text: clean(text),
        events,
    }
}
