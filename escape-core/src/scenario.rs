//! Scenario catalog.
//!
//! The playable rooms are fixed at compile time. The controller reads a
//! scenario once, at game start, to pick the time budget and the opening
//! prompt.

use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;

/// How hard a scenario is, which also decides its time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// The 1-3 level shown to players.
    pub fn level(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Wall-clock time allowed to escape.
    pub fn duration(self) -> TimeDelta {
        match self {
            Difficulty::Easy => TimeDelta::minutes(30),
            Difficulty::Normal => TimeDelta::minutes(60),
            Difficulty::Hard => TimeDelta::minutes(90),
        }
    }

    /// Budget used when no difficulty applies.
    pub fn default_duration() -> TimeDelta {
        TimeDelta::minutes(60)
    }

    /// Star rating, e.g. `★★☆`.
    pub fn stars(self) -> String {
        let level = self.level() as usize;
        format!("{}{}", "★".repeat(level), "☆".repeat(3 - level))
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Difficulty {}/3", self.level())
    }
}

/// A playable escape room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub title: &'static str,
    pub difficulty: Difficulty,
    pub description: &'static str,
    /// Background image shipped with graphical front ends.
    pub image: &'static str,
    /// Prompt sent with the opening generation call.
    pub start_prompt: &'static str,
}

static SCENARIOS: [Scenario; 3] = [
    Scenario {
        id: "laboratory",
        title: "The Vanished Scientist's Laboratory",
        difficulty: Difficulty::Easy,
        description: "You have stepped into the hidden laboratory of a genius scientist \
            you only knew from urban legends. The door locks behind you and the system \
            starts to wail. You have 30 minutes to disable the security system and escape.",
        image: "laboratory.png",
        start_prompt: "Start a game themed 'The Vanished Scientist's Laboratory' on \
            difficulty [Easy]. The player has just walked into the laboratory and the door \
            has locked behind them. Describe the first situation with tension.",
    },
    Scenario {
        id: "library",
        title: "The Cursed Castle Library",
        difficulty: Difficulty::Normal,
        description: "You sought shelter from the storm in an old castle. The doors of its \
            ancient library slammed shut with a thunderous boom, and something seems to \
            whisper between the shelves. Uncover the castle's secret and break the curse.",
        image: "library.png",
        start_prompt: "Start a game themed 'The Cursed Castle Library' on difficulty \
            [Normal]. The player is trapped inside an old library. Describe the first \
            situation with an eerie, mysterious atmosphere.",
    },
    Scenario {
        id: "apartment",
        title: "The Amnesiac's Apartment",
        difficulty: Difficulty::Hard,
        description: "You wake up in an unfamiliar apartment. You cannot remember who you \
            are or why you are here. Gather the scattered fragments of your memory, \
            reclaim your identity and find a way to open the front door.",
        image: "apt.png",
        start_prompt: "Start a game themed 'The Amnesiac's Apartment' on difficulty [Hard]. \
            The player has woken up in a strange place with no memory and is confused. \
            Describe the first situation while applying psychological pressure.",
    },
];

/// Every playable scenario, in menu order.
pub fn catalog() -> &'static [Scenario] {
    &SCENARIOS
}

/// Look up a scenario by id.
pub fn find(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}
