//! Escape room engine with an AI game master.
//!
//! This crate provides:
//! - A session state model with hint budget, timer and outcome tracking
//! - Control tag parsing for narration returned by the game master
//! - A game controller that runs turns atomically against a [`Generator`]
//! - A Claude-backed [`GameMaster`] and a scripted [`MockGenerator`]
//!
//! # Quick Start
//!
//! ```ignore
//! use escape_core::{GameController, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new();
//!     let mut game = GameController::from_env(&config)?;
//!
//!     let opening = game.select_scenario("laboratory").await?;
//!     println!("{}", opening.narration.unwrap_or_default());
//!
//!     let turn = game.submit_action("I look around the lab").await?;
//!     println!("{}", turn.narration.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod generator;
pub mod gm;
pub mod headless;
pub mod policy;
pub mod scenario;
pub mod session;
pub mod state;
pub mod tags;
pub mod testing;

// Primary public API
pub use generator::{GenerationError, GenerationRequest, Generator, RequestKind, StateSummary};
pub use gm::{GameMaster, GmConfig};
pub use headless::{HeadlessConfig, HeadlessGame};
pub use scenario::{Difficulty, Scenario};
pub use session::{GameController, GameStatus, Phase, SessionConfig, SessionError, TurnReport};
pub use state::{LossReason, Outcome, SessionState, Speaker, TranscriptEntry};
pub use tags::GameEvent;
pub use testing::{MockGenerator, MockResponse, TestHarness};
