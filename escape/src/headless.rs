//! Headless mode for the escape room.
//!
//! A line-oriented text interface for running the game without a TUI,
//! for automated testing and AI agents.

use std::io::{self, BufRead, Write};

use escape_core::headless::GameResponse;
use escape_core::scenario;
use escape_core::{
    GameController, Generator, HeadlessConfig, HeadlessGame, LossReason, Outcome, SessionConfig,
    SessionError, Speaker, TurnReport,
};

/// Run the game in headless mode on stdin/stdout.
pub async fn run_headless(config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut controller = match config.scenario {
        Some(ref id) => {
            let setup = HeadlessConfig::new(id.clone()).with_session(config.clone());
            match start_game(HeadlessGame::new(setup).await, &mut out)? {
                Some(controller) => controller,
                None => GameController::from_env(&config)?,
            }
        }
        None => GameController::from_env(&config)?,
    };

    run_protocol(&mut controller, stdin.lock(), out).await?;
    Ok(())
}

/// Print the opening of a game started from the command line.
///
/// A failed start is reported and leaves the caller to pick a scenario with
/// `#start`; only a missing API key is fatal.
fn start_game<G, W>(
    started: Result<(HeadlessGame<G>, GameResponse), SessionError>,
    out: &mut W,
) -> Result<Option<GameController<G>>, Box<dyn std::error::Error>>
where
    G: Generator,
    W: Write,
{
    match started {
        Ok((game, opening)) => {
            print_response(out, &opening, false)?;
            Ok(Some(game.into_controller()))
        }
        Err(SessionError::NoApiKey) => Err(SessionError::NoApiKey.into()),
        Err(e) => {
            writeln!(out, "[ERROR] {e}")?;
            Ok(None)
        }
    }
}

/// Drive a controller from a line protocol.
///
/// Lines starting with `#` are commands; anything else is a player action.
pub async fn run_protocol<G, R, W>(
    controller: &mut GameController<G>,
    input: R,
    mut out: W,
) -> io::Result<()>
where
    G: Generator,
    R: BufRead,
    W: Write,
{
    writeln!(out, "=== Escape Room Headless Mode ===")?;
    print_scenarios(&mut out)?;
    writeln!(out)?;
    print_help(&mut out)?;
    writeln!(out)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            let parts: Vec<&str> = command.split_whitespace().collect();
            match parts.first().copied() {
                Some("quit") | Some("exit") => {
                    writeln!(out, "Goodbye!")?;
                    break;
                }
                Some("list") => print_scenarios(&mut out)?,
                Some("start") => match parts.get(1) {
                    Some(id) => {
                        let result = controller.select_scenario(id).await;
                        print_result(&mut out, result, false)?;
                    }
                    None => writeln!(out, "[ERROR] Usage: #start <scenario>")?,
                },
                Some("hint") => {
                    let result = controller.request_hint().await;
                    print_result(&mut out, result, true)?;
                }
                Some("status") => print_status(&mut out, controller)?,
                Some("json") => match controller.status() {
                    Some(status) => match serde_json::to_string(&status) {
                        Ok(json) => writeln!(out, "{json}")?,
                        Err(e) => writeln!(out, "[ERROR] {e}")?,
                    },
                    None => writeln!(out, "null")?,
                },
                Some("raw") => {
                    match controller
                        .transcript()
                        .iter()
                        .rev()
                        .find(|entry| entry.speaker == Speaker::Narrator)
                    {
                        Some(entry) => writeln!(out, "[RAW] {}", entry.raw)?,
                        None => writeln!(out, "[ERROR] Nothing narrated yet")?,
                    }
                }
                Some("reset") => {
                    controller.reset();
                    writeln!(out, "[RESET] Pick a scenario with #start <scenario>")?;
                }
                Some("help") => print_help(&mut out)?,
                _ => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
            }
            out.flush()?;
            continue;
        }

        // Late answers are refused once the clock has run out
        controller.tick();
        let result = controller.submit_action(line).await;
        print_result(&mut out, result, false)?;
        out.flush()?;
    }

    Ok(())
}

fn print_result<W: Write>(
    out: &mut W,
    result: Result<TurnReport, SessionError>,
    hint: bool,
) -> io::Result<()> {
    match result {
        Ok(report) => print_response(out, &GameResponse::from(report), hint),
        Err(e) => writeln!(out, "[ERROR] {e}"),
    }
}

fn print_response<W: Write>(out: &mut W, response: &GameResponse, hint: bool) -> io::Result<()> {
    if !response.narrative.is_empty() {
        writeln!(out, "{}", if hint { "[HINT]" } else { "[GM]" })?;
        for para in response.narrative.split("\n\n") {
            writeln!(out, "{para}")?;
        }
    }
    for event in &response.events {
        writeln!(out, "[EVENT] {}", event.describe())?;
    }
    match response.outcome {
        Outcome::Playing => {}
        Outcome::Won => writeln!(out, "[GAME OVER] You escaped!")?,
        Outcome::Lost(reason) => {
            let why = match reason {
                Some(LossReason::TimeUp) => " Time is up.",
                Some(LossReason::HintsExhausted) => " You ran out of hints and chances.",
                None => "",
            };
            writeln!(out, "[GAME OVER] You failed to escape.{why}")?;
        }
    }
    writeln!(out)
}

fn print_status<W: Write, G: Generator>(
    out: &mut W,
    controller: &mut GameController<G>,
) -> io::Result<()> {
    let Some(status) = controller.status() else {
        return writeln!(out, "[STATUS] No game in progress");
    };

    writeln!(out, "[STATUS]")?;
    writeln!(out, "  Scenario: {} ({})", status.scenario_title, status.difficulty)?;
    writeln!(out, "  Location: {}", status.location)?;
    writeln!(out, "  Time left: {}", status.clock())?;
    writeln!(out, "  Hints: {}/{}", status.hint_count, status.max_hints)?;
    if let Some(attempts) = status.remaining_attempts {
        writeln!(out, "  Actions left: {attempts}")?;
    }
    if !status.inventory.is_empty() {
        writeln!(out, "  Inventory: {}", status.inventory.join(", "))?;
    }
    if !status.clues.is_empty() {
        writeln!(out, "  Clues: {}", status.clues.join(", "))?;
    }
    writeln!(out, "  Outcome: {:?}", status.outcome)
}

fn print_scenarios<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Scenarios:")?;
    for s in scenario::catalog() {
        writeln!(out, "  {:<12} {} {}", s.id, s.difficulty.stars(), s.title)?;
    }
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  #list          - List scenarios")?;
    writeln!(out, "  #start <id>    - Start a scenario")?;
    writeln!(out, "  #hint          - Ask for a hint")?;
    writeln!(out, "  #status        - Show current game status")?;
    writeln!(out, "  #json          - Show status as JSON")?;
    writeln!(out, "  #raw           - Show the last narration with tags")?;
    writeln!(out, "  #reset         - Abandon the game")?;
    writeln!(out, "  #help          - Show this help")?;
    writeln!(out, "  #quit          - Exit")?;
    writeln!(out, "  (anything else is sent as player action)")
}

/// Pull headless options out of the command line.
pub fn parse_config_from_args(args: &[String]) -> SessionConfig {
    let mut config = SessionConfig::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                if let Some(id) = args.get(i + 1) {
                    config = config.with_scenario(id.clone());
                    i += 1;
                }
            }
            "--model" => {
                if let Some(model) = args.get(i + 1) {
                    config = config.with_model(model.clone());
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_core::MockGenerator;

    async fn run(mock: MockGenerator, script: &str) -> String {
        let mut controller = GameController::new(mock);
        let mut out = Vec::new();
        run_protocol(&mut controller, script.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_play_through_protocol() {
        let mock = MockGenerator::new()
            .with_response("The lab is dark.")
            .with_response("You find a key. [ITEM_ADD: \"brass key\"]")
            .with_response("The door swings open. [GAME_WIN]");
        let output = run(
            mock,
            "#start laboratory\nsearch the desk\n#status\nopen the door\n#quit\n",
        )
        .await;

        assert!(output.contains("[GM]\nThe lab is dark."));
        assert!(output.contains("[EVENT] Item acquired: brass key"));
        assert!(output.contains("  Inventory: brass key"));
        assert!(output.contains("[GAME OVER] You escaped!"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_hint_and_raw() {
        let mock = MockGenerator::new()
            .with_response("Intro. [LOCATION_UPDATE: \"Stacks\"]")
            .with_response("Look at the clock.");
        let output = run(mock, "#start library\n#raw\n#hint\n#json\n").await;

        assert!(output.contains("[RAW] Intro. [LOCATION_UPDATE: \"Stacks\"]"));
        assert!(output.contains("[HINT]\nLook at the clock."));
        assert!(output.contains("\"hint_count\":2"));
    }

    #[tokio::test]
    async fn test_errors_are_reported() {
        let output = run(
            MockGenerator::new(),
            "look around\n#start nowhere\n#start\n#bogus\n",
        )
        .await;

        assert!(output.contains("[ERROR] No game in progress"));
        assert!(output.contains("[ERROR] Unknown scenario: nowhere"));
        assert!(output.contains("[ERROR] Usage: #start <scenario>"));
        assert!(output.contains("[ERROR] Unknown command"));
    }

    #[tokio::test]
    async fn test_command_line_scenario_starts_through_headless_game() {
        let mock = MockGenerator::new()
            .with_response("The shelves tower over you. [LOCATION_UPDATE: \"Stacks\"]")
            .with_response("Dust.");
        let started = HeadlessGame::with_generator(mock, HeadlessConfig::new("library")).await;

        let mut out = Vec::new();
        let mut controller = start_game(started, &mut out).unwrap().unwrap();
        run_protocol(&mut controller, "dust the shelf\n#status\n".as_bytes(), &mut out)
            .await
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("[GM]\nThe shelves tower over you.\n"));
        assert!(output.contains("[EVENT] Location changed: Stacks"));
        assert!(output.contains("[GM]\nDust."));
        assert!(output.contains("  Location: Stacks"));
        assert!(output.contains("  Outcome: Playing"));
    }

    #[tokio::test]
    async fn test_failed_command_line_start_is_reported() {
        let mock = MockGenerator::new().with_failure("overloaded");
        let started = HeadlessGame::with_generator(mock, HeadlessConfig::new("library")).await;

        let mut out = Vec::new();
        assert!(start_game(started, &mut out).unwrap().is_none());
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("[ERROR] Generation failed, try again: Generation unavailable: overloaded"));
    }

    #[test]
    fn test_parse_args() {
        let args: Vec<String> = ["escape", "--headless", "--scenario", "library"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let config = parse_config_from_args(&args);
        assert_eq!(config.scenario.as_deref(), Some("library"));
        assert!(config.model.is_none());
    }
}
