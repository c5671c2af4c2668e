//! Escape room TUI application.
//!
//! A vim-style terminal interface for escaping rooms narrated by an AI game master.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a text-based interface suitable for automated testing:
//!
//! ```bash
//! cargo run -p escape -- --headless --scenario laboratory
//! ```

mod app;
mod events;
mod headless;
mod logging;
mod ui;
mod worker;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use escape_core::GameController;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::{info, warn};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;
use worker::{spawn_worker, WorkerRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    // Check for --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // Check for API key
    if std::env::var("ANTHROPIC_API_KEY").is_err() {
        eprintln!("Error: ANTHROPIC_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export ANTHROPIC_API_KEY=your_key_here");
        std::process::exit(1);
    }

    let mut config = headless::parse_config_from_args(&args);
    if config.model.is_none() {
        if let Ok(model) = std::env::var("ESCAPE_MODEL") {
            config = config.with_model(model);
        }
    }

    // Check for --headless mode
    if args.iter().any(|a| a == "--headless") {
        logging::init_stderr();
        return headless::run_headless(config).await;
    }

    if let Err(e) = logging::init_file() {
        eprintln!("Warning: could not open log file {}: {e}", logging::log_path().display());
    }

    let controller = GameController::from_env(&config)?;
    let (request_tx, response_rx, snapshot) = spawn_worker(controller);
    let mut app = App::new(request_tx.clone(), response_rx, snapshot);

    if let Some(ref id) = config.scenario {
        if let Some(index) = app.scenarios().iter().position(|s| s.id == id.as_str()) {
            app.selected_scenario = index;
            app.start_selected();
        } else {
            warn!(scenario = %id, "unknown scenario on command line");
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("TUI started");
    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    let _ = request_tx.send(WorkerRequest::Shutdown).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        // Pick up finished worker commands
        app.poll_worker();

        terminal.draw(|f| render(f, &app))?;

        // Poll for events with timeout for the clock and animations
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if handle_event(&mut app, ev) == EventResult::Quit {
                return Ok(());
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }

        // Let the worker task make progress
        tokio::task::yield_now().await;
    }
}

fn print_help() {
    println!("Escape Room - an escape game narrated by an AI game master");
    println!();
    println!("USAGE:");
    println!("  escape [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help           Show this help message");
    println!("  --headless           Run in headless mode (text-only, no TUI)");
    println!("  --scenario <ID>      Start this scenario right away");
    println!("  --model <MODEL>      Model for the game master");
    println!();
    println!("SCENARIOS:");
    for scenario in escape_core::scenario::catalog() {
        println!("  {:<12} {} {}", scenario.id, scenario.difficulty.stars(), scenario.title);
    }
    println!();
    println!("ENVIRONMENT:");
    println!("  ANTHROPIC_API_KEY    Required");
    println!("  ESCAPE_MODEL         Model override (same as --model)");
    println!("  ESCAPE_LOG           Log file for the TUI (default: escape.log)");
    println!("  RUST_LOG             Log filter (default: info)");
    println!();
    println!("EXAMPLES:");
    println!("  escape                                 # Interactive TUI mode");
    println!("  escape --headless --scenario library   # Headless, start right away");
}
