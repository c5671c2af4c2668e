//! Background task that owns the game controller.
//!
//! The UI never awaits a generation call itself. It sends a
//! [`WorkerRequest`] and picks up the [`WorkerResponse`] on a later frame.

use escape_core::{GameController, GameEvent, GameStatus, Generator, Phase, TranscriptEntry};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Request sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Start a scenario.
    SelectScenario(String),
    /// Process a player action.
    PlayerAction(String),
    /// Spend a hint.
    Hint,
    /// Discard the game and return to scenario selection.
    Reset,
    /// Re-run the timeout check.
    Tick,
    /// Shutdown the worker.
    Shutdown,
}

/// Response sent from the worker to the UI.
#[derive(Debug)]
pub enum WorkerResponse {
    /// A command finished.
    Complete {
        events: Vec<GameEvent>,
        snapshot: GameSnapshot,
    },
    /// Status after a tick.
    Status {
        phase: Phase,
        status: Option<GameStatus>,
    },
    /// A command failed; the game is unchanged.
    Error {
        message: String,
        snapshot: GameSnapshot,
    },
}

/// Game state copied out of the controller for rendering.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub status: Option<GameStatus>,
    pub transcript: Vec<TranscriptEntry>,
}

impl GameSnapshot {
    pub fn capture<G: Generator>(controller: &mut GameController<G>) -> Self {
        Self {
            phase: controller.phase(),
            status: controller.status(),
            transcript: controller.transcript().to_vec(),
        }
    }
}

/// Spawn the worker and return channel endpoints plus the initial snapshot.
pub fn spawn_worker<G: Generator + 'static>(
    mut controller: GameController<G>,
) -> (
    mpsc::Sender<WorkerRequest>,
    mpsc::Receiver<WorkerResponse>,
    GameSnapshot,
) {
    let (request_tx, request_rx) = mpsc::channel(8);
    let (response_tx, response_rx) = mpsc::channel(64);

    let initial = GameSnapshot::capture(&mut controller);
    tokio::spawn(worker_loop(controller, request_rx, response_tx));

    (request_tx, response_rx, initial)
}

/// The main worker loop that processes requests.
async fn worker_loop<G: Generator>(
    mut controller: GameController<G>,
    mut request_rx: mpsc::Receiver<WorkerRequest>,
    response_tx: mpsc::Sender<WorkerResponse>,
) {
    loop {
        let request = request_rx.recv().await;
        debug!(?request, "worker request");

        let result = match request {
            Some(WorkerRequest::SelectScenario(id)) => controller.select_scenario(&id).await,
            Some(WorkerRequest::PlayerAction(input)) => controller.submit_action(&input).await,
            Some(WorkerRequest::Hint) => controller.request_hint().await,
            Some(WorkerRequest::Reset) => {
                controller.reset();
                let snapshot = GameSnapshot::capture(&mut controller);
                let _ = response_tx
                    .send(WorkerResponse::Complete {
                        events: Vec::new(),
                        snapshot,
                    })
                    .await;
                continue;
            }
            Some(WorkerRequest::Tick) => {
                let phase = controller.tick();
                let _ = response_tx
                    .send(WorkerResponse::Status {
                        phase,
                        status: controller.status(),
                    })
                    .await;
                continue;
            }
            Some(WorkerRequest::Shutdown) | None => break,
        };

        let snapshot = GameSnapshot::capture(&mut controller);
        let response = match result {
            Ok(report) => WorkerResponse::Complete {
                events: report.events,
                snapshot,
            },
            Err(e) => {
                warn!(error = %e, "command failed");
                WorkerResponse::Error {
                    message: e.to_string(),
                    snapshot,
                }
            }
        };

        if response_tx.send(response).await.is_err() {
            break;
        }
    }
}
