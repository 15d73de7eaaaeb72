//! Single owner of the live game
//!
//! All transitions go through `GameController`, which swaps the current
//! `GameSession` for a new one under a lock. The opponent's move runs as a
//! spawned task after a short delay; a `generation` counter, bumped by every
//! new game, lets a late result notice that it belongs to an abandoned game.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::advisor::{Advisor, GameAnalysis};
use crate::engine::{Difficulty, OpponentEngine};
use crate::error::{AnalysisFailure, HintFailure, MoveRejected};
use crate::history::MoveList;
use crate::rules::side_name;
use crate::session::{parse_square, GameSession, MoveHint, SessionConfig};

#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Pause before the opponent's request so its reply is not instant.
    pub opponent_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            opponent_delay: Duration::from_millis(500),
        }
    }
}

/// Everything the page needs, captured at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub fen: String,
    pub status: String,
    pub side_to_move: &'static str,
    pub human_side: &'static str,
    pub difficulty: Difficulty,
    pub history: MoveList,
    pub last_move: Option<(String, String)>,
    pub game_over: bool,
    pub opponent_thinking: bool,
    pub hint_in_flight: bool,
    pub analysis_in_flight: bool,
    pub hint: Option<MoveHint>,
    pub analysis: Option<GameAnalysis>,
    pub notice: Option<String>,
    #[serde(skip)]
    pub session: Arc<GameSession>,
}

impl Snapshot {
    /// Status line as shown to the player.
    pub fn display_status(&self) -> &str {
        if self.opponent_thinking {
            "AI is thinking..."
        } else {
            &self.status
        }
    }

    pub fn is_player_turn(&self) -> bool {
        !self.opponent_thinking && !self.game_over && self.session.is_human_turn()
    }
}

struct ControllerState {
    session: Arc<GameSession>,
    generation: u64,
    opponent_thinking: bool,
    opponent_task: Option<JoinHandle<()>>,
    hint_in_flight: bool,
    analysis_in_flight: bool,
    hint: Option<MoveHint>,
    analysis: Option<GameAnalysis>,
    notice: Option<String>,
}

impl ControllerState {
    fn new(session: GameSession) -> Self {
        Self {
            session: Arc::new(session),
            generation: 0,
            opponent_thinking: false,
            opponent_task: None,
            hint_in_flight: false,
            analysis_in_flight: false,
            hint: None,
            analysis: None,
            notice: None,
        }
    }

    fn snapshot(&self) -> Snapshot {
        let session = &self.session;
        let config = session.config();

        Snapshot {
            generation: self.generation,
            fen: session.fen(),
            status: session.status().to_string(),
            side_to_move: side_name(session.side_to_move()),
            human_side: side_name(config.human_side),
            difficulty: config.difficulty,
            history: session.history().clone(),
            last_move: session
                .last_move()
                .map(|(from, to)| (from.to_string(), to.to_string())),
            game_over: session.is_game_over(),
            opponent_thinking: self.opponent_thinking,
            hint_in_flight: self.hint_in_flight,
            analysis_in_flight: self.analysis_in_flight,
            hint: self.hint.clone(),
            analysis: self.analysis.clone(),
            notice: self.notice.clone(),
            session: Arc::clone(session),
        }
    }
}

pub struct GameController {
    engine: Arc<dyn OpponentEngine>,
    advisor: Arc<dyn Advisor>,
    config: ControllerConfig,
    state: Mutex<ControllerState>,
}

impl GameController {
    /// Creates a controller holding a default game (human plays White).
    pub fn new(
        engine: Arc<dyn OpponentEngine>,
        advisor: Arc<dyn Advisor>,
        config: ControllerConfig,
    ) -> Arc<Self> {
        let session = GameSession::start_new_game(SessionConfig::default());

        Arc::new(Self {
            engine,
            advisor,
            config,
            state: Mutex::new(ControllerState::new(session)),
        })
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state().snapshot()
    }

    pub fn session(&self) -> Arc<GameSession> {
        Arc::clone(&self.state().session)
    }

    /// Throws away the current game, including any pending opponent move,
    /// and starts a new one.
    pub fn new_game(self: &Arc<Self>, config: SessionConfig) -> Snapshot {
        let mut state = self.state();

        state.generation += 1;
        state.session = Arc::new(GameSession::start_new_game(config));
        state.opponent_thinking = false;
        // Detach; the task sees the new generation and drops its result
        state.opponent_task = None;
        // In-flight advisor calls keep their flags until they complete
        state.hint = None;
        state.analysis = None;
        state.notice = Some(format!(
            "New game started. Difficulty set to {}. Good luck!",
            config.difficulty
        ));

        info!(
            generation = state.generation,
            difficulty = %config.difficulty,
            human = side_name(config.human_side),
            "new game"
        );

        self.schedule_opponent(&mut state);
        state.snapshot()
    }

    /// Plays the human's move given as squares such as `"e2"`, `"e4"`.
    pub fn submit_move(self: &Arc<Self>, from: &str, to: &str) -> Result<Snapshot, MoveRejected> {
        let mut state = self.state();

        if state.opponent_thinking {
            return Err(MoveRejected::OpponentThinking);
        }

        let next = state.session.apply_human_move_str(from, to)?;
        debug!(san = ?next.history().last(), status = next.status(), "human moved");

        state.session = Arc::new(next);
        state.hint = None;
        state.notice = None;

        self.schedule_opponent(&mut state);
        Ok(state.snapshot())
    }

    /// Destination squares for the piece on `from`, empty unless it is the
    /// human's turn.
    pub fn legal_targets(&self, from: &str) -> Result<Vec<String>, MoveRejected> {
        let from = parse_square(from)?;
        let state = self.state();

        if state.opponent_thinking || !state.session.is_human_turn() {
            return Ok(Vec::new());
        }

        Ok(state
            .session
            .board()
            .legal_targets(from)
            .into_iter()
            .map(|sq| sq.to_string())
            .collect())
    }

    fn schedule_opponent(self: &Arc<Self>, state: &mut ControllerState) {
        if !state.session.is_opponent_turn() || state.opponent_thinking {
            return;
        }

        state.opponent_thinking = true;
        let generation = state.generation;
        let controller = Arc::clone(self);
        state.opponent_task = Some(tokio::spawn(async move {
            controller.run_opponent_turn(generation).await;
        }));
    }

    async fn run_opponent_turn(self: Arc<Self>, generation: u64) {
        tokio::time::sleep(self.config.opponent_delay).await;

        let session = {
            let state = self.state();
            if state.generation != generation {
                debug!(generation, "opponent turn cancelled before request");
                return;
            }
            Arc::clone(&state.session)
        };

        let result = session.request_opponent_move(self.engine.as_ref()).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!(generation, "discarding opponent move from an abandoned game");
            return;
        }

        state.opponent_thinking = false;
        state.opponent_task = None;

        match result {
            Ok(outcome) => {
                state.notice = outcome.warning.map(|failure| {
                    format!(
                        "The AI failed to make a move ({}). A random move was made instead.",
                        failure
                    )
                });
                state.session = Arc::new(outcome.session);
            }
            Err(e) => {
                warn!(error = %e, "opponent turn skipped");
            }
        }

        self.schedule_opponent(&mut state);
    }

    /// Waits until the pending opponent move, if any, has been applied.
    pub async fn wait_for_opponent(&self) {
        let task = self.state().opponent_task.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "opponent task failed");
            }
        }
    }

    /// Asks the advisor for a hint. One at a time, on the human's turn.
    pub async fn request_hint(&self) -> Result<MoveHint, HintFailure> {
        let (session, generation) = {
            let mut state = self.state();
            let rejection = if state.hint_in_flight {
                Some(HintFailure::InFlight)
            } else if state.session.is_game_over() {
                Some(HintFailure::GameOver)
            } else if state.opponent_thinking || !state.session.is_human_turn() {
                Some(HintFailure::NotYourTurn)
            } else {
                None
            };
            if let Some(e) = rejection {
                state.notice = Some(e.to_string());
                return Err(e);
            }
            state.hint_in_flight = true;
            (Arc::clone(&state.session), state.generation)
        };

        let result = session.request_hint(self.advisor.as_ref()).await;

        let mut state = self.state();
        state.hint_in_flight = false;
        if state.generation == generation {
            match &result {
                // A hint for a position that has since moved on is useless
                Ok(hint) if Arc::ptr_eq(&state.session, &session) => {
                    state.hint = Some(hint.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "hint failed");
                    state.notice = Some(e.to_string());
                }
            }
        }

        result
    }

    /// Post-game review; only once the game has ended.
    pub async fn request_analysis(&self) -> Result<GameAnalysis, AnalysisFailure> {
        let (session, generation) = {
            let mut state = self.state();
            let rejection = if !state.session.is_game_over() {
                Some(AnalysisFailure::GameNotOver)
            } else if state.analysis_in_flight {
                Some(AnalysisFailure::InFlight)
            } else {
                None
            };
            if let Some(e) = rejection {
                state.notice = Some(e.to_string());
                return Err(e);
            }
            state.analysis_in_flight = true;
            (Arc::clone(&state.session), state.generation)
        };

        let result = session.request_analysis(self.advisor.as_ref()).await;

        let mut state = self.state();
        state.analysis_in_flight = false;
        if state.generation == generation {
            match &result {
                Ok(analysis) => state.analysis = Some(analysis.clone()),
                Err(e) => {
                    warn!(error = %e, "analysis failed");
                    state.notice = Some(e.to_string());
                }
            }
        }

        result
    }
}
