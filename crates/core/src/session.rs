//! Game session: turn order, status, and the opponent/hint/analysis gates
//!
//! A `GameSession` is a value. Every accepted move produces a new session;
//! a rejected one leaves the old session exactly as it was.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use shakmaty::{Color, Role, Square};
use tracing::{info, warn};

use crate::advisor::{Advisor, GameAnalysis, MoveSuggestion};
use crate::engine::{Difficulty, OpponentEngine};
use crate::error::{AnalysisFailure, HintFailure, MoveRejected, OpponentMoveFailure};
use crate::history::MoveList;
use crate::rules::{side_name, Board, PlayedMove};

/// Settings fixed for the lifetime of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub human_side: Color,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            human_side: Color::White,
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    FiftyMoves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress(Color),
    Terminal(Outcome),
}

/// Predicates the status line is derived from.
pub trait StatusProbe {
    fn turn(&self) -> Color;
    fn is_checkmate(&self) -> bool;
    fn is_draw(&self) -> bool;
    fn is_stalemate(&self) -> bool;
    fn is_threefold_repetition(&self) -> bool;
    fn is_insufficient_material(&self) -> bool;
    fn in_check(&self) -> bool;
}

impl StatusProbe for Board {
    fn turn(&self) -> Color {
        Board::turn(self)
    }

    fn is_checkmate(&self) -> bool {
        Board::is_checkmate(self)
    }

    fn is_draw(&self) -> bool {
        Board::is_draw(self)
    }

    fn is_stalemate(&self) -> bool {
        Board::is_stalemate(self)
    }

    fn is_threefold_repetition(&self) -> bool {
        Board::is_threefold_repetition(self)
    }

    fn is_insufficient_material(&self) -> bool {
        Board::is_insufficient_material(self)
    }

    fn in_check(&self) -> bool {
        Board::in_check(self)
    }
}

/// Human-readable status line.
///
/// Checkmate first, then the generic draw, then the specific draw kinds.
pub fn derive_status<P: StatusProbe + ?Sized>(probe: &P) -> String {
    if probe.is_checkmate() {
        format!("Checkmate! {} wins.", side_name(!probe.turn()))
    } else if probe.is_draw() {
        "Draw!".to_string()
    } else if probe.is_stalemate() {
        "Stalemate!".to_string()
    } else if probe.is_threefold_repetition() {
        "Draw by threefold repetition!".to_string()
    } else if probe.is_insufficient_material() {
        "Draw by insufficient material!".to_string()
    } else {
        let mut status = format!("{} to move.", side_name(probe.turn()));
        if probe.in_check() {
            status.push_str(" (in Check)");
        }
        status
    }
}

/// Result of the opponent's turn.
#[derive(Debug, Clone)]
pub struct OpponentMove {
    pub session: GameSession,
    pub played: PlayedMove,
    /// Set when the engine's answer was unusable and a random move was played.
    pub warning: Option<OpponentMoveFailure>,
}

/// A hint that has been checked against the legal moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveHint {
    pub suggested_move: String,
    pub explanation: String,
    pub san: String,
    pub uci: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    history: MoveList,
    starting_side: Color,
    status: String,
    last_move: Option<(Square, Square)>,
}

impl GameSession {
    /// Fresh game from the standard starting position.
    pub fn start_new_game(config: SessionConfig) -> Self {
        Self::from_board(config, Board::starting())
    }

    /// Game starting from an arbitrary position.
    pub fn from_board(config: SessionConfig, board: Board) -> Self {
        let status = derive_status(&board);
        let starting_side = board.turn();
        Self {
            config,
            board,
            history: MoveList::empty(),
            starting_side,
            status,
            last_move: None,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &MoveList {
        &self.history
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    pub fn fen(&self) -> String {
        self.board.fen()
    }

    pub fn starting_side(&self) -> Color {
        self.starting_side
    }

    pub fn side_to_move(&self) -> Color {
        self.board.turn()
    }

    pub fn is_game_over(&self) -> bool {
        self.board.is_game_over()
    }

    pub fn is_human_turn(&self) -> bool {
        self.side_to_move() == self.config.human_side
    }

    /// The opponent should move now.
    pub fn is_opponent_turn(&self) -> bool {
        !self.is_human_turn() && !self.is_game_over()
    }

    pub fn phase(&self) -> Phase {
        let board = &self.board;
        if board.is_checkmate() {
            Phase::Terminal(Outcome::Checkmate {
                winner: !board.turn(),
            })
        } else if board.is_stalemate() {
            Phase::Terminal(Outcome::Stalemate)
        } else if board.is_threefold_repetition() {
            Phase::Terminal(Outcome::ThreefoldRepetition)
        } else if board.is_insufficient_material() {
            Phase::Terminal(Outcome::InsufficientMaterial)
        } else if board.is_fifty_move_draw() {
            Phase::Terminal(Outcome::FiftyMoves)
        } else {
            Phase::InProgress(board.turn())
        }
    }

    /// Plays the human's move, promoting to a queen when a pawn reaches
    /// the last rank.
    pub fn apply_human_move(&self, from: Square, to: Square) -> Result<GameSession, MoveRejected> {
        if self.is_game_over() {
            return Err(MoveRejected::GameOver);
        }
        if !self.is_human_turn() {
            return Err(MoveRejected::NotYourTurn);
        }

        let promotion = self.board.needs_promotion(from, to).then_some(Role::Queen);
        let (board, played) = self
            .board
            .play(from, to, promotion)
            .map_err(|_| MoveRejected::Illegal {
                from: from.to_string(),
                to: to.to_string(),
            })?;

        Ok(self.advance(board, played))
    }

    /// Same as [`apply_human_move`](Self::apply_human_move) with squares
    /// given as text, e.g. `"e2"`.
    pub fn apply_human_move_str(&self, from: &str, to: &str) -> Result<GameSession, MoveRejected> {
        let from = parse_square(from)?;
        let to = parse_square(to)?;
        self.apply_human_move(from, to)
    }

    /// Asks the engine for the opponent's move and plays it. An unusable
    /// answer falls back to a random legal move.
    pub async fn request_opponent_move(
        &self,
        engine: &dyn OpponentEngine,
    ) -> Result<OpponentMove, OpponentMoveFailure> {
        self.check_opponent_turn()?;

        let suggestion = engine
            .best_move(&self.board.fen(), self.config.difficulty.search_depth())
            .await;

        self.resolve_opponent_move(suggestion, &mut rand::rng())
    }

    /// Validates the engine's answer, picking a random legal move if it
    /// cannot be played.
    pub fn resolve_opponent_move<R: Rng + ?Sized>(
        &self,
        suggestion: Result<String, OpponentMoveFailure>,
        rng: &mut R,
    ) -> Result<OpponentMove, OpponentMoveFailure> {
        self.check_opponent_turn()?;

        let resolved = suggestion.and_then(|token| {
            self.board
                .parse_move(&token)
                .ok_or(OpponentMoveFailure::IllegalSuggestion(token))
        });

        let (mv, warning) = match resolved {
            Ok(mv) => (mv, None),
            Err(failure) => {
                warn!(%failure, "engine move unusable, playing a random legal move");
                let legal = self.board.legal_moves(None);
                // Not empty: check_opponent_turn ruled out a finished game
                let mv = legal
                    .choose(rng)
                    .cloned()
                    .ok_or(OpponentMoveFailure::GameOver)?;
                (mv, Some(failure))
            }
        };

        let (board, played) = self
            .board
            .play_move(mv)
            .map_err(|e| OpponentMoveFailure::IllegalSuggestion(e.to_string()))?;

        info!(san = %played.san, fallback = warning.is_some(), "opponent moved");

        Ok(OpponentMove {
            session: self.advance(board, played.clone()),
            played,
            warning,
        })
    }

    /// Asks the advisor for a move on the human's turn.
    pub async fn request_hint(&self, advisor: &dyn Advisor) -> Result<MoveHint, HintFailure> {
        if self.is_game_over() {
            return Err(HintFailure::GameOver);
        }
        if !self.is_human_turn() {
            return Err(HintFailure::NotYourTurn);
        }

        let suggestion = advisor
            .suggest_move(&self.board.fen(), self.config.human_side)
            .await?;

        self.validate_hint(suggestion)
    }

    /// Accepts a suggestion only if it is one of the legal moves here.
    pub fn validate_hint(&self, suggestion: MoveSuggestion) -> Result<MoveHint, HintFailure> {
        let illegal = || HintFailure::IllegalSuggestion(suggestion.suggested_move.clone());

        let mv = self
            .board
            .parse_move(&suggestion.suggested_move)
            .ok_or_else(illegal)?;
        let (_, played) = self.board.play_move(mv).map_err(|_| illegal())?;

        Ok(MoveHint {
            suggested_move: suggestion.suggested_move.clone(),
            explanation: suggestion.explanation.clone(),
            san: played.san,
            uci: played.uci,
            from: played.from.to_string(),
            to: played.to.to_string(),
        })
    }

    /// Post-game review. Only available once the game has ended.
    pub async fn request_analysis(&self, advisor: &dyn Advisor) -> Result<GameAnalysis, AnalysisFailure> {
        if !self.is_game_over() {
            return Err(AnalysisFailure::GameNotOver);
        }

        let analysis = advisor
            .analyze_game(&self.history.to_notation_string())
            .await?;
        Ok(analysis)
    }

    fn check_opponent_turn(&self) -> Result<(), OpponentMoveFailure> {
        if self.is_game_over() {
            Err(OpponentMoveFailure::GameOver)
        } else if self.is_human_turn() {
            Err(OpponentMoveFailure::NotOpponentsTurn)
        } else {
            Ok(())
        }
    }

    fn advance(&self, board: Board, played: PlayedMove) -> GameSession {
        let status = derive_status(&board);
        GameSession {
            config: self.config,
            history: self.history.append(played.san),
            starting_side: self.starting_side,
            status,
            last_move: Some((played.from, played.to)),
            board,
        }
    }
}

pub fn parse_square(text: &str) -> Result<Square, MoveRejected> {
    text.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| MoveRejected::InvalidSquare(text.to_string()))
}
