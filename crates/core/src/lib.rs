//! Grandmaster Core Library
//!
//! Play chess against a remote engine, with move hints and post-game
//! analysis from a generative text service.

pub mod advisor;
pub mod controller;
pub mod engine;
pub mod error;
pub mod history;
pub mod rules;
pub mod session;

pub use advisor::{Advisor, DisabledAdvisor, GameAnalysis, GeminiAdvisor};
pub use controller::{ControllerConfig, GameController, Snapshot};
pub use engine::{Difficulty, OpponentEngine, RandomMover, StockfishOnline};
pub use error::{Error, Result};
pub use history::MoveList;
pub use rules::Board;
pub use session::{derive_status, GameSession, MoveHint, Outcome, Phase, SessionConfig};

pub use shakmaty::{Color, Piece, Role, Square};
