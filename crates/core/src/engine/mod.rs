//! Opponent engine integration
//!
//! The opponent's moves come from a remote engine. Anything that can answer
//! "best move for this FEN at this depth" implements [`OpponentEngine`].

pub mod stockfish;
pub mod types;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::OpponentMoveFailure;

pub use stockfish::StockfishOnline;
pub use types::BestMoveResponse;

/// Source of opponent moves.
#[async_trait]
pub trait OpponentEngine: Send + Sync {
    /// Returns a move token (UCI, e.g. `e7e5`) for the side to move in `fen`.
    async fn best_move(&self, fen: &str, depth: u8) -> Result<String, OpponentMoveFailure>;
}

/// An engine that never answers, so every opponent move is the local
/// random fallback. Used when running offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMover;

#[async_trait]
impl OpponentEngine for RandomMover {
    async fn best_move(&self, _fen: &str, _depth: u8) -> Result<String, OpponentMoveFailure> {
        Err(OpponentMoveFailure::EngineDeclined(
            "offline, playing a random move".to_string(),
        ))
    }
}

/// Opponent strength, expressed as engine search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Impossible,
    ];

    /// Search depth sent to the engine
    pub fn search_depth(&self) -> u8 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 5,
            Difficulty::Hard => 8,
            Difficulty::Impossible => 15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Impossible => "Impossible",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "impossible" => Ok(Difficulty::Impossible),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depths_increase_with_difficulty() {
        let depths: Vec<u8> = Difficulty::ALL.iter().map(|d| d.search_depth()).collect();
        assert_eq!(depths, vec![2, 5, 8, 15]);
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" Impossible ".parse::<Difficulty>(), Ok(Difficulty::Impossible));
        assert!("grandmaster".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[tokio::test]
    async fn test_random_mover_always_declines() {
        let result = RandomMover.best_move("8/8/8/8/8/8/8/8 w - - 0 1", 5).await;
        assert!(matches!(result, Err(OpponentMoveFailure::EngineDeclined(_))));
    }
}
