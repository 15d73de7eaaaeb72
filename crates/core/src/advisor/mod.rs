//! Natural-language coaching from a generative text service
//!
//! Two capabilities: a post-game analysis of the move history, and a hint
//! for the current position. Suggested moves are only ever trusted after the
//! session checks them against the legal moves.

pub mod gemini;
pub mod prompts;
pub mod types;

use async_trait::async_trait;
use shakmaty::Color;

use crate::error::AdvisorError;

pub use gemini::GeminiAdvisor;
pub use types::{GameAnalysis, MoveSuggestion};

#[async_trait]
pub trait Advisor: Send + Sync {
    /// Reviews a finished game given as space separated SAN.
    async fn analyze_game(&self, history: &str) -> Result<GameAnalysis, AdvisorError>;

    /// Suggests a move for `side` in the position `fen`.
    async fn suggest_move(&self, fen: &str, side: Color) -> Result<MoveSuggestion, AdvisorError>;
}

/// Stand-in when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAdvisor;

#[async_trait]
impl Advisor for DisabledAdvisor {
    async fn analyze_game(&self, _history: &str) -> Result<GameAnalysis, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }

    async fn suggest_move(&self, _fen: &str, _side: Color) -> Result<MoveSuggestion, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }
}
