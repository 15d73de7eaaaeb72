//! stockfish.online API data types

use serde::Deserialize;

use crate::error::OpponentMoveFailure;

/// Body returned by `GET /api/s/v2.php`.
#[derive(Debug, Clone, Deserialize)]
pub struct BestMoveResponse {
    pub success: bool,
    #[serde(default)]
    pub bestmove: Option<String>,
    #[serde(default)]
    pub evaluation: Option<f64>,
    #[serde(default)]
    pub mate: Option<i32>,
    #[serde(default)]
    pub continuation: Option<String>,
    /// Error message when `success` is false
    #[serde(default)]
    pub data: Option<String>,
}

impl BestMoveResponse {
    /// Extracts the move from `"bestmove e2e4 ponder e7e5"`.
    pub fn move_token(&self) -> Result<String, OpponentMoveFailure> {
        if !self.success {
            return Err(OpponentMoveFailure::EngineDeclined(
                self.data
                    .clone()
                    .unwrap_or_else(|| "success: false".to_string()),
            ));
        }

        let raw = self.bestmove.as_deref().unwrap_or("");
        let mut parts = raw.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("bestmove"), Some(token)) if token != "(none)" => Ok(token.to_string()),
            _ => Err(OpponentMoveFailure::Unparseable(raw.to_string())),
        }
    }
}
