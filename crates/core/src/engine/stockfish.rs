//! stockfish.online client
//!
//! Asks the hosted Stockfish for a best move over HTTP. Any transport or
//! protocol problem becomes an [`OpponentMoveFailure`] so the session can
//! fall back to a random legal move.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::BestMoveResponse;
use super::OpponentEngine;
use crate::error::{OpponentMoveFailure, Result};

pub const STOCKFISH_ONLINE_URL: &str = "https://stockfish.online/api/s/v2.php";

/// The v2 API refuses depths of 16 and above.
const MAX_DEPTH: u8 = 15;

pub struct StockfishOnline {
    client: Client,
    base_url: String,
}

impl StockfishOnline {
    pub fn new() -> Result<Self> {
        Self::with_url(STOCKFISH_ONLINE_URL, Duration::from_secs(30))
    }

    pub fn with_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl OpponentEngine for StockfishOnline {
    async fn best_move(&self, fen: &str, depth: u8) -> std::result::Result<String, OpponentMoveFailure> {
        let depth = depth.clamp(1, MAX_DEPTH);
        debug!(fen, depth, "requesting engine move");
        let depth = depth.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("fen", fen), ("depth", depth.as_str())])
            .send()
            .await
            .map_err(|e| OpponentMoveFailure::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OpponentMoveFailure::Unreachable(format!(
                "engine returned status {}",
                response.status()
            )));
        }

        let body: BestMoveResponse = response
            .json()
            .await
            .map_err(|e| OpponentMoveFailure::Unparseable(e.to_string()))?;

        body.move_token()
    }
}
