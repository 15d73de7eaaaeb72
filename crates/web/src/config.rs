//! Command line and environment configuration

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use grandmaster_core::advisor::gemini::DEFAULT_MODEL;
use grandmaster_core::engine::stockfish::STOCKFISH_ONLINE_URL;
use grandmaster_core::{
    Advisor, ControllerConfig, DisabledAdvisor, GameController, GeminiAdvisor, OpponentEngine,
    RandomMover, StockfishOnline,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "grandmaster", version, about = "Play chess against Stockfish with an AI coach")]
pub struct Args {
    /// Address the web server listens on
    #[arg(long, env = "GRANDMASTER_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// stockfish.online compatible endpoint
    #[arg(long, env = "GRANDMASTER_ENGINE_URL", default_value = STOCKFISH_ONLINE_URL)]
    pub engine_url: String,

    #[arg(long, env = "GRANDMASTER_ENGINE_TIMEOUT_SECS", default_value_t = 30)]
    pub engine_timeout_secs: u64,

    /// Enables hints and post-game analysis
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Pause before the opponent answers
    #[arg(long, env = "GRANDMASTER_OPPONENT_DELAY_MS", default_value_t = 500)]
    pub opponent_delay_ms: u64,

    /// Never call the engine; the opponent plays random legal moves
    #[arg(long)]
    pub offline: bool,

    #[arg(long, env = "GRANDMASTER_STATIC_DIR", default_value = "crates/web/static")]
    pub static_dir: PathBuf,
}

impl Args {
    pub fn build_controller(&self) -> grandmaster_core::Result<Arc<GameController>> {
        let engine: Arc<dyn OpponentEngine> = if self.offline {
            Arc::new(RandomMover)
        } else {
            Arc::new(StockfishOnline::with_url(
                &self.engine_url,
                Duration::from_secs(self.engine_timeout_secs),
            )?)
        };

        let advisor: Arc<dyn Advisor> = match self.gemini_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                Arc::new(GeminiAdvisor::new(key.to_string())?.with_model(self.gemini_model.clone()))
            }
            _ => {
                tracing::warn!("GEMINI_API_KEY not set, hints and analysis are disabled");
                Arc::new(DisabledAdvisor)
            }
        };

        let config = ControllerConfig {
            opponent_delay: Duration::from_millis(self.opponent_delay_ms),
        };

        Ok(GameController::new(engine, advisor, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["grandmaster"]).unwrap();
        assert_eq!(args.bind.port(), 3000);
        assert_eq!(args.opponent_delay_ms, 500);
        assert!(!args.offline);
    }

    #[test]
    fn test_flags_override() {
        let args = Args::try_parse_from([
            "grandmaster",
            "--bind",
            "0.0.0.0:8080",
            "--offline",
            "--opponent-delay-ms",
            "0",
        ])
        .unwrap();
        assert_eq!(args.bind.port(), 8080);
        assert!(args.offline);
        assert_eq!(args.opponent_delay_ms, 0);
    }

    #[test]
    fn test_bad_address_rejected() {
        assert!(Args::try_parse_from(["grandmaster", "--bind", "nowhere"]).is_err());
    }
}
