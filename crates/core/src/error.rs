//! Error types for grandmaster-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    MoveRejected(#[from] MoveRejected),

    #[error(transparent)]
    Opponent(#[from] OpponentMoveFailure),

    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    #[error(transparent)]
    Hint(#[from] HintFailure),

    #[error(transparent)]
    Analysis(#[from] AnalysisFailure),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures from the rules layer (FEN handling, move application).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Illegal move: {0}")]
    Illegal(String),
}

/// A human move that was not accepted. The session is left as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejected {
    #[error("The game is over")]
    GameOver,

    #[error("It is not your turn")]
    NotYourTurn,

    #[error("The opponent is still thinking")]
    OpponentThinking,

    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Illegal move: {from}{to}")]
    Illegal { from: String, to: String },
}

/// Why the opponent engine's answer was not used.
///
/// The first two variants mean the request should never have been made. The
/// rest are recovered locally with a random legal move and only reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpponentMoveFailure {
    #[error("It is not the opponent's turn")]
    NotOpponentsTurn,

    #[error("The game is over")]
    GameOver,

    #[error("Engine unreachable: {0}")]
    Unreachable(String),

    #[error("Engine declined: {0}")]
    EngineDeclined(String),

    #[error("Unparseable engine answer: {0}")]
    Unparseable(String),

    #[error("Engine suggested an illegal move: {0}")]
    IllegalSuggestion(String),
}

/// Errors talking to the generative text service.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("No advisor API key configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Advisor API error: {0}")]
    Api(String),

    #[error("Advisor returned no content")]
    EmptyResponse,

    #[error("Advisor response is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum HintFailure {
    #[error("A hint is already being prepared")]
    InFlight,

    #[error("Hints are only available on your turn")]
    NotYourTurn,

    #[error("The game is over")]
    GameOver,

    #[error("Hint failed: {0}")]
    Advisor(#[from] AdvisorError),

    #[error("The suggested move {0} is not legal here")]
    IllegalSuggestion(String),
}

#[derive(Error, Debug)]
pub enum AnalysisFailure {
    #[error("Analysis is available once the game is over")]
    GameNotOver,

    #[error("An analysis is already running")]
    InFlight,

    #[error("Analysis failed: {0}")]
    Advisor(#[from] AdvisorError),
}
