use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use grandmaster_core::error::{AnalysisFailure, HintFailure, MoveRejected};
use grandmaster_core::{GameAnalysis, MoveHint, Snapshot};

use super::{parse_config, NewGameForm};
use crate::AppState;

// ============================================================================
// REQUESTS / RESPONSES
// ============================================================================

#[derive(Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
}

#[derive(Deserialize)]
pub struct TargetsQuery {
    pub from: String,
}

#[derive(Serialize)]
pub struct TargetsResponse {
    pub from: String,
    pub targets: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error reply carried as `{"error": "..."}`.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<MoveRejected> for ApiError {
    fn from(e: MoveRejected) -> Self {
        let status = match e {
            MoveRejected::InvalidSquare(_) => StatusCode::BAD_REQUEST,
            MoveRejected::OpponentThinking => StatusCode::CONFLICT,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<HintFailure> for ApiError {
    fn from(e: HintFailure) -> Self {
        let status = match e {
            HintFailure::InFlight => StatusCode::CONFLICT,
            HintFailure::NotYourTurn | HintFailure::GameOver => StatusCode::UNPROCESSABLE_ENTITY,
            HintFailure::Advisor(_) | HintFailure::IllegalSuggestion(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<AnalysisFailure> for ApiError {
    fn from(e: AnalysisFailure) -> Self {
        let status = match e {
            AnalysisFailure::InFlight => StatusCode::CONFLICT,
            AnalysisFailure::GameNotOver => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisFailure::Advisor(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn state(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.controller.snapshot())
}

pub async fn new_game(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewGameForm>,
) -> Json<Snapshot> {
    Json(state.controller.new_game(parse_config(&req)))
}

pub async fn make_move(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = state.controller.submit_move(&req.from, &req.to)?;
    Ok(Json(snapshot))
}

pub async fn legal_targets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TargetsQuery>,
) -> Result<Json<TargetsResponse>, ApiError> {
    let targets = state.controller.legal_targets(&params.from)?;
    Ok(Json(TargetsResponse {
        from: params.from,
        targets,
    }))
}

pub async fn hint(State(state): State<Arc<AppState>>) -> Result<Json<MoveHint>, ApiError> {
    Ok(Json(state.controller.request_hint().await?))
}

pub async fn analyze(State(state): State<Arc<AppState>>) -> Result<Json<GameAnalysis>, ApiError> {
    Ok(Json(state.controller.request_analysis().await?))
}
