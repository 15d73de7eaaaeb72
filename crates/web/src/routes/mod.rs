use askama::Template;
use axum::{extract::State, response::Redirect, Form};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use grandmaster_core::history::MovePair;
use grandmaster_core::{
    Color, Difficulty, GameAnalysis, MoveHint, Piece, Role, SessionConfig, Snapshot, Square,
};

use crate::AppState;

pub mod api;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub status: String,
    pub rows: Vec<Vec<SquareView>>,
    pub moves: Vec<MovePair>,
    pub difficulties: Vec<DifficultyOption>,
    pub human_side: String,
    pub is_player_turn: bool,
    pub thinking: bool,
    pub game_over: bool,
    pub hint_enabled: bool,
    pub hint: Option<MoveHint>,
    pub analysis: Option<GameAnalysis>,
    pub analysis_in_flight: bool,
    pub notice: Option<String>,
}

pub struct SquareView {
    pub name: String,
    pub glyph: &'static str,
    pub light: bool,
    pub last_move: bool,
    pub hinted: bool,
}

pub struct DifficultyOption {
    pub name: &'static str,
    pub selected: bool,
}

#[derive(Deserialize)]
pub struct NewGameForm {
    pub difficulty: Option<String>,
    pub side: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveForm {
    pub from: String,
    pub to: String,
}

pub async fn index(State(state): State<Arc<AppState>>) -> IndexTemplate {
    let snapshot = state.controller.snapshot();
    render_page(&snapshot)
}

pub async fn new_game(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewGameForm>,
) -> Redirect {
    state.controller.new_game(parse_config(&form));
    Redirect::to("/")
}

pub async fn make_move(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MoveForm>,
) -> Redirect {
    if let Err(e) = state.controller.submit_move(&form.from, &form.to) {
        debug!(from = %form.from, to = %form.to, error = %e, "move rejected");
    }
    Redirect::to("/")
}

pub async fn hint(State(state): State<Arc<AppState>>) -> Redirect {
    // Failures are surfaced through the snapshot's notice
    let _ = state.controller.request_hint().await;
    Redirect::to("/")
}

pub async fn analyze(State(state): State<Arc<AppState>>) -> Redirect {
    let _ = state.controller.request_analysis().await;
    Redirect::to("/")
}

pub async fn health() -> &'static str {
    "OK"
}

pub fn parse_config(form: &NewGameForm) -> SessionConfig {
    let difficulty = form
        .difficulty
        .as_deref()
        .and_then(|d| d.parse::<Difficulty>().ok())
        .unwrap_or_default();

    let human_side = match form.side.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("black") => Color::Black,
        _ => Color::White,
    };

    SessionConfig {
        difficulty,
        human_side,
    }
}

fn render_page(snapshot: &Snapshot) -> IndexTemplate {
    let config = snapshot.session.config();

    IndexTemplate {
        title: "Grandmaster AI".to_string(),
        status: snapshot.display_status().to_string(),
        rows: board_rows(snapshot),
        moves: snapshot.history.numbered_pairs(),
        difficulties: Difficulty::ALL
            .iter()
            .map(|d| DifficultyOption {
                name: d.as_str(),
                selected: *d == config.difficulty,
            })
            .collect(),
        human_side: snapshot.human_side.to_string(),
        is_player_turn: snapshot.is_player_turn(),
        thinking: snapshot.opponent_thinking,
        game_over: snapshot.game_over,
        hint_enabled: snapshot.is_player_turn() && !snapshot.hint_in_flight,
        hint: snapshot.hint.clone(),
        analysis: snapshot.analysis.clone(),
        analysis_in_flight: snapshot.analysis_in_flight,
        notice: snapshot.notice.clone(),
    }
}

/// Board as rows of squares, from the human player's side.
fn board_rows(snapshot: &Snapshot) -> Vec<Vec<SquareView>> {
    let board = snapshot.session.board();
    let flipped = snapshot.session.config().human_side == Color::Black;

    let last = snapshot.last_move.as_ref();
    let hinted = snapshot.hint.as_ref();

    let mut ranks: Vec<u32> = (0..8).rev().collect();
    let mut files: Vec<u32> = (0..8).collect();
    if flipped {
        ranks.reverse();
        files.reverse();
    }

    ranks
        .iter()
        .map(|&rank| {
            files
                .iter()
                .map(|&file| {
                    let square = Square::new(rank * 8 + file);
                    let name = square.to_string();
                    SquareView {
                        glyph: board.piece_at(square).map(piece_glyph).unwrap_or(""),
                        light: (rank + file) % 2 == 1,
                        last_move: last.is_some_and(|(f, t)| *f == name || *t == name),
                        hinted: hinted.is_some_and(|h| h.from == name || h.to == name),
                        name,
                    }
                })
                .collect()
        })
        .collect()
}

fn piece_glyph(piece: Piece) -> &'static str {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => "\u{2654}",
        (Color::White, Role::Queen) => "\u{2655}",
        (Color::White, Role::Rook) => "\u{2656}",
        (Color::White, Role::Bishop) => "\u{2657}",
        (Color::White, Role::Knight) => "\u{2658}",
        (Color::White, Role::Pawn) => "\u{2659}",
        (Color::Black, Role::King) => "\u{265A}",
        (Color::Black, Role::Queen) => "\u{265B}",
        (Color::Black, Role::Rook) => "\u{265C}",
        (Color::Black, Role::Bishop) => "\u{265D}",
        (Color::Black, Role::Knight) => "\u{265E}",
        (Color::Black, Role::Pawn) => "\u{265F}",
    }
}
