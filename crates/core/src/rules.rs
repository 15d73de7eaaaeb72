//! Rules layer over shakmaty
//!
//! `Board` is an immutable position plus the repetition history shakmaty
//! positions do not keep. Every move returns a new board.

use shakmaty::{
    fen::Fen, san::San, CastlingMode, Chess, Color, EnPassantMode, File, Move, Piece, Position,
    Rank, Role, Square,
};

use crate::error::RulesError;

/// A move that was applied, in the notations the rest of the crate needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub san: String,
    pub uci: String,
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone)]
pub struct Board {
    position: Chess,
    /// Placement, side, castling and en passant of every position reached.
    repetition_keys: Vec<String>,
}

impl Board {
    /// The standard starting position
    pub fn starting() -> Self {
        Self::from_position(Chess::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| RulesError::InvalidFen(format!("{}", e)))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition(format!("{}", e)))?;
        Ok(Self::from_position(position))
    }

    fn from_position(position: Chess) -> Self {
        let key = repetition_key(&position);
        Self {
            position,
            repetition_keys: vec![key],
        }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// Legal moves, optionally only those leaving `from`.
    pub fn legal_moves(&self, from: Option<Square>) -> Vec<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .filter(|m| from.is_none() || m.from() == from)
            .collect()
    }

    /// Destination squares reachable from `from`, as the player would click them.
    pub fn legal_targets(&self, from: Square) -> Vec<Square> {
        let mut targets: Vec<Square> = self
            .legal_moves(Some(from))
            .iter()
            .map(destination)
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// True when the piece on `from` is a pawn arriving on its last rank.
    pub fn needs_promotion(&self, from: Square, to: Square) -> bool {
        match self.piece_at(from) {
            Some(Piece {
                role: Role::Pawn,
                color,
            }) => to.rank() == last_rank(color),
            _ => false,
        }
    }

    /// Finds and plays the legal move matching the squares and promotion.
    ///
    /// Castling is accepted both as king-to-destination (`e1g1`) and as
    /// king-onto-rook (`e1h1`).
    pub fn play(
        &self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<(Board, PlayedMove), RulesError> {
        let mv = self
            .legal_moves(Some(from))
            .into_iter()
            .find(|m| (destination(m) == to || m.to() == to) && m.promotion() == promotion)
            .ok_or_else(|| RulesError::Illegal(format!("{}{}", from, to)))?;

        self.play_move(mv)
    }

    /// Plays a move already known to be legal in this position.
    pub fn play_move(&self, mv: Move) -> Result<(Board, PlayedMove), RulesError> {
        let san = San::from_move(&self.position, mv.clone()).to_string();
        let uci = move_to_uci(&mv);
        let from = mv
            .from()
            .ok_or_else(|| RulesError::Illegal(uci.clone()))?;
        let to = destination(&mv);

        let position = self
            .position
            .clone()
            .play(mv)
            .map_err(|e| RulesError::Illegal(format!("{}: {}", uci, e)))?;

        let suffix = if position.is_checkmate() {
            "#"
        } else if position.is_check() {
            "+"
        } else {
            ""
        };

        let mut repetition_keys = self.repetition_keys.clone();
        repetition_keys.push(repetition_key(&position));

        let board = Board {
            position,
            repetition_keys,
        };

        Ok((
            board,
            PlayedMove {
                san: format!("{}{}", san, suffix),
                uci,
                from,
                to,
            },
        ))
    }

    /// Resolves a move token in UCI (`e2e4`, `e7e8q`) or SAN (`Nf3`, `O-O+`)
    /// against the legal moves of this position.
    pub fn parse_move(&self, token: &str) -> Option<Move> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        let lowered = token.to_ascii_lowercase();
        let legal = self.legal_moves(None);
        if let Some(mv) = legal.iter().find(|m| move_to_uci(m) == lowered) {
            return Some(mv.clone());
        }

        let san: San = token.trim_end_matches(['+', '#', '!', '?']).parse().ok()?;
        san.to_move(&self.position).ok()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    pub fn in_check(&self) -> bool {
        self.position.is_check()
    }

    /// The current position has occurred at least three times.
    pub fn is_threefold_repetition(&self) -> bool {
        match self.repetition_keys.last() {
            Some(current) => self.repetition_keys.iter().filter(|k| *k == current).count() >= 3,
            None => false,
        }
    }

    /// A hundred half-moves without a capture or pawn move.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.position.halfmoves() >= 100
    }

    pub fn is_draw(&self) -> bool {
        self.is_fifty_move_draw()
            || self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

/// "White" or "Black"
pub fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

fn last_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    }
}

fn repetition_key(position: &Chess) -> String {
    let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Square the moving piece lands on; the king's square for castling.
fn destination(mv: &Move) -> Square {
    match mv {
        Move::Castle { king, rook } => {
            if rook.file() > king.file() {
                Square::from_coords(File::G, king.rank())
            } else {
                Square::from_coords(File::C, king.rank())
            }
        }
        other => other.to(),
    }
}

/// Convert shakmaty Move to UCI string
pub fn move_to_uci(mv: &Move) -> String {
    match mv {
        Move::Normal {
            from,
            to,
            promotion,
            ..
        } => {
            let promo = promotion.map(|r| r.char().to_string()).unwrap_or_default();
            format!("{}{}{}", from, to, promo)
        }
        Move::EnPassant { from, to, .. } => format!("{}{}", from, to),
        Move::Castle { king, .. } => format!("{}{}", king, destination(mv)),
        Move::Put { .. } => String::new(),
    }
}
