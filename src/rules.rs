// Thin wrapper around the shakmaty position: the only place that touches chess rules.

use std::collections::HashMap;

use shakmaty::uci::UciMove;
use shakmaty::zobrist::Zobrist64;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Piece, Position, Rank, Role, Square};
use thiserror::Error;

// Automatic draws, no claim needed (75 full moves, 5 repetitions).
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
const FIVEFOLD: u32 = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RulesError {
    #[error("illegal move {0}")]
    IllegalMove(UciMove),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl Outcome {
    pub fn banner(self) -> &'static str {
        match self {
            Outcome::WhiteWins => "White Wins!",
            Outcome::BlackWins => "Black Wins!",
            Outcome::Draw => "Draw!",
        }
    }

    fn winner(color: Color) -> Self {
        match color {
            Color::White => Outcome::WhiteWins,
            Color::Black => Outcome::BlackWins,
        }
    }
}

// Repetition identity: placement, side to move, castling rights and a
// capturable en passant square, hashed.
fn repetition_key(pos: &Chess) -> Zobrist64 {
    pos.zobrist_hash(EnPassantMode::Legal)
}

/// A game in progress: the current position plus the moves that led to it.
///
/// All legality questions are answered by shakmaty. Moves only enter the game
/// through [`Game::play`], which rejects anything outside the legal-move set.
#[derive(Clone, Debug)]
pub struct Game {
    position: Chess,
    history: Vec<UciMove>,
    seen: HashMap<Zobrist64, u32>,
}

impl Default for Game {
    fn default() -> Self {
        let position = Chess::default();
        let mut seen = HashMap::new();
        seen.insert(repetition_key(&position), 1);
        Self {
            position,
            history: Vec::new(),
            seen,
        }
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the standard starting position, in place.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.position.board().piece_at(sq)
    }

    /// Square of the side to move's king, if that king is in check.
    pub fn checked_king(&self) -> Option<Square> {
        if self.is_check() {
            self.position.board().king_of(self.turn())
        } else {
            None
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves().into_iter().collect()
    }

    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .filter(|m| m.from() == Some(from))
            .collect()
    }

    /// Moves played so far, in UCI notation.
    pub fn history(&self) -> &[UciMove] {
        &self.history
    }

    /// Builds the move a click pair means. A pawn landing on its last rank
    /// always becomes a queen.
    pub fn candidate(&self, from: Square, to: Square) -> UciMove {
        let promotion = match self.piece_at(from) {
            Some(Piece {
                role: Role::Pawn,
                color,
            }) if to.rank() == last_rank(color) => Some(Role::Queen),
            _ => None,
        };
        UciMove::Normal {
            from,
            to,
            promotion,
        }
    }

    /// Resolves a UCI move against the current position and plays it.
    pub fn play_uci(&mut self, uci: &UciMove) -> Result<Move, RulesError> {
        let m = uci
            .to_move(&self.position)
            .map_err(|_| RulesError::IllegalMove(uci.clone()))?;
        self.play(m)
    }

    /// Plays `m` if the position allows it; otherwise leaves the game untouched.
    pub fn play(&mut self, m: Move) -> Result<Move, RulesError> {
        let uci = m.to_uci(CastlingMode::Standard);
        if !self.position.legal_moves().contains(&m) {
            return Err(RulesError::IllegalMove(uci));
        }
        let next = self
            .position
            .clone()
            .play(m)
            .map_err(|_| RulesError::IllegalMove(uci.clone()))?;
        self.position = next;
        self.history.push(uci);
        *self
            .seen
            .entry(repetition_key(&self.position))
            .or_insert(0) += 1;
        Ok(m)
    }

    /// `None` while the game is still running.
    pub fn outcome(&self) -> Option<Outcome> {
        let pos = &self.position;
        if pos.is_checkmate() {
            return Some(Outcome::winner(pos.turn().other()));
        }
        let drawn = pos.is_stalemate()
            || pos.is_insufficient_material()
            || pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES
            || self.repetitions() >= FIVEFOLD;
        drawn.then_some(Outcome::Draw)
    }

    fn repetitions(&self) -> u32 {
        self.seen
            .get(&repetition_key(&self.position))
            .copied()
            .unwrap_or(0)
    }
}

fn last_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    }
}
