//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1"
//!
//! Both directions work against the full legal move list, promotions to
//! bishop and rook included. The position is mutated only inside a
//! `MoveGuard` scope and is unchanged on return.

use crate::movegen::{generate_legal_ex, has_legal_moves, MoveList};
use crate::notation::{castling_side, find_castling, MoveParseError};
use crate::position::MoveGuard;
use crate::Position;
use chess_core::{CastlingSide, File, Move, PieceType, Rank, Square};

/// Converts a move to SAN, including the `+`/`#` suffix.
///
/// The position must be the state BEFORE the move is made.
pub fn move_to_san(position: &mut Position, m: Move) -> Result<String, MoveParseError> {
    let moves = generate_legal_ex(position);
    let piece = position
        .piece_on(m.from())
        .map(|p| p.piece_type())
        .filter(|_| moves.contains(m))
        .ok_or_else(|| MoveParseError::Illegal(m.to_uci()))?;

    let from = m.from();
    let to = m.to();
    let mut san = String::new();

    if m.is_castling() {
        san.push_str(CastlingSide::from_king_target(to).notation());
    } else if piece == PieceType::Pawn {
        // Pawn captures include the source file
        if from.file() != to.file() {
            san.push(from.file().to_char());
            san.push('x');
        }
        san.push_str(&to.to_algebraic());
        if let Some(promotion) = m.promotion_piece() {
            san.push('=');
            san.push(promotion.to_char());
        }
    } else {
        san.push(piece.to_char());
        san.push_str(&disambiguation(position, &moves, m, piece));
        if position.is_capture(m) {
            san.push('x');
        }
        san.push_str(&to.to_algebraic());
    }

    let mut after = MoveGuard::new(position, m);
    if after.is_in_check() {
        san.push(if has_legal_moves(&mut after) { '+' } else { '#' });
    }
    Ok(san)
}

/// Parses a SAN string and returns the corresponding legal move.
///
/// Check and annotation suffixes are ignored, and the promotion piece may
/// be written with or without `=`.
pub fn san_to_move(position: &mut Position, text: &str) -> Result<Move, MoveParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MoveParseError::Empty);
    }

    let san = text.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'));
    if let Some(side) = castling_side(san) {
        return find_castling(position, side, text);
    }

    let parsed = ParsedSan::parse(san).ok_or_else(|| MoveParseError::Malformed(text.to_string()))?;

    let mut found = None;
    for &m in &generate_legal_ex(position) {
        if !parsed.matches(position, m) {
            continue;
        }
        if found.is_some() {
            return Err(MoveParseError::Ambiguous(text.to_string()));
        }
        found = Some(m);
    }
    found.ok_or_else(|| MoveParseError::Illegal(text.to_string()))
}

/// Parsed components of a SAN string.
#[derive(Debug, PartialEq, Eq)]
struct ParsedSan {
    piece: PieceType,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<PieceType>,
}

impl ParsedSan {
    fn parse(san: &str) -> Option<Self> {
        let mut chars: Vec<char> = san.chars().filter(|&c| c != 'x').collect();

        let piece = match chars.first().copied()? {
            c @ ('N' | 'B' | 'R' | 'Q' | 'K') => {
                chars.remove(0);
                PieceType::from_char(c)?
            }
            _ => PieceType::Pawn,
        };

        let promotion = match chars.last().copied() {
            Some(c @ ('N' | 'B' | 'R' | 'Q')) if piece == PieceType::Pawn => {
                chars.pop();
                if chars.last() == Some(&'=') {
                    chars.pop();
                }
                PieceType::from_char(c)
            }
            _ => None,
        };

        // The last two characters are the destination square
        if chars.len() < 2 || chars.len() > 4 {
            return None;
        }
        let split = chars.len() - 2;
        let to = Square::new(file_of(chars[split])?, Rank::from_char(chars[split + 1])?);

        let (from_file, from_rank) = match chars[..split] {
            [] => (None, None),
            [c] => match (file_of(c), Rank::from_char(c)) {
                (Some(f), _) => (Some(f), None),
                (None, Some(r)) => (None, Some(r)),
                (None, None) => return None,
            },
            [f, r] => (Some(file_of(f)?), Some(Rank::from_char(r)?)),
            _ => return None,
        };

        // A pawn without a source file moves straight ahead
        let from_file = match (piece, from_file) {
            (PieceType::Pawn, None) => Some(to.file()),
            (_, f) => f,
        };

        Some(ParsedSan {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, position: &Position, m: Move) -> bool {
        if m.is_castling() || m.to() != self.to {
            return false;
        }
        if position.piece_on(m.from()).map(|p| p.piece_type()) != Some(self.piece) {
            return false;
        }
        if self.from_file.is_some_and(|f| m.from().file() != f) {
            return false;
        }
        if self.from_rank.is_some_and(|r| m.from().rank() != r) {
            return false;
        }
        // A missing promotion piece matches every promotion, which then
        // reports as ambiguous.
        match (m.promotion_piece(), self.promotion) {
            (Some(p), Some(q)) => p == q,
            (None, Some(_)) => false,
            _ => true,
        }
    }
}

/// SAN files are lowercase so that `B` always reads as a bishop.
fn file_of(c: char) -> Option<File> {
    if c.is_ascii_lowercase() {
        File::from_char(c)
    } else {
        None
    }
}

/// File, rank, or both, whichever singles `m` out among moves of the same
/// piece type to the same square.
fn disambiguation(position: &Position, moves: &MoveList, m: Move, piece: PieceType) -> String {
    let from = m.from();
    let rivals: Vec<Square> = moves
        .iter()
        .filter(|o| o.to() == m.to() && o.from() != from)
        .filter(|o| position.piece_on(o.from()).map(|p| p.piece_type()) == Some(piece))
        .map(|o| o.from())
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|s| s.file() != from.file()) {
        return from.file().to_char().to_string();
    }
    if rivals.iter().all(|s| s.rank() != from.rank()) {
        return from.rank().to_char().to_string();
    }
    from.to_algebraic()
}
