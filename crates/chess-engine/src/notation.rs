//! Move text in the three supported formats.
//!
//! - AN: hyphenated coordinates, `e2-e4`, `e7-e8Q`, `O-O`, `O-O-O`
//! - SAN: see [`crate::san`]
//! - UCI: `e2e4`, `e7e8q`; the king's castling coordinates (`e1g1`, ...)
//!   resolve to the castling move
//!
//! Parsing always resolves against the full legal move list, so a returned
//! move can be applied with [`Position::do_move`] directly.

use crate::movegen::generate_legal_ex;
use crate::san::{move_to_san, san_to_move};
use crate::Position;
use chess_core::{CastlingSide, File, Move, MoveFormat, PieceType, Square};
use thiserror::Error;

/// Error type for move text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    /// The move text is empty.
    #[error("empty move text")]
    Empty,
    /// The text is not a move in the requested format.
    #[error("malformed move text: {0}")]
    Malformed(String),
    /// The text is well formed but no legal move matches it.
    #[error("illegal move: {0}")]
    Illegal(String),
    /// Several legal moves match the text.
    #[error("ambiguous move: {0}")]
    Ambiguous(String),
}

/// Recognizes `O-O`/`O-O-O` and their zero-digit spellings.
pub(crate) fn castling_side(text: &str) -> Option<CastlingSide> {
    match text {
        "O-O" | "0-0" => Some(CastlingSide::King),
        "O-O-O" | "0-0-0" => Some(CastlingSide::Queen),
        _ => None,
    }
}

/// Finds the legal castling move for the side to move.
pub(crate) fn find_castling(
    position: &mut Position,
    side: CastlingSide,
    text: &str,
) -> Result<Move, MoveParseError> {
    let target = side.king_target(position.turn());
    generate_legal_ex(position)
        .iter()
        .copied()
        .find(|m| m.is_castling() && m.to() == target)
        .ok_or_else(|| MoveParseError::Illegal(text.to_string()))
}

/// Converts a move to text. The position must be the one the move is
/// played from; only SAN needs it, and SAN fails for illegal moves.
pub fn move_to_str(
    position: &mut Position,
    m: Move,
    format: MoveFormat,
) -> Result<String, MoveParseError> {
    match format {
        MoveFormat::An => Ok(m.to_an()),
        MoveFormat::San => move_to_san(position, m),
        MoveFormat::Uci => Ok(m.to_uci()),
    }
}

/// Parses move text into a legal move of `position`.
pub fn move_from_str(
    position: &mut Position,
    text: &str,
    format: MoveFormat,
) -> Result<Move, MoveParseError> {
    match format {
        MoveFormat::An => an_to_move(position, text),
        MoveFormat::San => san_to_move(position, text),
        MoveFormat::Uci => uci_to_move(position, text),
    }
}

/// Parses hyphenated coordinate text.
pub fn an_to_move(position: &mut Position, text: &str) -> Result<Move, MoveParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MoveParseError::Empty);
    }
    if let Some(side) = castling_side(text) {
        return find_castling(position, side, text);
    }
    if text.get(2..3) != Some("-") {
        return Err(MoveParseError::Malformed(text.to_string()));
    }
    let (from, to, promotion) = parse_coordinates(text, 3)
        .ok_or_else(|| MoveParseError::Malformed(text.to_string()))?;
    resolve(position, from, to, promotion, text)
}

/// Parses UCI coordinate text.
pub fn uci_to_move(position: &mut Position, text: &str) -> Result<Move, MoveParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MoveParseError::Empty);
    }
    let (from, to, promotion) = parse_coordinates(text, 2)
        .ok_or_else(|| MoveParseError::Malformed(text.to_string()))?;
    if let Some(side) = uci_castling(position, from, to) {
        return find_castling(position, side, text);
    }
    resolve(position, from, to, promotion, text)
}

/// `e1g1`, `e1c1`, `e8g8` and `e8c8` played by a king are castling.
fn uci_castling(position: &Position, from: Square, to: Square) -> Option<CastlingSide> {
    let king = position.piece_on(from)?;
    if king.piece_type() != PieceType::King {
        return None;
    }
    let color = king.color();
    if from != Square::new(File::E, color.back_rank()) {
        return None;
    }
    CastlingSide::ALL
        .into_iter()
        .find(|&side| side.king_target(color) == to)
}

/// Reads `<from><to>[promotion]` where the destination starts at byte
/// `to_start`. Promotion letters may be either case.
fn parse_coordinates(text: &str, to_start: usize) -> Option<(Square, Square, Option<PieceType>)> {
    let from = Square::from_algebraic(text.get(0..2)?)?;
    let to_end = to_start + 2;
    let to = Square::from_algebraic(text.get(to_start..to_end)?)?;
    let promotion = match text.get(to_end..)? {
        "" => None,
        rest => {
            let mut chars = rest.chars();
            let piece = chars.next().and_then(PieceType::from_char)?;
            if chars.next().is_some() || !PieceType::PROMOTIONS.contains(&piece) {
                return None;
            }
            Some(piece)
        }
    };
    Some((from, to, promotion))
}

fn resolve(
    position: &mut Position,
    from: Square,
    to: Square,
    promotion: Option<PieceType>,
    text: &str,
) -> Result<Move, MoveParseError> {
    generate_legal_ex(position)
        .iter()
        .copied()
        .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promotion)
        .ok_or_else(|| MoveParseError::Illegal(text.to_string()))
}
