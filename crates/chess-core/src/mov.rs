//! Move representation.

use crate::{CastlingSide, PieceType, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The special-move tag stored in bits 12-13 of a [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Quiet move or ordinary capture.
    Normal = 0,
    /// King moves two squares; the rook is relocated internally.
    Castling = 1,
    /// Pawn reaches the last rank; bits 14-15 hold the new piece.
    Promotion = 2,
    /// Pawn captures the pawn that just double-pushed past it.
    EnPassant = 3,
}

/// A chess move packed into 16 bits.
///
/// | bits  | field                                  |
/// |-------|----------------------------------------|
/// | 0-5   | source square                          |
/// | 6-11  | destination square                     |
/// | 12-13 | [`MoveKind`]                           |
/// | 14-15 | promotion piece (knight = 0 .. queen = 3) |
///
/// Castling is encoded as the king's two-square move (`e1g1`, `e1c1`, ...).
/// [`Move::NONE`] and [`Move::NULL`] have equal source and destination and
/// are therefore never generated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    /// "No move" sentinel (a1a1).
    pub const NONE: Move = Move(0);

    /// Null-move sentinel (h8h8).
    pub const NULL: Move = Move(0x0FFF);

    /// Creates a move with an explicit kind and knight promotion bits.
    #[inline]
    pub const fn with_kind(from: Square, to: Square, kind: MoveKind) -> Self {
        Move((from.index() as u16) | ((to.index() as u16) << 6) | ((kind as u16) << 12))
    }

    /// Creates a normal move.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self::with_kind(from, to, MoveKind::Normal)
    }

    /// Creates a promotion to `piece`, which must be knight, bishop, rook or queen.
    #[inline]
    pub const fn promotion(from: Square, to: Square, piece: PieceType) -> Self {
        debug_assert!(
            (piece as u8) >= PieceType::Knight as u8 && (piece as u8) <= PieceType::Queen as u8
        );
        let bits = (piece as u16).wrapping_sub(PieceType::Knight as u16) & 3;
        Move(Self::with_kind(from, to, MoveKind::Promotion).0 | (bits << 14))
    }

    /// Creates a castling move from the king's source and destination.
    #[inline]
    pub const fn castling(from: Square, to: Square) -> Self {
        Self::with_kind(from, to, MoveKind::Castling)
    }

    /// Creates an en passant capture.
    #[inline]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Self::with_kind(from, to, MoveKind::EnPassant)
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        Square::from_bits((self.0 & 0x3F) as u8)
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        Square::from_bits(((self.0 >> 6) & 0x3F) as u8)
    }

    /// Returns the move kind.
    #[inline]
    pub const fn kind(self) -> MoveKind {
        match (self.0 >> 12) & 3 {
            0 => MoveKind::Normal,
            1 => MoveKind::Castling,
            2 => MoveKind::Promotion,
            _ => MoveKind::EnPassant,
        }
    }

    /// Returns the promotion piece for promotion moves.
    #[inline]
    pub const fn promotion_piece(self) -> Option<PieceType> {
        match self.kind() {
            MoveKind::Promotion => PieceType::from_index(((self.0 >> 14) & 3) as u8 + 2),
            _ => None,
        }
    }

    /// Returns true if this is a promotion.
    #[inline]
    pub const fn is_promotion(self) -> bool {
        matches!(self.kind(), MoveKind::Promotion)
    }

    /// Returns true if this is castling.
    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self.kind(), MoveKind::Castling)
    }

    /// Returns true unless this is one of the sentinels.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.from().index() != self.to().index()
    }

    /// Returns the raw 16-bit encoding.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Rebuilds a move from its raw encoding.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Move(raw)
    }

    /// Returns the UCI coordinate text (e.g., "e2e4", "e7e8q").
    ///
    /// Sentinels render as `0000`.
    pub fn to_uci(self) -> String {
        if !self.is_valid() {
            return "0000".to_string();
        }
        let mut s = format!("{}{}", self.from(), self.to());
        if let Some(piece) = self.promotion_piece() {
            s.push(piece.to_char().to_ascii_lowercase());
        }
        s
    }

    /// Returns the hyphenated coordinate text (e.g., "e2-e4", "e7-e8Q", "O-O").
    pub fn to_an(self) -> String {
        if !self.is_valid() {
            return "0000".to_string();
        }
        if self.is_castling() {
            return CastlingSide::from_king_target(self.to()).notation().to_string();
        }
        let mut s = format!("{}-{}", self.from(), self.to());
        if let Some(piece) = self.promotion_piece() {
            s.push(piece.to_char());
        }
        s
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// Text formats a move can be read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveFormat {
    /// Hyphenated coordinates: `e2-e4`, `e7-e8Q`, `O-O`.
    An,
    /// Standard algebraic notation: `e4`, `Nbd2`, `exd8=Q+`.
    #[default]
    San,
    /// UCI coordinates: `e2e4`, `e7e8q`.
    Uci,
}

impl MoveFormat {
    /// All formats, in the order game records store them.
    pub const ALL: [MoveFormat; 3] = [MoveFormat::An, MoveFormat::San, MoveFormat::Uci];

    /// Index into per-format arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}
