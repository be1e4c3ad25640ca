//! Piece types and colored pieces.

use crate::Color;
use std::num::NonZeroU8;

/// The six kinds of chess pieces.
///
/// Discriminants start at 1 so that index 0 of per-type tables is free to
/// hold an aggregate over all types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceType {
    /// All piece types in ascending value order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Pieces a pawn may promote to, weakest first.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
    ];

    /// Size of tables indexed by [`PieceType::index`], including the
    /// aggregate slot 0.
    pub const TABLE_SIZE: usize = 7;

    /// Returns the table index (1-6).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Creates a piece type from its table index.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(PieceType::Pawn),
            2 => Some(PieceType::Knight),
            3 => Some(PieceType::Bishop),
            4 => Some(PieceType::Rook),
            5 => Some(PieceType::Queen),
            6 => Some(PieceType::King),
            _ => None,
        }
    }

    /// Uppercase letter used by SAN and AN (`P` for pawns).
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// Parses a piece letter in either case.
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Returns true for bishops, rooks, and queens.
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }

    /// Returns true for knights and bishops.
    #[inline]
    pub const fn is_minor(self) -> bool {
        matches!(self, PieceType::Knight | PieceType::Bishop)
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PieceType::Pawn => "Pawn",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// A piece of a given color, packed as `(color << 3) | type`.
///
/// White pieces take the values 1-6, Black pieces 9-14. The value is never
/// zero, so `Option<Piece>` stays one byte and `None` is the empty square.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(NonZeroU8);

impl Piece {
    /// Creates a piece from its color and type.
    #[inline]
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        match NonZeroU8::new(((color as u8) << 3) | piece_type as u8) {
            Some(v) => Piece(v),
            None => unreachable!(),
        }
    }

    /// Returns the color of the piece.
    #[inline]
    pub const fn color(self) -> Color {
        if self.0.get() >> 3 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Returns the type of the piece.
    #[inline]
    pub const fn piece_type(self) -> PieceType {
        match PieceType::from_index(self.0.get() & 7) {
            Some(pt) => pt,
            None => unreachable!(),
        }
    }

    /// Returns the packed value.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0.get()
    }

    /// Returns the FEN character (uppercase for White).
    pub const fn to_fen_char(self) -> char {
        let c = self.piece_type().to_char();
        match self.color() {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parses a FEN piece character.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceType::from_char(c) {
            Some(pt) => Some(Piece::new(color, pt)),
            None => None,
        }
    }
}

impl std::fmt::Debug for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Piece({})", self.to_fen_char())
    }
}
