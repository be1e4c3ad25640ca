//! Side-to-move representation.

use crate::Rank;
use serde::{Deserialize, Serialize};

/// The two sides of a chess game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// Both sides, White first.
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// Returns the opposite side.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Returns the index (0 for White, 1 for Black).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Square-index offset of a single pawn step (+8 for White, -8 for Black).
    #[inline]
    pub const fn pawn_push(self) -> i8 {
        match self {
            Color::White => 8,
            Color::Black => -8,
        }
    }

    /// Returns the rank as seen from this side, so that every side's
    /// back rank is [`Rank::R1`].
    #[inline]
    pub const fn relative_rank(self, rank: Rank) -> Rank {
        match self {
            Color::White => rank,
            Color::Black => rank.flip(),
        }
    }

    /// Returns the back rank for this side.
    #[inline]
    pub const fn back_rank(self) -> Rank {
        self.relative_rank(Rank::R1)
    }

    /// FEN side-to-move character.
    pub const fn to_fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Parses a FEN side-to-move character.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opposite()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_color() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn relative_rank() {
        assert_eq!(Color::White.relative_rank(Rank::R2), Rank::R2);
        assert_eq!(Color::Black.relative_rank(Rank::R2), Rank::R7);
        assert_eq!(Color::Black.back_rank(), Rank::R8);
    }

    #[test]
    fn fen_chars() {
        assert_eq!(Color::from_fen_char('w'), Some(Color::White));
        assert_eq!(Color::from_fen_char('b'), Some(Color::Black));
        assert_eq!(Color::from_fen_char('W'), None);
        assert_eq!(Color::Black.to_fen_char(), 'b');
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Color::White), "White");
        assert_eq!(format!("{}", Color::Black), "Black");
    }
}
