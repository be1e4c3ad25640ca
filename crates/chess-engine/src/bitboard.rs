//! 64-bit square sets.
//!
//! Bit `rank * 8 + file` stands for the square, so a1 is bit 0 and h8 is
//! bit 63.

use chess_core::{File, Rank, Square};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A set of squares.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_H: Bitboard = Bitboard(Self::FILE_A.0 << 7);
    pub const RANK_1: Bitboard = Bitboard(0xFF);
    pub const RANK_8: Bitboard = Bitboard(Self::RANK_1.0 << 56);

    /// Every square on `file`.
    #[inline]
    pub const fn file(file: File) -> Self {
        Bitboard(Self::FILE_A.0 << file.index())
    }

    /// Every square on `rank`.
    #[inline]
    pub const fn rank(rank: Rank) -> Self {
        Bitboard(Self::RANK_1.0 << (8 * rank.index()))
    }

    /// The singleton set `{sq}`.
    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1 << sq.index())
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Number of squares in the set.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// True when the set holds at least two squares.
    #[inline]
    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.0 & Self::from_square(sq).0 != 0
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= Self::from_square(sq).0;
    }

    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !Self::from_square(sq).0;
    }

    /// The lowest square in the set.
    #[inline]
    pub const fn lsb(self) -> Option<Square> {
        match self.0 {
            0 => None,
            bits => Some(Square::from_bits(bits.trailing_zeros() as u8)),
        }
    }

    /// Removes and returns the lowest square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }
}

macro_rules! impl_bit_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $sym:tt) => {
        impl $op for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn $method(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $sym rhs.0)
            }
        }

        impl $assign for Bitboard {
            #[inline]
            fn $assign_method(&mut self, rhs: Bitboard) {
                *self = *self $sym rhs;
            }
        }
    };
}

impl_bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
impl_bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
impl_bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitboard(")?;
        f.debug_list().entries(*self).finish()?;
        write!(f, ")")
    }
}

/// Board diagram, rank 8 first, `X` for members.
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.iter().rev() {
            let row: Vec<&str> = File::ALL
                .iter()
                .map(|&file| match self.contains(Square::new(file, *rank)) {
                    true => "X",
                    false => ".",
                })
                .collect();
            writeln!(f, "{} {}", rank.index() + 1, row.join(" "))?;
        }
        write!(f, "  a b c d e f g h")
    }
}

/// Squares of a bitboard, lowest first.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline]
    fn into_iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Bitboard::EMPTY, |bb, sq| bb | Bitboard::from_square(sq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn membership() {
        let mut bb = Bitboard::from_square(Square::A1);
        assert_eq!(bb.0, 1);
        assert!(bb.contains(Square::A1));
        assert!(!bb.contains(Square::B1));

        bb.set(Square::H8);
        assert_eq!(bb.count(), 2);
        assert!(bb.more_than_one());

        bb.clear(Square::A1);
        assert_eq!(bb, Bitboard::from_square(Square::H8));
        assert!(!bb.more_than_one());
        assert!(!Bitboard::EMPTY.more_than_one());
    }

    #[test]
    fn file_and_rank_masks() {
        assert_eq!(Bitboard::file(File::A), Bitboard::FILE_A);
        assert_eq!(Bitboard::file(File::H), Bitboard::FILE_H);
        assert_eq!(Bitboard::rank(Rank::R1), Bitboard::RANK_1);
        assert_eq!(Bitboard::rank(Rank::R8), Bitboard::RANK_8);
        assert_eq!(Bitboard::FILE_H.0, 0x8080_8080_8080_8080);
        assert!(Bitboard::rank(Rank::R4).contains(sq("c4")));
        assert_eq!((Bitboard::file(File::D) & Bitboard::rank(Rank::R5)).lsb(), Some(sq("d5")));
    }

    #[test]
    fn operators() {
        let a: Bitboard = [sq("a1"), sq("b2")].into_iter().collect();
        let b: Bitboard = [sq("b2"), sq("c3")].into_iter().collect();
        assert_eq!((a & b).count(), 1);
        assert_eq!((a | b).count(), 3);
        assert_eq!(a ^ b, [sq("a1"), sq("c3")].into_iter().collect());
        assert_eq!((!Bitboard::EMPTY).count(), 64);

        let mut c = a;
        c ^= a;
        assert!(c.is_empty());
        c |= b;
        c &= a;
        assert_eq!(c, Bitboard::from_square(sq("b2")));
    }

    #[test]
    fn iterates_lowest_first() {
        let squares: Vec<Square> = Bitboard::FILE_A.into_iter().collect();
        assert_eq!(squares.len(), 8);
        assert_eq!(squares[0], Square::A1);
        assert_eq!(squares[7], sq("a8"));
        assert_eq!(Bitboard::RANK_8.into_iter().len(), 8);
    }

    #[test]
    fn pop_lsb_drains() {
        let mut bb = Bitboard(0b1010);
        assert_eq!(bb.pop_lsb().map(|s| s.index()), Some(1));
        assert_eq!(bb.pop_lsb().map(|s| s.index()), Some(3));
        assert_eq!(bb.pop_lsb(), None);
        assert!(bb.is_empty());
    }

    #[test]
    fn display_draws_board() {
        let text = Bitboard::from_square(sq("h8")).to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "8 . . . . . . . X");
        assert_eq!(text.lines().count(), 9);
    }
}
