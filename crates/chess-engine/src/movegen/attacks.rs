//! Precomputed per-square masks and leaper attack tables.
//!
//! Built once on first use (or by [`crate::initialize`]) and read-only after.

use crate::Bitboard;
use chess_core::{Color, Rank, Square};
use std::sync::OnceLock;

pub use super::magics::{bishop_attacks, queen_attacks, rook_attacks};

const KNIGHT_DELTAS: [i8; 8] = [17, 15, 10, 6, -6, -10, -15, -17];
const KING_DELTAS: [i8; 8] = [9, 8, 7, 1, -1, -7, -8, -9];

/// The eight ray directions as (file step, rank step).
pub(crate) const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Non-sliding lookup tables.
pub struct BitboardTables {
    diagonals: [Bitboard; 15],
    anti_diagonals: [Bitboard; 15],
    pawn_pushes: [[Bitboard; 64]; 2],
    pawn_attacks: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    between: Box<[[Bitboard; 64]; 64]>,
}

static TABLES: OnceLock<BitboardTables> = OnceLock::new();

/// Gets the global tables, building them if necessary.
pub fn tables() -> &'static BitboardTables {
    TABLES.get_or_init(BitboardTables::new)
}

fn manhattan(a: Square, b: Square) -> u8 {
    a.file().index().abs_diff(b.file().index()) + a.rank().index().abs_diff(b.rank().index())
}

/// Targets of `deltas` from `sq`, dropping any that wrapped around an edge.
fn leaper(sq: Square, deltas: &[i8], max_manhattan: u8) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for &delta in deltas {
        if let Some(to) = sq.offset(delta) {
            if manhattan(sq, to) <= max_manhattan {
                bb.set(to);
            }
        }
    }
    bb
}

impl BitboardTables {
    fn new() -> Self {
        let mut diagonals = [Bitboard::EMPTY; 15];
        let mut anti_diagonals = [Bitboard::EMPTY; 15];
        for sq in Square::all() {
            diagonals[diagonal_index(sq)].set(sq);
            anti_diagonals[anti_diagonal_index(sq)].set(sq);
        }

        let mut pawn_pushes = [[Bitboard::EMPTY; 64]; 2];
        let mut pawn_attacks = [[Bitboard::EMPTY; 64]; 2];
        let mut knight = [Bitboard::EMPTY; 64];
        let mut king = [Bitboard::EMPTY; 64];

        for sq in Square::all() {
            knight[sq.idx()] = leaper(sq, &KNIGHT_DELTAS, 3);
            king[sq.idx()] = leaper(sq, &KING_DELTAS, 2);

            for color in Color::ALL {
                let relative = color.relative_rank(sq.rank());
                if relative == Rank::R8 {
                    continue;
                }
                let push = color.pawn_push();
                pawn_attacks[color.index()][sq.idx()] = leaper(sq, &[push - 1, push + 1], 2);

                let mut pushes = leaper(sq, &[push], 1);
                if relative == Rank::R2 {
                    pushes |= leaper(sq, &[2 * push], 2);
                }
                pawn_pushes[color.index()][sq.idx()] = pushes;
            }
        }

        let mut between = Box::new([[Bitboard::EMPTY; 64]; 64]);
        for from in Square::all() {
            for (df, dr) in DIRECTIONS {
                let mut passed = Bitboard::EMPTY;
                let mut file = from.file().index() as i8 + df;
                let mut rank = from.rank().index() as i8 + dr;
                while (0..8).contains(&file) && (0..8).contains(&rank) {
                    let to = Square::from_bits((rank * 8 + file) as u8);
                    between[from.idx()][to.idx()] = passed;
                    passed.set(to);
                    file += df;
                    rank += dr;
                }
            }
        }

        BitboardTables {
            diagonals,
            anti_diagonals,
            pawn_pushes,
            pawn_attacks,
            knight,
            king,
            between,
        }
    }
}

#[inline]
fn diagonal_index(sq: Square) -> usize {
    (sq.rank().index() + 7 - sq.file().index()) as usize
}

#[inline]
fn anti_diagonal_index(sq: Square) -> usize {
    (sq.rank().index() + sq.file().index()) as usize
}

/// The a1-h8 direction diagonal through `sq`.
#[inline]
pub fn diagonal(sq: Square) -> Bitboard {
    tables().diagonals[diagonal_index(sq)]
}

/// The h1-a8 direction diagonal through `sq`.
#[inline]
pub fn anti_diagonal(sq: Square) -> Bitboard {
    tables().anti_diagonals[anti_diagonal_index(sq)]
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    tables().knight[sq.idx()]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    tables().king[sq.idx()]
}

/// Returns the squares a `color` pawn on `sq` attacks.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    tables().pawn_attacks[color.index()][sq.idx()]
}

/// Returns the squares a `color` pawn on `sq` may advance to on an empty
/// board (two of them from its starting rank).
#[inline]
pub fn pawn_pushes(color: Color, sq: Square) -> Bitboard {
    tables().pawn_pushes[color.index()][sq.idx()]
}

/// Squares strictly between `a` and `b` when they share a rank, file, or
/// diagonal; empty otherwise.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    tables().between[a.idx()][b.idx()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::File;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn squares(list: &[&str]) -> Bitboard {
        list.iter().fold(Bitboard::EMPTY, |bb, s| bb | Bitboard::from_square(sq(s)))
    }

    #[test]
    fn knight_attacks_center() {
        assert_eq!(knight_attacks(sq("d4")).count(), 8);
    }

    #[test]
    fn knight_attacks_corner() {
        assert_eq!(knight_attacks(Square::A1), squares(&["b3", "c2"]));
        assert_eq!(knight_attacks(Square::H8), squares(&["g6", "f7"]));
    }

    #[test]
    fn king_attacks_edges() {
        assert_eq!(king_attacks(sq("d4")).count(), 8);
        assert_eq!(king_attacks(Square::A1), squares(&["a2", "b1", "b2"]));
        assert_eq!(king_attacks(Square::H1), squares(&["g1", "g2", "h2"]));
    }

    #[test]
    fn pawn_attack_tables() {
        assert_eq!(pawn_attacks(Color::White, sq("e4")), squares(&["d5", "f5"]));
        assert_eq!(pawn_attacks(Color::Black, sq("e4")), squares(&["d3", "f3"]));
        assert_eq!(pawn_attacks(Color::White, sq("a2")), squares(&["b3"]));
        assert_eq!(pawn_attacks(Color::Black, sq("h7")), squares(&["g6"]));
        assert!(pawn_attacks(Color::White, sq("e8")).is_empty());
    }

    #[test]
    fn pawn_push_tables() {
        assert_eq!(pawn_pushes(Color::White, sq("e2")), squares(&["e3", "e4"]));
        assert_eq!(pawn_pushes(Color::White, sq("e3")), squares(&["e4"]));
        assert_eq!(pawn_pushes(Color::Black, sq("d7")), squares(&["d6", "d5"]));
        assert_eq!(pawn_pushes(Color::Black, sq("d2")), squares(&["d1"]));
    }

    #[test]
    fn diagonal_masks() {
        assert_eq!(diagonal(Square::A1).count(), 8);
        assert!(diagonal(sq("c3")).contains(Square::H8));
        assert_eq!(anti_diagonal(Square::H1).count(), 8);
        assert!(anti_diagonal(sq("d4")).contains(sq("g1")));
        assert_eq!(anti_diagonal(Square::A1), Bitboard::from_square(Square::A1));
    }

    #[test]
    fn between_masks() {
        assert_eq!(between(Square::A1, Square::H8).count(), 6);
        assert_eq!(between(Square::E1, Square::H1), squares(&["f1", "g1"]));
        assert_eq!(between(Square::H1, Square::E1), squares(&["f1", "g1"]));
        assert_eq!(between(sq("b2"), sq("c3")), Bitboard::EMPTY);
        assert_eq!(between(Square::A1, sq("b3")), Bitboard::EMPTY);
        assert_eq!(
            between(Square::new(File::E, Rank::R8), Square::E1).count(),
            6
        );
    }
}
