//! Move generation.
//!
//! Moves are generated pseudo-legally by [`MoveCategory`] and then filtered
//! according to [`Legality`]. Sliding attacks come from magic bitboards.
//!
//! Promotions are generated to queen and knight only, which is enough for
//! play. [`MoveList::expand_promotions`] adds the rook and bishop
//! promotions; [`generate_legal_ex`] returns that complete set and is what
//! notation, move validation and perft use.

pub(crate) mod attacks;
mod magics;
pub mod perft;

use crate::position::MoveGuard;
use crate::{Bitboard, Position};
use chess_core::{CastlingSide, Color, File, Move, MoveKind, Piece, PieceType, Rank, Square};

pub use attacks::{
    between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, pawn_pushes,
    queen_attacks, rook_attacks,
};
pub use magics::get_attack_tables;

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Upper bound on the moves a list holds.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NONE; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }

    /// Appends a rook and a bishop promotion for every queen promotion.
    pub fn expand_promotions(&mut self) {
        for i in 0..self.len {
            let m = self.moves[i];
            if m.promotion_piece() == Some(PieceType::Queen) {
                self.push(Move::promotion(m.from(), m.to(), PieceType::Rook));
                self.push(Move::promotion(m.from(), m.to(), PieceType::Bishop));
            }
        }
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Which moves to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveCategory {
    /// Moves that remove an enemy piece, en passant included.
    Captures,
    /// Everything else, castling included.
    NonCaptures,
    /// Replies to check. Empty when the side to move is not in check.
    Evasions,
    All,
}

/// How far generated moves are checked against leaving the king attacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Legality {
    /// No check at all.
    Pseudo,
    /// Every pseudo-legal move of the category is tried on the board.
    Verified,
    /// Evasions are generated when in check; only king moves, en passant
    /// and moves of pinned pieces are then tried on the board.
    Legal,
}

/// Generates moves of `category` filtered by `legality`.
///
/// The position is borrowed mutably for speculative make/unmake; it is
/// unchanged when the call returns.
pub fn generate_moves(
    position: &mut Position,
    category: MoveCategory,
    legality: Legality,
) -> MoveList {
    let mut moves = MoveList::new();
    match legality {
        Legality::Pseudo => generate_pseudo_legal(position, category, &mut moves),
        Legality::Verified => {
            generate_pseudo_legal(position, category, &mut moves);
            moves.retain(|&m| leaves_king_safe(position, m));
        }
        Legality::Legal => {
            let checkers = position.checkers();
            if checkers.is_empty() {
                generate_pseudo_legal(position, category, &mut moves);
            } else {
                generate_pseudo_legal(position, MoveCategory::Evasions, &mut moves);
                match category {
                    MoveCategory::Captures => moves.retain(|&m| position.is_capture(m)),
                    MoveCategory::NonCaptures => moves.retain(|&m| !position.is_capture(m)),
                    MoveCategory::Evasions | MoveCategory::All => {}
                }
            }
            let us = position.turn();
            let king = position.king_square(us);
            let pinned = pinned_pieces(position, us);
            moves.retain(|&m| {
                let risky = m.from() == king
                    || pinned.contains(m.from())
                    || m.kind() == MoveKind::EnPassant;
                !risky || leaves_king_safe(position, m)
            });
        }
    }
    moves
}

/// Generates all legal moves, promoting to queen and knight only.
pub fn generate_legal(position: &mut Position) -> MoveList {
    generate_moves(position, MoveCategory::All, Legality::Legal)
}

/// Generates all legal moves including rook and bishop promotions.
pub fn generate_legal_ex(position: &mut Position) -> MoveList {
    let mut moves = generate_legal(position);
    moves.expand_promotions();
    moves
}

/// Returns true if the side to move has any legal move.
pub fn has_legal_moves(position: &mut Position) -> bool {
    !generate_legal(position).is_empty()
}

/// Returns true if `m` is legal in `position`.
pub fn is_legal(position: &mut Position, m: Move) -> bool {
    generate_legal_ex(position).contains(m)
}

/// Tries `m` on the board and reports whether the mover's king is safe.
fn leaves_king_safe(position: &mut Position, m: Move) -> bool {
    let us = position.turn();
    let after = MoveGuard::new(position, m);
    !after.is_attacked(after.king_square(us), !us)
}

/// Pieces of `us` standing alone between their king and an enemy slider.
fn pinned_pieces(position: &Position, us: Color) -> Bitboard {
    let them = !us;
    let king = position.king_square(us);
    let queens = position.pieces(them, PieceType::Queen);
    let snipers = (rook_attacks(king, Bitboard::EMPTY)
        & (position.pieces(them, PieceType::Rook) | queens))
        | (bishop_attacks(king, Bitboard::EMPTY)
            & (position.pieces(them, PieceType::Bishop) | queens));

    let mut pinned = Bitboard::EMPTY;
    for sniper in snipers {
        let blockers = between(sniper, king) & position.occupied();
        if blockers.count() == 1 {
            pinned |= blockers & position.pieces_by_color(us);
        }
    }
    pinned
}

/// Generates pseudo-legal moves of `category` into `moves`.
pub fn generate_pseudo_legal(position: &Position, category: MoveCategory, moves: &mut MoveList) {
    let us = position.turn();
    if !position.has_king(us) {
        return;
    }
    if category == MoveCategory::Evasions {
        generate_evasions(position, moves);
        return;
    }

    let ours = position.pieces_by_color(us);
    let theirs = position.pieces_by_color(!us);
    let empty = !position.occupied();
    let targets = match category {
        MoveCategory::Captures => theirs,
        MoveCategory::NonCaptures => empty,
        _ => !ours,
    };

    generate_pawn_moves(
        position,
        targets & theirs,
        targets & empty,
        category != MoveCategory::NonCaptures,
        moves,
    );
    generate_piece_moves(position, targets, moves);

    let king = position.king_square(us);
    for to in king_attacks(king) & targets {
        moves.push(Move::new(king, to));
    }
    if category != MoveCategory::Captures {
        generate_castling(position, moves);
    }
}

fn push_pawn_move(us: Color, from: Square, to: Square, moves: &mut MoveList) {
    if us.relative_rank(to.rank()) == Rank::R8 {
        moves.push(Move::promotion(from, to, PieceType::Queen));
        moves.push(Move::promotion(from, to, PieceType::Knight));
    } else {
        moves.push(Move::new(from, to));
    }
}

/// Pawn captures onto `captures`, pushes onto `pushes`, and the en passant
/// capture when `en_passant` allows it.
fn generate_pawn_moves(
    position: &Position,
    captures: Bitboard,
    pushes: Bitboard,
    en_passant: bool,
    moves: &mut MoveList,
) {
    let us = position.turn();
    let occupied = position.occupied();
    let ep = position.en_passant().filter(|_| en_passant);

    for &from in position.piece_list(us, PieceType::Pawn) {
        let attacks = pawn_attacks(us, from);
        for to in attacks & captures {
            push_pawn_move(us, from, to, moves);
        }
        for to in pawn_pushes(us, from) & pushes {
            if (between(from, to) & occupied).is_empty() {
                push_pawn_move(us, from, to, moves);
            }
        }
        if let Some(ep) = ep.filter(|&ep| attacks.contains(ep)) {
            moves.push(Move::en_passant(from, ep));
        }
    }
}

fn generate_piece_moves(position: &Position, targets: Bitboard, moves: &mut MoveList) {
    let us = position.turn();
    let occupied = position.occupied();
    for piece_type in [
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
    ] {
        for &from in position.piece_list(us, piece_type) {
            let attacks = match piece_type {
                PieceType::Knight => knight_attacks(from),
                PieceType::Bishop => bishop_attacks(from, occupied),
                PieceType::Rook => rook_attacks(from, occupied),
                _ => queen_attacks(from, occupied),
            };
            for to in attacks & targets {
                moves.push(Move::new(from, to));
            }
        }
    }
}

fn generate_castling(position: &Position, moves: &mut MoveList) {
    let us = position.turn();
    let them = !us;
    let king = position.king_square(us);
    if king != Square::new(File::E, us.back_rank()) || position.is_in_check() {
        return;
    }

    for side in CastlingSide::ALL {
        if !position.castling_rights().has(us, side) {
            continue;
        }
        let (rook_from, _) = side.rook_squares(us);
        if position.piece_on(rook_from) != Some(Piece::new(us, PieceType::Rook))
            || (between(king, rook_from) & position.occupied()).is_not_empty()
        {
            continue;
        }
        let target = side.king_target(us);
        let path = between(king, target) | Bitboard::from_square(target);
        if path.into_iter().any(|sq| position.is_attacked(sq, them)) {
            continue;
        }
        moves.push(Move::castling(king, target));
    }
}

/// King steps to unattacked squares; with a single checker, also captures
/// of the checker and interpositions.
fn generate_evasions(position: &Position, moves: &mut MoveList) {
    let us = position.turn();
    let them = !us;
    let king = position.king_square(us);
    let checkers = position.checkers();
    if checkers.is_empty() {
        return;
    }

    let without_king = position.occupied() ^ Bitboard::from_square(king);
    for to in king_attacks(king) & !position.pieces_by_color(us) {
        if position
            .attackers_to_with(to, them, without_king)
            .is_empty()
        {
            moves.push(Move::new(king, to));
        }
    }

    if checkers.more_than_one() {
        return;
    }
    let Some(checker) = checkers.lsb() else {
        return;
    };

    let targets = between(checker, king) | checkers;
    let ep_resolves = position.en_passant().is_some_and(|ep| {
        targets.contains(ep) || ep.offset(-us.pawn_push()) == Some(checker)
    });
    generate_pawn_moves(
        position,
        targets & position.pieces_by_color(them),
        targets & !position.occupied(),
        ep_resolves,
        moves,
    );
    generate_piece_moves(position, targets, moves);
}
