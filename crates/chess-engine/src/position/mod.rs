//! Chess position representation.
//!
//! A [`Position`] keeps three views of the board in lockstep:
//! - the square-indexed `board` array
//! - per-(color, type) piece lists with a reverse index, so a piece can be
//!   removed in O(1) by swapping the last list entry into its slot
//! - occupancy bitboards by color and by piece type (slot 0 is all pieces)
//!
//! The reversible part of the state lives in [`PositionInfo`], which
//! [`Position::do_move`] hands back so the move can be taken back later.

mod make;

pub(crate) use make::MoveGuard;

use crate::movegen::attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use crate::zobrist::ZOBRIST;
use crate::Bitboard;
use chess_core::{
    CastlingRights, Color, Fen, FenError, File, Move, MoveKind, Piece, PieceType, Rank, Square,
};
use std::fmt;

const MAX_PIECES: usize = Fen::MAX_PIECES;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// The part of the position a move cannot be undone without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionInfo {
    pub(crate) captured: Option<PieceType>,
    pub(crate) rule50: u32,
    pub(crate) ep_square: Option<Square>,
    pub(crate) castling: CastlingRights,
    pub(crate) key: u64,
}

impl PositionInfo {
    /// Type of the piece captured by the move that led here.
    #[inline]
    pub fn captured(&self) -> Option<PieceType> {
        self.captured
    }

    /// Plies since the last capture or pawn move.
    #[inline]
    pub fn rule50(&self) -> u32 {
        self.rule50
    }

    /// En passant target square.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// Zobrist key.
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }
}

/// Complete chess position state.
#[derive(Clone)]
pub struct Position {
    board: [Option<Piece>; 64],
    piece_list: [[[Square; MAX_PIECES]; PieceType::TABLE_SIZE]; 2],
    /// `[color][0]` counts every piece of that color.
    piece_count: [[u8; PieceType::TABLE_SIZE]; 2],
    /// Slot of the piece on each square within its piece list.
    list_index: [u8; 64],
    by_color: [Bitboard; 2],
    /// `[0]` is the union of all occupied squares.
    by_type: [Bitboard; PieceType::TABLE_SIZE],
    info: PositionInfo,
    game_ply: u32,
    turn: Color,
}

impl Position {
    /// Creates a position with no pieces on it.
    ///
    /// Such a position has no kings and generates no moves; use
    /// [`Position::startpos`] or [`Position::from_fen`] for a playable one.
    pub fn empty() -> Self {
        Position {
            board: [None; 64],
            piece_list: [[[Square::A1; MAX_PIECES]; PieceType::TABLE_SIZE]; 2],
            piece_count: [[0; PieceType::TABLE_SIZE]; 2],
            list_index: [0; 64],
            by_color: [Bitboard::EMPTY; 2],
            by_type: [Bitboard::EMPTY; PieceType::TABLE_SIZE],
            info: PositionInfo::default(),
            game_ply: 0,
            turn: Color::White,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        let mut position = Self::empty();
        position.reset();
        position
    }

    /// Creates a position from a six-field or four-field FEN string.
    ///
    /// Beyond the syntax checks of [`Fen::parse`], the en passant square
    /// must sit behind an enemy pawn that could just have double-pushed,
    /// and the side that is not to move must not be in check.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = Fen::parse(fen)?;
        let mut position = Self::empty();

        for sq in Square::all() {
            if let Some(piece) = parsed.board[sq.idx()] {
                position.put_piece(piece, sq);
            }
        }
        position.turn = parsed.side_to_move;
        position.info.castling = parsed.castling;
        position.info.rule50 = parsed.halfmove_clock;
        position.game_ply = parsed.fullmove_number.saturating_sub(1) * 2
            + (parsed.side_to_move == Color::Black) as u32;

        if let Some(ep) = parsed.en_passant {
            if !position.en_passant_plausible(ep) {
                return Err(FenError::InvalidEnPassantSquare(ep.to_algebraic()));
            }
            position.info.ep_square = Some(ep);
        }

        let them = !position.turn;
        if position.is_attacked(position.king_square(them), position.turn) {
            return Err(FenError::InvalidPiecePlacement(format!(
                "{} is in check but not to move",
                them
            )));
        }

        position.info.key = position.compute_key();
        Ok(position)
    }

    fn en_passant_plausible(&self, ep: Square) -> bool {
        let us = self.turn;
        if us.relative_rank(ep.rank()) != Rank::R6 || self.piece_on(ep).is_some() {
            return false;
        }
        let pushed = ep.offset(-us.pawn_push());
        let origin = ep.offset(us.pawn_push());
        pushed.and_then(|sq| self.piece_on(sq)) == Some(Piece::new(!us, PieceType::Pawn))
            && origin.is_some_and(|sq| self.piece_on(sq).is_none())
    }

    /// Replaces the contents with the position described by `fen`.
    ///
    /// On error the position is left untouched.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), FenError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    /// Sets up the standard starting position.
    pub fn reset(&mut self) {
        self.clear();
        for color in Color::ALL {
            for (file, piece_type) in File::ALL.into_iter().zip(BACK_RANK) {
                self.put_piece(
                    Piece::new(color, piece_type),
                    Square::new(file, color.back_rank()),
                );
                self.put_piece(
                    Piece::new(color, PieceType::Pawn),
                    Square::new(file, color.relative_rank(Rank::R2)),
                );
            }
        }
        self.info.castling = CastlingRights::ALL;
        self.info.key = self.compute_key();
    }

    /// Removes every piece and resets the state to defaults.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Renders the position as FEN, optionally without the two counters.
    pub fn to_fen(&self, omit_counters: bool) -> String {
        Fen {
            board: self.board,
            side_to_move: self.turn,
            castling: self.info.castling,
            en_passant: self.info.ep_square,
            halfmove_clock: self.info.rule50,
            fullmove_number: self.fullmove_number(),
        }
        .to_fen(omit_counters)
    }

    /// Returns the piece on `sq`, if any.
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board[sq.idx()]
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Half-moves played since the start of the game.
    #[inline]
    pub fn game_ply(&self) -> u32 {
        self.game_ply
    }

    /// Fullmove number as written in FEN.
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.game_ply / 2 + 1
    }

    #[inline]
    pub fn info(&self) -> &PositionInfo {
        &self.info
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.info.key
    }

    #[inline]
    pub fn rule50(&self) -> u32 {
        self.info.rule50
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.info.ep_square
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.info.castling
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.by_type[0]
    }

    #[inline]
    pub fn pieces_by_color(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    #[inline]
    pub fn pieces_by_type(&self, piece_type: PieceType) -> Bitboard {
        self.by_type[piece_type.index()]
    }

    /// Returns a bitboard of pieces of the given type and color.
    #[inline]
    pub fn pieces(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.by_color[color.index()] & self.by_type[piece_type.index()]
    }

    #[inline]
    pub fn piece_count(&self, color: Color, piece_type: PieceType) -> usize {
        self.piece_count[color.index()][piece_type.index()] as usize
    }

    /// Number of pieces `color` has, king included.
    #[inline]
    pub fn total_pieces(&self, color: Color) -> usize {
        self.piece_count[color.index()][0] as usize
    }

    /// Squares of every `color` piece of the given type, in no particular order.
    #[inline]
    pub fn piece_list(&self, color: Color, piece_type: PieceType) -> &[Square] {
        let count = self.piece_count(color, piece_type);
        &self.piece_list[color.index()][piece_type.index()][..count]
    }

    /// Square of the `color` king. Only meaningful when that king exists.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.piece_list[color.index()][PieceType::King.index()][0]
    }

    pub(crate) fn has_king(&self, color: Color) -> bool {
        self.piece_count(color, PieceType::King) > 0
    }

    /// Returns true if `mv` removes an enemy piece.
    #[inline]
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.kind() == MoveKind::EnPassant || self.piece_on(mv.to()).is_some()
    }

    /// `by` pieces attacking `sq` with the given occupancy.
    pub(crate) fn attackers_to_with(&self, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
        let queens = self.pieces(by, PieceType::Queen);
        (pawn_attacks(!by, sq) & self.pieces(by, PieceType::Pawn))
            | (knight_attacks(sq) & self.pieces(by, PieceType::Knight))
            | (king_attacks(sq) & self.pieces(by, PieceType::King))
            | (bishop_attacks(sq, occupied) & (self.pieces(by, PieceType::Bishop) | queens))
            | (rook_attacks(sq, occupied) & (self.pieces(by, PieceType::Rook) | queens))
    }

    /// All `by` pieces attacking `sq`.
    pub fn attackers_to(&self, sq: Square, by: Color) -> Bitboard {
        self.attackers_to_with(sq, by, self.occupied())
    }

    /// Returns true if any `by` piece attacks `sq`.
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers_to(sq, by).is_not_empty()
    }

    /// The cheapest `by` piece attacking `sq`, ordered pawn, knight, bishop,
    /// rook, queen, king.
    pub fn least_attacker(&self, sq: Square, by: Color) -> Option<Square> {
        let attackers = self.attackers_to(sq, by);
        PieceType::ALL
            .into_iter()
            .find_map(|piece_type| (attackers & self.pieces_by_type(piece_type)).lsb())
    }

    /// Enemy pieces giving check to the side to move.
    pub fn checkers(&self) -> Bitboard {
        if !self.has_king(self.turn) {
            return Bitboard::EMPTY;
        }
        self.attackers_to(self.king_square(self.turn), !self.turn)
    }

    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.checkers().is_not_empty()
    }

    /// Recomputes the Zobrist key from scratch.
    pub fn compute_key(&self) -> u64 {
        let mut key = 0;
        for sq in Square::all() {
            if let Some(piece) = self.board[sq.idx()] {
                key ^= ZOBRIST.piece(piece.color(), piece.piece_type(), sq);
            }
        }
        if self.turn == Color::Black {
            key ^= ZOBRIST.side();
        }
        key ^= ZOBRIST.castling(self.info.castling);
        if let Some(ep) = self.info.ep_square {
            key ^= ZOBRIST.en_passant(ep);
        }
        key
    }

    /// Cross-checks the board array, piece lists, bitboards and key.
    pub fn is_consistent(&self) -> bool {
        let mut counts = [[0u8; PieceType::TABLE_SIZE]; 2];
        for sq in Square::all() {
            let bb = Bitboard::from_square(sq);
            match self.board[sq.idx()] {
                Some(piece) => {
                    let (c, pt) = (piece.color().index(), piece.piece_type().index());
                    let slot = self.list_index[sq.idx()] as usize;
                    if !self.by_color[c].contains(sq)
                        || !self.by_type[pt].contains(sq)
                        || !self.occupied().contains(sq)
                        || slot >= self.piece_count[c][pt] as usize
                        || self.piece_list[c][pt][slot] != sq
                    {
                        return false;
                    }
                    counts[c][pt] += 1;
                    counts[c][0] += 1;
                }
                None => {
                    if (self.occupied() & bb).is_not_empty() {
                        return false;
                    }
                }
            }
        }
        let typed = PieceType::ALL
            .into_iter()
            .fold(Bitboard::EMPTY, |acc, pt| acc | self.by_type[pt.index()]);
        counts == self.piece_count
            && typed == self.occupied()
            && (self.by_color[0] | self.by_color[1]) == self.occupied()
            && (self.by_color[0] & self.by_color[1]).is_empty()
            && self.info.key == self.compute_key()
    }

    fn put_piece(&mut self, piece: Piece, sq: Square) {
        debug_assert!(self.board[sq.idx()].is_none(), "{sq} is occupied");
        let (c, pt) = (piece.color().index(), piece.piece_type().index());
        let slot = self.piece_count[c][pt];
        self.piece_list[c][pt][slot as usize] = sq;
        self.list_index[sq.idx()] = slot;
        self.piece_count[c][pt] += 1;
        self.piece_count[c][0] += 1;
        self.board[sq.idx()] = Some(piece);

        let bb = Bitboard::from_square(sq);
        self.by_color[c] |= bb;
        self.by_type[pt] |= bb;
        self.by_type[0] |= bb;
    }

    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.board[sq.idx()].take()?;
        let (c, pt) = (piece.color().index(), piece.piece_type().index());
        let last = self.piece_count[c][pt] - 1;
        self.piece_count[c][pt] = last;
        self.piece_count[c][0] -= 1;

        let slot = self.list_index[sq.idx()];
        let moved = self.piece_list[c][pt][last as usize];
        self.piece_list[c][pt][slot as usize] = moved;
        self.list_index[moved.idx()] = slot;

        let bb = !Bitboard::from_square(sq);
        self.by_color[c] &= bb;
        self.by_type[pt] &= bb;
        self.by_type[0] &= bb;
        Some(piece)
    }

    /// Relocates the piece on `from` to the empty square `to`.
    fn move_piece(&mut self, from: Square, to: Square) {
        let Some(piece) = self.board[from.idx()].take() else {
            return;
        };
        debug_assert!(self.board[to.idx()].is_none(), "{to} is occupied");
        self.board[to.idx()] = Some(piece);

        let (c, pt) = (piece.color().index(), piece.piece_type().index());
        let slot = self.list_index[from.idx()];
        self.piece_list[c][pt][slot as usize] = to;
        self.list_index[to.idx()] = slot;

        let mask = Bitboard::from_square(from) | Bitboard::from_square(to);
        self.by_color[c] ^= mask;
        self.by_type[pt] ^= mask;
        self.by_type[0] ^= mask;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Positions compare by contents; the order inside piece lists is ignored.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.by_color == other.by_color
            && self.by_type == other.by_type
            && self.piece_count == other.piece_count
            && self.info == other.info
            && self.game_ply == other.game_ply
            && self.turn == other.turn
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for rank in Rank::ALL.into_iter().rev() {
            for file in File::ALL {
                let c = self
                    .piece_on(Square::new(file, rank))
                    .map_or('.', Piece::to_fen_char);
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", self.to_fen(false))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_fen_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(false), Fen::STARTPOS);
        assert_eq!(pos, Position::from_fen(Fen::STARTPOS).unwrap());
        assert!(pos.is_consistent());
    }

    #[test]
    fn custom_fen_roundtrip() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(false), fen);
        assert_eq!(pos.game_ply(), 4);
        assert_eq!(pos.rule50(), 2);
    }

    #[test]
    fn reduced_fen_output() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 7 40").unwrap();
        assert_eq!(pos.to_fen(true), "4k3/8/8/8/8/8/8/4K3 b - -");
        assert_eq!(pos.game_ply(), 79);
        assert_eq!(pos.fullmove_number(), 40);
    }

    #[test]
    fn piece_on() {
        let pos = Position::startpos();
        assert_eq!(
            pos.piece_on(Square::E1),
            Some(Piece::new(Color::White, PieceType::King))
        );
        assert_eq!(
            pos.piece_on(Square::D8),
            Some(Piece::new(Color::Black, PieceType::Queen))
        );
        assert_eq!(pos.piece_on(sq("e4")), None);
    }

    #[test]
    fn piece_counts_and_lists() {
        let pos = Position::startpos();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.total_pieces(Color::White), 16);
        assert_eq!(pos.piece_count(Color::Black, PieceType::Pawn), 8);
        assert_eq!(pos.pieces(Color::White, PieceType::Pawn).count(), 8);
        assert_eq!(pos.king_square(Color::White), Square::E1);
        assert_eq!(pos.king_square(Color::Black), Square::E8);

        let mut knights = pos.piece_list(Color::White, PieceType::Knight).to_vec();
        knights.sort();
        assert_eq!(knights, vec![Square::B1, Square::G1]);
    }

    #[test]
    fn empty_position() {
        let pos = Position::empty();
        assert!(pos.occupied().is_empty());
        assert_eq!(pos.turn(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::NONE);
        assert!(!pos.is_in_check());
        assert!(pos.is_consistent());
    }

    #[test]
    fn clear_and_reset() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 7 40").unwrap();
        pos.clear();
        assert_eq!(pos, Position::empty());
        pos.reset();
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn load_fen_leaves_position_on_error() {
        let mut pos = Position::startpos();
        assert!(pos.load_fen("not a fen").is_err());
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn oversized_fullmove_number_is_rejected() {
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 3000000000"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1073741824").unwrap();
        assert_eq!(pos.game_ply(), 2 * 1_073_741_823);
        assert_eq!(pos.to_fen(false), "4k3/8/8/8/8/8/8/4K3 w - - 0 1073741824");
    }

    #[test]
    fn en_passant_must_follow_a_double_push() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        assert_eq!(pos.to_fen(false), fen);

        assert!(matches!(
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq e3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(matches!(
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
    }

    #[test]
    fn side_not_to_move_in_check_is_rejected() {
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4KQ1k w - - 0 1"),
            Err(FenError::InvalidKingCount { .. })
        ));
        assert!(matches!(
            Position::from_fen("4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn attack_queries() {
        let pos = Position::startpos();
        assert!(pos.is_attacked(sq("e3"), Color::White));
        assert!(!pos.is_attacked(sq("e4"), Color::White));
        assert_eq!(pos.attackers_to(sq("f3"), Color::White).count(), 3);
        assert_eq!(pos.least_attacker(sq("f3"), Color::White), Some(sq("e2")));
        assert_eq!(pos.least_attacker(sq("h3"), Color::White), Some(sq("g2")));
        assert_eq!(pos.least_attacker(sq("e5"), Color::White), None);
        assert!(!pos.is_in_check());
    }

    #[test]
    fn least_attacker_prefers_cheaper_pieces() {
        let pos = Position::from_fen("4k3/8/8/3p4/8/2N5/8/3QK3 w - - 0 1").unwrap();
        assert_eq!(pos.least_attacker(sq("d5"), Color::White), Some(sq("c3")));
        assert_eq!(pos.least_attacker(sq("d4"), Color::White), Some(sq("d1")));
    }

    #[test]
    fn checkers_in_single_and_double_check() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        assert!(pos.is_in_check());
        assert_eq!(pos.checkers(), Bitboard::from_square(sq("e2")));

        let pos = Position::from_fen("4k3/8/8/8/1b6/8/8/4K2r w - - 0 1").unwrap();
        assert_eq!(pos.checkers().count(), 2);
    }

    #[test]
    fn equality_ignores_piece_list_order() {
        let mut a = Position::startpos();
        let b = Position::startpos();
        let knight = a.remove_piece(Square::B1).unwrap();
        a.put_piece(knight, Square::B1);
        assert_eq!(a, b);
        assert!(a.is_consistent());
    }

    #[test]
    fn display_is_fen() {
        let pos = Position::default();
        assert_eq!(pos.to_string(), Fen::STARTPOS);
        assert!(format!("{:?}", pos).contains("r n b q k b n r"));
    }
}
