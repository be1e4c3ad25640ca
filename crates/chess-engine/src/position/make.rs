//! Making and taking back moves.
//!
//! [`Position::make_move`]/[`Position::unmake_move`] trust their caller and
//! are what move generation runs on. [`Position::do_move`] and
//! [`Position::undo_move`] validate first and leave the position untouched
//! when they refuse.

use super::{Position, PositionInfo, MAX_PIECES};
use crate::movegen::generate_legal_ex;
use crate::zobrist::ZOBRIST;
use chess_core::{CastlingRights, CastlingSide, Move, MoveKind, Piece, PieceType, Square};
use std::ops::{Deref, DerefMut};

impl Position {
    /// Square of the pawn an en passant capture to `to` removes.
    fn en_passant_victim(&self, to: Square) -> Square {
        to.offset(-self.turn.pawn_push()).unwrap_or(to)
    }

    /// Applies `mv` without any validation and returns the state needed to
    /// take it back with [`Position::unmake_move`].
    pub(crate) fn make_move(&mut self, mv: Move) -> PositionInfo {
        let prev = self.info;
        let us = self.turn;
        let them = !us;
        let (from, to) = (mv.from(), mv.to());
        let moving = self.board[from.idx()].map(Piece::piece_type);
        debug_assert!(moving.is_some(), "no piece on {from} for {mv:?}");

        let mut key = self.info.key;
        if let Some(ep) = self.info.ep_square.take() {
            key ^= ZOBRIST.en_passant(ep);
        }

        let capture_sq = match mv.kind() {
            MoveKind::EnPassant => self.en_passant_victim(to),
            _ => to,
        };
        self.info.captured = None;
        if mv.kind() != MoveKind::Castling {
            if let Some(captured) = self.remove_piece(capture_sq) {
                debug_assert_eq!(captured.color(), them);
                key ^= ZOBRIST.piece(them, captured.piece_type(), capture_sq);
                self.info.captured = Some(captured.piece_type());
            }
        }

        let pawn_move = moving == Some(PieceType::Pawn);
        if pawn_move || self.info.captured.is_some() {
            self.info.rule50 = 0;
        } else {
            self.info.rule50 = self.info.rule50.saturating_add(1);
        }
        if pawn_move && from.index().abs_diff(to.index()) == 16 {
            let ep = Square::from_bits((from.index() + to.index()) / 2);
            self.info.ep_square = Some(ep);
            key ^= ZOBRIST.en_passant(ep);
        }

        let lost = CastlingRights::lost_on(from) | CastlingRights::lost_on(to);
        if self.info.castling.raw() & lost != 0 {
            key ^= ZOBRIST.castling(self.info.castling);
            self.info.castling.remove_mask(lost);
            key ^= ZOBRIST.castling(self.info.castling);
        }

        if let Some(promoted) = mv.promotion_piece() {
            self.remove_piece(from);
            self.put_piece(Piece::new(us, promoted), to);
            key ^= ZOBRIST.piece(us, PieceType::Pawn, from) ^ ZOBRIST.piece(us, promoted, to);
        } else {
            self.move_piece(from, to);
            if let Some(piece_type) = moving {
                key ^= ZOBRIST.piece(us, piece_type, from) ^ ZOBRIST.piece(us, piece_type, to);
            }
            if mv.kind() == MoveKind::Castling {
                let (rook_from, rook_to) = CastlingSide::from_king_target(to).rook_squares(us);
                self.move_piece(rook_from, rook_to);
                key ^= ZOBRIST.piece(us, PieceType::Rook, rook_from)
                    ^ ZOBRIST.piece(us, PieceType::Rook, rook_to);
            }
        }

        self.info.key = key ^ ZOBRIST.side();
        self.turn = them;
        self.game_ply = self.game_ply.saturating_add(1);
        prev
    }

    /// Takes back `mv`, which must be the last move made, restoring `prev`.
    pub(crate) fn unmake_move(&mut self, mv: Move, prev: PositionInfo) {
        self.turn = !self.turn;
        self.game_ply -= 1;
        let us = self.turn;
        let (from, to) = (mv.from(), mv.to());

        if mv.is_promotion() {
            self.remove_piece(to);
            self.put_piece(Piece::new(us, PieceType::Pawn), from);
        } else {
            self.move_piece(to, from);
            if mv.kind() == MoveKind::Castling {
                let (rook_from, rook_to) = CastlingSide::from_king_target(to).rook_squares(us);
                self.move_piece(rook_to, rook_from);
            }
        }

        if let Some(captured) = self.info.captured {
            let capture_sq = match mv.kind() {
                MoveKind::EnPassant => self.en_passant_victim(to),
                _ => to,
            };
            self.put_piece(Piece::new(!us, captured), capture_sq);
        }

        self.info = prev;
    }

    /// Plays `mv` if it is legal here.
    ///
    /// Returns the state to pass to [`Position::undo_move`], or `None` (with
    /// the position unchanged) if the move is not legal.
    pub fn do_move(&mut self, mv: Move) -> Option<PositionInfo> {
        if !generate_legal_ex(self).contains(mv) {
            return None;
        }
        Some(self.make_move(mv))
    }

    /// Takes back `mv` given the state [`Position::do_move`] returned for it.
    ///
    /// Returns false, with the position unchanged, if `mv` cannot have been
    /// the move that led here from a position described by `prev`.
    pub fn undo_move(&mut self, mv: Move, prev: PositionInfo) -> bool {
        if !self.undo_plausible(mv) {
            return false;
        }

        let backup = self.clone();
        self.unmake_move(mv, prev);

        let replayed = generate_legal_ex(self).contains(mv) && {
            let mut probe = self.clone();
            probe.make_move(mv);
            probe == backup
        };
        if !replayed {
            *self = backup;
        }
        replayed
    }

    /// Cheap structural checks that keep [`Position::unmake_move`] from
    /// touching squares it should not.
    fn undo_plausible(&self, mv: Move) -> bool {
        let mover = !self.turn;
        if self.game_ply == 0 || !mv.is_valid() || self.piece_on(mv.from()).is_some() {
            return false;
        }
        let Some(piece) = self.piece_on(mv.to()).filter(|p| p.color() == mover) else {
            return false;
        };
        if self.info.captured.is_some() && self.total_pieces(self.turn) >= MAX_PIECES {
            return false;
        }
        match mv.kind() {
            MoveKind::Normal => true,
            MoveKind::Promotion => Some(piece.piece_type()) == mv.promotion_piece(),
            MoveKind::Castling => {
                let (rook_from, rook_to) =
                    CastlingSide::from_king_target(mv.to()).rook_squares(mover);
                piece.piece_type() == PieceType::King
                    && self.piece_on(rook_to) == Some(Piece::new(mover, PieceType::Rook))
                    && self.piece_on(rook_from).is_none()
            }
            MoveKind::EnPassant => {
                let victim = mv.to().offset(-mover.pawn_push()).unwrap_or(mv.to());
                piece.piece_type() == PieceType::Pawn
                    && self.info.captured == Some(PieceType::Pawn)
                    && self.piece_on(victim).is_none()
            }
        }
    }
}

/// Keeps a move applied for as long as the guard lives.
///
/// Dropping the guard takes the move back, so a speculative look at the
/// resulting position cannot leave it changed, whatever path the caller
/// leaves by.
pub(crate) struct MoveGuard<'a> {
    position: &'a mut Position,
    mv: Move,
    prev: PositionInfo,
}

impl<'a> MoveGuard<'a> {
    pub(crate) fn new(position: &'a mut Position, mv: Move) -> Self {
        let prev = position.make_move(mv);
        MoveGuard { position, mv, prev }
    }
}

impl Deref for MoveGuard<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.position.unmake_move(self.mv, self.prev);
    }
}
