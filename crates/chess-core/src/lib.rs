//! Core types for chess.
//!
//! This crate provides the value types shared by the rules engine:
//! - [`Color`], [`PieceType`] and the packed [`Piece`]
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] (16-bit packed), [`MoveKind`] and [`MoveFormat`]
//! - [`CastlingRights`] and [`CastlingSide`]
//! - FEN field parsing and serialization via [`Fen`]

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::{CastlingRights, CastlingSide};
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveFormat, MoveKind};
pub use piece::{Piece, PieceType};
pub use square::{File, Rank, Square};
