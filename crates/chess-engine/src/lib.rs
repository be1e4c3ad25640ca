//! Bitboard chess rules engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets and the precomputed attack tables
//! - [`Position`] - board state with incremental make/unmake and Zobrist keys
//! - [`movegen`] - legal move generation by category, plus perft
//! - [`notation`] and [`san`] - AN, SAN and UCI move text
//! - [`Game`] - history with undo/redo, repetition, and result detection
//! - [`GameConfig`] - TOML-loadable game settings
//!
//! # Architecture
//!
//! Leaper attacks and the magic-indexed slider tables are built once per
//! process by [`initialize`] (or lazily on first use) and shared read-only
//! by every position.
//!
//! # Example
//!
//! ```
//! use chess_engine::{Game, GameState, Position};
//! use chess_engine::movegen::generate_legal;
//! use chess_core::MoveFormat;
//!
//! chess_engine::initialize();
//!
//! let mut position = Position::startpos();
//! println!("Legal moves from starting position: {}", generate_legal(&mut position).len());
//!
//! let mut game = Game::new();
//! game.do_move_str("e4", MoveFormat::San).unwrap();
//! game.do_move_str("e7e5", MoveFormat::Uci).unwrap();
//! assert_eq!(game.state(), GameState::Active);
//! println!("Position after 1.e4 e5: {}", game.fen(false));
//! ```

mod bitboard;
mod config;
mod game;
pub mod movegen;
pub mod notation;
mod position;
pub mod san;
mod zobrist;

pub use bitboard::Bitboard;
pub use config::{ConfigError, GameConfig};
pub use game::{DrawCause, Game, GameError, GameRecord, GameState};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    generate_legal, generate_legal_ex, generate_moves, has_legal_moves, is_legal, Legality,
    MoveCategory, MoveList,
};
pub use notation::{move_from_str, move_to_str, MoveParseError};
pub use position::{Position, PositionInfo};
pub use san::{move_to_san, san_to_move};
pub use zobrist::{ZobristKeys, ZOBRIST};

/// Builds the attack tables. Idempotent; call it once at start-up so the
/// first move generation does not pay for the magic search.
pub fn initialize() {
    movegen::attacks::tables();
    movegen::get_attack_tables();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("chess_engine=debug")
            .with_test_writer()
            .try_init();
        initialize();
        initialize();
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, 2), 400);
    }
}
