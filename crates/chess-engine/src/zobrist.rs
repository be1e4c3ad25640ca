//! Zobrist hashing for position identification.
//!
//! A position key is the XOR of independent random keys for:
//! - each (color, piece type, square) triple
//! - black to move
//! - each single castling-right bit (4 values)
//! - the en passant file (8 values)

use chess_core::{CastlingRights, Color, PieceType, Square};

/// Zobrist hash keys.
///
/// Generated at compile time from a fixed seed, so keys are identical
/// across runs.
pub struct ZobristKeys {
    /// Keys for pieces: `[color][piece type index][square]`; slot 0 is unused.
    pieces: [[[u64; 64]; PieceType::TABLE_SIZE]; 2],
    /// Key XORed in while Black is to move.
    black_to_move: u64,
    /// One key per castling-right bit.
    castling: [u64; 4],
    /// Keys for the en passant file.
    en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Builds the keys with a xorshift64 generator.
    pub const fn new() -> Self {
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut pieces = [[[0u64; 64]; PieceType::TABLE_SIZE]; 2];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut color = 0;
        while color < 2 {
            let mut piece = 1;
            while piece < PieceType::TABLE_SIZE {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[color][piece][square] = state;
                    square += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 4 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    /// Returns the key for a piece on a square.
    #[inline]
    pub const fn piece(&self, color: Color, piece: PieceType, square: Square) -> u64 {
        self.pieces[color.index()][piece.index()][square.idx()]
    }

    /// Returns the side-to-move key.
    #[inline]
    pub const fn side(&self) -> u64 {
        self.black_to_move
    }

    /// Returns the combined key of every right set in `rights`.
    #[inline]
    pub const fn castling(&self, rights: CastlingRights) -> u64 {
        let mut key = 0;
        let mut bit = 0;
        while bit < 4 {
            if rights.raw() & (1 << bit) != 0 {
                key ^= self.castling[bit];
            }
            bit += 1;
        }
        key
    }

    /// Returns the key for an en passant target square (by its file).
    #[inline]
    pub const fn en_passant(&self, square: Square) -> u64 {
        self.en_passant[square.file().index() as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Global Zobrist keys (initialized at compile time).
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();
