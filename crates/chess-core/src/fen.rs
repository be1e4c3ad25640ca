//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::{CastlingRights, Color, Piece, PieceType, Rank, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 fields, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("{color} must have exactly one king, found {count}")]
    InvalidKingCount { color: Color, count: usize },

    #[error("{color} has {count} pieces, at most 16 are allowed")]
    TooManyPieces { color: Color, count: usize },
}

/// The fields of a FEN record, decoded into board types.
///
/// The two move counters are optional on input; a four-field record gets
/// a halfmove clock of 0 and fullmove number 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Board contents indexed by [`Square::idx`].
    pub board: [Option<Piece>; 64],
    /// Side to move.
    pub side_to_move: Color,
    /// Castling availability.
    pub castling: CastlingRights,
    /// En passant target square.
    pub en_passant: Option<Square>,
    /// Halfmove clock for the 50-move rule.
    pub halfmove_clock: u32,
    /// Fullmove number, starting at 1.
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Most pieces one side may have on the board.
    pub const MAX_PIECES: usize = 16;

    /// Largest accepted fullmove number; keeps the ply count derived from
    /// it inside `u32`.
    pub const MAX_FULLMOVE: u32 = 1 << 30;

    /// Parses a full six-field FEN or a reduced four-field one.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 4 && parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let board = Self::parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = CastlingRights::from_fen(parts[2])
            .ok_or_else(|| FenError::InvalidCastlingRights(parts[2].to_string()))?;

        let en_passant = Self::parse_en_passant(parts[3])?;

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            let halfmove = parts[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
            let fullmove = parts[5]
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=Self::MAX_FULLMOVE).contains(n))
                .ok_or_else(|| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;
            (halfmove, fullmove)
        } else {
            (0, 1)
        };

        Ok(Fen {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(placement: &str) -> Result<[Option<Piece>; 64], FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = [None; 64];
        let mut kings = [0usize; 2];
        let mut totals = [0usize; 2];

        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if file >= 8 {
                        return Err(FenError::InvalidPiecePlacement(format!(
                            "rank {} has more than 8 squares",
                            rank + 1
                        )));
                    }
                    if piece.piece_type() == PieceType::King {
                        kings[piece.color().index()] += 1;
                    }
                    totals[piece.color().index()] += 1;
                    board[rank * 8 + file] = Some(piece);
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank + 1,
                    file
                )));
            }
        }

        for color in Color::ALL {
            let count = kings[color.index()];
            if count != 1 {
                return Err(FenError::InvalidKingCount { color, count });
            }
            let count = totals[color.index()];
            if count > Self::MAX_PIECES {
                return Err(FenError::TooManyPieces { color, count });
            }
        }

        Ok(board)
    }

    fn parse_en_passant(ep: &str) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }
        match Square::from_algebraic(ep) {
            Some(sq) if sq.rank() == Rank::R3 || sq.rank() == Rank::R6 => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
        }
    }

    /// Renders the piece placement field.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[rank * 8 + file] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// Renders the record, optionally leaving out both counters.
    pub fn to_fen(&self, omit_counters: bool) -> String {
        let ep = self
            .en_passant
            .map(Square::to_algebraic)
            .unwrap_or_else(|| "-".to_string());
        let mut fen = format!(
            "{} {} {} {}",
            self.placement(),
            self.side_to_move.to_fen_char(),
            self.castling.to_fen(),
            ep
        );
        if !omit_counters {
            fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        }
        fen
    }
}
