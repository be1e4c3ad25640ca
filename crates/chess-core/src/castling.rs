//! Castling rights.

use crate::{Color, File, Rank, Square};

/// Which wing a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    /// O-O, king to the g-file.
    King = 0,
    /// O-O-O, king to the c-file.
    Queen = 1,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::King, CastlingSide::Queen];

    /// File the king lands on.
    pub const fn king_target_file(self) -> File {
        match self {
            CastlingSide::King => File::G,
            CastlingSide::Queen => File::C,
        }
    }

    /// Rook's source and destination files.
    pub const fn rook_files(self) -> (File, File) {
        match self {
            CastlingSide::King => (File::H, File::F),
            CastlingSide::Queen => (File::A, File::D),
        }
    }

    /// Classifies a castling move by the king's destination square.
    pub const fn from_king_target(to: Square) -> Self {
        if to.file().index() > File::E.index() {
            CastlingSide::King
        } else {
            CastlingSide::Queen
        }
    }

    /// The king's destination square for `color`.
    pub const fn king_target(self, color: Color) -> Square {
        Square::new(self.king_target_file(), color.back_rank())
    }

    /// The rook's `(from, to)` squares for `color`.
    pub const fn rook_squares(self, color: Color) -> (Square, Square) {
        let (from, to) = self.rook_files();
        let rank = color.back_rank();
        (Square::new(from, rank), Square::new(to, rank))
    }

    /// SAN/AN text for the move.
    pub const fn notation(self) -> &'static str {
        match self {
            CastlingSide::King => "O-O",
            CastlingSide::Queen => "O-O-O",
        }
    }
}

/// Four castling-right bits: White O-O, White O-O-O, Black O-O, Black O-O-O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates castling rights from raw flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// The single bit for `color` castling to `side`.
    #[inline]
    pub const fn bit(color: Color, side: CastlingSide) -> u8 {
        1 << ((color as u8) * 2 + side as u8)
    }

    /// Both bits belonging to `color`.
    #[inline]
    pub const fn color_bits(color: Color) -> u8 {
        0b11 << ((color as u8) * 2)
    }

    /// Returns true if `color` may still castle to `side`.
    #[inline]
    pub const fn has(self, color: Color, side: CastlingSide) -> bool {
        self.0 & Self::bit(color, side) != 0
    }

    /// Grants the right for `color` and `side`.
    #[inline]
    pub fn insert(&mut self, color: Color, side: CastlingSide) {
        self.0 |= Self::bit(color, side);
    }

    /// Removes the right for `color` and `side`.
    #[inline]
    pub fn remove(&mut self, color: Color, side: CastlingSide) {
        self.0 &= !Self::bit(color, side);
    }

    /// Removes both rights of `color`.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0 &= !Self::color_bits(color);
    }

    /// Clears every bit set in `mask`.
    #[inline]
    pub fn remove_mask(&mut self, mask: u8) {
        self.0 &= !mask;
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns true when no right is left.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Rights a piece standing on or leaving `sq` invalidates: both rights
    /// for a king home square, one right for a rook home square.
    pub const fn lost_on(sq: Square) -> u8 {
        let rank = sq.rank();
        let color = match rank {
            Rank::R1 => Color::White,
            Rank::R8 => Color::Black,
            _ => return 0,
        };
        match sq.file() {
            File::E => Self::color_bits(color),
            File::H => Self::bit(color, CastlingSide::King),
            File::A => Self::bit(color, CastlingSide::Queen),
            _ => 0,
        }
    }

    /// Renders the FEN castling field ("KQkq", "-").
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        for (color, side, c) in Self::FEN_ORDER {
            if self.has(color, side) {
                s.push(c);
            }
        }
        s
    }

    /// Parses the FEN castling field.
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            let (color, side, _) = Self::FEN_ORDER.into_iter().find(|&(_, _, f)| f == c)?;
            rights.insert(color, side);
        }
        Some(rights)
    }

    const FEN_ORDER: [(Color, CastlingSide, char); 4] = [
        (Color::White, CastlingSide::King, 'K'),
        (Color::White, CastlingSide::Queen, 'Q'),
        (Color::Black, CastlingSide::King, 'k'),
        (Color::Black, CastlingSide::Queen, 'q'),
    ];
}
