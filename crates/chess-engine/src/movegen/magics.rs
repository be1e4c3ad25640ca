//! Magic bitboard tables for sliding piece attack generation.
//!
//! For every square the relevant-occupancy mask is multiplied by a magic
//! number and shifted to index a dense attack table. The magic numbers are
//! found at start-up by a seeded random search, so no constants are baked in.

use super::attacks::{anti_diagonal, diagonal};
use crate::Bitboard;
use chess_core::Square;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::OnceLock;

/// Base seed for the per-square magic search.
const MAGIC_SEED: u64 = 0x2545_F491_4F6C_DD1D;

/// Magic entry for a single square.
#[derive(Clone, Copy, Default)]
pub struct Magic {
    /// Mask of relevant blocker squares (excludes edges).
    pub mask: Bitboard,
    /// The magic number for this square.
    pub magic: u64,
    /// Right shift amount (64 - number of bits in mask).
    pub shift: u8,
    /// Offset into the shared attack table.
    pub offset: usize,
}

impl Magic {
    /// Computes the attack table index for a given occupancy.
    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        let relevant = occupied & self.mask;
        self.offset + (relevant.0.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Stores all sliding-piece attack tables.
pub struct AttackTables {
    /// Rook and bishop attacks share one table.
    attacks: Vec<Bitboard>,
    /// Magic entries for bishops.
    bishop_magics: [Magic; 64],
    /// Magic entries for rooks.
    rook_magics: [Magic; 64],
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Gets the global attack tables, initializing if necessary.
pub fn get_attack_tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(AttackTables::new)
}

#[derive(Clone, Copy)]
enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    const fn directions(self) -> [(i8, i8); 4] {
        match self {
            Slider::Bishop => [(1, 1), (1, -1), (-1, 1), (-1, -1)],
            Slider::Rook => [(1, 0), (-1, 0), (0, 1), (0, -1)],
        }
    }

    /// Relevant occupancy: the piece's lines minus its own square and minus
    /// edge squares, which can never block anything beyond them.
    fn mask(self, sq: Square) -> Bitboard {
        let lines = match self {
            Slider::Bishop => diagonal(sq) | anti_diagonal(sq),
            Slider::Rook => Bitboard::rank(sq.rank()) | Bitboard::file(sq.file()),
        };
        let edges = ((Bitboard::RANK_1 | Bitboard::RANK_8) & !Bitboard::rank(sq.rank()))
            | ((Bitboard::FILE_A | Bitboard::FILE_H) & !Bitboard::file(sq.file()));
        lines & !edges & !Bitboard::from_square(sq)
    }

    /// Ray-cast attacks, stopping at the first blocker in each direction.
    fn attacks_slow(self, sq: Square, blockers: Bitboard) -> Bitboard {
        let mut attacks = Bitboard::EMPTY;
        let rank = sq.rank().index() as i8;
        let file = sq.file().index() as i8;

        for (dr, df) in self.directions() {
            let mut r = rank + dr;
            let mut f = file + df;
            while (0..8).contains(&r) && (0..8).contains(&f) {
                let target = Square::from_bits((r * 8 + f) as u8);
                attacks.set(target);
                if blockers.contains(target) {
                    break;
                }
                r += dr;
                f += df;
            }
        }

        attacks
    }
}

impl AttackTables {
    /// Creates and initializes all attack tables.
    pub fn new() -> Self {
        let mut attacks = Vec::new();
        let mut attempts = 0u64;
        let mut bishop_magics = [Magic::default(); 64];
        let mut rook_magics = [Magic::default(); 64];

        for sq in Square::all() {
            bishop_magics[sq.idx()] = find_magic(Slider::Bishop, sq, &mut attacks, &mut attempts);
        }
        for sq in Square::all() {
            rook_magics[sq.idx()] = find_magic(Slider::Rook, sq, &mut attacks, &mut attempts);
        }

        tracing::debug!(
            entries = attacks.len(),
            attempts,
            "sliding attack tables initialized"
        );

        AttackTables {
            attacks,
            bishop_magics,
            rook_magics,
        }
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Searches a collision-free magic for `sq` and appends its attack slice to
/// `table`. Two occupancies may share a slot only if their attacks agree.
fn find_magic(slider: Slider, sq: Square, table: &mut Vec<Bitboard>, attempts: &mut u64) -> Magic {
    let mask = slider.mask(sq);
    let bits = mask.count();
    let size = 1usize << bits;

    // Carry-rippler: walk every subset of the mask, starting from the full mask.
    let mut occupancies = Vec::with_capacity(size);
    let mut reference = Vec::with_capacity(size);
    let mut subset = mask;
    loop {
        occupancies.push(subset);
        reference.push(slider.attacks_slow(sq, subset));
        subset = Bitboard(subset.0.wrapping_sub(1) & mask.0);
        if subset == mask {
            break;
        }
    }

    let offset = table.len();
    table.resize(offset + size, Bitboard::EMPTY);

    let mut rng = StdRng::seed_from_u64(MAGIC_SEED ^ ((sq.index() as u64) << 1 | slider as u64));
    // Tags which table slots the current candidate has written.
    let mut epoch = vec![0u32; size];
    let mut current = 0u32;

    loop {
        let magic = rng.next_u64() & rng.next_u64() & rng.next_u64();
        *attempts += 1;
        if (mask.0.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        let entry = Magic {
            mask,
            magic,
            shift: (64 - bits) as u8,
            offset,
        };
        current += 1;

        let fits = occupancies.iter().zip(&reference).all(|(&occupied, &attacks)| {
            let index = entry.index(occupied);
            let slot = index - offset;
            if epoch[slot] < current {
                epoch[slot] = current;
                table[index] = attacks;
                true
            } else {
                table[index] == attacks
            }
        });

        if fits {
            return entry;
        }
    }
}

/// Returns bishop attacks for a square given occupied squares.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = get_attack_tables();
    tables.attacks[tables.bishop_magics[sq.idx()].index(occupied)]
}

/// Returns rook attacks for a square given occupied squares.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = get_attack_tables();
    tables.attacks[tables.rook_magics[sq.idx()].index(occupied)]
}

/// Returns queen attacks (bishop + rook).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}
