//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.
//! Every promotion piece is counted, so the totals match published tables.

use super::generate_legal_ex;
use crate::position::MoveGuard;
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
///
/// The position is walked with make/unmake and is unchanged on return.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal_ex(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        let mut child = MoveGuard::new(position, m);
        nodes += perft(&mut child, depth - 1);
    }
    nodes
}

/// Leaf counts below each root move, keyed by its UCI text and sorted.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_legal_ex(position);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        let mut child = MoveGuard::new(position, m);
        let nodes = perft(&mut child, depth.saturating_sub(1));
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
