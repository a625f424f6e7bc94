//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth. The
//! counts are compared against published values, which exercises move
//! generation and the apply/unapply pair together.

use super::generate_moves;
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
///
/// The position is walked with `apply`/`unapply` and is unchanged on return.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        position.apply(m);
        nodes += perft(position, depth - 1);
        position.unapply(m);
    }
    nodes
}

/// Node count below each root move, sorted by UCI notation.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_moves(position);
    let mut results: Vec<(String, u64)> = moves
        .as_slice()
        .iter()
        .map(|&m| {
            position.apply(m);
            let nodes = perft(position, depth.saturating_sub(1));
            position.unapply(m);
            (m.to_uci(), nodes)
        })
        .collect();

    results.sort();
    results
}
