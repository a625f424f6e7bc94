//! Attack tables for leaping pieces and ray attacks for sliders.
//!
//! Sliding attacks walk precomputed rays and cut them at the first blocker.
//! Rays pointing towards higher square indices find that blocker with a
//! forward scan, rays pointing towards lower indices with a reverse scan.

use crate::Bitboard;
use chess_core::{Color, Square};

/// Rank and file deltas of the eight ray directions.
///
/// The first four point towards higher square indices.
const DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),   // north
    (1, 1),   // north-east
    (0, 1),   // east
    (1, -1),  // north-west
    (-1, 0),  // south
    (-1, -1), // south-west
    (0, -1),  // west
    (-1, 1),  // south-east
];

const ORTHOGONAL: [usize; 4] = [0, 2, 4, 6];
const DIAGONAL: [usize; 4] = [1, 3, 5, 7];

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const KING_DELTAS: [(i8, i8); 8] = DIRECTIONS;

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_DELTAS);
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_DELTAS);
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(1, -1), (1, 1)]),
    leaper_table(&[(-1, -1), (-1, 1)]),
];

/// `RAYS[direction][square]`: every square reachable on an empty board.
const RAYS: [[u64; 64]; 8] = ray_table();

const fn offset(sq: usize, dr: i8, df: i8) -> Option<usize> {
    let rank = (sq / 8) as i8 + dr;
    let file = (sq % 8) as i8 + df;
    if rank < 0 || rank > 7 || file < 0 || file > 7 {
        None
    } else {
        Some((rank * 8 + file) as usize)
    }
}

const fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let mut bits = 0u64;
        let mut i = 0;
        while i < deltas.len() {
            if let Some(target) = offset(sq, deltas[i].0, deltas[i].1) {
                bits |= 1u64 << target;
            }
            i += 1;
        }
        table[sq] = Bitboard(bits);
        sq += 1;
    }
    table
}

const fn ray_table() -> [[u64; 64]; 8] {
    let mut table = [[0u64; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let (dr, df) = DIRECTIONS[dir];
        let mut sq = 0;
        while sq < 64 {
            let mut bits = 0u64;
            let mut cursor = offset(sq, dr, df);
            while let Some(next) = cursor {
                bits |= 1u64 << next;
                cursor = offset(next, dr, df);
            }
            table[dir][sq] = bits;
            sq += 1;
        }
        dir += 1;
    }
    table
}

/// Attacks along one ray, up to and including the first blocker.
#[inline]
fn ray_attacks(sq: Square, dir: usize, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir][sq.index() as usize];
    let blockers = Bitboard(ray) & occupied;
    let first = if dir < 4 {
        blockers.lsb()
    } else {
        blockers.msb()
    };
    match first {
        Some(blocker) => Bitboard(ray ^ RAYS[dir][blocker.index() as usize]),
        None => Bitboard(ray),
    }
}

#[inline]
fn slider_attacks(sq: Square, occupied: Bitboard, dirs: &[usize; 4]) -> Bitboard {
    dirs.iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(sq, dir, occupied))
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns rook attacks from `sq` given the board occupancy.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider_attacks(sq, occupied, &ORTHOGONAL)
}

/// Returns bishop attacks from `sq` given the board occupancy.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider_attacks(sq, occupied, &DIAGONAL)
}

/// Returns queen attacks from `sq` given the board occupancy.
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}
