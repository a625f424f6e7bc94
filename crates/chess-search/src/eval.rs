//! Static evaluation: material, piece-square tables and a little pawn and
//! bishop structure, scored from the side to move's point of view.

use chess_core::{Color, Piece, Square};
use chess_engine::{count_bits, Bitboard, Position};

const BISHOP_PAIR: i32 = 30;
const DOUBLED_PAWN: i32 = 15;

// Piece-square tables are laid out as a diagram from White's side: the first
// row is rank 8.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_PST: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

const fn table(piece: Piece) -> &'static [i32; 64] {
    match piece {
        Piece::Pawn => &PAWN_PST,
        Piece::Knight => &KNIGHT_PST,
        Piece::Bishop => &BISHOP_PST,
        Piece::Rook => &ROOK_PST,
        Piece::Queen => &QUEEN_PST,
        Piece::King => &KING_PST,
    }
}

/// Table index of `sq` for a piece of `color`.
#[inline]
fn pst_index(sq: Square, color: Color) -> usize {
    match color {
        Color::White => sq.flip().index() as usize,
        Color::Black => sq.index() as usize,
    }
}

fn side_score(position: &Position, color: Color) -> i32 {
    let mut score = 0;
    for piece in Piece::ALL {
        let bb = position.pieces_of(piece, color);
        score += piece.value() * count_bits(bb.0) as i32;
        let pst = table(piece);
        score += bb.into_iter().map(|sq| pst[pst_index(sq, color)]).sum::<i32>();
    }

    if count_bits(position.pieces_of(Piece::Bishop, color).0) >= 2 {
        score += BISHOP_PAIR;
    }

    let pawns = position.pieces_of(Piece::Pawn, color);
    for file in 0..8 {
        let on_file = count_bits((pawns & Bitboard(Bitboard::FILE_A.0 << file)).0) as i32;
        if on_file > 1 {
            score -= DOUBLED_PAWN * (on_file - 1);
        }
    }
    score
}

/// Evaluates `position` in centipawns, positive when the side to move is better.
pub fn evaluate(position: &Position) -> i32 {
    let us = position.side_to_move;
    side_score(position, us) - side_score(position, us.opposite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> i32 {
        evaluate(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn startpos_is_balanced() {
        assert_eq!(evaluate(&Position::startpos()), 0);
    }

    #[test]
    fn mirrored_positions_score_alike() {
        let white = eval("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        let black = eval("4k3/8/8/3q4/8/8/8/4K3 b - - 0 1");
        assert_eq!(white, black);
        assert!(white > 800);
    }

    #[test]
    fn score_is_relative_to_side_to_move() {
        let white = eval("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        let black = eval("4k3/8/8/8/3Q4/8/8/4K3 b - - 0 1");
        assert_eq!(white, -black);
    }

    #[test]
    fn advanced_pawns_are_worth_more() {
        let home = eval("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let advanced = eval("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1");
        assert!(advanced > home);
    }

    #[test]
    fn doubled_pawns_are_penalised() {
        let split = eval("4k3/8/8/8/8/3P4/4P3/4K3 w - - 0 1");
        let doubled = eval("4k3/8/8/8/8/4P3/4P3/4K3 w - - 0 1");
        // e3 and d3 share a table value, so only the structure differs
        assert_eq!(split - doubled, DOUBLED_PAWN);
    }

    #[test]
    fn bishop_pair_bonus() {
        let pair = eval("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1");
        let bishop_knight = eval("4k3/8/8/8/8/8/8/2B1KN2 w - - 0 1");
        let pst_gap = BISHOP_PST[61] - KNIGHT_PST[61];
        assert_eq!(
            pair - bishop_knight,
            Piece::Bishop.value() - Piece::Knight.value() + pst_gap + BISHOP_PAIR
        );
    }
}
