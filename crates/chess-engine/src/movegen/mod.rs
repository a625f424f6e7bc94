//! Move generation.
//!
//! Generators write into any [`MoveSink`], so a search can collect moves
//! straight into its own storage. Legal generation filters pseudo-legal
//! moves by applying each one and testing whether the mover's king is
//! attacked.

mod attacks;
pub mod perft;

use crate::{Bitboard, Position};
use chess_core::{Color, Move, MoveFlag, Piece, Rank, Square};

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};

/// Destination for generated moves.
pub trait MoveSink {
    fn push_move(&mut self, m: Move);
}

impl MoveSink for Vec<Move> {
    #[inline]
    fn push_move(&mut self, m: Move) {
        self.push(m);
    }
}

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves the list can hold.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns true if `m` is in the list.
    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl MoveSink for MoveList {
    #[inline]
    fn push_move(&mut self, m: Move) {
        self.push(m);
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Which subset of pseudo-legal moves to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    All,
    /// Captures, en passant and promotions.
    Noisy,
}

/// Generates all legal moves for the given position.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, &mut moves);

    let mut scratch = position.clone();
    moves.retain(|m| is_legal(&mut scratch, m));
    moves
}

/// Generates every pseudo-legal move, including castling.
pub fn generate_pseudo_legal<S: MoveSink>(position: &Position, sink: &mut S) {
    generate(position, sink, Kind::All);
}

/// Generates pseudo-legal captures and promotions.
pub fn generate_captures<S: MoveSink>(position: &Position, sink: &mut S) {
    generate(position, sink, Kind::Noisy);
}

/// Returns true if the pseudo-legal move `m` does not leave the mover in check.
///
/// The position is restored before returning.
pub fn is_legal(position: &mut Position, m: Move) -> bool {
    let us = position.side_to_move;
    position.apply(m);
    let legal = !is_king_attacked(position, us);
    position.unapply(m);
    legal
}

fn generate<S: MoveSink>(position: &Position, sink: &mut S, kind: Kind) {
    let us = position.side_to_move;
    let occupied = position.occupied();
    let theirs = position.colors[us.opposite().index()];
    let targets = match kind {
        Kind::All => !position.colors[us.index()],
        Kind::Noisy => theirs,
    };

    generate_pawn_moves(position, sink, kind);

    for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
        for from in position.pieces_of(piece, us) {
            let attacks = match piece {
                Piece::Knight => knight_attacks(from),
                Piece::Bishop => bishop_attacks(from, occupied),
                Piece::Rook => rook_attacks(from, occupied),
                Piece::Queen => queen_attacks(from, occupied),
                _ => king_attacks(from),
            };
            for to in attacks & targets {
                sink.push_move(Move::normal(from, to));
            }
        }
    }

    if kind == Kind::All {
        generate_castling_moves(position, sink);
    }
}

fn push_pawn_move<S: MoveSink>(sink: &mut S, from: Square, to: Square, promo_rank: Rank) {
    if to.rank() == promo_rank {
        for flag in MoveFlag::PROMOTIONS {
            sink.push_move(Move::new(from, to, flag));
        }
    } else {
        sink.push_move(Move::normal(from, to));
    }
}

fn generate_pawn_moves<S: MoveSink>(position: &Position, sink: &mut S, kind: Kind) {
    let us = position.side_to_move;
    let theirs = position.colors[us.opposite().index()];
    let empty = position.empty_squares();
    let pawns = position.pieces_of(Piece::Pawn, us);

    let (promo_rank, start_rank, back): (Rank, Bitboard, i8) = match us {
        Color::White => (Rank::R8, Bitboard::RANK_2, -8),
        Color::Black => (Rank::R1, Bitboard::RANK_7, 8),
    };
    let advance = |bb: Bitboard| match us {
        Color::White => bb.north(),
        Color::Black => bb.south(),
    };
    let behind = |to: Square, steps: i8| {
        // SAFETY: pushes land strictly inside the board
        unsafe { Square::from_index_unchecked((to.index() as i8 + back * steps) as u8) }
    };

    let single = advance(pawns) & empty;
    for to in single {
        if kind == Kind::All || to.rank() == promo_rank {
            push_pawn_move(sink, behind(to, 1), to, promo_rank);
        }
    }

    if kind == Kind::All {
        for to in advance(advance(pawns & start_rank) & empty) & empty {
            sink.push_move(Move::new(behind(to, 2), to, MoveFlag::DoublePush));
        }
    }

    for from in pawns {
        for to in pawn_attacks(from, us) & theirs {
            push_pawn_move(sink, from, to, promo_rank);
        }
        if let Some(ep) = position.en_passant {
            if pawn_attacks(from, us).contains(ep) {
                sink.push_move(Move::new(from, ep, MoveFlag::EnPassant));
            }
        }
    }
}

fn generate_castling_moves<S: MoveSink>(position: &Position, sink: &mut S) {
    let us = position.side_to_move;
    let them = us.opposite();
    let occupied = position.occupied();

    if is_king_attacked(position, us) {
        return;
    }

    let (king, rank_base) = match us {
        Color::White => (Square::E1, 0u8),
        Color::Black => (Square::E8, 56u8),
    };
    let at = |file: u8| {
        // SAFETY: file < 8 and rank_base is 0 or 56
        unsafe { Square::from_index_unchecked(rank_base + file) }
    };

    if position.castling.can_castle_kingside(us)
        && (occupied & Bitboard::from_squares(&[at(5), at(6)])).is_empty()
        && !is_square_attacked(position, at(5), them)
    {
        sink.push_move(Move::new(king, at(6), MoveFlag::CastleKingside));
    }

    if position.castling.can_castle_queenside(us)
        && (occupied & Bitboard::from_squares(&[at(1), at(2), at(3)])).is_empty()
        && !is_square_attacked(position, at(3), them)
    {
        sink.push_move(Move::new(king, at(2), MoveFlag::CastleQueenside));
    }
}

/// Returns true if the given square is attacked by the given color.
pub fn is_square_attacked(position: &Position, sq: Square, by_color: Color) -> bool {
    let occupied = position.occupied();
    let theirs = |piece: Piece| position.pieces_of(piece, by_color);

    (pawn_attacks(sq, by_color.opposite()) & theirs(Piece::Pawn)).is_not_empty()
        || (knight_attacks(sq) & theirs(Piece::Knight)).is_not_empty()
        || (king_attacks(sq) & theirs(Piece::King)).is_not_empty()
        || (bishop_attacks(sq, occupied) & (theirs(Piece::Bishop) | theirs(Piece::Queen)))
            .is_not_empty()
        || (rook_attacks(sq, occupied) & (theirs(Piece::Rook) | theirs(Piece::Queen)))
            .is_not_empty()
}

/// Returns true if the king of the given color is in check.
pub fn is_king_attacked(position: &Position, king_color: Color) -> bool {
    position
        .king_square(king_color)
        .is_some_and(|sq| is_square_attacked(position, sq, king_color.opposite()))
}

/// Makes a move and returns the new position, leaving `position` untouched.
pub fn make_move(position: &Position, m: Move) -> Position {
    let mut next = position.clone();
    next.apply(m);
    next
}
