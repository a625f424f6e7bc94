//! Board representation, move generation and notation for replaying games.
//!
//! This crate provides:
//! - the bit primitives ([`count_bits`], [`find_set_bit`],
//!   [`find_highest_set_bit`]) and the [`Bitboard`] type built on them
//! - [`Position`], mutated in place with paired `apply`/`unapply`
//! - legal and pseudo-legal move generation into any [`MoveSink`]
//! - SAN parsing and rendering
//! - game termination checks
//!
//! # Example
//!
//! ```
//! use chess_engine::{generate_moves, san_to_move, Position};
//!
//! let mut position = Position::startpos();
//! let e4 = san_to_move(&position, "e4").unwrap();
//! position.apply(e4);
//! assert_eq!(generate_moves(&position).len(), 20);
//! position.unapply(e4);
//! assert_eq!(position, Position::startpos());
//! ```

mod bitboard;
pub mod movegen;
mod outcome;
mod position;
pub mod san;

pub use bitboard::{count_bits, find_highest_set_bit, find_set_bit, lsb_position, Bitboard};
pub use movegen::{
    bishop_attacks, generate_captures, generate_moves, generate_pseudo_legal, is_king_attacked,
    is_legal, is_square_attacked, king_attacks, knight_attacks, make_move, pawn_attacks,
    queen_attacks, rook_attacks, MoveList, MoveSink,
};
pub use outcome::{
    game_result, is_check, is_game_over, is_insufficient_material, DrawReason, GameResult,
};
pub use position::{CastlingRights, Position};
pub use san::{move_to_san, san_to_move, SanError};
