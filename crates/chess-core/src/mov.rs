//! Move representation.

use crate::{Piece, Square};
use std::fmt;

/// Flags for special move types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Normal move (no special action).
    Normal = 0,
    /// Pawn double push from starting rank.
    DoublePush = 1,
    /// Kingside castling (O-O).
    CastleKingside = 2,
    /// Queenside castling (O-O-O).
    CastleQueenside = 3,
    /// En passant capture.
    EnPassant = 4,
    /// Pawn promotion to knight.
    PromoteKnight = 5,
    /// Pawn promotion to bishop.
    PromoteBishop = 6,
    /// Pawn promotion to rook.
    PromoteRook = 7,
    /// Pawn promotion to queen.
    PromoteQueen = 8,
}

impl MoveFlag {
    const ALL: [MoveFlag; 9] = [
        MoveFlag::Normal,
        MoveFlag::DoublePush,
        MoveFlag::CastleKingside,
        MoveFlag::CastleQueenside,
        MoveFlag::EnPassant,
        MoveFlag::PromoteKnight,
        MoveFlag::PromoteBishop,
        MoveFlag::PromoteRook,
        MoveFlag::PromoteQueen,
    ];

    /// Promotion flags, strongest first.
    pub const PROMOTIONS: [MoveFlag; 4] = [
        MoveFlag::PromoteQueen,
        MoveFlag::PromoteRook,
        MoveFlag::PromoteBishop,
        MoveFlag::PromoteKnight,
    ];

    /// Returns the promotion piece if this is a promotion move.
    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self {
            MoveFlag::PromoteKnight => Some(Piece::Knight),
            MoveFlag::PromoteBishop => Some(Piece::Bishop),
            MoveFlag::PromoteRook => Some(Piece::Rook),
            MoveFlag::PromoteQueen => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns true if this is a promotion move.
    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion_piece().is_some()
    }

    /// Returns true if this is a castling move.
    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

/// A chess move.
///
/// Encoded compactly: 6 bits from, 6 bits to, 4 bits flags = 16 bits total.
/// The encoding is position-independent; whether a move captures is decided
/// by the position it is played in.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        Move((from.index() as u16) | ((to.index() as u16) << 6) | ((flag as u16) << 12))
    }

    /// Creates a normal move (no special flags).
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Normal)
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        // SAFETY: masked to 6 bits, always valid square index
        unsafe { Square::from_index_unchecked((self.0 & 0x3F) as u8) }
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        // SAFETY: masked to 6 bits, always valid square index
        unsafe { Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8) }
    }

    /// Returns the move flag.
    #[inline]
    pub const fn flag(self) -> MoveFlag {
        let raw = (self.0 >> 12) as usize;
        if raw < MoveFlag::ALL.len() {
            MoveFlag::ALL[raw]
        } else {
            MoveFlag::Normal
        }
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.flag().promotion_piece() {
            Some(piece) => format!(
                "{}{}{}",
                self.from(),
                self.to(),
                piece.san_char().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// A null move, used to fill fixed-size buffers. Never a legal move.
    pub const NULL: Move = Move(0);
}

impl Default for Move {
    fn default() -> Self {
        Move::NULL
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    #[test]
    fn move_encoding() {
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        let m = Move::new(e2, e4, MoveFlag::DoublePush);

        assert_eq!(m.from(), e2);
        assert_eq!(m.to(), e4);
        assert_eq!(m.flag(), MoveFlag::DoublePush);
    }

    #[test]
    fn every_flag_survives_encoding() {
        for flag in MoveFlag::ALL {
            let m = Move::new(Square::H8, Square::A1, flag);
            assert_eq!(m.flag(), flag);
            assert_eq!(m.from(), Square::H8);
        }
    }

    #[test]
    fn move_uci() {
        let e7 = Square::new(File::E, Rank::R7);
        let e8 = Square::new(File::E, Rank::R8);
        assert_eq!(Move::new(e7, e8, MoveFlag::PromoteKnight).to_uci(), "e7e8n");
        assert_eq!(Move::normal(Square::G1, Square::H1).to_uci(), "g1h1");
        assert_eq!(format!("{:?}", Move::normal(e7, e8)), "Move(e7e8)");
    }

    #[test]
    fn flag_predicates() {
        assert!(MoveFlag::PromoteRook.is_promotion());
        assert!(!MoveFlag::EnPassant.is_promotion());
        assert!(MoveFlag::CastleQueenside.is_castling());
        assert!(!MoveFlag::DoublePush.is_castling());
        assert_eq!(MoveFlag::PROMOTIONS[0].promotion_piece(), Some(Piece::Queen));
    }
}
