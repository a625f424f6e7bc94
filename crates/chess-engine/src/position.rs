//! Chess position representation.
//!
//! A [`Position`] is mutated in place through paired [`Position::apply`] and
//! [`Position::unapply`] calls. Each `apply` pushes an undo record onto an
//! internal stack, so moves must be taken back in strict LIFO order.

use std::fmt;

use chess_core::{Color, FenError, FenParser, Move, MoveFlag, Piece, Square};

use crate::Bitboard;

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Parses the castling field of a FEN record.
    fn from_fen(field: &str) -> Self {
        let flags = field.chars().fold(0u8, |flags, c| {
            flags
                | match c {
                    'K' => Self::WHITE_KINGSIDE,
                    'Q' => Self::WHITE_QUEENSIDE,
                    'k' => Self::BLACK_KINGSIDE,
                    'q' => Self::BLACK_QUEENSIDE,
                    _ => 0,
                }
        });
        CastlingRights::new(flags)
    }

    const fn kingside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    const fn queenside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        self.0 & Self::kingside_flag(color) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        self.0 & Self::queenside_flag(color) != 0
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0 &= !(Self::kingside_flag(color) | Self::queenside_flag(color));
    }

    /// Removes the right tied to a rook's home square, if `sq` is one.
    fn remove_for_rook_square(&mut self, sq: Square) {
        let flag = match sq {
            Square::H1 => Self::WHITE_KINGSIDE,
            Square::A1 => Self::WHITE_QUEENSIDE,
            Square::H8 => Self::BLACK_KINGSIDE,
            Square::A8 => Self::BLACK_QUEENSIDE,
            _ => return,
        };
        self.0 &= !flag;
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("-");
        }
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & flag != 0 {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// State needed to take back one applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Undo {
    mv: Move,
    moved: Piece,
    captured: Option<Piece>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
}

/// Complete chess position state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Bitboards for each piece type, indexed by Piece enum.
    pub pieces: [Bitboard; 6],

    /// Bitboards for each color's pieces.
    pub colors: [Bitboard; 2],

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights.
    pub castling: CastlingRights,

    /// En passant target square (if any).
    pub en_passant: Option<Square>,

    /// Halfmove clock for 50-move rule.
    pub halfmove_clock: u32,

    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u32,

    ply: u32,
    history: Vec<Undo>,
}

impl Position {
    /// Creates an empty position.
    pub fn empty() -> Self {
        Position {
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            ply: 0,
            history: Vec::new(),
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenParser::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string or a four-field EPD string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = FenParser::parse(fen)?;
        let mut position = Position::empty();

        for (rank_idx, rank_str) in parsed.piece_placement.split('/').enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    if let Some(sq) = Square::from_index((rank * 8 + file) as u8) {
                        position.put(piece, color, sq);
                    }
                    file += 1;
                }
            }
        }

        position.side_to_move = parsed.active_color;
        position.castling = CastlingRights::from_fen(&parsed.castling);
        position.en_passant = parsed.en_passant;
        position.halfmove_clock = parsed.halfmove_clock;
        position.fullmove_number = parsed.fullmove_number.max(1);
        position.ply = (position.fullmove_number - 1)
            .saturating_mul(2)
            .saturating_add(match position.side_to_move {
                Color::White => 0,
                Color::Black => 1,
            });

        Ok(position)
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8u8).rev() {
            let mut empty_run = 0;
            for file in 0..8u8 {
                let piece = Square::from_index(rank * 8 + file).and_then(|sq| self.piece_at(sq));
                match piece {
                    Some((piece, color)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        placement.push(piece.to_fen_char(color));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), Square::to_algebraic);

        format!(
            "{} {} {} {} {} {}",
            placement,
            self.side_to_move.to_fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Number of half-moves played since the start of the game.
    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Number of moves that can currently be taken back with [`unapply`](Self::unapply).
    #[inline]
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Returns the piece and color at the given square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let color = if self.colors[Color::White.index()].contains(sq) {
            Color::White
        } else if self.colors[Color::Black.index()].contains(sq) {
            Color::Black
        } else {
            return None;
        };

        Piece::ALL
            .into_iter()
            .find(|piece| self.pieces[piece.index()].contains(sq))
            .map(|piece| (piece, color))
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// Returns a bitboard of all empty squares.
    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    /// Returns a bitboard of pieces of the given type and color.
    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[piece.index()] & self.colors[color.index()]
    }

    /// Returns the king square of `color`, if that side has a king.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(Piece::King, color).lsb()
    }

    #[inline]
    fn put(&mut self, piece: Piece, color: Color, sq: Square) {
        self.pieces[piece.index()].set(sq);
        self.colors[color.index()].set(sq);
    }

    #[inline]
    fn remove(&mut self, piece: Piece, color: Color, sq: Square) {
        self.pieces[piece.index()].clear(sq);
        self.colors[color.index()].clear(sq);
    }

    /// Square of the pawn taken by an en passant capture landing on `to`.
    fn en_passant_victim(to: Square, mover: Color) -> Square {
        let index = match mover {
            Color::White => to.index() - 8,
            Color::Black => to.index() + 8,
        };
        // SAFETY: en passant targets lie on rank 3 or 6
        unsafe { Square::from_index_unchecked(index) }
    }

    fn castle_rook_squares(flag: MoveFlag, color: Color) -> Option<(Square, Square)> {
        match (flag, color) {
            (MoveFlag::CastleKingside, Color::White) => Some((Square::H1, Square::F1)),
            (MoveFlag::CastleQueenside, Color::White) => Some((Square::A1, Square::D1)),
            (MoveFlag::CastleKingside, Color::Black) => Some((Square::H8, Square::F8)),
            (MoveFlag::CastleQueenside, Color::Black) => Some((Square::A8, Square::D8)),
            _ => None,
        }
    }

    /// Plays `m` on the board.
    ///
    /// The move must be pseudo-legal for the side to move. Legality (not
    /// leaving the own king in check) is the caller's concern.
    ///
    /// # Panics
    /// Panics if there is no piece on the move's source square.
    pub fn apply(&mut self, m: Move) {
        let us = self.side_to_move;
        let them = us.opposite();
        let (from, to, flag) = (m.from(), m.to(), m.flag());
        let (moved, _) = self
            .piece_at(from)
            .expect("apply: no piece on the source square");

        let captured = if flag == MoveFlag::EnPassant {
            self.remove(Piece::Pawn, them, Self::en_passant_victim(to, us));
            Some(Piece::Pawn)
        } else {
            let captured = self.piece_at(to).map(|(piece, _)| piece);
            if let Some(piece) = captured {
                self.remove(piece, them, to);
            }
            captured
        };

        self.history.push(Undo {
            mv: m,
            moved,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
        });

        self.remove(moved, us, from);
        self.put(flag.promotion_piece().unwrap_or(moved), us, to);

        if let Some((rook_from, rook_to)) = Self::castle_rook_squares(flag, us) {
            self.remove(Piece::Rook, us, rook_from);
            self.put(Piece::Rook, us, rook_to);
        }

        if moved == Piece::King {
            self.castling.remove_color(us);
        }
        self.castling.remove_for_rook_square(from);
        self.castling.remove_for_rook_square(to);

        self.en_passant = if flag == MoveFlag::DoublePush {
            Some(Self::en_passant_victim(to, us))
        } else {
            None
        };

        if moved == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        // Counters from a FEN tag are unbounded; wrap so unapply reverses exactly.
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.wrapping_add(1);
        }
        self.side_to_move = them;
        self.ply = self.ply.wrapping_add(1);
    }

    /// Takes back `m`, which must be the most recently applied move.
    pub fn unapply(&mut self, m: Move) {
        let Some(undo) = self.history.pop() else {
            debug_assert!(false, "unapply without a matching apply");
            return;
        };
        debug_assert_eq!(undo.mv, m, "unapply out of order");

        let them = self.side_to_move;
        let us = them.opposite();
        let (from, to, flag) = (undo.mv.from(), undo.mv.to(), undo.mv.flag());

        self.remove(flag.promotion_piece().unwrap_or(undo.moved), us, to);
        self.put(undo.moved, us, from);

        if let Some((rook_from, rook_to)) = Self::castle_rook_squares(flag, us) {
            self.remove(Piece::Rook, us, rook_to);
            self.put(Piece::Rook, us, rook_from);
        }

        if let Some(piece) = undo.captured {
            let sq = if flag == MoveFlag::EnPassant {
                Self::en_passant_victim(to, us)
            } else {
                to
            };
            self.put(piece, them, sq);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.wrapping_sub(1);
        }
        self.side_to_move = us;
        self.ply = self.ply.wrapping_sub(1);
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Board diagram with rank 8 on top, followed by the side to move.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = Square::from_index(rank * 8 + file)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', |(piece, color)| piece.to_fen_char(color));
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{} to move", self.side_to_move)
    }
}
