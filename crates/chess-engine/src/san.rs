//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1".
//! Parsing is lenient about what game records and annotations contain
//! around a move: check marks, annotation glyphs (`!`, `?`), zero-style
//! castling and promotions written without `=` are all accepted.

use crate::movegen::{generate_moves, is_king_attacked, make_move};
use crate::Position;
use chess_core::{File, Move, MoveFlag, Piece, Rank, Square};
use thiserror::Error;

/// Errors produced when resolving a SAN token against a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,

    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),

    #[error("no legal move matches: {0}")]
    NoMatchingMove(String),

    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
}

/// What a SAN token says about the move, before looking at the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Castle(MoveFlag),
    Piece {
        piece: Piece,
        from_file: Option<File>,
        from_rank: Option<Rank>,
        to: Square,
        promotion: Option<Piece>,
    },
}

impl Pattern {
    fn parse(san: &str) -> Result<Self, SanError> {
        let invalid = || SanError::InvalidFormat(san.to_string());

        match san {
            "O-O" | "0-0" => return Ok(Pattern::Castle(MoveFlag::CastleKingside)),
            "O-O-O" | "0-0-0" => return Ok(Pattern::Castle(MoveFlag::CastleQueenside)),
            _ => {}
        }
        if !san.is_ascii() {
            return Err(invalid());
        }

        let mut body: Vec<u8> = san.bytes().filter(|&b| b != b'x' && b != b'=').collect();

        let piece = match body.first().and_then(|&b| Piece::from_san_char(b as char)) {
            Some(piece) if piece != Piece::Pawn => {
                body.remove(0);
                piece
            }
            _ => Piece::Pawn,
        };

        let promotion = match body.last().and_then(|&b| Piece::from_san_char(b as char)) {
            Some(promo) if piece == Piece::Pawn => {
                body.pop();
                Some(promo)
            }
            _ => None,
        };

        if body.len() < 2 || body.len() > 4 {
            return Err(invalid());
        }
        let (hint, dest) = body.split_at(body.len() - 2);
        let to = match (File::from_char(dest[0] as char), Rank::from_char(dest[1] as char)) {
            (Some(file), Some(rank)) => Square::new(file, rank),
            _ => return Err(invalid()),
        };

        let (mut from_file, mut from_rank) = (None, None);
        for &b in hint {
            if let Some(file) = File::from_char(b as char) {
                from_file = Some(file);
            } else if let Some(rank) = Rank::from_char(b as char) {
                from_rank = Some(rank);
            } else {
                return Err(invalid());
            }
        }

        Ok(Pattern::Piece {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, position: &Position, m: Move) -> bool {
        match *self {
            Pattern::Castle(flag) => m.flag() == flag,
            Pattern::Piece {
                piece,
                from_file,
                from_rank,
                to,
                promotion,
            } => {
                m.to() == to
                    && position.piece_at(m.from()).map(|(p, _)| p) == Some(piece)
                    && from_file.map_or(true, |f| m.from().file() == f)
                    && from_rank.map_or(true, |r| m.from().rank() == r)
                    && m.flag().promotion_piece() == promotion
            }
        }
    }
}

/// Resolves a SAN token to the unique legal move it denotes.
pub fn san_to_move(position: &Position, san: &str) -> Result<Move, SanError> {
    let token = san.trim().trim_end_matches(['+', '#', '!', '?']);
    if token.is_empty() {
        return Err(SanError::Empty);
    }

    let pattern = Pattern::parse(token)?;
    let moves = generate_moves(position);
    let mut matching = moves
        .as_slice()
        .iter()
        .copied()
        .filter(|&m| pattern.matches(position, m));

    match (matching.next(), matching.next()) {
        (Some(m), None) => Ok(m),
        (None, _) => Err(SanError::NoMatchingMove(token.to_string())),
        (Some(_), Some(_)) => Err(SanError::AmbiguousMove(token.to_string())),
    }
}

/// Renders a legal move in SAN, including the check or mate suffix.
///
/// `position` is the state before the move is played.
pub fn move_to_san(position: &Position, m: Move) -> String {
    let mut san = match m.flag() {
        MoveFlag::CastleKingside => "O-O".to_string(),
        MoveFlag::CastleQueenside => "O-O-O".to_string(),
        _ => match position.piece_at(m.from()) {
            Some((piece, _)) => piece_move_san(position, m, piece),
            None => return m.to_uci(),
        },
    };

    let next = make_move(position, m);
    if is_king_attacked(&next, next.side_to_move) {
        san.push(if generate_moves(&next).is_empty() {
            '#'
        } else {
            '+'
        });
    }
    san
}

fn piece_move_san(position: &Position, m: Move, piece: Piece) -> String {
    let (from, to) = (m.from(), m.to());
    let capture = position.piece_at(to).is_some() || m.flag() == MoveFlag::EnPassant;
    let mut san = String::new();

    if piece == Piece::Pawn {
        if capture {
            san.push(from.file().to_char());
        }
    } else {
        san.push(piece.san_char());

        let moves = generate_moves(position);
        let rivals: Vec<Square> = moves
            .as_slice()
            .iter()
            .filter(|o| o.to() == to && o.from() != from)
            .filter(|o| position.piece_at(o.from()).map(|(p, _)| p) == Some(piece))
            .map(|o| o.from())
            .collect();

        if !rivals.is_empty() {
            if rivals.iter().all(|sq| sq.file() != from.file()) {
                san.push(from.file().to_char());
            } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
                san.push(from.rank().to_char());
            } else {
                san.push_str(&from.to_algebraic());
            }
        }
    }

    if capture {
        san.push('x');
    }
    san.push_str(&to.to_algebraic());

    if let Some(promo) = m.flag().promotion_piece() {
        san.push('=');
        san.push(promo.san_char());
    }
    san
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn renders_common_moves() {
        let start = Position::startpos();
        assert_eq!(
            move_to_san(&start, Move::new(sq("e2"), sq("e4"), MoveFlag::DoublePush)),
            "e4"
        );
        assert_eq!(move_to_san(&start, Move::normal(Square::G1, sq("f3"))), "Nf3");

        let open = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        assert_eq!(move_to_san(&open, Move::normal(sq("e4"), sq("d5"))), "exd5");
    }

    #[test]
    fn renders_castling_and_promotion() {
        let castle = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(
            move_to_san(&castle, Move::new(Square::E1, Square::G1, MoveFlag::CastleKingside)),
            "O-O"
        );
        assert_eq!(
            move_to_san(&castle, Move::new(Square::E1, Square::C1, MoveFlag::CastleQueenside)),
            "O-O-O"
        );

        let promo = pos("8/P7/8/8/8/8/8/4K1k1 w - - 0 1");
        assert_eq!(
            move_to_san(&promo, Move::new(sq("a7"), Square::A8, MoveFlag::PromoteQueen)),
            "a8=Q"
        );
    }

    #[test]
    fn renders_disambiguation() {
        let knights = pos("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1");
        assert_eq!(move_to_san(&knights, Move::normal(Square::B1, sq("d2"))), "Nbd2");

        let rooks = pos("R7/8/8/8/8/8/7k/R3K3 w - - 0 1");
        assert_eq!(move_to_san(&rooks, Move::normal(Square::A1, sq("a4"))), "R1a4");
    }

    #[test]
    fn renders_check_and_mate() {
        let check = pos("8/8/8/8/8/8/8/4K1Qk w - - 0 1");
        assert_eq!(move_to_san(&check, Move::normal(Square::G1, sq("h2"))), "Qh2+");

        let mate = pos("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1");
        assert_eq!(move_to_san(&mate, Move::normal(Square::A1, Square::A8)), "Ra8#");
    }

    #[test]
    fn parses_with_annotation_noise() {
        let start = Position::startpos();
        let e4 = Move::new(sq("e2"), sq("e4"), MoveFlag::DoublePush);
        assert_eq!(san_to_move(&start, "e4"), Ok(e4));
        assert_eq!(san_to_move(&start, " e4!? "), Ok(e4));
        assert_eq!(
            san_to_move(&start, "Nf3"),
            Ok(Move::normal(Square::G1, sq("f3")))
        );

        let castle = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(
            san_to_move(&castle, "0-0").map(|m| m.flag()),
            Ok(MoveFlag::CastleKingside)
        );
        assert_eq!(
            san_to_move(&castle, "O-O-O+").map(|m| m.flag()),
            Ok(MoveFlag::CastleQueenside)
        );
    }

    #[test]
    fn parses_promotions_with_and_without_equals() {
        let promo = pos("1n5k/P7/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(
            san_to_move(&promo, "a8=N").map(|m| m.flag()),
            Ok(MoveFlag::PromoteKnight)
        );
        assert_eq!(
            san_to_move(&promo, "axb8Q").map(|m| m.flag()),
            Ok(MoveFlag::PromoteQueen)
        );
        assert!(matches!(
            san_to_move(&promo, "a8"),
            Err(SanError::NoMatchingMove(_))
        ));
    }

    #[test]
    fn reports_errors() {
        let start = Position::startpos();
        assert_eq!(san_to_move(&start, ""), Err(SanError::Empty));
        assert!(matches!(
            san_to_move(&start, "Ke4"),
            Err(SanError::NoMatchingMove(_))
        ));
        assert!(matches!(
            san_to_move(&start, "xyz"),
            Err(SanError::InvalidFormat(_))
        ));

        let knights = pos("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1");
        assert!(matches!(
            san_to_move(&knights, "Nd2"),
            Err(SanError::AmbiguousMove(_))
        ));
    }

    #[test]
    fn every_legal_move_survives_rendering() {
        let kiwipete = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        for &m in generate_moves(&kiwipete).as_slice() {
            let san = move_to_san(&kiwipete, m);
            assert_eq!(san_to_move(&kiwipete, &san), Ok(m), "{}", san);
        }
    }
}
