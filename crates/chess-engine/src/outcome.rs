//! Game termination detectable from a single position.
//!
//! Repetition needs the game history and is left to callers that keep one.

use crate::movegen::{generate_moves, is_king_attacked};
use crate::Position;
use chess_core::{Color, Piece};

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw(DrawReason),
}

impl GameResult {
    /// The result token used in game records.
    pub const fn as_pgn(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// No legal moves and not in check.
    Stalemate,
    /// Neither side can deliver mate.
    InsufficientMaterial,
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
}

/// Returns true if the side to move is in check.
pub fn is_check(position: &Position) -> bool {
    is_king_attacked(position, position.side_to_move)
}

/// Returns true if neither side has enough material to checkmate.
///
/// Covers bare kings, a single minor piece, and bishops that all stand on
/// squares of one colour.
pub fn is_insufficient_material(position: &Position) -> bool {
    let heavy = position.pieces[Piece::Pawn.index()]
        | position.pieces[Piece::Rook.index()]
        | position.pieces[Piece::Queen.index()];
    if heavy.is_not_empty() {
        return false;
    }

    let knights = position.pieces[Piece::Knight.index()];
    let bishops = position.pieces[Piece::Bishop.index()];
    let minors = knights.count() + bishops.count();
    if minors <= 1 {
        return true;
    }

    const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;
    knights.is_empty() && {
        let light = bishops.0 & LIGHT_SQUARES;
        light == 0 || light == bishops.0
    }
}

/// Returns the result if the game is over in this position.
pub fn game_result(position: &Position) -> Option<GameResult> {
    if generate_moves(position).is_empty() {
        return Some(if is_check(position) {
            match position.side_to_move {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            }
        } else {
            GameResult::Draw(DrawReason::Stalemate)
        });
    }
    if position.halfmove_clock >= 100 {
        return Some(GameResult::Draw(DrawReason::FiftyMoveRule));
    }
    if is_insufficient_material(position) {
        return Some(GameResult::Draw(DrawReason::InsufficientMaterial));
    }
    None
}

/// Returns true if the game is over.
pub fn is_game_over(position: &Position) -> bool {
    game_result(position).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(fen: &str) -> Option<GameResult> {
        game_result(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn startpos_is_not_over() {
        assert_eq!(game_result(&Position::startpos()), None);
        assert!(!is_game_over(&Position::startpos()));
    }

    #[test]
    fn checkmate() {
        // Fool's mate
        assert_eq!(
            result("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
            Some(GameResult::BlackWins)
        );
        assert_eq!(
            result("R5k1/5ppp/8/8/8/8/8/4K3 b - - 1 1"),
            Some(GameResult::WhiteWins)
        );
    }

    #[test]
    fn stalemate() {
        assert_eq!(
            result("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"),
            Some(GameResult::Draw(DrawReason::Stalemate))
        );
    }

    #[test]
    fn fifty_move_rule() {
        assert_eq!(
            result("4k3/8/8/8/8/8/8/R3K3 w - - 100 80"),
            Some(GameResult::Draw(DrawReason::FiftyMoveRule))
        );
        assert_eq!(result("4k3/8/8/8/8/8/8/R3K3 w - - 99 80"), None);
    }

    #[test]
    fn insufficient_material() {
        let draw = Some(GameResult::Draw(DrawReason::InsufficientMaterial));
        assert_eq!(result("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), draw);
        assert_eq!(result("4k3/8/8/8/8/8/8/4KN2 w - - 0 1"), draw);
        // Both bishops on dark squares
        assert_eq!(result("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1"), draw);
        // Opposite-coloured bishops can still mate
        assert_eq!(result("4k1b1/8/8/8/8/8/8/2B1K3 w - - 0 1"), None);
        assert_eq!(result("4k3/8/8/8/8/8/8/3NKN2 w - - 0 1"), None);
    }

    #[test]
    fn result_tokens() {
        assert_eq!(GameResult::WhiteWins.as_pgn(), "1-0");
        assert_eq!(GameResult::BlackWins.as_pgn(), "0-1");
        assert_eq!(GameResult::Draw(DrawReason::Stalemate).as_pgn(), "1/2-1/2");
    }
}
