//! The evaluation and search services the pipelines consult.

use chess_core::Move;
use chess_engine::Position;
use chess_search::{evaluate, Searcher};

/// What a search reports back to a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    /// Score of `best_move`, side-to-move relative, in centipawns.
    pub score: i32,
    /// Exact score of the hint move, when one was given and is legal.
    pub hint_score: Option<i32>,
}

/// Evaluation and search, as seen by a replay strategy.
///
/// Scores are relative to the side to move. Implementations may mutate the
/// position while working but must hand it back unchanged.
pub trait Oracle {
    /// Evaluation of the position as it stands.
    fn static_eval(&mut self, position: &Position) -> i32;

    /// Evaluation once the capture sequences have settled.
    fn quiescence_eval(&mut self, position: &mut Position) -> i32;

    /// Full search, trying `hint` first when given.
    fn search(&mut self, position: &mut Position, hint: Option<Move>) -> SearchOutcome;

    /// True if the game cannot continue from `position`.
    fn is_game_over(&self, position: &Position) -> bool {
        chess_engine::is_game_over(position)
    }
}

impl Oracle for Searcher {
    fn static_eval(&mut self, position: &Position) -> i32 {
        evaluate(position)
    }

    fn quiescence_eval(&mut self, position: &mut Position) -> i32 {
        self.quiescence(position)
    }

    fn search(&mut self, position: &mut Position, hint: Option<Move>) -> SearchOutcome {
        let result = Searcher::search(self, position, hint);
        SearchOutcome {
            best_move: result.best_move,
            score: result.score,
            hint_score: result.hint_score,
        }
    }
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn static_eval(&mut self, position: &Position) -> i32 {
        (**self).static_eval(position)
    }

    fn quiescence_eval(&mut self, position: &mut Position) -> i32 {
        (**self).quiescence_eval(position)
    }

    fn search(&mut self, position: &mut Position, hint: Option<Move>) -> SearchOutcome {
        (**self).search(position, hint)
    }

    fn is_game_over(&self, position: &Position) -> bool {
        (**self).is_game_over(position)
    }
}
