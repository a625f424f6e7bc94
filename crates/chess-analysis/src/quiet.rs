//! Quiet-position filtering.
//!
//! Keeps only the comments of positions where a shallow look and a deep look
//! agree. A position is not quiet when its static evaluation differs by more
//! than [`QUIET_THRESHOLD`] from either the quiescence evaluation or the full
//! search score.

use chess_core::Move;
use chess_engine::Position;
use tracing::debug;

use crate::oracle::Oracle;
use crate::replay::{Ply, ReplayError, Strategy};

/// Largest evaluation gap, in centipawns, a quiet position may show.
pub const QUIET_THRESHOLD: i32 = 600;

/// Classifies `position` as quiet or tactical.
///
/// The full search only runs when the quiescence evaluation agrees with the
/// static one. Finished games are quiet.
pub fn is_quiet<O: Oracle>(position: &mut Position, oracle: &mut O) -> bool {
    if oracle.is_game_over(position) {
        return true;
    }

    let static_eval = oracle.static_eval(position);
    let quiescence = oracle.quiescence_eval(position);
    if (static_eval - quiescence).abs() > QUIET_THRESHOLD {
        debug!(static_eval, quiescence, "capture sequence pending");
        return false;
    }

    let searched = oracle.search(position, None).score;
    if (static_eval - searched).abs() > QUIET_THRESHOLD {
        debug!(static_eval, searched, "search disagrees");
        return false;
    }
    true
}

/// [`Strategy`] keeping the comments of quiet positions only.
///
/// A comment is kept when the position in front of the move before it was
/// quiet, so the classification trails the movetext by one ply.
#[derive(Debug)]
pub struct QuietFilter {
    last_was_quiet: bool,
}

impl QuietFilter {
    pub fn new() -> Self {
        QuietFilter {
            last_was_quiet: true,
        }
    }

    /// Classification of the position the last observed move was played from.
    pub fn last_was_quiet(&self) -> bool {
        self.last_was_quiet
    }
}

impl Default for QuietFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for QuietFilter {
    fn start_game(&mut self) {
        self.last_was_quiet = true;
    }

    fn decide<O: Oracle>(
        &mut self,
        _ctx: &mut Ply<'_, O>,
        comment: &str,
        _last_move: Option<Move>,
    ) -> Result<Option<String>, ReplayError> {
        let comment = comment.trim();
        if !self.last_was_quiet || comment.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{{ {} }}\n", comment)))
    }

    fn observe<O: Oracle>(&mut self, ctx: &mut Ply<'_, O>, _next: Move) {
        self.last_was_quiet = is_quiet(ctx.position, ctx.oracle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::SearchOutcome;

    /// Fixed scores, counting how often the full search runs.
    struct Fixed {
        static_eval: i32,
        quiescence: i32,
        search: i32,
        game_over: bool,
        searches: usize,
    }

    impl Fixed {
        fn new(static_eval: i32, quiescence: i32, search: i32) -> Self {
            Fixed {
                static_eval,
                quiescence,
                search,
                game_over: false,
                searches: 0,
            }
        }
    }

    impl Oracle for Fixed {
        fn static_eval(&mut self, _position: &Position) -> i32 {
            self.static_eval
        }

        fn quiescence_eval(&mut self, _position: &mut Position) -> i32 {
            self.quiescence
        }

        fn search(&mut self, _position: &mut Position, _hint: Option<Move>) -> SearchOutcome {
            self.searches += 1;
            SearchOutcome {
                best_move: None,
                score: self.search,
                hint_score: None,
            }
        }

        fn is_game_over(&self, _position: &Position) -> bool {
            self.game_over
        }
    }

    fn classify(oracle: &mut Fixed) -> bool {
        is_quiet(&mut Position::startpos(), oracle)
    }

    #[test]
    fn agreeing_evaluations_are_quiet() {
        let mut oracle = Fixed::new(35, 35, 35);
        assert!(classify(&mut oracle));
        assert_eq!(oracle.searches, 1);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(classify(&mut Fixed::new(0, QUIET_THRESHOLD, -QUIET_THRESHOLD)));
        assert!(!classify(&mut Fixed::new(0, QUIET_THRESHOLD + 1, 0)));
        assert!(!classify(&mut Fixed::new(0, 0, -QUIET_THRESHOLD - 1)));
    }

    #[test]
    fn quiescence_gap_skips_the_search() {
        let mut oracle = Fixed::new(0, 900, 0);
        assert!(!classify(&mut oracle));
        assert_eq!(oracle.searches, 0);
    }

    #[test]
    fn finished_games_are_quiet() {
        let mut oracle = Fixed::new(0, 5000, 5000);
        oracle.game_over = true;
        assert!(classify(&mut oracle));
    }

    #[test]
    fn comments_follow_the_previous_classification() {
        let mut position = Position::startpos();
        let mut filter = QuietFilter::new();

        let mut tactical = Fixed::new(0, 1000, 0);
        let mut ctx = Ply {
            position: &mut position,
            oracle: &mut tactical,
        };
        assert_eq!(
            filter.decide(&mut ctx, " kept ", None).unwrap().as_deref(),
            Some("{ kept }\n")
        );
        filter.observe(&mut ctx, Move::NULL);
        assert!(!filter.last_was_quiet());
        assert_eq!(filter.decide(&mut ctx, "dropped", None).unwrap(), None);

        filter.start_game();
        assert!(filter.last_was_quiet());
        assert_eq!(filter.decide(&mut ctx, "", None).unwrap(), None);
    }
}
