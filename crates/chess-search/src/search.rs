//! Fixed-depth alpha-beta search with a capture-only quiescence stage.
//!
//! Every generated move lives in the searcher's [`MoveHeap`]: each frame
//! opens a section, generates into it, orders it in place and closes it on
//! return. Recursion stops at the configured depth or when the heap has no
//! section left to give, whichever comes first.

use chess_core::{Move, MoveFlag};
use chess_engine::{
    generate_captures, generate_pseudo_legal, is_check, is_king_attacked, Position,
};
use tracing::debug;

use crate::eval::evaluate;
use crate::heap::{HeapConfig, HeapError, MoveHeap};

/// Score of a mate delivered on the current ply.
pub const MATE: i32 = 100_000;
const INFINITY: i32 = MATE + 1;

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Iterative deepening stops after this many plies.
    pub depth: u32,
    pub heap: HeapConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 3,
            heap: HeapConfig::default(),
        }
    }
}

/// Outcome of [`Searcher::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// None when the side to move has no legal move.
    pub best_move: Option<Move>,
    pub score: i32,
    /// Exact score of the hinted move, if it was legal.
    pub hint_score: Option<i32>,
    /// Deepest completed iteration.
    pub depth: u32,
    pub nodes: u64,
}

/// Alpha-beta searcher owning its move heap.
#[derive(Debug)]
pub struct Searcher {
    config: SearchConfig,
    heap: MoveHeap,
    nodes: u64,
}

/// Most valuable victim, least valuable attacker; promotions count as
/// capturing the promoted piece.
fn mvv_lva(position: &Position, m: Move) -> i32 {
    let victim = match m.flag() {
        MoveFlag::EnPassant => chess_core::Piece::Pawn.value(),
        _ => position
            .piece_at(m.to())
            .map_or(0, |(piece, _)| piece.value()),
    };
    let promotion = m.flag().promotion_piece().map_or(0, |p| p.value());
    if victim == 0 && promotion == 0 {
        return 0;
    }
    let attacker = position
        .piece_at(m.from())
        .map_or(0, |(piece, _)| piece.value());
    10 * (victim + promotion) - attacker / 10
}

fn order_moves(position: &Position, moves: &mut [Move]) {
    moves.sort_by_key(|&m| std::cmp::Reverse(mvv_lva(position, m)));
}

impl Searcher {
    /// Creates a searcher, allocating its move heap.
    pub fn new(config: SearchConfig) -> Result<Self, HeapError> {
        Ok(Searcher {
            heap: MoveHeap::with_config(config.heap)?,
            config,
            nodes: 0,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Nodes visited by the most recent call.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Quiescence score of `position`; the position is unchanged on return.
    pub fn quiescence(&mut self, position: &mut Position) -> i32 {
        self.heap.clear();
        self.nodes = 0;
        self.quiesce(position, -INFINITY, INFINITY)
    }

    /// Searches `position` to the configured depth.
    ///
    /// `hint` is searched first with a full window, so its reported score is
    /// exact and comparable to the best score. The position is unchanged on
    /// return, and identical inputs always produce identical results.
    pub fn search(&mut self, position: &mut Position, hint: Option<Move>) -> SearchResult {
        self.heap.clear();
        self.nodes = 0;

        let mut root: Vec<Move> = Vec::new();
        generate_pseudo_legal(position, &mut root);
        root.retain(|&m| chess_engine::is_legal(position, m));
        order_moves(position, &mut root);

        let hint = hint.filter(|h| root.contains(h));
        if let Some(h) = hint {
            if let Some(at) = root.iter().position(|&m| m == h) {
                root[..=at].rotate_right(1);
            }
        }

        if root.is_empty() {
            let score = if is_check(position) { -MATE } else { 0 };
            return SearchResult {
                best_move: None,
                score,
                hint_score: None,
                depth: 0,
                nodes: self.nodes,
            };
        }

        let mut result = SearchResult {
            best_move: root.first().copied(),
            score: -INFINITY,
            hint_score: None,
            depth: 0,
            nodes: 0,
        };

        for depth in 1..=self.config.depth.max(1) {
            let mut alpha = -INFINITY;
            let mut best = root[0];
            let mut hint_score = None;

            for &m in &root {
                let is_hint = Some(m) == hint;
                let window_floor = if is_hint { -INFINITY } else { alpha };
                position.apply(m);
                let score = -self.alpha_beta(position, depth - 1, -INFINITY, -window_floor, 1);
                position.unapply(m);

                if is_hint {
                    hint_score = Some(score);
                }
                if score > alpha {
                    alpha = score;
                    best = m;
                }
            }

            // Search the previous best first on the next iteration.
            if let Some(at) = root.iter().position(|&m| m == best) {
                if hint.is_none() {
                    root[..=at].rotate_right(1);
                }
            }

            result = SearchResult {
                best_move: Some(best),
                score: alpha,
                hint_score,
                depth,
                nodes: self.nodes,
            };
            debug!(depth, score = alpha, best = %best, nodes = self.nodes, "search iteration");
        }

        result
    }

    fn alpha_beta(
        &mut self,
        position: &mut Position,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        ply: i32,
    ) -> i32 {
        if depth == 0 || !self.heap.can_push_section() {
            return self.quiesce(position, alpha, beta);
        }
        self.nodes += 1;

        self.heap.push_section();
        generate_pseudo_legal(position, &mut self.heap);
        order_moves(position, self.heap.current_mut());

        let us = position.side_to_move;
        let mut legal = 0;
        for i in 0..self.heap.current().len() {
            let m = self.heap.current()[i];
            position.apply(m);
            if is_king_attacked(position, us) {
                position.unapply(m);
                continue;
            }
            legal += 1;
            let score = -self.alpha_beta(position, depth - 1, -beta, -alpha, ply + 1);
            position.unapply(m);

            if score >= beta {
                self.heap.pop_section();
                return beta;
            }
            alpha = alpha.max(score);
        }
        self.heap.pop_section();

        if legal == 0 {
            return if is_king_attacked(position, us) {
                -(MATE - ply)
            } else {
                0
            };
        }
        alpha
    }

    fn quiesce(&mut self, position: &mut Position, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;

        let stand_pat = evaluate(position);
        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);
        if !self.heap.can_push_section() {
            return alpha;
        }

        self.heap.push_section();
        generate_captures(position, &mut self.heap);
        order_moves(position, self.heap.current_mut());

        let us = position.side_to_move;
        for i in 0..self.heap.current().len() {
            let m = self.heap.current()[i];
            position.apply(m);
            if is_king_attacked(position, us) {
                position.unapply(m);
                continue;
            }
            let score = -self.quiesce(position, -beta, -alpha);
            position.unapply(m);

            if score >= beta {
                self.heap.pop_section();
                return beta;
            }
            alpha = alpha.max(score);
        }
        self.heap.pop_section();
        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Square;

    const HANGING_QUEEN: &str = "4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1";

    fn searcher(depth: u32) -> Searcher {
        Searcher::new(SearchConfig {
            depth,
            ..SearchConfig::default()
        })
        .unwrap()
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn finds_mate_in_one() {
        let mut position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let result = searcher(2).search(&mut position, None);
        assert_eq!(result.best_move, Some(Move::normal(Square::A1, Square::A8)));
        assert_eq!(result.score, MATE - 1);
    }

    #[test]
    fn takes_the_hanging_queen() {
        let mut position = Position::from_fen(HANGING_QUEEN).unwrap();
        let result = searcher(2).search(&mut position, None);
        assert_eq!(result.best_move, Some(Move::normal(sq("d2"), sq("d5"))));
        assert!(result.score > 300, "score {}", result.score);
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn hint_gets_an_exact_score() {
        let mut position = Position::from_fen(HANGING_QUEEN).unwrap();
        let hint = Move::normal(Square::E1, Square::F1);
        let result = searcher(2).search(&mut position, Some(hint));
        let hint_score = result.hint_score.unwrap();
        assert_eq!(result.best_move, Some(Move::normal(sq("d2"), sq("d5"))));
        assert!(result.score - hint_score > 1000, "{:?}", result);
    }

    #[test]
    fn illegal_hint_is_ignored() {
        let mut position = Position::startpos();
        let result = searcher(1).search(&mut position, Some(Move::normal(sq("e2"), sq("e5"))));
        assert_eq!(result.hint_score, None);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn search_restores_the_position() {
        let mut position = Position::from_fen(HANGING_QUEEN).unwrap();
        let before = position.clone();
        let mut s = searcher(3);
        let first = s.search(&mut position, None);
        assert_eq!(position, before);
        let second = s.search(&mut position, None);
        assert_eq!(first, second);
    }

    #[test]
    fn no_legal_moves() {
        let mut stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = searcher(2).search(&mut stalemate, None);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, 0);

        let mut mated = Position::from_fen("R5k1/5ppp/8/8/8/8/8/4K3 b - - 1 1").unwrap();
        assert_eq!(searcher(2).search(&mut mated, None).score, -MATE);
    }

    #[test]
    fn quiescence_matches_static_eval_when_nothing_hangs() {
        let mut position = Position::startpos();
        assert_eq!(searcher(1).quiescence(&mut position), evaluate(&position));
    }

    #[test]
    fn quiescence_sees_the_capture() {
        let mut position = Position::from_fen(HANGING_QUEEN).unwrap();
        let stand_pat = evaluate(&position);
        let quiet = searcher(1).quiescence(&mut position);
        assert!(quiet - stand_pat > 600, "{} vs {}", quiet, stand_pat);
    }

    #[test]
    fn tiny_heap_still_searches() {
        let mut s = Searcher::new(SearchConfig {
            depth: 4,
            heap: HeapConfig {
                capacity: 1024,
                max_sections: 2,
            },
        })
        .unwrap();
        let mut position = Position::from_fen(HANGING_QUEEN).unwrap();
        let result = s.search(&mut position, None);
        assert!(result.best_move.is_some());
    }
}
