//! Move annotations embedded in game comments.
//!
//! Annotated games carry comments of the form
//! `q=<eval>; p=[<move>:<weight>, <move>:<weight>, ...]`: an evaluation
//! string followed by weighted candidate moves for the position before the
//! move the comment follows.

use std::fmt;

use chess_core::Move;
use chess_engine::{san_to_move, Position};
use tracing::debug;

/// One `move:weight` entry of a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub san: String,
    pub weight: u32,
}

/// The evaluation text and the highest-weighted resolvable candidate of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotation {
    /// Text between the first `=` and the following `;`, verbatim.
    pub eval: String,
    /// Candidate with the strictly greatest weight; the first one wins ties.
    pub best: Option<Move>,
    pub best_weight: Option<u32>,
    /// Candidates whose move did not resolve in the position.
    pub skipped: usize,
}

/// Leading decimal digits of `text`, or 0 when there are none.
fn parse_weight(text: &str) -> u32 {
    text.trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, d| {
            acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
        })
}

/// Splits a comment into its evaluation text and the remainder after it.
fn split_eval(comment: &str) -> (&str, &str) {
    match comment.split_once('=') {
        Some((_, after)) => match after.split_once(';') {
            Some((eval, rest)) => (eval, rest),
            None => (after, ""),
        },
        None => ("", comment),
    }
}

/// Position-independent split of the candidate list in `text`.
///
/// Reads the first `[` … `]` group; entries are separated by commas or
/// whitespace and split on their first `:` into move and weight.
pub fn parse_candidates(text: &str) -> Vec<Candidate> {
    let Some((_, list)) = text.split_once('[') else {
        return Vec::new();
    };
    let list = list.split_once(']').map_or(list, |(inside, _)| inside);

    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once(':') {
            Some((san, weight)) => Candidate {
                san: san.to_string(),
                weight: parse_weight(weight),
            },
            None => Candidate {
                san: token.to_string(),
                weight: 0,
            },
        })
        .collect()
}

impl Annotation {
    /// Parses `comment` and resolves its candidates against `position`.
    pub fn parse(comment: &str, position: &Position) -> Self {
        let (eval, rest) = split_eval(comment);
        let mut annotation = Annotation {
            eval: eval.to_string(),
            ..Annotation::default()
        };

        for candidate in parse_candidates(rest) {
            let m = match san_to_move(position, &candidate.san) {
                Ok(m) => m,
                Err(e) => {
                    debug!(candidate = %candidate.san, error = %e, "skipping candidate");
                    annotation.skipped += 1;
                    continue;
                }
            };
            if annotation
                .best_weight
                .map_or(true, |best| candidate.weight > best)
            {
                annotation.best = Some(m);
                annotation.best_weight = Some(candidate.weight);
            }
        }

        annotation
    }
}

/// Corrective annotation naming a single candidate at full weight.
///
/// Renders as `{ q=<eval>; p=[<san>:100] }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub eval: String,
    pub san: String,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ q={}; p=[{}:100] }}", self.eval, self.san)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{MoveFlag, Square};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn picks_the_heaviest_opening_move() {
        let comment = "q=0.5003; p=[a3:18, b3:22, c3:7, d3:8, e3:7, f3:12, \
                       g3:12, h3:8, Na3:11, Nc3:19, Nf3:35, Nh3:7, a4:7, b4:31, \
                       c4:24, d4:62, e4:64, f4:9, g4:10, h4:9]";
        let annotation = Annotation::parse(comment, &Position::startpos());
        assert_eq!(annotation.eval, "0.5003");
        assert_eq!(
            annotation.best,
            Some(Move::new(sq("e2"), sq("e4"), MoveFlag::DoublePush))
        );
        assert_eq!(annotation.best_weight, Some(64));
        assert_eq!(annotation.skipped, 0);
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let annotation = Annotation::parse("q=0; p=[Nf3:30, d4:30, e4:12]", &Position::startpos());
        assert_eq!(annotation.best, Some(Move::normal(Square::G1, sq("f3"))));
    }

    #[test]
    fn order_is_not_assumed() {
        let annotation = Annotation::parse("q=1; p=[e4:1, d4:2, c4:3]", &Position::startpos());
        assert_eq!(
            annotation.best,
            Some(Move::new(sq("c2"), sq("c4"), MoveFlag::DoublePush))
        );
    }

    #[test]
    fn unresolvable_candidates_are_skipped() {
        // Qh5 is illegal from the start, so its weight never counts.
        let annotation = Annotation::parse("q=-0.2; p=[Qh5:99, zz:80, d4:5]", &Position::startpos());
        assert_eq!(annotation.skipped, 2);
        assert_eq!(annotation.best_weight, Some(5));
        assert_eq!(
            annotation.best,
            Some(Move::new(sq("d2"), sq("d4"), MoveFlag::DoublePush))
        );
    }

    #[test]
    fn no_resolvable_candidate_yields_none() {
        let annotation = Annotation::parse("q=0.1; p=[Ke2:10]", &Position::startpos());
        assert_eq!(annotation.eval, "0.1");
        assert_eq!(annotation.best, None);
        assert_eq!(annotation.best_weight, None);
        assert_eq!(annotation.skipped, 1);
    }

    #[test]
    fn missing_parts() {
        let plain = Annotation::parse("just a remark", &Position::startpos());
        assert_eq!(plain.eval, "");
        assert_eq!(plain.best, None);

        let eval_only = Annotation::parse("q=+1.25", &Position::startpos());
        assert_eq!(eval_only.eval, "+1.25");
        assert_eq!(eval_only.best, None);
    }

    #[test]
    fn candidate_weights() {
        let candidates = parse_candidates("p=[e4:64 d4:x, Nf3, c4:12abc]");
        let weights: Vec<(&str, u32)> = candidates
            .iter()
            .map(|c| (c.san.as_str(), c.weight))
            .collect();
        assert_eq!(
            weights,
            vec![("e4", 64), ("d4", 0), ("Nf3", 0), ("c4", 12)]
        );
        assert!(parse_candidates("no list here").is_empty());
    }

    #[test]
    fn correction_format() {
        let correction = Correction {
            eval: "0.31".to_string(),
            san: "Nxe5".to_string(),
        };
        assert_eq!(correction.to_string(), "{ q=0.31; p=[Nxe5:100] }");
    }
}
