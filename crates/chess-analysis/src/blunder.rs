//! Blunder detection.
//!
//! Each annotated move names the candidate its annotator liked best. The
//! oracle searches the position the candidates were given for; when it finds
//! a different move scoring at least [`BLUNDER_THRESHOLD`] above the
//! annotated one, a corrective annotation naming the oracle's move is
//! inserted after the comment.

use chess_core::Move;
use chess_engine::move_to_san;
use tracing::{debug, info};

use crate::annotation::{Annotation, Correction};
use crate::oracle::Oracle;
use crate::replay::{Ply, ReplayError, Strategy};

/// Smallest score gap, in centipawns, flagged as a blunder.
pub const BLUNDER_THRESHOLD: i32 = 1500;

/// A flagged annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blunder {
    pub annotated: Move,
    pub best: Move,
    /// Oracle score of `best` minus that of `annotated`.
    pub gap: i32,
}

/// [`Strategy`] inserting corrections for blundered annotations.
#[derive(Debug, Default)]
pub struct BlunderCheck {
    found: usize,
}

impl BlunderCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blunders flagged so far.
    pub fn found(&self) -> usize {
        self.found
    }
}

/// Compares the annotated move against the oracle's choice.
///
/// The position must be the one the annotation was written for.
pub fn check_annotation<O: Oracle>(
    ctx: &mut Ply<'_, O>,
    annotation: &Annotation,
) -> Option<Blunder> {
    let annotated = annotation.best?;
    let outcome = ctx.oracle.search(ctx.position, Some(annotated));
    let best = outcome.best_move?;
    let hint_score = outcome.hint_score?;
    let gap = outcome.score.saturating_sub(hint_score);

    debug!(%annotated, %best, gap, "annotation checked");
    (best != annotated && gap >= BLUNDER_THRESHOLD).then_some(Blunder {
        annotated,
        best,
        gap,
    })
}

impl Strategy for BlunderCheck {
    fn decide<O: Oracle>(
        &mut self,
        ctx: &mut Ply<'_, O>,
        comment: &str,
        last_move: Option<Move>,
    ) -> Result<Option<String>, ReplayError> {
        let Some(last) = last_move else {
            return Ok(None);
        };
        if comment.trim().is_empty() {
            return Ok(None);
        }

        ctx.position.unapply(last);
        let annotation = Annotation::parse(comment, ctx.position);
        let fragment = check_annotation(ctx, &annotation).map(|blunder| {
            let position = &*ctx.position;
            let correction = Correction {
                eval: annotation.eval.clone(),
                san: move_to_san(position, blunder.best),
            };
            info!(
                fen = %position.to_fen(),
                annotated = %move_to_san(position, blunder.annotated),
                best = %correction.san,
                gap = blunder.gap,
                "blunder\n{}",
                position
            );
            format!("{} ", correction)
        });
        ctx.position.apply(last);

        if fragment.is_some() {
            self.found += 1;
        }
        Ok(fragment)
    }
}
