//! Post-game analysis of annotated game records.
//!
//! Games are replayed ply by ply against a search [`Oracle`], and a
//! [`Strategy`] decides what to write in front of each move:
//!
//! - [`BlunderCheck`] inserts a correction wherever the oracle finds a move
//!   scoring at least [`BLUNDER_THRESHOLD`] above the annotated favourite
//! - [`QuietFilter`] keeps only the comments of positions whose static,
//!   quiescence and search evaluations agree within [`QUIET_THRESHOLD`]
//!
//! Annotations use the `q=<eval>; p=[<move>:<weight>, ...]` comment
//! convention, parsed by [`Annotation`].
//!
//! # Example
//!
//! ```
//! use chess_analysis::{Pipeline, Replayer};
//! use chess_search::{SearchConfig, Searcher};
//!
//! let searcher = Searcher::new(SearchConfig { depth: 1, ..SearchConfig::default() })?;
//! let mut replayer = Replayer::new(searcher);
//! let mut output = Vec::new();
//! let record = "[Result \"*\"]\n\n1. e4 { q=0.3; p=[e4:60, d4:40] } e5 *\n";
//! Pipeline::Quiet.run(&mut replayer, record.as_bytes(), &mut output)?;
//! assert!(String::from_utf8(output)?.contains("{ q=0.3; p=[e4:60, d4:40] }"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod annotation;
pub mod blunder;
pub mod oracle;
pub mod pgn;
mod pipeline;
pub mod quiet;
pub mod replay;

pub use annotation::{parse_candidates, Annotation, Candidate, Correction};
pub use blunder::{check_annotation, Blunder, BlunderCheck, BLUNDER_THRESHOLD};
pub use oracle::{Oracle, SearchOutcome};
pub use pgn::{GameHeader, PgnError, PgnReader, PgnWriter};
pub use pipeline::{Pipeline, OUTPUT_FILE};
pub use quiet::{is_quiet, QuietFilter, QUIET_THRESHOLD};
pub use replay::{Ply, ReplayError, ReplaySummary, Replayer, Strategy};
