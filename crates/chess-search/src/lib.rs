//! Search support for game analysis.
//!
//! - [`MoveHeap`]: the sectioned move buffer every search ply allocates from
//! - [`evaluate`]: static evaluation
//! - [`Searcher`]: quiescence and fixed-depth iterative-deepening search

mod eval;
pub mod heap;
mod search;

pub use eval::evaluate;
pub use heap::{HeapConfig, HeapError, MoveHeap};
pub use search::{SearchConfig, SearchResult, Searcher, MATE};
