//! Sectioned move storage shared by every ply of a search.
//!
//! All moves generated during a search live in one fixed-capacity buffer.
//! Each ply opens a section at the current end of the buffer, fills it, and
//! closes it again when its frame returns, so the live moves always form a
//! stack of contiguous, non-overlapping ranges.

use chess_core::Move;
use chess_engine::MoveSink;
use thiserror::Error;

/// Errors reported by the fallible [`MoveHeap`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("cannot reserve a move heap of {capacity} moves and {max_sections} sections")]
    Allocation {
        capacity: usize,
        max_sections: usize,
    },

    #[error("move heap overflow: all {capacity} slots are in use")]
    Overflow { capacity: usize },

    #[error("section stack overflow: limit of {max_sections} sections reached")]
    SectionOverflow { max_sections: usize },
}

/// Sizing for a [`MoveHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
    /// Total number of moves the buffer can hold.
    pub capacity: usize,
    /// Maximum number of sections, the base section included.
    pub max_sections: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        HeapConfig {
            capacity: 16_384,
            max_sections: 64,
        }
    }
}

/// A move buffer partitioned into a stack of sections.
///
/// A freshly created heap has one empty base section, which is never popped.
#[derive(Debug)]
pub struct MoveHeap {
    moves: Vec<Move>,
    /// Start offset of every open section; the last one is active.
    sections: Vec<usize>,
    capacity: usize,
    max_sections: usize,
}

impl MoveHeap {
    /// Allocates a heap holding up to `capacity` moves in `max_sections` sections.
    pub fn new(capacity: usize, max_sections: usize) -> Result<Self, HeapError> {
        let allocation = HeapError::Allocation {
            capacity,
            max_sections,
        };
        if max_sections == 0 {
            return Err(allocation);
        }

        let mut moves = Vec::new();
        moves
            .try_reserve_exact(capacity)
            .map_err(|_| allocation.clone())?;
        let mut sections = Vec::new();
        sections
            .try_reserve_exact(max_sections)
            .map_err(|_| allocation)?;
        sections.push(0);

        Ok(MoveHeap {
            moves,
            sections,
            capacity,
            max_sections,
        })
    }

    /// Allocates a heap sized by `config`.
    pub fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        Self::new(config.capacity, config.max_sections)
    }

    /// Opens a new, empty section at the end of the live moves.
    pub fn try_push_section(&mut self) -> Result<(), HeapError> {
        if self.sections.len() >= self.max_sections {
            return Err(HeapError::SectionOverflow {
                max_sections: self.max_sections,
            });
        }
        self.sections.push(self.moves.len());
        Ok(())
    }

    /// Opens a new, empty section.
    ///
    /// # Panics
    /// Panics if the section limit is reached.
    pub fn push_section(&mut self) {
        if let Err(e) = self.try_push_section() {
            panic!("{}", e);
        }
    }

    /// Closes the active section and releases its moves.
    pub fn pop_section(&mut self) {
        debug_assert!(self.sections.len() > 1, "the base section is never popped");
        if self.sections.len() > 1 {
            if let Some(start) = self.sections.pop() {
                self.moves.truncate(start);
            }
        }
    }

    /// Appends a move to the active section.
    pub fn try_push(&mut self, m: Move) -> Result<(), HeapError> {
        if self.moves.len() >= self.capacity {
            return Err(HeapError::Overflow {
                capacity: self.capacity,
            });
        }
        self.moves.push(m);
        Ok(())
    }

    /// Appends a move to the active section.
    ///
    /// # Panics
    /// Panics with "move heap overflow" once the capacity is exhausted.
    pub fn push(&mut self, m: Move) {
        if self.try_push(m).is_err() {
            panic!("move heap overflow (capacity {})", self.capacity);
        }
    }

    #[inline]
    fn active_start(&self) -> usize {
        self.sections.last().copied().unwrap_or(0)
    }

    /// Moves of the active section.
    #[inline]
    pub fn current(&self) -> &[Move] {
        &self.moves[self.active_start()..]
    }

    /// Moves of the active section, for in-place ordering.
    #[inline]
    pub fn current_mut(&mut self) -> &mut [Move] {
        let start = self.active_start();
        &mut self.moves[start..]
    }

    /// Number of sections open above the base section.
    #[inline]
    pub fn depth(&self) -> usize {
        self.sections.len() - 1
    }

    /// Total number of live moves across all sections.
    #[inline]
    pub fn live(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn max_sections(&self) -> usize {
        self.max_sections
    }

    /// Returns true if another section can be opened.
    #[inline]
    pub fn can_push_section(&self) -> bool {
        self.sections.len() < self.max_sections
    }

    /// Drops every section but the base and empties it.
    pub fn clear(&mut self) {
        self.moves.clear();
        self.sections.truncate(1);
    }
}

impl MoveSink for MoveHeap {
    #[inline]
    fn push_move(&mut self, m: Move) {
        self.push(m);
    }
}
