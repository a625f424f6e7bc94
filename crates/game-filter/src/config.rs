//! Configuration file loading for the game filter.
//!
//! Settings come from `filter.toml` in the current directory unless another
//! path is given on the command line. Every field is optional.

use std::path::Path;

use chess_search::{HeapConfig, SearchConfig};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Search settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SearchSection {
    /// Iterative deepening stops at this depth. Defaults to 3.
    pub depth: u32,
}

impl Default for SearchSection {
    fn default() -> Self {
        SearchSection {
            depth: SearchConfig::default().depth,
        }
    }
}

/// Move heap sizing.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HeapSection {
    pub capacity: usize,
    pub max_sections: usize,
}

impl Default for HeapSection {
    fn default() -> Self {
        let heap = HeapConfig::default();
        HeapSection {
            capacity: heap.capacity,
            max_sections: heap.max_sections,
        }
    }
}

/// Game record reader settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderSection {
    /// Longest move token accepted before the run is aborted.
    pub max_token_len: usize,
}

impl Default for ReaderSection {
    fn default() -> Self {
        ReaderSection {
            max_token_len: chess_analysis::pgn::DEFAULT_MAX_TOKEN_LEN,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    pub search: SearchSection,
    pub heap: HeapSection,
    pub reader: ReaderSection,
}

impl FilterConfig {
    /// Loads the configuration at `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.search.depth,
            heap: HeapConfig {
                capacity: self.heap.capacity,
                max_sections: self.heap.max_sections,
            },
        }
    }
}
