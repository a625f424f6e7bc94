//! The pipelines offered on the command line.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::info;

use crate::blunder::BlunderCheck;
use crate::oracle::Oracle;
use crate::quiet::QuietFilter;
use crate::replay::{ReplayError, ReplaySummary, Replayer};

/// File every pipeline writes its record to.
pub const OUTPUT_FILE: &str = "filtered.pgn";

/// A replay strategy selected at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Insert corrections where the annotated move loses heavily.
    Blunders,
    /// Keep only the comments of quiet positions.
    Quiet,
}

impl Pipeline {
    pub fn name(self) -> &'static str {
        match self {
            Pipeline::Blunders => "blunders",
            Pipeline::Quiet => "quiet",
        }
    }

    /// Runs the pipeline over an in-memory or streamed record.
    pub fn run<O, R, W>(
        self,
        replayer: &mut Replayer<O>,
        input: R,
        output: W,
    ) -> Result<ReplaySummary, ReplayError>
    where
        O: Oracle,
        R: BufRead,
        W: Write,
    {
        match self {
            Pipeline::Blunders => {
                let mut check = BlunderCheck::new();
                let summary = replayer.run(input, output, &mut check)?;
                info!(blunders = check.found(), "blunder check finished");
                Ok(summary)
            }
            Pipeline::Quiet => replayer.run(input, output, &mut QuietFilter::new()),
        }
    }

    /// Runs the pipeline from the record at `input` into a new file at `output`.
    pub fn run_file<O: Oracle>(
        self,
        replayer: &mut Replayer<O>,
        input: &Path,
        output: &Path,
    ) -> Result<ReplaySummary, ReplayError> {
        info!(pipeline = self.name(), input = %input.display(), "starting");
        match self {
            Pipeline::Blunders => {
                let mut check = BlunderCheck::new();
                let summary = replayer.run_file(input, output, &mut check)?;
                info!(blunders = check.found(), "blunder check finished");
                Ok(summary)
            }
            Pipeline::Quiet => replayer.run_file(input, output, &mut QuietFilter::new()),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
