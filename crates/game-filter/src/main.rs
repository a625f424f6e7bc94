//! Game Filter - post-game analysis of annotated game records.
//!
//! Replays every game of a record and writes a filtered copy to
//! `filtered.pgn` in the current directory.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chess_analysis::{Pipeline, ReplayError, Replayer, OUTPUT_FILE};
use chess_search::Searcher;
use clap::{Parser, Subcommand};
use config::FilterConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "game-filter")]
#[command(about = "Flags blunders and tactical positions in annotated games")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "filter.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert corrections where the annotated move loses heavily
    Blunders {
        /// Annotated game record
        input: PathBuf,
    },
    /// Keep only the comments of quiet positions
    Quiet {
        /// Annotated game record
        input: PathBuf,
    },
}

impl Commands {
    fn pipeline(&self) -> (Pipeline, &Path) {
        match self {
            Commands::Blunders { input } => (Pipeline::Blunders, input.as_path()),
            Commands::Quiet { input } => (Pipeline::Quiet, input.as_path()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = FilterConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let searcher = Searcher::new(config.search_config()).context("allocating move heap")?;
    let mut replayer = Replayer::new(searcher).with_max_token_len(config.reader.max_token_len);

    let (pipeline, input) = cli.command.pipeline();
    match pipeline.run_file(&mut replayer, input, Path::new(OUTPUT_FILE)) {
        Ok(summary) => {
            tracing::info!(
                games = summary.games,
                truncated = summary.truncated,
                "Wrote {}",
                OUTPUT_FILE
            );
            Ok(())
        }
        Err(ReplayError::InputNotFound(path)) => {
            tracing::error!("Input file not found: {}", path.display());
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("{} pipeline failed", pipeline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["game-filter", "blunders", "games.pgn"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("filter.toml"));
        let (pipeline, input) = cli.command.pipeline();
        assert_eq!(pipeline, Pipeline::Blunders);
        assert_eq!(input, Path::new("games.pgn"));

        let cli =
            Cli::try_parse_from(["game-filter", "quiet", "--config", "alt.toml", "in.pgn"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert_eq!(cli.command.pipeline().0, Pipeline::Quiet);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["game-filter", "quiet"]).is_err());
        assert!(Cli::try_parse_from(["game-filter"]).is_err());
    }
}
