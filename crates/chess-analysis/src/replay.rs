//! The game replay driver shared by every pipeline.
//!
//! [`Replayer`] walks each game of a record ply by ply, keeping the position
//! in step with the movetext, and hands every ply to a [`Strategy`] which
//! decides what, if anything, to write in front of the next move.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chess_core::Move;
use chess_engine::{move_to_san, san_to_move, Position};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::oracle::Oracle;
use crate::pgn::{GameHeader, PgnError, PgnReader, PgnWriter, DEFAULT_MAX_TOKEN_LEN};

/// Errors that stop a replay run.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The input record does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input record could not be read.
    #[error(transparent)]
    Pgn(#[from] PgnError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The state a strategy works on at one ply.
pub struct Ply<'a, O> {
    /// Position before the next move is played.
    pub position: &'a mut Position,
    pub oracle: &'a mut O,
}

/// Per-position decision logic plugged into the [`Replayer`].
pub trait Strategy {
    /// Called before the first ply of every game.
    fn start_game(&mut self) {}

    /// Decides the output fragment to write before the next move.
    ///
    /// `comment` is the comment read in front of the next move, i.e. the one
    /// following `last_move`. The position must be handed back unchanged.
    fn decide<O: Oracle>(
        &mut self,
        ctx: &mut Ply<'_, O>,
        comment: &str,
        last_move: Option<Move>,
    ) -> Result<Option<String>, ReplayError>;

    /// Sees the next move, resolved, on the position it is played from.
    fn observe<O: Oracle>(&mut self, _ctx: &mut Ply<'_, O>, _next: Move) {}
}

/// Totals for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub games: usize,
    pub plies: usize,
    /// Fragments the strategy inserted.
    pub fragments: usize,
    /// Games whose replay stopped before their result token.
    pub truncated: usize,
}

/// Replays game records through a [`Strategy`], consulting an [`Oracle`].
pub struct Replayer<O> {
    oracle: O,
    max_token_len: usize,
}

fn setup_position(header: &GameHeader) -> Result<Position, chess_core::FenError> {
    match header.fen() {
        Some(fen) if header.is_setup() => Position::from_fen(fen),
        _ => Ok(Position::startpos()),
    }
}

impl<O: Oracle> Replayer<O> {
    pub fn new(oracle: O) -> Self {
        Replayer {
            oracle,
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }

    /// Sets the longest move token the reader accepts.
    pub fn with_max_token_len(mut self, max_token_len: usize) -> Self {
        self.max_token_len = max_token_len;
        self
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Replays every game in `input`, writing the filtered record to `output`.
    pub fn run<R, W, S>(
        &mut self,
        input: R,
        output: W,
        strategy: &mut S,
    ) -> Result<ReplaySummary, ReplayError>
    where
        R: BufRead,
        W: Write,
        S: Strategy,
    {
        let mut reader = PgnReader::new(input).with_max_token_len(self.max_token_len);
        let mut writer = PgnWriter::new(output);
        let mut summary = ReplaySummary::default();

        while let Some(header) = reader.read_header()? {
            summary.games += 1;
            writer.header(&header)?;
            strategy.start_game();

            let mut position = match setup_position(&header) {
                Ok(position) => position,
                Err(err) => {
                    warn!(game = summary.games, %err, "skipping game with unreadable setup");
                    summary.truncated += 1;
                    writer.result(header.result())?;
                    continue;
                }
            };

            let mut last_move = None;
            while let Some(token) = reader.next_move()? {
                let comment = reader.take_comment();
                let mut ctx = Ply {
                    position: &mut position,
                    oracle: &mut self.oracle,
                };
                if let Some(fragment) = strategy.decide(&mut ctx, &comment, last_move)? {
                    writer.raw(&fragment)?;
                    summary.fragments += 1;
                }

                let next = match san_to_move(&position, &token) {
                    Ok(m) => m,
                    Err(err) => {
                        warn!(
                            game = summary.games,
                            ply = position.ply(),
                            %token,
                            %err,
                            "stopping replay at unresolvable move"
                        );
                        summary.truncated += 1;
                        break;
                    }
                };

                writer.move_number(position.ply(), last_move.is_none())?;
                writer.san(&move_to_san(&position, next))?;

                let mut ctx = Ply {
                    position: &mut position,
                    oracle: &mut self.oracle,
                };
                strategy.observe(&mut ctx, next);

                position.apply(next);
                last_move = Some(next);
                summary.plies += 1;
            }

            debug!(game = summary.games, plies = position.ply(), "game replayed");
            writer.result(header.result())?;
        }

        writer.flush()?;
        info!(
            games = summary.games,
            plies = summary.plies,
            fragments = summary.fragments,
            truncated = summary.truncated,
            "replay finished"
        );
        Ok(summary)
    }

    /// Replays the record at `input` into a new file at `output`.
    ///
    /// A missing input is reported before `output` is created.
    pub fn run_file<S: Strategy>(
        &mut self,
        input: &Path,
        output: &Path,
        strategy: &mut S,
    ) -> Result<ReplaySummary, ReplayError> {
        let source = match File::open(input) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ReplayError::InputNotFound(input.to_path_buf()))
            }
            Err(err) => return Err(err.into()),
        };
        let sink = File::create(output)?;
        self.run(BufReader::new(source), BufWriter::new(sink), strategy)
    }
}
