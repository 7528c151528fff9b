//! Command-line interface for the Sightline visibility engine.
//!
//! The `score` subcommand resolves its configuration from CLI flags,
//! `SIGHTLINE_CMDS_SCORE_*` environment variables and configuration files
//! (with `GOOGLE_API_KEY` as a last resort for the key), runs the scoring
//! pipeline against the Google services, and prints every
//! intermediate value alongside the final score.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod logging;
mod score;

pub use error::CliError;
use score::{ScoreArgs, run_score};

const ARG_SCORE_API_KEY: &str = "api-key";
const ARG_SCORE_DECAY_RATE: &str = "decay-rate";
const ARG_SCORE_BLOCKING_LABELS: &str = "blocking-labels";
const ARG_SCORE_IMAGE_SIZE: &str = "image-size";
const ARG_SCORE_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_SCORE_SAVE_IMAGE: &str = "save-image";
const ENV_SCORE_API_KEY: &str = "SIGHTLINE_CMDS_SCORE_API_KEY";
const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Run the Sightline CLI with the current process arguments and environment.
///
/// Variables from a `.env` file in the working directory (or its parents)
/// are loaded first; variables already set in the process win.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    logging::init(cli.verbose);
    load_dotenv();
    match cli.command {
        Command::Score(args) => run_score(args),
    }
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => log::warn!("ignoring unreadable .env file: {err}"),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sightline",
    about = "Estimate how visible a building is from the street",
    version
)]
struct Cli {
    /// Log pipeline progress to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score the street visibility of an address.
    Score(ScoreArgs),
}

#[cfg(test)]
mod tests;
