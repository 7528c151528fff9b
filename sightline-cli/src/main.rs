//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use sightline_cli::CliError;

fn main() {
    match sightline_cli::run() {
        Ok(()) => {}
        // Help and version output are not failures.
        Err(CliError::ArgumentParsing(err)) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("sightline: {err}");
            std::process::exit(1);
        }
    }
}
