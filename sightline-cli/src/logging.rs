//! Diagnostic output for the binary.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! bridges those records and writes them to stderr so stdout carries only the
//! report.

use tracing_subscriber::filter::LevelFilter;

pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        log::debug!("diagnostic subscriber already installed");
    }
}
