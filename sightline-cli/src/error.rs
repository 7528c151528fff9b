//! Error types emitted by the Sightline CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sightline_core::{ImageSizeError, PipelineConfigError, PipelineError, ScorerConfigError};
use sightline_data::google::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the Sightline CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field}, {env} or {fallback})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
        fallback: &'static str,
    },
    /// The decay rate is not a finite positive number.
    #[error("invalid {field}: {source}")]
    InvalidDecayRate {
        field: &'static str,
        #[source]
        source: ScorerConfigError,
    },
    /// The image size is not of the form `WIDTHxHEIGHT`.
    #[error("invalid {field} {value:?}: {source}")]
    InvalidImageSize {
        field: &'static str,
        value: String,
        #[source]
        source: ImageSizeError,
    },
    /// The blocking label list contained no labels.
    #[error("{field} must name at least one label")]
    EmptyBlockingLabels { field: &'static str },
    /// A zero timeout would fail every request.
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
    /// Reading the address from standard input failed.
    #[error("failed to read address: {0}")]
    ReadAddress(#[source] std::io::Error),
    /// Constructing the Google service clients failed.
    #[error("failed to build service clients: {0}")]
    BuildServices(#[from] ProviderBuildError),
    /// The pipeline rejected its configuration.
    #[error(transparent)]
    PipelineConfig(#[from] PipelineConfigError),
    /// Scoring the address failed.
    #[error("visibility scoring failed: {0}")]
    Score(#[from] PipelineError),
    /// Writing the fetched street image failed.
    #[error("failed to save street image to {path:?}: {source}")]
    SaveImage {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    WriteReport(#[source] std::io::Error),
}
