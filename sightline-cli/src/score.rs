//! Score command implementation for the Sightline CLI.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sightline_core::{
    BlockingLabels, Collaborators, ImageSize, PipelineConfig, ScoringPipeline,
    VisibilityAssessment, VisibilityAssessor, VisibilityScorer,
};
use sightline_data::google::{GoogleServices, GoogleServicesConfig};

use crate::{
    ARG_SCORE_API_KEY, ARG_SCORE_BLOCKING_LABELS, ARG_SCORE_DECAY_RATE, ARG_SCORE_IMAGE_SIZE,
    ARG_SCORE_SAVE_IMAGE, ARG_SCORE_TIMEOUT_SECS, CliError, ENV_GOOGLE_API_KEY, ENV_SCORE_API_KEY,
    fs,
};

const ADDRESS_PROMPT: &str = "Enter the address: ";

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Geocode an address, snap it to the nearest road, fetch the \
                 street-level image facing it and detect objects in that \
                 image. Distance, viewing angle and obstruction combine into \
                 a visibility score between 0 and 1. The address is read \
                 from standard input when it is not given as an argument.",
    about = "Score the street visibility of an address"
)]
#[ortho_config(prefix = "SIGHTLINE")]
pub(crate) struct ScoreArgs {
    /// Street address to assess.
    #[arg(value_name = "address")]
    #[serde(default)]
    pub(crate) address: Option<String>,
    /// Google API key used for every service call.
    #[arg(long = ARG_SCORE_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Exponential distance decay rate per kilometre (default 0.1).
    #[arg(long = ARG_SCORE_DECAY_RATE, value_name = "rate")]
    #[serde(default)]
    pub(crate) decay_rate: Option<f64>,
    /// Comma-separated object labels that block the view.
    #[arg(long = ARG_SCORE_BLOCKING_LABELS, value_name = "labels")]
    #[serde(default)]
    pub(crate) blocking_labels: Option<String>,
    /// Street-level image size as `WIDTHxHEIGHT` (default 600x300).
    #[arg(long = ARG_SCORE_IMAGE_SIZE, value_name = "size")]
    #[serde(default)]
    pub(crate) image_size: Option<String>,
    /// Per-request timeout in seconds (default 30).
    #[arg(long = ARG_SCORE_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Write the fetched street-level image to this path.
    #[arg(long = ARG_SCORE_SAVE_IMAGE, value_name = "path")]
    #[serde(default)]
    pub(crate) save_image: Option<Utf8PathBuf>,
}

impl ScoreArgs {
    /// Merge configuration layers and resolve them, using `fallback_api_key`
    /// when no layer supplies a key.
    pub(crate) fn into_config(
        self,
        fallback_api_key: Option<String>,
    ) -> Result<ScoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ScoreConfig::resolve(merged, fallback_api_key)
    }
}

/// Resolved `score` command configuration.
#[derive(Clone, PartialEq)]
pub(crate) struct ScoreConfig {
    /// Address to score; prompted for when absent.
    pub(crate) address: Option<String>,
    /// Google API key.
    pub(crate) api_key: String,
    /// Labels, decay rate and image size handed to the pipeline.
    pub(crate) pipeline: PipelineConfig,
    /// Per-request timeout; the provider default applies when absent.
    pub(crate) timeout: Option<Duration>,
    /// Destination for the fetched street-level image.
    pub(crate) save_image: Option<Utf8PathBuf>,
}

impl std::fmt::Debug for ScoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreConfig")
            .field("address", &self.address)
            .field("api_key", &"<redacted>")
            .field("pipeline", &self.pipeline)
            .field("timeout", &self.timeout)
            .field("save_image", &self.save_image)
            .finish()
    }
}

impl TryFrom<ScoreArgs> for ScoreConfig {
    type Error = CliError;

    fn try_from(args: ScoreArgs) -> Result<Self, Self::Error> {
        Self::resolve(args, None)
    }
}

impl ScoreConfig {
    /// Validate merged arguments. A blank key counts as missing, in which case
    /// `fallback_api_key` (normally `GOOGLE_API_KEY`) is tried.
    pub(crate) fn resolve(
        args: ScoreArgs,
        fallback_api_key: Option<String>,
    ) -> Result<Self, CliError> {
        let api_key = args
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| fallback_api_key.filter(|key| !key.trim().is_empty()))
            .ok_or(CliError::MissingArgument {
                field: ARG_SCORE_API_KEY,
                env: ENV_SCORE_API_KEY,
                fallback: ENV_GOOGLE_API_KEY,
            })?;

        let mut pipeline = PipelineConfig::default();
        if let Some(rate) = args.decay_rate {
            VisibilityScorer::new(rate).map_err(|source| CliError::InvalidDecayRate {
                field: ARG_SCORE_DECAY_RATE,
                source,
            })?;
            pipeline = pipeline.with_decay_rate(rate);
        }
        if let Some(labels) = args.blocking_labels.as_deref() {
            pipeline = pipeline.with_blocking_labels(parse_blocking_labels(labels)?);
        }
        if let Some(size) = args.image_size {
            let parsed = size
                .parse::<ImageSize>()
                .map_err(|source| CliError::InvalidImageSize {
                    field: ARG_SCORE_IMAGE_SIZE,
                    value: size.clone(),
                    source,
                })?;
            pipeline = pipeline.with_image_size(parsed);
        }

        let timeout = match args.timeout_secs {
            Some(0) => {
                return Err(CliError::ZeroTimeout {
                    field: ARG_SCORE_TIMEOUT_SECS,
                });
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            address: args.address,
            api_key,
            pipeline,
            timeout,
            save_image: args.save_image,
        })
    }
}

fn parse_blocking_labels(raw: &str) -> Result<BlockingLabels, CliError> {
    let labels: BlockingLabels = raw
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .collect();
    if labels.is_empty() {
        return Err(CliError::EmptyBlockingLabels {
            field: ARG_SCORE_BLOCKING_LABELS,
        });
    }
    Ok(labels)
}

/// Builds the assessor for the current score invocation.
pub(super) trait ScoreAssessorBuilder {
    fn build(&self, config: &ScoreConfig) -> Result<Box<dyn VisibilityAssessor>, CliError>;
}

/// Wires the pipeline to the Google Geocoding, Roads, Street View and Vision
/// APIs through one shared client.
pub(super) struct GoogleAssessorBuilder;

impl ScoreAssessorBuilder for GoogleAssessorBuilder {
    fn build(&self, config: &ScoreConfig) -> Result<Box<dyn VisibilityAssessor>, CliError> {
        let mut services_config = GoogleServicesConfig::new(config.api_key.as_str());
        if let Some(timeout) = config.timeout {
            services_config = services_config.with_timeout(timeout);
        }
        let services = Arc::new(GoogleServices::with_config(services_config)?);
        let pipeline =
            ScoringPipeline::new(Collaborators::shared(services), config.pipeline.clone())?;
        Ok(Box::new(pipeline))
    }
}

pub(super) fn run_score(args: ScoreArgs) -> Result<(), CliError> {
    let fallback_api_key = std::env::var(ENV_GOOGLE_API_KEY).ok();
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    run_score_with(
        args,
        fallback_api_key,
        &GoogleAssessorBuilder,
        &mut stdin,
        &mut stdout,
    )
}

pub(super) fn run_score_with(
    args: ScoreArgs,
    fallback_api_key: Option<String>,
    builder: &dyn ScoreAssessorBuilder,
    input: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config(fallback_api_key)?;
    debug!("resolved score configuration: {config:?}");
    let assessor = builder.build(&config)?;
    let address = match config.address.as_deref() {
        Some(address) => address.to_owned(),
        None => prompt_for_address(input, writer)?,
    };

    let assessment = assessor.assess(&address)?;
    write_report(writer, &assessment, &config.pipeline.blocking_labels)
        .map_err(CliError::WriteReport)?;

    if let Some(path) = &config.save_image {
        fs::write_creating_parents(path, &assessment.image.bytes).map_err(|source| {
            CliError::SaveImage {
                path: path.clone(),
                source,
            }
        })?;
        writeln!(writer, "Street image saved to {path}").map_err(CliError::WriteReport)?;
    }
    Ok(())
}

/// Ask for an address on `writer` and read one line from `input`.
///
/// End of input yields an empty address, which the pipeline rejects.
fn prompt_for_address(input: &mut dyn BufRead, writer: &mut dyn Write) -> Result<String, CliError> {
    writer
        .write_all(ADDRESS_PROMPT.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(CliError::WriteReport)?;
    let mut line = String::new();
    input.read_line(&mut line).map_err(CliError::ReadAddress)?;
    Ok(line.trim().to_owned())
}

fn write_report(
    writer: &mut dyn Write,
    assessment: &VisibilityAssessment,
    blocking: &BlockingLabels,
) -> std::io::Result<()> {
    writeln!(writer, "Address: {}", assessment.address)?;
    writeln!(writer, "Coordinates: {}", assessment.location)?;
    writeln!(writer, "Nearest road: {}", assessment.road)?;
    writeln!(writer, "Distance to road: {:.3} km", assessment.distance_km)?;
    writeln!(writer, "Bearing to road: {:.1}°", assessment.bearing_degrees)?;

    writeln!(writer, "Detected objects: {}", assessment.detections.len())?;
    for object in &assessment.detections {
        let marker = if blocking.contains(object.label()) {
            ", blocking"
        } else {
            ""
        };
        writeln!(
            writer,
            "  {} (confidence {:.2}{marker})",
            object.label(),
            object.confidence()
        )?;
    }

    writeln!(
        writer,
        "Obstruction: {:.1}%",
        assessment.obstruction.blocked_percentage()
    )?;
    let factors = &assessment.factors;
    writeln!(
        writer,
        "Factors: distance {:.3}, angle {:.3}, obstruction {:.3}",
        factors.distance, factors.angle, factors.obstruction
    )?;
    writeln!(writer, "Visibility score: {:.3}", assessment.score)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ScoreConfig, CliError> {
    let merged = ScoreArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ScoreConfig::try_from(merged)
}

#[cfg(test)]
pub(crate) fn write_report_for_test(
    assessment: &VisibilityAssessment,
    blocking: &BlockingLabels,
) -> String {
    let mut buffer = Vec::new();
    write_report(&mut buffer, assessment, blocking).expect("writing to a Vec cannot fail");
    String::from_utf8(buffer).expect("report is UTF-8")
}
