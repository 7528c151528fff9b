//! Focused unit tests covering score configuration, prompting and reporting.

use super::helpers::{
    ADDRESS, StubAssessorBuilder, reference_assessment, reference_collaborators,
};
use super::*;
use crate::score::{
    ScoreConfig, config_from_layers_for_test, run_score_with, write_report_for_test,
};
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use sightline_core::{
    BlockingLabels, DEFAULT_DECAY_RATE, ImageSize, PipelineError, ScorerConfigError,
};
use std::io::Cursor;
use std::time::Duration;

fn args_with_key() -> ScoreArgs {
    ScoreArgs {
        api_key: Some("test-key".to_owned()),
        ..ScoreArgs::default()
    }
}

#[rstest]
fn converting_score_without_api_key_errors() {
    let args = ScoreArgs {
        address: Some(ADDRESS.to_owned()),
        ..ScoreArgs::default()
    };

    let err = ScoreConfig::try_from(args).expect_err("missing key should error");
    match err {
        CliError::MissingArgument {
            field,
            env,
            fallback,
        } => {
            assert_eq!(field, ARG_SCORE_API_KEY);
            assert_eq!(env, ENV_SCORE_API_KEY);
            assert_eq!(fallback, ENV_GOOGLE_API_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn blank_api_key_counts_as_missing() {
    let args = ScoreArgs {
        api_key: Some("   ".to_owned()),
        ..ScoreArgs::default()
    };

    let err = ScoreConfig::try_from(args).expect_err("blank key should error");
    assert!(matches!(err, CliError::MissingArgument { .. }), "got {err:?}");
}

#[rstest]
fn missing_argument_message_names_flag_and_variable() {
    let err = CliError::MissingArgument {
        field: ARG_SCORE_API_KEY,
        env: ENV_SCORE_API_KEY,
        fallback: ENV_GOOGLE_API_KEY,
    };
    assert_eq!(
        err.to_string(),
        "missing api-key (set --api-key, SIGHTLINE_CMDS_SCORE_API_KEY or GOOGLE_API_KEY)"
    );
}

#[rstest]
#[case::missing(None)]
#[case::blank(Some("  "))]
fn google_api_key_fills_a_missing_layered_key(#[case] layered: Option<&str>) {
    let args = ScoreArgs {
        api_key: layered.map(str::to_owned),
        ..ScoreArgs::default()
    };

    let config =
        ScoreConfig::resolve(args, Some("shared-key".to_owned())).expect("config should build");
    assert_eq!(config.api_key, "shared-key");
}

#[rstest]
fn layered_key_wins_over_google_api_key() {
    let config = ScoreConfig::resolve(args_with_key(), Some("shared-key".to_owned()))
        .expect("config should build");
    assert_eq!(config.api_key, "test-key");
}

#[rstest]
fn blank_google_api_key_is_still_missing() {
    let err = ScoreConfig::resolve(ScoreArgs::default(), Some(String::new()))
        .expect_err("blank fallback should error");
    assert!(matches!(err, CliError::MissingArgument { .. }), "got {err:?}");
}

#[rstest]
fn defaults_apply_when_only_the_key_is_given() {
    let config = ScoreConfig::try_from(args_with_key()).expect("config should build");

    assert_eq!(config.address, None);
    assert_eq!(config.api_key, "test-key");
    assert_eq!(config.pipeline.decay_rate, DEFAULT_DECAY_RATE);
    assert_eq!(config.pipeline.blocking_labels, BlockingLabels::default());
    assert_eq!(config.pipeline.image_size, ImageSize::default());
    assert_eq!(config.timeout, None);
    assert_eq!(config.save_image, None);
}

#[rstest]
fn blocking_labels_are_split_on_commas() {
    let args = ScoreArgs {
        blocking_labels: Some("Bus, lamp post,,".to_owned()),
        ..args_with_key()
    };

    let config = ScoreConfig::try_from(args).expect("config should build");
    let labels = &config.pipeline.blocking_labels;
    assert_eq!(labels.len(), 2);
    assert!(labels.contains("bus"));
    assert!(labels.contains("Lamp Post"));
    assert!(!labels.contains("car"));
}

#[rstest]
#[case::only_commas(",, ,")]
#[case::empty("")]
fn empty_blocking_label_lists_are_rejected(#[case] raw: &str) {
    let args = ScoreArgs {
        blocking_labels: Some(raw.to_owned()),
        ..args_with_key()
    };

    let err = ScoreConfig::try_from(args).expect_err("empty labels should error");
    match err {
        CliError::EmptyBlockingLabels { field } => assert_eq!(field, ARG_SCORE_BLOCKING_LABELS),
        other => panic!("expected EmptyBlockingLabels, found {other:?}"),
    }
}

#[rstest]
fn image_size_is_parsed() {
    let args = ScoreArgs {
        image_size: Some("640x320".to_owned()),
        ..args_with_key()
    };

    let config = ScoreConfig::try_from(args).expect("config should build");
    assert_eq!(
        config.pipeline.image_size,
        ImageSize::new(640, 320).expect("valid size")
    );
}

#[rstest]
#[case::not_dimensions("wide")]
#[case::zero_width("0x300")]
fn malformed_image_sizes_are_rejected(#[case] raw: &str) {
    let args = ScoreArgs {
        image_size: Some(raw.to_owned()),
        ..args_with_key()
    };

    let err = ScoreConfig::try_from(args).expect_err("bad size should error");
    match err {
        CliError::InvalidImageSize { field, value, .. } => {
            assert_eq!(field, ARG_SCORE_IMAGE_SIZE);
            assert_eq!(value, raw);
        }
        other => panic!("expected InvalidImageSize, found {other:?}"),
    }
}

#[rstest]
#[case::zero(0.0)]
#[case::negative(-0.5)]
#[case::nan(f64::NAN)]
fn invalid_decay_rates_are_rejected(#[case] rate: f64) {
    let args = ScoreArgs {
        decay_rate: Some(rate),
        ..args_with_key()
    };

    let err = ScoreConfig::try_from(args).expect_err("bad rate should error");
    assert!(
        matches!(
            err,
            CliError::InvalidDecayRate {
                field: ARG_SCORE_DECAY_RATE,
                source: ScorerConfigError::InvalidDecayRate { .. }
            }
        ),
        "got {err:?}"
    );
}

#[rstest]
fn zero_timeout_is_rejected() {
    let args = ScoreArgs {
        timeout_secs: Some(0),
        ..args_with_key()
    };

    let err = ScoreConfig::try_from(args).expect_err("zero timeout should error");
    assert!(matches!(err, CliError::ZeroTimeout { .. }), "got {err:?}");
}

#[rstest]
fn config_debug_redacts_the_api_key() {
    let config = ScoreConfig::try_from(args_with_key()).expect("config should build");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("test-key"), "key leaked: {rendered}");
    assert!(rendered.contains("<redacted>"));
}

#[rstest]
fn invalid_config_layers_surface_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "timeout_secs": "soon" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honour_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "api_key": "from-file",
            "decay_rate": 0.3,
            "image_size": "800x400",
        }),
        None,
    );
    composer.push_environment(json!({
        "api_key": "from-env",
        "timeout_secs": 10,
    }));
    composer.push_cli(json!({
        "decay_rate": 0.5,
        "address": ADDRESS,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.api_key, "from-env");
    assert_eq!(config.pipeline.decay_rate, 0.5);
    assert_eq!(
        config.pipeline.image_size,
        ImageSize::new(800, 400).expect("valid size")
    );
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    assert_eq!(config.address.as_deref(), Some(ADDRESS));
}

#[rstest]
fn verbose_flag_is_global() {
    let cli = Cli::try_parse_from(["sightline", "score", ADDRESS, "--api-key", "k", "-v"])
        .expect("arguments should parse");

    assert!(cli.verbose);
    match cli.command {
        Command::Score(args) => {
            assert_eq!(args.address.as_deref(), Some(ADDRESS));
            assert_eq!(args.api_key.as_deref(), Some("k"));
        }
    }
}

#[rstest]
fn report_lists_every_intermediate_value() {
    let report = write_report_for_test(&reference_assessment(), &BlockingLabels::default());

    let expected = "\
Address: North Ave NW, Atlanta, GA
Coordinates: 33.7756, -84.3963
Nearest road: 33.7758, -84.3965
Distance to road: 0.029 km
Bearing to road: 320.3°
Detected objects: 2
  car (confidence 0.90, blocking)
  building (confidence 0.90)
Obstruction: 13.8%
Factors: distance 0.997, angle 0.769, obstruction 0.862
Visibility score: 0.661
";
    assert_eq!(report, expected);
}

#[rstest]
fn missing_address_is_read_from_the_prompt() {
    let builder = StubAssessorBuilder::new(reference_collaborators());
    let mut input = Cursor::new(format!("  {ADDRESS}  \n").into_bytes());
    let mut output = Vec::new();

    run_score_with(args_with_key(), None, &builder, &mut input, &mut output)
        .expect("score should succeed");

    let stdout = String::from_utf8(output).expect("stdout utf-8");
    assert!(stdout.starts_with("Enter the address: Address: North Ave NW, Atlanta, GA\n"));
    assert!(stdout.ends_with("Visibility score: 0.661\n"));
}

#[rstest]
fn empty_prompt_input_is_an_unknown_address() {
    let builder = StubAssessorBuilder::new(reference_collaborators());
    let mut input = Cursor::new(Vec::new());
    let mut output = Vec::new();

    let err = run_score_with(args_with_key(), None, &builder, &mut input, &mut output)
        .expect_err("empty address should fail");
    match err {
        CliError::Score(PipelineError::AddressNotFound { source: None, .. }) => {}
        other => panic!("expected AddressNotFound, found {other:?}"),
    }
}

#[rstest]
fn builder_receives_the_resolved_config() {
    let builder = StubAssessorBuilder::new(reference_collaborators());
    let args = ScoreArgs {
        address: Some(ADDRESS.to_owned()),
        timeout_secs: Some(5),
        blocking_labels: Some("building".to_owned()),
        ..args_with_key()
    };
    let mut output = Vec::new();

    run_score_with(args, None, &builder, &mut Cursor::new(Vec::new()), &mut output)
        .expect("score should succeed");

    let config = builder.built_with().expect("builder was called");
    assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    let stdout = String::from_utf8(output).expect("stdout utf-8");
    assert!(stdout.contains("  building (confidence 0.90, blocking)\n"));
    assert!(stdout.contains("  car (confidence 0.90)\n"));
}
