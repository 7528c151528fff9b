//! Facade crate for the Sightline visibility engine.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the Google-backed collaborator implementations.

#![forbid(unsafe_code)]

pub use sightline_core::{
    BlockingLabels, BoundingBox, Collaborators, CoordinateSource, DEFAULT_DECAY_RATE,
    DetectedObject, GeoPoint, GeoPointError, Geocoder, ImageSize, ImageryProvider,
    ObjectDetector, ObstructionAggregator, ObstructionReport, PipelineConfig,
    PipelineConfigError, PipelineError, RoadSnapper, ScoringPipeline, ServiceError, StreetImage,
    VisibilityAssessment, VisibilityAssessor, VisibilityFactors, VisibilityScore,
    VisibilityScorer, geomath,
};

#[cfg(feature = "test-support")]
pub use sightline_core::test_support;

#[cfg(feature = "http")]
pub use sightline_data::google::{GoogleServices, GoogleServicesConfig, ProviderBuildError};
