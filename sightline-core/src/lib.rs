//! Core domain types for the Sightline engine.
//!
//! The crate scores how visible an address is from the nearest drivable
//! road. Pure components ([`geomath`], [`ObstructionAggregator`],
//! [`VisibilityScorer`]) do the arithmetic; collaborator traits in
//! [`services`] describe the remote lookups; [`ScoringPipeline`] ties them
//! together for a single address.
//!
//! Constructors validate their input and return `Result` so invalid values
//! never reach the scoring arithmetic.

#![forbid(unsafe_code)]

pub mod geomath;
mod obstruction;
mod pipeline;
mod point;
pub mod services;
mod visibility;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use obstruction::{
    BlockingLabels, BoundingBox, BoundingBoxError, DEFAULT_BLOCKING_LABELS, DetectedObject,
    DetectedObjectError, ObstructionAggregator, ObstructionReport,
};
pub use pipeline::{
    Collaborators, CoordinateSource, PipelineConfig, PipelineConfigError, PipelineError,
    ScoringPipeline, VisibilityAssessment, VisibilityAssessor,
};
pub use point::{GeoPoint, GeoPointError};
pub use services::{
    Geocoder, ImageSize, ImageSizeError, ImageryProvider, ObjectDetector, RoadSnapper,
    ServiceError, StreetImage,
};
pub use visibility::{
    DEFAULT_DECAY_RATE, ScorerConfigError, VisibilityFactors, VisibilityScore, VisibilityScorer,
};
