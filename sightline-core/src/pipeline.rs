//! End-to-end visibility scoring for a single address.
//!
//! [`ScoringPipeline`] runs the stages strictly in order, each consuming the
//! previous stage's output:
//!
//! 1. geocode the address,
//! 2. snap the location to the nearest drivable road,
//! 3. measure distance and bearing from the location to the road,
//! 4. fetch a street-level image of the location,
//! 5. detect objects in the image,
//! 6. aggregate detections into an obstruction fraction,
//! 7. score.
//!
//! Any stage failure aborts the run with a [`PipelineError`] naming the stage;
//! no partial score is produced. The pipeline holds no mutable state, so a
//! single instance may serve concurrent callers when its collaborators allow.

use std::fmt;

use geo::Coord;
use log::debug;
use thiserror::Error;

use crate::geomath::{haversine_distance_km, initial_bearing_degrees};
use crate::obstruction::{BlockingLabels, DetectedObject, ObstructionAggregator, ObstructionReport};
use crate::point::{GeoPoint, GeoPointError};
use crate::services::{
    Geocoder, ImageSize, ImageryProvider, ObjectDetector, RoadSnapper, ServiceError, StreetImage,
};
use crate::visibility::{
    DEFAULT_DECAY_RATE, ScorerConfigError, VisibilityFactors, VisibilityScore, VisibilityScorer,
};

/// Tunable inputs for a [`ScoringPipeline`].
///
/// # Examples
/// ```
/// use sightline_core::{BlockingLabels, ImageSize, PipelineConfig};
///
/// let config = PipelineConfig::default()
///     .with_decay_rate(0.2)
///     .with_blocking_labels(BlockingLabels::from_iter(["car", "bus"]))
///     .with_image_size(ImageSize::new(640, 640)?);
/// assert_eq!(config.decay_rate, 0.2);
/// # Ok::<(), sightline_core::ImageSizeError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Labels counted as obstructions.
    pub blocking_labels: BlockingLabels,
    /// Exponential distance decay per kilometre.
    pub decay_rate: f64,
    /// Size of the street-level image to request.
    pub image_size: ImageSize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blocking_labels: BlockingLabels::default(),
            decay_rate: DEFAULT_DECAY_RATE,
            image_size: ImageSize::default(),
        }
    }
}

impl PipelineConfig {
    /// Replace the blocking label set.
    #[must_use]
    pub fn with_blocking_labels(mut self, labels: BlockingLabels) -> Self {
        self.blocking_labels = labels;
        self
    }

    /// Set the distance decay rate.
    #[must_use]
    pub const fn with_decay_rate(mut self, decay_rate: f64) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    /// Set the requested image size.
    #[must_use]
    pub const fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }
}

/// The four external services a pipeline calls.
#[derive(Debug, Clone)]
pub struct Collaborators<G, R, I, D> {
    /// Address resolution.
    pub geocoder: G,
    /// Nearest-road lookup.
    pub road_snapper: R,
    /// Street-level imagery.
    pub imagery: I,
    /// Object detection.
    pub detector: D,
}

impl<S: Clone> Collaborators<S, S, S, S> {
    /// Use one service value (typically an `Arc`) for all four roles.
    #[must_use]
    pub fn shared(service: S) -> Self {
        Self {
            geocoder: service.clone(),
            road_snapper: service.clone(),
            imagery: service.clone(),
            detector: service,
        }
    }
}

/// Stage at which a coordinate failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    /// The geocoded address location.
    Geocoding,
    /// The snapped road location.
    RoadSnapping,
}

impl fmt::Display for CoordinateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Geocoding => "geocoded",
            Self::RoadSnapping => "road-snapped",
        })
    }
}

/// Errors returned by [`ScoringPipeline::run`] and [`ScoringPipeline::assess`].
///
/// None of these are retried within a run; callers may rerun the whole
/// pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The address could not be resolved to a coordinate.
    #[error("address {address:?} could not be resolved")]
    AddressNotFound {
        /// Address as supplied by the caller.
        address: String,
        /// Collaborator failure; absent when the address was blank.
        #[source]
        source: Option<ServiceError>,
    },
    /// No drivable road was found near the location.
    #[error("no drivable road found near {point}")]
    NoRoadNearby {
        /// Location that was snapped.
        point: GeoPoint,
        /// Collaborator failure; absent when the service simply found nothing.
        #[source]
        source: Option<ServiceError>,
    },
    /// The street-level image could not be fetched.
    #[error("street-level image unavailable for {point}")]
    ImageUnavailable {
        /// Location the image was requested for.
        point: GeoPoint,
        /// Collaborator failure.
        #[source]
        source: ServiceError,
    },
    /// Object detection failed.
    #[error("object detection failed")]
    DetectionServiceError {
        /// Collaborator failure.
        #[source]
        source: ServiceError,
    },
    /// A collaborator produced a coordinate outside the valid bounds.
    #[error("{stage} coordinate is invalid")]
    InvalidCoordinate {
        /// Which collaborator produced the coordinate.
        stage: CoordinateSource,
        /// Validation failure.
        #[source]
        source: GeoPointError,
    },
}

/// Errors returned by [`ScoringPipeline::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PipelineConfigError {
    /// The configured scorer parameters were rejected.
    #[error(transparent)]
    Scorer(#[from] ScorerConfigError),
}

/// Every intermediate value from one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityAssessment {
    /// Address as supplied by the caller.
    pub address: String,
    /// Geocoded location of the address.
    pub location: GeoPoint,
    /// Nearest point on a drivable road.
    pub road: GeoPoint,
    /// Great-circle distance from `location` to `road` in kilometres.
    pub distance_km: f64,
    /// Initial bearing from `location` to `road` in `[0, 360)`.
    pub bearing_degrees: f64,
    /// Street-level image the detections came from.
    pub image: StreetImage,
    /// Objects detected in `image`.
    pub detections: Vec<DetectedObject>,
    /// Aggregated obstruction.
    pub obstruction: ObstructionReport,
    /// Unclamped score factors.
    pub factors: VisibilityFactors,
    /// Final clamped score.
    pub score: VisibilityScore,
}

/// Score addresses end to end.
///
/// Implemented by [`ScoringPipeline`]; callers such as the CLI depend on this
/// trait so tests can substitute canned assessments.
pub trait VisibilityAssessor: Send + Sync {
    /// Run every stage for `address` and return all intermediate values.
    ///
    /// # Errors
    /// Returns the [`PipelineError`] of the first failing stage.
    fn assess(&self, address: &str) -> Result<VisibilityAssessment, PipelineError>;
}

/// Orchestrates the collaborators and the pure scoring components.
#[derive(Debug, Clone)]
pub struct ScoringPipeline<G, R, I, D> {
    collaborators: Collaborators<G, R, I, D>,
    aggregator: ObstructionAggregator,
    scorer: VisibilityScorer,
    image_size: ImageSize,
}

impl<G, R, I, D> ScoringPipeline<G, R, I, D>
where
    G: Geocoder,
    R: RoadSnapper,
    I: ImageryProvider,
    D: ObjectDetector,
{
    /// Build a pipeline from its collaborators and configuration.
    ///
    /// # Errors
    /// Returns [`PipelineConfigError`] when the decay rate is not finite and
    /// positive.
    pub fn new(
        collaborators: Collaborators<G, R, I, D>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineConfigError> {
        let scorer = VisibilityScorer::new(config.decay_rate)?;
        Ok(Self {
            collaborators,
            aggregator: ObstructionAggregator::new(config.blocking_labels),
            scorer,
            image_size: config.image_size,
        })
    }

    /// Score `address`.
    ///
    /// # Errors
    /// Returns the [`PipelineError`] of the first failing stage.
    pub fn run(&self, address: &str) -> Result<VisibilityScore, PipelineError> {
        self.assess(address).map(|assessment| assessment.score)
    }

    /// Score `address`, keeping every intermediate value.
    ///
    /// # Errors
    /// Returns the [`PipelineError`] of the first failing stage.
    pub fn assess(&self, address: &str) -> Result<VisibilityAssessment, PipelineError> {
        let location = self.resolve(address)?;
        debug!("resolved {address:?} to {location}");

        let road = self.snap(location)?;
        debug!("snapped {location} to road at {road}");

        let distance_km = haversine_distance_km(location, road);
        let bearing_degrees = initial_bearing_degrees(location, road);
        debug!("road is {distance_km} km away at bearing {bearing_degrees}");

        let image = self
            .collaborators
            .imagery
            .fetch_image(&location, self.image_size)
            .map_err(|source| PipelineError::ImageUnavailable {
                point: location,
                source,
            })?;
        debug!("fetched {} byte image for {location}", image.len());

        let detections = self
            .collaborators
            .detector
            .detect_objects(&image)
            .map_err(|source| PipelineError::DetectionServiceError { source })?;
        debug!("detected {} objects", detections.len());

        let obstruction = self.aggregator.aggregate(&detections);
        let factors =
            self.scorer
                .factors(distance_km, bearing_degrees, obstruction.blocked_fraction);
        let score =
            self.scorer
                .score(distance_km, bearing_degrees, obstruction.blocked_fraction);
        debug!("scored {address:?} at {score}");

        Ok(VisibilityAssessment {
            address: address.to_owned(),
            location,
            road,
            distance_km,
            bearing_degrees,
            image,
            detections,
            obstruction,
            factors,
            score,
        })
    }

    fn resolve(&self, address: &str) -> Result<GeoPoint, PipelineError> {
        if address.trim().is_empty() {
            return Err(PipelineError::AddressNotFound {
                address: address.to_owned(),
                source: None,
            });
        }
        let coord = self
            .collaborators
            .geocoder
            .geocode(address)
            .map_err(|source| PipelineError::AddressNotFound {
                address: address.to_owned(),
                source: Some(source),
            })?;
        validate(coord, CoordinateSource::Geocoding)
    }

    fn snap(&self, location: GeoPoint) -> Result<GeoPoint, PipelineError> {
        let snapped = self
            .collaborators
            .road_snapper
            .snap_to_road(&location)
            .map_err(|source| PipelineError::NoRoadNearby {
                point: location,
                source: Some(source),
            })?
            .ok_or(PipelineError::NoRoadNearby {
                point: location,
                source: None,
            })?;
        validate(snapped, CoordinateSource::RoadSnapping)
    }
}

impl<G, R, I, D> VisibilityAssessor for ScoringPipeline<G, R, I, D>
where
    G: Geocoder,
    R: RoadSnapper,
    I: ImageryProvider,
    D: ObjectDetector,
{
    fn assess(&self, address: &str) -> Result<VisibilityAssessment, PipelineError> {
        Self::assess(self, address)
    }
}

fn validate(coord: Coord<f64>, stage: CoordinateSource) -> Result<GeoPoint, PipelineError> {
    GeoPoint::try_from(coord).map_err(|source| PipelineError::InvalidCoordinate { stage, source })
}
