//! Stub collaborators and assessor builders shared by the CLI tests.

use super::*;
use crate::score::{ScoreAssessorBuilder, ScoreConfig};
use sightline_core::test_support::{
    StubDetector, StubGeocoder, StubImagery, StubRoadSnapper, detection,
};
use sightline_core::{
    Collaborators, PipelineConfig, ScoringPipeline, VisibilityAssessment, VisibilityAssessor,
};
use std::cell::RefCell;
use std::sync::Arc;

pub(super) const ADDRESS: &str = "North Ave NW, Atlanta, GA";
pub(super) const IMAGE_BYTES: [u8; 3] = [0xFF, 0xD8, 0xFF];

pub(super) type StubCollaborators =
    Collaborators<Arc<StubGeocoder>, Arc<StubRoadSnapper>, Arc<StubImagery>, Arc<StubDetector>>;

/// A car covering part of the frame in front of a full-frame building.
pub(super) fn reference_collaborators() -> StubCollaborators {
    Collaborators {
        geocoder: Arc::new(StubGeocoder::at(33.7756, -84.3963)),
        road_snapper: Arc::new(StubRoadSnapper::at(33.7758, -84.3965)),
        imagery: Arc::new(StubImagery::with_bytes(IMAGE_BYTES.to_vec())),
        detector: Arc::new(StubDetector::with_objects(vec![
            detection("car", 0.1, 0.1, 0.5, 0.5),
            detection("building", 0.0, 0.0, 1.0, 1.0),
        ])),
    }
}

pub(super) fn reference_assessment() -> VisibilityAssessment {
    ScoringPipeline::new(reference_collaborators(), PipelineConfig::default())
        .expect("default config is valid")
        .assess(ADDRESS)
        .expect("reference scenario scores")
}

/// Builds a pipeline over stub collaborators and remembers the configuration
/// it was handed.
#[derive(Debug)]
pub(super) struct StubAssessorBuilder {
    collaborators: StubCollaborators,
    built_with: RefCell<Option<ScoreConfig>>,
}

impl StubAssessorBuilder {
    pub(super) fn new(collaborators: StubCollaborators) -> Self {
        Self {
            collaborators,
            built_with: RefCell::new(None),
        }
    }

    pub(super) fn built_with(&self) -> Option<ScoreConfig> {
        self.built_with.borrow().clone()
    }
}

impl ScoreAssessorBuilder for StubAssessorBuilder {
    fn build(&self, config: &ScoreConfig) -> Result<Box<dyn VisibilityAssessor>, CliError> {
        self.built_with.replace(Some(config.clone()));
        let pipeline =
            ScoringPipeline::new(self.collaborators.clone(), config.pipeline.clone())?;
        Ok(Box::new(pipeline))
    }
}
