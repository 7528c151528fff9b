//! Google Maps Platform and Cloud Vision collaborators.
//!
//! This module provides [`GoogleServices`], a single HTTP client that
//! implements every `sightline-core` collaborator trait:
//!
//! - [`Geocoder`](sightline_core::Geocoder) via the Geocoding API,
//! - [`RoadSnapper`](sightline_core::RoadSnapper) via the Roads API
//!   `nearestRoads` method,
//! - [`ImageryProvider`](sightline_core::ImageryProvider) via the Street View
//!   Static API,
//! - [`ObjectDetector`](sightline_core::ObjectDetector) via Cloud Vision
//!   object localisation.
//!
//! # Architecture
//!
//! The collaborator traits are synchronous so the scoring core stays
//! embeddable in synchronous contexts. Requests are issued with an async
//! `reqwest` client and driven to completion on a Tokio runtime owned by the
//! provider, or on the caller's multi-threaded runtime when one is running.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sightline_core::{Collaborators, PipelineConfig, ScoringPipeline};
//! use sightline_data::google::{GoogleServices, GoogleServicesConfig};
//!
//! let config = GoogleServicesConfig::new("my-api-key").with_timeout(Duration::from_secs(10));
//! let services = Arc::new(GoogleServices::with_config(config)?);
//! let pipeline = ScoringPipeline::new(Collaborators::shared(services), PipelineConfig::default())?;
//! let score = pipeline.run("North Ave NW, Atlanta, GA")?;
//! println!("visibility: {score}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod geocoding;
mod provider;
mod roads;
mod status;
mod vision;

pub use provider::{
    DEFAULT_GEOCODING_URL, DEFAULT_ROADS_URL, DEFAULT_STREET_VIEW_URL, DEFAULT_USER_AGENT,
    DEFAULT_VISION_URL, GoogleServices, GoogleServicesConfig, ProviderBuildError,
};
