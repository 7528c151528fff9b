//! Contracts for the external services the pipeline depends on.
//!
//! Geocoding, road snapping, street-level imagery, and object detection are
//! all provided by remote collaborators. Each is modelled as a small
//! synchronous trait so the scoring core can be driven by HTTP clients in
//! production and by canned stubs in tests.
//!
//! Collaborators return raw [`geo::Coord`] values; validation into
//! [`GeoPoint`](crate::GeoPoint) happens in the pipeline.

mod error;
mod image;
mod provider;

pub use error::ServiceError;
pub use image::{ImageSize, ImageSizeError, StreetImage};
pub use provider::{Geocoder, ImageryProvider, ObjectDetector, RoadSnapper};
