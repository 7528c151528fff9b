//! Collaborator traits and their `Arc` forwarding impls.

use std::sync::Arc;

use geo::Coord;

use crate::{DetectedObject, GeoPoint};

use super::error::ServiceError;
use super::image::{ImageSize, StreetImage};

/// Resolve a free-text address to a coordinate.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use sightline_core::{Geocoder, ServiceError};
///
/// struct FixedGeocoder;
///
/// impl Geocoder for FixedGeocoder {
///     fn geocode(&self, address: &str) -> Result<Coord<f64>, ServiceError> {
///         if address.is_empty() {
///             return Err(ServiceError::Status {
///                 code: "ZERO_RESULTS".into(),
///                 message: String::new(),
///             });
///         }
///         Ok(Coord { x: -84.3963, y: 33.7756 })
///     }
/// }
///
/// let coord = FixedGeocoder.geocode("North Ave NW, Atlanta")?;
/// assert_eq!(coord.y, 33.7756);
/// # Ok::<(), ServiceError>(())
/// ```
pub trait Geocoder: Send + Sync {
    /// Return the coordinate (`x = longitude`, `y = latitude`) for `address`.
    ///
    /// Implementations must return an error rather than a placeholder when the
    /// service reports a non-success status.
    fn geocode(&self, address: &str) -> Result<Coord<f64>, ServiceError>;
}

/// Find the nearest point on a drivable road.
pub trait RoadSnapper: Send + Sync {
    /// Return the snapped coordinate, or `None` when no road lies within the
    /// service's search radius.
    fn snap_to_road(&self, point: &GeoPoint) -> Result<Option<Coord<f64>>, ServiceError>;
}

/// Fetch a street-level photograph centred on a location.
pub trait ImageryProvider: Send + Sync {
    /// Return the encoded image for `point` at the requested size.
    fn fetch_image(&self, point: &GeoPoint, size: ImageSize) -> Result<StreetImage, ServiceError>;
}

/// Detect objects in a street-level image.
pub trait ObjectDetector: Send + Sync {
    /// Return every detected object with its normalised bounding box.
    fn detect_objects(&self, image: &StreetImage) -> Result<Vec<DetectedObject>, ServiceError>;
}

impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, ServiceError> {
        (**self).geocode(address)
    }
}

impl<T: RoadSnapper + ?Sized> RoadSnapper for Arc<T> {
    fn snap_to_road(&self, point: &GeoPoint) -> Result<Option<Coord<f64>>, ServiceError> {
        (**self).snap_to_road(point)
    }
}

impl<T: ImageryProvider + ?Sized> ImageryProvider for Arc<T> {
    fn fetch_image(&self, point: &GeoPoint, size: ImageSize) -> Result<StreetImage, ServiceError> {
        (**self).fetch_image(point, size)
    }
}

impl<T: ObjectDetector + ?Sized> ObjectDetector for Arc<T> {
    fn detect_objects(&self, image: &StreetImage) -> Result<Vec<DetectedObject>, ServiceError> {
        (**self).detect_objects(image)
    }
}
