//! Canned collaborators used by unit and behaviour tests.
//!
//! Each stub either returns a fixed value or a fixed [`ServiceError`], and
//! counts how often it was called so tests can assert that later stages were
//! skipped after a failure.

use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Coord;

use crate::{
    BoundingBox, DetectedObject, GeoPoint, Geocoder, ImageSize, ImageryProvider, ObjectDetector,
    RoadSnapper, ServiceError, StreetImage,
};

/// Build a detection with confidence `0.9` from raw box corners.
///
/// # Panics
/// Panics when the corners do not form a valid normalised box; intended for
/// literal fixtures only.
#[must_use]
#[expect(clippy::expect_used, reason = "fixtures are literal and known valid")]
pub fn detection(label: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> DetectedObject {
    let bbox = BoundingBox::new(x0, y0, x1, y1).expect("fixture bounding box is valid");
    DetectedObject::new(label, 0.9, bbox).expect("fixture detection is valid")
}

#[derive(Debug, Default)]
struct CallCounter(AtomicUsize);

impl CallCounter {
    fn bump(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Geocoder returning a fixed coordinate or error.
#[derive(Debug)]
pub struct StubGeocoder {
    response: Result<Coord<f64>, ServiceError>,
    calls: CallCounter,
}

impl StubGeocoder {
    /// Resolve every address to `(latitude, longitude)`.
    #[must_use]
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::with_coord(Coord {
            x: longitude,
            y: latitude,
        })
    }

    /// Resolve every address to `coord`, even when it is out of range.
    #[must_use]
    pub fn with_coord(coord: Coord<f64>) -> Self {
        Self {
            response: Ok(coord),
            calls: CallCounter::default(),
        }
    }

    /// Fail every lookup with `error`.
    #[must_use]
    pub fn with_error(error: ServiceError) -> Self {
        Self {
            response: Err(error),
            calls: CallCounter::default(),
        }
    }

    /// Number of lookups performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, _address: &str) -> Result<Coord<f64>, ServiceError> {
        self.calls.bump();
        self.response.clone()
    }
}

/// Road snapper returning a fixed coordinate, no road, or an error.
#[derive(Debug)]
pub struct StubRoadSnapper {
    response: Result<Option<Coord<f64>>, ServiceError>,
    calls: CallCounter,
}

impl StubRoadSnapper {
    /// Snap every point to `(latitude, longitude)`.
    #[must_use]
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::with_coord(Coord {
            x: longitude,
            y: latitude,
        })
    }

    /// Snap every point to `coord`, even when it is out of range.
    #[must_use]
    pub fn with_coord(coord: Coord<f64>) -> Self {
        Self {
            response: Ok(Some(coord)),
            calls: CallCounter::default(),
        }
    }

    /// Report that no road is nearby.
    #[must_use]
    pub fn no_road() -> Self {
        Self {
            response: Ok(None),
            calls: CallCounter::default(),
        }
    }

    /// Fail every lookup with `error`.
    #[must_use]
    pub fn with_error(error: ServiceError) -> Self {
        Self {
            response: Err(error),
            calls: CallCounter::default(),
        }
    }

    /// Number of lookups performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl RoadSnapper for StubRoadSnapper {
    fn snap_to_road(&self, _point: &GeoPoint) -> Result<Option<Coord<f64>>, ServiceError> {
        self.calls.bump();
        self.response.clone()
    }
}

/// Imagery provider returning fixed bytes or an error.
#[derive(Debug)]
pub struct StubImagery {
    response: Result<StreetImage, ServiceError>,
    calls: CallCounter,
}

impl StubImagery {
    /// Return `bytes` for every request.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            response: Ok(StreetImage::from_bytes(bytes)),
            calls: CallCounter::default(),
        }
    }

    /// Fail every request with `error`.
    #[must_use]
    pub fn with_error(error: ServiceError) -> Self {
        Self {
            response: Err(error),
            calls: CallCounter::default(),
        }
    }

    /// Number of fetches performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ImageryProvider for StubImagery {
    fn fetch_image(&self, _point: &GeoPoint, _size: ImageSize) -> Result<StreetImage, ServiceError> {
        self.calls.bump();
        self.response.clone()
    }
}

/// Object detector returning fixed detections or an error.
#[derive(Debug)]
pub struct StubDetector {
    response: Result<Vec<DetectedObject>, ServiceError>,
    calls: CallCounter,
}

impl StubDetector {
    /// Return `objects` for every image.
    #[must_use]
    pub fn with_objects(objects: Vec<DetectedObject>) -> Self {
        Self {
            response: Ok(objects),
            calls: CallCounter::default(),
        }
    }

    /// Fail every detection with `error`.
    #[must_use]
    pub fn with_error(error: ServiceError) -> Self {
        Self {
            response: Err(error),
            calls: CallCounter::default(),
        }
    }

    /// Number of detections performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ObjectDetector for StubDetector {
    fn detect_objects(&self, _image: &StreetImage) -> Result<Vec<DetectedObject>, ServiceError> {
        self.calls.bump();
        self.response.clone()
    }
}
