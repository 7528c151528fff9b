//! Roads API `nearestRoads` response types.
//!
//! See: <https://developers.google.com/maps/documentation/roads/nearest>

use geo::Coord;
use serde::Deserialize;
use sightline_core::ServiceError;

use super::status::RpcStatus;

/// `nearestRoads` response.
///
/// The API omits `snappedPoints` entirely when no road lies within its search
/// radius.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestRoadsResponse {
    /// Snapped points, one or more per input point.
    #[serde(default)]
    pub snapped_points: Vec<SnappedPoint>,

    /// Error payload returned in place of results.
    #[serde(default)]
    pub error: Option<RpcStatus>,
}

/// A point snapped onto a road segment.
///
/// `originalIndex` and `placeId` are ignored.
#[derive(Debug, Deserialize)]
pub struct SnappedPoint {
    /// Location on the road.
    pub location: RoadLocation,
}

/// Latitude/longitude pair as encoded by the Roads API.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RoadLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl NearestRoadsResponse {
    /// Return the first snapped coordinate, or `None` when no road was found.
    pub fn into_nearest(self) -> Result<Option<Coord<f64>>, ServiceError> {
        if let Some(error) = self.error {
            return Err(error.into_service_error());
        }
        Ok(self.snapped_points.into_iter().next().map(|point| Coord {
            x: point.location.longitude,
            y: point.location.latitude,
        }))
    }
}
