//! Geocoding API response types.
//!
//! See: <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use geo::Coord;
use serde::Deserialize;
use sightline_core::ServiceError;

/// Geocoding API response.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    /// Status code from the API.
    ///
    /// Common values:
    /// - `"OK"` - at least one result was found
    /// - `"ZERO_RESULTS"` - the address could not be resolved
    /// - `"REQUEST_DENIED"` - the key is missing or not authorised
    /// - `"OVER_QUERY_LIMIT"` - quota exhausted
    pub status: String,

    /// Optional detail accompanying a non-`OK` status.
    #[serde(default)]
    pub error_message: Option<String>,

    /// Candidate results, best match first.
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// A single geocoding candidate.
#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    /// Geometry of the candidate.
    pub geometry: Geometry,
}

/// Geometry block of a geocoding candidate.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// Representative point of the candidate.
    pub location: LatLng,
}

/// Latitude/longitude pair as encoded by the Maps APIs.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeocodeResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }

    /// Extract the best match as a coordinate (`x = lng`, `y = lat`).
    pub fn into_coord(self) -> Result<Coord<f64>, ServiceError> {
        if !self.is_ok() {
            return Err(ServiceError::Status {
                code: self.status,
                message: self.error_message.unwrap_or_default(),
            });
        }
        let best = self
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Parse {
                message: "geocoding response reported OK without results".to_owned(),
            })?;
        let LatLng { lat, lng } = best.geometry.location;
        Ok(Coord { x: lng, y: lat })
    }
}
