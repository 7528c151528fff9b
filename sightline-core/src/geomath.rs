//! Great-circle distance and initial bearing between two [`GeoPoint`]s.
//!
//! Both functions work on a sphere of radius [`EARTH_RADIUS_KM`]. Degenerate
//! input (`a == b`) returns exactly `0.0` rather than whatever the
//! trigonometry would produce.

use crate::GeoPoint;

/// Radius of the spherical earth model, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const FULL_TURN_DEGREES: f64 = 360.0;

/// Haversine distance between `a` and `b` in kilometres.
///
/// # Examples
/// ```
/// use sightline_core::{GeoPoint, geomath::haversine_distance_km};
///
/// let a = GeoPoint::new(0.0, 0.0)?;
/// let b = GeoPoint::new(0.0, 1.0)?;
/// let km = haversine_distance_km(a, b);
/// assert!((km - 111.194_926_644_558_73).abs() < 1e-9);
/// assert_eq!(haversine_distance_km(a, a), 0.0);
/// # Ok::<(), sightline_core::GeoPointError>(())
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "haversine distance is floating-point trigonometry"
)]
pub fn haversine_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * central_angle
}

/// Initial compass bearing from `a` towards `b`, in degrees within `[0, 360)`.
///
/// North is `0`, east `90`. Identical points have no defined direction and
/// return `0.0` by convention.
///
/// # Examples
/// ```
/// use sightline_core::{GeoPoint, geomath::initial_bearing_degrees};
///
/// let origin = GeoPoint::new(0.0, 0.0)?;
/// let east = GeoPoint::new(0.0, 1.0)?;
/// let south = GeoPoint::new(-1.0, 0.0)?;
/// assert!((initial_bearing_degrees(origin, east) - 90.0).abs() < 1e-9);
/// assert!((initial_bearing_degrees(origin, south) - 180.0).abs() < 1e-9);
/// assert_eq!(initial_bearing_degrees(origin, origin), 0.0);
/// # Ok::<(), sightline_core::GeoPointError>(())
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "bearing is floating-point trigonometry"
)]
pub fn initial_bearing_degrees(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let x = d_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let raw = x.atan2(y).to_degrees();

    (raw + FULL_TURN_DEGREES) % FULL_TURN_DEGREES
}
