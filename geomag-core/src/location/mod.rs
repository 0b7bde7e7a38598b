//! Geodetic positions for field evaluation.
//!
//! This module provides [`GeodeticPoint`], a position relative to the WGS84 ellipsoid, and
//! [`GeocentricPoint`], the spherical coordinates the field model is defined in.
//!
//! # Coordinate conventions
//!
//! - **Latitude**: North positive, degrees, range [-90, 90]
//! - **Longitude**: East positive, degrees, range [-180, 360] (both ends inclusive)
//! - **Height**: Kilometers above the WGS84 ellipsoid (not sea level)
//!
//! Unlike most of the numerical code, positions keep degrees: they are compared by value for
//! caching and echoed back in advisories, so storing what the caller supplied avoids
//! round-trip noise.
//!
//! # Example
//!
//! ```
//! use geomag_core::GeodeticPoint;
//!
//! let point = GeodeticPoint::new(-18.0, 138.0, 77.0)?;
//! let geocentric = point.to_geocentric();
//! assert!(geocentric.latitude > -18.0);
//! # Ok::<(), geomag_core::GeomagError>(())
//! ```

mod geodesy;

pub use geodesy::GeocentricPoint;

use std::fmt;

use crate::errors::{GeomagError, GeomagResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 360.0;

/// A position in WGS84 geodetic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodeticPoint {
    /// Geodetic latitude in degrees. North is positive.
    pub latitude: f64,
    /// Longitude in degrees. East is positive.
    pub longitude: f64,
    /// Height above the WGS84 ellipsoid in kilometers.
    pub height_km: f64,
}

impl GeodeticPoint {
    /// Creates a validated point.
    ///
    /// # Errors
    ///
    /// [`GeomagError::LatitudeOutOfRange`] outside [-90, 90] and
    /// [`GeomagError::LongitudeOutOfRange`] outside [-180, 360]. Non-finite values fail the
    /// same range checks.
    pub fn new(latitude: f64, longitude: f64, height_km: f64) -> GeomagResult<Self> {
        validate_latitude(latitude)?;
        validate_longitude(longitude)?;
        Ok(Self {
            latitude,
            longitude,
            height_km,
        })
    }
}

impl fmt::Display for GeodeticPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(lat, lon, alt) = ({}, {}, {} km ellipsoidal)",
            self.latitude, self.longitude, self.height_km
        )
    }
}

pub fn validate_latitude(latitude: f64) -> GeomagResult<f64> {
    if (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        return Ok(latitude);
    }
    Err(GeomagError::latitude_out_of_range(latitude))
}

pub fn validate_longitude(longitude: f64) -> GeomagResult<f64> {
    if (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return Ok(longitude);
    }
    Err(GeomagError::longitude_out_of_range(longitude))
}
