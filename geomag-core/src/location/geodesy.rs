//! Geodetic to geocentric spherical conversion.
//!
//! # Geodetic vs Geocentric Coordinates
//!
//! **Geodetic coordinates** (what GPS gives you) define position relative to the WGS84
//! reference ellipsoid: latitude is the angle of the ellipsoid surface normal.
//!
//! **Geocentric coordinates** define position relative to Earth's center of mass: latitude
//! is the angle of the line to the center. The spherical-harmonic field model is expressed in
//! geocentric spherical coordinates `(r, θ, φ)`, so every evaluation starts here.
//!
//! At mid-latitudes the two latitudes differ by up to ~11 arcminutes. The difference is also
//! the rotation angle used to bring the field vector back into the local geodetic frame.
//!
//! # Algorithm
//!
//! With `a` the semi-major axis and `e²` the first eccentricity squared:
//!
//! ```text
//! N  = a / sqrt(1 - e² sin²φ)          prime vertical radius
//! p  = (N + h) cos φ                    distance from the rotation axis
//! z  = (N (1 - e²) + h) sin φ           distance from the equatorial plane
//! r  = sqrt(p² + z²)
//! φ' = asin(z / r)                      geocentric latitude
//! ```

use crate::constants::{RAD_TO_DEG, WGS84_ECCENTRICITY_SQUARED, WGS84_SEMI_MAJOR_AXIS_KM};
use crate::math::{hypot, sincos};

use super::GeodeticPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geocentric spherical position (longitude is shared with the geodetic point).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeocentricPoint {
    /// Distance from Earth's center in kilometers.
    pub radius_km: f64,
    /// Geocentric latitude in degrees.
    pub latitude: f64,
}

impl GeocentricPoint {
    /// Geocentric colatitude in degrees, `90 - latitude`.
    #[inline]
    pub fn colatitude(&self) -> f64 {
        90.0 - self.latitude
    }
}

/// Converts geodetic latitude (degrees) and ellipsoidal height (km) to geocentric radius and
/// latitude.
pub fn geodetic_to_geocentric(latitude: f64, height_km: f64) -> GeocentricPoint {
    let (sin_lat, cos_lat) = sincos(latitude.to_radians());

    let prime_vertical_radius =
        WGS84_SEMI_MAJOR_AXIS_KM / (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();

    let p = (prime_vertical_radius + height_km) * cos_lat;
    let z = (prime_vertical_radius * (1.0 - WGS84_ECCENTRICITY_SQUARED) + height_km) * sin_lat;

    let radius_km = hypot(p, z);
    let latitude = (z / radius_km).clamp(-1.0, 1.0).asin() * RAD_TO_DEG;

    GeocentricPoint {
        radius_km,
        latitude,
    }
}

impl GeodeticPoint {
    /// Converts this point to geocentric spherical coordinates on the WGS84 ellipsoid.
    ///
    /// # Example
    ///
    /// ```
    /// use geomag_core::GeodeticPoint;
    ///
    /// // Equator at the ellipsoid surface: radius is the semi-major axis
    /// let equator = GeodeticPoint::new(0.0, 0.0, 0.0)?;
    /// let geo = equator.to_geocentric();
    /// assert!((geo.radius_km - 6378.137).abs() < 1e-9);
    /// assert_eq!(geo.latitude, 0.0);
    /// # Ok::<(), geomag_core::GeomagError>(())
    /// ```
    pub fn to_geocentric(&self) -> GeocentricPoint {
        geodetic_to_geocentric(self.latitude, self.height_km)
    }
}
