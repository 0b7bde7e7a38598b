#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

pub const ARCMIN_PER_DEGREE: f64 = 60.0;

/// WGS84 semi-major axis in kilometers.
pub const WGS84_SEMI_MAJOR_AXIS_KM: f64 = 6378.137;

/// WGS84 semi-minor axis in kilometers.
pub const WGS84_SEMI_MINOR_AXIS_KM: f64 = 6356.752314245179;

pub const WGS84_FLATTENING: f64 = 0.0033528106647474805;

/// WGS84 first eccentricity squared: e² = (a² - b²) / a².
pub const WGS84_ECCENTRICITY_SQUARED: f64 = 6.6943799901413165e-3;

/// Reference radius of the geomagnetic spherical-harmonic expansion (mean Earth radius).
pub const GEOMAGNETIC_REFERENCE_RADIUS_KM: f64 = 6371.2;

pub const KM_PER_METER: f64 = 1.0e-3;

/// International foot, expressed in kilometers.
pub const KM_PER_FOOT: f64 = 3.048e-4;

pub const DAYS_PER_YEAR: f64 = 365.0;

pub const DAYS_PER_LEAP_YEAR: f64 = 366.0;

/// Cumulative day count at the start of each month in a common year.
pub const CUMULATIVE_DAYS: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semi_minor_axis_consistent_with_flattening() {
        let b = WGS84_SEMI_MAJOR_AXIS_KM * (1.0 - WGS84_FLATTENING);
        assert!((b - WGS84_SEMI_MINOR_AXIS_KM).abs() < 1e-9);
    }

    #[test]
    fn test_eccentricity_consistent_with_flattening() {
        let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
        assert!((e2 - WGS84_ECCENTRICITY_SQUARED).abs() < 1e-15);
    }

    #[test]
    fn test_cumulative_days_end_at_december() {
        assert_eq!(CUMULATIVE_DAYS[11] + 31, 365);
    }
}
