//! Building blocks for geomagnetic field evaluation.
//!
//! `geomag-core` holds everything a spherical-harmonic field model needs that is not the model
//! itself: WGS84 geodesy, altitude units and datums, decimal-year time and the shared error type.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`location`] | Geodetic points, range validation, geodetic → geocentric conversion |
//! | [`units`] | Altitude units (km, m, feet) and vertical datums |
//! | [`epoch`] | Calendar dates, decimal years, the missing-component fill policy |
//! | [`math`] | Small numeric helpers (multiple-angle recurrence, degree-valued atan2) |
//! | [`utils`] | Angle wrapping |
//! | [`constants`] | WGS84, geomagnetic reference radius, unit conversions |
//! | [`errors`] | [`GeomagError`] and [`GeomagResult`] |
//!
//! # Re-exports
//!
//! ```
//! use geomag_core::{GeodeticPoint, GeocentricPoint, AltitudeUnit, Datum};
//! use geomag_core::{GeomagError, GeomagResult};
//! ```

pub mod constants;
pub mod epoch;
pub mod errors;
pub mod location;
pub mod math;
pub mod units;
pub mod utils;

pub use epoch::CalendarDate;
pub use errors::{GeomagError, GeomagResult};
pub use location::{GeocentricPoint, GeodeticPoint};
pub use units::{AltitudeUnit, Datum};
