//! Error types for geomagnetic model ingestion, configuration and evaluation.
//!
//! This module provides a single error type [`GeomagError`] covering the failure modes of
//! the evaluation engine: coefficient ingestion, the model's validity period, input
//! validation of coordinates and units, and evaluation before configuration.
//!
//! # Error Categories
//!
//! | Variant | Raised by | Recoverable? |
//! |---------|-----------|--------------|
//! | [`MalformedCoefficientData`](GeomagError::MalformedCoefficientData) | coefficient loading | No |
//! | [`YearNotFound`](GeomagError::YearNotFound) | multi-epoch coefficient loading | No |
//! | [`Io`](GeomagError::Io) | coefficient loading | No |
//! | [`OutOfValidityPeriod`](GeomagError::OutOfValidityPeriod) | time configuration | Yes |
//! | [`InvalidDate`](GeomagError::InvalidDate) | time configuration | Yes |
//! | [`LatitudeOutOfRange`](GeomagError::LatitudeOutOfRange) | position configuration | Yes |
//! | [`LongitudeOutOfRange`](GeomagError::LongitudeOutOfRange) | position configuration | Yes |
//! | [`UnknownUnit`](GeomagError::UnknownUnit) | altitude normalization | Yes |
//! | [`ShapeMismatch`](GeomagError::ShapeMismatch) | broadcasting of batched inputs | Yes |
//! | [`GeoidUnavailable`](GeomagError::GeoidUnavailable) | mean-sea-level altitude input | Yes |
//! | [`NotConfigured`](GeomagError::NotConfigured) | evaluation | Yes |
//!
//! "Recoverable" means the caller can retry the same call with corrected input. Ingestion
//! failures need a corrected coefficient file.
//!
//! Non-fatal advisories (altitude accuracy, blackout zone) are not errors; they travel
//! alongside results instead of through this type.

use thiserror::Error;

/// Unified error type for the geomagnetic engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomagError {
    /// A coefficient line or table could not be interpreted.
    #[error("Malformed coefficient data at line {line}: {message}")]
    MalformedCoefficientData { line: usize, message: String },

    /// A multi-epoch coefficient file has no section for the requested year.
    #[error("Coefficient file has no section for year {year}")]
    YearNotFound { year: i32 },

    /// The coefficient source could not be read.
    #[error("Could not read coefficient source {path}: {message}")]
    Io { path: String, message: String },

    /// Requested time is outside `[min_year, max_year)`.
    #[error(
        "Decimal year {requested} is outside the model validity period: provide a date from {min_date} ({min_year:.3}) up to but excluding {max_year:.1}"
    )]
    OutOfValidityPeriod {
        requested: f64,
        min_year: f64,
        max_year: f64,
        min_date: String,
    },

    /// Calendar components do not form a valid date.
    #[error("Invalid date {year}-{month:02}-{day:02}: {message}")]
    InvalidDate {
        year: i32,
        month: i32,
        day: i32,
        message: String,
    },

    #[error("Latitude {value} is outside [-90, 90] degrees")]
    LatitudeOutOfRange { value: f64 },

    #[error("Longitude {value} is outside [-180, 360] degrees")]
    LongitudeOutOfRange { value: f64 },

    #[error("Unknown altitude unit '{unit}': expected km, m or feet")]
    UnknownUnit { unit: String },

    /// Batched inputs have lengths that cannot be broadcast together.
    #[error("The input sizes cannot be broadcast together: {}", format_sizes(.sizes))]
    ShapeMismatch { sizes: Vec<(String, usize)> },

    #[error("Mean-sea-level altitude requires a geoid model; none is configured")]
    GeoidUnavailable,

    /// Evaluation was requested before the calculator was fully configured.
    #[error("Calculator is not configured: {message}")]
    NotConfigured { message: String },
}

/// Convenience alias for `Result<T, GeomagError>`.
pub type GeomagResult<T> = Result<T, GeomagError>;

fn format_sizes(sizes: &[(String, usize)]) -> String {
    sizes
        .iter()
        .map(|(name, len)| format!("{}={}", name, len))
        .collect::<Vec<_>>()
        .join(", ")
}

impl GeomagError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCoefficientData {
            line,
            message: reason.into(),
        }
    }

    pub fn year_not_found(year: i32) -> Self {
        Self::YearNotFound { year }
    }

    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: reason.into(),
        }
    }

    pub fn out_of_validity(requested: f64, min_year: f64, max_year: f64, min_date: &str) -> Self {
        Self::OutOfValidityPeriod {
            requested,
            min_year,
            max_year,
            min_date: min_date.to_string(),
        }
    }

    pub fn invalid_date(year: i32, month: i32, day: i32, reason: &str) -> Self {
        Self::InvalidDate {
            year,
            month,
            day,
            message: reason.to_string(),
        }
    }

    pub fn latitude_out_of_range(value: f64) -> Self {
        Self::LatitudeOutOfRange { value }
    }

    pub fn longitude_out_of_range(value: f64) -> Self {
        Self::LongitudeOutOfRange { value }
    }

    pub fn unknown_unit(unit: impl Into<String>) -> Self {
        Self::UnknownUnit { unit: unit.into() }
    }

    /// Creates a [`ShapeMismatch`](Self::ShapeMismatch) from `(input name, length)` pairs.
    pub fn shape_mismatch<S: AsRef<str>>(sizes: &[(S, usize)]) -> Self {
        Self::ShapeMismatch {
            sizes: sizes
                .iter()
                .map(|(name, len)| (name.as_ref().to_string(), *len))
                .collect(),
        }
    }

    pub fn not_configured(reason: impl Into<String>) -> Self {
        Self::NotConfigured {
            message: reason.into(),
        }
    }

    /// Returns `true` if the same call can succeed with corrected arguments.
    ///
    /// Ingestion failures are not recoverable without a corrected coefficient file.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::MalformedCoefficientData { .. } | Self::YearNotFound { .. } | Self::Io { .. }
        )
    }
}
