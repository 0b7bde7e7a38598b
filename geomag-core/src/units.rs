//! Altitude units and vertical datums.
//!
//! The field model works in kilometers above the WGS84 ellipsoid. Callers may supply
//! altitudes in kilometers, meters or feet, and relative to either the ellipsoid or mean sea
//! level (the geoid). [`AltitudeUnit`] handles the first conversion; the datum conversion needs
//! a geoid model and lives with the evaluation engine.

use std::fmt;
use std::str::FromStr;

use crate::constants::{KM_PER_FOOT, KM_PER_METER};
use crate::errors::{GeomagError, GeomagResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AltitudeUnit {
    #[default]
    Kilometers,
    Meters,
    Feet,
}

impl AltitudeUnit {
    /// Converts an altitude in this unit to kilometers.
    #[inline]
    pub fn to_km(self, altitude: f64) -> f64 {
        match self {
            Self::Kilometers => altitude,
            Self::Meters => altitude * KM_PER_METER,
            Self::Feet => altitude * KM_PER_FOOT,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Meters => "m",
            Self::Feet => "feet",
        }
    }
}

impl FromStr for AltitudeUnit {
    type Err = GeomagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometer" | "kilometers" => Ok(Self::Kilometers),
            "m" | "meter" | "meters" => Ok(Self::Meters),
            "ft" | "feet" | "foot" => Ok(Self::Feet),
            _ => Err(GeomagError::unknown_unit(s)),
        }
    }
}

impl fmt::Display for AltitudeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts an altitude expressed in the named unit (`"km"`, `"m"`, `"feet"`) to kilometers.
pub fn normalize_altitude(altitude: f64, unit: &str) -> GeomagResult<f64> {
    Ok(unit.parse::<AltitudeUnit>()?.to_km(altitude))
}

/// Vertical reference the caller's altitude is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Datum {
    /// Height above the WGS84 ellipsoid; used as-is.
    #[default]
    Ellipsoid,
    /// Height above mean sea level; corrected by the geoid undulation before evaluation.
    MeanSeaLevel,
}
