//! Calculator configuration.
//!
//! ```
//! use geomag_model::config::{AltitudeWindow, CalculatorConfig};
//! use geomag_core::AltitudeUnit;
//!
//! let config = CalculatorConfig::default()
//!     .with_max_degree(8)
//!     .with_accuracy_window(AltitudeWindow::MIL_SPEC_850)
//!     .with_altitude_unit(AltitudeUnit::Meters);
//! assert_eq!(config.max_degree, 8);
//! ```

use geomag_core::{AltitudeUnit, CalendarDate, Datum};

use crate::coefficients::WMM_MAX_DEGREE;
use crate::uncertainty::ErrorModel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Altitude range, in km above the ellipsoid, over which the model's accuracy is validated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AltitudeWindow {
    pub min_km: f64,
    pub max_km: f64,
}

impl AltitudeWindow {
    pub const STANDARD: Self = Self {
        min_km: -1.0,
        max_km: 1900.0,
    };

    pub const MIL_SPEC_600: Self = Self {
        min_km: -1.0,
        max_km: 600.0,
    };

    pub const MIL_SPEC_850: Self = Self {
        min_km: -1.0,
        max_km: 850.0,
    };

    #[inline]
    pub fn contains(&self, altitude_km: f64) -> bool {
        (self.min_km..=self.max_km).contains(&altitude_km)
    }
}

impl Default for AltitudeWindow {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Horizontal-intensity limits, in nT, below which compass headings degrade.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlackoutThresholds {
    /// `H` at or below this is inside the blackout zone.
    pub blackout_nt: f64,
    /// `H` at or below this (and above `blackout_nt`) is approaching it.
    pub caution_nt: f64,
}

impl Default for BlackoutThresholds {
    fn default() -> Self {
        Self {
            blackout_nt: 2000.0,
            caution_nt: 6000.0,
        }
    }
}

/// Settings of a [`MagneticCalculator`](crate::MagneticCalculator).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalculatorConfig {
    /// Highest degree used in the summation; clamped to the table's degree.
    pub max_degree: usize,
    /// Highest degree whose secular variation is applied.
    pub sv_degree: usize,
    pub accuracy_window: AltitudeWindow,
    pub blackout: BlackoutThresholds,
    /// Unit assumed by [`configure_position`](crate::MagneticCalculator::configure_position).
    pub altitude_unit: AltitudeUnit,
    pub datum: Datum,
    /// Error model for uncertainties. `None` picks the one published with the loaded release.
    pub error_model: Option<ErrorModel>,
    /// Date used to fill missing date components. `None` means today in UTC.
    pub reference_date: Option<CalendarDate>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_degree: WMM_MAX_DEGREE,
            sv_degree: WMM_MAX_DEGREE,
            accuracy_window: AltitudeWindow::STANDARD,
            blackout: BlackoutThresholds::default(),
            altitude_unit: AltitudeUnit::Kilometers,
            datum: Datum::Ellipsoid,
            error_model: None,
            reference_date: None,
        }
    }
}

impl CalculatorConfig {
    pub fn with_max_degree(mut self, degree: usize) -> Self {
        self.max_degree = degree;
        self
    }

    pub fn with_sv_degree(mut self, degree: usize) -> Self {
        self.sv_degree = degree;
        self
    }

    pub fn with_accuracy_window(mut self, window: AltitudeWindow) -> Self {
        self.accuracy_window = window;
        self
    }

    pub fn with_blackout(mut self, thresholds: BlackoutThresholds) -> Self {
        self.blackout = thresholds;
        self
    }

    pub fn with_altitude_unit(mut self, unit: AltitudeUnit) -> Self {
        self.altitude_unit = unit;
        self
    }

    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datum = datum;
        self
    }

    pub fn with_error_model(mut self, model: ErrorModel) -> Self {
        self.error_model = Some(model);
        self
    }

    pub fn with_reference_date(mut self, date: CalendarDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// The date missing components are filled from.
    pub fn fill_date(&self) -> CalendarDate {
        self.reference_date.unwrap_or_else(CalendarDate::today)
    }
}
