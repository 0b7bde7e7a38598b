//! Empirical error model.
//!
//! Each model release publishes one uncertainty per element, valid globally over the whole
//! validity period. Only declination depends on position, through the horizontal intensity:
//!
//! ```text
//! σD = min(sqrt(trunc(c)² + (c / H)²), 180)        c = declination offset
//! ```
//!
//! The result is an estimate of commission and omission error, not a measurement.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on the declination uncertainty, in degrees.
pub const MAX_DECLINATION_UNCERTAINTY: f64 = 180.0;

/// Names of the values returned by [`Uncertainty::named_values`], in order.
pub const UNCERTAINTY_NAMES: [&str; 7] = [
    "x_uncertainty",
    "y_uncertainty",
    "z_uncertainty",
    "h_uncertainty",
    "f_uncertainty",
    "declination_uncertainty",
    "inclination_uncertainty",
];

/// Per-release uncertainty constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorModel {
    /// nT
    pub x: f64,
    /// nT
    pub y: f64,
    /// nT
    pub z: f64,
    /// nT
    pub h: f64,
    /// nT
    pub f: f64,
    /// Degrees.
    pub inclination: f64,
    /// Offset `c` of the declination formula.
    pub declination_offset: f64,
}

impl ErrorModel {
    /// WMM2025 error model.
    pub const WMM2025: Self = Self {
        x: 137.0,
        y: 89.0,
        z: 141.0,
        h: 133.0,
        f: 138.0,
        inclination: 0.20,
        declination_offset: 0.26,
    };

    /// WMM2020 error model.
    pub const WMM2020: Self = Self {
        x: 131.0,
        y: 94.0,
        z: 157.0,
        h: 128.0,
        f: 148.0,
        inclination: 0.21,
        declination_offset: 0.26,
    };

    /// Error model published with the release whose epoch is `epoch`.
    ///
    /// Epochs before 2025 get the WMM2020 table, the oldest one carried here.
    pub fn for_epoch(epoch: f64) -> Self {
        if epoch >= 2025.0 {
            Self::WMM2025
        } else {
            Self::WMM2020
        }
    }

    /// Declination uncertainty in degrees for horizontal intensity `h` in nT.
    pub fn declination(&self, h: f64) -> f64 {
        let c = self.declination_offset;
        let whole = c.trunc();
        let value = (whole * whole + (c / h) * (c / h)).sqrt();
        value.min(MAX_DECLINATION_UNCERTAINTY)
    }

    /// Uncertainties at a point with horizontal intensity `h`.
    pub fn estimate(&self, h: f64) -> Uncertainty {
        Uncertainty {
            x: self.x,
            y: self.y,
            z: self.z,
            h: self.h,
            f: self.f,
            declination: self.declination(h),
            inclination: self.inclination,
        }
    }
}

/// One-sigma uncertainties of the seven elements.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Uncertainty {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub h: f64,
    pub f: f64,
    pub declination: f64,
    pub inclination: f64,
}

impl Uncertainty {
    pub fn named_values(&self) -> [(&'static str, f64); 7] {
        let values = [
            self.x,
            self.y,
            self.z,
            self.h,
            self.f,
            self.declination,
            self.inclination,
        ];
        let mut out = [("", 0.0); 7];
        for (slot, (name, value)) in out.iter_mut().zip(UNCERTAINTY_NAMES.iter().zip(values)) {
            *slot = (*name, value);
        }
        out
    }
}

/// Estimates uncertainties for every horizontal intensity in `h`, as named columns.
pub fn estimate(h: &[f64], model: &ErrorModel) -> BTreeMap<&'static str, Vec<f64>> {
    let mut columns: BTreeMap<&'static str, Vec<f64>> = UNCERTAINTY_NAMES
        .iter()
        .map(|&name| (name, Vec::with_capacity(h.len())))
        .collect();
    for &value in h {
        for (name, v) in model.estimate(value).named_values() {
            if let Some(column) = columns.get_mut(name) {
                column.push(v);
            }
        }
    }
    columns
}
