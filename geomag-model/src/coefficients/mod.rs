//! Gauss coefficient tables.
//!
//! A [`CoefficientTable`] holds the main-field coefficients `g`, `h` and their secular-variation
//! rates `g_sv`, `h_sv` for every degree `n` and order `m` up to `nmax`, flattened into one
//! linear index:
//!
//! ```text
//! index(n, m) = n (n + 1) / 2 + m        0 <= m <= n <= nmax
//! ```
//!
//! Index 0 is the monopole `(n, m) = (0, 0)`, which is always zero. The Legendre tables use the
//! same ordering, so a coefficient and its Legendre value share an index.
//!
//! [`CoefficientStore`] is a cheap-to-clone shared handle on one immutable table. Build it once
//! (from a file, a string, or the bundled WMM2020 and WMM2025 models) and hand clones to every
//! calculator.
//!
//! # Example
//!
//! ```
//! use geomag_model::coefficients::{term_index, CoefficientStore};
//!
//! let store = CoefficientStore::wmm2020()?;
//! let table = store.table();
//! assert_eq!(table.nmax(), 12);
//! assert_eq!(table.epoch(), 2020.0);
//! // g(1, 0) is the axial dipole term
//! assert_eq!(table.g()[term_index(1, 0)], -29404.5);
//! # Ok::<(), geomag_core::GeomagError>(())
//! ```

mod parser;

pub use parser::{parse_coefficients, LoadOptions};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use geomag_core::epoch::parse_us_date;
use geomag_core::{GeomagError, GeomagResult};

/// Models are valid for five years after their reference epoch.
pub const VALIDITY_SPAN_YEARS: f64 = 5.0;

/// Highest degree the bundled models carry.
pub const WMM_MAX_DEGREE: usize = 12;

const WMM2020_COF: &str = include_str!("../../coefs/WMM2020.COF");
const WMM2025_COF: &str = include_str!("../../coefs/WMM2025.COF");

/// Linear index of degree `n`, order `m`.
#[inline]
pub const fn term_index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

/// Number of terms in a table complete to degree `nmax`, monopole included.
#[inline]
pub const fn term_count(nmax: usize) -> usize {
    (nmax + 1) * (nmax + 2) / 2
}

/// Inverse of [`term_count`]: the degree whose complete table has exactly `len` terms.
pub fn degree_for_term_count(len: usize) -> Option<usize> {
    (0..).take_while(|&n| term_count(n) <= len).find(|&n| term_count(n) == len)
}

/// Degree and order stored at linear `index`.
pub fn degree_order(index: usize) -> (usize, usize) {
    let mut n = 0;
    while term_count(n) <= index {
        n += 1;
    }
    (n, index - term_index(n, 0))
}

/// Reference epoch and validity metadata read from a coefficient file header.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelHeader {
    /// Reference epoch as a decimal year.
    pub epoch: f64,
    /// Model name, when the header carries one (`WMM-2020`).
    pub name: Option<String>,
    /// Earliest decimal year the model may be evaluated at.
    pub min_year: f64,
    /// Release date as printed in the header, used in error messages.
    pub min_date: String,
}

impl ModelHeader {
    pub fn new(epoch: f64, min_year: f64, min_date: impl Into<String>) -> Self {
        Self {
            epoch,
            name: None,
            min_year,
            min_date: min_date.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parses a header line.
    ///
    /// Accepted layouts:
    ///
    /// ```text
    /// epoch name min_year min_date      2020.0 WMM-2020 2019.756 12/10/2019
    /// epoch min_year min_date           2020.0 2019.756 12/10/2019
    /// epoch name release_date           2020.0 WMM-2020 12/10/2019
    /// ```
    ///
    /// In the last form `min_year` is the release date as a decimal year.
    pub fn parse(fields: &[&str], line: usize) -> GeomagResult<Self> {
        let epoch = parse_number(fields.first().copied(), line, "epoch")?;
        match fields.len() {
            0..=2 => Err(GeomagError::malformed(
                line,
                format!(
                    "header needs an epoch, a minimum year and a release date, found {} field(s)",
                    fields.len()
                ),
            )),
            3 => {
                if let Ok(min_year) = fields[1].parse::<f64>() {
                    return Ok(Self::new(epoch, min_year, fields[2]));
                }
                let min_year = parse_us_date(fields[2]).ok_or_else(|| {
                    GeomagError::malformed(
                        line,
                        format!("release date '{}' is not MM/DD/YYYY", fields[2]),
                    )
                })?;
                Ok(Self::new(epoch, min_year, fields[2]).with_name(fields[1]))
            }
            _ => {
                let min_year = parse_number(Some(fields[2]), line, "minimum year")?;
                Ok(Self::new(epoch, min_year, fields[3]).with_name(fields[1]))
            }
        }
    }
}

fn parse_number(field: Option<&str>, line: usize, what: &str) -> GeomagResult<f64> {
    let text = field.ok_or_else(|| GeomagError::malformed(line, format!("missing {}", what)))?;
    text.parse::<f64>()
        .map_err(|_| GeomagError::malformed(line, format!("{} '{}' is not a number", what, text)))
}

/// Interval `[min_year, max_year)` of decimal years a model may be evaluated at.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidityWindow {
    pub min_year: f64,
    pub max_year: f64,
    pub min_date: String,
}

impl ValidityWindow {
    #[inline]
    pub fn contains(&self, decimal_year: f64) -> bool {
        decimal_year >= self.min_year && decimal_year < self.max_year
    }

    /// Returns `decimal_year` unchanged if it lies in the window.
    ///
    /// # Errors
    ///
    /// [`GeomagError::OutOfValidityPeriod`] naming the window otherwise (NaN included).
    pub fn check(&self, decimal_year: f64) -> GeomagResult<f64> {
        if self.contains(decimal_year) {
            return Ok(decimal_year);
        }
        Err(GeomagError::out_of_validity(
            decimal_year,
            self.min_year,
            self.max_year,
            &self.min_date,
        ))
    }
}

impl fmt::Display for ValidityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.3}, {:.1}) from {}",
            self.min_year, self.max_year, self.min_date
        )
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientTerm {
    pub n: usize,
    pub m: usize,
    pub g: f64,
    pub h: f64,
    pub g_sv: f64,
    pub h_sv: f64,
}

/// Immutable Gauss coefficients of one model epoch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoefficientTable {
    header: ModelHeader,
    nmax: usize,
    g: Vec<f64>,
    h: Vec<f64>,
    g_sv: Vec<f64>,
    h_sv: Vec<f64>,
}

impl CoefficientTable {
    /// Builds a table from flattened coefficient arrays.
    ///
    /// All four arrays must have the same length, and that length must be a complete
    /// triangular table (`term_count(nmax)` for some `nmax >= 1`). The monopole entry is
    /// forced to zero.
    pub fn new(
        header: ModelHeader,
        mut g: Vec<f64>,
        mut h: Vec<f64>,
        mut g_sv: Vec<f64>,
        mut h_sv: Vec<f64>,
    ) -> GeomagResult<Self> {
        let len = g.len();
        if h.len() != len || g_sv.len() != len || h_sv.len() != len {
            return Err(GeomagError::malformed(
                0,
                format!(
                    "coefficient arrays differ in length: g={}, h={}, g_sv={}, h_sv={}",
                    len,
                    h.len(),
                    g_sv.len(),
                    h_sv.len()
                ),
            ));
        }
        let nmax = match degree_for_term_count(len) {
            Some(n) if n >= 1 => n,
            _ => {
                return Err(GeomagError::malformed(
                    0,
                    format!(
                        "{} coefficients do not form a complete set of degrees 0..=nmax",
                        len
                    ),
                ))
            }
        };
        for values in [&mut g, &mut h, &mut g_sv, &mut h_sv] {
            values[0] = 0.0;
        }
        if let Some(index) = g
            .iter()
            .chain(&h)
            .chain(&g_sv)
            .chain(&h_sv)
            .position(|v| !v.is_finite())
        {
            let (n, m) = degree_order(index % len);
            return Err(GeomagError::malformed(
                0,
                format!("non-finite coefficient at degree {} order {}", n, m),
            ));
        }
        Ok(Self {
            header,
            nmax,
            g,
            h,
            g_sv,
            h_sv,
        })
    }

    pub fn header(&self) -> &ModelHeader {
        &self.header
    }

    #[inline]
    pub fn epoch(&self) -> f64 {
        self.header.epoch
    }

    #[inline]
    pub fn min_year(&self) -> f64 {
        self.header.min_year
    }

    /// First decimal year past the end of the validity period.
    #[inline]
    pub fn max_year(&self) -> f64 {
        self.header.epoch + VALIDITY_SPAN_YEARS
    }

    pub fn validity(&self) -> ValidityWindow {
        ValidityWindow {
            min_year: self.min_year(),
            max_year: self.max_year(),
            min_date: self.header.min_date.clone(),
        }
    }

    /// Maximum spherical-harmonic degree.
    #[inline]
    pub fn nmax(&self) -> usize {
        self.nmax
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.g.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.g.is_empty()
    }

    pub fn g(&self) -> &[f64] {
        &self.g
    }

    pub fn h(&self) -> &[f64] {
        &self.h
    }

    pub fn g_sv(&self) -> &[f64] {
        &self.g_sv
    }

    pub fn h_sv(&self) -> &[f64] {
        &self.h_sv
    }

    /// Whether any secular-variation rate is non-zero.
    pub fn has_secular_variation(&self) -> bool {
        self.g_sv.iter().chain(&self.h_sv).any(|&v| v != 0.0)
    }

    /// Row for degree `n`, order `m`, or `None` outside the table.
    pub fn term(&self, n: usize, m: usize) -> Option<CoefficientTerm> {
        if m > n || n > self.nmax {
            return None;
        }
        let i = term_index(n, m);
        Some(CoefficientTerm {
            n,
            m,
            g: self.g[i],
            h: self.h[i],
            g_sv: self.g_sv[i],
            h_sv: self.h_sv[i],
        })
    }

    /// Rows in index order, monopole included.
    pub fn terms(&self) -> impl Iterator<Item = CoefficientTerm> + '_ {
        (0..=self.nmax).flat_map(move |n| (0..=n).filter_map(move |m| self.term(n, m)))
    }

    /// Copy of this table restricted to degrees `0..=nmax`.
    pub fn truncated(&self, nmax: usize) -> GeomagResult<Self> {
        let len = term_count(nmax.clamp(1, self.nmax));
        Self::new(
            self.header.clone(),
            self.g[..len].to_vec(),
            self.h[..len].to_vec(),
            self.g_sv[..len].to_vec(),
            self.h_sv[..len].to_vec(),
        )
    }
}

/// Shared, immutable handle on a [`CoefficientTable`].
#[derive(Debug, Clone)]
pub struct CoefficientStore {
    table: Arc<CoefficientTable>,
}

impl CoefficientStore {
    pub fn from_table(table: CoefficientTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Parses coefficient text.
    pub fn parse(content: &str, options: &LoadOptions) -> GeomagResult<Self> {
        parse_coefficients(content, options).map(Self::from_table)
    }

    /// Reads and parses a coefficient file.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> GeomagResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GeomagError::io(path.display().to_string(), e.to_string()))?;
        let store = Self::parse(&content, options)?;
        tracing::info!(
            path = %path.display(),
            epoch = store.table.epoch(),
            nmax = store.table.nmax(),
            "Loaded coefficient table"
        );
        Ok(store)
    }

    /// The World Magnetic Model 2020, bundled with the crate.
    pub fn wmm2020() -> GeomagResult<Self> {
        Self::parse(WMM2020_COF, &LoadOptions::default())
    }

    /// The World Magnetic Model 2025, bundled with the crate.
    pub fn wmm2025() -> GeomagResult<Self> {
        Self::parse(WMM2025_COF, &LoadOptions::default())
    }

    pub fn table(&self) -> &CoefficientTable {
        &self.table
    }

    /// Whether two handles share the same table allocation.
    pub fn same_table(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }
}

impl std::ops::Deref for CoefficientStore {
    type Target = CoefficientTable;

    fn deref(&self) -> &Self::Target {
        &self.table
    }
}
