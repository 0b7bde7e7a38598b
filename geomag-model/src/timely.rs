//! Projection of coefficients to a target decimal year.
//!
//! The model is linear in time about its reference epoch:
//!
//! ```text
//! g(t) = g + g_sv (t - epoch)
//! h(t) = h + h_sv (t - epoch)
//! ```
//!
//! Projection is only defined inside the model's validity window `[min_year, epoch + 5)`.

use geomag_core::GeomagResult;

use crate::coefficients::{term_count, CoefficientTable};

/// Coefficients projected to one decimal year.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelyCoefficients {
    decimal_year: f64,
    g: Vec<f64>,
    h: Vec<f64>,
}

impl TimelyCoefficients {
    /// Decimal year these coefficients were projected to.
    #[inline]
    pub fn decimal_year(&self) -> f64 {
        self.decimal_year
    }

    pub fn g(&self) -> &[f64] {
        &self.g
    }

    pub fn h(&self) -> &[f64] {
        &self.h
    }
}

/// Projects `table` to `decimal_year`, applying secular variation to every degree.
///
/// # Errors
///
/// [`GeomagError::OutOfValidityPeriod`](geomag_core::GeomagError::OutOfValidityPeriod) when
/// `decimal_year` is outside `[min_year, epoch + 5)`.
pub fn project(table: &CoefficientTable, decimal_year: f64) -> GeomagResult<TimelyCoefficients> {
    project_to_degree(table, decimal_year, table.nmax())
}

/// Like [`project`], with secular variation applied only up to degree `sv_degree`.
pub fn project_to_degree(
    table: &CoefficientTable,
    decimal_year: f64,
    sv_degree: usize,
) -> GeomagResult<TimelyCoefficients> {
    table.validity().check(decimal_year)?;

    let dt = decimal_year - table.epoch();
    let sv = SecularVariation::new(table, sv_degree);
    let g = table
        .g()
        .iter()
        .zip(sv.g())
        .map(|(g, g_sv)| g + g_sv * dt)
        .collect();
    let h = table
        .h()
        .iter()
        .zip(sv.h())
        .map(|(h, h_sv)| h + h_sv * dt)
        .collect();

    Ok(TimelyCoefficients {
        decimal_year,
        g,
        h,
    })
}

/// Secular-variation rates with every degree above `sv_degree` zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct SecularVariation {
    sv_degree: usize,
    g: Vec<f64>,
    h: Vec<f64>,
}

impl SecularVariation {
    pub fn new(table: &CoefficientTable, sv_degree: usize) -> Self {
        let sv_degree = sv_degree.min(table.nmax());
        let keep = term_count(sv_degree);
        let mask = |rates: &[f64]| {
            rates
                .iter()
                .enumerate()
                .map(|(i, &v)| if i < keep { v } else { 0.0 })
                .collect::<Vec<_>>()
        };
        Self {
            sv_degree,
            g: mask(table.g_sv()),
            h: mask(table.h_sv()),
        }
    }

    #[inline]
    pub fn sv_degree(&self) -> usize {
        self.sv_degree
    }

    pub fn g(&self) -> &[f64] {
        &self.g
    }

    pub fn h(&self) -> &[f64] {
        &self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::{term_index, CoefficientStore};
    use geomag_core::GeomagError;

    #[test]
    fn test_projection_at_epoch_is_identity() {
        let store = CoefficientStore::wmm2020().unwrap();
        let timely = project(&store, 2020.0).unwrap();
        assert_eq!(timely.g(), store.g());
        assert_eq!(timely.h(), store.h());
        assert_eq!(timely.decimal_year(), 2020.0);
    }

    #[test]
    fn test_linear_extrapolation() {
        let store = CoefficientStore::wmm2020().unwrap();
        let timely = project(&store, 2024.5).unwrap();
        let i = term_index(1, 0);
        assert!((timely.g()[i] - (-29404.5 + 6.7 * 4.5)).abs() < 1e-9);
        let i = term_index(1, 1);
        assert!((timely.h()[i] - (4652.9 - 25.1 * 4.5)).abs() < 1e-9);
        assert_eq!(timely.g()[0], 0.0);
    }

    #[test]
    fn test_projection_before_epoch() {
        let store = CoefficientStore::wmm2020().unwrap();
        let timely = project(&store, 2019.8).unwrap();
        let i = term_index(1, 0);
        assert!((timely.g()[i] - (-29404.5 - 6.7 * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_validity() {
        let store = CoefficientStore::wmm2020().unwrap();
        for year in [2019.0, 2025.0, 2030.0] {
            match project(&store, year) {
                Err(GeomagError::OutOfValidityPeriod {
                    requested,
                    min_year,
                    max_year,
                    ..
                }) => {
                    assert_eq!(requested, year);
                    assert_eq!(min_year, 2019.756);
                    assert_eq!(max_year, 2025.0);
                }
                other => panic!("expected OutOfValidityPeriod, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_sv_degree_masks_high_degrees() {
        let store = CoefficientStore::wmm2020().unwrap();
        let timely = project_to_degree(&store, 2024.0, 1).unwrap();
        assert!((timely.g()[term_index(1, 0)] - (-29404.5 + 6.7 * 4.0)).abs() < 1e-9);
        assert_eq!(timely.g()[term_index(2, 0)], store.g()[term_index(2, 0)]);

        let sv = SecularVariation::new(&store, 1);
        assert_eq!(sv.sv_degree(), 1);
        assert_eq!(sv.g()[term_index(1, 1)], 7.7);
        assert!(sv.g()[term_index(2, 0)..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sv_degree_clamped_to_table() {
        let store = CoefficientStore::wmm2020().unwrap();
        let sv = SecularVariation::new(&store, 40);
        assert_eq!(sv.sv_degree(), 12);
        assert_eq!(sv.g(), store.g_sv());
    }
}
