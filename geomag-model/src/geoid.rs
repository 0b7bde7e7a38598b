//! Mean-sea-level to ellipsoid height correction.
//!
//! The field model needs heights above the WGS84 ellipsoid. Heights above mean sea level differ
//! by the geoid undulation `N`:
//!
//! ```text
//! h_ellipsoid = h_msl + N(lat, lon)
//! ```
//!
//! No geoid ships with this crate. Callers plug one in through [`GeoidModel`]; [`GeoidGrid`]
//! covers the common case of a regular latitude/longitude grid of undulations.

use std::fmt;

use geomag_core::constants::KM_PER_METER;
use geomag_core::{Datum, GeomagError, GeomagResult};

/// Source of geoid undulations.
pub trait GeoidModel: Send + Sync + fmt::Debug {
    /// Geoid height above the WGS84 ellipsoid, in metres.
    fn undulation(&self, latitude: f64, longitude: f64) -> GeomagResult<f64>;
}

/// Converts an altitude in km relative to `datum` into km above the ellipsoid.
///
/// # Errors
///
/// [`GeomagError::GeoidUnavailable`] for [`Datum::MeanSeaLevel`] without a geoid, or whatever
/// the geoid itself reports.
pub fn to_ellipsoid_height(
    altitude_km: f64,
    latitude: f64,
    longitude: f64,
    datum: Datum,
    geoid: Option<&dyn GeoidModel>,
) -> GeomagResult<f64> {
    match datum {
        Datum::Ellipsoid => Ok(altitude_km),
        Datum::MeanSeaLevel => {
            let geoid = geoid.ok_or(GeomagError::GeoidUnavailable)?;
            let undulation_m = geoid.undulation(latitude, longitude)?;
            Ok(altitude_km + undulation_m * KM_PER_METER)
        }
    }
}

/// Undulations on a regular grid, bilinearly interpolated.
///
/// Row 0 is the southern edge and column 0 the western edge; heights are stored row-major.
/// A grid spanning 360° of longitude wraps around the antimeridian. Points outside the grid's
/// latitude range are clamped to its edge, and points outside a regional grid's longitude range
/// to the nearer of its two edges.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoidGrid {
    south: f64,
    west: f64,
    spacing: f64,
    rows: usize,
    cols: usize,
    heights: Vec<f64>,
}

impl GeoidGrid {
    /// Returns `None` unless the grid has at least 2×2 nodes, a positive spacing and
    /// `rows * cols` heights.
    pub fn new(
        south: f64,
        west: f64,
        spacing: f64,
        rows: usize,
        cols: usize,
        heights: Vec<f64>,
    ) -> Option<Self> {
        if rows < 2 || cols < 2 || spacing <= 0.0 || heights.len() != rows * cols {
            return None;
        }
        Some(Self {
            south,
            west,
            spacing,
            rows,
            cols,
            heights,
        })
    }

    /// A grid covering the whole globe from (-90, -180), with `180 / spacing + 1` rows and
    /// `360 / spacing` columns.
    pub fn global(spacing: f64, heights: Vec<f64>) -> Option<Self> {
        if spacing <= 0.0 {
            return None;
        }
        let rows = (180.0 / spacing).round() as usize + 1;
        let cols = (360.0 / spacing).round() as usize;
        Self::new(-90.0, -180.0, spacing, rows, cols, heights)
    }

    fn wraps(&self) -> bool {
        (self.cols as f64 * self.spacing - 360.0).abs() < 1e-9
    }

    fn node(&self, row: usize, col: usize) -> f64 {
        self.heights[row * self.cols + col]
    }
}

impl GeoidModel for GeoidGrid {
    fn undulation(&self, latitude: f64, longitude: f64) -> GeomagResult<f64> {
        let max_row = (self.rows - 1) as f64;
        let row_f = ((latitude - self.south) / self.spacing).clamp(0.0, max_row);

        let mut offset = (longitude - self.west).rem_euclid(360.0);
        let col_f = if self.wraps() {
            offset / self.spacing
        } else {
            let span = (self.cols - 1) as f64 * self.spacing;
            if offset > span + (360.0 - span) / 2.0 {
                offset -= 360.0;
            }
            (offset / self.spacing).clamp(0.0, (self.cols - 1) as f64)
        };

        let row0 = (row_f.floor() as usize).min(self.rows - 2);
        let t = row_f - row0 as f64;

        let col0 = (col_f.floor() as usize).min(self.cols - 1);
        let u = col_f - col0 as f64;
        let col1 = if self.wraps() {
            (col0 + 1) % self.cols
        } else {
            (col0 + 1).min(self.cols - 1)
        };

        let south = self.node(row0, col0) * (1.0 - u) + self.node(row0, col1) * u;
        let north = self.node(row0 + 1, col0) * (1.0 - u) + self.node(row0 + 1, col1) * u;
        Ok(south * (1.0 - t) + north * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp() -> GeoidGrid {
        // 3 rows (lat 0, 10, 20) x 3 cols (lon 0, 10, 20); height = lat + 2 lon
        let mut heights = Vec::new();
        for r in 0..3 {
            for c in 0..3 {
                heights.push((r * 10) as f64 + 2.0 * (c * 10) as f64);
            }
        }
        GeoidGrid::new(0.0, 0.0, 10.0, 3, 3, heights).unwrap()
    }

    #[test]
    fn test_bilinear_reproduces_plane() {
        let grid = ramp();
        assert_abs_diff_eq!(grid.undulation(5.0, 5.0).unwrap(), 15.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.undulation(12.5, 17.5).unwrap(), 47.5, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.undulation(20.0, 20.0).unwrap(), 60.0, epsilon = 1e-12);
    }

    #[test]
    fn test_latitude_clamped() {
        let grid = ramp();
        assert_abs_diff_eq!(grid.undulation(-30.0, 0.0).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.undulation(80.0, 0.0).unwrap(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_global_grid_wraps() {
        // 90° spacing: 3 rows, 4 columns at lon -180, -90, 0, 90
        let heights = vec![
            0.0, 0.0, 0.0, 0.0, //
            10.0, 20.0, 30.0, 40.0, //
            0.0, 0.0, 0.0, 0.0,
        ];
        let grid = GeoidGrid::global(90.0, heights).unwrap();
        assert_abs_diff_eq!(grid.undulation(0.0, 0.0).unwrap(), 30.0, epsilon = 1e-12);
        // Halfway between lon 90 (40) and lon 180 == -180 (10)
        assert_abs_diff_eq!(grid.undulation(0.0, 135.0).unwrap(), 25.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.undulation(0.0, 315.0).unwrap(), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_regional_grid_wider_than_half_turn() {
        // 2 rows x 20 cols covering lon 0..190; height = lon
        let heights: Vec<f64> = (0..2)
            .flat_map(|_| (0..20).map(|c| (c * 10) as f64))
            .collect();
        let grid = GeoidGrid::new(0.0, 0.0, 10.0, 2, 20, heights).unwrap();
        assert_abs_diff_eq!(grid.undulation(5.0, 185.0).unwrap(), 185.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.undulation(5.0, -175.0).unwrap(), 185.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.undulation(5.0, 250.0).unwrap(), 190.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.undulation(5.0, -5.0).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_grids() {
        assert!(GeoidGrid::new(0.0, 0.0, 1.0, 1, 3, vec![0.0; 3]).is_none());
        assert!(GeoidGrid::new(0.0, 0.0, 0.0, 2, 2, vec![0.0; 4]).is_none());
        assert!(GeoidGrid::new(0.0, 0.0, 1.0, 2, 2, vec![0.0; 5]).is_none());
        assert!(GeoidGrid::global(-1.0, vec![]).is_none());
    }

    #[test]
    fn test_to_ellipsoid_height() {
        let grid = ramp();
        assert_eq!(
            to_ellipsoid_height(1.0, 5.0, 5.0, Datum::Ellipsoid, None).unwrap(),
            1.0
        );
        let h = to_ellipsoid_height(1.0, 5.0, 5.0, Datum::MeanSeaLevel, Some(&grid as &dyn GeoidModel))
            .unwrap();
        assert_abs_diff_eq!(h, 1.015, epsilon = 1e-12);
        assert_eq!(
            to_ellipsoid_height(1.0, 5.0, 5.0, Datum::MeanSeaLevel, None).unwrap_err(),
            GeomagError::GeoidUnavailable
        );
    }
}
