//! Stateless evaluation: coefficients and a point in, elements out.
//!
//! These functions hold no caches and share nothing mutable, so batches can be split across
//! threads freely. With the `parallel` feature [`evaluate_points`] does this itself.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use geomag_core::{GeodeticPoint, GeomagResult};

use crate::coefficients::CoefficientTable;
use crate::elements::ElementsWithRate;
use crate::harmonics::PointGeometry;
use crate::legendre::LegendreEngine;
use crate::timely::project;

/// A geodetic point at a decimal year.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointInTime {
    pub point: GeodeticPoint,
    pub decimal_year: f64,
}

impl PointInTime {
    pub fn new(point: GeodeticPoint, decimal_year: f64) -> Self {
        Self {
            point,
            decimal_year,
        }
    }
}

/// Evaluates the full model at one point and time.
pub fn evaluate_point(
    table: &CoefficientTable,
    point: &GeodeticPoint,
    decimal_year: f64,
) -> GeomagResult<ElementsWithRate> {
    let engine = LegendreEngine::new(table.nmax());
    evaluate_with(&engine, table, &PointInTime::new(*point, decimal_year))
}

fn evaluate_with(
    engine: &LegendreEngine,
    table: &CoefficientTable,
    sample: &PointInTime,
) -> GeomagResult<ElementsWithRate> {
    let timely = project(table, sample.decimal_year)?;
    let geometry = PointGeometry::new(engine, sample.point);
    let main = geometry.field(timely.g(), timely.h());
    let rate = geometry.field(table.g_sv(), table.h_sv());
    Ok(ElementsWithRate::new(main, rate))
}

/// Evaluates the full model at many points; the first failing sample aborts the batch.
pub fn evaluate_points(
    table: &CoefficientTable,
    samples: &[PointInTime],
) -> GeomagResult<Vec<ElementsWithRate>> {
    let engine = LegendreEngine::new(table.nmax());

    #[cfg(feature = "parallel")]
    {
        samples
            .par_iter()
            .map(|s| evaluate_with(&engine, table, s))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        samples
            .iter()
            .map(|s| evaluate_with(&engine, table, s))
            .collect()
    }
}
