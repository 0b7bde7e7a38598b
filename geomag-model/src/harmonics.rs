//! Spherical-harmonic synthesis of the field at one point.
//!
//! With `a` the geomagnetic reference radius, `r` the geocentric radius, `λ` the longitude and
//! `θ` the geocentric colatitude, the field components are accumulated over
//! `1 <= n <= nmax, 0 <= m <= n`:
//!
//! ```text
//! Br += (n+1) (a/r)^(n+2) [g cos mλ + h sin mλ] P_n^m
//! Bθ += -(a/r)^(n+2) [g cos mλ + h sin mλ] dP_n^m/dθ
//! Bφ += (a/r)^(n+2) m [g sin mλ - h cos mλ] P_n^m / sin θ
//! ```
//!
//! The geometry-dependent parts ([`SphericalHarmonicVariables`], [`LegendreTable`]) are kept in
//! a [`PointGeometry`] and shared by the main-field and secular-variation passes; only the
//! coefficient vectors differ between them.
//!
//! At the geographic poles `sin θ = 0`. There only the `m = 1` terms survive in `Bφ`, and their
//! `P_n^1 / sin θ` is replaced by its finite limit ([`pole_sectoral_ratio`]).

use geomag_core::constants::{DEG_TO_RAD, GEOMAGNETIC_REFERENCE_RADIUS_KM};
use geomag_core::math::{multiple_angle_sincos, sincos};
use geomag_core::{GeocentricPoint, GeodeticPoint};

use crate::coefficients::term_index;
use crate::elements::{rotate, FieldVector};
use crate::legendre::{pole_sectoral_ratio, LegendreEngine, LegendreTable};

/// Below this `|cos φ'|` the point is treated as a pole.
pub const POLE_COS_LATITUDE_EPSILON: f64 = 1e-10;

/// Longitude and radius terms for one point.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalHarmonicVariables {
    /// `(a/r)^(n+2)` for `n = 0..=nmax`.
    relative_radius_power: Vec<f64>,
    cos_mlambda: Vec<f64>,
    sin_mlambda: Vec<f64>,
}

impl SphericalHarmonicVariables {
    pub fn new(nmax: usize, radius_km: f64, longitude: f64) -> Self {
        let ratio = GEOMAGNETIC_REFERENCE_RADIUS_KM / radius_km;
        let mut relative_radius_power = Vec::with_capacity(nmax + 1);
        let mut power = ratio * ratio;
        for _ in 0..=nmax {
            relative_radius_power.push(power);
            power *= ratio;
        }

        let mut cos_mlambda = vec![0.0; nmax + 1];
        let mut sin_mlambda = vec![0.0; nmax + 1];
        multiple_angle_sincos(longitude * DEG_TO_RAD, &mut cos_mlambda, &mut sin_mlambda);

        Self {
            relative_radius_power,
            cos_mlambda,
            sin_mlambda,
        }
    }

    #[inline]
    pub fn nmax(&self) -> usize {
        self.relative_radius_power.len() - 1
    }

    pub fn relative_radius_power(&self) -> &[f64] {
        &self.relative_radius_power
    }

    pub fn cos_mlambda(&self) -> &[f64] {
        &self.cos_mlambda
    }

    pub fn sin_mlambda(&self) -> &[f64] {
        &self.sin_mlambda
    }
}

/// Field in the geocentric spherical frame: radial, colatitudinal (south) and longitudinal
/// (east) components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SphericalFieldComponents {
    pub br: f64,
    pub bt: f64,
    pub bp: f64,
}

/// Sums the series for coefficients `g`, `h` up to degree `nmax`.
///
/// `g` and `h` must hold at least `term_count(nmax)` entries, and `vars` and `legendre` must be
/// built for at least `nmax`.
pub fn summation(
    nmax: usize,
    vars: &SphericalHarmonicVariables,
    legendre: &LegendreTable,
    g: &[f64],
    h: &[f64],
    geocentric_latitude: f64,
) -> SphericalFieldComponents {
    let p = legendre.p();
    let dp = legendre.dp();
    let (mut br, mut bt, mut bp) = (0.0, 0.0, 0.0);

    for n in 1..=nmax {
        let rr = vars.relative_radius_power[n];
        for m in 0..=n {
            let i = term_index(n, m);
            let (c, s) = (vars.cos_mlambda[m], vars.sin_mlambda[m]);
            let cosine_part = g[i] * c + h[i] * s;
            br += (n + 1) as f64 * rr * cosine_part * p[i];
            bt -= rr * cosine_part * dp[i];
            bp += rr * m as f64 * (g[i] * s - h[i] * c) * p[i];
        }
    }

    let (sin_lat, cos_lat) = sincos(geocentric_latitude * DEG_TO_RAD);
    if cos_lat.abs() > POLE_COS_LATITUDE_EPSILON {
        bp /= cos_lat;
    } else {
        bp = pole_east_component(nmax, vars, g, h, sin_lat);
    }

    SphericalFieldComponents { br, bt, bp }
}

fn pole_east_component(
    nmax: usize,
    vars: &SphericalHarmonicVariables,
    g: &[f64],
    h: &[f64],
    sin_latitude: f64,
) -> f64 {
    let ratio = pole_sectoral_ratio(nmax, sin_latitude);
    let (c, s) = (vars.cos_mlambda[1], vars.sin_mlambda[1]);
    (1..=nmax)
        .map(|n| {
            let i = term_index(n, 1);
            vars.relative_radius_power[n] * (g[i] * s - h[i] * c) * ratio[n]
        })
        .sum()
}

/// Everything about a point that does not depend on the coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGeometry {
    point: GeodeticPoint,
    geocentric: GeocentricPoint,
    variables: SphericalHarmonicVariables,
    legendre: LegendreTable,
}

impl PointGeometry {
    pub fn new(engine: &LegendreEngine, point: GeodeticPoint) -> Self {
        let geocentric = point.to_geocentric();
        let variables =
            SphericalHarmonicVariables::new(engine.nmax(), geocentric.radius_km, point.longitude);
        let legendre = engine.compute(geocentric.colatitude());
        Self {
            point,
            geocentric,
            variables,
            legendre,
        }
    }

    pub fn point(&self) -> &GeodeticPoint {
        &self.point
    }

    pub fn geocentric(&self) -> &GeocentricPoint {
        &self.geocentric
    }

    pub fn variables(&self) -> &SphericalHarmonicVariables {
        &self.variables
    }

    pub fn legendre(&self) -> &LegendreTable {
        &self.legendre
    }

    #[inline]
    pub fn nmax(&self) -> usize {
        self.legendre.nmax()
    }

    /// Spherical components for coefficients `g`, `h`.
    pub fn synthesize(&self, g: &[f64], h: &[f64]) -> SphericalFieldComponents {
        summation(
            self.nmax(),
            &self.variables,
            &self.legendre,
            g,
            h,
            self.geocentric.latitude,
        )
    }

    /// North/east/down field for coefficients `g`, `h`.
    pub fn field(&self, g: &[f64], h: &[f64]) -> FieldVector {
        rotate(
            self.synthesize(g, h),
            self.geocentric.latitude,
            self.point.latitude,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::{term_count, CoefficientStore};
    use crate::timely::project;
    use approx::assert_abs_diff_eq;

    fn geometry(lat: f64, lon: f64, alt: f64) -> PointGeometry {
        PointGeometry::new(
            &LegendreEngine::new(12),
            GeodeticPoint::new(lat, lon, alt).unwrap(),
        )
    }

    #[test]
    fn test_variables() {
        let vars = SphericalHarmonicVariables::new(3, GEOMAGNETIC_REFERENCE_RADIUS_KM, 90.0);
        assert_eq!(vars.nmax(), 3);
        assert!(vars.relative_radius_power().iter().all(|&v| (v - 1.0).abs() < 1e-15));
        assert_abs_diff_eq!(vars.sin_mlambda()[1], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(vars.cos_mlambda()[2], -1.0, epsilon = 1e-15);

        let vars = SphericalHarmonicVariables::new(2, 2.0 * GEOMAGNETIC_REFERENCE_RADIUS_KM, 0.0);
        assert_eq!(vars.relative_radius_power(), &[0.25, 0.125, 0.0625]);
    }

    #[test]
    fn test_axial_dipole() {
        // g(1,0) alone: Br = 2 g cos θ, Bθ = g sin θ at r = a
        let mut g = vec![0.0; term_count(1)];
        let h = vec![0.0; term_count(1)];
        g[term_index(1, 0)] = -30000.0;
        let engine = LegendreEngine::new(1);
        let colat: f64 = 60.0;
        let vars = SphericalHarmonicVariables::new(1, GEOMAGNETIC_REFERENCE_RADIUS_KM, 10.0);
        let table = engine.compute(colat);
        let c = summation(1, &vars, &table, &g, &h, 90.0 - colat);
        let t = colat.to_radians();
        assert_abs_diff_eq!(c.br, 2.0 * -30000.0 * t.cos(), epsilon = 1e-9);
        assert_abs_diff_eq!(c.bt, -30000.0 * t.sin(), epsilon = 1e-9);
        assert_abs_diff_eq!(c.bp, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_point() {
        let store = CoefficientStore::wmm2020().unwrap();
        let timely = project(&store, 2024.5).unwrap();
        let geo = geometry(-18.0, 138.0, 77.0);
        let main = geo.field(timely.g(), timely.h());
        assert_abs_diff_eq!(main.x, 31722.0296, epsilon = 0.01);
        assert_abs_diff_eq!(main.y, 2569.5779, epsilon = 0.01);
        assert_abs_diff_eq!(main.z, -34986.2055, epsilon = 0.01);

        let rate = geo.field(store.g_sv(), store.h_sv());
        assert_abs_diff_eq!(rate.x, -9.0396, epsilon = 0.001);
        assert_abs_diff_eq!(rate.y, -27.7483, epsilon = 0.001);
        assert_abs_diff_eq!(rate.z, -26.7539, epsilon = 0.001);
    }

    #[test]
    fn test_pole_is_continuous() {
        let store = CoefficientStore::wmm2020().unwrap();
        let timely = project(&store, 2022.0).unwrap();
        for (pole, near) in [(90.0, 89.99999), (-90.0, -89.99999)] {
            let at = geometry(pole, 30.0, 0.0).field(timely.g(), timely.h());
            let close = geometry(near, 30.0, 0.0).field(timely.g(), timely.h());
            assert!(at.x.is_finite() && at.y.is_finite() && at.z.is_finite());
            assert_abs_diff_eq!(at.x, close.x, epsilon = 0.1);
            assert_abs_diff_eq!(at.y, close.y, epsilon = 0.1);
            assert_abs_diff_eq!(at.z, close.z, epsilon = 0.1);
        }
    }

    #[test]
    fn test_geometry_accessors() {
        let geo = geometry(45.0, 12.0, 3.0);
        assert_eq!(geo.nmax(), 12);
        assert_eq!(geo.point().longitude, 12.0);
        assert!(geo.geocentric().latitude < 45.0);
        assert_eq!(geo.variables().nmax(), 12);
        assert_eq!(geo.legendre().p().len(), term_count(12));
    }
}
