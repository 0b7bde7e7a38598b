//! Schmidt semi-normalized associated Legendre functions.
//!
//! For a geocentric colatitude `θ` the engine fills `P_n^m(cos θ)` and `dP_n^m/dθ` for every
//! `0 <= m <= n <= nmax`, in the same linear order as the coefficient tables
//! (see [`term_index`]).
//!
//! # Recurrence
//!
//! With `x = cos θ` and `z = sin θ`, unnormalized (Gauss) functions are seeded with
//! `P_0^0 = 1` and built degree by degree:
//!
//! ```text
//! n == m          P_n^n = z P_{n-1}^{n-1}
//!                 dP_n^n = z dP_{n-1}^{n-1} + x P_{n-1}^{n-1}
//! m == n - 1      P_n^m = x P_{n-1}^m
//!                 dP_n^m = x dP_{n-1}^m - z P_{n-1}^m
//! m < n - 1       P_n^m = x P_{n-1}^m - K_n^m P_{n-2}^m
//!                 dP_n^m = x dP_{n-1}^m - z P_{n-1}^m - K_n^m dP_{n-2}^m
//!
//! K_n^m = ((n-1)^2 - m^2) / ((2n-1)(2n-3))
//! ```
//!
//! and then scaled by the Schmidt factors
//!
//! ```text
//! S_n^0 = S_{n-1}^0 (2n-1) / n
//! S_n^m = S_n^{m-1} sqrt((n-m+1) δ / (n+m)),   δ = 2 for m = 1, else 1
//! ```
//!
//! Both `K` and `S` depend only on `(n, m)` and are computed once per engine.
//!
//! Nothing in the recurrence divides by `sin θ`, so the poles are evaluated directly: every
//! `m > 0` term vanishes there. The `1 / sin θ` of the east component is handled by the
//! summation with [`pole_sectoral_ratio`].

use geomag_core::constants::DEG_TO_RAD;
use geomag_core::math::sincos;

use crate::coefficients::{term_count, term_index};

/// Precomputed recurrence and normalization factors for one maximum degree.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreEngine {
    nmax: usize,
    recursion: Vec<f64>,
    schmidt: Vec<f64>,
}

impl LegendreEngine {
    pub fn new(nmax: usize) -> Self {
        let len = term_count(nmax);
        let mut recursion = vec![0.0; len];
        let mut schmidt = vec![0.0; len];

        for n in 2..=nmax {
            for m in 0..n - 1 {
                let (nf, mf) = (n as f64, m as f64);
                recursion[term_index(n, m)] = ((nf - 1.0) * (nf - 1.0) - mf * mf)
                    / ((2.0 * nf - 1.0) * (2.0 * nf - 3.0));
            }
        }

        schmidt[0] = 1.0;
        for n in 1..=nmax {
            let nf = n as f64;
            schmidt[term_index(n, 0)] = schmidt[term_index(n - 1, 0)] * (2.0 * nf - 1.0) / nf;
            for m in 1..=n {
                let mf = m as f64;
                let delta = if m == 1 { 2.0 } else { 1.0 };
                schmidt[term_index(n, m)] = schmidt[term_index(n, m - 1)]
                    * ((nf - mf + 1.0) * delta / (nf + mf)).sqrt();
            }
        }

        Self {
            nmax,
            recursion,
            schmidt,
        }
    }

    #[inline]
    pub fn nmax(&self) -> usize {
        self.nmax
    }

    /// Schmidt normalization factor for degree `n`, order `m`.
    pub fn schmidt(&self, n: usize, m: usize) -> f64 {
        self.schmidt[term_index(n, m)]
    }

    /// Evaluates the table at a geocentric colatitude in degrees.
    pub fn compute(&self, colatitude: f64) -> LegendreTable {
        let mut table = LegendreTable::zeros(self.nmax);
        self.compute_into(colatitude, &mut table);
        table
    }

    /// Evaluates into an existing table, resizing it if its degree differs.
    pub fn compute_into(&self, colatitude: f64, table: &mut LegendreTable) {
        if table.nmax != self.nmax {
            *table = LegendreTable::zeros(self.nmax);
        }
        let (z, x) = sincos(colatitude * DEG_TO_RAD);
        let p = &mut table.p;
        let dp = &mut table.dp;

        p[0] = 1.0;
        dp[0] = 0.0;

        for n in 1..=self.nmax {
            for m in 0..=n {
                let i = term_index(n, m);
                if n == m {
                    let j = term_index(n - 1, m - 1);
                    p[i] = z * p[j];
                    dp[i] = z * dp[j] + x * p[j];
                } else if m + 1 == n {
                    let j = term_index(n - 1, m);
                    p[i] = x * p[j];
                    dp[i] = x * dp[j] - z * p[j];
                } else {
                    let j1 = term_index(n - 1, m);
                    let j2 = term_index(n - 2, m);
                    let k = self.recursion[i];
                    p[i] = x * p[j1] - k * p[j2];
                    dp[i] = x * dp[j1] - z * p[j1] - k * dp[j2];
                }
            }
        }

        for ((p, dp), s) in p.iter_mut().zip(dp.iter_mut()).zip(&self.schmidt) {
            *p *= s;
            *dp *= s;
        }
    }
}

/// `P_n^m` and `dP_n^m/dθ` at one colatitude, flattened by [`term_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreTable {
    nmax: usize,
    p: Vec<f64>,
    dp: Vec<f64>,
}

impl LegendreTable {
    fn zeros(nmax: usize) -> Self {
        let len = term_count(nmax);
        Self {
            nmax,
            p: vec![0.0; len],
            dp: vec![0.0; len],
        }
    }

    #[inline]
    pub fn nmax(&self) -> usize {
        self.nmax
    }

    pub fn p(&self) -> &[f64] {
        &self.p
    }

    pub fn dp(&self) -> &[f64] {
        &self.dp
    }

    #[inline]
    pub fn value(&self, n: usize, m: usize) -> f64 {
        self.p[term_index(n, m)]
    }

    #[inline]
    pub fn derivative(&self, n: usize, m: usize) -> f64 {
        self.dp[term_index(n, m)]
    }
}

/// Evaluates degree `nmax` functions at one colatitude without keeping the engine.
pub fn legendre(nmax: usize, colatitude: f64) -> LegendreTable {
    LegendreEngine::new(nmax).compute(colatitude)
}

/// Limit of the Schmidt-normalized `P_n^1(θ) / sin θ` at a pole, for `n = 0..=nmax`.
///
/// `sin_latitude` is `+1` at the north pole and `-1` at the south pole. Entry 0 is unused by
/// the summation (there is no `n = 0, m = 1` term) and is returned as 1, the seed of the
/// recurrence.
pub fn pole_sectoral_ratio(nmax: usize, sin_latitude: f64) -> Vec<f64> {
    let mut unnormalized = vec![0.0; nmax + 1];
    let mut out = vec![0.0; nmax + 1];
    unnormalized[0] = 1.0;
    out[0] = 1.0;

    let mut schmidt_n0 = 1.0;
    for n in 1..=nmax {
        let nf = n as f64;
        schmidt_n0 *= (2.0 * nf - 1.0) / nf;
        let schmidt_n1 = schmidt_n0 * (2.0 * nf / (nf + 1.0)).sqrt();

        unnormalized[n] = if n == 1 {
            unnormalized[0]
        } else {
            let k = ((nf - 1.0) * (nf - 1.0) - 1.0) / ((2.0 * nf - 1.0) * (2.0 * nf - 3.0));
            sin_latitude * unnormalized[n - 1] - k * unnormalized[n - 2]
        };
        out[n] = unnormalized[n] * schmidt_n1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * (1.0 + b.abs())
    }

    #[test]
    fn test_low_degree_closed_forms() {
        let colat: f64 = 37.0;
        let (s, c) = (colat.to_radians().sin(), colat.to_radians().cos());
        let t = legendre(3, colat);

        assert_eq!(t.value(0, 0), 1.0);
        assert!(close(t.value(1, 0), c, 1e-14));
        assert!(close(t.value(1, 1), s, 1e-14));
        assert!(close(t.value(2, 0), 1.5 * c * c - 0.5, 1e-14));
        assert!(close(t.value(2, 1), 3f64.sqrt() * s * c, 1e-14));
        assert!(close(t.value(2, 2), 3f64.sqrt() / 2.0 * s * s, 1e-14));
        assert!(close(t.value(3, 0), 0.5 * c * (5.0 * c * c - 3.0), 1e-14));
    }

    #[test]
    fn test_derivatives_match_finite_difference() {
        let engine = LegendreEngine::new(12);
        let colat = 61.3;
        let h = 1e-6;
        let lo = engine.compute(colat - h);
        let hi = engine.compute(colat + h);
        let mid = engine.compute(colat);
        let step_rad = 2.0 * h * DEG_TO_RAD;
        for i in 0..term_count(12) {
            let numeric = (hi.p()[i] - lo.p()[i]) / step_rad;
            assert!(
                (numeric - mid.dp()[i]).abs() < 1e-6,
                "index {}: {} vs {}",
                i,
                numeric,
                mid.dp()[i]
            );
        }
    }

    #[test]
    fn test_schmidt_factors() {
        let engine = LegendreEngine::new(4);
        assert_eq!(engine.schmidt(0, 0), 1.0);
        assert_eq!(engine.schmidt(1, 0), 1.0);
        assert!(close(engine.schmidt(1, 1), 1.0, 1e-15));
        assert!(close(engine.schmidt(2, 0), 1.5, 1e-15));
        assert!(close(engine.schmidt(2, 1), 3f64.sqrt(), 1e-15));
    }

    #[test]
    fn test_poles_are_finite_and_sectoral_terms_vanish() {
        let engine = LegendreEngine::new(12);
        for colat in [0.0, 180.0] {
            let t = engine.compute(colat);
            assert!(t.p().iter().chain(t.dp()).all(|v| v.is_finite()));
            for n in 1..=12 {
                for m in 1..=n {
                    assert!(t.value(n, m).abs() < 1e-12);
                }
            }
        }
        let north = engine.compute(0.0);
        let south = engine.compute(180.0);
        for n in 0..=12 {
            assert!(close(north.value(n, 0), 1.0, 1e-12));
            let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
            assert!(close(south.value(n, 0), sign, 1e-12));
        }
    }

    #[test]
    fn test_pole_ratio_matches_limit() {
        let engine = LegendreEngine::new(12);
        for (sin_lat, colat) in [(1.0, 1e-6), (-1.0, 180.0 - 1e-6)] {
            let ratio = pole_sectoral_ratio(12, sin_lat);
            let t = engine.compute(colat);
            let sin_theta = (colat * DEG_TO_RAD).sin();
            for n in 1..=12 {
                let limit = t.value(n, 1) / sin_theta;
                assert!(
                    (ratio[n] - limit).abs() < 1e-8,
                    "n={} {} vs {}",
                    n,
                    ratio[n],
                    limit
                );
            }
        }
    }

    #[test]
    fn test_compute_into_resizes() {
        let mut table = legendre(2, 10.0);
        LegendreEngine::new(5).compute_into(10.0, &mut table);
        assert_eq!(table.nmax(), 5);
        assert_eq!(table.p().len(), term_count(5));
        assert_eq!(table, legendre(5, 10.0));
    }
}
