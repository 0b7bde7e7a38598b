//! Field vectors in the local geodetic frame and the elements derived from them.
//!
//! | Element | Symbol | Formula | Unit |
//! |---------|--------|---------|------|
//! | North | X | | nT |
//! | East | Y | | nT |
//! | Down | Z | | nT |
//! | Horizontal intensity | H | `sqrt(X² + Y²)` | nT |
//! | Total intensity | F | `sqrt(H² + Z²)` | nT |
//! | Declination | D | `atan2(Y, X)` | degrees |
//! | Inclination | I | `atan2(Z, H)` | degrees |
//!
//! Rates are in nT/year, except `dD` and `dI` which are in arcminutes/year. They come from the
//! time derivative of each formula, not from feeding the rate vector through the formulas:
//!
//! ```text
//! dH = (X dX + Y dY) / H
//! dF = (X dX + Y dY + Z dZ) / F
//! dD = (X dY - Y dX) / H²
//! dI = (H dZ - Z dH) / F²
//! ```

use geomag_core::constants::{ARCMIN_PER_DEGREE, DEG_TO_RAD, RAD_TO_DEG};
use geomag_core::math::{atan2_degrees, hypot, sincos};
use geomag_core::utils::wrap_half_turn;

use crate::harmonics::SphericalFieldComponents;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Names of the values returned by [`ElementsWithRate::named_values`], in order.
pub const ELEMENT_NAMES: [&str; 14] = [
    "x",
    "y",
    "z",
    "h",
    "f",
    "declination",
    "inclination",
    "dx",
    "dy",
    "dz",
    "dh",
    "df",
    "ddeclination",
    "dinclination",
];

/// North, east and down components in the geodetic frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FieldVector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn horizontal_intensity(&self) -> f64 {
        hypot(self.x, self.y)
    }

    #[inline]
    pub fn total_intensity(&self) -> f64 {
        hypot(self.horizontal_intensity(), self.z)
    }

    #[inline]
    pub fn declination(&self) -> f64 {
        atan2_degrees(self.y, self.x)
    }

    #[inline]
    pub fn inclination(&self) -> f64 {
        atan2_degrees(self.z, self.horizontal_intensity())
    }

    pub fn elements(&self) -> MagneticElements {
        MagneticElements::from_field(*self)
    }
}

/// Rotates spherical components `(Br, Bθ, Bφ)` into the geodetic north/east/down frame.
///
/// The rotation angle is the difference between geocentric and geodetic latitude.
pub fn rotate(
    components: SphericalFieldComponents,
    geocentric_latitude: f64,
    geodetic_latitude: f64,
) -> FieldVector {
    let psi = (geocentric_latitude - geodetic_latitude) * DEG_TO_RAD;
    let (sin_psi, cos_psi) = sincos(psi);
    let SphericalFieldComponents { br, bt, bp } = components;
    FieldVector {
        x: -bt * cos_psi + br * sin_psi,
        y: bp,
        z: -bt * sin_psi - br * cos_psi,
    }
}

/// The seven magnetic elements at one point and time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MagneticElements {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub h: f64,
    pub f: f64,
    /// Degrees east of true north.
    pub declination: f64,
    /// Degrees below the horizontal.
    pub inclination: f64,
}

impl MagneticElements {
    pub fn from_field(field: FieldVector) -> Self {
        let h = field.horizontal_intensity();
        Self {
            x: field.x,
            y: field.y,
            z: field.z,
            h,
            f: hypot(h, field.z),
            declination: field.declination(),
            inclination: atan2_degrees(field.z, h),
        }
    }

    pub fn field(&self) -> FieldVector {
        FieldVector::new(self.x, self.y, self.z)
    }
}

/// Yearly rates of change of the magnetic elements.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementRates {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub dh: f64,
    pub df: f64,
    /// Arcminutes per year, wrapped into (-180, 180].
    pub ddeclination: f64,
    /// Arcminutes per year.
    pub dinclination: f64,
}

impl ElementRates {
    /// Applies the chain rule to the rate vector `rate` at the field `main`.
    ///
    /// `dH`, `dD` are not finite where `H = 0`, and `dF`, `dI` where `F = 0`.
    pub fn from_field(main: &MagneticElements, rate: FieldVector) -> Self {
        let MagneticElements { x, y, z, h, f, .. } = *main;
        let dh = (x * rate.x + y * rate.y) / h;
        let df = (x * rate.x + y * rate.y + z * rate.z) / f;
        let ddeclination = (x * rate.y - y * rate.x) / (h * h) * RAD_TO_DEG * ARCMIN_PER_DEGREE;
        let dinclination = (h * rate.z - z * dh) / (f * f) * RAD_TO_DEG * ARCMIN_PER_DEGREE;
        Self {
            dx: rate.x,
            dy: rate.y,
            dz: rate.z,
            dh,
            df,
            ddeclination: wrap_half_turn(ddeclination),
            dinclination,
        }
    }

    pub fn field(&self) -> FieldVector {
        FieldVector::new(self.dx, self.dy, self.dz)
    }
}

/// Elements together with their secular variation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementsWithRate {
    pub elements: MagneticElements,
    pub rates: ElementRates,
}

impl ElementsWithRate {
    pub fn new(main: FieldVector, rate: FieldVector) -> Self {
        let elements = MagneticElements::from_field(main);
        let rates = ElementRates::from_field(&elements, rate);
        Self { elements, rates }
    }

    pub fn x(&self) -> f64 {
        self.elements.x
    }

    pub fn y(&self) -> f64 {
        self.elements.y
    }

    pub fn z(&self) -> f64 {
        self.elements.z
    }

    pub fn h(&self) -> f64 {
        self.elements.h
    }

    pub fn f(&self) -> f64 {
        self.elements.f
    }

    pub fn declination(&self) -> f64 {
        self.elements.declination
    }

    pub fn inclination(&self) -> f64 {
        self.elements.inclination
    }

    pub fn dx(&self) -> f64 {
        self.rates.dx
    }

    pub fn dy(&self) -> f64 {
        self.rates.dy
    }

    pub fn dz(&self) -> f64 {
        self.rates.dz
    }

    pub fn dh(&self) -> f64 {
        self.rates.dh
    }

    pub fn df(&self) -> f64 {
        self.rates.df
    }

    pub fn ddeclination(&self) -> f64 {
        self.rates.ddeclination
    }

    pub fn dinclination(&self) -> f64 {
        self.rates.dinclination
    }

    /// All fourteen values keyed by [`ELEMENT_NAMES`].
    pub fn named_values(&self) -> [(&'static str, f64); 14] {
        let e = &self.elements;
        let r = &self.rates;
        let values = [
            e.x,
            e.y,
            e.z,
            e.h,
            e.f,
            e.declination,
            e.inclination,
            r.dx,
            r.dy,
            r.dz,
            r.dh,
            r.df,
            r.ddeclination,
            r.dinclination,
        ];
        let mut out = [("", 0.0); 14];
        for (slot, (name, value)) in out.iter_mut().zip(ELEMENT_NAMES.iter().zip(values)) {
            *slot = (*name, value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_elements() {
        let e = FieldVector::new(3.0, 4.0, 12.0).elements();
        assert_relative_eq!(e.h, 5.0);
        assert_relative_eq!(e.f, 13.0);
        assert_relative_eq!(e.declination, (4.0f64).atan2(3.0).to_degrees());
        assert_relative_eq!(e.inclination, (12.0f64).atan2(5.0).to_degrees());
    }

    #[test]
    fn test_declination_quadrants() {
        assert_relative_eq!(FieldVector::new(-1.0, 1.0, 0.0).declination(), 135.0);
        assert_relative_eq!(FieldVector::new(-1.0, -1.0, 0.0).declination(), -135.0);
        assert_relative_eq!(FieldVector::new(1.0, 0.0, -1.0).inclination(), -45.0);
    }

    #[test]
    fn test_rotation_without_latitude_difference() {
        let c = SphericalFieldComponents {
            br: 10.0,
            bt: 20.0,
            bp: 30.0,
        };
        let v = rotate(c, 0.0, 0.0);
        assert_eq!(v, FieldVector::new(-20.0, 30.0, -10.0));
    }

    #[test]
    fn test_rotation_preserves_magnitude() {
        let c = SphericalFieldComponents {
            br: -34000.0,
            bt: -31000.0,
            bp: 2500.0,
        };
        let v = rotate(c, -17.888548588789345, -18.0);
        let before = (c.br * c.br + c.bt * c.bt + c.bp * c.bp).sqrt();
        assert_relative_eq!(v.total_intensity(), before, max_relative = 1e-14);
    }

    #[test]
    fn test_rates_match_finite_difference() {
        let main = FieldVector::new(31722.0, 2569.6, -34986.2);
        let rate = FieldVector::new(-9.04, -27.75, -26.75);
        let ewr = ElementsWithRate::new(main, rate);

        let dt = 1e-4;
        let later = FieldVector::new(
            main.x + rate.x * dt,
            main.y + rate.y * dt,
            main.z + rate.z * dt,
        )
        .elements();
        let now = main.elements();
        assert_relative_eq!(ewr.dh(), (later.h - now.h) / dt, max_relative = 1e-6);
        assert_relative_eq!(ewr.df(), (later.f - now.f) / dt, max_relative = 1e-6);
        assert_relative_eq!(
            ewr.ddeclination(),
            (later.declination - now.declination) / dt * 60.0,
            max_relative = 1e-5
        );
        assert_relative_eq!(
            ewr.dinclination(),
            (later.inclination - now.inclination) / dt * 60.0,
            max_relative = 1e-5
        );
    }

    #[test]
    fn test_rates_are_not_formulas_of_the_rate_vector() {
        let main = FieldVector::new(20000.0, 1000.0, 40000.0);
        let rate = FieldVector::new(10.0, -5.0, 3.0);
        let ewr = ElementsWithRate::new(main, rate);
        assert!((ewr.dh() - rate.horizontal_intensity()).abs() > 1.0);
        assert_eq!(ewr.dx(), 10.0);
        assert_eq!(ewr.rates.field(), rate);
    }

    #[test]
    fn test_named_values_order() {
        let ewr = ElementsWithRate::new(
            FieldVector::new(1.0, 2.0, 3.0),
            FieldVector::new(0.1, 0.2, 0.3),
        );
        let named = ewr.named_values();
        let names: Vec<_> = named.iter().map(|(k, _)| *k).collect();
        assert_eq!(names, ELEMENT_NAMES.to_vec());
        assert_eq!(named[2], ("z", 3.0));
        assert_eq!(named[9], ("dz", 0.3));
        assert_eq!(named[5].1, ewr.declination());
    }
}
