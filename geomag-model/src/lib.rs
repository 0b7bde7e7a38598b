//! Spherical-harmonic geomagnetic field evaluation.
//!
//! `geomag-model` evaluates WMM-style main-field models: given Gauss coefficients with secular
//! variation, a geodetic position and a decimal year, it produces the field vector, the seven
//! magnetic elements, their yearly rates of change and the model's uncertainty estimates.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`coefficients`] | Coefficient tables, the file parser, the bundled WMM2020 and WMM2025 models |
//! | [`timely`] | Projection of coefficients to a decimal year |
//! | [`legendre`] | Schmidt semi-normalized associated Legendre functions |
//! | [`harmonics`] | Spherical-harmonic summation and per-point geometry |
//! | [`elements`] | Rotation to the geodetic frame, derived elements and rates |
//! | [`uncertainty`] | Per-release error model |
//! | [`geoid`] | Mean-sea-level to ellipsoid height correction |
//! | [`broadcast`] | Scalar-or-vector inputs and broadcasting |
//! | [`advisory`] | Non-fatal advisories and [`Evaluation`] |
//! | [`config`] | [`CalculatorConfig`] |
//! | [`calculator`] | [`MagneticCalculator`], the stateful façade |
//! | [`point`] | Stateless per-point evaluation |
//!
//! # Example
//!
//! ```
//! use geomag_core::GeodeticPoint;
//! use geomag_model::{evaluate_point, CoefficientStore};
//!
//! let store = CoefficientStore::wmm2020()?;
//! let point = GeodeticPoint::new(-18.0, 138.0, 77.0)?;
//! let elements = evaluate_point(&store, &point, 2024.5)?;
//! assert!((elements.z() + 34986.2).abs() < 0.1);
//! # Ok::<(), geomag_core::GeomagError>(())
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` on configuration and result types.
//! - `parallel`: [`evaluate_points`] runs on the rayon thread pool.

pub mod advisory;
pub mod broadcast;
pub mod calculator;
pub mod coefficients;
pub mod config;
pub mod elements;
pub mod geoid;
pub mod harmonics;
pub mod legendre;
pub mod point;
pub mod timely;
pub mod uncertainty;

pub use advisory::{Advisory, Evaluation};
pub use broadcast::Samples;
pub use calculator::{CalculatorState, MagneticCalculator, NamedValues, TimeRequest};
pub use coefficients::{CoefficientStore, CoefficientTable, LoadOptions};
pub use config::{AltitudeWindow, BlackoutThresholds, CalculatorConfig};
pub use elements::{ElementRates, ElementsWithRate, FieldVector, MagneticElements};
pub use geoid::{GeoidGrid, GeoidModel};
pub use point::{evaluate_point, evaluate_points, PointInTime};
pub use timely::{project, TimelyCoefficients};
pub use uncertainty::{ErrorModel, Uncertainty};
