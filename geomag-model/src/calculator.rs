//! Stateful evaluation façade.
//!
//! A [`MagneticCalculator`] owns a shared coefficient table and the caches that make repeated
//! evaluation cheap. It is configured in two independent steps, time and position, and can be
//! evaluated once both are set:
//!
//! ```text
//!                 configure_time                configure_environment
//! Uninitialized ───────────────▶ TimeConfigured ─────────────────────▶ Ready
//!       │                                                               ▲
//!       └──────────▶ EnvironmentConfigured ─────────────────────────────┘
//!   configure_environment                    configure_time
//! ```
//!
//! Each configuration call either succeeds completely or leaves the calculator exactly as it
//! was. Projected coefficients are cached per decimal year and point geometry per position, so
//! reconfiguring with an unchanged value recomputes nothing.
//!
//! Every evaluation returns an [`Evaluation`]: points whose horizontal intensity falls in or
//! near the blackout zone raise an advisory whichever quantity is asked for.
//!
//! # Example
//!
//! ```
//! use geomag_model::{MagneticCalculator, TimeRequest};
//!
//! let mut calc = MagneticCalculator::wmm2020()?;
//! calc.configure_time(&TimeRequest::decimal_year(2024.5))?;
//! calc.configure_position(-18.0, 138.0, 77.0)?;
//!
//! let field = calc.field()?.into_value();
//! assert!((field[0].x - 31722.0).abs() < 0.1);
//!
//! let all = calc.all_elements()?.into_value();
//! assert!(all["declination"][0] > 4.0);
//! # Ok::<(), geomag_core::GeomagError>(())
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use geomag_core::location::{validate_latitude, validate_longitude};
use geomag_core::{AltitudeUnit, CalendarDate, Datum, GeodeticPoint, GeomagError, GeomagResult};

use crate::advisory::{check_altitude, check_blackout, Advisory, Evaluation};
use crate::broadcast::{broadcast_index, broadcast_len, Samples};
use crate::coefficients::CoefficientStore;
use crate::config::CalculatorConfig;
use crate::elements::{ElementsWithRate, FieldVector};
use crate::geoid::{to_ellipsoid_height, GeoidModel};
use crate::harmonics::PointGeometry;
use crate::legendre::LegendreEngine;
use crate::timely::{project_to_degree, SecularVariation, TimelyCoefficients};
use crate::uncertainty::{ErrorModel, Uncertainty};

/// Named columns of batch results, one value per point.
pub type NamedValues = BTreeMap<&'static str, Vec<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculatorState {
    Uninitialized,
    TimeConfigured,
    EnvironmentConfigured,
    Ready,
}

/// Requested evaluation time.
///
/// A decimal year takes precedence over calendar components. Missing calendar components are
/// filled from [`CalculatorConfig::fill_date`]; with nothing set the request means today.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRequest {
    pub year: Option<Samples<i32>>,
    pub month: Option<Samples<u32>>,
    pub day: Option<Samples<u32>>,
    pub decimal_year: Option<Samples<f64>>,
}

impl TimeRequest {
    /// Today, or whatever date the calculator fills missing components from.
    pub fn now() -> Self {
        Self::default()
    }

    pub fn decimal_year(value: impl Into<Samples<f64>>) -> Self {
        Self {
            decimal_year: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn date(year: i32, month: u32, day: u32) -> Self {
        Self::default()
            .with_year(year)
            .with_month(month)
            .with_day(day)
    }

    pub fn with_year(mut self, year: impl Into<Samples<i32>>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_month(mut self, month: impl Into<Samples<u32>>) -> Self {
        self.month = Some(month.into());
        self
    }

    pub fn with_day(mut self, day: impl Into<Samples<u32>>) -> Self {
        self.day = Some(day.into());
        self
    }

    fn has_calendar(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    /// Resolves the request to decimal years.
    pub fn resolve(&self, reference: CalendarDate) -> GeomagResult<Vec<f64>> {
        if let Some(decimal_year) = &self.decimal_year {
            if self.has_calendar() {
                tracing::debug!("Decimal year given; ignoring calendar components");
            }
            return Ok(decimal_year.as_slice().to_vec());
        }

        let mut sizes = Vec::new();
        if let Some(y) = &self.year {
            sizes.push(("year", y.len()));
        }
        if let Some(m) = &self.month {
            sizes.push(("month", m.len()));
        }
        if let Some(d) = &self.day {
            sizes.push(("day", d.len()));
        }
        let len = broadcast_len(&sizes)?;

        (0..len)
            .map(|i| {
                CalendarDate::fill(
                    self.year.as_ref().map(|y| *y.at(i)),
                    self.month.as_ref().map(|m| *m.at(i)),
                    self.day.as_ref().map(|d| *d.at(i)),
                    reference,
                )
                .map(|date| date.to_decimal_year())
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct TimeState {
    decimal_years: Vec<f64>,
    /// Index into `coefficients` for each decimal year.
    slots: Vec<usize>,
    coefficients: Vec<Arc<TimelyCoefficients>>,
}

#[derive(Debug, Clone)]
struct EnvironmentState {
    geometry: Vec<PointGeometry>,
}

impl EnvironmentState {
    fn same_points(&self, points: &[GeodeticPoint]) -> bool {
        self.geometry.len() == points.len()
            && self.geometry.iter().zip(points).all(|(g, p)| g.point() == p)
    }
}

/// Configurable evaluator for one coefficient table.
#[derive(Debug, Clone)]
pub struct MagneticCalculator {
    store: CoefficientStore,
    config: CalculatorConfig,
    engine: LegendreEngine,
    secular_variation: SecularVariation,
    error_model: ErrorModel,
    geoid: Option<Arc<dyn GeoidModel>>,
    time: Option<TimeState>,
    environment: Option<EnvironmentState>,
}

impl MagneticCalculator {
    pub fn new(store: CoefficientStore) -> Self {
        Self::with_config(store, CalculatorConfig::default())
    }

    pub fn with_config(store: CoefficientStore, config: CalculatorConfig) -> Self {
        let nmax = config.max_degree.clamp(1, store.nmax());
        let engine = LegendreEngine::new(nmax);
        let secular_variation = SecularVariation::new(&store, config.sv_degree);
        let error_model = config
            .error_model
            .unwrap_or_else(|| ErrorModel::for_epoch(store.epoch()));
        tracing::debug!(
            nmax,
            sv_degree = secular_variation.sv_degree(),
            epoch = store.epoch(),
            "Created magnetic calculator"
        );
        Self {
            store,
            config,
            engine,
            secular_variation,
            error_model,
            geoid: None,
            time: None,
            environment: None,
        }
    }

    /// Calculator over the bundled WMM2020 model with default settings.
    pub fn wmm2020() -> GeomagResult<Self> {
        Ok(Self::new(CoefficientStore::wmm2020()?))
    }

    /// Calculator over the bundled WMM2025 model with default settings.
    pub fn wmm2025() -> GeomagResult<Self> {
        Ok(Self::new(CoefficientStore::wmm2025()?))
    }

    /// Sets the geoid used for mean-sea-level altitudes.
    pub fn with_geoid(mut self, geoid: Arc<dyn GeoidModel>) -> Self {
        self.geoid = Some(geoid);
        self
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn store(&self) -> &CoefficientStore {
        &self.store
    }

    /// Error model behind [`uncertainties`](Self::uncertainties).
    pub fn error_model(&self) -> &ErrorModel {
        &self.error_model
    }

    /// Degree the summation runs to.
    #[inline]
    pub fn nmax(&self) -> usize {
        self.engine.nmax()
    }

    pub fn state(&self) -> CalculatorState {
        match (&self.time, &self.environment) {
            (None, None) => CalculatorState::Uninitialized,
            (Some(_), None) => CalculatorState::TimeConfigured,
            (None, Some(_)) => CalculatorState::EnvironmentConfigured,
            (Some(_), Some(_)) => CalculatorState::Ready,
        }
    }

    /// Configured decimal years, if any.
    pub fn decimal_years(&self) -> Option<&[f64]> {
        self.time.as_ref().map(|t| t.decimal_years.as_slice())
    }

    /// Configured points with ellipsoidal heights in km, if any.
    pub fn points(&self) -> Option<Vec<GeodeticPoint>> {
        self.environment
            .as_ref()
            .map(|e| e.geometry.iter().map(|g| *g.point()).collect())
    }

    /// Sets the evaluation time.
    ///
    /// # Errors
    ///
    /// - [`GeomagError::InvalidDate`] for calendar components that do not form a date.
    /// - [`GeomagError::OutOfValidityPeriod`] for a time outside the model's window.
    /// - [`GeomagError::ShapeMismatch`] when the time vector cannot be broadcast against its
    ///   own components or the configured positions.
    ///
    /// On error the previous time configuration is kept.
    pub fn configure_time(&mut self, request: &TimeRequest) -> GeomagResult<()> {
        let decimal_years = request.resolve(self.config.fill_date())?;
        if let Some(env) = &self.environment {
            broadcast_len(&[
                ("position", env.geometry.len()),
                ("time", decimal_years.len()),
            ])?;
        }

        let validity = self.store.validity();
        for &year in &decimal_years {
            validity.check(year)?;
        }

        let previous = self.time.as_ref();
        let mut coefficients: Vec<Arc<TimelyCoefficients>> = Vec::new();
        let mut slots = Vec::with_capacity(decimal_years.len());
        for &year in &decimal_years {
            if let Some(slot) = coefficients.iter().position(|c| c.decimal_year() == year) {
                slots.push(slot);
                continue;
            }
            let cached = previous.and_then(|t| {
                t.coefficients
                    .iter()
                    .find(|c| c.decimal_year() == year)
                    .cloned()
            });
            let timely = match cached {
                Some(c) => {
                    tracing::debug!(decimal_year = year, "Reusing projected coefficients");
                    c
                }
                None => {
                    tracing::debug!(decimal_year = year, "Projecting coefficients");
                    Arc::new(project_to_degree(
                        &self.store,
                        year,
                        self.secular_variation.sv_degree(),
                    )?)
                }
            };
            slots.push(coefficients.len());
            coefficients.push(timely);
        }

        self.time = Some(TimeState {
            decimal_years,
            slots,
            coefficients,
        });
        Ok(())
    }

    /// Shorthand for [`configure_time`](Self::configure_time) with decimal years.
    pub fn configure_decimal_year(&mut self, year: impl Into<Samples<f64>>) -> GeomagResult<()> {
        self.configure_time(&TimeRequest::decimal_year(year))
    }

    /// Shorthand for [`configure_time`](Self::configure_time) with one calendar date.
    pub fn configure_date(&mut self, year: i32, month: u32, day: u32) -> GeomagResult<()> {
        self.configure_time(&TimeRequest::date(year, month, day))
    }

    /// Sets the evaluation positions.
    ///
    /// Latitude, longitude and altitude broadcast against each other and against the
    /// configured time. The returned evaluation holds the number of configured points and a
    /// [`Advisory::ModelAccuracy`] for every point outside the accuracy altitude window.
    ///
    /// # Errors
    ///
    /// - [`GeomagError::LatitudeOutOfRange`] / [`GeomagError::LongitudeOutOfRange`].
    /// - [`GeomagError::ShapeMismatch`] for lengths that cannot be broadcast.
    /// - [`GeomagError::GeoidUnavailable`] for [`Datum::MeanSeaLevel`] without a geoid.
    ///
    /// On error the previous position configuration is kept.
    pub fn configure_environment(
        &mut self,
        latitude: impl Into<Samples<f64>>,
        longitude: impl Into<Samples<f64>>,
        altitude: impl Into<Samples<f64>>,
        unit: AltitudeUnit,
        datum: Datum,
    ) -> GeomagResult<Evaluation<usize>> {
        let (latitude, longitude, altitude) = (latitude.into(), longitude.into(), altitude.into());

        let mut sizes = vec![
            ("latitude", latitude.len()),
            ("longitude", longitude.len()),
            ("altitude", altitude.len()),
        ];
        let len = broadcast_len(&sizes)?;
        if let Some(time) = &self.time {
            sizes.push(("time", time.decimal_years.len()));
            broadcast_len(&sizes)?;
        }

        let mut points = Vec::with_capacity(len);
        for i in 0..len {
            let lat = validate_latitude(*latitude.at(i))?;
            let lon = validate_longitude(*longitude.at(i))?;
            let height = to_ellipsoid_height(
                unit.to_km(*altitude.at(i)),
                lat,
                lon,
                datum,
                self.geoid.as_deref(),
            )?;
            points.push(GeodeticPoint::new(lat, lon, height)?);
        }

        let advisories: Vec<Advisory> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| check_altitude(i, p, &self.config.accuracy_window))
            .collect();

        let unchanged = self
            .environment
            .as_ref()
            .is_some_and(|env| env.same_points(&points));
        if unchanged {
            tracing::debug!(points = len, "Positions unchanged; keeping cached geometry");
        } else {
            tracing::debug!(points = len, "Computing point geometry");
            let geometry = points
                .into_iter()
                .map(|p| PointGeometry::new(&self.engine, p))
                .collect();
            self.environment = Some(EnvironmentState { geometry });
        }

        Ok(Evaluation::new(len, advisories))
    }

    /// [`configure_environment`](Self::configure_environment) with the configured default unit
    /// and datum.
    pub fn configure_position(
        &mut self,
        latitude: impl Into<Samples<f64>>,
        longitude: impl Into<Samples<f64>>,
        altitude: impl Into<Samples<f64>>,
    ) -> GeomagResult<Evaluation<usize>> {
        let (unit, datum) = (self.config.altitude_unit, self.config.datum);
        self.configure_environment(latitude, longitude, altitude, unit, datum)
    }

    /// Pairs of geometry and projected coefficients, one per batch element.
    fn samples(&self) -> GeomagResult<Vec<(&PointGeometry, &TimelyCoefficients)>> {
        let (time, env) = match (&self.time, &self.environment) {
            (Some(t), Some(e)) => (t, e),
            (None, None) => {
                return Err(GeomagError::not_configured(
                    "configure a time and a position before evaluating",
                ))
            }
            (None, Some(_)) => {
                return Err(GeomagError::not_configured(
                    "configure a time before evaluating",
                ))
            }
            (Some(_), None) => {
                return Err(GeomagError::not_configured(
                    "configure a position before evaluating",
                ))
            }
        };

        let (n_points, n_times) = (env.geometry.len(), time.slots.len());
        let len = broadcast_len(&[("position", n_points), ("time", n_times)])?;
        Ok((0..len)
            .map(|i| {
                let geometry = &env.geometry[broadcast_index(n_points, i)];
                let slot = time.slots[broadcast_index(n_times, i)];
                (geometry, time.coefficients[slot].as_ref())
            })
            .collect())
    }

    /// Main field for every sample, with the blackout advisories it raises.
    fn main_field(
        &self,
        samples: &[(&PointGeometry, &TimelyCoefficients)],
    ) -> Evaluation<Vec<FieldVector>> {
        let mut advisories = Vec::new();
        let mut fields = Vec::with_capacity(samples.len());
        for (i, (geometry, coefficients)) in samples.iter().enumerate() {
            let field = geometry.field(coefficients.g(), coefficients.h());
            advisories.extend(check_blackout(
                i,
                geometry.point(),
                field.horizontal_intensity(),
                &self.config.blackout,
            ));
            fields.push(field);
        }
        Evaluation::new(fields, advisories)
    }

    /// Main field `(X, Y, Z)` in nT for every batch element.
    pub fn field(&self) -> GeomagResult<Evaluation<Vec<FieldVector>>> {
        Ok(self.main_field(&self.samples()?))
    }

    /// Secular variation `(dX, dY, dZ)` in nT/year for every batch element.
    pub fn field_rate(&self) -> GeomagResult<Evaluation<Vec<FieldVector>>> {
        let samples = self.samples()?;
        let sv = &self.secular_variation;
        Ok(self.main_field(&samples).map(|_| {
            samples
                .iter()
                .map(|(geometry, _)| geometry.field(sv.g(), sv.h()))
                .collect()
        }))
    }

    /// All elements and rates.
    pub fn elements(&self) -> GeomagResult<Evaluation<Vec<ElementsWithRate>>> {
        let samples = self.samples()?;
        let sv = &self.secular_variation;
        Ok(self.main_field(&samples).map(|fields| {
            fields
                .into_iter()
                .zip(&samples)
                .map(|(main, (geometry, _))| {
                    ElementsWithRate::new(main, geometry.field(sv.g(), sv.h()))
                })
                .collect()
        }))
    }

    /// Named columns `x, y, z, h, f, declination, inclination, dx, dy, dz, dh, df,
    /// ddeclination, dinclination`.
    pub fn all_elements(&self) -> GeomagResult<Evaluation<NamedValues>> {
        Ok(self
            .elements()?
            .map(|rows| collect_named(rows.iter().map(|r| r.named_values()))))
    }

    /// Uncertainty estimates for every batch element.
    pub fn uncertainties(&self) -> GeomagResult<Evaluation<Vec<Uncertainty>>> {
        let model = &self.error_model;
        Ok(self.field()?.map(|fields| {
            fields
                .iter()
                .map(|f| model.estimate(f.horizontal_intensity()))
                .collect()
        }))
    }

    /// Named columns `x_uncertainty, …, inclination_uncertainty`.
    pub fn uncertainty(&self) -> GeomagResult<Evaluation<NamedValues>> {
        Ok(self
            .uncertainties()?
            .map(|rows| collect_named(rows.iter().map(|u| u.named_values()))))
    }
}

fn collect_named<const N: usize>(
    rows: impl Iterator<Item = [(&'static str, f64); N]>,
) -> NamedValues {
    let mut columns = NamedValues::new();
    for row in rows {
        for (name, value) in row {
            columns.entry(name).or_default().push(value);
        }
    }
    columns
}
