//! Non-fatal advisories attached to results.
//!
//! An advisory never changes a number. It travels next to the answer in an [`Evaluation`] and
//! is logged at `warn` level when raised.

use std::fmt;

use geomag_core::GeodeticPoint;

use crate::config::{AltitudeWindow, BlackoutThresholds};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Advisory {
    /// Altitude outside the range the model's accuracy was validated for.
    ModelAccuracy {
        index: usize,
        point: GeodeticPoint,
        window: AltitudeWindow,
    },
    /// Horizontal intensity at or below the blackout threshold.
    BlackoutZone {
        index: usize,
        point: GeodeticPoint,
        horizontal_intensity: f64,
    },
    /// Horizontal intensity between the blackout and caution thresholds.
    ApproachingBlackout {
        index: usize,
        point: GeodeticPoint,
        horizontal_intensity: f64,
    },
}

impl Advisory {
    /// Position in the batch of the point that raised this advisory.
    pub fn index(&self) -> usize {
        match self {
            Self::ModelAccuracy { index, .. }
            | Self::BlackoutZone { index, .. }
            | Self::ApproachingBlackout { index, .. } => *index,
        }
    }

    pub fn point(&self) -> &GeodeticPoint {
        match self {
            Self::ModelAccuracy { point, .. }
            | Self::BlackoutZone { point, .. }
            | Self::ApproachingBlackout { point, .. } => point,
        }
    }

    pub fn is_blackout(&self) -> bool {
        matches!(
            self,
            Self::BlackoutZone { .. } | Self::ApproachingBlackout { .. }
        )
    }

    fn log(&self) {
        tracing::warn!(
            index = self.index(),
            latitude = self.point().latitude,
            longitude = self.point().longitude,
            altitude_km = self.point().height_km,
            "{}",
            self
        );
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelAccuracy { point, window, .. } => write!(
                f,
                "Altitude {} km is outside [{}, {}] km; model accuracy is not guaranteed at {}",
                point.height_km, window.min_km, window.max_km, point
            ),
            Self::BlackoutZone {
                point,
                horizontal_intensity,
                ..
            } => write!(
                f,
                "Blackout zone: H = {:.1} nT at {}; compass accuracy is highly degraded",
                horizontal_intensity, point
            ),
            Self::ApproachingBlackout {
                point,
                horizontal_intensity,
                ..
            } => write!(
                f,
                "Approaching blackout zone: H = {:.1} nT at {}; compass accuracy may be degraded",
                horizontal_intensity, point
            ),
        }
    }
}

/// Raises [`Advisory::ModelAccuracy`] when `point` is outside `window`.
pub fn check_altitude(
    index: usize,
    point: &GeodeticPoint,
    window: &AltitudeWindow,
) -> Option<Advisory> {
    if window.contains(point.height_km) {
        return None;
    }
    let advisory = Advisory::ModelAccuracy {
        index,
        point: *point,
        window: *window,
    };
    advisory.log();
    Some(advisory)
}

/// Raises a blackout advisory when `horizontal_intensity` is at or below a threshold.
pub fn check_blackout(
    index: usize,
    point: &GeodeticPoint,
    horizontal_intensity: f64,
    thresholds: &BlackoutThresholds,
) -> Option<Advisory> {
    let advisory = if horizontal_intensity <= thresholds.blackout_nt {
        Advisory::BlackoutZone {
            index,
            point: *point,
            horizontal_intensity,
        }
    } else if horizontal_intensity <= thresholds.caution_nt {
        Advisory::ApproachingBlackout {
            index,
            point: *point,
            horizontal_intensity,
        }
    } else {
        return None;
    };
    advisory.log();
    Some(advisory)
}

/// A result together with the advisories raised while producing it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation<T> {
    pub value: T,
    pub advisories: Vec<Advisory>,
}

impl<T> Evaluation<T> {
    pub fn new(value: T, advisories: Vec<Advisory>) -> Self {
        Self { value, advisories }
    }

    pub fn clean(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    #[inline]
    pub fn has_advisories(&self) -> bool {
        !self.advisories.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Evaluation<U> {
        Evaluation {
            value: f(self.value),
            advisories: self.advisories,
        }
    }
}
