//! Angle wrapping for the element rates.

/// Brings a value into (-180, 180] with at most one ±360 correction.
///
/// Values more than one turn away are only shifted once.
#[inline]
pub fn wrap_half_turn(value: f64) -> f64 {
    if value > 180.0 {
        value - 360.0
    } else if value <= -180.0 {
        value + 360.0
    } else {
        value
    }
}
