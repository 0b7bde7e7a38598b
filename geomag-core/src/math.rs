#[inline]
pub fn sincos(x: f64) -> (f64, f64) {
    libm::sincos(x)
}

#[inline]
pub fn hypot(x: f64, y: f64) -> f64 {
    libm::hypot(x, y)
}

/// `atan2(y, x)` in degrees.
#[inline]
pub fn atan2_degrees(y: f64, x: f64) -> f64 {
    libm::atan2(y, x) * crate::constants::RAD_TO_DEG
}

/// Fills `cos_out[m] = cos(m·x)` and `sin_out[m] = sin(m·x)` for `m = 0..len`.
///
/// Uses the angle-addition recurrence, so only one `sincos` call is made.
pub fn multiple_angle_sincos(x: f64, cos_out: &mut [f64], sin_out: &mut [f64]) {
    debug_assert_eq!(cos_out.len(), sin_out.len());
    let len = cos_out.len();
    if len == 0 {
        return;
    }
    cos_out[0] = 1.0;
    sin_out[0] = 0.0;
    if len == 1 {
        return;
    }
    let (s1, c1) = sincos(x);
    cos_out[1] = c1;
    sin_out[1] = s1;
    for m in 2..len {
        cos_out[m] = cos_out[m - 1] * c1 - sin_out[m - 1] * s1;
        sin_out[m] = cos_out[m - 1] * s1 + sin_out[m - 1] * c1;
    }
}
