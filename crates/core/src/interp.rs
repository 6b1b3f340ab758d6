//! Scalar interpolation helpers.
//!
//! Degenerate intervals are not guarded: `inverse_interpolate` and `remap`
//! return `NaN` or an infinity when the input bounds are equal, and callers
//! decide what that means for them.

/// Linear interpolation from `a` to `b` by `t`.
///
/// The endpoints are exact: `t == 0` returns `a` and `t == 1` returns `b`
/// without rounding.
pub fn interpolate(a: f64, b: f64, t: f64) -> f64 {
    if t == 0.0 {
        a
    } else if t == 1.0 {
        b
    } else {
        a + (b - a) * t
    }
}

/// Position of `value` within `[a, b]` as a fraction.
pub fn inverse_interpolate(a: f64, b: f64, value: f64) -> f64 {
    (value - a) / (b - a)
}

/// Maps `value` from `[in_lo, in_hi]` onto `[out_lo, out_hi]`.
pub fn remap(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    interpolate(out_lo, out_hi, inverse_interpolate(in_lo, in_hi, value))
}
