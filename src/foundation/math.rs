/// Interpolate between `a` and `b`.
///
/// Written as a weighted sum so that `t == 0` yields exactly `a` and `t == 1` yields exactly `b`.
/// Equal endpoints are returned unchanged for every `t`.
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if a == b {
        return a;
    }
    (1.0 - t) * a + t * b
}

/// Clamp a progress value into `[0, 1]`; NaN maps to 0.
pub(crate) fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Number of decimal digits needed to print `n`.
pub(crate) fn decimal_digits(n: u64) -> u32 {
    n.checked_ilog10().map_or(1, |d| d + 1)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
