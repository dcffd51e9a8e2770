use std::f64::consts::{PI, TAU};

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Wrap an angle into `(-π, π]`.
#[must_use]
pub fn normalize_signed_angle(angle: f64) -> f64 {
    let a = normalize_angle(angle);
    if a > PI {
        a - TAU
    } else {
        a
    }
}
