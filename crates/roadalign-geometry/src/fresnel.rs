//! Normalised Fresnel integrals
//!
//! `S(t) = ∫₀ᵗ sin(πu²/2) du` and `C(t) = ∫₀ᵗ cos(πu²/2) du`.
//!
//! Small arguments use the power series; larger ones the complementary error
//! function continued fraction, evaluated with the modified Lentz method.

use std::f64::consts::{FRAC_PI_2, PI};

use num_complex::Complex64;

const EPS: f64 = 1e-15;
const MAX_ITER: usize = 200;
const FP_MIN: f64 = 1e-300;
/// Switch-over between series and continued fraction.
const SERIES_LIMIT: f64 = 1.5;

/// Returns `(S(t), C(t))`.
#[must_use]
pub fn fresnel(t: f64) -> (f64, f64) {
    let ax = t.abs();
    let (s, c) = if ax < FP_MIN.sqrt() {
        (0.0, ax)
    } else if ax <= SERIES_LIMIT {
        series(ax)
    } else {
        continued_fraction(ax)
    };
    if t < 0.0 {
        (-s, -c)
    } else {
        (s, c)
    }
}

fn series(x: f64) -> (f64, f64) {
    let fact = FRAC_PI_2 * x * x;
    let mut sum_s = 0.0;
    let mut sum_c = x;
    let mut sum = 0.0;
    let mut sign = 1.0;
    let mut term = x;
    let mut odd = true;
    let mut n = 3.0;

    for k in 1..=MAX_ITER {
        term *= fact / k as f64;
        sum += sign * term / n;
        let test = sum.abs() * EPS;
        if odd {
            sign = -sign;
            sum_s = sum;
            sum = sum_c;
        } else {
            sum_c = sum;
            sum = sum_s;
        }
        if term < test {
            break;
        }
        odd = !odd;
        n += 2.0;
    }
    (sum_s, sum_c)
}

fn continued_fraction(x: f64) -> (f64, f64) {
    let pix2 = PI * x * x;
    let mut b = Complex64::new(1.0, -pix2);
    let mut cc = Complex64::new(1.0 / FP_MIN, 0.0);
    let mut d = b.inv();
    let mut h = d;
    let mut n = -1.0;

    for _ in 2..=MAX_ITER {
        n += 2.0;
        let a = -n * (n + 1.0);
        b += Complex64::new(4.0, 0.0);
        d = (d * a + b).inv();
        cc = b + cc.inv() * a;
        let del = cc * d;
        h *= del;
        if (del.re - 1.0).abs() + del.im.abs() < EPS {
            break;
        }
    }

    h *= Complex64::new(x, -x);
    let phase = Complex64::from_polar(1.0, 0.5 * pix2);
    let cs = Complex64::new(0.5, 0.5) * (Complex64::new(1.0, 0.0) - phase * h);
    (cs.im, cs.re)
}
