pub mod angle;
pub mod coordinate_system;
pub mod point;

pub use angle::{normalize_angle, normalize_signed_angle};
pub use coordinate_system::{CoordinateSystem, SystemType};
pub use point::Point;

/// Maximum gap between consecutive element end points, in metric units.
pub const CONTINUITY_TOLERANCE: f64 = 1e-3;

/// Distances below this are treated as zero when comparing positions.
pub const POSITION_EPSILON: f64 = 1e-6;

/// Most points a single generation request may produce.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Whole steps of `step` that fit in `span`.
///
/// `None` when `step` is not a positive finite number or when sampling `span`
/// would take more than [`MAX_SAMPLES`] points.
#[must_use]
pub fn sample_count(span: f64, step: f64) -> Option<usize> {
    if !(step.is_finite() && step > 0.0 && span.is_finite()) {
        return None;
    }
    let steps = (span.max(0.0) / step).floor();
    if steps >= MAX_SAMPLES as f64 {
        return None;
    }
    Some(steps as usize)
}
