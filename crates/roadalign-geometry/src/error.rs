use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{element}: missing required field \"{field}\"")]
    MissingRequiredField {
        element: &'static str,
        field: &'static str,
    },

    #[error("{element}: not enough data to resolve the geometry ({reason})")]
    UnderdeterminedGeometry {
        element: &'static str,
        reason: String,
    },

    #[error("{element}: invalid \"{field}\": {message}")]
    InvalidField {
        element: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("distance {distance} is outside the element length {length}")]
    DistanceOutOfRange { distance: f64, length: f64 },

    #[error("point does not project onto the element")]
    NoProjection,

    #[error("unknown geometry type \"{kind}\" (expected Line, Curve or Spiral)")]
    UnknownType { kind: String },

    #[error("step must be positive and not finer than the sampling limit, got {step}")]
    InvalidStep { step: f64 },

    #[error(transparent)]
    Parser(#[from] roadalign_parser::Error),
}
