use roadalign_geometry::GeometryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("station equation {index}: {message}")]
    InvalidStationEquations { index: usize, message: String },

    #[error("element {index} does not end where the next one starts (gap {gap})")]
    DiscontinuousAlignment { index: usize, gap: f64 },

    #[error("alignment start point is {gap} away from the first element")]
    StartMismatch { gap: f64 },

    #[error("station {station} is outside the alignment ({start} to {end})")]
    StationOutOfRange { station: f64, start: f64, end: f64 },

    #[error(
        "PI {index}: spiral angles ({spiral_angle} rad) exceed the deflection ({deflection} rad)"
    )]
    SpiralTooLong {
        index: usize,
        spiral_angle: f64,
        deflection: f64,
    },

    #[error("PI {index}: tangent overlaps the previous curve or passes the next PI")]
    TangentsOverlap { index: usize },

    #[error("at least two PIs are needed, got {count}")]
    TooFewPis { count: usize },

    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("PI {index}: {message}")]
    InvalidAlignPi { index: usize, message: String },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Parser(#[from] roadalign_parser::Error),
}

impl AlignmentError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AlignmentError::InvalidArgument {
            message: message.into(),
        }
    }
}
