//! Alignments: chains of geometry elements with stationing.
//!
//! An [`Alignment`] owns its elements, the station equation table and the
//! presentation [`CoordinateSystem`](roadalign_core::CoordinateSystem).
//! Queries take displayed stations and return points in the active system.

pub mod alignment;
pub mod error;
pub mod generate;
pub mod stations;
pub mod synthesis;

pub use alignment::{
    AlignPi, Alignment, AlignmentSpec, CoordinateSystemSpec, InputSystem, StationOffset,
};
pub use error::AlignmentError;
pub use generate::{StationIncrements, StationPoint};
pub use stations::{StationEquation, StationEquations};
pub use synthesis::{PiAlignmentSpec, PiSpec};
