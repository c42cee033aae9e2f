//! Post-processing on a hybrid sigma-pressure vertical coordinate
//!
//! Build the pressure and altitude of the model levels from the surface
//! pressure and the hybrid coefficients, interpolate fields onto pressure or
//! altitude levels, and generate new hybrid grids.
//!
//! NOTE: the Python bindings live in the `python` module, behind the feature of
//! the same name. The rest of the crate doesn't use `pyo3`.

pub(crate) mod derivative;
pub(crate) mod error;
pub(crate) mod grid;
#[cfg(feature = "python")]
mod python;
pub(crate) mod scale_height;
pub(crate) mod vertical;

pub use derivative::differentiate;
pub use error::VerticalError;
pub use grid::{stretched_sigma, swinbank, transition_weight};
pub use scale_height::ScaleHeight;
pub use vertical::{
    compute_altitude, compute_pressure, interpolate, locate_level, HybridCoefficients,
    InterpOptions, InterpolationMode, LevelIndex, LevelType, PhysicalConstants,
};
