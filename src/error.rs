use thiserror::Error;

/// Possible errors from the vertical-coordinate routines.
///
/// Numeric edge cases (log of zero, extrapolation below the deepest level)
/// are not errors; they produce `NaN` in the output instead.
#[derive(Debug, Error)]
pub enum VerticalError {
    /// The level type was neither `full` nor `half`
    #[error("level type {0:?} not recognized: use 'full' or 'half'")]
    InvalidLevelType(String),
    /// The interpolation mode was neither `log` nor `lin`
    #[error("interpolation mode {0:?} not recognized: use 'log' or 'lin'")]
    InvalidInterpolationMode(String),
    /// An array doesn't have the shape of the array it accompanies
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// Not enough vertical levels for the computation
    #[error("at least {needed} levels are needed, found {found}")]
    TooFewLevels { needed: usize, found: usize },
    /// A profile column isn't sorted in increasing order
    #[error("profile in column {column} is not monotonically increasing")]
    NonMonotonicProfile { column: usize },
    /// A precomputed index table doesn't belong to these targets or profile
    #[error("index table was computed for different target levels or profile")]
    StaleIndexTable,
    /// A scalar parameter is outside of its valid range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl VerticalError {
    pub(crate) fn shape_mismatch(expected: &[usize], found: &[usize]) -> Self {
        VerticalError::ShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}
