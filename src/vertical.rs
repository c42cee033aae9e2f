//! Hybrid sigma-pressure vertical coordinate
//!
//! Levels are indexed from the model top (`k = 0`) down to the surface. There
//! are `Nk` half levels (layer interfaces) and `Nk - 1` full levels (layer
//! centers) between them:
//!
//! ```text
//! --- 0 ---  TOP   ========  p_half
//!                  --------  p_full
//!                  ========  p_half
//! --- Nk-1 ---     --------  p_full
//! --- Nk ---  SFC  ========  p_half
//!                 / / / / /
//! ```
//!
//! Every field here has its vertical axis first. All other axes are flattened
//! into a single column axis for the duration of a call, and the result is
//! reshaped back to the caller's trailing shape.

pub(crate) mod altitude;
pub(crate) mod interp;
pub(crate) mod locate;
pub(crate) mod pressure;

use std::{fmt, str::FromStr};

use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayViewD, IxDyn};

use crate::error::VerticalError;

pub use altitude::compute_altitude;
pub use interp::{interpolate, InterpOptions, InterpolationMode};
pub use locate::{locate_level, LevelIndex};
pub use pressure::compute_pressure;

/// The hybrid coefficients of a vertical grid.
///
/// The pressure at half level `k` is `ps * bk[k] + ak[k]`, so `ak` is in Pa and
/// `bk` is dimensionless. Both have length `Nk`, ordered from the top of the
/// model to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridCoefficients {
    ak: Array1<f64>,
    bk: Array1<f64>,
}

impl HybridCoefficients {
    pub fn new(ak: Array1<f64>, bk: Array1<f64>) -> Result<Self, VerticalError> {
        if ak.len() != bk.len() {
            return Err(VerticalError::shape_mismatch(ak.shape(), bk.shape()));
        }
        if ak.len() < 2 {
            return Err(VerticalError::TooFewLevels {
                needed: 2,
                found: ak.len(),
            });
        }

        let surface = ak.len() - 1;
        if ak[surface] != 0.0 || bk[surface] != 1.0 {
            log::warn!(
                "surface half level is not pure sigma (ak = {}, bk = {})",
                ak[surface],
                bk[surface]
            );
        }

        Ok(Self { ak, bk })
    }

    pub fn ak(&self) -> ArrayView1<'_, f64> {
        self.ak.view()
    }

    pub fn bk(&self) -> ArrayView1<'_, f64> {
        self.bk.view()
    }

    /// Number of layer interfaces, `Nk`.
    pub fn num_half_levels(&self) -> usize {
        self.ak.len()
    }

    /// Number of layer centers, `Nk - 1`.
    pub fn num_full_levels(&self) -> usize {
        self.ak.len() - 1
    }

    /// True when the model top is a vacuum, i.e. the top half level pressure is
    /// zero regardless of the surface pressure.
    pub fn has_vacuum_top(&self) -> bool {
        self.ak[0] == 0.0 && self.bk[0] == 0.0
    }

    pub fn into_parts(self) -> (Array1<f64>, Array1<f64>) {
        (self.ak, self.bk)
    }
}

/// Which set of levels a field is defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelType {
    /// Layer centers, `Nk - 1` levels
    Full,
    /// Layer interfaces, `Nk` levels
    Half,
}

impl FromStr for LevelType {
    type Err = VerticalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(LevelType::Full),
            "half" => Ok(LevelType::Half),
            _ => Err(VerticalError::InvalidLevelType(s.to_string())),
        }
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelType::Full => write!(f, "full"),
            LevelType::Half => write!(f, "half"),
        }
    }
}

/// Physical constants of the atmosphere being post-processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    /// Specific gas constant in J/kg/K
    gas_constant: f64,
    /// Surface gravity in m/s^2
    gravity: f64,
}

impl PhysicalConstants {
    /// Mars, with a CO2 atmosphere.
    pub const MARS: PhysicalConstants = PhysicalConstants {
        gas_constant: 191.0,
        gravity: 3.72,
    };

    pub fn new(gas_constant: f64, gravity: f64) -> Result<Self, VerticalError> {
        for (name, value) in [("gas constant", gas_constant), ("gravity", gravity)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(VerticalError::InvalidParameter(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(Self {
            gas_constant,
            gravity,
        })
    }

    pub fn gas_constant(&self) -> f64 {
        self.gas_constant
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// `R / g`, which times a temperature gives the scale height in m.
    pub(crate) fn hypsometric_factor(&self) -> f64 {
        self.gas_constant / self.gravity
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::MARS
    }
}

/// Copy a field into a `(levels, columns)` array, flattening every axis after
/// the vertical one.
pub(crate) fn to_columns(field: &ArrayViewD<'_, f64>) -> Result<Array2<f64>, VerticalError> {
    let (&num_levels, trailing) =
        field
            .shape()
            .split_first()
            .ok_or(VerticalError::TooFewLevels {
                needed: 1,
                found: 0,
            })?;
    let num_columns: usize = trailing.iter().product();
    Ok(field
        .as_standard_layout()
        .into_owned()
        .into_shape((num_levels, num_columns))?)
}

/// Undo [`to_columns`]: the leading axis is kept and the column axis is
/// reshaped to `trailing`.
pub(crate) fn from_columns(
    columns: Array2<f64>,
    trailing: &[usize],
) -> Result<ArrayD<f64>, VerticalError> {
    let mut shape = Vec::with_capacity(trailing.len() + 1);
    shape.push(columns.nrows());
    shape.extend_from_slice(trailing);

    let columns = if columns.is_standard_layout() {
        columns
    } else {
        columns.as_standard_layout().into_owned()
    };
    Ok(columns.into_shape(IxDyn(&shape))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn coefficients_validation() {
        assert!(matches!(
            HybridCoefficients::new(array![0., 1.], array![0., 0.5, 1.]),
            Err(VerticalError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            HybridCoefficients::new(array![0.], array![1.]),
            Err(VerticalError::TooFewLevels {
                needed: 2,
                found: 1
            })
        ));

        let coefficients =
            HybridCoefficients::new(array![0., 50., 100., 0.], array![0., 0., 0.5, 1.]).unwrap();
        assert_eq!(coefficients.num_half_levels(), 4);
        assert_eq!(coefficients.num_full_levels(), 3);
        assert!(coefficients.has_vacuum_top());
    }

    #[test]
    fn level_type_parsing() {
        assert_eq!("full".parse::<LevelType>().unwrap(), LevelType::Full);
        assert_eq!("half".parse::<LevelType>().unwrap(), LevelType::Half);
        assert_eq!(LevelType::Half.to_string(), "half");
        match "middle".parse::<LevelType>() {
            Err(VerticalError::InvalidLevelType(s)) => assert_eq!(s, "middle"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn constants() {
        assert_eq!(PhysicalConstants::default(), PhysicalConstants::MARS);
        assert!(PhysicalConstants::new(287.05, 9.81).is_ok());
        assert!(PhysicalConstants::new(287.05, 0.0).is_err());
        assert!(PhysicalConstants::new(f64::NAN, 9.81).is_err());
    }

    #[test]
    fn columns_round_trip() {
        let field = Array3::from_shape_fn((3, 2, 4), |(k, j, i)| (100 * k + 10 * j + i) as f64);
        let columns = to_columns(&field.view().into_dyn()).unwrap();
        assert_eq!(columns.dim(), (3, 8));
        assert_eq!(columns[[2, 5]], 211.);

        let restored = from_columns(columns, &[2, 4]).unwrap();
        assert_eq!(restored, field.into_dyn());
    }

    #[test]
    fn zero_dimensional_field_has_no_levels() {
        let scalar = ndarray::arr0(1.0).into_dyn();
        assert!(matches!(
            to_columns(&scalar.view()),
            Err(VerticalError::TooFewLevels { .. })
        ));
    }
}
