//! Vertical interpolation onto pressure or altitude levels

use std::str::FromStr;

use ndarray::{s, Array2, ArrayD, ArrayView1, ArrayViewD, Zip};

use super::{
    from_columns,
    locate::{locate_columns, LevelIndex},
    to_columns,
};
use crate::error::VerticalError;

/// How the interpolation weight varies between two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Linear in the log of the coordinate, typically for pressure
    Log,
    /// Linear in the coordinate, typically for altitude
    Linear,
}

impl InterpolationMode {
    /// Weight of the upper level `n` for a target between the levels at `upper`
    /// and `lower` (`n + 1`).
    fn weight(self, target: f64, upper: f64, lower: f64) -> f64 {
        match self {
            InterpolationMode::Log => f64::ln(target / lower) / f64::ln(upper / lower),
            InterpolationMode::Linear => (target - lower) / (upper - lower),
        }
    }
}

impl FromStr for InterpolationMode {
    type Err = VerticalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(InterpolationMode::Log),
            "lin" => Ok(InterpolationMode::Linear),
            _ => Err(VerticalError::InvalidInterpolationMode(s.to_string())),
        }
    }
}

/// Settings for [`interpolate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpOptions {
    pub mode: InterpolationMode,
    /// Reverse the input field and coordinate along the vertical axis before
    /// interpolating, e.g. for altitude stored from the top down.
    pub reverse: bool,
    /// Set targets above the first level of the profile to `NaN`. Otherwise
    /// they're extrapolated from the first two levels.
    pub mask_top: bool,
}

impl Default for InterpOptions {
    fn default() -> Self {
        Self {
            mode: InterpolationMode::Log,
            reverse: false,
            mask_top: true,
        }
    }
}

impl InterpOptions {
    pub fn new(mode: InterpolationMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}

/// Interpolate `field` onto the `targets` levels of `coordinate`.
///
/// `field` and `coordinate` have the same shape, with the vertical axis first.
/// After the optional reversal, the coordinate must increase along the
/// vertical axis in every column (see [`locate_level`](super::locate_level)).
/// The output has `targets.len()` levels followed by the trailing shape of
/// `field`.
///
/// For a target between levels `n` and `n + 1` the result is
///
/// ```text
/// alpha * field[n] + (1 - alpha) * field[n + 1]
/// ```
///
/// with `alpha = ln(target / c[n+1]) / ln(c[n] / c[n+1])` in log mode and
/// `alpha = (target - c[n+1]) / (c[n] - c[n+1])` in linear mode. Targets
/// beyond the last level are `NaN`, never extrapolated.
///
/// If `index` is given it's used instead of searching the coordinate again;
/// it must have been computed by `locate_level` for the same targets,
/// coordinate and reversal.
///
/// A coordinate column containing `NaN` fails the whole call with
/// [`VerticalError::NonMonotonicProfile`], so fill values in the coordinate
/// have to be masked out (or the columns dropped) beforehand. `NaN` in `field`
/// is fine and just propagates to the neighbouring targets.
pub fn interpolate(
    field: ArrayViewD<'_, f64>,
    coordinate: ArrayViewD<'_, f64>,
    targets: &[f64],
    options: &InterpOptions,
    index: Option<&LevelIndex>,
) -> Result<ArrayD<f64>, VerticalError> {
    if field.shape() != coordinate.shape() {
        return Err(VerticalError::shape_mismatch(field.shape(), coordinate.shape()));
    }

    let values = to_columns(&field)?;
    let profile = to_columns(&coordinate)?;
    let (num_levels, num_columns) = values.dim();
    if num_levels == 0 {
        return Err(VerticalError::TooFewLevels {
            needed: 1,
            found: 0,
        });
    }

    let (values, profile) = if options.reverse {
        (
            values.slice_move(s![..;-1, ..]),
            profile.slice_move(s![..;-1, ..]),
        )
    } else {
        (values, profile)
    };

    let computed;
    let indices = match index {
        Some(index) => {
            index.check_compatible(targets, num_levels, num_columns, options.reverse)?;
            index.indices()
        }
        None => {
            computed = locate_columns(profile.view(), targets)?;
            computed.view()
        }
    };

    log::debug!(
        "interpolating {num_columns} columns from {num_levels} levels onto {} levels",
        targets.len()
    );

    let mut output = Array2::zeros((targets.len(), num_columns));
    Zip::from(output.columns_mut())
        .and(values.columns())
        .and(profile.columns())
        .and(indices.columns())
        .par_for_each(|mut output, values, profile, indices| {
            for ((output, &target), &n) in output.iter_mut().zip(targets).zip(indices) {
                *output = interpolate_point(values, profile, target, n, options);
            }
        });

    let undefined = output.iter().filter(|value| value.is_nan()).count();
    if undefined > 0 {
        log::warn!("{undefined} interpolated values are outside of the profile and set to NaN");
    }

    from_columns(output, &field.shape()[1..])
}

/// Interpolate a single column onto one target, given the bracketing index.
fn interpolate_point(
    values: ArrayView1<'_, f64>,
    profile: ArrayView1<'_, f64>,
    target: f64,
    n: Option<usize>,
    options: &InterpOptions,
) -> f64 {
    let n = match n {
        Some(n) => n,
        // Above the model top
        None if options.mask_top => return f64::NAN,
        None => 0,
    };

    if n + 1 >= profile.len() {
        // Below the deepest level
        return if profile[n] == target {
            values[n]
        } else {
            f64::NAN
        };
    }

    let alpha = options.mode.weight(target, profile[n], profile[n + 1]);
    alpha * values[n] + (1.0 - alpha) * values[n + 1]
}
