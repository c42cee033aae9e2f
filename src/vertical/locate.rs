//! Finding the levels that bracket a target level

use ndarray::{s, Array2, ArrayView2, ArrayViewD};
use rayon::prelude::*;
use smallvec::SmallVec;

use super::to_columns;
use crate::error::VerticalError;

/// Precomputed bracketing indices for a set of target levels.
///
/// For target `i` and column `j`, the index `n` is the last level of the
/// (possibly reversed) profile with `profile[n] <= target`, or `None` if every
/// level of the profile is above the target. Build one with [`locate_level`]
/// and pass it to [`interpolate`](super::interpolate) to reuse it for many
/// fields on the same coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelIndex {
    /// Dimensioned as (targets, columns)
    indices: Array2<Option<usize>>,
    targets: Vec<f64>,
    num_levels: usize,
    reversed: bool,
}

impl LevelIndex {
    /// The bracketing index for a target and column.
    pub fn get(&self, target: usize, column: usize) -> Option<usize> {
        self.indices.get((target, column)).copied().flatten()
    }

    pub fn indices(&self) -> ArrayView2<'_, Option<usize>> {
        self.indices.view()
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn num_columns(&self) -> usize {
        self.indices.ncols()
    }

    /// Length of the profile the indices refer to.
    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    /// Whether the profile was reversed before searching it.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Check that the table can be used for these targets on this profile.
    ///
    /// Targets are compared bit for bit, so a `NaN` target matches itself.
    pub(crate) fn check_compatible(
        &self,
        targets: &[f64],
        num_levels: usize,
        num_columns: usize,
        reversed: bool,
    ) -> Result<(), VerticalError> {
        if self.num_columns() != num_columns {
            return Err(VerticalError::shape_mismatch(
                &[self.targets.len(), self.num_columns()],
                &[targets.len(), num_columns],
            ));
        }
        let same_targets = self.targets.len() == targets.len()
            && self
                .targets
                .iter()
                .zip(targets)
                .all(|(a, b)| a.to_bits() == b.to_bits());
        if !same_targets || self.num_levels != num_levels || self.reversed != reversed {
            return Err(VerticalError::StaleIndexTable);
        }
        Ok(())
    }
}

/// Find the bracketing indices of `targets` in `profile`.
///
/// The vertical axis of `profile` is first and every other axis is flattened
/// into columns. Each column must be increasing, e.g. pressure ordered from
/// the model top to the surface. With `reverse`, the columns are reversed
/// first, which suits altitude ordered from the top down (or pressure stored
/// from the surface up).
///
/// Returns [`VerticalError::NonMonotonicProfile`] if a column (after the
/// optional reversal) decreases anywhere or contains `NaN`.
pub fn locate_level(
    profile: ArrayViewD<'_, f64>,
    targets: &[f64],
    reverse: bool,
) -> Result<LevelIndex, VerticalError> {
    let columns = to_columns(&profile)?;
    let columns = if reverse {
        columns.slice_move(s![..;-1, ..])
    } else {
        columns
    };

    let indices = locate_columns(columns.view(), targets)?;
    Ok(LevelIndex {
        indices,
        targets: targets.to_vec(),
        num_levels: columns.nrows(),
        reversed: reverse,
    })
}

/// Bracketing indices for a profile dimensioned as (levels, columns) that's
/// already in increasing order. The output is dimensioned as (targets,
/// columns).
pub(crate) fn locate_columns(
    profile: ArrayView2<'_, f64>,
    targets: &[f64],
) -> Result<Array2<Option<usize>>, VerticalError> {
    log::debug!(
        "locating {} target levels in {} columns of {} levels",
        targets.len(),
        profile.ncols(),
        profile.nrows()
    );

    let per_column: Vec<SmallVec<[Option<usize>; 8]>> = (0..profile.ncols())
        .into_par_iter()
        .map(|column| -> Result<SmallVec<[Option<usize>; 8]>, VerticalError> {
            let values: SmallVec<[f64; 64]> = profile.column(column).iter().copied().collect();
            if !values.windows(2).all(|pair| pair[0] <= pair[1]) {
                return Err(VerticalError::NonMonotonicProfile { column });
            }
            Ok(targets
                .iter()
                .map(|&target| bracket(&values, target))
                .collect())
        })
        .collect::<Result<_, _>>()?;

    Ok(Array2::from_shape_fn(
        (targets.len(), profile.ncols()),
        |(target, column)| per_column[column][target],
    ))
}

/// Index of the last value that doesn't exceed `target` in the sorted slice
/// `values`.
fn bracket(values: &[f64], target: f64) -> Option<usize> {
    values
        .partition_point(|&value| value <= target)
        .checked_sub(1)
}
