//! Pressure on half and full levels

use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayViewD, ArrayViewMut1, Zip};

use super::{from_columns, HybridCoefficients, LevelType};
use crate::error::VerticalError;

/// Compute the pressure field in Pa from the surface pressure.
///
/// `surface_pressure` may have any shape, including zero dimensions for a
/// single column. The output has a new leading vertical axis with `Nk` levels
/// for [`LevelType::Half`] or `Nk - 1` levels for [`LevelType::Full`], followed
/// by the shape of `surface_pressure`.
pub fn compute_pressure(
    surface_pressure: ArrayViewD<'_, f64>,
    coefficients: &HybridCoefficients,
    level_type: LevelType,
) -> Result<ArrayD<f64>, VerticalError> {
    let ps: Array1<f64> = surface_pressure.iter().copied().collect();
    log::debug!(
        "computing {level_type} level pressure for {} columns and {} half levels",
        ps.len(),
        coefficients.num_half_levels()
    );

    let (half, full) = pressure_columns(ps.view(), coefficients);
    let columns = match level_type {
        LevelType::Half => half,
        LevelType::Full => full,
    };
    from_columns(columns, surface_pressure.shape())
}

/// Half and full level pressure, each dimensioned as (levels, columns).
pub(crate) fn pressure_columns(
    ps: ArrayView1<'_, f64>,
    coefficients: &HybridCoefficients,
) -> (Array2<f64>, Array2<f64>) {
    let num_columns = ps.len();
    let mut half = Array2::zeros((coefficients.num_half_levels(), num_columns));
    let mut full = Array2::zeros((coefficients.num_full_levels(), num_columns));

    Zip::from(half.columns_mut())
        .and(full.columns_mut())
        .and(&ps)
        .par_for_each(|half, full, &ps| pressure_column(ps, coefficients, half, full));

    (half, full)
}

fn pressure_column(
    ps: f64,
    coefficients: &HybridCoefficients,
    mut half: ArrayViewMut1<'_, f64>,
    mut full: ArrayViewMut1<'_, f64>,
) {
    Zip::from(&mut half)
        .and(coefficients.ak())
        .and(coefficients.bk())
        .for_each(|p, &ak, &bk| *p = ps * bk + ak);

    for k in 0..full.len() {
        full[k] = if k == 0 && coefficients.has_vacuum_top() {
            // ln(0) is undefined, so fall back to the arithmetic mean
            0.5 * (half[0] + half[1])
        } else {
            log_mean(half[k], half[k + 1])
        };
    }
}

/// Mean pressure of a layer that is consistent with the layer having equal
/// thickness in log-pressure.
fn log_mean(p_top: f64, p_bottom: f64) -> f64 {
    if p_top == p_bottom {
        p_top
    } else {
        (p_bottom - p_top) / f64::ln(p_bottom / p_top)
    }
}
