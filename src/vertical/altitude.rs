//! Altitude on half and full levels by hydrostatic integration

use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayViewD, ArrayViewMut1, Zip};
use smallvec::SmallVec;

use super::{
    from_columns, pressure::pressure_columns, to_columns, HybridCoefficients, LevelType,
    PhysicalConstants,
};
use crate::error::VerticalError;

/// Compute the altitude field in m.
///
/// The temperature `temperature` in K is on full levels, with its vertical axis
/// first followed by the shape of `surface_pressure`. With no
/// `surface_elevation` the result is the height above ground level; otherwise
/// it's measured from the same datum as `surface_elevation`, which is either a
/// single value (of any shape) or has the shape of `surface_pressure`.
///
/// The integration follows the hypsometric equation from the surface upwards,
///
/// ```text
/// dz = (R T / g) (-d ln p)
/// ```
///
/// so each level depends on the one below it. If the model top is a vacuum
/// then the top half level is infinitely high.
pub fn compute_altitude(
    surface_pressure: ArrayViewD<'_, f64>,
    coefficients: &HybridCoefficients,
    temperature: ArrayViewD<'_, f64>,
    surface_elevation: Option<ArrayViewD<'_, f64>>,
    level_type: LevelType,
    constants: &PhysicalConstants,
) -> Result<ArrayD<f64>, VerticalError> {
    let num_full = coefficients.num_full_levels();

    let mut expected_shape = vec![num_full];
    expected_shape.extend_from_slice(surface_pressure.shape());
    if temperature.shape() != expected_shape.as_slice() {
        return Err(VerticalError::shape_mismatch(&expected_shape, temperature.shape()));
    }

    let ps: Array1<f64> = surface_pressure.iter().copied().collect();
    let elevation: Array1<f64> = match &surface_elevation {
        // A single value applies to every column, whatever its shape
        Some(z) if z.len() == 1 => {
            Array1::from_elem(ps.len(), z.iter().copied().next().unwrap_or_default())
        }
        Some(z) => {
            let broadcast = z.broadcast(surface_pressure.raw_dim()).ok_or_else(|| {
                VerticalError::shape_mismatch(surface_pressure.shape(), z.shape())
            })?;
            broadcast.iter().copied().collect()
        }
        None => Array1::zeros(ps.len()),
    };
    let temperature = to_columns(&temperature)?;

    log::debug!(
        "integrating {level_type} level altitude for {} columns and {} half levels",
        ps.len(),
        coefficients.num_half_levels()
    );

    let (p_half, p_full) = pressure_columns(ps.view(), coefficients);
    let mut z_half = Array2::zeros(p_half.raw_dim());
    let mut z_full = Array2::zeros(p_full.raw_dim());

    let factor = constants.hypsometric_factor();
    Zip::from(z_half.columns_mut())
        .and(z_full.columns_mut())
        .and(p_half.columns())
        .and(p_full.columns())
        .and(temperature.columns())
        .and(&elevation)
        .par_for_each(|z_half, z_full, p_half, p_full, t, &z_sfc| {
            altitude_column(factor, z_sfc, p_half, p_full, t, z_half, z_full)
        });

    let columns = match level_type {
        LevelType::Half => z_half,
        LevelType::Full => z_full,
    };
    from_columns(columns, surface_pressure.shape())
}

/// Integrate one column from the surface to the top.
fn altitude_column(
    factor: f64,
    z_sfc: f64,
    p_half: ArrayView1<'_, f64>,
    p_full: ArrayView1<'_, f64>,
    t: ArrayView1<'_, f64>,
    mut z_half: ArrayViewMut1<'_, f64>,
    mut z_full: ArrayViewMut1<'_, f64>,
) {
    let log_p: SmallVec<[f64; 64]> = p_half.iter().map(|p| p.ln()).collect();

    let surface = p_half.len() - 1;
    z_half[surface] = z_sfc;
    for k in (0..surface).rev() {
        let scale_height = factor * t[k];
        z_half[k] = z_half[k + 1] + scale_height * (log_p[k + 1] - log_p[k]);
        z_full[k] = z_half[k + 1] + scale_height * (1.0 - p_half[k] / p_full[k]);
    }
}
