//! Construction of hybrid vertical grids

use std::f64::consts::FRAC_PI_2;

use ndarray::{Array1, ArrayView1};

use crate::{error::VerticalError, vertical::HybridCoefficients};

/// Generate an unevenly spaced sigma grid.
///
/// There are `num_levels + 1` half levels ordered from the top down. With
/// `zeta = 1 - k / num_levels`, the level `k` is at
///
/// ```text
/// z = surface_resolution * zeta + (1 - surface_resolution) * zeta^exponent
/// sigma[k] = exp(-z * num_scale_heights)
/// ```
///
/// so `num_scale_heights` sets the model top (12.5 scale heights is roughly
/// 100 km for an 8 km scale height) and larger exponents give thicker upper
/// layers. The last value is always 1 (the surface), and the first is 0 if
/// `zero_top` is set.
pub fn stretched_sigma(
    num_levels: usize,
    num_scale_heights: f64,
    surface_resolution: f64,
    exponent: f64,
    zero_top: bool,
) -> Result<Array1<f64>, VerticalError> {
    if num_levels == 0 {
        return Err(VerticalError::TooFewLevels {
            needed: 1,
            found: 0,
        });
    }

    let mut sigma = Array1::from_shape_fn(num_levels + 1, |k| {
        let zeta = 1.0 - k as f64 / num_levels as f64;
        let z = surface_resolution * zeta + (1.0 - surface_resolution) * zeta.powf(exponent);
        f64::exp(-z * num_scale_heights)
    });
    sigma[num_levels] = 1.0;
    if zero_top {
        sigma[0] = 0.0;
    }
    Ok(sigma)
}

/// The sigma/pressure transition factor for each full level pressure.
///
/// The factor is 0 at or above `p_press` (pure pressure), 1 at or below
/// `p_sigma` (pure sigma), and `sin^2` of the scaled distance between the two
/// in between.
pub fn transition_weight(
    pressure: ArrayView1<'_, f64>,
    p_sigma: f64,
    p_press: f64,
) -> Result<Array1<f64>, VerticalError> {
    if p_press.is_nan() || p_sigma.is_nan() || p_press >= p_sigma {
        return Err(VerticalError::InvalidParameter(format!(
            "transition must start below the pure pressure region: p_press = {p_press}, p_sigma = {p_sigma}"
        )));
    }

    let width = p_sigma - p_press;
    Ok(pressure.mapv(|p| {
        if p <= p_press {
            0.0
        } else if p >= p_sigma {
            1.0
        } else {
            f64::sin(FRAC_PI_2 * (p - p_press) / width).powi(2)
        }
    }))
}

/// Hybrid coefficients that blend pure pressure into sigma, after Swinbank.
///
/// `pressure` holds the target half level pressures in Pa for a column with
/// surface pressure `surface_pressure`, ordered from the top down. Levels down
/// to the one closest to `p_transition` are pure pressure. Below that, `ak` is
/// the quadratic `alpha * eta + beta + gamma / eta` in `eta = p / ps`, with the
/// coefficients chosen so the grid reproduces `pressure` at the transition
/// and vanishes at the surface, and `bk` makes up the rest.
///
/// Returns the coefficients and the number of pure pressure levels, which is
/// also the index of the first blended level. `bk` vanishes analytically on
/// that level, so the index is taken from the transition rather than from
/// scanning `bk` for the first value that rounds to nonzero.
pub fn swinbank(
    pressure: ArrayView1<'_, f64>,
    surface_pressure: f64,
    p_transition: f64,
) -> Result<(HybridCoefficients, usize), VerticalError> {
    if !(surface_pressure.is_finite() && surface_pressure > 0.0) {
        return Err(VerticalError::InvalidParameter(format!(
            "surface pressure must be finite and positive, got {surface_pressure}"
        )));
    }
    let num_levels = pressure.len();
    if num_levels < 3 {
        return Err(VerticalError::TooFewLevels {
            needed: 3,
            found: num_levels,
        });
    }
    let surface = num_levels - 1;

    // Number of pure pressure levels
    let k_transition = pressure
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            f64::abs(*a - p_transition).total_cmp(&f64::abs(*b - p_transition))
        })
        .map(|(k, _)| k)
        .unwrap_or(0);
    if k_transition + 1 >= surface {
        return Err(VerticalError::InvalidParameter(format!(
            "transition pressure {p_transition} leaves no hybrid levels above the surface"
        )));
    }

    let eta = pressure.mapv(|p| p / surface_pressure);
    let ep = eta[k_transition + 1];
    let es = eta[surface];
    let norm = (es - ep).powi(2);

    let alpha = (ep.powi(2) - 2.0 * ep * es) / norm;
    let beta = 2.0 * ep * es.powi(2) / norm;
    let gamma = -(ep * es).powi(2) / norm;

    let mut ak = pressure.to_owned();
    let mut bk = Array1::zeros(num_levels);
    for k in k_transition + 1..surface {
        ak[k] = (alpha * eta[k] + beta + gamma / eta[k]) * surface_pressure;
        bk[k] = (pressure[k] - ak[k]) / surface_pressure;
    }
    ak[surface] = 0.0;
    bk[surface] = 1.0;

    let first_sigma = k_transition + 1;
    log::debug!(
        "swinbank grid with {num_levels} levels: transition at {k_transition}, first sigma level {first_sigma}"
    );

    Ok((HybridCoefficients::new(ak, bk)?, first_sigma))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    #[test]
    fn stretched_sigma_boundaries() {
        let sigma = stretched_sigma(28, 10.5, 0.1, 3.0, true).unwrap();
        assert_eq!(sigma.len(), 29);
        assert_eq!(sigma[0], 0.0);
        assert_eq!(sigma[28], 1.0);
        assert!(sigma
            .as_slice()
            .unwrap()
            .windows(2)
            .all(|pair| pair[0] < pair[1]));

        let sigma = stretched_sigma(28, 10.5, 0.1, 3.0, false).unwrap();
        assert_relative_eq!(sigma[0], f64::exp(-10.5));
        assert_eq!(sigma[28], 1.0);
    }

    #[test]
    fn stretched_sigma_uniform() {
        // With full surface resolution, the levels are evenly spaced in log sigma
        let sigma = stretched_sigma(4, 8.0, 1.0, 2.0, false).unwrap();
        for k in 0..4 {
            assert_relative_eq!(sigma[k], f64::exp(-8.0 * (1.0 - k as f64 / 4.0)));
        }
        assert!(stretched_sigma(0, 8.0, 1.0, 2.0, false).is_err());
    }

    #[test]
    fn transition_regimes() {
        let p = array![0.01, 0.05, 0.06, 0.075, 0.09, 0.1, 0.5];
        let t = transition_weight(p.view(), 0.1, 0.05).unwrap();
        assert_eq!(t[0], 0.0);
        assert_eq!(t[1], 0.0);
        assert!(t[2] > 0.0 && t[2] < 1.0);
        assert_relative_eq!(t[3], 0.5, epsilon = 1e-12);
        assert!(t[4] > t[3] && t[4] < 1.0);
        assert_eq!(t[5], 1.0);
        assert_eq!(t[6], 1.0);

        assert!(transition_weight(p.view(), 0.05, 0.1).is_err());
    }

    fn levels() -> Array1<f64> {
        array![1., 2., 5., 10., 20., 50., 100., 200., 400., 610.]
    }

    #[test]
    fn swinbank_grid() {
        let p = levels();
        let (coefficients, first_sigma) = swinbank(p.view(), 610., 10.).unwrap();
        let ak = coefficients.ak();
        let bk = coefficients.bk();

        assert_eq!(ak[9], 0.0);
        assert_eq!(bk[9], 1.0);

        // Pure pressure down to the transition
        for k in 0..=3 {
            assert_eq!(ak[k], p[k]);
            assert_eq!(bk[k], 0.0);
        }
        // The first level below the transition is still (numerically) pure
        // pressure
        assert_relative_eq!(ak[4], p[4], max_relative = 1e-12);
        assert_relative_eq!(bk[4], 0.0, epsilon = 1e-12);

        // The grid reproduces the target levels
        for k in 0..10 {
            assert_relative_eq!(ak[k] + 610. * bk[k], p[k], max_relative = 1e-12);
        }

        // Levels 0 to 3 are pure pressure, with 10 Pa closest to the transition
        assert_eq!(first_sigma, 4);
        assert!(bk.iter().skip(5).all(|&b| b > 0.0));
    }

    #[test]
    fn swinbank_first_sigma_level() {
        let p = levels();
        // bk on the first blended level is zero up to rounding, of either sign
        for (p_transition, k_transition) in [(8., 3), (10., 3), (45., 5), (90., 6)] {
            let (coefficients, first_sigma) = swinbank(p.view(), 610., p_transition).unwrap();
            assert_eq!(first_sigma, k_transition + 1);

            let bk = coefficients.bk();
            assert!(bk.iter().take(first_sigma).all(|&b| b == 0.0));
            assert_relative_eq!(bk[first_sigma], 0.0, epsilon = 1e-12);
            assert!(bk.iter().skip(first_sigma + 1).all(|&b| b > 0.0));
        }
    }

    #[test]
    fn swinbank_invalid() {
        let p = levels();
        // The closest level is the surface
        assert!(swinbank(p.view(), 610., 600.).is_err());
        assert!(swinbank(p.view(), 0., 10.).is_err());
        assert!(matches!(
            swinbank(array![1., 610.].view(), 610., 1.),
            Err(VerticalError::TooFewLevels { .. })
        ));
    }
}
