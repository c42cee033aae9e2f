//! Finite difference derivative along the leading axis

use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis, Ix1};

use crate::error::VerticalError;

/// The spacing to divide the differences by.
enum Spacing<'a> {
    /// No spacing, return the differences
    Unit,
    /// One coordinate value per index of the leading axis
    Axis(ArrayView1<'a, f64>),
    /// A coordinate value for every element of the array
    Full(ArrayViewD<'a, f64>),
}

/// Differentiate `array` with respect to `h` along the first axis.
///
/// The interior uses centered differences, `(a[k+1] - a[k-1]) / (h[k+1] -
/// h[k-1])`, and the two boundaries use one-sided differences. `h` is either
/// 1-D with the length of the first axis, or has the same shape as `array`. If
/// it's `None` the undivided differences are returned.
pub fn differentiate(
    array: ArrayViewD<'_, f64>,
    h: Option<ArrayViewD<'_, f64>>,
) -> Result<ArrayD<f64>, VerticalError> {
    let num = array.shape().first().copied().unwrap_or(0);
    if num < 2 {
        return Err(VerticalError::TooFewLevels {
            needed: 2,
            found: num,
        });
    }

    let spacing = match h {
        None => Spacing::Unit,
        Some(h) if h.shape() == array.shape() => Spacing::Full(h),
        Some(h) if h.ndim() == 1 && h.len() == num => {
            Spacing::Axis(h.into_dimensionality::<Ix1>()?)
        }
        Some(h) => return Err(VerticalError::shape_mismatch(array.shape(), h.shape())),
    };

    let mut derivative = ArrayD::zeros(array.raw_dim());
    for k in 0..num {
        let (above, below) = if k == 0 {
            (1, 0)
        } else if k == num - 1 {
            (num - 1, num - 2)
        } else {
            (k + 1, k - 1)
        };

        let diff = &array.index_axis(Axis(0), above) - &array.index_axis(Axis(0), below);
        let mut out = derivative.index_axis_mut(Axis(0), k);
        match &spacing {
            Spacing::Unit => out.assign(&diff),
            Spacing::Axis(h) => out.assign(&(diff / (h[above] - h[below]))),
            Spacing::Full(h) => {
                let dh = &h.index_axis(Axis(0), above) - &h.index_axis(Axis(0), below);
                out.assign(&(diff / &dh));
            }
        }
    }

    Ok(derivative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn plain_differences() {
        let a = array![1., 4., 9., 16.].into_dyn();
        let d = differentiate(a.view(), None).unwrap();
        assert_eq!(d, array![3., 8., 12., 7.].into_dyn());
    }

    #[test]
    fn linear_in_height() {
        // T = 210 - 2.5 z, on uneven levels
        let z = array![0., 1., 3., 7., 15.];
        let t = Array2::from_shape_fn((5, 3), |(k, j)| 210. - 2.5 * z[k] + j as f64).into_dyn();
        let dt_dz = differentiate(t.view(), Some(z.view().into_dyn())).unwrap();
        assert_eq!(dt_dz.shape(), &[5, 3]);
        for &value in dt_dz.iter() {
            assert_relative_eq!(value, -2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn quadratic_interior() {
        // Centered differences are exact for a quadratic on even spacing
        let x = Array1::linspace(0., 2., 9);
        let y = x.mapv(|x| x * x).into_dyn();
        let dy = differentiate(y.view(), Some(x.view().into_dyn())).unwrap();
        for k in 1..8 {
            assert_relative_eq!(dy[[k]], 2. * x[k], epsilon = 1e-12);
        }
        // One-sided at the boundaries
        assert_relative_eq!(dy[[0]], 0.25, epsilon = 1e-12);
        assert_relative_eq!(dy[[8]], 3.75, epsilon = 1e-12);
    }

    #[test]
    fn full_shape_spacing() {
        let h = Array2::from_shape_fn((4, 2), |(k, j)| (j + 1) as f64 * k as f64).into_dyn();
        let a = h.mapv(|h| 3. * h + 1.);
        let d = differentiate(a.view(), Some(h.view())).unwrap();
        for &value in d.iter() {
            assert_relative_eq!(value, 3., epsilon = 1e-12);
        }
    }

    #[test]
    fn mismatched_spacing() {
        let a = Array2::<f64>::zeros((4, 2)).into_dyn();
        let h = Array2::<f64>::zeros((2, 4)).into_dyn();
        assert!(matches!(
            differentiate(a.view(), Some(h.view())),
            Err(VerticalError::ShapeMismatch { .. })
        ));
        let h = Array1::<f64>::zeros(3).into_dyn();
        assert!(matches!(
            differentiate(a.view(), Some(h.view())),
            Err(VerticalError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            differentiate(array![1.].into_dyn().view(), None),
            Err(VerticalError::TooFewLevels { .. })
        ));
    }
}
