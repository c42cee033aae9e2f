//! Interface between Rust and Python
//!
//! The functions take numpy arrays with the vertical axis first and return new
//! numpy arrays. Level types and interpolation modes are given as strings.

use numpy::{
    IntoPyArray, PyArray1, PyArray2, PyArrayDyn, PyReadonlyArray1, PyReadonlyArrayDyn,
};
use pyo3::prelude::*;

use crate::{
    derivative, error::VerticalError, grid, vertical, HybridCoefficients, InterpOptions,
    LevelIndex, LevelType, PhysicalConstants,
};

impl From<VerticalError> for PyErr {
    fn from(e: VerticalError) -> Self {
        use pyo3::exceptions::PyValueError;

        PyValueError::new_err(e.to_string())
    }
}

fn coefficients(
    ak: &PyReadonlyArray1<'_, f64>,
    bk: &PyReadonlyArray1<'_, f64>,
) -> Result<HybridCoefficients, VerticalError> {
    HybridCoefficients::new(ak.as_array().to_owned(), bk.as_array().to_owned())
}

/// Bracketing indices from `locate_level`, reusable across `interpolate` calls.
#[pyclass(name = "LevelIndex")]
struct PyLevelIndex {
    inner: LevelIndex,
}

#[pymethods]
impl PyLevelIndex {
    /// Indices dimensioned as (targets, columns), with -1 for targets above the
    /// top of the profile.
    #[getter]
    fn indices<'py>(&self, py: Python<'py>) -> &'py PyArray2<i64> {
        self.inner
            .indices()
            .mapv(|n| n.map_or(-1, |n| n as i64))
            .into_pyarray(py)
    }

    #[getter]
    fn targets(&self) -> Vec<f64> {
        self.inner.targets().to_vec()
    }
}

/// Pressure in Pa on full or half levels.
#[pyfunction]
#[pyo3(name = "compute_pressure", signature = (ps, ak, bk, lev_type = "full"))]
fn py_compute_pressure<'py>(
    py: Python<'py>,
    ps: PyReadonlyArrayDyn<'py, f64>,
    ak: PyReadonlyArray1<'py, f64>,
    bk: PyReadonlyArray1<'py, f64>,
    lev_type: &str,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let level_type: LevelType = lev_type.parse()?;
    let coefficients = coefficients(&ak, &bk)?;
    let pressure = vertical::compute_pressure(ps.as_array(), &coefficients, level_type)?;
    Ok(pressure.into_pyarray(py))
}

/// Altitude in m on full or half levels.
#[pyfunction]
#[pyo3(
    name = "compute_altitude",
    signature = (ps, ak, bk, temp, topo = None, lev_type = "full", gas_constant = None, gravity = None)
)]
#[allow(clippy::too_many_arguments)]
fn py_compute_altitude<'py>(
    py: Python<'py>,
    ps: PyReadonlyArrayDyn<'py, f64>,
    ak: PyReadonlyArray1<'py, f64>,
    bk: PyReadonlyArray1<'py, f64>,
    temp: PyReadonlyArrayDyn<'py, f64>,
    topo: Option<PyReadonlyArrayDyn<'py, f64>>,
    lev_type: &str,
    gas_constant: Option<f64>,
    gravity: Option<f64>,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let level_type: LevelType = lev_type.parse()?;
    let coefficients = coefficients(&ak, &bk)?;
    let defaults = PhysicalConstants::default();
    let constants = PhysicalConstants::new(
        gas_constant.unwrap_or(defaults.gas_constant()),
        gravity.unwrap_or(defaults.gravity()),
    )?;

    let altitude = vertical::compute_altitude(
        ps.as_array(),
        &coefficients,
        temp.as_array(),
        topo.as_ref().map(|topo| topo.as_array()),
        level_type,
        &constants,
    )?;
    Ok(altitude.into_pyarray(py))
}

/// Bracketing indices of the target levels in an increasing profile.
#[pyfunction]
#[pyo3(name = "locate_level", signature = (l_full, l_lev, reverse_input = false))]
fn py_locate_level(
    l_full: PyReadonlyArrayDyn<'_, f64>,
    l_lev: Vec<f64>,
    reverse_input: bool,
) -> PyResult<PyLevelIndex> {
    let inner = vertical::locate_level(l_full.as_array(), &l_lev, reverse_input)?;
    Ok(PyLevelIndex { inner })
}

/// Interpolate a field onto pressure or altitude levels.
#[pyfunction]
#[pyo3(
    name = "interpolate",
    signature = (var_in, l_full, l_lev, interp_type = "log", reverse_input = false, masktop = true, index = None)
)]
fn py_interpolate<'py>(
    py: Python<'py>,
    var_in: PyReadonlyArrayDyn<'py, f64>,
    l_full: PyReadonlyArrayDyn<'py, f64>,
    l_lev: Vec<f64>,
    interp_type: &str,
    reverse_input: bool,
    masktop: bool,
    index: Option<PyRef<'py, PyLevelIndex>>,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let options = InterpOptions {
        mode: interp_type.parse()?,
        reverse: reverse_input,
        mask_top: masktop,
    };
    let output = vertical::interpolate(
        var_in.as_array(),
        l_full.as_array(),
        &l_lev,
        &options,
        index.as_ref().map(|index| &index.inner),
    )?;
    Ok(output.into_pyarray(py))
}

/// Unevenly spaced sigma levels.
#[pyfunction]
#[pyo3(name = "stretched_sigma")]
fn py_stretched_sigma(
    py: Python<'_>,
    num_levels: usize,
    n_scale_heights: f64,
    surf_res: f64,
    exponent: f64,
    zero_top: bool,
) -> PyResult<&PyArray1<f64>> {
    let sigma = grid::stretched_sigma(num_levels, n_scale_heights, surf_res, exponent, zero_top)?;
    Ok(sigma.into_pyarray(py))
}

/// Sigma/pressure transition factor.
#[pyfunction]
#[pyo3(name = "transition_weight", signature = (pfull, p_sigma = 0.1, p_press = 0.05))]
fn py_transition_weight<'py>(
    py: Python<'py>,
    pfull: PyReadonlyArray1<'py, f64>,
    p_sigma: f64,
    p_press: f64,
) -> PyResult<&'py PyArray1<f64>> {
    let weight = grid::transition_weight(pfull.as_array(), p_sigma, p_press)?;
    Ok(weight.into_pyarray(py))
}

/// Swinbank hybrid coefficients, returned as `(ak, bk, ks)`.
#[pyfunction]
#[pyo3(name = "swinbank", signature = (plev, psfc, ptrans = 1.0))]
fn py_swinbank<'py>(
    py: Python<'py>,
    plev: PyReadonlyArray1<'py, f64>,
    psfc: f64,
    ptrans: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>, usize)> {
    let (coefficients, first_sigma) = grid::swinbank(plev.as_array(), psfc, ptrans)?;
    let (ak, bk) = coefficients.into_parts();
    Ok((ak.into_pyarray(py), bk.into_pyarray(py), first_sigma))
}

/// Derivative along the first axis.
#[pyfunction]
#[pyo3(name = "differentiate", signature = (arr, h = None))]
fn py_differentiate<'py>(
    py: Python<'py>,
    arr: PyReadonlyArrayDyn<'py, f64>,
    h: Option<PyReadonlyArrayDyn<'py, f64>>,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let spacing = h.as_ref().map(|h| h.as_array());
    let derivative = derivative::differentiate(arr.as_array(), spacing)?;
    Ok(derivative.into_pyarray(py))
}

/// A Python module implemented in Rust.
#[pymodule]
fn hybrid_sigma(_py: Python, m: &PyModule) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(py_compute_pressure, m)?)?;
    m.add_function(wrap_pyfunction!(py_compute_altitude, m)?)?;
    m.add_function(wrap_pyfunction!(py_locate_level, m)?)?;
    m.add_function(wrap_pyfunction!(py_interpolate, m)?)?;
    m.add_function(wrap_pyfunction!(py_stretched_sigma, m)?)?;
    m.add_function(wrap_pyfunction!(py_transition_weight, m)?)?;
    m.add_function(wrap_pyfunction!(py_swinbank, m)?)?;
    m.add_function(wrap_pyfunction!(py_differentiate, m)?)?;
    m.add_class::<PyLevelIndex>()?;
    Ok(())
}
