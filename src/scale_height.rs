//! Approximate conversions between pressure and altitude

use ndarray::{Array, ArrayView, Dimension};

/// An exponential atmosphere with a fixed scale height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleHeight {
    /// Scale height in km
    pub scale_height_km: f64,
    /// Pressure in Pa at zero altitude
    pub reference_pressure: f64,
}

impl Default for ScaleHeight {
    /// Mars, with an 8 km scale height and a 610 Pa reference pressure.
    fn default() -> Self {
        Self {
            scale_height_km: 8.0,
            reference_pressure: 610.0,
        }
    }
}

impl ScaleHeight {
    /// Altitude in km for a pressure in Pa.
    pub fn altitude_km(&self, pressure: f64) -> f64 {
        -self.scale_height_km * f64::ln(pressure / self.reference_pressure)
    }

    /// Pressure in Pa for an altitude in km.
    pub fn pressure_pa(&self, altitude_km: f64) -> f64 {
        self.reference_pressure * f64::exp(-altitude_km / self.scale_height_km)
    }

    pub fn altitudes_km<D: Dimension>(&self, pressure: ArrayView<'_, f64, D>) -> Array<f64, D> {
        pressure.mapv(|p| self.altitude_km(p))
    }

    pub fn pressures_pa<D: Dimension>(&self, altitude_km: ArrayView<'_, f64, D>) -> Array<f64, D> {
        altitude_km.mapv(|z| self.pressure_pa(z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn reference_level() {
        let atmosphere = ScaleHeight::default();
        assert_eq!(atmosphere.altitude_km(610.), 0.);
        assert_eq!(atmosphere.pressure_pa(0.), 610.);
        assert_relative_eq!(atmosphere.altitude_km(610. / std::f64::consts::E), 8.);
    }

    #[test]
    fn inverse() {
        let atmosphere = ScaleHeight {
            scale_height_km: 7.0,
            reference_pressure: 1e5,
        };
        let p = array![[1e5, 5e4], [100., 1.]];
        let z = atmosphere.altitudes_km(p.view());
        let back = atmosphere.pressures_pa(z.view());
        for (&p, &back) in p.iter().zip(&back) {
            assert_relative_eq!(p, back, max_relative = 1e-12);
        }
        assert!(z[[1, 1]] > z[[1, 0]]);
    }
}
