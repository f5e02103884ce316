//! Spatial derivatives computed in Fourier space

use crate::wavenumber::kappa;
use data::{Field, Grid, Precision};
use ndarray::{Array1, ArrayView1};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{fmt, sync::Arc};

/// Second derivative operator of a periodic grid
///
/// Owns the grid's wavenumbers along with forward and inverse FFT plans for
/// the grid size, so that repeated evaluations only pay for the transforms.
#[derive(Clone)]
pub struct SpectralDerivative {
    /// Angular wavenumbers in FFT bin order
    wavenumbers: Array1<Precision>,

    /// Forward transform
    forward: Arc<dyn Fft<Precision>>,

    /// Inverse transform (unnormalized)
    inverse: Arc<dyn Fft<Precision>>,
}
//
impl SpectralDerivative {
    /// Set up the operator for a given wavenumber sequence
    pub fn new(wavenumbers: Array1<Precision>) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(wavenumbers.len());
        let inverse = planner.plan_fft_inverse(wavenumbers.len());
        Self {
            wavenumbers,
            forward,
            inverse,
        }
    }

    /// Set up the operator for a spatial grid
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(kappa(grid.len(), grid.dx()))
    }

    /// Number of grid points that this operator works on
    pub fn len(&self) -> usize {
        self.wavenumbers.len()
    }

    /// Truth that this operator works on an empty grid
    pub fn is_empty(&self) -> bool {
        self.wavenumbers.is_empty()
    }

    /// Wavenumbers in FFT bin order
    pub fn wavenumbers(&self) -> ArrayView1<'_, Precision> {
        self.wavenumbers.view()
    }

    /// Second spatial derivative of `field`
    ///
    /// Each Fourier coefficient is multiplied by `-k²`. The first and last
    /// points of the result are then forced to zero.
    ///
    /// # Panics
    ///
    /// If `field` does not have one value per wavenumber.
    pub fn second_derivative(&self, field: ArrayView1<Precision>) -> Field {
        let mut spectrum = self.transform(field);
        for (coefficient, &k) in spectrum.iter_mut().zip(&self.wavenumbers) {
            *coefficient *= -k * k;
        }
        let mut result = self.inverse_transform(spectrum);

        // Endpoints of the derivative are pinned to zero
        let len = result.len();
        if len > 0 {
            result[0] = 0.0;
            result[len - 1] = 0.0;
        }
        result
    }

    /// Forward transform immediately followed by the inverse transform
    ///
    /// Should give back `field` up to roundoff, which makes it a good sanity
    /// check of the transform pair.
    pub fn round_trip(&self, field: ArrayView1<Precision>) -> Field {
        let spectrum = self.transform(field);
        self.inverse_transform(spectrum)
    }

    /// Move a real field to Fourier space
    fn transform(&self, field: ArrayView1<Precision>) -> Vec<Complex<Precision>> {
        assert_eq!(
            field.len(),
            self.len(),
            "Field and wavenumbers should have the same length"
        );
        let mut spectrum = field
            .iter()
            .map(|&value| Complex::new(value, 0.0))
            .collect::<Vec<_>>();
        if !spectrum.is_empty() {
            self.forward.process(&mut spectrum);
        }
        spectrum
    }

    /// Move back to real space, dropping the imaginary residue
    fn inverse_transform(&self, mut spectrum: Vec<Complex<Precision>>) -> Field {
        if spectrum.is_empty() {
            return Field::zeros(0);
        }
        self.inverse.process(&mut spectrum);
        let norm = 1.0 / spectrum.len() as Precision;
        spectrum.iter().map(|value| value.re * norm).collect()
    }
}
//
impl fmt::Debug for SpectralDerivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralDerivative")
            .field("wavenumbers", &self.wavenumbers)
            .finish_non_exhaustive()
    }
}

/// Second spatial derivative of `field` given the grid's wavenumbers
///
/// Plans the FFTs on every call, prefer [`SpectralDerivative`] when the same
/// grid is differentiated repeatedly.
pub fn second_derivative(
    field: ArrayView1<Precision>,
    wavenumbers: ArrayView1<Precision>,
) -> Field {
    SpectralDerivative::new(wavenumbers.to_owned()).second_derivative(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    /// Grid of 64 points over a domain of length 10, centered on zero
    fn grid() -> Grid {
        Grid::centered(10.0, 10.0 / 64.0, 64)
    }

    /// Some arbitrary, non-periodic looking field
    fn rough_field(len: usize) -> Field {
        Field::from_shape_fn(len, |i| {
            let x = i as Precision;
            300.0 + 20.0 * (0.37 * x * x).sin() + 0.5 * x
        })
    }

    #[test]
    fn sine_curvature() {
        let grid = grid();
        let length = 10.0;
        let operator = SpectralDerivative::for_grid(&grid);
        for mode in [1, 3, 7, 20] {
            let wavenumber = TAU * mode as Precision / length;
            let field = grid.coords().mapv(|x| (wavenumber * x).sin());
            let derivative = operator.second_derivative(field.view());
            let len = derivative.len();
            for i in 1..len - 1 {
                let expected = -wavenumber * wavenumber * field[i];
                assert!(
                    (derivative[i] - expected).abs() <= 1e-9 * wavenumber * wavenumber,
                    "mode {mode}, point {i}: got {}, expected {expected}",
                    derivative[i]
                );
            }
        }
    }

    #[test]
    fn pinned_endpoints() {
        let operator = SpectralDerivative::for_grid(&grid());
        let derivative = operator.second_derivative(rough_field(64).view());
        assert_eq!(derivative.len(), 64);
        assert_eq!(derivative[0], 0.0);
        assert_eq!(derivative[63], 0.0);
        assert!(derivative.iter().skip(1).take(62).any(|&d| d != 0.0));

        for len in [1, 2, 3, 17] {
            let derivative = second_derivative(rough_field(len).view(), kappa(len, 0.1).view());
            assert_eq!(derivative[0], 0.0);
            assert_eq!(derivative[len - 1], 0.0);
        }
    }

    #[test]
    fn constant_has_no_curvature() {
        let operator = SpectralDerivative::for_grid(&grid());
        let derivative = operator.second_derivative(Field::from_elem(64, 296.0).view());
        assert!(derivative.iter().all(|d| d.abs() < 1e-6));
    }

    #[test]
    fn input_is_left_alone() {
        let field = rough_field(64);
        let before = field.clone();
        let _ = second_derivative(field.view(), kappa(64, 0.1).view());
        assert_eq!(field, before);
    }

    #[test]
    fn transform_round_trip() {
        for len in [1, 2, 7, 64, 100] {
            let field = rough_field(len);
            let operator = SpectralDerivative::new(kappa(len, 0.1));
            let round_trip = operator.round_trip(field.view());
            for (before, after) in field.iter().zip(&round_trip) {
                assert!((before - after).abs() <= 1e-12 * before.abs());
            }
        }
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn mismatched_lengths() {
        second_derivative(rough_field(10).view(), kappa(11, 0.1).view());
    }
}
