//! Right-hand side of the heat equation

use crate::{integrate::OdeSystem, spectral::SpectralDerivative};
use data::{Field, Grid, Precision};
use ndarray::ArrayView1;

/// Heat equation `du/dt = D·d²u/dx²` on a periodic grid
///
/// Binds the diffusivity and the grid's spectral derivative operator, so that
/// integrators see a function of the temperature field alone.
#[derive(Clone, Debug)]
pub struct HeatEquation {
    /// Heat diffusivity
    diffusivity: Precision,

    /// Second derivative operator
    laplacian: SpectralDerivative,
}
//
impl HeatEquation {
    /// Set up the heat equation for a given diffusivity and derivative operator
    pub fn new(diffusivity: Precision, laplacian: SpectralDerivative) -> Self {
        Self {
            diffusivity,
            laplacian,
        }
    }

    /// Set up the heat equation on a spatial grid
    pub fn on_grid(diffusivity: Precision, grid: &Grid) -> Self {
        Self::new(diffusivity, SpectralDerivative::for_grid(grid))
    }

    /// Heat diffusivity
    pub fn diffusivity(&self) -> Precision {
        self.diffusivity
    }

    /// Wavenumbers of the underlying grid
    pub fn wavenumbers(&self) -> ArrayView1<'_, Precision> {
        self.laplacian.wavenumbers()
    }

    /// Rate of change of the temperature field `u`
    pub fn dudt(&self, u: ArrayView1<Precision>) -> Field {
        let mut rate = self.laplacian.second_derivative(u);
        rate *= self.diffusivity;
        rate
    }
}
//
impl OdeSystem for HeatEquation {
    fn derivative(&self, _t: Precision, u: ArrayView1<Precision>) -> Field {
        self.dudt(u)
    }
}

/// Rate of change of the temperature field `u` for diffusivity `diffusivity`
/// on a grid with wavenumbers `wavenumbers`
pub fn dudt(
    u: ArrayView1<Precision>,
    diffusivity: Precision,
    wavenumbers: ArrayView1<Precision>,
) -> Field {
    HeatEquation::new(diffusivity, SpectralDerivative::new(wavenumbers.to_owned())).dudt(u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{spectral::second_derivative, wavenumber::kappa};
    use data::{initiate, parameters::Parameters};

    #[test]
    fn scaled_curvature() {
        let initial = initiate(&Parameters::default()).unwrap();
        let wavenumbers = kappa(initial.grid.len(), initial.grid.dx());
        let curvature = second_derivative(initial.u0.view(), wavenumbers.view());
        let rate = dudt(initial.u0.view(), 23.0, wavenumbers.view());
        for (&c, &r) in curvature.iter().zip(&rate) {
            assert_eq!(r, 23.0 * c);
        }
        assert_eq!(rate[0], 0.0);
        assert_eq!(rate[99], 0.0);

        // The Gaussian peak cools down, its tails warm up
        assert!(rate[50] < 0.0);
        assert!(rate[10] > 0.0);
    }

    #[test]
    fn time_independent() {
        let initial = initiate(&Parameters::default()).unwrap();
        let heat = HeatEquation::on_grid(23.0, &initial.grid);
        assert_eq!(heat.diffusivity(), 23.0);
        assert_eq!(heat.wavenumbers().len(), 100);
        assert_eq!(
            heat.derivative(0.0, initial.u0.view()),
            heat.derivative(0.25, initial.u0.view())
        );
    }

    #[test]
    fn no_diffusion() {
        let initial = initiate(&Parameters::default()).unwrap();
        let heat = HeatEquation::on_grid(0.0, &initial.grid);
        assert!(heat.dudt(initial.u0.view()).iter().all(|&r| r == 0.0));
    }
}
