//! Numerical core of the spectral heat equation solver
//!
//! The temperature field's second derivative is computed in Fourier space
//! ([`spectral`]), scaled by the diffusivity to get its rate of change
//! ([`heat`]), and integrated over time by an ODE integrator ([`integrate`]).

pub mod heat;
pub mod integrate;
pub mod spectral;
pub mod wavenumber;

pub use self::{
    heat::{dudt, HeatEquation},
    integrate::{
        AnyIntegrator, DormandPrince, IntegrationError, IntegrationStats, Integrator,
        IntegratorArgs, OdeSystem, RungeKutta4, Tolerance,
    },
    spectral::{second_derivative, SpectralDerivative},
    wavenumber::kappa,
};

use data::{
    initiate, parameters::ConfigError, parameters::Parameters, Grid, Initial, SolutionMatrix,
    TimeSequence,
};
use log::info;
use ndarray::Array2;
use thiserror::Error;

/// Result of a heat equation run
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Spatial grid
    pub grid: Grid,

    /// Time instants at which the temperature was sampled
    pub times: TimeSequence,

    /// Temperature at each time instant (rows) and grid point (columns)
    pub temperature: SolutionMatrix,

    /// Work performed by the integrator
    pub stats: IntegrationStats,
}

/// Failure to run a simulation
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Invalid physical parameters
    #[error("invalid parameters: {0}")]
    Config(#[from] ConfigError),

    /// Time integration failed
    #[error("time integration failed: {0}")]
    Integration(#[from] IntegrationError),
}

/// Solve the heat equation described by `params` with `integrator`
pub fn solve(params: &Parameters, integrator: &impl Integrator) -> Result<Solution, Error> {
    solve_with_progress(params, integrator, |_| {})
}

/// Like `solve()`, but `on_row` is notified each time the temperature field
/// has been computed for one more time instant
pub fn solve_with_progress(
    params: &Parameters,
    integrator: &impl Integrator,
    on_row: impl FnMut(usize),
) -> Result<Solution, Error> {
    let Initial { grid, times, u0 } = initiate(params)?;
    let heat = HeatEquation::on_grid(params.diffusivity, &grid);
    let mut temperature = Array2::zeros((times.len(), grid.len()));
    let stats = integrator.integrate_into(
        &heat,
        u0.view(),
        times.instants(),
        temperature.view_mut(),
        on_row,
    )?;
    info!(
        "Solved heat equation on {} points over {} time instants",
        grid.len(),
        times.len()
    );
    Ok(Solution {
        grid,
        times,
        temperature,
        stats,
    })
}
