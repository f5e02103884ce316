//! Command-line arguments

use super::{
    DormandPrince, IntegrationError, IntegrationStats, Integrator, OdeSystem, RungeKutta4,
    Tolerance,
};
use clap::{Args, ValueEnum};
use data::Precision;
use ndarray::{ArrayView1, ArrayViewMut2};
use std::num::NonZeroUsize;

/// Time integration method
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, ValueEnum)]
pub enum Method {
    /// Adaptive Dormand-Prince 5(4)
    #[default]
    Dopri5,

    /// Fixed-step classic Runge-Kutta
    Rk4,
}

/// CLI parameters of the time integrator
#[derive(Args, Copy, Clone, Debug, Default, PartialEq)]
pub struct IntegratorArgs {
    /// Time integration method
    #[arg(long, value_enum, env, default_value_t = Method::Dopri5)]
    pub method: Method,

    /// Relative error tolerance of the adaptive integrator
    #[arg(long, env)]
    pub rtol: Option<Precision>,

    /// Absolute error tolerance of the adaptive integrator
    #[arg(long, env)]
    pub atol: Option<Precision>,

    /// Maximal number of internal steps of the adaptive integrator
    #[arg(long, env)]
    pub max_steps: Option<usize>,

    /// Upper bound on the internal step size of the adaptive integrator
    #[arg(long)]
    pub max_step: Option<Precision>,

    /// Size of the first internal step of the adaptive integrator
    #[arg(long)]
    pub first_step: Option<Precision>,

    /// Number of RK4 steps between two output time instants
    ///
    /// Explicit integration of the heat equation is only stable for steps
    /// shorter than about 2.8·dx²/(π²·D), so this usually needs to be large.
    #[arg(long, env)]
    pub substeps: Option<NonZeroUsize>,
}
//
impl IntegratorArgs {
    /// Build the integrator that these arguments describe, using default
    /// settings for anything that was not specified
    pub fn integrator(&self) -> AnyIntegrator {
        match self.method {
            Method::Dopri5 => {
                let defaults = DormandPrince::default();
                AnyIntegrator::DormandPrince(DormandPrince {
                    tolerance: Tolerance {
                        relative: self.rtol.unwrap_or(defaults.tolerance.relative),
                        absolute: self.atol.unwrap_or(defaults.tolerance.absolute),
                    },
                    max_steps: self.max_steps.unwrap_or(defaults.max_steps),
                    max_step: self.max_step.or(defaults.max_step),
                    first_step: self.first_step.or(defaults.first_step),
                })
            }
            Method::Rk4 => {
                let defaults = RungeKutta4::default();
                AnyIntegrator::RungeKutta4(RungeKutta4 {
                    substeps: self.substeps.unwrap_or(defaults.substeps),
                    ..defaults
                })
            }
        }
    }
}

/// Integrator picked at run time
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AnyIntegrator {
    /// Adaptive integrator
    DormandPrince(DormandPrince),

    /// Fixed-step integrator
    RungeKutta4(RungeKutta4),
}
//
impl Default for AnyIntegrator {
    fn default() -> Self {
        Self::DormandPrince(DormandPrince::default())
    }
}
//
impl Integrator for AnyIntegrator {
    fn integrate_into<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        u0: ArrayView1<Precision>,
        times: ArrayView1<Precision>,
        solution: ArrayViewMut2<Precision>,
        on_row: impl FnMut(usize),
    ) -> Result<IntegrationStats, IntegrationError> {
        match self {
            Self::DormandPrince(integrator) => {
                integrator.integrate_into(system, u0, times, solution, on_row)
            }
            Self::RungeKutta4(integrator) => {
                integrator.integrate_into(system, u0, times, solution, on_row)
            }
        }
    }
}
