//! Time integration of ordinary differential equations
//!
//! Integrators advance a state vector across a sequence of requested time
//! instants. These instants are only sampling points: each integrator picks
//! its own internal steps, and fills one row of the solution matrix per
//! requested instant.

mod args;
mod dopri;
mod rk4;

pub use self::{
    args::{AnyIntegrator, IntegratorArgs, Method},
    dopri::{DormandPrince, Tolerance},
    rk4::RungeKutta4,
};

use data::{Field, Precision, SolutionMatrix};
use ndarray::{Array2, ArrayView1, ArrayViewMut2};
use thiserror::Error;

/// Right-hand side `f(t, u)` of an ordinary differential equation
/// `du/dt = f(t, u)`
///
/// Implementations must be pure: the same inputs always yield the same
/// derivative, and evaluating it has no side effect.
pub trait OdeSystem {
    /// Time derivative of the state `u` at time `t`
    fn derivative(&self, t: Precision, u: ArrayView1<Precision>) -> Field;
}
//
impl<F> OdeSystem for F
where
    F: Fn(Precision, ArrayView1<Precision>) -> Field,
{
    fn derivative(&self, t: Precision, u: ArrayView1<Precision>) -> Field {
        self(t, u)
    }
}

/// ODE integrator interface
pub trait Integrator {
    /// Integrate `system` from `u0` at `times[0]`, storing the state at each
    /// of `times` into the matching row of `solution`
    ///
    /// Row 0 receives a verbatim copy of `u0`. Rows are written in order as
    /// soon as the internal clock reaches them, and `on_row` is notified
    /// after each of them. If integration fails, the rows that were written
    /// before the failure hold valid results and later rows are left alone.
    ///
    /// # Panics
    ///
    /// If `solution` is not shaped `[times.len(), u0.len()]`.
    fn integrate_into<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        u0: ArrayView1<Precision>,
        times: ArrayView1<Precision>,
        solution: ArrayViewMut2<Precision>,
        on_row: impl FnMut(usize),
    ) -> Result<IntegrationStats, IntegrationError>;

    /// Like `integrate_into()`, but allocates the solution matrix
    fn integrate<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        u0: ArrayView1<Precision>,
        times: ArrayView1<Precision>,
    ) -> Result<SolutionMatrix, IntegrationError> {
        let mut solution = Array2::zeros((times.len(), u0.len()));
        self.integrate_into(system, u0, times, solution.view_mut(), |_| {})?;
        Ok(solution)
    }
}

/// Work performed by an integrator
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct IntegrationStats {
    /// Accepted internal steps
    pub steps: usize,

    /// Rejected internal steps
    pub rejected: usize,

    /// Right-hand side evaluations
    pub evaluations: usize,
}

/// Failure to integrate an ODE
#[derive(Clone, Debug, Error, PartialEq)]
pub enum IntegrationError {
    /// Integrator configuration makes no sense
    #[error("invalid integrator setting {name}={value}")]
    InvalidSetting {
        /// Name of the setting
        name: &'static str,
        /// Value it was given
        value: Precision,
    },

    /// There is no time instant to sample
    #[error("no time instant to sample")]
    NoTimeInstants,

    /// Time instants are not finite and strictly increasing
    #[error("time instant #{index} ({value}) is not finite or does not come after the previous one")]
    InvalidTimes {
        /// Position of the first offending time instant
        index: usize,
        /// Value of this time instant
        value: Precision,
    },

    /// The state contains NaN or infinite values
    #[error("state became non-finite at t={t}")]
    NonFinite {
        /// Time at which this was noticed
        t: Precision,
    },

    /// The state grew beyond all reasonable bounds
    #[error("solution diverged at t={t} (max |u| = {magnitude:e})")]
    Diverged {
        /// Time at which this was noticed
        t: Precision,
        /// Largest absolute state value
        magnitude: Precision,
    },

    /// The step budget ran out before reaching the last time instant
    #[error("gave up at t={t} after {steps} steps")]
    TooManySteps {
        /// Time that was reached
        t: Precision,
        /// Number of internal steps that were taken
        steps: usize,
    },

    /// The error tolerance can't be met with a representable step size
    #[error("step size {step:e} became too small at t={t}")]
    StepSizeUnderflow {
        /// Time that was reached
        t: Precision,
        /// Step size that was about to be attempted
        step: Precision,
    },
}

/// Check the integration problem and fill in the first row of the solution
fn begin(
    u0: ArrayView1<Precision>,
    times: ArrayView1<Precision>,
    solution: &mut ArrayViewMut2<Precision>,
    on_row: &mut impl FnMut(usize),
) -> Result<(), IntegrationError> {
    assert_eq!(
        solution.shape(),
        &[times.len(), u0.len()],
        "Solution matrix should have one row per time instant and one column per state variable"
    );

    let Some(&t0) = times.first() else {
        return Err(IntegrationError::NoTimeInstants);
    };
    if !t0.is_finite() {
        return Err(IntegrationError::InvalidTimes {
            index: 0,
            value: t0,
        });
    }
    let out_of_order = |i: &usize| !(times[*i].is_finite() && times[*i] > times[*i - 1]);
    if let Some(index) = (1..times.len()).find(out_of_order) {
        return Err(IntegrationError::InvalidTimes {
            index,
            value: times[index],
        });
    }
    check_finite(u0, t0)?;

    solution.row_mut(0).assign(&u0);
    on_row(0);
    Ok(())
}

/// Make sure that a state or derivative only contains finite values
fn check_finite(values: ArrayView1<Precision>, t: Precision) -> Result<(), IntegrationError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(IntegrationError::NonFinite { t })
    }
}

/// Largest absolute value of a state vector
fn max_norm(values: ArrayView1<Precision>) -> Precision {
    values.iter().fold(0.0, |acc, value| acc.max(value.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn decay(_t: Precision, u: ArrayView1<Precision>) -> Field {
        u.mapv(|u| -2.0 * u)
    }

    #[test]
    fn functions_are_systems() {
        let derivative = decay.derivative(0.0, array![1.0, -3.0].view());
        assert_eq!(derivative, array![-2.0, 6.0]);
    }

    #[test]
    fn problem_checks() {
        let u0 = array![1.0, 2.0];
        let mut solution = Array2::<Precision>::zeros((3, 2));
        let mut rows = Vec::new();
        begin(
            u0.view(),
            array![0.0, 0.5, 1.0].view(),
            &mut solution.view_mut(),
            &mut |row| rows.push(row),
        )
        .unwrap();
        assert_eq!(solution.row(0), u0);
        assert_eq!(rows, vec![0]);

        let result = begin(
            u0.view(),
            array![0.0, 0.5, 0.5].view(),
            &mut solution.view_mut(),
            &mut |_| {},
        );
        assert_eq!(
            result,
            Err(IntegrationError::InvalidTimes {
                index: 2,
                value: 0.5
            })
        );

        let mut empty = Array2::<Precision>::zeros((0, 2));
        let result = begin(
            u0.view(),
            ndarray::Array1::<Precision>::zeros(0).view(),
            &mut empty.view_mut(),
            &mut |_| {},
        );
        assert_eq!(result, Err(IntegrationError::NoTimeInstants));

        let result = begin(
            array![1.0, Precision::NAN].view(),
            array![0.0, 0.5, 1.0].view(),
            &mut solution.view_mut(),
            &mut |_| {},
        );
        assert_eq!(result, Err(IntegrationError::NonFinite { t: 0.0 }));
    }

    #[test]
    #[should_panic(expected = "one row per time instant")]
    fn misshapen_solution() {
        let mut solution = Array2::<Precision>::zeros((2, 3));
        let _ = begin(
            array![1.0, 2.0].view(),
            array![0.0, 1.0].view(),
            &mut solution.view_mut(),
            &mut |_| {},
        );
    }
}
