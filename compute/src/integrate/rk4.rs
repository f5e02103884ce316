//! Classic 4th order Runge-Kutta integration with a fixed step size

use super::{
    begin, check_finite, max_norm, IntegrationError, IntegrationStats, Integrator, OdeSystem,
};
use data::{Field, Precision};
use log::debug;
use ndarray::{ArrayView1, ArrayViewMut2};
use std::num::NonZeroUsize;

/// Fixed-step RK4 integrator
///
/// Each interval between two requested time instants is cut into the same
/// number of equal steps. There is no error control, so the step size must
/// be picked small enough for the problem to remain stable. Blow-ups are
/// detected and reported as [`IntegrationError::Diverged`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RungeKutta4 {
    /// Number of steps per interval between requested time instants
    pub substeps: NonZeroUsize,

    /// Growth of the state's max-norm, with respect to the initial state,
    /// beyond which the integration is considered to have diverged
    pub divergence_factor: Precision,
}
//
impl Default for RungeKutta4 {
    fn default() -> Self {
        Self {
            substeps: NonZeroUsize::MIN,
            divergence_factor: 1e6,
        }
    }
}
//
impl RungeKutta4 {
    /// Check that the integrator configuration makes sense
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if !(self.divergence_factor > 1.0) {
            return Err(IntegrationError::InvalidSetting {
                name: "divergence_factor",
                value: self.divergence_factor,
            });
        }
        Ok(())
    }

    /// Perform one step of size `h` from state `y` at time `t`
    fn step<S: OdeSystem + ?Sized>(
        system: &S,
        t: Precision,
        y: ArrayView1<Precision>,
        h: Precision,
    ) -> Field {
        let half = 0.5 * h;
        let k1 = system.derivative(t, y);
        let mut y2 = y.to_owned();
        y2.scaled_add(half, &k1);
        let k2 = system.derivative(t + half, y2.view());
        let mut y3 = y.to_owned();
        y3.scaled_add(half, &k2);
        let k3 = system.derivative(t + half, y3.view());
        let mut y4 = y.to_owned();
        y4.scaled_add(h, &k3);
        let k4 = system.derivative(t + h, y4.view());

        let mut result = y.to_owned();
        result.scaled_add(h / 6.0, &k1);
        result.scaled_add(h / 3.0, &k2);
        result.scaled_add(h / 3.0, &k3);
        result.scaled_add(h / 6.0, &k4);
        result
    }
}
//
impl Integrator for RungeKutta4 {
    fn integrate_into<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        u0: ArrayView1<Precision>,
        times: ArrayView1<Precision>,
        mut solution: ArrayViewMut2<Precision>,
        mut on_row: impl FnMut(usize),
    ) -> Result<IntegrationStats, IntegrationError> {
        self.validate()?;
        begin(u0, times, &mut solution, &mut on_row)?;
        let mut stats = IntegrationStats::default();
        let limit = self.divergence_factor * max_norm(u0).max(1.0);
        let substeps = self.substeps.get();

        let mut y = u0.to_owned();
        for (row, interval) in times.windows(2).into_iter().enumerate() {
            let (start, end) = (interval[0], interval[1]);
            let h = (end - start) / substeps as Precision;
            for substep in 0..substeps {
                let t = start + substep as Precision * h;
                y = Self::step(system, t, y.view(), h);
                stats.steps += 1;
                stats.evaluations += 4;

                let t_new = t + h;
                check_finite(y.view(), t_new)?;
                let magnitude = max_norm(y.view());
                if magnitude > limit {
                    return Err(IntegrationError::Diverged {
                        t: t_new,
                        magnitude,
                    });
                }
            }
            solution.row_mut(row + 1).assign(&y);
            on_row(row + 1);
        }

        debug!(
            "RK4 integration performed {} steps ({} RHS evaluations)",
            stats.steps, stats.evaluations
        );
        Ok(stats)
    }
}
