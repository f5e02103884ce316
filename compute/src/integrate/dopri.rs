//! Adaptive explicit Runge-Kutta integration (Dormand-Prince 5(4))
//!
//! Steps are accepted or rejected based on the difference between embedded
//! 5th and 4th order solutions, and the step size is adjusted after each
//! attempt so that this difference stays within tolerance. The last stage of
//! an accepted step is the first stage of the next one.
//!
//! Requested time instants that fall inside an accepted step are filled in
//! using the method's 4th order continuous extension.

use super::{begin, check_finite, IntegrationError, IntegrationStats, Integrator, OdeSystem};
use data::{Field, Precision};
use log::{debug, trace};
use ndarray::{ArrayView1, ArrayViewMut2, Zip};

/// Error tolerance of the adaptive integrator
///
/// Each state variable `y` gets a local error budget of
/// `absolute + relative · |y|`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    /// Relative error tolerance
    pub relative: Precision,

    /// Absolute error tolerance
    pub absolute: Precision,
}
//
impl Default for Tolerance {
    fn default() -> Self {
        // Defaults of the LSODA-based odeint solver
        Self {
            relative: 1.49012e-8,
            absolute: 1.49012e-8,
        }
    }
}

/// Dormand-Prince 5(4) integrator with automatic step size control
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DormandPrince {
    /// Local error tolerance
    pub tolerance: Tolerance,

    /// Maximal number of accepted internal steps over the whole integration
    pub max_steps: usize,

    /// Upper bound on the internal step size, if any
    pub max_step: Option<Precision>,

    /// Size of the first internal step, estimated automatically by default
    pub first_step: Option<Precision>,
}
//
impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            max_steps: 500_000,
            max_step: None,
            first_step: None,
        }
    }
}
//
impl DormandPrince {
    /// Check that the integrator configuration makes sense
    pub fn validate(&self) -> Result<(), IntegrationError> {
        let Tolerance { relative, absolute } = self.tolerance;
        for (name, value) in [("rtol", relative), ("atol", absolute)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(IntegrationError::InvalidSetting { name, value });
            }
        }
        if relative == 0.0 && absolute == 0.0 {
            return Err(IntegrationError::InvalidSetting {
                name: "rtol",
                value: relative,
            });
        }
        for (name, value) in [("max_step", self.max_step), ("first_step", self.first_step)] {
            if let Some(value) = value.filter(|&step| !(step.is_finite() && step > 0.0)) {
                return Err(IntegrationError::InvalidSetting { name, value });
            }
        }
        Ok(())
    }

    /// Largest allowed step size
    fn step_limit(&self) -> Precision {
        self.max_step.unwrap_or(Precision::INFINITY)
    }

    /// Weighted RMS norm of `values`, where each variable is weighted by the
    /// error budget associated with the largest of `y_old` and `y_new`
    fn error_norm(
        &self,
        values: ArrayView1<Precision>,
        y_old: ArrayView1<Precision>,
        y_new: ArrayView1<Precision>,
    ) -> Precision {
        let Tolerance { relative, absolute } = self.tolerance;
        let sum_squares = Zip::from(values)
            .and(y_old)
            .and(y_new)
            .fold(0.0, |acc, &value, &old, &new| {
                let scale = absolute + relative * old.abs().max(new.abs());
                let ratio = value / scale;
                acc + ratio * ratio
            });
        (sum_squares / values.len().max(1) as Precision).sqrt()
    }

    /// Pick an initial step size for a problem whose solution should look
    /// like `y0` and `f0` at `t0`
    ///
    /// Follows the heuristic of Hairer, Nørsett & Wanner, which estimates the
    /// step size at which first and second derivatives start to matter.
    fn initial_step<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        t0: Precision,
        y0: ArrayView1<Precision>,
        f0: ArrayView1<Precision>,
        stats: &mut IntegrationStats,
    ) -> Precision {
        const ORDER: i32 = 5;
        let d0 = self.error_norm(y0, y0, y0);
        let d1 = self.error_norm(f0, y0, y0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(self.step_limit());

        // Explicit Euler step to estimate the second derivative
        let mut y1 = y0.to_owned();
        y1.scaled_add(h0, &f0);
        let f1 = system.derivative(t0 + h0, y1.view());
        stats.evaluations += 1;
        let d2 = self.error_norm((&f1 - &f0).view(), y0, y0) / h0;

        let max_d = d1.max(d2);
        let h1 = if max_d <= 1e-15 || !max_d.is_finite() {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / max_d).powf(1.0 / ORDER as Precision)
        };
        (100.0 * h0).min(h1).min(self.step_limit())
    }
}
//
impl Integrator for DormandPrince {
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
        let num_times = times.len();
        let t_end = times[num_times - 1];

        // Set up the internal clock
        let mut t = times[0];
        let mut y = u0.to_owned();
        let mut f = system.derivative(t, y.view());
        stats.evaluations += 1;
        check_finite(f.view(), t)?;
        let mut h = match self.first_step {
            Some(h) => h,
            None => self.initial_step(system, t, y.view(), f.view(), &mut stats),
        };
        let mut just_rejected = false;

        // Step until all requested time instants have been sampled
        let mut next_row = 1;
        while next_row < num_times {
            if stats.steps >= self.max_steps {
                return Err(IntegrationError::TooManySteps {
                    t,
                    steps: stats.steps,
                });
            }
            if h <= 16.0 * Precision::EPSILON * t.abs() || h < Precision::MIN_POSITIVE {
                return Err(IntegrationError::StepSizeUnderflow { t, step: h });
            }

            // Don't step past the last requested time instant
            let (h_step, t_new) = if t + h >= t_end {
                (t_end - t, t_end)
            } else {
                (h, t + h)
            };
            let step = Step::attempt(system, t, y.view(), f.view(), h_step);
            stats.evaluations += 6;
            let error = self.error_norm(step.error.view(), y.view(), step.y_new.view());

            // Reject inaccurate or non-finite steps
            let finite = step.y_new.iter().all(|value| value.is_finite())
                && step.f_new.iter().all(|value| value.is_finite());
            if !(finite && error <= 1.0) {
                stats.rejected += 1;
                let factor = if error.is_finite() {
                    (SAFETY * error.powf(-1.0 / 5.0)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                trace!("Rejected step of size {h_step:e} at t={t} (error norm {error:e})");
                h = h_step * factor;
                just_rejected = true;
                continue;
            }

            // Sample the requested time instants that this step went through
            while next_row < num_times && times[next_row] <= t_new {
                let t_out = times[next_row];
                let mut row = solution.row_mut(next_row);
                if t_out == t_new {
                    row.assign(&step.y_new);
                } else {
                    let theta = (t_out - t) / h_step;
                    row.assign(&step.interpolate(y.view(), f.view(), h_step, theta));
                }
                on_row(next_row);
                next_row += 1;
            }

            // Move the internal clock forward and pick the next step size
            let factor = if error == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * error.powf(-1.0 / 5.0)).clamp(MIN_FACTOR, MAX_FACTOR)
            };
            let factor = if just_rejected {
                factor.min(1.0)
            } else {
                factor
            };
            just_rejected = false;
            stats.steps += 1;
            t = t_new;
            h = (h_step * factor).min(self.step_limit());
            let Step { y_new, f_new, .. } = step;
            y = y_new;
            f = f_new;
        }

        debug!(
            "Dormand-Prince integration reached t={t} after {} steps ({} rejected, {} RHS evaluations)",
            stats.steps, stats.rejected, stats.evaluations
        );
        Ok(stats)
    }
}

/// Safety factor applied to the optimal step size estimate
const SAFETY: Precision = 0.9;

/// Largest step size reduction factor
const MIN_FACTOR: Precision = 0.2;

/// Largest step size increase factor
const MAX_FACTOR: Precision = 10.0;

/// Runge-Kutta nodes
const C: [Precision; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

/// Runge-Kutta matrix, row `i` gives the weights of stages `0..i` in stage `i`
///
/// The last row holds the 5th order solution weights.
const A: [&[Precision]; 7] = [
    &[],
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
    ],
    &[
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
    &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// Difference between the 5th and 4th order solution weights
const E: [Precision; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Stage weights of the continuous extension
const D: [Precision; 7] = [
    -12715105075.0 / 11282082432.0,
    0.0,
    87487479700.0 / 32700410799.0,
    -10690763975.0 / 1880347072.0,
    701980252875.0 / 199316789632.0,
    -1453857185.0 / 822651844.0,
    69997945.0 / 29380423.0,
];

/// Outcome of an attempted step
struct Step {
    /// Stage derivatives
    stages: [Field; 7],

    /// 5th order solution at the end of the step
    y_new: Field,

    /// Derivative at the end of the step (last stage)
    f_new: Field,

    /// Local error estimate
    error: Field,
}
//
impl Step {
    /// Attempt a step of size `h` from state `y` with derivative `f` at `t`
    fn attempt<S: OdeSystem + ?Sized>(
        system: &S,
        t: Precision,
        y: ArrayView1<Precision>,
        f: ArrayView1<Precision>,
        h: Precision,
    ) -> Self {
        let mut stages: [Field; 7] = Default::default();
        stages[0] = f.to_owned();
        for stage in 1..7 {
            let y_stage = combine(y, h, A[stage], &stages);
            stages[stage] = system.derivative(t + C[stage] * h, y_stage.view());
        }
        let y_new = combine(y, h, A[6], &stages);
        let error = combine(Field::zeros(y.len()).view(), h, &E, &stages);
        let f_new = stages[6].clone();
        Self {
            stages,
            y_new,
            f_new,
            error,
        }
    }

    /// State at `t + theta·h` according to the continuous extension
    fn interpolate(
        &self,
        y: ArrayView1<Precision>,
        f: ArrayView1<Precision>,
        h: Precision,
        theta: Precision,
    ) -> Field {
        let theta1 = 1.0 - theta;
        let y_diff = &self.y_new - &y;
        let mut bspl = f.to_owned() * h;
        bspl -= &y_diff;
        let mut tail = y_diff.clone();
        tail.scaled_add(-h, &self.f_new);
        tail -= &bspl;
        let dense = combine(Field::zeros(y.len()).view(), h, &D, &self.stages);

        // y + θ·(Δy + θ₁·(bspl + θ·(tail + θ₁·dense)))
        let mut result = dense * theta1 + tail;
        result *= theta;
        result += &bspl;
        result *= theta1;
        result += &y_diff;
        result *= theta;
        result += &y;
        result
    }
}

/// Compute `base + h·Σ weights[i]·stages[i]`
fn combine(
    base: ArrayView1<Precision>,
    h: Precision,
    weights: &[Precision],
    stages: &[Field],
) -> Field {
    let mut result = base.to_owned();
    for (&weight, stage) in weights.iter().zip(stages) {
        if weight != 0.0 {
            result.scaled_add(h * weight, stage);
        }
    }
    result
}
