//! Physical parameters of a heat equation run

use crate::Precision;
use thiserror::Error;

/// Physical parameters
///
/// These are fixed for the whole duration of a run. Use
/// [`Parameters::validate()`] before handing them to the numerical core.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Heat diffusivity (23 mm²/s for iron)
    pub diffusivity: Precision,

    /// Simulated time interval (s)
    pub time: Precision,

    /// Length of the simulated domain (mm)
    pub xsize: Precision,

    /// Spacing between grid points (mm)
    pub dx: Precision,

    /// Nominal spacing between output time instants (s)
    ///
    /// Only the number of instants is derived from it, see
    /// [`Parameters::num_times()`].
    pub dt: Precision,

    /// Temperature at the hottest point of the initial condition (K)
    pub temp_src: Precision,

    /// Temperature far away from the source in the initial condition (K)
    pub temp_amb: Precision,
}
//
impl Default for Parameters {
    fn default() -> Self {
        Self {
            diffusivity: 23.0,
            time: 0.3,
            xsize: 10.0,
            dx: 0.1,
            dt: 1.0e-2,
            temp_src: 373.0,
            temp_amb: 296.0,
        }
    }
}
//
impl Parameters {
    /// Check that these parameters describe a run that can be set up
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("diffusivity", self.diffusivity),
            ("time", self.time),
            ("xsize", self.xsize),
            ("dx", self.dx),
            ("dt", self.dt),
            ("temp_src", self.temp_src),
            ("temp_amb", self.temp_amb),
        ];
        if let Some(&(name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NonFinite { name, value });
        }

        let positive = [
            ("xsize", self.xsize),
            ("dx", self.dx),
            ("time", self.time),
            ("dt", self.dt),
        ];
        if let Some(&(name, value)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(ConfigError::NonPositive { name, value });
        }

        // Zero diffusivity is a legitimate (if boring) run, negative is not
        if self.diffusivity < 0.0 {
            return Err(ConfigError::NegativeDiffusivity(self.diffusivity));
        }

        let points = self.num_points();
        if points < 2 {
            return Err(ConfigError::TooFewPoints {
                xsize: self.xsize,
                dx: self.dx,
                points,
            });
        }
        if self.num_times() == 0 {
            return Err(ConfigError::NoTimeInstants {
                time: self.time,
                dt: self.dt,
            });
        }
        Ok(())
    }

    /// Number of points of the spatial grid, `ceil(xsize / dx)`
    ///
    /// Ratios that land within a few ulps of an integer are snapped to it, so
    /// that e.g. 10 / 0.1 yields 100 points and not 101.
    pub fn num_points(&self) -> usize {
        let ratio = self.xsize / self.dx;
        if !ratio.is_finite() || ratio <= 0.0 {
            return 0;
        }
        let nearest = ratio.round();
        let snapped = if (ratio - nearest).abs() <= 4.0 * Precision::EPSILON * nearest {
            nearest
        } else {
            ratio.ceil()
        };
        snapped as usize
    }

    /// Number of output time instants, `round(time / dt)`
    ///
    /// Ties are rounded to even.
    pub fn num_times(&self) -> usize {
        let ratio = (self.time / self.dt).round_ties_even();
        if ratio.is_finite() && ratio > 0.0 {
            ratio as usize
        } else {
            0
        }
    }
}

/// Invalid simulation parameters
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A parameter is NaN or infinite
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Name of the parameter
        name: &'static str,
        /// Value it was given
        value: Precision,
    },

    /// A length or duration is zero or negative
    #[error("{name} must be positive, got {value}")]
    NonPositive {
        /// Name of the parameter
        name: &'static str,
        /// Value it was given
        value: Precision,
    },

    /// Diffusion can't run backwards in time
    #[error("diffusivity must not be negative, got {0}")]
    NegativeDiffusivity(Precision),

    /// The spatial grid would be degenerate
    #[error("xsize={xsize} and dx={dx} yield {points} grid point(s), need at least 2")]
    TooFewPoints {
        /// Domain length
        xsize: Precision,
        /// Grid spacing
        dx: Precision,
        /// Resulting number of points
        points: usize,
    },

    /// round(time / dt) is zero
    #[error("time={time} and dt={dt} yield no output time instant")]
    NoTimeInstants {
        /// Simulated time interval
        time: Precision,
        /// Nominal output time step
        dt: Precision,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = Parameters::default();
        assert_eq!(params.validate(), Ok(()));
        assert_eq!(params.num_points(), 100);
        assert_eq!(params.num_times(), 30);
    }

    #[test]
    fn non_positive_lengths_and_durations() {
        for (name, params) in [
            ("dx", Parameters { dx: 0.0, ..Default::default() }),
            ("xsize", Parameters { xsize: -1.0, ..Default::default() }),
            ("time", Parameters { time: 0.0, ..Default::default() }),
            ("dt", Parameters { dt: -1e-2, ..Default::default() }),
        ] {
            match params.validate() {
                Err(ConfigError::NonPositive { name: reported, .. }) => assert_eq!(reported, name),
                other => panic!("Expected {name} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_finite_parameters() {
        let params = Parameters {
            temp_src: Precision::NAN,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonFinite { name: "temp_src", .. })
        ));
    }

    #[test]
    fn diffusivity_sign() {
        let zero = Parameters {
            diffusivity: 0.0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Ok(()));

        let negative = Parameters {
            diffusivity: -1.0,
            ..Default::default()
        };
        assert_eq!(
            negative.validate(),
            Err(ConfigError::NegativeDiffusivity(-1.0))
        );
    }

    #[test]
    fn degenerate_discretizations() {
        let coarse = Parameters {
            dx: 20.0,
            ..Default::default()
        };
        assert!(matches!(
            coarse.validate(),
            Err(ConfigError::TooFewPoints { points: 1, .. })
        ));

        let short = Parameters {
            time: 0.004,
            ..Default::default()
        };
        assert!(matches!(
            short.validate(),
            Err(ConfigError::NoTimeInstants { .. })
        ));
    }

    #[test]
    fn point_count_rounding() {
        let exact = Parameters {
            xsize: 1.0,
            dx: 0.25,
            ..Default::default()
        };
        assert_eq!(exact.num_points(), 4);

        let partial = Parameters {
            xsize: 1.0,
            dx: 0.3,
            ..Default::default()
        };
        assert_eq!(partial.num_points(), 4);

        let inexact = Parameters {
            xsize: 0.7,
            dx: 0.1,
            ..Default::default()
        };
        assert_eq!(inexact.num_points(), 7);
    }
}
