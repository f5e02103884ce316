//! Spatial grid, output time instants and initial condition

use crate::{
    parameters::{ConfigError, Parameters},
    Field, Precision,
};
use log::debug;
use ndarray::{Array1, ArrayView1};

/// Uniform spatial grid centered on zero, covering `[-xsize/2, xsize/2)`
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    /// Position of each grid point
    coords: Array1<Precision>,

    /// Spacing between consecutive grid points
    dx: Precision,
}
//
impl Grid {
    /// Set up a grid of `num_points` points spaced by `dx`, starting at
    /// `-xsize/2`
    pub fn centered(xsize: Precision, dx: Precision, num_points: usize) -> Self {
        let start = -0.5 * xsize;
        let coords = Array1::from_shape_fn(num_points, |i| start + i as Precision * dx);
        Self { coords, dx }
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Truth that the grid has no point
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Spacing between grid points
    pub fn dx(&self) -> Precision {
        self.dx
    }

    /// Positions of the grid points
    pub fn coords(&self) -> ArrayView1<'_, Precision> {
        self.coords.view()
    }
}

/// Time instants at which the temperature field is sampled
///
/// Starts at 0, strictly increasing.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSequence(Array1<Precision>);
//
impl TimeSequence {
    /// `count` evenly spaced instants from 0 to `end` included
    ///
    /// A single instant is just 0.
    pub fn linspace(end: Precision, count: usize) -> Self {
        Self(Array1::linspace(0.0, end, count))
    }

    /// Number of time instants
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that there is no time instant
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Access the time instants
    pub fn instants(&self) -> ArrayView1<'_, Precision> {
        self.0.view()
    }
}

/// Everything that a run starts from
#[derive(Clone, Debug, PartialEq)]
pub struct Initial {
    /// Spatial grid
    pub grid: Grid,

    /// Output time instants
    pub times: TimeSequence,

    /// Temperature field at t = 0
    pub u0: Field,
}

/// Set up the grid, the time instants and the Gaussian initial temperature
/// profile described by `params`
pub fn initiate(params: &Parameters) -> Result<Initial, ConfigError> {
    params.validate()?;
    let grid = Grid::centered(params.xsize, params.dx, params.num_points());
    let times = TimeSequence::linspace(params.time, params.num_times());
    let u0 = gaussian(&grid, params);
    debug!(
        "Initialized {} grid points and {} time instants",
        grid.len(),
        times.len()
    );
    Ok(Initial { grid, times, u0 })
}

/// Sharpness of the Gaussian initial profile, `c` in `exp(-c·x²)`
pub fn gaussian_sharpness(xsize: Precision) -> Precision {
    2.0 / xsize
}

/// Gaussian temperature profile peaking at `temp_src` in the middle of the
/// domain and decaying towards `temp_amb`
pub fn gaussian(grid: &Grid, params: &Parameters) -> Field {
    let sharpness = gaussian_sharpness(params.xsize);
    let amplitude = params.temp_src - params.temp_amb;
    grid.coords()
        .mapv(|x| amplitude * (-sharpness * x * x).exp() + params.temp_amb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    fn init_logger() {
        static INIT_LOGGER: Once = Once::new();
        INIT_LOGGER.call_once(env_logger::init);
    }

    #[test]
    fn default_run() {
        init_logger();
        let Initial { grid, times, u0 } = initiate(&Parameters::default()).unwrap();

        assert_eq!(grid.len(), 100);
        assert_eq!(times.len(), 30);
        assert_eq!(u0.len(), 100);

        let coords = grid.coords();
        assert_eq!(coords[0], -5.0);
        assert!((coords[99] - 4.9).abs() < 1e-12);
        assert!(coords[99] < 5.0);
        assert!(coords.windows(2).into_iter().all(|w| w[1] > w[0]));

        let instants = times.instants();
        assert_eq!(instants[0], 0.0);
        assert!((instants[29] - 0.3).abs() < 1e-12);
        assert!(instants.windows(2).into_iter().all(|w| w[1] > w[0]));
    }

    #[test]
    fn gaussian_profile() {
        init_logger();
        let params = Parameters::default();
        let Initial { grid, u0, .. } = initiate(&params).unwrap();

        // Grid point 50 sits at x = 0, where the source temperature is reached
        assert!(grid.coords()[50].abs() < 1e-12);
        assert!((u0[50] - params.temp_src).abs() < 1e-9);

        // Temperature decays towards ambient away from the center
        assert!(u0.iter().all(|&u| u > params.temp_amb && u <= params.temp_src + 1e-9));
        assert!(u0[0] < u0[25] && u0[25] < u0[50]);
        let expected_edge = 77.0 * (-2.0 / 10.0 * 25.0f64).exp() + 296.0;
        assert!((u0[0] - expected_edge).abs() < 1e-9);
    }

    #[test]
    fn single_time_instant() {
        let times = TimeSequence::linspace(0.3, 1);
        assert_eq!(times.instants().to_vec(), vec![0.0]);
    }

    #[test]
    fn invalid_parameters_are_reported() {
        init_logger();
        let params = Parameters {
            dx: -0.1,
            ..Default::default()
        };
        assert!(initiate(&params).is_err());
    }
}
