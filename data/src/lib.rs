//! Data format used by the spectral heat equation simulation

pub mod grid;
#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod parameters;

pub use grid::{initiate, Grid, Initial, TimeSequence};

/// Computation precision
///
/// Spectral differentiation scales roundoff error by the squared wavenumber,
/// so single precision is not an option here.
pub type Precision = f64;

/// Temperature at every point of the spatial grid
pub type Field = ndarray::Array1<Precision>;

/// Temperature field at every requested time instant (one row per instant)
pub type SolutionMatrix = ndarray::Array2<Precision>;
