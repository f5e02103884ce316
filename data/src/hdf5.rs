//! Moving solution matrices to and from HDF5 files
//!
//! A file holds three datasets: the grid coordinates, the time instants, and
//! the temperature field at each instant (one row per instant).

use crate::{grid::TimeSequence, Grid, Precision, SolutionMatrix};
use hdf5::{Dataset, File};
use ndarray::{Array1, ArrayView1};
use std::path::Path;

pub use hdf5::Result;

/// Name of the dataset that holds grid coordinates
const COORDS_DATASET: &str = "x";

/// Name of the dataset that holds time instants
const TIMES_DATASET: &str = "t";

/// Common configuration for reading and writing to HDF5 files
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config<'dsname, FileName: AsRef<Path>> {
    /// Name of the HDF5 file to be accessed
    pub file_name: FileName,

    /// Name of the temperature dataset within the file
    pub dataset_name: Option<&'dsname str>,
}
//
impl<FileName: AsRef<Path>> Config<'_, FileName> {
    fn dataset_name(&self) -> &str {
        self.dataset_name.unwrap_or("temperature")
    }
}

/// Mechanism to write a solution into an HDF5 file, one row at a time
pub struct Writer {
    /// File handle
    file: File,

    /// Temperature dataset
    dataset: Dataset,

    /// Number of rows that were written so far
    position: usize,
}
//
impl Writer {
    /// Create or truncate a file
    ///
    /// The grid and time instants are written right away, and the file is
    /// dimensioned to receive one temperature field per time instant.
    pub fn create(
        config: Config<'_, impl AsRef<Path>>,
        grid: &Grid,
        times: &TimeSequence,
    ) -> Result<Self> {
        let file = File::create(config.file_name.as_ref())?;
        file.new_dataset_builder()
            .with_data(grid.coords())
            .create(COORDS_DATASET)?;
        file.new_dataset_builder()
            .with_data(times.instants())
            .create(TIMES_DATASET)?;
        let dataset = file
            .new_dataset::<Precision>()
            .chunk([1, grid.len()])
            .shape([times.len(), grid.len()])
            .create(config.dataset_name())?;
        Ok(Self {
            file,
            dataset,
            position: 0,
        })
    }

    /// Write the temperature field at the next time instant
    pub fn write(&mut self, row: ArrayView1<Precision>) -> Result<()> {
        self.dataset.write_slice(row, (self.position, ..))?;
        self.position += 1;
        Ok(())
    }

    /// Write all rows of a solution matrix
    pub fn write_all(&mut self, solution: &SolutionMatrix) -> Result<()> {
        for row in solution.rows() {
            self.write(row)?;
        }
        Ok(())
    }

    /// Flush the file to the underlying storage medium and close it
    ///
    /// This should automatically happen on Drop, but doing it manually allows
    /// you to catch and handle errors, instead of letting them lead to panics.
    pub fn close(self) -> Result<()> {
        self.file.close()
    }
}

/// Solution that was read back from an HDF5 file
#[derive(Clone, Debug, PartialEq)]
pub struct Stored {
    /// Grid coordinates
    pub coords: Array1<Precision>,

    /// Time instants
    pub times: Array1<Precision>,

    /// Temperature at each time instant and grid point
    pub temperature: SolutionMatrix,
}

/// Read back a solution that was stored by [`Writer`]
pub fn read(config: Config<'_, impl AsRef<Path>>) -> Result<Stored> {
    let file = File::open(config.file_name.as_ref())?;
    let coords = file.dataset(COORDS_DATASET)?.read_1d::<Precision>()?;
    let times = file.dataset(TIMES_DATASET)?.read_1d::<Precision>()?;
    let temperature = file
        .dataset(config.dataset_name())?
        .read_2d::<Precision>()?;
    Ok(Stored {
        coords,
        times,
        temperature,
    })
}
