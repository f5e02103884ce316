use clap::Parser;
#[cfg(feature = "hdf5")]
use data::hdf5::{self, Writer};
use eyre::Result;
use log::info;
use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::PathBuf,
};
use ui::{render::Style, SharedArgs};

/// Simulate heat diffusion along a rod heated in its middle
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Physical problem and time integration
    #[command(flatten)]
    shared: SharedArgs,

    /// Path to the heat map image
    #[arg(short, long, default_value = "heat.png")]
    output: PathBuf,

    /// Number of temperature levels in the heat map
    #[arg(long, default_value_t = Style::default().levels)]
    levels: NonZeroUsize,

    /// Number of pixels per grid point and time instant in the heat map
    #[arg(long, default_value_t = Style::default().pixel_scale)]
    pixel_scale: NonZeroU32,

    /// Path to an HDF5 file where the raw solution should be saved
    #[cfg(feature = "hdf5")]
    #[arg(long)]
    hdf5: Option<PathBuf>,

    /// Do not print the run summary and progress
    #[arg(short, long)]
    silent: bool,
}

fn main() -> Result<()> {
    // Enable logging to syslog
    ui::init_logging();

    // Parse CLI arguments and handle clap-incompatible defaults
    let args = Args::parse();
    let params = args.shared.parameters();
    let integrator = args.shared.integrator.integrator();

    // Reject invalid parameters before doing any work
    params.validate()?;
    ui::report_status(
        params.num_times(),
        params.num_points(),
        params.dt,
        args.silent,
    )?;

    // Run the simulation
    let progress =
        ui::init_progress_reporting("Computing time instant", params.num_times(), args.silent);
    let solution = compute::solve_with_progress(&params, &integrator, |_| progress.inc(1))?;
    progress.finish();
    info!(
        "Integration took {} steps ({} rejected, {} RHS evaluations)",
        solution.stats.steps, solution.stats.rejected, solution.stats.evaluations
    );

    // Save the results
    ui::render::save_heat_map(
        solution.temperature.view(),
        Style {
            levels: args.levels,
            pixel_scale: args.pixel_scale,
        },
        &args.output,
    )?;
    #[cfg(feature = "hdf5")]
    if let Some(file_name) = args.hdf5 {
        let mut writer = Writer::create(
            hdf5::Config {
                file_name,
                ..Default::default()
            },
            &solution.grid,
            &solution.times,
        )?;
        writer.write_all(&solution.temperature)?;
        writer.close()?;
    }
    Ok(())
}
