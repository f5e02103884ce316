//! This crate collects the user-facing elements of the heat equation solver:
//! command-line arguments, logging setup, status and progress reporting, and
//! visualization of the results.

#[cfg(feature = "visualization")]
pub mod render;

#[cfg(feature = "simulation")]
use clap::Args;
#[cfg(feature = "visualization")]
use colorous::Gradient;
#[cfg(feature = "simulation")]
use compute::IntegratorArgs;
#[cfg(feature = "simulation")]
use data::parameters::Parameters;
use data::Precision;
#[cfg(feature = "tui")]
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressFinish, ProgressStyle};
#[cfg(feature = "tui")]
use log::{info, warn, LevelFilter};
use std::io::{self, Write};
#[cfg(feature = "tui")]
use std::{borrow::Cow, time::Duration};

/// CLI arguments describing the physical problem and how it is integrated
#[cfg(feature = "simulation")]
#[derive(Args, Clone, Debug, Default)]
pub struct SharedArgs {
    /// Heat diffusivity
    #[arg(short = 'D', long)]
    pub diffusivity: Option<Precision>,

    /// Simulated time span
    #[arg(short, long)]
    pub time: Option<Precision>,

    /// Length of the simulated rod
    #[arg(short, long)]
    pub xsize: Option<Precision>,

    /// Spacing between grid points
    #[arg(long)]
    pub dx: Option<Precision>,

    /// Spacing between output time instants
    #[arg(long)]
    pub dt: Option<Precision>,

    /// Peak temperature of the initial heat source
    #[arg(long)]
    pub temp_src: Option<Precision>,

    /// Ambient temperature
    #[arg(long)]
    pub temp_amb: Option<Precision>,

    /// Time integrator configuration
    #[command(flatten)]
    pub integrator: IntegratorArgs,
}
//
#[cfg(feature = "simulation")]
impl SharedArgs {
    /// Physical parameters, with defaults that clap can't handle filled in
    pub fn parameters(&self) -> Parameters {
        let defaults = Parameters::default();
        Parameters {
            diffusivity: self.diffusivity.unwrap_or(defaults.diffusivity),
            time: self.time.unwrap_or(defaults.time),
            xsize: self.xsize.unwrap_or(defaults.xsize),
            dx: self.dx.unwrap_or(defaults.dx),
            dt: self.dt.unwrap_or(defaults.dt),
            temp_src: self.temp_src.unwrap_or(defaults.temp_src),
            temp_amb: self.temp_amb.unwrap_or(defaults.temp_amb),
        }
    }
}

/// Send logs to syslog, or to stderr if no syslog daemon can be reached
#[cfg(feature = "tui")]
pub fn init_logging() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = syslog::init(syslog::Facility::default(), level, None) {
        // A logger may already be installed, in which case we keep it
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .try_init();
        warn!("Could not log to syslog ({e}), logging to stderr instead");
    }
}

/// Write the run's discretization summary to `out`
pub fn write_status(
    out: &mut impl Write,
    num_times: usize,
    num_points: usize,
    dt: Precision,
) -> io::Result<()> {
    writeln!(out, "Number of time steps: {num_times}")?;
    writeln!(out, "Number of points: {num_points}")?;
    writeln!(out, "Time step: {dt:.3e}")
}

/// Tell the user about the run's discretization, unless `silent` is set
#[cfg(feature = "tui")]
pub fn report_status(
    num_times: usize,
    num_points: usize,
    dt: Precision,
    silent: bool,
) -> io::Result<()> {
    info!("Running with {num_times} time instants, {num_points} points, dt = {dt:e}");
    if !silent {
        write_status(&mut io::stdout().lock(), num_times, num_points, dt)?;
    }
    Ok(())
}

/// Progress bar over `len` items, hidden if `silent` is set
#[cfg(feature = "tui")]
pub fn init_progress_reporting(
    message: impl Into<Cow<'static, str>>,
    len: usize,
    silent: bool,
) -> ProgressBar {
    let progress = ProgressBar::new(len as u64)
        .with_message(message)
        .with_style(
            ProgressStyle::with_template("{msg} {pos}/{len} {wide_bar} {elapsed}/~{duration}")
                .expect("Failed to parse style"),
        )
        .with_finish(ProgressFinish::AndClear);
    if silent {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        progress.enable_steady_tick(Duration::from_millis(100));
    }
    progress
}

/// Color gradient of the heat map visualization
#[cfg(feature = "visualization")]
pub const GRADIENT: Gradient = colorous::INFERNO;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        let mut out = Vec::new();
        write_status(&mut out, 30, 100, 1e-2).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Number of time steps: 30\nNumber of points: 100\nTime step: 1.000e-2\n"
        );
    }

    #[cfg(feature = "simulation")]
    mod args {
        use super::super::*;
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            shared: SharedArgs,
        }

        #[test]
        fn defaults() {
            let cli = Cli::try_parse_from(["test"]).unwrap();
            assert_eq!(cli.shared.parameters(), Parameters::default());
        }

        #[test]
        fn overrides() {
            let cli =
                Cli::try_parse_from(["test", "-D", "2.5", "--dx", "0.05", "--temp-amb", "280"])
                    .unwrap();
            let params = cli.shared.parameters();
            assert_eq!(params.diffusivity, 2.5);
            assert_eq!(params.dx, 0.05);
            assert_eq!(params.temp_amb, 280.0);
            assert_eq!(params.time, Parameters::default().time);
        }
    }
}
