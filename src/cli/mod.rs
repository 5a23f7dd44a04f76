//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Result};
use clap::{command, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use command::{AvailabilityArgs, DistributionArgs, GenerateArgs, QueryArgs};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interpolate observations to every catalog station
    Generate(GenerateArgs),
    /// Interpolate observations at one place and time
    Query(QueryArgs),
    /// Report station data availability
    Availability(AvailabilityArgs),
    /// Save histograms of all observed values
    Distribution(DistributionArgs),
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

/// The requested output path, or `name` in the home directory.
pub fn output_path(requested: Option<&PathBuf>, name: &str) -> Result<PathBuf> {
    match requested {
        Some(path) => Ok(path.clone()),
        None => dirs::home_dir()
            .map(|home| home.join(name))
            .ok_or_else(|| anyhow!("Could not find the home directory")),
    }
}
