//! Report how much of the time each station has usable data.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use dbinterp::{
    availability::Availability,
    constants::{DEFAULT_GOOD_PERCENT, DEFAULT_WINDOW, STANDARD_STATIONS},
};

use super::load_observations;

#[derive(Args)]
pub struct AvailabilityArgs {
    /// Observations parquet file
    pub dataset: PathBuf,
    /// Minimum percentage of good samples
    #[arg(long, default_value_t = DEFAULT_GOOD_PERCENT)]
    pub percent: f64,
    /// Stations to report, defaults to the standard set
    #[arg(long, value_delimiter = ',')]
    pub stations: Vec<String>,
    /// Print the runs of good data for each station
    #[arg(long)]
    pub intervals: bool,
    /// Rolling-max window, in samples
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,
}

pub fn availability(args: &AvailabilityArgs) -> Result<()> {
    let dataset = load_observations(&args.dataset, args.window)?;

    let stations: Vec<String> = if args.stations.is_empty() {
        STANDARD_STATIONS.iter().map(|s| s.to_string()).collect()
    } else {
        args.stations.clone()
    };
    let availability = Availability::from_dataset(&dataset, &stations);

    for station in availability.stations() {
        let fraction = availability.fraction(station).unwrap_or(0.0);
        println!("{} -> {:06.2}%", station, fraction * 100.0);

        if args.intervals {
            for (start, width) in availability.intervals(station) {
                println!("    {} for {} minutes", start, width.num_minutes());
            }
        }
    }

    let good = availability.good_stations(args.percent);
    println!("Good stations (>= {}%): {}", args.percent, good.join(", "));

    Ok(())
}
