//! Interpolate observations at one place and time.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use clap::Args;

use dbinterp::{catalog::normalize_longitude, constants::DEFAULT_WINDOW, Interpolator};

use super::load_observations;

#[derive(Args)]
pub struct QueryArgs {
    /// Observations parquet file
    pub dataset: PathBuf,
    /// Time to interpolate at, e.g. 2008-03-01T12:00:00
    #[arg(long)]
    pub time: NaiveDateTime,
    /// Geographic longitude, degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
    /// Geographic latitude, degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Fail instead of returning NaN
    #[arg(long)]
    pub strict: bool,
    /// Round the time down to the nearest observation
    #[arg(long)]
    pub snap: bool,
    /// Rolling-max window, in samples
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,
}

pub fn query(args: &QueryArgs) -> Result<()> {
    let dataset = load_observations(&args.dataset, args.window)?;
    let interp = Interpolator::new(dataset);

    let time = if args.snap {
        interp
            .snap(args.time)
            .ok_or_else(|| anyhow!("Time {} precedes the first observation", args.time))?
    } else {
        args.time
    };

    let e = interp.evaluate(time, normalize_longitude(args.lon), args.lat, args.strict)?;
    println!("Time\tInst. B\tHourly Max B");
    println!("{}\t{:012.7}\t{:012.7}", time, e.instantaneous, e.rolling_max);

    Ok(())
}
