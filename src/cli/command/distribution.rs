//! Save histograms of every observed value, optionally beside the interpolated ones.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Args;
use tracing::info;

use dbinterp::{
    constants::{DEFAULT_WINDOW, HISTOGRAM_MAX, HISTOGRAM_MIN, HISTOGRAM_WIDTH},
    distribution::{histogram, Bin, Distributions},
    parquet::load_result_distributions,
};

use super::load_observations;
use crate::cli::output_path;

#[derive(Args)]
pub struct DistributionArgs {
    /// Observations parquet file
    pub dataset: PathBuf,
    #[arg(long, default_value_t = HISTOGRAM_MIN)]
    pub min: f64,
    #[arg(long, default_value_t = HISTOGRAM_MAX)]
    pub max: f64,
    /// Bin width, nT
    #[arg(long, default_value_t = HISTOGRAM_WIDTH)]
    pub width: f64,
    /// Rolling-max window, in samples
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,
    /// Results parquet file written by `generate`, binned alongside the observations
    #[arg(long)]
    pub results: Option<PathBuf>,
    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn distribution(args: &DistributionArgs) -> Result<String> {
    // Reject an unusable range before the observations are loaded.
    histogram(&[], args.min, args.max, args.width)?;

    let dataset = load_observations(&args.dataset, args.window)?;
    let distributions = Distributions::from_dataset(&dataset);
    info!(
        "Pooled {} instantaneous and {} rolling-max values",
        distributions.instantaneous.len(),
        distributions.rolling_max.len()
    );

    let mut columns = vec![
        ("Inst. B", histogram(&distributions.instantaneous, args.min, args.max, args.width)?),
        ("Hourly Max B", histogram(&distributions.rolling_max, args.min, args.max, args.width)?),
    ];

    if let Some(results) = &args.results {
        let interpolated = load_result_distributions(results)?;
        columns.push((
            "Interp. Inst. B",
            histogram(&interpolated.instantaneous, args.min, args.max, args.width)?,
        ));
        columns.push((
            "Interp. Hourly Max B",
            histogram(&interpolated.rolling_max, args.min, args.max, args.width)?,
        ));
    }

    let path = output_path(args.output.as_ref(), "distribution.tsv")?;
    let mut out = BufWriter::new(File::create(&path)?);
    write_histograms(&mut out, &columns)?;
    out.flush()?;

    Ok(path.to_string_lossy().to_string())
}

// Every column shares the same bin edges.
fn write_histograms<W: Write>(out: &mut W, columns: &[(&str, Vec<Bin>)]) -> Result<()> {
    let Some((_, edges)) = columns.first() else {
        return Ok(());
    };

    write!(out, "Lower\tUpper")?;
    for (name, _) in columns {
        write!(out, "\t{}", name)?;
    }
    writeln!(out)?;

    for (i, bin) in edges.iter().enumerate() {
        write!(out, "{}\t{}", bin.lower, bin.upper)?;
        for (_, bins) in columns {
            write!(out, "\t{:.6e}", bins[i].density)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

// -- Tests -------------------------------------------------------------------
