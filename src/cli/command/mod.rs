pub mod availability;
pub mod distribution;
pub mod generate;
pub mod query;

use std::path::Path;

use anyhow::Result;
use dbinterp::{parquet::load_dataset, Dataset};

use super::create_spinner;

pub use availability::{availability, AvailabilityArgs};
pub use distribution::{distribution, DistributionArgs};
pub use generate::{generate, GenerateArgs};
pub use query::{query, QueryArgs};

/// Loads the observations file behind a spinner.
pub fn load_observations(path: &Path, window: usize) -> Result<Dataset> {
    let bar = create_spinner("Loading observations...".to_string());
    let dataset = load_dataset(path, window)?;
    bar.finish_with_message("Observations loaded");

    Ok(dataset)
}
