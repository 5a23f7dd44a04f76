//! Interpolation of ground magnetic perturbations measured by a sparse set of
//! magnetometer stations to arbitrary locations and times.

pub mod availability;
pub mod catalog;
pub mod constants;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod interp;
pub mod parquet;
pub mod report;

pub use catalog::{Catalog, Station};
pub use dataset::{Dataset, StationSeries};
pub use error::{Error, Result};
pub use interp::{Channel, Evaluation, Interpolator};
