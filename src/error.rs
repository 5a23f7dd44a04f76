//! Error types shared by the catalog, dataset and interpolator.

use chrono::NaiveDateTime;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A catalog or dataset row could not be parsed.
    #[error("Malformed data at line {line}: {message}")]
    DataFormat { line: usize, message: String },

    #[error("Time {requested} is outside of the data bounds ({first} to {last})")]
    OutOfRange {
        requested: NaiveDateTime,
        first: NaiveDateTime,
        last: NaiveDateTime,
    },

    /// The timestamp is within range but does not appear verbatim in the time index.
    #[error("Time {0} does not match any entry of the time index")]
    UnknownTimestamp(NaiveDateTime),

    #[error("Only {found} stations have finite data at {timestamp}, at least 3 are required")]
    InsufficientStations {
        timestamp: NaiveDateTime,
        found: usize,
    },

    /// Enough stations survive filtering but they span no triangle.
    #[error("The {found} stations with finite data at {timestamp} are collinear")]
    DegenerateStations {
        timestamp: NaiveDateTime,
        found: usize,
    },

    #[error("Non-finite result at {timestamp} for lon={lon}, lat={lat}")]
    InvalidResult {
        timestamp: NaiveDateTime,
        lon: f64,
        lat: f64,
    },

    #[error("Inconsistent series: {0}")]
    InconsistentSeries(String),

    #[error("Rolling window must be a positive odd number of samples, got {0}")]
    InvalidWindow(usize),

    #[error("Cannot bin [{min}, {max}] into bins of width {width}")]
    InvalidHistogram { min: f64, max: f64, width: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}
