//! Handles loading and saving data in the _parquet_ file format.

pub mod dataset;
pub mod results;

use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime};

use crate::{Error, Result};

pub use dataset::{load_dataset, save_components, ComponentRow};
pub use results::{load_result_distributions, save_results};

const CHUNK_SIZE: usize = 100000;

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| Error::DataFormat {
            line: 0,
            message: format!("missing or mistyped column `{}`", name),
        })
}

fn to_millis(t: &NaiveDateTime) -> i64 {
    t.and_utc().timestamp_millis()
}

fn from_millis(ms: i64, row: usize) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms)
        .map(|d| d.naive_utc())
        .ok_or_else(|| Error::DataFormat {
            line: row,
            message: format!("timestamp {} ms is out of range", ms),
        })
}
