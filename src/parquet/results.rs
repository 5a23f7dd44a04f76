//! Interpolated station series in long format: one row per station and time.

use std::{fs::File, path::Path, sync::Arc};

use arrow::{
    array::{Float64Array, Float64Builder, StringBuilder, TimestampMillisecondBuilder},
    datatypes::{DataType, Field, Schema, TimeUnit},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    file::properties::WriterProperties,
};
use tracing::info;

use super::{column, to_millis, CHUNK_SIZE};
use crate::{distribution::Distributions, report::StationReport, Result};

/// Writes every report in long format. Non-finite values are stored as nulls.
pub fn save_results(reports: &[StationReport], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("station", DataType::Utf8, false),
        Field::new("time", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        Field::new("b", DataType::Float64, true),
        Field::new("bmax", DataType::Float64, true),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::default(),
        ))
        .set_dictionary_enabled(true)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let mut station_builder = StringBuilder::with_capacity(CHUNK_SIZE, CHUNK_SIZE * 4);
    let mut time_builder = TimestampMillisecondBuilder::with_capacity(CHUNK_SIZE);
    let mut b_builder = Float64Builder::with_capacity(CHUNK_SIZE);
    let mut bmax_builder = Float64Builder::with_capacity(CHUNK_SIZE);
    let mut current_batch_rows = 0;

    for report in reports {
        for ((t, b), bmax) in report.times.iter().zip(&report.b).zip(&report.bmax) {
            station_builder.append_value(&report.station.id);
            time_builder.append_value(to_millis(t));
            b_builder.append_option(b.is_finite().then_some(*b));
            bmax_builder.append_option(bmax.is_finite().then_some(*bmax));
            current_batch_rows += 1;

            if current_batch_rows >= CHUNK_SIZE {
                let batch = RecordBatch::try_new(
                    schema.clone(),
                    vec![
                        Arc::new(station_builder.finish()),
                        Arc::new(time_builder.finish()),
                        Arc::new(b_builder.finish()),
                        Arc::new(bmax_builder.finish()),
                    ],
                )?;
                writer.write(&batch)?;
                current_batch_rows = 0;
            }
        }
    }

    if current_batch_rows > 0 {
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(station_builder.finish()),
                Arc::new(time_builder.finish()),
                Arc::new(b_builder.finish()),
                Arc::new(bmax_builder.finish()),
            ],
        )?;
        writer.write(&batch)?;
    }

    writer.close()?;
    Ok(())
}

/// Pools the non-null interpolated values of a results file.
pub fn load_result_distributions(file_path: &Path) -> Result<Distributions> {
    let file = File::open(file_path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut distributions = Distributions::default();
    for batch in reader {
        let batch = batch?;
        let b = column::<Float64Array>(&batch, "b")?;
        let bmax = column::<Float64Array>(&batch, "bmax")?;

        distributions.instantaneous.extend(b.iter().flatten().filter(|v| v.is_finite()));
        distributions.rolling_max.extend(bmax.iter().flatten().filter(|v| v.is_finite()));
    }

    info!(
        "Pooled {} interpolated values from {}",
        distributions.instantaneous.len(),
        file_path.display()
    );

    Ok(distributions)
}

// -- Tests -------------------------------------------------------------------
