//! Magnetometer observations in long format: one row per station and time.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs::File,
    path::Path,
    sync::Arc,
};

use arrow::{
    array::{
        Array, Float64Array, Float64Builder, StringArray, StringBuilder,
        TimestampMillisecondArray, TimestampMillisecondBuilder,
    },
    datatypes::{DataType, Field, Schema, TimeUnit},
    record_batch::RecordBatch,
};
use chrono::NaiveDateTime;
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    file::properties::WriterProperties,
};
use tracing::info;

use super::{column, from_millis, to_millis, CHUNK_SIZE};
use crate::{Dataset, Result, StationSeries};

/// One station's perturbation components at one time, nT.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRow {
    pub station: String,
    pub time: NaiveDateTime,
    pub geolon: f64,
    pub geolat: f64,
    pub dbn: Option<f64>,
    pub dbe: Option<f64>,
    pub dbz: Option<f64>,
}

#[derive(Default)]
struct StationRows {
    geolon: f64,
    geolat: f64,
    samples: Vec<(i64, f64, f64, f64)>,
}

fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("station", DataType::Utf8, false),
        Field::new("time", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        Field::new("geolon", DataType::Float64, false),
        Field::new("geolat", DataType::Float64, false),
        Field::new("dbn", DataType::Float64, true),
        Field::new("dbe", DataType::Float64, true),
        Field::new("dbz", DataType::Float64, true),
    ]))
}

/// Loads observations and derives the magnitude and rolling-max channels.
///
/// The shared time index is the sorted set of distinct times in the file;
/// samples a station lacks are filled with NaN.
pub fn load_dataset(file_path: &Path, window: usize) -> Result<Dataset> {
    let file = File::open(file_path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows: BTreeMap<String, StationRows> = BTreeMap::new();
    let mut times: BTreeSet<i64> = BTreeSet::new();
    let mut row_offset = 0;

    for batch in reader {
        let batch = batch?;
        let stations = column::<StringArray>(&batch, "station")?;
        let time = column::<TimestampMillisecondArray>(&batch, "time")?;
        let geolon = column::<Float64Array>(&batch, "geolon")?;
        let geolat = column::<Float64Array>(&batch, "geolat")?;
        let dbn = column::<Float64Array>(&batch, "dbn")?;
        let dbe = column::<Float64Array>(&batch, "dbe")?;
        let dbz = column::<Float64Array>(&batch, "dbz")?;

        for i in 0..batch.num_rows() {
            let entry = rows.entry(stations.value(i).to_string()).or_default();
            entry.geolon = geolon.value(i);
            entry.geolat = geolat.value(i);

            let ms = time.value(i);
            times.insert(ms);
            entry
                .samples
                .push((ms, value_or_nan(dbn, i), value_or_nan(dbe, i), value_or_nan(dbz, i)));
        }
        row_offset += batch.num_rows();
    }

    let index: HashMap<i64, usize> = times.iter().enumerate().map(|(i, &ms)| (ms, i)).collect();
    let time_index = times
        .iter()
        .enumerate()
        .map(|(row, &ms)| from_millis(ms, row))
        .collect::<Result<Vec<_>>>()?;

    let mut stations = BTreeMap::new();
    for (id, station) in rows {
        let mut dbn = vec![f64::NAN; time_index.len()];
        let mut dbe = vec![f64::NAN; time_index.len()];
        let mut dbz = vec![f64::NAN; time_index.len()];
        for (ms, n, e, z) in station.samples {
            let i = index[&ms];
            dbn[i] = n;
            dbe[i] = e;
            dbz[i] = z;
        }

        let series =
            StationSeries::from_components(station.geolon, station.geolat, &dbn, &dbe, &dbz, window)?;
        stations.insert(id, series);
    }

    info!(
        "Loaded {} rows for {} stations over {} times from {}",
        row_offset,
        stations.len(),
        time_index.len(),
        file_path.display()
    );

    Dataset::new(time_index, stations)
}

/// Saves component rows, in batches, to `file_path`.
pub fn save_components(rows: &[ComponentRow], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let schema = schema();

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    for chunk in rows.chunks(CHUNK_SIZE) {
        let mut station_builder = StringBuilder::with_capacity(chunk.len(), chunk.len() * 3);
        let mut time_builder = TimestampMillisecondBuilder::with_capacity(chunk.len());
        let mut geolon_builder = Float64Builder::with_capacity(chunk.len());
        let mut geolat_builder = Float64Builder::with_capacity(chunk.len());
        let mut dbn_builder = Float64Builder::with_capacity(chunk.len());
        let mut dbe_builder = Float64Builder::with_capacity(chunk.len());
        let mut dbz_builder = Float64Builder::with_capacity(chunk.len());

        for row in chunk {
            station_builder.append_value(&row.station);
            time_builder.append_value(to_millis(&row.time));
            geolon_builder.append_value(row.geolon);
            geolat_builder.append_value(row.geolat);
            dbn_builder.append_option(row.dbn);
            dbe_builder.append_option(row.dbe);
            dbz_builder.append_option(row.dbz);
        }

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(station_builder.finish()),
                Arc::new(time_builder.finish()),
                Arc::new(geolon_builder.finish()),
                Arc::new(geolat_builder.finish()),
                Arc::new(dbn_builder.finish()),
                Arc::new(dbe_builder.finish()),
                Arc::new(dbz_builder.finish()),
            ],
        )?;
        writer.write(&batch)?;
    }

    writer.close()?;
    Ok(())
}

fn value_or_nan(array: &Float64Array, i: usize) -> f64 {
    if array.is_null(i) {
        f64::NAN
    } else {
        array.value(i)
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use tempfile::NamedTempFile;

    use super::*;
    use crate::dataset::test::minute;

    fn row(station: &str, m: i64, n: Option<f64>) -> ComponentRow {
        ComponentRow {
            station: station.to_string(),
            time: minute(m),
            geolon: 254.8,
            geolat: 40.1,
            dbn: n,
            dbe: Some(4.0),
            dbz: Some(0.0),
        }
    }

    #[test]
    fn should_load_saved_components() {
        let rows = vec![
            row("BOU", 0, Some(3.0)),
            row("BOU", 1, None),
            row("BOU", 2, Some(0.0)),
            row("FRD", 0, Some(0.0)),
            // FRD has no row at minute 1.
            row("FRD", 2, Some(3.0)),
        ];
        let file = NamedTempFile::new().unwrap();
        save_components(&rows, file.path()).unwrap();

        let dataset = load_dataset(file.path(), 3).unwrap();

        assert_eq!(dataset.times(), [minute(0), minute(1), minute(2)]);
        assert_eq!(dataset.stations().len(), 2);

        let bou = dataset.station("BOU").unwrap();
        assert_eq!(bou.geolon, 254.8);
        assert_eq!(bou.geolat, 40.1);
        assert_eq!(bou.b[0], 5.0);
        assert!(bou.b[1].is_nan());
        assert_eq!(bou.b[2], 4.0);
        assert_eq!(bou.bmax, vec![5.0, 5.0, 4.0]);

        let frd = dataset.station("FRD").unwrap();
        assert_eq!(frd.b[0], 4.0);
        assert!(frd.b[1].is_nan());
        assert_eq!(frd.b[2], 5.0);
    }

    #[test]
    fn should_reject_even_window_on_load() {
        let file = NamedTempFile::new().unwrap();
        save_components(&[row("BOU", 0, Some(1.0))], file.path()).unwrap();

        assert!(load_dataset(file.path(), 2).is_err());
    }
}
