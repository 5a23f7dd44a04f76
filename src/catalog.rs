//! Station catalog: fixed geographic locations of the query stations.
//!
//! The source is a comma separated table with a header row followed by
//! `"station_id", longitude, latitude` rows. Longitudes are reported in the
//! 0-360 convention used by the magnetometer data.

use std::{
    collections::BTreeMap,
    fs::File,
    io::Read,
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl Station {
    fn from_record(record: &StringRecord, order: ColumnOrder, line: usize) -> Result<Self> {
        if record.len() < 3 {
            return Err(Error::DataFormat {
                line,
                message: format!("expected 3 fields, found {}", record.len()),
            });
        }

        let id = record[0].trim_matches('"').trim().to_string();
        if id.is_empty() {
            return Err(Error::DataFormat {
                line,
                message: "empty station id".to_string(),
            });
        }

        let first = parse_f64(&record[1], line)?;
        let second = parse_f64(&record[2], line)?;
        let (longitude, latitude) = match order {
            ColumnOrder::LonLat => (first, second),
            ColumnOrder::LatLon => (second, first),
        };

        Ok(Station {
            id,
            longitude: normalize_longitude(longitude),
            latitude,
        })
    }
}

/// Order of the two numeric columns.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnOrder {
    LonLat,
    LatLon,
}

impl ColumnOrder {
    fn from_header(header: &StringRecord) -> Self {
        match header.get(1) {
            Some(name) if name.trim().to_lowercase().starts_with("lat") => ColumnOrder::LatLon,
            _ => ColumnOrder::LonLat,
        }
    }
}

/// Lookup of station id to location. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stations: BTreeMap<String, Station>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.get(id)
    }

    /// Stations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let order = ColumnOrder::from_header(reader.headers()?);
        let mut stations = BTreeMap::new();

        for (index, record) in reader.records().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let record = record.map_err(|e| Error::DataFormat {
                line,
                message: e.to_string(),
            })?;
            let station = Station::from_record(&record, order, line)?;
            debug!(
                "Catalog station {} at lon={}, lat={}",
                station.id, station.longitude, station.latitude
            );
            stations.insert(station.id.clone(), station);
        }

        Ok(Catalog { stations })
    }
}

/// Loads the station catalog from a file.
pub fn load(path: &Path) -> Result<Catalog> {
    let file = File::open(path)?;
    let catalog = Catalog::from_reader(file)?;
    info!("Loaded {} stations from {}", catalog.len(), path.display());

    Ok(catalog)
}

/// Longitudes at or west of the prime meridian are shifted by a full turn.
pub fn normalize_longitude(longitude: f64) -> f64 {
    if longitude <= 0.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

fn parse_f64(s: &str, line: usize) -> Result<f64> {
    s.trim().parse::<f64>().map_err(|e| Error::DataFormat {
        line,
        message: format!("`{}` is not a number: {}", s.trim(), e),
    })
}

// -- Tests -------------------------------------------------------------------
