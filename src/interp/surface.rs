//! One timestamp's interpolation surface.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use super::triangulation::{LinearInterpolant, Triangulation};
use crate::{constants::MIN_STATIONS, Dataset, Error, Result};

/// Station readings at one timestamp, filtered to finite values, with an
/// interpolant for each channel.
#[derive(Debug, Clone)]
pub struct Surface {
    timestamp: NaiveDateTime,
    station_ids: Vec<String>,
    instantaneous: LinearInterpolant,
    rolling_max: LinearInterpolant,
    triangulation: Arc<Triangulation>,
}

impl Surface {
    /// Builds the surface for a timestamp that must appear verbatim in the
    /// dataset's time index.
    ///
    /// Stations whose instantaneous reading is not finite are dropped together
    /// with their coordinates. Coincident stations keep only the first id.
    pub fn build(dataset: &Dataset, timestamp: NaiveDateTime) -> Result<Self> {
        let row = dataset
            .position(timestamp)
            .ok_or(Error::UnknownTimestamp(timestamp))?;

        let mut station_ids = Vec::new();
        let mut points: Vec<[f64; 2]> = Vec::new();
        let mut b = Vec::new();
        let mut bmax = Vec::new();
        let mut excluded = Vec::new();

        for (id, series) in dataset.stations() {
            let point = [series.geolon, series.geolat];
            if !series.b[row].is_finite() || points.contains(&point) {
                excluded.push(id.as_str());
                continue;
            }

            station_ids.push(id.clone());
            points.push(point);
            b.push(series.b[row]);
            bmax.push(series.bmax[row]);
        }

        debug!(
            "Building surface at {} from {} stations, excluded {:?}",
            timestamp,
            station_ids.len(),
            excluded
        );

        if station_ids.len() < MIN_STATIONS {
            return Err(Error::InsufficientStations {
                timestamp,
                found: station_ids.len(),
            });
        }

        let triangulation = Arc::new(Triangulation::new(&points));
        if triangulation.is_empty() {
            return Err(Error::DegenerateStations {
                timestamp,
                found: station_ids.len(),
            });
        }

        Ok(Surface {
            timestamp,
            station_ids,
            instantaneous: LinearInterpolant::new(Arc::clone(&triangulation), b),
            rolling_max: LinearInterpolant::new(Arc::clone(&triangulation), bmax),
            triangulation,
        })
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Ids of the stations the surface was built from.
    pub fn station_ids(&self) -> &[String] {
        &self.station_ids
    }

    /// (lon, lat) of each station in `station_ids` order.
    pub fn points(&self) -> &[[f64; 2]] {
        self.triangulation.points()
    }

    pub fn instantaneous(&self) -> &LinearInterpolant {
        &self.instantaneous
    }

    pub fn rolling_max(&self) -> &LinearInterpolant {
        &self.rolling_max
    }
}

// -- Tests -------------------------------------------------------------------
