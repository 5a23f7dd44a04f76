//! Observation dataset consumed by the interpolator.
//!
//! Every station shares one ordered time index; each station carries its fixed
//! geographic location and two reading channels aligned 1:1 with that index.

pub mod channels;

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::{Error, Result};

pub use channels::{magnitude, rolling_max};

/// Readings of one magnetometer.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    pub geolon: f64,
    pub geolat: f64,
    /// Instantaneous perturbation magnitude, nT.
    pub b: Vec<f64>,
    /// Centered rolling maximum of `b`, nT.
    pub bmax: Vec<f64>,
}

impl StationSeries {
    /// Derives both channels from the north, east and vertical components.
    pub fn from_components(
        geolon: f64,
        geolat: f64,
        dbn: &[f64],
        dbe: &[f64],
        dbz: &[f64],
        window: usize,
    ) -> Result<Self> {
        let b = magnitude(dbn, dbe, dbz)?;
        let bmax = rolling_max(&b, window)?;

        Ok(StationSeries {
            geolon,
            geolat,
            b,
            bmax,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    times: Vec<NaiveDateTime>,
    stations: BTreeMap<String, StationSeries>,
}

impl Dataset {
    pub fn new(
        times: Vec<NaiveDateTime>,
        stations: BTreeMap<String, StationSeries>,
    ) -> Result<Self> {
        if times.is_empty() {
            return Err(Error::InconsistentSeries("empty time index".to_string()));
        }
        if let Some(i) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::InconsistentSeries(format!(
                "time index decreases at position {}",
                i + 1
            )));
        }
        for (id, series) in &stations {
            if series.b.len() != times.len() || series.bmax.len() != times.len() {
                return Err(Error::InconsistentSeries(format!(
                    "station {} has {}/{} readings for {} times",
                    id,
                    series.b.len(),
                    series.bmax.len(),
                    times.len()
                )));
            }
        }

        Ok(Dataset { times, stations })
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn first_time(&self) -> NaiveDateTime {
        self.times[0]
    }

    pub fn last_time(&self) -> NaiveDateTime {
        self.times[self.times.len() - 1]
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.first_time() && timestamp <= self.last_time()
    }

    /// Station series in id order.
    pub fn stations(&self) -> &BTreeMap<String, StationSeries> {
        &self.stations
    }

    pub fn station(&self, id: &str) -> Option<&StationSeries> {
        self.stations.get(id)
    }

    /// Index of the first entry equal to `timestamp`.
    pub fn position(&self, timestamp: NaiveDateTime) -> Option<usize> {
        let i = self.times.partition_point(|t| *t < timestamp);
        (i < self.times.len() && self.times[i] == timestamp).then_some(i)
    }

    /// Latest index entry not after `timestamp`.
    pub fn snap(&self, timestamp: NaiveDateTime) -> Option<NaiveDateTime> {
        let i = self.times.partition_point(|t| *t <= timestamp);
        (i > 0).then(|| self.times[i - 1])
    }

    /// Timestamps spaced `cadence` apart from the first entry, each snapped
    /// onto the index. Repeats produced by gaps in the index are dropped.
    pub fn sample(&self, cadence: Duration) -> Vec<NaiveDateTime> {
        let mut samples: Vec<NaiveDateTime> = Vec::new();
        if cadence <= Duration::zero() {
            return samples;
        }

        let mut t = self.first_time();
        while t <= self.last_time() {
            if let Some(snapped) = self.snap(t) {
                if samples.last() != Some(&snapped) {
                    samples.push(snapped);
                }
            }
            t += cadence;
        }

        samples
    }
}

// -- Tests -------------------------------------------------------------------
