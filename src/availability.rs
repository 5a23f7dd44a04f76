//! Station data availability over the span of a dataset.
//!
//! A sample counts as good when the station's rolling-max reading is finite.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::Dataset;

#[derive(Debug, Clone)]
pub struct Availability {
    times: Vec<NaiveDateTime>,
    good: BTreeMap<String, Vec<bool>>,
}

impl Availability {
    /// Availability of each requested station. Stations absent from the
    /// dataset are never available.
    pub fn from_dataset<S: AsRef<str>>(dataset: &Dataset, stations: &[S]) -> Self {
        let times = dataset.times().to_vec();
        let good = stations
            .iter()
            .map(|id| {
                let id = id.as_ref();
                let flags = match dataset.station(id) {
                    Some(series) => series.bmax.iter().map(|v| v.is_finite()).collect(),
                    None => vec![false; times.len()],
                };
                (id.to_string(), flags)
            })
            .collect();

        Availability { times, good }
    }

    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.good.keys().map(String::as_str)
    }

    /// Share of samples with good data, between 0 and 1.
    pub fn fraction(&self, station: &str) -> Option<f64> {
        let flags = self.good.get(station)?;
        if flags.is_empty() {
            return Some(0.0);
        }
        let count = flags.iter().filter(|&&g| g).count();

        Some(count as f64 / flags.len() as f64)
    }

    /// Stations with good data for at least `percent` % of the time.
    pub fn good_stations(&self, percent: f64) -> Vec<String> {
        self.good
            .keys()
            .filter(|id| self.fraction(id).is_some_and(|f| f * 100.0 >= percent))
            .cloned()
            .collect()
    }

    /// Runs of good data as `(start, width)`. A run still open at the end of
    /// the series is closed at the last timestamp.
    pub fn intervals(&self, station: &str) -> Vec<(NaiveDateTime, Duration)> {
        let Some(flags) = self.good.get(station) else {
            return Vec::new();
        };

        let mut intervals = Vec::new();
        let mut start: Option<NaiveDateTime> = None;

        for (t, &good) in self.times.iter().zip(flags) {
            match (good, start) {
                (true, None) => start = Some(*t),
                (false, Some(s)) => {
                    intervals.push((s, *t - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let (Some(s), Some(last)) = (start, self.times.last()) {
            intervals.push((s, *last - s));
        }

        intervals
    }
}

// -- Tests -------------------------------------------------------------------
