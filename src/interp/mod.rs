//! Temporal-spatial interpolation of magnetometer readings.
//!
//! An [`Interpolator`] owns a [`Dataset`] and answers "what is |ΔB| at this
//! place and time" by building one triangulated surface per distinct timestamp,
//! on first use, and caching it for its own lifetime. Timestamps are matched
//! exactly against the dataset's time index; use [`Interpolator::snap`] to
//! quantize arbitrary times first.

pub mod surface;
pub mod triangulation;

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::{distribution::Distributions, Dataset, Error, Result};

pub use surface::Surface;
pub use triangulation::{LinearInterpolant, Triangulation};

/// Reading channel to interpolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Instantaneous,
    RollingMax,
}

/// Interpolated values at one place and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub instantaneous: f64,
    pub rolling_max: f64,
}

impl Evaluation {
    pub fn is_finite(&self) -> bool {
        self.instantaneous.is_finite() && self.rolling_max.is_finite()
    }
}

pub struct Interpolator {
    dataset: Dataset,
    station_ids: Vec<String>,
    points: Vec<[f64; 2]>,
    distributions: Distributions,
    surfaces: Mutex<HashMap<NaiveDateTime, Arc<Surface>>>,
    surfaces_built: AtomicUsize,
}

impl Interpolator {
    pub fn new(dataset: Dataset) -> Self {
        let station_ids: Vec<String> = dataset.stations().keys().cloned().collect();
        let points = dataset
            .stations()
            .values()
            .map(|s| [s.geolon, s.geolat])
            .collect();
        let distributions = Distributions::from_dataset(&dataset);

        Interpolator {
            dataset,
            station_ids,
            points,
            distributions,
            surfaces: Mutex::new(HashMap::new()),
            surfaces_built: AtomicUsize::new(0),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Every station in the dataset, in id order.
    pub fn station_ids(&self) -> &[String] {
        &self.station_ids
    }

    /// (lon, lat) of every station, aligned with `station_ids`.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Pooled finite readings of all stations.
    pub fn distributions(&self) -> &Distributions {
        &self.distributions
    }

    /// Number of surfaces constructed so far.
    pub fn surfaces_built(&self) -> usize {
        self.surfaces_built.load(Ordering::Relaxed)
    }

    /// Latest time index entry not after `timestamp`.
    pub fn snap(&self, timestamp: NaiveDateTime) -> Option<NaiveDateTime> {
        self.dataset.snap(timestamp)
    }

    /// Interpolates both channels at `(lon, lat)`.
    ///
    /// Results outside the convex hull of the stations with finite data are
    /// NaN; with `strict` set they are reported as [`Error::InvalidResult`].
    pub fn evaluate(
        &self,
        timestamp: NaiveDateTime,
        lon: f64,
        lat: f64,
        strict: bool,
    ) -> Result<Evaluation> {
        let surface = self.surface(timestamp)?;
        let evaluation = Evaluation {
            instantaneous: surface.instantaneous().evaluate(lon, lat),
            rolling_max: surface.rolling_max().evaluate(lon, lat),
        };

        if strict && !evaluation.is_finite() {
            return Err(Error::InvalidResult {
                timestamp,
                lon,
                lat,
            });
        }

        Ok(evaluation)
    }

    /// Interpolates a single channel at `(lon, lat)`.
    pub fn evaluate_channel(
        &self,
        timestamp: NaiveDateTime,
        lon: f64,
        lat: f64,
        channel: Channel,
        strict: bool,
    ) -> Result<f64> {
        let surface = self.surface(timestamp)?;
        let value = match channel {
            Channel::Instantaneous => surface.instantaneous().evaluate(lon, lat),
            Channel::RollingMax => surface.rolling_max().evaluate(lon, lat),
        };

        if strict && !value.is_finite() {
            return Err(Error::InvalidResult {
                timestamp,
                lon,
                lat,
            });
        }

        Ok(value)
    }

    /// The cached surface for `timestamp`, built on first request.
    pub fn surface(&self, timestamp: NaiveDateTime) -> Result<Arc<Surface>> {
        if !self.dataset.contains(timestamp) {
            return Err(Error::OutOfRange {
                requested: timestamp,
                first: self.dataset.first_time(),
                last: self.dataset.last_time(),
            });
        }

        // Building under the lock keeps construction atomic per timestamp.
        let mut surfaces = self
            .surfaces
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(surface) = surfaces.get(&timestamp) {
            return Ok(Arc::clone(surface));
        }

        let surface = Arc::new(Surface::build(&self.dataset, timestamp)?);
        self.surfaces_built.fetch_add(1, Ordering::Relaxed);
        surfaces.insert(timestamp, Arc::clone(&surface));
        debug!("Cached surface for {} ({} total)", timestamp, surfaces.len());

        Ok(surface)
    }
}

impl fmt::Display for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extent = |axis: usize| {
            self.points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            })
        };
        let (lon_min, lon_max) = extent(0);
        let (lat_min, lat_max) = extent(1);

        write!(
            f,
            "Interpolator spanning T={},{}; lons={},{}; lats={},{}",
            self.dataset.first_time(),
            self.dataset.last_time(),
            lon_min,
            lon_max,
            lat_min,
            lat_max
        )
    }
}

// -- Tests -------------------------------------------------------------------
