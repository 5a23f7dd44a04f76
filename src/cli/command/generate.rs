//! Interpolate observations to every catalog station and save the results.

use std::{collections::HashSet, fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, Duration, NaiveDateTime};
use clap::Args;
use futures::future::join_all;
use tracing::{debug, info, warn};

use dbinterp::{
    catalog::{self, Catalog, Station},
    constants::{DEFAULT_CADENCE_MINUTES, DEFAULT_WINDOW},
    parquet::save_results,
    report::{self, StationReport},
    Error, Interpolator,
};

use super::load_observations;
use crate::cli::{create_progress_bar, output_path};

#[derive(Args)]
pub struct GenerateArgs {
    /// Observations parquet file
    pub dataset: PathBuf,
    /// Station catalog CSV file
    pub catalog: PathBuf,
    /// Rolling-max window, in samples
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,
    /// Minutes between interpolated times
    #[arg(long, default_value_t = DEFAULT_CADENCE_MINUTES)]
    pub cadence: i64,
    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn generate(args: &GenerateArgs) -> Result<String> {
    let catalog = catalog::load(&args.catalog)?;
    if catalog.is_empty() {
        bail!("Catalog {} lists no stations", args.catalog.display());
    }
    let dataset = load_observations(&args.dataset, args.window)?;
    let interp = Arc::new(Interpolator::new(dataset));
    info!("{}", interp);

    let times = interp.dataset().sample(Duration::minutes(args.cadence));
    let year = interp.dataset().first_time().year();
    let dir = output_path(args.output.as_ref(), &format!("station_data_{:04}", year))?;
    fs::create_dir_all(&dir)?;

    let skipped = build_surfaces(&interp, &times)?;
    if !skipped.is_empty() {
        warn!("{} of {} times have no usable surface", skipped.len(), times.len());
    }

    let reports = interpolate_catalog(&interp, &catalog, &times).await?;

    save_results(&reports, &dir.join(format!("all_stations_{:04}.parquet", year)))?;
    let paths = report::save_all(reports, &dir, year).await?;
    info!("Wrote {} station reports", paths.len());

    Ok(dir.to_string_lossy().to_string())
}

// Builds every surface up front; returns the times that cannot be interpolated.
fn build_surfaces(interp: &Interpolator, times: &[NaiveDateTime]) -> Result<HashSet<NaiveDateTime>> {
    let pb = create_progress_bar(times.len() as u64, "Building surfaces".to_string());
    let mut skipped = HashSet::new();

    for t in times {
        match interp.surface(*t) {
            Ok(surface) => debug!(
                "Surface at {} spans {} stations",
                surface.timestamp(),
                surface.station_ids().len()
            ),
            Err(e @ (Error::InsufficientStations { .. } | Error::DegenerateStations { .. })) => {
                warn!("{}", e);
                skipped.insert(*t);
            }
            Err(e) => return Err(e.into()),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Surfaces built");

    Ok(skipped)
}

async fn interpolate_catalog(
    interp: &Arc<Interpolator>,
    catalog: &Catalog,
    times: &[NaiveDateTime],
) -> Result<Vec<StationReport>> {
    let times = Arc::new(times.to_vec());

    let tasks: Vec<_> = catalog
        .iter()
        .cloned()
        .map(|station| {
            let interp = Arc::clone(interp);
            let times = Arc::clone(&times);
            tokio::task::spawn_blocking(move || interpolate_station(&interp, station, &times))
        })
        .collect();

    let mut reports = Vec::with_capacity(catalog.len());
    for result in join_all(tasks).await {
        reports.push(result.map_err(|e| anyhow!("Task join error: {}", e))?);
    }

    Ok(reports)
}

fn interpolate_station(
    interp: &Interpolator,
    station: Station,
    times: &[NaiveDateTime],
) -> StationReport {
    let mut b = Vec::with_capacity(times.len());
    let mut bmax = Vec::with_capacity(times.len());

    for t in times {
        match interp.evaluate(*t, station.longitude, station.latitude, false) {
            Ok(e) => {
                b.push(e.instantaneous);
                bmax.push(e.rolling_max);
            }
            Err(e) => {
                debug!("{} at {}: {}", station.id, t, e);
                b.push(f64::NAN);
                bmax.push(f64::NAN);
            }
        }
    }

    StationReport {
        station,
        times: times.to_vec(),
        b,
        bmax,
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use dbinterp::{Dataset, StationSeries};

    use super::*;

    fn hour(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2008, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    fn interp_fixture() -> Interpolator {
        let mut stations = BTreeMap::new();
        for (id, lon, lat, b) in [
            ("AAA", 250.0, 30.0, vec![1.0, 1.0]),
            ("BBB", 290.0, 30.0, vec![2.0, f64::NAN]),
            ("CCC", 250.0, 60.0, vec![3.0, f64::NAN]),
        ] {
            stations.insert(
                id.to_string(),
                StationSeries {
                    geolon: lon,
                    geolat: lat,
                    bmax: b.clone(),
                    b,
                },
            );
        }

        Interpolator::new(Dataset::new(vec![hour(0), hour(1)], stations).unwrap())
    }

    #[test]
    fn should_skip_times_without_surface() {
        let interp = interp_fixture();

        let skipped = build_surfaces(&interp, &[hour(0), hour(1)]).unwrap();

        assert_eq!(skipped.len(), 1);
        assert!(skipped.contains(&hour(1)));
        assert_eq!(interp.surfaces_built(), 1);
    }

    #[test]
    fn should_fill_nan_for_unusable_times() {
        let interp = interp_fixture();
        let station = Station {
            id: "KLNX".to_string(),
            longitude: 259.5,
            latitude: 41.9,
        };

        let report = interpolate_station(&interp, station, &[hour(0), hour(1)]);

        assert!(report.b[0].is_finite());
        assert!(report.b[1].is_nan());
        assert!(report.bmax[1].is_nan());
        assert_eq!(report.times.len(), 2);
    }

    #[tokio::test]
    async fn should_refuse_empty_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let catalog = dir.path().join("radars.csv");
        fs::write(&catalog, "station,lon,lat\n").unwrap();

        let args = GenerateArgs {
            dataset: dir.path().join("observations.parquet"),
            catalog,
            window: DEFAULT_WINDOW,
            cadence: DEFAULT_CADENCE_MINUTES,
            output: Some(dir.path().join("out")),
        };
        let err = generate(&args).await.unwrap_err();

        assert!(err.to_string().contains("lists no stations"));
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn should_interpolate_every_catalog_station() {
        let interp = Arc::new(interp_fixture());
        let catalog =
            Catalog::from_reader("station,lon,lat\n\"KLNX\",-100.5,41.9\n\"KXXX\",0.5,0.5\n".as_bytes())
                .unwrap();

        let reports = interpolate_catalog(&interp, &catalog, &[hour(0)]).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].station.id, "KLNX");
        assert!(reports[0].b[0].is_finite());
        assert!(reports[1].b[0].is_nan());
    }
}
