//! Per-location time series text reports.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use futures::future::join_all;
use tracing::{debug, error};

use crate::{catalog::Station, Result};

/// Interpolated series for one catalog station.
#[derive(Debug, Clone)]
pub struct StationReport {
    pub station: Station,
    pub times: Vec<NaiveDateTime>,
    pub b: Vec<f64>,
    pub bmax: Vec<f64>,
}

impl StationReport {
    pub fn file_name(&self, year: i32) -> String {
        format!("{}_{:04}.txt", self.station.id, year)
    }

    /// Writes the tab separated report.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "Station {} at geolat={}, geolon={}",
            self.station.id, self.station.latitude, self.station.longitude
        )?;
        writeln!(out, "Time\tInst. B\tHourly Max B")?;
        for ((t, b), bmax) in self.times.iter().zip(&self.b).zip(&self.bmax) {
            writeln!(out, "{}\t{:012.7}\t{:012.7}", t, b, bmax)?;
        }

        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(&mut out)?;
        out.flush()?;

        Ok(())
    }
}

/// Saves every report into `dir` concurrently, returning the written paths.
/// Reports that fail to save are logged and skipped.
pub async fn save_all(reports: Vec<StationReport>, dir: &Path, year: i32) -> Result<Vec<PathBuf>> {
    let tasks: Vec<_> = reports
        .into_iter()
        .map(|report| {
            let path = dir.join(report.file_name(year));
            tokio::task::spawn_blocking(move || report.save(&path).map(|_| path))
        })
        .collect();

    let mut paths = Vec::new();
    for result in join_all(tasks).await {
        match result {
            Ok(Ok(path)) => {
                debug!("Wrote {}", path.display());
                paths.push(path);
            }
            Ok(Err(e)) => error!("Error writing report: {}", e),
            Err(e) => error!("Task join error: {}", e),
        }
    }

    Ok(paths)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::dataset::test::minute;

    fn report_fixture(id: &str) -> StationReport {
        StationReport {
            station: Station {
                id: id.to_string(),
                longitude: 259.5,
                latitude: 41.9,
            },
            times: vec![minute(0), minute(60)],
            b: vec![1.5, 12.25],
            bmax: vec![3.0, 100.125],
        }
    }

    #[test]
    fn should_format_report() {
        let mut out = Vec::new();
        report_fixture("KLNX").write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Station KLNX at geolat=41.9, geolon=259.5");
        assert_eq!(lines[1], "Time\tInst. B\tHourly Max B");
        assert_eq!(lines[2], "2008-01-01 00:00:00\t0001.5000000\t0003.0000000");
        assert_eq!(lines[3], "2008-01-01 01:00:00\t0012.2500000\t0100.1250000");
        assert_eq!(lines.len(), 4);
    }

    #[tokio::test]
    async fn should_save_all_reports() {
        let dir = TempDir::new().unwrap();
        let reports = vec![report_fixture("KLNX"), report_fixture("KABR")];

        let mut paths = save_all(reports, dir.path(), 2008).await.unwrap();
        paths.sort();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("KABR_2008.txt"));
        let text = fs::read_to_string(&paths[1]).unwrap();
        assert!(text.starts_with("Station KLNX"));
    }
}
