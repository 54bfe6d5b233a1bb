//! File exports of a derived forecast.

use crate::error::MeteogramError;
use crate::types::forecast_series::ForecastSeries;
use log::debug;
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Encodes the forecast as CSV, one row per timestamp (see [`ForecastSeries::to_frame`]).
///
/// # Errors
///
/// Returns [`MeteogramError::CsvEncode`] if Polars fails to serialize the frame.
pub fn csv_bytes(forecast: &ForecastSeries) -> Result<Vec<u8>, MeteogramError> {
    let mut frame = forecast.to_frame()?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)
        .map_err(MeteogramError::CsvEncode)?;
    Ok(buffer)
}

/// Encodes the forecast, including the selected grid cell, as pretty-printed JSON.
pub fn json_bytes(forecast: &ForecastSeries) -> Result<Vec<u8>, MeteogramError> {
    serde_json::to_vec_pretty(forecast).map_err(MeteogramError::JsonEncode)
}

/// A group of output files written all together or not at all.
///
/// [`StagedOutputs::commit`] first writes every file to a temporary file in its
/// target directory. Only once all of them are on disk are they renamed into place.
/// If staging fails, the temporary files are removed and no target is touched.
#[derive(Debug, Default)]
pub struct StagedOutputs {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.push((path.into(), bytes));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Writes every file and returns the paths written, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::Export`] naming the first path that could not be
    /// staged or moved into place.
    pub fn commit(self) -> Result<Vec<PathBuf>, MeteogramError> {
        let mut staged = Vec::with_capacity(self.files.len());
        for (path, bytes) in self.files {
            let temp = stage(&path, &bytes)
                .map_err(|e| MeteogramError::Export(path.clone(), e))?;
            debug!("Staged {} at {}", path.display(), temp.path().display());
            staged.push((path, temp));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (path, temp) in staged {
            temp.persist(&path)
                .map_err(|e| MeteogramError::Export(path.clone(), e.error))?;
            written.push(path);
        }
        Ok(written)
    }
}

fn stage(path: &Path, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::derive_forecast;
    use crate::error::error_report;
    use crate::types::raw_point::tests::raw_point;

    fn forecast() -> ForecastSeries {
        derive_forecast(&raw_point(
            vec![298.15, 299.15, 300.15],
            vec![3.0, 1.0, 0.0],
            vec![4.0, 0.0, 2.0],
            vec![0.0, 1.5, 4.0],
        ))
        .unwrap()
    }

    #[test]
    fn test_csv_bytes() -> Result<(), MeteogramError> {
        let csv = String::from_utf8(csv_bytes(&forecast())?).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "datetime,temperature,relative_humidity,cloud_cover,wind_u,wind_v,wind_speed,precip_cumulative,precip_hourly"
        );
        assert!(lines[1].starts_with("2024-02-01"));
        assert!(lines[1].ends_with(','), "first hourly precipitation is empty: {}", lines[1]);
        assert!(lines[3].ends_with(",2.5"), "{}", lines[3]);
        Ok(())
    }

    #[test]
    fn test_json_bytes() -> Result<(), MeteogramError> {
        let value: serde_json::Value = serde_json::from_slice(&json_bytes(&forecast())?).unwrap();
        assert_eq!(value["timestamps"].as_array().unwrap().len(), 3);
        assert_eq!(value["precip_hourly"], serde_json::json!([1.5, 2.5]));
        assert_eq!(value["wind_speed"][0], 5.0);
        assert_eq!(value["grid_point"]["lat_index"], 335);
        Ok(())
    }

    #[test]
    fn test_export_to_missing_directory_keeps_io_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("forecast.csv");
        let mut outputs = StagedOutputs::new();
        outputs.add(&path, b"datetime\n".to_vec());

        let err = outputs.commit().unwrap_err();
        assert!(matches!(&err, MeteogramError::Export(p, _) if *p == path));
        let report = error_report(&err);
        assert!(report.starts_with("Failed to write '"), "{report}");
        assert!(report.contains("forecast.csv': "), "io error missing from: {report}");
    }

    #[test]
    fn test_commit_writes_every_file() -> Result<(), MeteogramError> {
        let dir = tempfile::tempdir().unwrap();
        let mut outputs = StagedOutputs::new();
        outputs.add(dir.path().join("chart.html"), b"<html></html>".to_vec());
        outputs.add(dir.path().join("forecast.csv"), csv_bytes(&forecast())?);
        assert_eq!(outputs.len(), 2);

        let written = outputs.commit()?;
        assert_eq!(
            written,
            vec![dir.path().join("chart.html"), dir.path().join("forecast.csv")]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("chart.html")).unwrap(),
            "<html></html>"
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        Ok(())
    }

    #[test]
    fn test_failed_commit_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("chart.html");
        let csv = dir.path().join("missing").join("forecast.csv");

        let mut outputs = StagedOutputs::new();
        outputs.add(&chart, b"<html></html>".to_vec());
        outputs.add(&csv, b"datetime\n".to_vec());

        assert!(matches!(
            outputs.commit(),
            Err(MeteogramError::Export(p, _)) if p == csv
        ));
        assert!(!chart.exists());
        assert_eq!(
            std::fs::read_dir(dir.path()).unwrap().count(),
            0,
            "staged files must be cleaned up"
        );
    }
}
