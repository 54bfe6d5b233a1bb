//! The raw nearest-cell extraction, before any unit conversion or derivation.

use crate::error::MeteogramError;
use crate::types::request::LatLon;
use crate::types::variable::ForecastVariable;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;

/// The grid cell chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    /// The coordinate the user asked for, as given.
    pub requested: LatLon,
    /// Centre of the selected grid cell, in the dataset's longitude convention.
    pub cell: LatLon,
    /// Index of the cell on the dataset's latitude axis.
    pub lat_index: usize,
    /// Index of the cell on the dataset's longitude axis.
    pub lon_index: usize,
    /// Great-circle distance between the requested coordinate and the cell centre.
    pub distance_km: f64,
}

/// Time series of the six raw variables at one grid cell.
///
/// All series are expected to have one value per entry of `timestamps`. Missing
/// values (the dataset's fill value) are stored as `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPoint {
    pub grid_point: GridPoint,
    pub timestamps: Vec<DateTime<Utc>>,
    pub temperature_k: Vec<f64>,
    pub relative_humidity: Vec<f64>,
    pub cloud_cover: Vec<f64>,
    pub wind_u: Vec<f64>,
    pub wind_v: Vec<f64>,
    pub precip_cumulative: Vec<f64>,
}

impl RawPoint {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Returns the raw values of one variable.
    pub fn series(&self, variable: ForecastVariable) -> &[f64] {
        match variable {
            ForecastVariable::Temperature2m => &self.temperature_k,
            ForecastVariable::RelativeHumidity2m => &self.relative_humidity,
            ForecastVariable::TotalCloudCover => &self.cloud_cover,
            ForecastVariable::WindU10m => &self.wind_u,
            ForecastVariable::WindV10m => &self.wind_v,
            ForecastVariable::AccumulatedPrecipitation => &self.precip_cumulative,
        }
    }

    /// Checks that every variable has exactly one value per timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::MisalignedSeries`] naming the first variable whose
    /// length differs from the timestamp axis.
    pub fn check_alignment(&self) -> Result<(), MeteogramError> {
        let expected = self.timestamps.len();
        for variable in ForecastVariable::REQUIRED {
            let found = self.series(variable).len();
            if found != expected {
                return Err(MeteogramError::MisalignedSeries {
                    series: variable.dataset_name().to_string(),
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Builds a frame with one column per raw variable, named after the dataset
    /// variable (`tmp2m`, `rh2m`, ...). Timestamps are not part of the frame.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        df!(
            ForecastVariable::Temperature2m.dataset_name() => self.temperature_k.as_slice(),
            ForecastVariable::RelativeHumidity2m.dataset_name() => self.relative_humidity.as_slice(),
            ForecastVariable::TotalCloudCover.dataset_name() => self.cloud_cover.as_slice(),
            ForecastVariable::WindU10m.dataset_name() => self.wind_u.as_slice(),
            ForecastVariable::WindV10m.dataset_name() => self.wind_v.as_slice(),
            ForecastVariable::AccumulatedPrecipitation.dataset_name() => self.precip_cumulative.as_slice()
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn hourly_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::hours(i as i64)).collect()
    }

    pub(crate) fn grid_point() -> GridPoint {
        GridPoint {
            requested: LatLon(-6.2, 106.8),
            cell: LatLon(-6.25, 106.75),
            lat_index: 335,
            lon_index: 427,
            distance_km: 7.8,
        }
    }

    pub(crate) fn raw_point(
        temperature_k: Vec<f64>,
        wind_u: Vec<f64>,
        wind_v: Vec<f64>,
        precip_cumulative: Vec<f64>,
    ) -> RawPoint {
        let n = temperature_k.len();
        RawPoint {
            grid_point: grid_point(),
            timestamps: hourly_timestamps(n),
            temperature_k,
            relative_humidity: (0..n).map(|i| 70.0 + i as f64).collect(),
            cloud_cover: (0..n).map(|i| 10.0 * i as f64).collect(),
            wind_u,
            wind_v,
            precip_cumulative,
        }
    }

    #[test]
    fn test_check_alignment() {
        let mut point = raw_point(
            vec![298.0, 299.0, 300.0],
            vec![1.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.5, 1.0],
        );
        assert!(point.check_alignment().is_ok());

        point.wind_v.pop();
        match point.check_alignment() {
            Err(MeteogramError::MisalignedSeries {
                series,
                expected,
                found,
            }) => {
                assert_eq!(series, "vgrd10m");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected MisalignedSeries, got {other:?}"),
        }
    }

    #[test]
    fn test_to_frame() -> Result<(), PolarsError> {
        let point = raw_point(
            vec![298.0, 299.0],
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![0.0, 0.5],
        );
        let frame = point.to_frame()?;
        assert_eq!(frame.shape(), (2, 6));
        assert_eq!(
            frame.get_column_names(),
            ["tmp2m", "rh2m", "tcdcclm", "ugrd10m", "vgrd10m", "apcpsfc"]
        );
        assert_eq!(frame.column("vgrd10m")?.f64()?.get(1), Some(4.0));
        Ok(())
    }
}
