//! The derived, plot-ready forecast for one grid cell and one model run.

use crate::types::raw_point::GridPoint;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;

/// Parallel hourly series for one grid cell, ready to be charted.
///
/// Every series shares `timestamps` except `precip_hourly`, which holds one value
/// fewer: entry `i` is the precipitation that fell between `timestamps[i]` and
/// `timestamps[i + 1]` and is labeled at the later instant (see
/// [`ForecastSeries::precip_timestamps`]).
///
/// Instances are produced by [`crate::derive_forecast`] and live only for the request
/// that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub grid_point: GridPoint,
    pub timestamps: Vec<DateTime<Utc>>,
    /// 2 m temperature, °C.
    pub temperature: Vec<f64>,
    /// 2 m relative humidity, %.
    pub relative_humidity: Vec<f64>,
    /// Total cloud cover, %.
    pub cloud_cover: Vec<f64>,
    /// 10 m eastward wind, m/s.
    pub wind_u: Vec<f64>,
    /// 10 m northward wind, m/s.
    pub wind_v: Vec<f64>,
    /// 10 m wind speed, m/s.
    pub wind_speed: Vec<f64>,
    /// Precipitation accumulated since the start of the run, mm.
    pub precip_cumulative: Vec<f64>,
    /// Precipitation per hourly step, mm/hr. Not clamped: a reset of the
    /// accumulation bucket shows up as a negative value.
    pub precip_hourly: Vec<f64>,
}

impl ForecastSeries {
    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The timestamps `precip_hourly` is aligned to: all but the first.
    pub fn precip_timestamps(&self) -> &[DateTime<Utc>] {
        self.timestamps.get(1..).unwrap_or(&[])
    }

    /// Converts the series into a Polars `DataFrame` with one row per timestamp.
    ///
    /// Columns: `datetime` (UTC, millisecond precision), `temperature`,
    /// `relative_humidity`, `cloud_cover`, `wind_u`, `wind_v`, `wind_speed`,
    /// `precip_cumulative` and `precip_hourly`. Because hourly precipitation is
    /// labeled at the end of each step, its first row is null.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let datetime = DatetimeChunked::from_naive_datetime(
            "datetime".into(),
            self.timestamps.iter().map(|t| t.naive_utc()),
            TimeUnit::Milliseconds,
        );
        let precip_hourly: Vec<Option<f64>> = std::iter::once(None)
            .chain(self.precip_hourly.iter().copied().map(Some))
            .take(self.timestamps.len())
            .collect();

        DataFrame::new(vec![
            Column::from(datetime.into_series()),
            Column::new("temperature".into(), self.temperature.as_slice()),
            Column::new("relative_humidity".into(), self.relative_humidity.as_slice()),
            Column::new("cloud_cover".into(), self.cloud_cover.as_slice()),
            Column::new("wind_u".into(), self.wind_u.as_slice()),
            Column::new("wind_v".into(), self.wind_v.as_slice()),
            Column::new("wind_speed".into(), self.wind_speed.as_slice()),
            Column::new("precip_cumulative".into(), self.precip_cumulative.as_slice()),
            Column::new("precip_hourly".into(), precip_hourly),
        ])
    }
}
