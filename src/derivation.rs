//! Turns a raw nearest-cell extraction into the plotted series.

use crate::error::MeteogramError;
use crate::types::forecast_series::ForecastSeries;
use crate::types::raw_point::RawPoint;
use crate::types::variable::ForecastVariable;
use polars::prelude::*;

/// Difference between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

const COL_TEMPERATURE: &str = "temperature";
const COL_WIND_SPEED: &str = "wind_speed";
const COL_PRECIP_HOURLY: &str = "precip_hourly";

/// Derives the chart-ready series from a raw extraction.
///
/// - temperature: Kelvin minus 273.15, no bounds checking.
/// - wind speed: `sqrt(u² + v²)`, elementwise.
/// - hourly precipitation: forward difference of the accumulation, labeled at
///   `timestamps[1..]`. Negative steps are kept as they are.
///
/// Humidity, cloud cover and the wind components are copied through. The input
/// is not modified, so deriving twice gives identical results.
///
/// # Errors
///
/// - [`MeteogramError::MisalignedSeries`] if a series length differs from the time axis.
/// - [`MeteogramError::InsufficientData`] with fewer than 2 timestamps.
///
/// # Examples
///
/// ```
/// use gfs_meteogram::derive_forecast;
/// # use gfs_meteogram::{GridPoint, LatLon, RawPoint};
/// # use chrono::{TimeZone, Utc};
/// # let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
/// # let raw = RawPoint {
/// #     grid_point: GridPoint {
/// #         requested: LatLon(-6.2, 106.8),
/// #         cell: LatLon(-6.25, 106.75),
/// #         lat_index: 335,
/// #         lon_index: 427,
/// #         distance_km: 7.8,
/// #     },
/// #     timestamps: vec![t0, t0 + chrono::Duration::hours(1), t0 + chrono::Duration::hours(2)],
/// #     temperature_k: vec![300.15, 299.15, 298.15],
/// #     relative_humidity: vec![80.0, 82.0, 85.0],
/// #     cloud_cover: vec![10.0, 20.0, 30.0],
/// #     wind_u: vec![3.0, 0.0, 1.0],
/// #     wind_v: vec![4.0, 2.0, 0.0],
/// #     precip_cumulative: vec![0.0, 1.5, 4.0],
/// # };
/// let forecast = derive_forecast(&raw)?;
/// assert_eq!(forecast.wind_speed, vec![5.0, 2.0, 1.0]);
/// assert_eq!(forecast.precip_hourly, vec![1.5, 2.5]);
/// # Ok::<(), gfs_meteogram::MeteogramError>(())
/// ```
pub fn derive_forecast(raw: &RawPoint) -> Result<ForecastSeries, MeteogramError> {
    raw.check_alignment()?;
    let n = raw.len();
    if n < 2 {
        return Err(MeteogramError::InsufficientData { found: n });
    }

    let tmp = ForecastVariable::Temperature2m.dataset_name();
    let u = ForecastVariable::WindU10m.dataset_name();
    let v = ForecastVariable::WindV10m.dataset_name();
    let precip = ForecastVariable::AccumulatedPrecipitation.dataset_name();

    let derived = raw
        .to_frame()?
        .lazy()
        .select([
            (col(tmp) - lit(KELVIN_OFFSET)).alias(COL_TEMPERATURE),
            (col(u) * col(u) + col(v) * col(v))
                .sqrt()
                .alias(COL_WIND_SPEED),
            (col(precip) - col(precip).shift(lit(1))).alias(COL_PRECIP_HOURLY),
        ])
        .collect()?;

    Ok(ForecastSeries {
        grid_point: raw.grid_point,
        timestamps: raw.timestamps.clone(),
        temperature: float_values(&derived, COL_TEMPERATURE, 0)?,
        relative_humidity: raw.relative_humidity.clone(),
        cloud_cover: raw.cloud_cover.clone(),
        wind_u: raw.wind_u.clone(),
        wind_v: raw.wind_v.clone(),
        wind_speed: float_values(&derived, COL_WIND_SPEED, 0)?,
        precip_cumulative: raw.precip_cumulative.clone(),
        // the first difference has no predecessor and is dropped
        precip_hourly: float_values(&derived, COL_PRECIP_HOURLY, 1)?,
    })
}

/// Reads a float column, skipping `skip` leading rows. Nulls become `NaN`.
fn float_values(frame: &DataFrame, name: &str, skip: usize) -> PolarsResult<Vec<f64>> {
    Ok(frame
        .column(name)?
        .f64()?
        .into_iter()
        .skip(skip)
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}
