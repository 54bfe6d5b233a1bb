//! The forecast variables a meteogram needs from the GFS dataset.

use std::fmt;

/// A variable read from the remote gridded dataset.
///
/// Each variant knows its name in the GrADS Data Server schema, which is also
/// the column name used for it in raw frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastVariable {
    /// Temperature 2 m above ground, Kelvin.
    Temperature2m,
    /// Relative humidity 2 m above ground, percent.
    RelativeHumidity2m,
    /// Total cloud cover of the entire atmosphere, percent.
    TotalCloudCover,
    /// Eastward (U) wind component 10 m above ground, m/s.
    WindU10m,
    /// Northward (V) wind component 10 m above ground, m/s.
    WindV10m,
    /// Surface precipitation accumulated since the start of the run, mm.
    AccumulatedPrecipitation,
}

impl ForecastVariable {
    /// Every variable the extractor downloads, in download order.
    pub const REQUIRED: [ForecastVariable; 6] = [
        ForecastVariable::Temperature2m,
        ForecastVariable::RelativeHumidity2m,
        ForecastVariable::TotalCloudCover,
        ForecastVariable::WindU10m,
        ForecastVariable::WindV10m,
        ForecastVariable::AccumulatedPrecipitation,
    ];

    pub fn dataset_name(&self) -> &'static str {
        match self {
            ForecastVariable::Temperature2m => "tmp2m",
            ForecastVariable::RelativeHumidity2m => "rh2m",
            ForecastVariable::TotalCloudCover => "tcdcclm",
            ForecastVariable::WindU10m => "ugrd10m",
            ForecastVariable::WindV10m => "vgrd10m",
            ForecastVariable::AccumulatedPrecipitation => "apcpsfc",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ForecastVariable::Temperature2m => "K",
            ForecastVariable::RelativeHumidity2m | ForecastVariable::TotalCloudCover => "%",
            ForecastVariable::WindU10m | ForecastVariable::WindV10m => "m/s",
            ForecastVariable::AccumulatedPrecipitation => "mm",
        }
    }
}

impl fmt::Display for ForecastVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset_name())
    }
}
