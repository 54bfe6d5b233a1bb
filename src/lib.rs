mod chart;
mod dataset;
mod derivation;
mod error;
mod export;
mod extract;
mod meteogram;
mod types;

pub use error::{error_report, MeteogramError};
pub use meteogram::*;

pub use chart::{chart_title, MeteogramChart};
pub use derivation::{derive_forecast, KELVIN_OFFSET};
pub use export::{csv_bytes, json_bytes, StagedOutputs};

pub use dataset::address::{DatasetAddress, DEFAULT_BASE_URL};
pub use dataset::das::{AttributeValue, DatasetAttributes};
pub use dataset::dds::{DatasetSchema, Dimension, VariableShape};
pub use dataset::error::DatasetError;
pub use dataset::loader::GridDataset;
pub use dataset::time_units::{TimeStep, TimeUnits};

pub use extract::locate_cell::locate_cell;
pub use extract::point_extractor::extract_point;

pub use types::forecast_series::ForecastSeries;
pub use types::raw_point::{GridPoint, RawPoint};
pub use types::request::{
    default_model_date, parse_model_date, FetchRequest, LatLon, ModelHour, DEFAULT_LATITUDE,
    DEFAULT_LONGITUDE,
};
pub use types::variable::ForecastVariable;
