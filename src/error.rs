use crate::dataset::error::DatasetError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteogramError {
    #[error("Forecast dataset unavailable at {url}")]
    DataUnavailable {
        url: String,
        #[source]
        source: DatasetError,
    },

    #[error("Required variable '{variable}' not found in dataset {url}")]
    VariableMissing { variable: String, url: String },

    #[error("At least 2 time steps are needed to derive hourly precipitation, found {found}")]
    InsufficientData { found: usize },

    #[error("Series '{series}' has {found} values but the time axis has {expected}")]
    MisalignedSeries {
        series: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),

    #[error("Failed to write chart to '{0}'")]
    ChartWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to write '{0}'")]
    Export(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode forecast as CSV")]
    CsvEncode(#[source] PolarsError),

    #[error("Failed to encode forecast as JSON")]
    JsonEncode(#[source] serde_json::Error),
}

/// Renders an error and its chain of sources as one line, the way the CLI shows it.
///
/// # Examples
///
/// ```
/// use gfs_meteogram::{error_report, MeteogramError};
///
/// let err = MeteogramError::InsufficientData { found: 1 };
/// assert_eq!(
///     error_report(&err),
///     "At least 2 time steps are needed to derive hourly precipitation, found 1"
/// );
/// ```
pub fn error_report(err: &(dyn std::error::Error + 'static)) -> String {
    let mut report = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        report.push_str(": ");
        report.push_str(&cause.to_string());
        source = cause.source();
    }
    report
}
