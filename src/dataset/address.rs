//! Construction of GrADS Data Server URLs for a GFS run.

use crate::types::request::{FetchRequest, ModelHour};
use chrono::NaiveDate;

/// NOMADS endpoint for the 0.25° GFS product with hourly output.
pub const DEFAULT_BASE_URL: &str = "https://nomads.ncep.noaa.gov/dods/gfs_0p25_1hr";

/// Product identifier used in the per-run dataset name.
const PRODUCT: &str = "gfs_0p25_1hr";

/// Address of one model run's dataset on a GrADS Data Server.
///
/// The dataset lives at `{base}/gfs{YYYYMMDD}/gfs_0p25_1hr_{HH}z`; its schema,
/// attributes and data are reached by appending `.dds`, `.das` and
/// `.ascii?{constraint}` to that URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetAddress {
    url: String,
}

impl DatasetAddress {
    pub fn new(base_url: &str, date: NaiveDate, hour: ModelHour) -> Self {
        let url = format!(
            "{}/gfs{}/{}_{}z",
            base_url.trim_end_matches('/'),
            date.format("%Y%m%d"),
            PRODUCT,
            hour
        );
        Self { url }
    }

    pub fn for_request(base_url: &str, request: &FetchRequest) -> Self {
        Self::new(base_url, request.date, request.hour)
    }

    /// The dataset URL itself, as shown to the user.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn dds_url(&self) -> String {
        format!("{}.dds", self.url)
    }

    pub fn das_url(&self) -> String {
        format!("{}.das", self.url)
    }

    /// URL returning the ASCII rendering of `constraint` (e.g. `tmp2m[0:120][335:335][427:427]`).
    pub fn ascii_url(&self, constraint: &str) -> String {
        format!("{}.ascii?{}", self.url, constraint)
    }
}
