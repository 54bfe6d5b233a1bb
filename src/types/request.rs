//! Defines the immutable request value that drives one fetch-derive-render cycle:
//! the model run (date and synoptic hour) and the geographic point of interest.

use crate::error::MeteogramError;
use bon::Builder;
use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Latitude used when no latitude is supplied (Jakarta).
pub const DEFAULT_LATITUDE: f64 = -6.20;
/// Longitude used when no longitude is supplied (Jakarta).
pub const DEFAULT_LONGITUDE: f64 = 106.80;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are signed decimal degrees. Longitude may be given either in the
/// `-180..180` or the `0..360` convention; it is mapped onto the dataset's own
/// convention when the nearest grid cell is located.
///
/// # Examples
///
/// ```
/// use gfs_meteogram::LatLon;
///
/// let jakarta = LatLon(-6.20, 106.80);
/// assert_eq!(jakarta.0, -6.20); // Latitude
/// assert_eq!(jakarta.1, 106.80); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(self) -> f64 {
        self.0
    }

    pub fn longitude(self) -> f64 {
        self.1
    }
}

impl Default for LatLon {
    fn default() -> Self {
        LatLon(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

/// One of the four synoptic hours at which a GFS run is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ModelHour {
    #[default]
    #[serde(rename = "00")]
    H00,
    #[serde(rename = "06")]
    H06,
    #[serde(rename = "12")]
    H12,
    #[serde(rename = "18")]
    H18,
}

impl ModelHour {
    pub const ALL: [ModelHour; 4] = [ModelHour::H00, ModelHour::H06, ModelHour::H12, ModelHour::H18];

    /// The two-digit form used in dataset paths and chart titles (e.g. `"06"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelHour::H00 => "00",
            ModelHour::H06 => "06",
            ModelHour::H12 => "12",
            ModelHour::H18 => "18",
        }
    }
}

/// Formats a `ModelHour` as its two-digit form.
///
/// # Examples
///
/// ```
/// use gfs_meteogram::ModelHour;
///
/// assert_eq!(ModelHour::H06.to_string(), "06");
/// ```
impl fmt::Display for ModelHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelHour {
    type Err = MeteogramError;

    /// Accepts `"00"`, `"06"`, `"12"`, `"18"` as well as the unpadded `"0"` and `"6"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches(['z', 'Z']) {
            "00" | "0" => Ok(ModelHour::H00),
            "06" | "6" => Ok(ModelHour::H06),
            "12" => Ok(ModelHour::H12),
            "18" => Ok(ModelHour::H18),
            other => Err(MeteogramError::InvalidRequest(format!(
                "model hour must be one of 00, 06, 12, 18 (got '{other}')"
            ))),
        }
    }
}

/// Parses a model date written as eight digits, `YYYYMMDD`.
///
/// # Errors
///
/// Returns [`MeteogramError::InvalidRequest`] if the input is not eight ASCII digits
/// or does not name a real calendar date.
pub fn parse_model_date(input: &str) -> Result<NaiveDate, MeteogramError> {
    let s = input.trim();
    let invalid = || {
        MeteogramError::InvalidRequest(format!("model date must be YYYYMMDD (got '{s}')"))
    };
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = s[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = s[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = s[6..8].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// The default model date: yesterday in UTC, so that the run has been published.
pub fn default_model_date() -> NaiveDate {
    let today = Utc::now().date_naive();
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// Everything needed to produce one meteogram.
///
/// A `FetchRequest` is a plain value: it is built once per user action and passed by
/// reference through the fetch, extraction, derivation and rendering steps. Nothing in
/// the pipeline keeps it beyond the current request.
///
/// # Examples
///
/// ```
/// use gfs_meteogram::{FetchRequest, LatLon, ModelHour};
/// use chrono::NaiveDate;
///
/// let request = FetchRequest::builder()
///     .date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
///     .hour(ModelHour::H12)
///     .location(LatLon(52.1, 5.18))
///     .build();
/// assert_eq!(request.date_code(), "20240201");
///
/// // Omitted fields fall back to yesterday, 00Z and Jakarta.
/// let defaults = FetchRequest::builder().build();
/// assert_eq!(defaults.hour, ModelHour::H00);
/// assert_eq!(defaults.location, LatLon(-6.20, 106.80));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Builder)]
pub struct FetchRequest {
    /// Model run date (UTC).
    #[builder(default = default_model_date())]
    pub date: NaiveDate,
    /// Model run initialisation hour.
    #[builder(default)]
    pub hour: ModelHour,
    /// Point of interest.
    #[builder(default)]
    pub location: LatLon,
}

impl FetchRequest {
    /// The run date as it appears in dataset paths and titles, `YYYYMMDD`.
    pub fn date_code(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }
}

impl Default for FetchRequest {
    fn default() -> Self {
        FetchRequest::builder().build()
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GFS {} {}Z @ {:.2}, {:.2}",
            self.date_code(),
            self.hour,
            self.location.0,
            self.location.1
        )
    }
}
