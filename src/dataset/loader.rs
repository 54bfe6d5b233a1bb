use crate::dataset::address::DatasetAddress;
use crate::dataset::ascii::{parse_ascii, AsciiSection};
use crate::dataset::das::DatasetAttributes;
use crate::dataset::dds::DatasetSchema;
use crate::dataset::error::DatasetError;
use crate::dataset::time_units::TimeUnits;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::Client;

pub const TIME_AXIS: &str = "time";
pub const LATITUDE_AXIS: &str = "lat";
pub const LONGITUDE_AXIS: &str = "lon";

/// Relative tolerance when comparing a value against the fill value. GDS sends
/// single-precision fill values (`9.999E20`) that do not round-trip exactly.
const FILL_TOLERANCE: f64 = 1.0e-6;

/// An opened remote dataset: its schema, attributes and decoded coordinate axes.
///
/// Opening downloads everything needed to select a grid cell. Variable data is
/// downloaded on demand, one cell at a time, with [`GridDataset::point_series`].
#[derive(Debug, Clone)]
pub struct GridDataset {
    http: Client,
    address: DatasetAddress,
    schema: DatasetSchema,
    attributes: DatasetAttributes,
    times: Vec<DateTime<Utc>>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
}

impl GridDataset {
    /// Downloads the schema, the attributes and the `time`, `lat` and `lon` axes.
    ///
    /// # Errors
    ///
    /// Fails on any transport error, on a server error document, on a malformed
    /// response, when a coordinate axis is missing or empty, or when the time axis
    /// cannot be decoded.
    pub async fn open(http: &Client, address: DatasetAddress) -> Result<Self, DatasetError> {
        let dds_url = address.dds_url();
        let schema = DatasetSchema::parse(&get_text(http, &dds_url).await?, &dds_url)?;

        let das_url = address.das_url();
        let attributes = DatasetAttributes::parse(&get_text(http, &das_url).await?, &das_url)?;

        for axis in [TIME_AXIS, LATITUDE_AXIS, LONGITUDE_AXIS] {
            if !schema.contains(axis) {
                return Err(DatasetError::MissingCoordinate(axis.to_string()));
            }
        }

        let units = attributes
            .text(TIME_AXIS, "units")
            .ok_or_else(|| DatasetError::MissingAttribute {
                variable: TIME_AXIS.to_string(),
                attribute: "units".to_string(),
            })?;
        let units = TimeUnits::parse(units)?;
        debug!("Time axis counts {:?} since {}", units.step(), units.epoch());

        let raw_times = fetch_axis(http, &address, TIME_AXIS).await?;
        let times = units.decode_all(&raw_times)?;
        let latitudes = fetch_axis(http, &address, LATITUDE_AXIS).await?;
        let longitudes = fetch_axis(http, &address, LONGITUDE_AXIS).await?;

        info!(
            "Opened {} ({} time steps, {}x{} grid)",
            address.url(),
            times.len(),
            latitudes.len(),
            longitudes.len()
        );

        Ok(Self {
            http: http.clone(),
            address,
            schema,
            attributes,
            times,
            latitudes,
            longitudes,
        })
    }

    pub fn address(&self) -> &DatasetAddress {
        &self.address
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    /// Downloads the full time series of `name` at one grid cell.
    ///
    /// Any dimension other than time, latitude and longitude (e.g. a vertical
    /// level) is pinned to its first index. Values equal to the variable's fill
    /// value are returned as `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownVariable`] if `name` is not in the schema, a
    /// transport or server error if the download fails, and
    /// [`DatasetError::MalformedResponse`] if the response does not hold exactly
    /// the requested number of values.
    pub async fn point_series(
        &self,
        name: &str,
        lat_index: usize,
        lon_index: usize,
    ) -> Result<Vec<f64>, DatasetError> {
        let shape = self
            .schema
            .variable(name)
            .ok_or_else(|| DatasetError::UnknownVariable(name.to_string()))?;

        let mut constraint = name.to_string();
        let mut expected = 1;
        for dimension in &shape.dimensions {
            let (start, stop) = match dimension.name.as_str() {
                TIME_AXIS => (0, dimension.size.saturating_sub(1)),
                LATITUDE_AXIS => (lat_index, lat_index),
                LONGITUDE_AXIS => (lon_index, lon_index),
                _ => (0, 0),
            };
            expected *= stop - start + 1;
            constraint.push_str(&format!("[{start}:{stop}]"));
        }

        let url = self.address.ascii_url(&constraint);
        debug!("Downloading {} from {}", name, url);
        let sections = parse_ascii(&get_text(&self.http, &url).await?, &url)?;
        let section = take_section(sections, name, &url)?;
        if section.values.len() != expected {
            return Err(DatasetError::MalformedResponse {
                url,
                message: format!(
                    "expected {} values for '{}', received {}",
                    expected,
                    name,
                    section.values.len()
                ),
            });
        }

        let values = match self.attributes.fill_value(name) {
            Some(fill) => section
                .values
                .into_iter()
                .map(|v| if is_fill(v, fill) { f64::NAN } else { v })
                .collect(),
            None => section.values,
        };
        Ok(values)
    }
}

fn is_fill(value: f64, fill: f64) -> bool {
    value == fill || (value - fill).abs() <= fill.abs() * FILL_TOLERANCE
}

async fn fetch_axis(
    http: &Client,
    address: &DatasetAddress,
    axis: &str,
) -> Result<Vec<f64>, DatasetError> {
    let url = address.ascii_url(axis);
    let sections = parse_ascii(&get_text(http, &url).await?, &url)?;
    let section = take_section(sections, axis, &url)?;
    if section.values.is_empty() {
        return Err(DatasetError::EmptyAxis(axis.to_string()));
    }
    Ok(section.values)
}

fn take_section(
    sections: Vec<AsciiSection>,
    name: &str,
    url: &str,
) -> Result<AsciiSection, DatasetError> {
    sections
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| DatasetError::MalformedResponse {
            url: url.to_string(),
            message: format!("no section for '{name}'"),
        })
}

/// GETs `url` and returns the body, turning HTTP failures and GDS error documents
/// into errors.
async fn get_text(http: &Client, url: &str) -> Result<String, DatasetError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| DatasetError::NetworkRequest(url.to_string(), e))?;

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            warn!("HTTP error for {}: {:?}", url, e);
            return Err(if let Some(status) = e.status() {
                DatasetError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                DatasetError::NetworkRequest(url.to_string(), e)
            });
        }
    };

    let body = response
        .text()
        .await
        .map_err(|e| DatasetError::NetworkRequest(url.to_string(), e))?;
    check_error_document(&body, url)?;
    Ok(body)
}

/// GDS reports unknown datasets and bad constraints with a `200 OK` carrying
/// `Error { code = ...; message = "..."; };`, and some proxies answer with HTML.
fn check_error_document(body: &str, url: &str) -> Result<(), DatasetError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with("Error") {
        let message = trimmed
            .split_once("message")
            .and_then(|(_, rest)| rest.split_once('"'))
            .and_then(|(_, rest)| rest.split_once('"'))
            .map(|(message, _)| message.trim().to_string())
            .unwrap_or_else(|| trimmed.lines().take(3).collect::<Vec<_>>().join(" "));
        warn!("Data server error for {}: {}", url, message);
        return Err(DatasetError::ServerError {
            url: url.to_string(),
            message,
        });
    }
    if trimmed.starts_with('<') {
        return Err(DatasetError::MalformedResponse {
            url: url.to_string(),
            message: "received an HTML page instead of dataset content".into(),
        });
    }
    Ok(())
}
