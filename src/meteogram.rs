//! Main entry point: fetch a GFS point forecast and turn it into a meteogram.
//!
//! A [`Meteogram`] client holds the HTTP client and the data server address. Each
//! call runs the whole pipeline for one [`FetchRequest`]: open the model run's
//! dataset, extract the nearest grid cell, derive the plotted series and,
//! optionally, build the chart.

use crate::chart::MeteogramChart;
use crate::dataset::address::{DatasetAddress, DEFAULT_BASE_URL};
use crate::dataset::loader::GridDataset;
use crate::derivation::derive_forecast;
use crate::error::MeteogramError;
use crate::extract::point_extractor::extract_point;
use crate::types::forecast_series::ForecastSeries;
use crate::types::raw_point::RawPoint;
use crate::types::request::{default_model_date, FetchRequest, LatLon, ModelHour};
use bon::bon;
use chrono::NaiveDate;
use log::info;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("gfs-meteogram/", env!("CARGO_PKG_VERSION"));

/// Client for fetching GFS point forecasts from a GrADS Data Server.
///
/// Requests are independent: nothing is cached between them and each one opens
/// the model run's dataset afresh.
///
/// # Examples
///
/// ```no_run
/// # use gfs_meteogram::{FetchRequest, LatLon, Meteogram, MeteogramError, ModelHour};
/// # #[tokio::main]
/// # async fn main() -> Result<(), MeteogramError> {
/// let client = Meteogram::new()?;
/// let request = FetchRequest::builder()
///     .hour(ModelHour::H06)
///     .location(LatLon(-6.20, 106.80))
///     .build();
///
/// let forecast = client.forecast(&request).await?;
/// println!("{}", forecast.to_frame()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Meteogram {
    http: Client,
    base_url: String,
}

#[bon]
impl Meteogram {
    /// Creates a client for the public NOMADS server, without a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::HttpClient`] if the HTTP client cannot be initialised.
    pub fn new() -> Result<Self, MeteogramError> {
        Self::configured().call()
    }

    /// Creates a client with custom settings.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.base_url(impl Into<String>)`: Optional. Root of the GFS hourly datasets.
    ///   Defaults to [`DEFAULT_BASE_URL`].
    /// * `.user_agent(impl Into<String>)`: Optional. Sent with every request.
    /// * `.timeout(Duration)`: Optional. Per-request timeout. No timeout by default.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::HttpClient`] if the HTTP client cannot be initialised.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gfs_meteogram::{Meteogram, MeteogramError};
    /// # use std::time::Duration;
    /// let client = Meteogram::configured()
    ///     .base_url("http://localhost:8080/dods/gfs_0p25_1hr/")
    ///     .timeout(Duration::from_secs(30))
    ///     .call()?;
    /// assert_eq!(client.base_url(), "http://localhost:8080/dods/gfs_0p25_1hr");
    /// # Ok::<(), MeteogramError>(())
    /// ```
    #[builder]
    pub fn configured(
        #[builder(into)] base_url: Option<String>,
        #[builder(into)] user_agent: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, MeteogramError> {
        let mut http = Client::builder()
            .user_agent(user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .gzip(true);
        if let Some(timeout) = timeout {
            http = http.timeout(timeout);
        }
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            http: http.build().map_err(MeteogramError::HttpClient)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The dataset address a request resolves to.
    pub fn address(&self, request: &FetchRequest) -> DatasetAddress {
        DatasetAddress::for_request(&self.base_url, request)
    }

    /// Opens the dataset of the requested model run.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::DataUnavailable`] if the run cannot be reached or its
    /// schema, attributes or coordinate axes cannot be read.
    pub async fn open_dataset(&self, request: &FetchRequest) -> Result<GridDataset, MeteogramError> {
        let address = self.address(request);
        let url = address.url().to_string();
        info!("Fetching data from: {}", url);
        GridDataset::open(&self.http, address)
            .await
            .map_err(|source| MeteogramError::DataUnavailable { url, source })
    }

    /// Downloads the raw series of the grid cell nearest the requested location.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::DataUnavailable`] or [`MeteogramError::VariableMissing`].
    pub async fn extract(&self, request: &FetchRequest) -> Result<RawPoint, MeteogramError> {
        let dataset = self.open_dataset(request).await?;
        extract_point(&dataset, request.location).await
    }

    /// Runs the fetch, extract and derive steps for one request.
    ///
    /// # Errors
    ///
    /// Any error of [`Meteogram::extract`], plus [`MeteogramError::InsufficientData`]
    /// when the run has fewer than two time steps.
    pub async fn forecast(&self, request: &FetchRequest) -> Result<ForecastSeries, MeteogramError> {
        let raw = self.extract(request).await?;
        let forecast = derive_forecast(&raw)?;
        info!(
            "Derived {} hourly steps for {}",
            forecast.len(),
            request
        );
        Ok(forecast)
    }

    /// Runs the whole pipeline and builds the chart.
    ///
    /// # Errors
    ///
    /// Same as [`Meteogram::forecast`]. No chart is produced on failure.
    pub async fn render(&self, request: &FetchRequest) -> Result<MeteogramChart, MeteogramError> {
        let forecast = self.forecast(request).await?;
        Ok(MeteogramChart::new(&forecast, request))
    }

    /// Fetches a derived forecast for a location, with the run defaulting to
    /// yesterday's 00Z.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point of interest.
    /// * `.date(NaiveDate)`: Optional. Model run date. Defaults to yesterday (UTC).
    /// * `.hour(ModelHour)`: Optional. Model run hour. Defaults to [`ModelHour::H00`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use gfs_meteogram::{LatLon, Meteogram, MeteogramError, ModelHour};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), MeteogramError> {
    /// let client = Meteogram::new()?;
    /// let forecast = client
    ///     .point_forecast()
    ///     .location(LatLon(52.37, 4.89))
    ///     .hour(ModelHour::H12)
    ///     .call()
    ///     .await?;
    /// println!("{} steps", forecast.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn point_forecast(
        &self,
        location: LatLon,
        date: Option<NaiveDate>,
        hour: Option<ModelHour>,
    ) -> Result<ForecastSeries, MeteogramError> {
        let request = FetchRequest {
            date: date.unwrap_or_else(default_model_date),
            hour: hour.unwrap_or_default(),
            location,
        };
        self.forecast(&request).await
    }
}
