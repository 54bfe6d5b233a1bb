//! Meteogram figure built with plotly.

use crate::error::MeteogramError;
use crate::types::forecast_series::ForecastSeries;
use crate::types::request::FetchRequest;
use chrono::{DateTime, Utc};
use log::info;
use plotly::color::NamedColor;
use plotly::common::{DashType, Line, Marker, Title};
use plotly::layout::{Axis, HoverMode};
use plotly::{Bar, Layout, Plot, Scatter};
use std::path::Path;

const CHART_HEIGHT: usize = 700;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Title shown above the chart, e.g. `Meteogram @ Lat -6.20, Lon 106.80 | GFS 20240201 00Z`.
pub fn chart_title(request: &FetchRequest) -> String {
    format!(
        "Meteogram @ Lat {:.2}, Lon {:.2} | GFS {} {}Z",
        request.location.latitude(),
        request.location.longitude(),
        request.date_code(),
        request.hour
    )
}

/// A rendered meteogram: four line traces over the full time axis and an hourly
/// precipitation bar trace over all but the first timestamp.
pub struct MeteogramChart {
    title: String,
    plot: Plot,
}

impl MeteogramChart {
    pub fn new(forecast: &ForecastSeries, request: &FetchRequest) -> Self {
        let title = chart_title(request);
        let times = time_labels(&forecast.timestamps);
        let precip_times = time_labels(forecast.precip_timestamps());

        let mut plot = Plot::new();
        plot.add_trace(
            Scatter::new(times.clone(), forecast.temperature.clone())
                .name("Temp (°C)")
                .line(Line::new().color(NamedColor::Red)),
        );
        plot.add_trace(
            Scatter::new(times.clone(), forecast.relative_humidity.clone())
                .name("RH (%)")
                .line(Line::new().color(NamedColor::Blue)),
        );
        plot.add_trace(
            Scatter::new(times.clone(), forecast.wind_speed.clone())
                .name("Wind (m/s)")
                .line(Line::new().color(NamedColor::Green)),
        );
        plot.add_trace(
            Scatter::new(times, forecast.cloud_cover.clone())
                .name("Cloud Cover (%)")
                .line(Line::new().color(NamedColor::Gray).dash(DashType::Dot)),
        );
        plot.add_trace(
            Bar::new(precip_times, forecast.precip_hourly.clone())
                .name("Rain (mm/hr)")
                .marker(Marker::new().color(NamedColor::Cyan)),
        );

        plot.set_layout(
            Layout::new()
                .title(Title::with_text(&title))
                .x_axis(Axis::new().title(Title::with_text("Time (UTC)")))
                .y_axis(Axis::new().title(Title::with_text("Value")))
                .height(CHART_HEIGHT)
                .hover_mode(HoverMode::XUnified),
        );

        Self { title, plot }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Standalone HTML page embedding the figure.
    pub fn to_html(&self) -> String {
        self.plot.to_html()
    }

    /// The figure as plotly JSON (`{"data": [...], "layout": {...}}`).
    pub fn to_json(&self) -> String {
        self.plot.to_json()
    }

    /// Writes the standalone HTML page to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::ChartWrite`] if the file cannot be written.
    pub fn write_html(&self, path: &Path) -> Result<(), MeteogramError> {
        std::fs::write(path, self.to_html())
            .map_err(|e| MeteogramError::ChartWrite(path.to_path_buf(), e))?;
        info!("Wrote chart to {}", path.display());
        Ok(())
    }

    /// Opens the figure in the default browser.
    pub fn show(&self) {
        self.plot.show();
    }
}

fn time_labels(timestamps: &[DateTime<Utc>]) -> Vec<String> {
    timestamps
        .iter()
        .map(|t| t.format(TIME_FORMAT).to_string())
        .collect()
}
