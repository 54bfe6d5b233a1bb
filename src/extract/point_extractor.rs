use crate::dataset::loader::GridDataset;
use crate::error::MeteogramError;
use crate::extract::locate_cell::locate_cell;
use crate::types::raw_point::{GridPoint, RawPoint};
use crate::types::request::LatLon;
use crate::types::variable::ForecastVariable;
use log::{debug, info};

/// Downloads the full time series of every required variable at the grid cell
/// nearest `location`.
///
/// The schema is checked for all variables before anything is downloaded, so a
/// dataset lacking one of them costs no data requests.
///
/// # Errors
///
/// - [`MeteogramError::VariableMissing`] if a required variable is not in the dataset.
/// - [`MeteogramError::DataUnavailable`] if a download fails or returns unusable data.
/// - [`MeteogramError::MisalignedSeries`] if a series does not match the time axis.
pub async fn extract_point(
    dataset: &GridDataset,
    location: LatLon,
) -> Result<RawPoint, MeteogramError> {
    let url = dataset.address().url();

    if let Some(missing) = ForecastVariable::REQUIRED
        .iter()
        .find(|v| !dataset.has_variable(v.dataset_name()))
    {
        return Err(MeteogramError::VariableMissing {
            variable: missing.dataset_name().to_string(),
            url: url.to_string(),
        });
    }

    let grid_point = locate_cell(dataset.latitudes(), dataset.longitudes(), location).map_err(
        |source| MeteogramError::DataUnavailable {
            url: url.to_string(),
            source,
        },
    )?;
    info!(
        "Nearest grid cell to ({:.2}, {:.2}) is ({:.2}, {:.2}), {:.1} km away",
        location.latitude(),
        location.longitude(),
        grid_point.cell.latitude(),
        grid_point.cell.longitude(),
        grid_point.distance_km
    );

    let point = RawPoint {
        grid_point,
        timestamps: dataset.times().to_vec(),
        temperature_k: download(dataset, &grid_point, ForecastVariable::Temperature2m).await?,
        relative_humidity: download(dataset, &grid_point, ForecastVariable::RelativeHumidity2m)
            .await?,
        cloud_cover: download(dataset, &grid_point, ForecastVariable::TotalCloudCover).await?,
        wind_u: download(dataset, &grid_point, ForecastVariable::WindU10m).await?,
        wind_v: download(dataset, &grid_point, ForecastVariable::WindV10m).await?,
        precip_cumulative: download(dataset, &grid_point, ForecastVariable::AccumulatedPrecipitation)
            .await?,
    };
    point.check_alignment()?;
    Ok(point)
}

async fn download(
    dataset: &GridDataset,
    grid_point: &GridPoint,
    variable: ForecastVariable,
) -> Result<Vec<f64>, MeteogramError> {
    debug!("Extracting {} ({})", variable, variable.unit());
    dataset
        .point_series(
            variable.dataset_name(),
            grid_point.lat_index,
            grid_point.lon_index,
        )
        .await
        .map_err(|source| MeteogramError::DataUnavailable {
            url: dataset.address().url().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::tests::{address, mock_open, mock_point, RUN_PATH};
    use crate::dataset::error::DatasetError;
    use mockito::Matcher;
    use reqwest::Client;

    const ALL: [&str; 6] = ["tmp2m", "rh2m", "tcdcclm", "ugrd10m", "vgrd10m", "apcpsfc"];

    #[tokio::test]
    async fn test_extracts_nearest_cell() -> Result<(), MeteogramError> {
        let mut server = mockito::Server::new_async().await;
        let _open = mock_open(&mut server, &ALL).await;
        let _tmp = mock_point(&mut server, "tmp2m", &[298.0, 299.0, 300.0, 301.0, 302.0]).await;
        let _rh = mock_point(&mut server, "rh2m", &[80.0, 81.0, 82.0, 83.0, 84.0]).await;
        let _cloud = mock_point(&mut server, "tcdcclm", &[0.0, 10.0, 20.0, 30.0, 40.0]).await;
        let _u = mock_point(&mut server, "ugrd10m", &[1.0, 1.0, 1.0, 1.0, 1.0]).await;
        let _v = mock_point(&mut server, "vgrd10m", &[0.0, 0.0, 0.0, 0.0, 0.0]).await;
        let _rain = mock_point(&mut server, "apcpsfc", &[0.0, 0.0, 1.0, 1.0, 3.0]).await;

        let dataset = GridDataset::open(&Client::new(), address(&server))
            .await
            .map_err(|source| MeteogramError::DataUnavailable {
                url: "test".into(),
                source,
            })?;
        let point = extract_point(&dataset, LatLon(-6.2, 106.8)).await?;

        assert_eq!(point.grid_point.lat_index, 1);
        assert_eq!(point.grid_point.lon_index, 1);
        assert_eq!(point.grid_point.cell, LatLon(-6.25, 106.75));
        assert_eq!(point.len(), 5);
        assert_eq!(point.temperature_k, vec![298.0, 299.0, 300.0, 301.0, 302.0]);
        assert_eq!(point.relative_humidity[4], 84.0);
        assert_eq!(point.precip_cumulative, vec![0.0, 0.0, 1.0, 1.0, 3.0]);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_variable_is_reported_before_downloads() {
        let mut server = mockito::Server::new_async().await;
        let _open = mock_open(&mut server, &["tmp2m", "rh2m", "tcdcclm", "ugrd10m", "vgrd10m"]).await;
        let data = server
            .mock("GET", format!("{RUN_PATH}.ascii").as_str())
            .match_query(Matcher::Regex("\\[".into()))
            .expect(0)
            .create_async()
            .await;

        let dataset = GridDataset::open(&Client::new(), address(&server)).await.unwrap();
        match extract_point(&dataset, LatLon(-6.2, 106.8)).await {
            Err(MeteogramError::VariableMissing { variable, url }) => {
                assert_eq!(variable, "apcpsfc");
                assert!(url.ends_with(RUN_PATH), "{url}");
            }
            other => panic!("expected VariableMissing, got {other:?}"),
        }
        data.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_download_is_data_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _open = mock_open(&mut server, &ALL).await;
        let _tmp = mock_point(&mut server, "tmp2m", &[298.0, 299.0, 300.0, 301.0, 302.0]).await;
        let _rh = server
            .mock("GET", format!("{RUN_PATH}.ascii").as_str())
            .match_query(Matcher::Regex("^rh2m\\[".into()))
            .with_status(500)
            .create_async()
            .await;

        let dataset = GridDataset::open(&Client::new(), address(&server)).await.unwrap();
        match extract_point(&dataset, LatLon(-6.2, 106.8)).await {
            Err(MeteogramError::DataUnavailable {
                source: DatasetError::HttpStatus { status, .. },
                ..
            }) => assert_eq!(status.as_u16(), 500),
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }
}
