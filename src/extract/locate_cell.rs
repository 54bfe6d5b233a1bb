use crate::dataset::error::DatasetError;
use crate::dataset::loader::{LATITUDE_AXIS, LONGITUDE_AXIS};
use crate::types::raw_point::GridPoint;
use crate::types::request::LatLon;
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;

/// Index of the axis value closest to `target` under `separation`.
///
/// NaN axis values are never selected. When two values are equally close the
/// later one wins.
pub fn nearest_index_by<F>(axis: &[f64], target: f64, separation: F) -> Option<usize>
where
    F: Fn(f64, f64) -> f64,
{
    axis.iter()
        .enumerate()
        .rev()
        .filter(|(_, value)| !value.is_nan())
        .min_by_key(|(_, value)| OrderedFloat(separation(**value, target)))
        .map(|(index, _)| index)
}

pub fn nearest_latitude_index(latitudes: &[f64], latitude: f64) -> Option<usize> {
    nearest_index_by(latitudes, latitude, |a, b| (a - b).abs())
}

/// Longitudes are compared on the circle, so a request of `-0.1` matches a
/// `359.75` grid column and a request of `350` matches `-10` on a −180–180 grid.
pub fn nearest_longitude_index(longitudes: &[f64], longitude: f64) -> Option<usize> {
    nearest_index_by(longitudes, longitude, angular_separation)
}

/// Smallest angle in degrees between two longitudes, in `[0, 180]`.
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Selects the grid cell nearest `location` on a regular latitude/longitude grid.
///
/// # Errors
///
/// Returns [`DatasetError::EmptyAxis`] if an axis holds no usable value.
pub fn locate_cell(
    latitudes: &[f64],
    longitudes: &[f64],
    location: LatLon,
) -> Result<GridPoint, DatasetError> {
    let lat_index = nearest_latitude_index(latitudes, location.latitude())
        .ok_or_else(|| DatasetError::EmptyAxis(LATITUDE_AXIS.to_string()))?;
    let lon_index = nearest_longitude_index(longitudes, location.longitude())
        .ok_or_else(|| DatasetError::EmptyAxis(LONGITUDE_AXIS.to_string()))?;
    let cell = LatLon(latitudes[lat_index], longitudes[lon_index]);

    let distance_km = distance(
        HaversineLocation {
            latitude: location.latitude(),
            longitude: location.longitude(),
        },
        HaversineLocation {
            latitude: cell.latitude(),
            longitude: cell.longitude(),
        },
        Units::Kilometers,
    );

    Ok(GridPoint {
        requested: location,
        cell,
        lat_index,
        lon_index,
        distance_km,
    })
}
