pub mod forecast_series;
pub mod raw_point;
pub mod request;
pub mod variable;
