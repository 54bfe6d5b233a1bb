use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // GDS answers missing runs and bad constraints with an `Error { ... }` document
    #[error("Data server reported an error for {url}: {message}")]
    ServerError { url: String, message: String },

    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    #[error("Attribute '{attribute}' of '{variable}' not found")]
    MissingAttribute { variable: String, attribute: String },

    #[error("Unsupported time units '{0}'")]
    InvalidTimeUnits(String),

    #[error("Time value {value} cannot be represented with units '{units}'")]
    TimeOutOfRange { value: f64, units: String },

    #[error("Variable '{0}' not found in dataset schema")]
    UnknownVariable(String),

    #[error("Coordinate '{0}' not found in dataset schema")]
    MissingCoordinate(String),

    #[error("Coordinate axis '{0}' is empty")]
    EmptyAxis(String),
}
