use polars::error::PolarsError;
use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every stage of the forecast pipeline.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error(transparent)]
    Io(#[from] IoError),
}

impl ForecastError {
    /// Short name of the failure kind, used as the prefix of user-facing reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::InvalidInput(_) => "invalid input",
            ForecastError::Api { .. } => "api error",
            ForecastError::Transport(_) => "transport error",
            ForecastError::Flatten(_) => "flatten error",
            ForecastError::Io(_) => "io error",
        }
    }
}

#[derive(Debug, Error)]
pub enum InvalidInputError {
    #[error("{axis} '{input}' is not a number")]
    NotANumber {
        axis: &'static str,
        input: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("{axis} {value} is outside [{min}, {max}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("response body is not valid JSON")]
    MalformedBody(#[source] serde_json::Error),

    #[error("response has no '{0}' section")]
    MissingSection(&'static str),

    #[error("'{section}' section has no '{field}' field")]
    MissingField {
        section: &'static str,
        field: String,
    },

    #[error("'hourly.{0}' is not an array")]
    NotAnArray(String),

    #[error("'hourly.{field}' has {found} values but 'hourly.time' has {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("'{field}' holds a value that is not a scalar or mixes value types")]
    UnsupportedValue { field: String },

    #[error("failed to assemble the forecast table")]
    Frame(#[from] PolarsError),
}

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to create '{0}'")]
    Create(PathBuf, #[source] std::io::Error),

    #[error("failed to write CSV to '{0}'")]
    WriteCsv(PathBuf, #[source] PolarsError),

    #[error("failed to read CSV from '{0}'")]
    ReadCsv(PathBuf, #[source] PolarsError),

    #[error("CSV '{path}' has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("failed to write chart to '{0}'")]
    WriteHtml(PathBuf, #[source] std::io::Error),
}
