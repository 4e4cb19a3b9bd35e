//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Coordinate validation and request building for the Open-Meteo forecast API
//! - Flattening of the JSON response into a table, CSV output and charting
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod chart;
pub mod client;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod flatten;
pub mod model;
pub mod pipeline;
pub mod request;
pub mod table;

pub use chart::ChartOutput;
pub use client::{ForecastClient, HttpTransport, RawResponse, Transport};
pub use config::Config;
pub use coordinate::{Coordinate, RangeCheck};
pub use error::{FlattenError, ForecastError, InvalidInputError, IoError, TransportError};
pub use flatten::FlattenMode;
pub use model::ForecastResponse;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineSettings};
pub use request::{FieldSelection, ForecastRequest};
pub use table::ForecastTable;
