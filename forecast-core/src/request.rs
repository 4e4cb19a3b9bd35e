use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Fields requested from the API, grouped by cadence.
///
/// Example TOML:
/// [fields]
/// current = ["temperature_2m", "wind_speed_10m"]
/// hourly = ["temperature_2m", "relative_humidity_2m", "wind_speed_10m"]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub current: Vec<String>,
    pub hourly: Vec<String>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            current: vec!["temperature_2m".into(), "wind_speed_10m".into()],
            hourly: vec![
                "temperature_2m".into(),
                "relative_humidity_2m".into(),
                "wind_speed_10m".into(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub base_url: String,
    pub coordinate: Coordinate,
    pub fields: FieldSelection,
}

impl ForecastRequest {
    pub fn new(base_url: impl Into<String>, coordinate: Coordinate, fields: FieldSelection) -> Self {
        Self {
            base_url: base_url.into(),
            coordinate,
            fields,
        }
    }

    /// Fully-qualified query URL. Coordinates are written as plain decimal text.
    pub fn url(&self) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}&hourly={}",
            self.base_url,
            self.coordinate.latitude(),
            self.coordinate.longitude(),
            self.fields.current.join(","),
            self.fields.hourly.join(","),
        )
    }
}
