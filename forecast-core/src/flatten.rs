use polars::prelude::*;
use serde_json::Value;
use std::{convert::TryFrom, fmt};
use tracing::{debug, warn};

use crate::{
    error::FlattenError,
    model::ForecastResponse,
    request::FieldSelection,
    table::ForecastTable,
};

/// API field → output column for the hourly-series shape, in column order.
pub const HOURLY_SERIES_COLUMNS: [(&str, &str); 4] = [
    ("time", "time"),
    ("temperature_2m", "temperature"),
    ("relative_humidity_2m", "relative_humidity"),
    ("wind_speed_10m", "wind_speed"),
];

/// Prefix for snapshot columns in the wide-join shape, keeping them apart from hourly columns.
pub const CURRENT_PREFIX: &str = "current_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlattenMode {
    /// One row per hourly step; arrays must all match `hourly.time`.
    #[default]
    HourlySeries,
    /// Legacy shape: snapshot in row 0, hourly arrays beside it, padded or truncated.
    WideJoin,
}

impl FlattenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlattenMode::HourlySeries => "hourly-series",
            FlattenMode::WideJoin => "wide-join",
        }
    }

    pub const fn all() -> &'static [FlattenMode] {
        &[FlattenMode::HourlySeries, FlattenMode::WideJoin]
    }
}

impl fmt::Display for FlattenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FlattenMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "hourly-series" => Ok(FlattenMode::HourlySeries),
            "wide-join" => Ok(FlattenMode::WideJoin),
            _ => Err(anyhow::anyhow!(
                "Unknown flatten mode '{value}'. Supported modes: hourly-series, wide-join."
            )),
        }
    }
}

pub fn flatten(
    response: &ForecastResponse,
    mode: FlattenMode,
    fields: &FieldSelection,
) -> Result<ForecastTable, FlattenError> {
    let table = match mode {
        FlattenMode::HourlySeries => hourly_series(response)?,
        FlattenMode::WideJoin => wide_join(response, fields)?,
    };
    debug!(
        "Flattened response in {mode} mode: {} rows x {} columns",
        table.height(),
        table.width()
    );
    Ok(table)
}

fn hourly_series(response: &ForecastResponse) -> Result<ForecastTable, FlattenError> {
    let expected = response.hourly_array("time")?.len();

    let columns = HOURLY_SERIES_COLUMNS
        .iter()
        .map(|&(field, column)| {
            let values = response.hourly_array(field)?;
            if values.len() != expected {
                return Err(FlattenError::LengthMismatch {
                    field: field.to_string(),
                    expected,
                    found: values.len(),
                });
            }
            json_column(column, values)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ForecastTable::from_columns(columns)?)
}

fn wide_join(response: &ForecastResponse, fields: &FieldSelection) -> Result<ForecastTable, FlattenError> {
    let current = response.current()?;
    let hourly = response.hourly()?;
    let time = response.hourly_array("time")?;

    if let Some(field) = fields.current.iter().find(|f| !current.contains_key(f.as_str())) {
        return Err(FlattenError::MissingField {
            section: "current",
            field: field.clone(),
        });
    }
    if let Some(field) = fields.hourly.iter().find(|f| !hourly.contains_key(f.as_str())) {
        return Err(FlattenError::MissingField {
            section: "hourly",
            field: field.clone(),
        });
    }

    // The snapshot needs a row even when the hourly series is empty.
    let height = time.len().max(1);
    let mut columns = Vec::with_capacity(current.len() + hourly.len());

    for (field, value) in current {
        let mut values = vec![Value::Null; height];
        values[0] = value.clone();
        columns.push(json_column(&format!("{CURRENT_PREFIX}{field}"), &values)?);
    }

    for (field, value) in hourly {
        let array = value
            .as_array()
            .ok_or_else(|| FlattenError::NotAnArray(field.clone()))?;
        if array.len() != height {
            warn!(
                "hourly.{field} has {} values for {height} rows; {} to fit",
                array.len(),
                if array.len() < height { "padding with nulls" } else { "truncating" }
            );
        }
        let values: Vec<Value> = array
            .iter()
            .cloned()
            .chain(std::iter::repeat(Value::Null))
            .take(height)
            .collect();
        columns.push(json_column(field, &values)?);
    }

    Ok(ForecastTable::from_columns(columns)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Int,
    Float,
    Text,
    Bool,
}

/// Typed column from JSON scalars. Integers widen to floats when mixed; nulls are kept.
fn json_column(name: &str, values: &[Value]) -> Result<Column, FlattenError> {
    let unsupported = || FlattenError::UnsupportedValue {
        field: name.to_string(),
    };

    let mut kind: Option<ValueKind> = None;
    for value in values {
        let this = match value {
            Value::Null => continue,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_i64() => ValueKind::Int,
            Value::Number(_) => ValueKind::Float,
            Value::String(_) => ValueKind::Text,
            Value::Array(_) | Value::Object(_) => return Err(unsupported()),
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ValueKind::Int), ValueKind::Float) | (Some(ValueKind::Float), ValueKind::Int) => {
                ValueKind::Float
            }
            _ => return Err(unsupported()),
        });
    }

    let name = PlSmallStr::from(name);
    let series = match kind.unwrap_or(ValueKind::Float) {
        ValueKind::Int => Series::new(name, values.iter().map(Value::as_i64).collect::<Vec<_>>()),
        ValueKind::Float => Series::new(name, values.iter().map(Value::as_f64).collect::<Vec<_>>()),
        ValueKind::Text => Series::new(name, values.iter().map(Value::as_str).collect::<Vec<_>>()),
        ValueKind::Bool => Series::new(name, values.iter().map(Value::as_bool).collect::<Vec<_>>()),
    };

    Ok(series.into_column())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_step_response() -> ForecastResponse {
        ForecastResponse::new(json!({
            "current": { "time": "2024-01-01T00:00", "interval": 900, "temperature_2m": 4.9, "wind_speed_10m": 9.8 },
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
                "temperature_2m": [5.1, 5.3],
                "relative_humidity_2m": [80, 82],
                "wind_speed_10m": [10, 11]
            }
        }))
    }

    #[test]
    fn flatten_mode_roundtrip() {
        for mode in FlattenMode::all() {
            let parsed = FlattenMode::try_from(mode.as_str()).expect("roundtrip should succeed");
            assert_eq!(*mode, parsed);
        }
    }

    #[test]
    fn unknown_flatten_mode_error() {
        let err = FlattenMode::try_from("long-format").unwrap_err();
        assert!(err.to_string().contains("Unknown flatten mode"));
    }

    #[test]
    fn hourly_series_has_one_row_per_step_in_order() {
        let table = flatten(&two_step_response(), FlattenMode::HourlySeries, &FieldSelection::default()).unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(
            table.column_names(),
            ["time", "temperature", "relative_humidity", "wind_speed"]
        );
        assert_eq!(table.cell(0, "time"), Some(AnyValue::String("2024-01-01T00:00")));
        assert_eq!(table.cell(0, "temperature"), Some(AnyValue::Float64(5.1)));
        assert_eq!(table.cell(0, "relative_humidity"), Some(AnyValue::Int64(80)));
        assert_eq!(table.cell(0, "wind_speed"), Some(AnyValue::Int64(10)));
        assert_eq!(table.cell(1, "time"), Some(AnyValue::String("2024-01-01T01:00")));
        assert_eq!(table.cell(1, "temperature"), Some(AnyValue::Float64(5.3)));
    }

    #[test]
    fn hourly_series_rejects_short_field() {
        let response = ForecastResponse::new(json!({
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"],
                "temperature_2m": [5.1, 5.3],
                "relative_humidity_2m": [80, 82, 84],
                "wind_speed_10m": [10, 11, 12]
            }
        }));

        let err = flatten(&response, FlattenMode::HourlySeries, &FieldSelection::default()).unwrap_err();

        match err {
            FlattenError::LengthMismatch { field, expected, found } => {
                assert_eq!(field, "temperature_2m");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn hourly_series_requires_every_field() {
        let response = ForecastResponse::new(json!({
            "hourly": { "time": ["2024-01-01T00:00"], "temperature_2m": [1.0], "wind_speed_10m": [2.0] }
        }));

        let err = flatten(&response, FlattenMode::HourlySeries, &FieldSelection::default()).unwrap_err();

        assert!(matches!(err, FlattenError::MissingField { ref field, .. } if field == "relative_humidity_2m"));
    }

    #[test]
    fn missing_hourly_section_fails_in_both_modes() {
        let response = ForecastResponse::new(json!({ "current": { "temperature_2m": 1.0 } }));

        for mode in FlattenMode::all() {
            let err = flatten(&response, *mode, &FieldSelection::default()).unwrap_err();
            assert!(matches!(err, FlattenError::MissingSection("hourly")));
        }
    }

    #[test]
    fn null_readings_stay_null() {
        let response = ForecastResponse::new(json!({
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
                "temperature_2m": [null, 5.3],
                "relative_humidity_2m": [80, null],
                "wind_speed_10m": [10.5, 11]
            }
        }));

        let table = flatten(&response, FlattenMode::HourlySeries, &FieldSelection::default()).unwrap();

        assert_eq!(table.cell(0, "temperature"), Some(AnyValue::Null));
        assert_eq!(table.cell(1, "relative_humidity"), Some(AnyValue::Null));
        assert_eq!(table.cell(1, "wind_speed"), Some(AnyValue::Float64(11.0)));
    }

    #[test]
    fn nested_values_are_unsupported() {
        let response = ForecastResponse::new(json!({
            "hourly": {
                "time": ["2024-01-01T00:00"],
                "temperature_2m": [{ "value": 5.1 }],
                "relative_humidity_2m": [80],
                "wind_speed_10m": [10]
            }
        }));

        let err = flatten(&response, FlattenMode::HourlySeries, &FieldSelection::default()).unwrap_err();

        assert!(matches!(err, FlattenError::UnsupportedValue { .. }));
    }

    #[test]
    fn wide_join_puts_snapshot_in_first_row() {
        let table = flatten(&two_step_response(), FlattenMode::WideJoin, &FieldSelection::default()).unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(
            table.column_names(),
            [
                "current_time",
                "current_interval",
                "current_temperature_2m",
                "current_wind_speed_10m",
                "time",
                "temperature_2m",
                "relative_humidity_2m",
                "wind_speed_10m",
            ]
        );
        assert_eq!(table.cell(0, "current_temperature_2m"), Some(AnyValue::Float64(4.9)));
        assert_eq!(table.cell(1, "current_temperature_2m"), Some(AnyValue::Null));
        assert_eq!(table.cell(1, "temperature_2m"), Some(AnyValue::Float64(5.3)));
    }

    #[test]
    fn wide_join_pads_short_and_truncates_long_arrays() {
        let response = ForecastResponse::new(json!({
            "current": { "temperature_2m": 4.9, "wind_speed_10m": 9.8 },
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"],
                "temperature_2m": [5.1],
                "relative_humidity_2m": [80, 82, 84, 86],
                "wind_speed_10m": [10, 11, 12]
            }
        }));

        let table = flatten(&response, FlattenMode::WideJoin, &FieldSelection::default()).unwrap();

        assert_eq!(table.height(), 3);
        assert_eq!(table.cell(0, "temperature_2m"), Some(AnyValue::Float64(5.1)));
        assert_eq!(table.cell(2, "temperature_2m"), Some(AnyValue::Null));
        assert_eq!(table.cell(2, "relative_humidity_2m"), Some(AnyValue::Int64(84)));
    }

    #[test]
    fn wide_join_keeps_snapshot_when_hourly_is_empty() {
        let response = ForecastResponse::new(json!({
            "current": { "temperature_2m": 4.9, "wind_speed_10m": 9.8 },
            "hourly": { "time": [], "temperature_2m": [], "relative_humidity_2m": [], "wind_speed_10m": [] }
        }));

        let table = flatten(&response, FlattenMode::WideJoin, &FieldSelection::default()).unwrap();

        assert_eq!(table.height(), 1);
        assert_eq!(table.cell(0, "current_wind_speed_10m"), Some(AnyValue::Float64(9.8)));
        assert_eq!(table.cell(0, "time"), Some(AnyValue::Null));
    }

    #[test]
    fn wide_join_requires_requested_current_fields() {
        let response = ForecastResponse::new(json!({
            "current": { "temperature_2m": 4.9 },
            "hourly": {
                "time": ["2024-01-01T00:00"],
                "temperature_2m": [5.1],
                "relative_humidity_2m": [80],
                "wind_speed_10m": [10]
            }
        }));

        let err = flatten(&response, FlattenMode::WideJoin, &FieldSelection::default()).unwrap_err();

        assert!(matches!(
            err,
            FlattenError::MissingField { section: "current", ref field } if field == "wind_speed_10m"
        ));
    }
}
