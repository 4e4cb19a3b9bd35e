use serde_json::{Map, Value};

use crate::error::FlattenError;

/// Decoded API body: a `current` snapshot and `hourly` parallel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResponse {
    body: Value,
}

impl ForecastResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    pub fn from_json(text: &str) -> Result<Self, FlattenError> {
        serde_json::from_str(text)
            .map(Self::new)
            .map_err(FlattenError::MalformedBody)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn current(&self) -> Result<&Map<String, Value>, FlattenError> {
        self.section("current")
    }

    pub fn hourly(&self) -> Result<&Map<String, Value>, FlattenError> {
        self.section("hourly")
    }

    /// One hourly array by name.
    pub fn hourly_array(&self, field: &str) -> Result<&[Value], FlattenError> {
        let value = self
            .hourly()?
            .get(field)
            .ok_or_else(|| FlattenError::MissingField {
                section: "hourly",
                field: field.to_string(),
            })?;

        value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| FlattenError::NotAnArray(field.to_string()))
    }

    fn section(&self, name: &'static str) -> Result<&Map<String, Value>, FlattenError> {
        self.body
            .get(name)
            .and_then(Value::as_object)
            .ok_or(FlattenError::MissingSection(name))
    }
}
