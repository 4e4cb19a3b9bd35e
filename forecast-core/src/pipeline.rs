use std::path::PathBuf;
use tracing::info;

use crate::{
    chart::{self, ChartOutput},
    client::{ForecastClient, Transport},
    config::Config,
    coordinate::{Coordinate, RangeCheck},
    error::ForecastError,
    flatten::{self, FlattenMode, HOURLY_SERIES_COLUMNS},
    request::{FieldSelection, ForecastRequest},
};

/// Everything one run needs, resolved from [`Config`] and command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub base_url: String,
    pub fields: FieldSelection,
    pub output_path: PathBuf,
    pub mode: FlattenMode,
    pub range_check: RangeCheck,
    pub chart: Option<ChartOutput>,
}

impl PipelineSettings {
    /// Settings from `config`. No chart unless the caller asks for one.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let settings = Self {
            base_url: config.base_url.clone(),
            fields: config.fields.clone(),
            output_path: config.output_path.clone(),
            mode: config.flatten_mode()?,
            range_check: config.range_check(),
            chart: None,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// The hourly-series shape reads fixed hourly fields, so the request must ask for all of them.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mode != FlattenMode::HourlySeries {
            return Ok(());
        }

        let missing: Vec<&str> = HOURLY_SERIES_COLUMNS
            .iter()
            .map(|&(field, _)| field)
            .filter(|&field| field != "time" && !self.fields.hourly.iter().any(|f| f == field))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "fields.hourly must include {} for the {} flatten mode; \
                 add them to [fields] hourly or use flatten_mode = \"{}\"",
                missing.join(", "),
                FlattenMode::HourlySeries,
                FlattenMode::WideJoin,
            ))
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            base_url: crate::request::DEFAULT_BASE_URL.to_string(),
            fields: FieldSelection::default(),
            output_path: PathBuf::from(crate::config::DEFAULT_OUTPUT_PATH),
            mode: FlattenMode::default(),
            range_check: RangeCheck::default(),
            chart: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub url: String,
    pub rows: usize,
    pub output_path: PathBuf,
}

#[derive(Debug)]
pub struct Pipeline<T> {
    client: ForecastClient<T>,
    settings: PipelineSettings,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(client: ForecastClient<T>, settings: PipelineSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Validate raw coordinate text, then run the remaining stages in order.
    pub async fn run(&self, latitude: &str, longitude: &str) -> Result<PipelineOutcome, ForecastError> {
        let coordinate = Coordinate::parse(latitude, longitude, self.settings.range_check)?;
        self.run_for(coordinate).await
    }

    /// Fetch, flatten, write and optionally chart. Stops at the first failing stage.
    pub async fn run_for(&self, coordinate: Coordinate) -> Result<PipelineOutcome, ForecastError> {
        let settings = &self.settings;
        let request = ForecastRequest::new(settings.base_url.clone(), coordinate, settings.fields.clone());
        info!(
            "Requesting forecast for {}, {}",
            coordinate.latitude(),
            coordinate.longitude()
        );

        let response = self.client.fetch(&request).await?;
        let table = flatten::flatten(&response, settings.mode, &settings.fields)?;
        table.write_csv(&settings.output_path)?;

        if let Some(output) = &settings.chart {
            chart::render_csv(&settings.output_path, output)?;
        }

        Ok(PipelineOutcome {
            url: request.url(),
            rows: table.height(),
            output_path: settings.output_path.clone(),
        })
    }
}
