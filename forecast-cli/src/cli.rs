use clap::{ArgAction, Args, Parser, Subcommand};
use forecast_core::{
    ChartOutput, Config, FlattenMode, ForecastClient, Pipeline, PipelineSettings, chart,
};
use std::path::PathBuf;
use tracing::debug;

use crate::prompt;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Fetch an Open-Meteo forecast into a CSV file")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the forecast for a coordinate and write it as CSV.
    Fetch(FetchArgs),

    /// Chart an existing hourly-series CSV.
    Plot {
        /// CSV to read; defaults to the configured output path.
        csv: Option<PathBuf>,

        /// Write the chart to this HTML file instead of opening it.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Show the config file location and the effective settings.
    Config {
        /// Write the effective settings to the config file.
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Latitude in decimal degrees; prompted for when absent.
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,

    /// Longitude in decimal degrees; prompted for when absent.
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,

    /// CSV destination, overwritten if it exists.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Write the legacy wide-join shape instead of one row per hour.
    #[arg(long)]
    pub legacy_wide_join: bool,

    /// Reject latitude outside [-90, 90] and longitude outside [-180, 180].
    #[arg(long)]
    pub strict_coordinates: bool,

    /// Open a temperature chart after writing the CSV.
    #[arg(long)]
    pub chart: bool,

    /// Write the temperature chart to this HTML file.
    #[arg(long)]
    pub chart_html: Option<PathBuf>,
}

impl FetchArgs {
    /// Config values with this invocation's flags applied on top, validated together.
    pub fn settings(&self, config: &Config) -> anyhow::Result<PipelineSettings> {
        let mut config = config.clone();

        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.legacy_wide_join {
            config.set_flatten_mode(FlattenMode::WideJoin);
        }
        if self.strict_coordinates {
            config.strict_coordinates = true;
        }

        let mut settings = PipelineSettings::from_config(&config)?;
        settings.chart = match (&self.chart_html, self.chart) {
            (Some(path), _) => Some(ChartOutput::Html(path.clone())),
            (None, true) => Some(chart_output(&config)),
            (None, false) => None,
        };

        Ok(settings)
    }
}

fn chart_output(config: &Config) -> ChartOutput {
    match &config.chart_html {
        Some(path) => ChartOutput::Html(path.clone()),
        None => ChartOutput::Window,
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Fetch(args) => {
                let settings = args.settings(&config)?;
                debug!("Resolved settings: {settings:?}");

                let latitude = match args.latitude {
                    Some(value) => value,
                    None => prompt::coordinate("Enter latitude:")?,
                };
                let longitude = match args.longitude {
                    Some(value) => value,
                    None => prompt::coordinate("Enter longitude:")?,
                };

                let pipeline = Pipeline::new(ForecastClient::http(), settings);
                let outcome = pipeline.run(&latitude, &longitude).await?;

                println!(
                    "Wrote {} rows to {}",
                    outcome.rows,
                    outcome.output_path.display()
                );
            }
            Command::Plot { csv, html } => {
                let csv = csv.unwrap_or_else(|| config.output_path.clone());
                let output = match html {
                    Some(path) => ChartOutput::Html(path),
                    None => chart_output(&config),
                };
                chart::render_csv(&csv, &output)?;
            }
            Command::Config { init } => {
                let path = match self.config {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                println!("Config file: {}", path.display());

                println!("{}", config.to_toml()?);

                if init {
                    config.save_to(&path)?;
                    println!("Saved to {}", path.display());
                }
            }
        }

        Ok(())
    }
}
