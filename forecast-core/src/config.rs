use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::{
    coordinate::RangeCheck,
    flatten::FlattenMode,
    request::{DEFAULT_BASE_URL, FieldSelection},
};

pub const DEFAULT_OUTPUT_PATH: &str = "forecast.csv";

/// Pipeline settings stored on disk. Every key is optional in the file.
///
/// Example TOML:
/// base_url = "https://api.open-meteo.com/v1/forecast"
/// output_path = "forecast.csv"
/// flatten_mode = "hourly-series"
/// strict_coordinates = false
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub output_path: PathBuf,

    /// "hourly-series" (default) or "wide-join".
    pub flatten_mode: Option<String>,

    pub strict_coordinates: bool,

    /// Write the chart here instead of opening an interactive display.
    pub chart_html: Option<PathBuf>,

    pub fields: FieldSelection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            flatten_mode: None,
            strict_coordinates: false,
            chart_html: None,
            fields: FieldSelection::default(),
        }
    }
}

impl Config {
    /// Return the flatten mode as a strongly-typed FlattenMode.
    pub fn flatten_mode(&self) -> Result<FlattenMode> {
        match self.flatten_mode.as_deref() {
            Some(s) => FlattenMode::try_from(s),
            None => Ok(FlattenMode::default()),
        }
    }

    /// Store flatten mode as string.
    pub fn set_flatten_mode(&mut self, mode: FlattenMode) {
        self.flatten_mode = Some(mode.as_str().to_string());
    }

    pub fn range_check(&self) -> RangeCheck {
        RangeCheck::from_strict(self.strict_coordinates)
    }

    /// Load config from the platform config dir, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.flatten_mode()
            .with_context(|| format!("Invalid flatten_mode in {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
