use plotlars::{Axis, AxisType, Plot, Text, TimeSeriesPlot};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::{error::IoError, table::ForecastTable};

const TIME_COLUMN: &str = "time";
const TEMPERATURE_COLUMN: &str = "temperature";

/// Where a rendered chart goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutput {
    /// Interactive display in the system viewer. The viewer runs on its own, so this returns
    /// as soon as the chart has been handed to it.
    Window,
    /// Standalone HTML file, for headless runs.
    Html(PathBuf),
}

/// Read an hourly-series CSV and plot temperature against the time labels.
pub fn render_csv(csv_path: &Path, output: &ChartOutput) -> Result<(), IoError> {
    let table = ForecastTable::read_csv(csv_path)?;
    table.require_columns(csv_path, &[TIME_COLUMN, TEMPERATURE_COLUMN])?;

    let plot = temperature_plot(&table);

    match output {
        ChartOutput::Window => {
            info!("Showing chart for {} points", table.height());
            plot.plot();
        }
        ChartOutput::Html(path) => {
            fs::write(path, plot.to_html()).map_err(|e| IoError::WriteHtml(path.clone(), e))?;
            info!("Wrote chart to {}", path.display());
        }
    }

    Ok(())
}

/// Time labels go on a category axis so plotly shows them as written instead of parsing dates.
fn temperature_plot(table: &ForecastTable) -> TimeSeriesPlot {
    TimeSeriesPlot::builder()
        .data(table.frame())
        .x(TIME_COLUMN)
        .y(TEMPERATURE_COLUMN)
        .plot_title(Text::from("Hourly temperature").size(18))
        .x_title("time")
        .y_title("temperature")
        .x_axis(&Axis::new().axis_type(AxisType::Category))
        .build()
}
