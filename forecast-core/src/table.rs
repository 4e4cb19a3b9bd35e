use polars::prelude::*;
use std::{fs::File, path::Path};
use tracing::info;

use crate::error::IoError;

/// Flattened forecast rows, backed by a polars frame. Built once, then written.
#[derive(Debug, Clone)]
pub struct ForecastTable {
    frame: DataFrame,
}

impl ForecastTable {
    pub fn from_columns(columns: Vec<Column>) -> PolarsResult<Self> {
        DataFrame::new(columns).map(|frame| Self { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Value at `row` in `column`, or `None` when either is out of bounds.
    pub fn cell(&self, row: usize, column: &str) -> Option<AnyValue<'_>> {
        self.frame.column(column).ok()?.get(row).ok()
    }

    /// Write the table as CSV with a header row and no index column, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<(), IoError> {
        let mut file = File::create(path).map_err(|e| IoError::Create(path.to_path_buf(), e))?;

        // `finish` takes the frame mutably to rechunk; write from a copy so the table stays immutable.
        let mut frame = self.frame.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut frame)
            .map_err(|e| IoError::WriteCsv(path.to_path_buf(), e))?;

        info!("Wrote {} rows to {}", self.height(), path.display());
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self, IoError> {
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| IoError::ReadCsv(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| IoError::ReadCsv(path.to_path_buf(), e))?;

        Ok(Self { frame })
    }

    /// Fail with [`IoError::MissingColumn`] unless every name in `columns` is present.
    pub fn require_columns(&self, path: &Path, columns: &[&str]) -> Result<(), IoError> {
        match columns.iter().find(|c| self.frame.column(c).is_err()) {
            Some(column) => Err(IoError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> ForecastTable {
        ForecastTable::from_columns(vec![
            Series::new("time".into(), ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"]).into_column(),
            Series::new("temperature".into(), [5.1, 5.3, 4.8]).into_column(),
            Series::new("relative_humidity".into(), [80i64, 82, 85]).into_column(),
            Series::new("wind_speed".into(), [10.5, 11.0, 9.25]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn writes_header_and_rows_without_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forecast.csv");

        sample().write_csv(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "time,temperature,relative_humidity,wind_speed");
        assert!(lines[1].starts_with("2024-01-01T00:00,5.1,80,"));
        assert!(lines[3].starts_with("2024-01-01T02:00,"));
    }

    #[test]
    fn round_trip_keeps_columns_values_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forecast.csv");
        let table = sample();

        table.write_csv(&path).unwrap();
        let read = ForecastTable::read_csv(&path).unwrap();

        assert_eq!(read.column_names(), table.column_names());
        assert_eq!(read.height(), 3);
        for row in 0..3 {
            for column in table.column_names() {
                assert_eq!(
                    read.cell(row, &column).map(|v| v.to_string()),
                    table.cell(row, &column).map(|v| v.to_string()),
                    "row {row} column {column}"
                );
            }
        }
    }

    #[test]
    fn existing_file_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forecast.csv");
        fs::write(&path, "stale,contents\n1,2\n3,4\n5,6\n7,8\n").unwrap();

        sample().write_csv(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn unwritable_destination_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("forecast.csv");

        let err = sample().write_csv(&path).unwrap_err();

        assert!(matches!(err, IoError::Create(..)));
    }

    #[test]
    fn reading_a_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ForecastTable::read_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, IoError::ReadCsv(..)));
    }

    #[test]
    fn require_columns_names_the_first_missing_one() {
        let table = sample();
        let path = Path::new("forecast.csv");

        assert!(table.require_columns(path, &["time", "temperature"]).is_ok());
        let err = table.require_columns(path, &["time", "pressure"]).unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { ref column, .. } if column == "pressure"));
    }
}
