//! CSV Data Loader Module
//! Reads the Latin-1 encoded input tables with Polars and shapes them into
//! the quarterly index table and the per-country metric tables.

use super::processor::{CountryMetric, DataProcessor, ProcessorError, COUNTRY};
use encoding_rs::WINDOWS_1252;
use polars::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Key column of the quarterly table.
pub const QUARTER: &str = "Quarter";

/// Value columns of the quarterly table, in file order.
pub const INDEX_COLUMNS: [&str; 4] = [
    "Ireland GDP Index (2008Q1=100)",
    "Euro Area GDP Index (2008Q1=100)",
    "Ireland Consumption Index (2008Q1=100)",
    "Euro Area Consumption Index (2008Q1=100)",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("Expected {expected} value columns, found {found}")]
    ColumnCountMismatch { expected: usize, found: usize },
    #[error("No series at position {0}")]
    NoSeries(usize),
}

/// Quarterly GDP and consumption indices keyed by quarter label.
#[derive(Debug, Clone)]
pub struct QuarterlyIndices {
    frame: DataFrame,
}

impl QuarterlyIndices {
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Quarter labels in file order.
    pub fn quarters(&self) -> Result<Vec<String>, LoaderError> {
        Ok(self
            .frame
            .column(QUARTER)?
            .str()?
            .into_iter()
            .map(|q| q.unwrap_or_default().to_string())
            .collect())
    }

    /// Name and values of the value column at `position` (0-3).
    pub fn series(&self, position: usize) -> Result<(String, Vec<Option<f64>>), LoaderError> {
        let name = INDEX_COLUMNS
            .get(position)
            .ok_or(LoaderError::NoSeries(position))?;
        let values = self.frame.column(name)?.f64()?.into_iter().collect();
        Ok((name.to_string(), values))
    }
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Read a Latin-1 CSV file with a header row. Every column is read as text
    /// and blank lines are not counted as rows.
    pub fn read_latin1_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let bytes = fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (text, _, _) = WINDOWS_1252.decode(&bytes);
        let df = Self::read_csv_text(&text)?;
        Ok(DataProcessor::drop_blank_rows(&df)?)
    }

    fn read_csv_text(text: &str) -> Result<DataFrame, LoaderError> {
        let cursor = Cursor::new(text.as_bytes());
        let options = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .map_parse_options(|parse| parse.with_truncate_ragged_lines(true));

        Ok(options.into_reader_with_file_handle(cursor).finish()?)
    }

    /// Load the Ireland/Euro Area index table.
    pub fn load_quarterly_indices(path: &Path) -> Result<QuarterlyIndices, LoaderError> {
        let mut raw = Self::read_latin1_csv(path)?;
        DataProcessor::rename_first_column(&mut raw, QUARTER)?;
        let raw = DataProcessor::drop_empty_columns(&raw)?;

        let found = raw.width().saturating_sub(1);
        if found != INDEX_COLUMNS.len() {
            return Err(LoaderError::ColumnCountMismatch {
                expected: INDEX_COLUMNS.len(),
                found,
            });
        }

        let mut columns = vec![raw.column(QUARTER)?.cast(&DataType::String)?];
        for (source, name) in raw.get_columns()[1..].iter().zip(INDEX_COLUMNS) {
            columns.push(DataProcessor::coerce_numeric(source, name)?);
        }

        let frame = DataFrame::new(columns)?
            .lazy()
            .filter(col(QUARTER).is_not_null())
            .collect()?;

        let mut seen = HashSet::new();
        for quarter in frame.column(QUARTER)?.str()?.into_iter().flatten() {
            if !seen.insert(quarter) {
                warn!(path = %path.display(), quarter, "repeated quarter label, keeping both rows");
            }
        }

        info!(
            path = %path.display(),
            rows = frame.height(),
            "loaded quarterly indices"
        );
        Ok(QuarterlyIndices { frame })
    }

    /// Load a per-country table and extract the numeric column at `position`,
    /// after skipping `skip_rows` leading aggregate rows.
    pub fn load_country_metric(
        path: &Path,
        skip_rows: usize,
        position: usize,
        metric: &str,
    ) -> Result<CountryMetric, LoaderError> {
        let mut raw = Self::read_latin1_csv(path)?;
        DataProcessor::rename_first_column(&mut raw, COUNTRY)?;
        let countries = DataProcessor::skip_leading_rows(&raw, skip_rows);
        let table = DataProcessor::extract_metric(&countries, position, metric)?;

        info!(
            path = %path.display(),
            metric,
            rows_raw = raw.height(),
            rows = table.frame.height(),
            "loaded country metric"
        );
        Ok(table)
    }
}
