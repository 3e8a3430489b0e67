//! Data Processor Module
//! Handles data cleaning: renaming, numeric coercion, row filtering and joining.

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Key column of the country tables.
pub const COUNTRY: &str = "Country";

/// Temporary column used to keep the left table's order through a join.
const ROW_ORDER: &str = "__row_order";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column position {position} out of range for a table with {width} columns")]
    MissingColumn { position: usize, width: usize },
    #[error("Table has no columns")]
    NoColumns,
}

/// A keyed table with one numeric metric column: `[Country, metric]`.
#[derive(Debug, Clone)]
pub struct CountryMetric {
    pub frame: DataFrame,
    pub metric: String,
}

/// Paired observations for every country present in both metric tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryPairs {
    pub countries: Vec<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl CountryPairs {
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Parse a single cell, mapping anything non-numeric to missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Rename the first column to a semantic key.
    pub fn rename_first_column(df: &mut DataFrame, key: &str) -> Result<(), ProcessorError> {
        let first = df
            .get_column_names()
            .first()
            .map(|name| name.to_string())
            .ok_or(ProcessorError::NoColumns)?;
        if first != key {
            df.rename(&first, key.into())?;
        }
        Ok(())
    }

    /// Drop columns in which every value is missing.
    pub fn drop_empty_columns(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let height = df.height();
        let kept: Vec<Column> = df
            .get_columns()
            .iter()
            .filter(|column| {
                let empty = column.null_count() == height;
                if empty {
                    debug!(column = %column.name(), "dropping all-missing column");
                }
                !empty
            })
            .cloned()
            .collect();

        Ok(DataFrame::new(kept)?)
    }

    /// Drop rows in which every column is missing (blank input lines).
    pub fn drop_blank_rows(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let mut present = BooleanChunked::full("present".into(), false, df.height());
        for column in df.get_columns() {
            present = &present | &column.is_not_null();
        }
        Ok(df.filter(&present)?)
    }

    /// Coerce a column to Float64. Non-parsable cells become null.
    pub fn coerce_numeric(column: &Column, name: &str) -> Result<Column, ProcessorError> {
        let text = column.cast(&DataType::String)?;
        let values: Vec<Option<f64>> = text
            .str()?
            .into_iter()
            .map(|cell| cell.and_then(parse_number))
            .collect();

        Ok(Column::new(name.into(), values))
    }

    /// Drop the first `n` data rows.
    pub fn skip_leading_rows(df: &DataFrame, n: usize) -> DataFrame {
        let offset = n.min(df.height());
        df.slice(offset as i64, df.height() - offset)
    }

    /// Build `[Country, name]` from the key column and the column at `position`,
    /// keeping only rows where both are present.
    pub fn extract_metric(
        df: &DataFrame,
        position: usize,
        name: &str,
    ) -> Result<CountryMetric, ProcessorError> {
        let width = df.width();
        let key = df.column(COUNTRY)?.cast(&DataType::String)?;
        let source = df
            .select_at_idx(position)
            .ok_or(ProcessorError::MissingColumn { position, width })?;
        let values = Self::coerce_numeric(source, name)?;

        let frame = DataFrame::new(vec![key, values])?.drop_nulls::<String>(None)?;
        debug!(
            metric = name,
            rows_in = df.height(),
            rows_out = frame.height(),
            "extracted metric"
        );

        Ok(CountryMetric {
            frame,
            metric: name.to_string(),
        })
    }

    /// Inner-join two metric tables on the country key, keeping the left table's order.
    pub fn join_countries(
        left: &CountryMetric,
        right: &CountryMetric,
    ) -> Result<DataFrame, ProcessorError> {
        let joined = left
            .frame
            .clone()
            .lazy()
            .with_row_index(ROW_ORDER, None)
            .join(
                right.frame.clone().lazy(),
                [col(COUNTRY)],
                [col(COUNTRY)],
                JoinArgs::new(JoinType::Inner),
            )
            .sort(
                [ROW_ORDER],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .select([
                col(COUNTRY),
                col(left.metric.as_str()),
                col(right.metric.as_str()),
            ])
            .drop_nulls(None)
            .collect()?;

        Ok(joined)
    }

    /// Extract paired arrays from a joined table.
    pub fn to_pairs(
        joined: &DataFrame,
        x_metric: &str,
        y_metric: &str,
    ) -> Result<CountryPairs, ProcessorError> {
        let countries = joined.column(COUNTRY)?.str()?;
        let xs = joined.column(x_metric)?.f64()?;
        let ys = joined.column(y_metric)?.f64()?;

        let mut pairs = CountryPairs::default();
        for ((country, x), y) in countries.into_iter().zip(xs).zip(ys) {
            if let (Some(country), Some(x), Some(y)) = (country, x, y) {
                pairs.countries.push(country.to_string());
                pairs.x.push(x);
                pairs.y.push(y);
            }
        }

        Ok(pairs)
    }
}
