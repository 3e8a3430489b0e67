//! Analysis Configuration Module
//! Input locations, positional column layout and chart options.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the optional override file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "macro_charts.json";

/// Countries annotated on the scatter chart.
pub const DEFAULT_LABELED_COUNTRIES: [&str; 7] = [
    "Ireland", "Germany", "Spain", "Bulgaria", "Czechia", "Greece", "Estonia",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Settings for a single analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub indices_file: String,
    pub inflation_file: String,
    pub government_file: String,
    /// EU/Euro-area aggregate rows at the top of the government table.
    pub government_aggregate_rows: usize,
    /// Zero-based position of the cumulative growth column.
    pub government_growth_column: usize,
    pub inflation_growth_column: usize,
    pub labeled_countries: Vec<String>,
    pub fit_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"),
            output_dir: PathBuf::from("."),
            indices_file: "ireland_ea.csv".to_string(),
            inflation_file: "inf.csv".to_string(),
            government_file: "gov.csv".to_string(),
            government_aggregate_rows: 7,
            government_growth_column: 3,
            inflation_growth_column: 5,
            labeled_countries: DEFAULT_LABELED_COUNTRIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fit_samples: 100,
        }
    }
}

impl AnalysisConfig {
    /// Load overrides from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config overrides");
        Ok(config)
    }

    pub fn indices_path(&self) -> PathBuf {
        self.data_dir.join(&self.indices_file)
    }

    pub fn inflation_path(&self) -> PathBuf {
        self.data_dir.join(&self.inflation_file)
    }

    pub fn government_path(&self) -> PathBuf {
        self.data_dir.join(&self.government_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AnalysisConfig::load_or_default(Path::new("/nonexistent/macro_charts.json"))
            .unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.government_aggregate_rows, 7);
        assert_eq!(config.labeled_countries.len(), 7);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "output_dir": "/tmp/out", "fit_samples": 10 }}"#).unwrap();

        let config = AnalysisConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.fit_samples, 10);
        assert_eq!(config.inflation_growth_column, 5);
        assert_eq!(config.indices_file, "ireland_ea.csv");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AnalysisConfig::load_or_default(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
