//! Data module - CSV loading and cleaning

mod loader;
mod processor;

pub use loader::{DataLoader, QuarterlyIndices};
pub use processor::{CountryPairs, DataProcessor};
