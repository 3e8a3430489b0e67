//! Stats module - least-squares fitting

mod regression;

pub use regression::{fit_line, LinearFit};
