//! Linear Regression Module
//! Degree-1 least-squares fit with basic diagnostics.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FitError {
    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("At least 2 points are required, got {0}")]
    InsufficientData(usize),
    #[error("Input contains non-finite values")]
    NonFinite,
    #[error("Independent variable has zero variance; slope is undefined")]
    ZeroVariance,
}

/// Best-fit line `y = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub n: usize,
    /// Coefficient of determination; NaN when y is constant.
    pub r_squared: f64,
    /// Standard error of the slope; `None` with only 2 points.
    pub slope_std_err: Option<f64>,
    /// Two-tailed p-value for slope != 0; `None` with only 2 points.
    pub p_value: Option<f64>,
    pub x_min: f64,
    pub x_max: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// `n` evenly spaced points on the fitted line from min(x) to max(x).
    pub fn sample_line(&self, n: usize) -> Vec<(f64, f64)> {
        match n {
            0 => Vec::new(),
            1 => vec![(self.x_min, self.predict(self.x_min))],
            _ => {
                let step = (self.x_max - self.x_min) / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        let x = if i == n - 1 {
                            self.x_max
                        } else {
                            self.x_min + step * i as f64
                        };
                        (x, self.predict(x))
                    })
                    .collect()
            }
        }
    }

    /// Legend text for the trend line.
    pub fn equation(&self) -> String {
        format!("y = {:.2}x + {:.2}", self.slope, self.intercept)
    }
}

/// Fit `y` on `x` by ordinary least squares.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(FitError::InsufficientData(n));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let mean_x = x.iter().mean();
    let mean_y = y.iter().mean();
    let var_x = x.iter().variance();
    let var_y = y.iter().variance();
    if var_x == 0.0 {
        return Err(FitError::ZeroVariance);
    }
    let cov_xy = x.iter().covariance(y.iter());

    let slope = cov_xy / var_x;
    let intercept = mean_y - slope * mean_x;

    // Undefined for a constant y, as in numpy/statsmodels
    let r_squared = if var_y == 0.0 {
        f64::NAN
    } else {
        (cov_xy * cov_xy) / (var_x * var_y)
    };

    let (slope_std_err, p_value) = if n > 2 {
        let dof = (n - 2) as f64;
        let sse: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (yi - (slope * xi + intercept)).powi(2))
            .sum();
        let sxx = var_x * (n - 1) as f64;
        let se = (sse / dof / sxx).sqrt();
        let p = if se == 0.0 {
            0.0
        } else {
            StudentsT::new(0.0, 1.0, dof)
                .map(|dist| 2.0 * (1.0 - dist.cdf((slope / se).abs())))
                .unwrap_or(f64::NAN)
        };
        (Some(se), Some(p))
    } else {
        (None, None)
    };

    Ok(LinearFit {
        slope,
        intercept,
        n,
        r_squared,
        slope_std_err,
        p_value,
        x_min: x.iter().copied().fold(f64::INFINITY, f64::min),
        x_max: x.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}
