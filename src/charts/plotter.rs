//! Chart Plotter Module
//! Renderer-neutral chart descriptions and the rendering seam.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while producing a chart image
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),
    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),
    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// One labeled line. Missing values break the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Line chart over ordered category labels (quarters).
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

/// Text placed next to a scatter point.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Scatter chart with a fitted trend line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub trend: Vec<(f64, f64)>,
    pub trend_label: String,
    pub annotations: Vec<Annotation>,
}

/// Produces chart image files.
pub trait ChartRenderer {
    fn render_lines(&mut self, chart: &LineChart, path: &Path) -> Result<(), PlotError>;
    fn render_scatter(&mut self, chart: &ScatterChart, path: &Path) -> Result<(), PlotError>;
}

/// Annotate only the points whose name is on the allow-list.
pub fn select_annotations(
    names: &[String],
    x: &[f64],
    y: &[f64],
    allow_list: &[String],
) -> Vec<Annotation> {
    names
        .iter()
        .zip(x.iter().zip(y))
        .filter(|(name, _)| allow_list.contains(name))
        .map(|(name, (&x, &y))| Annotation {
            text: name.clone(),
            x,
            y,
        })
        .collect()
}

/// Split a series into contiguous runs of present values, indexed by position.
pub fn contiguous_segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => current.push((i as f64, *v)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Padded `(min, max)` over finite values; `None` when there are none.
pub fn padded_range(values: impl IntoIterator<Item = f64>, pad_ratio: f64) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return None;
    }
    let pad = if max > min {
        (max - min) * pad_ratio
    } else {
        1.0
    };
    Some((min - pad, max + pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn annotations_follow_allow_list() {
        let names = strings(&["Ireland", "France", "Greece", "Malta"]);
        let allow = strings(&["Ireland", "Germany", "Greece"]);
        let notes = select_annotations(&names, &[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], &allow);

        assert_eq!(
            notes,
            vec![
                Annotation {
                    text: "Ireland".into(),
                    x: 1.0,
                    y: 5.0
                },
                Annotation {
                    text: "Greece".into(),
                    x: 3.0,
                    y: 7.0
                },
            ]
        );
    }

    #[test]
    fn annotation_match_is_exact() {
        let names = strings(&["ireland", "Ireland "]);
        let allow = strings(&["Ireland"]);
        assert!(select_annotations(&names, &[1.0, 2.0], &[1.0, 2.0], &allow).is_empty());
    }

    #[test]
    fn segments_break_on_missing_values() {
        let segments = contiguous_segments(&[Some(1.0), Some(2.0), None, Some(4.0), None, None]);
        assert_eq!(
            segments,
            vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]
        );
        assert!(contiguous_segments(&[None, None]).is_empty());
    }

    #[test]
    fn padded_range_handles_flat_and_empty_input() {
        assert_eq!(padded_range([1.0, 3.0], 0.5), Some((0.0, 4.0)));
        assert_eq!(padded_range([2.0, 2.0], 0.1), Some((1.0, 3.0)));
        assert_eq!(padded_range([f64::NAN], 0.1), None);
        assert_eq!(padded_range(Vec::new(), 0.1), None);
    }
}
