//! Static Chart Renderer
//! Writes line and scatter charts as PNG files with plotters' bitmap backend.

use super::plotter::{
    contiguous_segments, padded_range, ChartRenderer, LineChart, PlotError, ScatterChart,
};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::Path;
use tracing::info;

// ggplot-like line colors
const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(226, 74, 51),   // Red
    RGBColor(52, 138, 189),  // Blue
    RGBColor(152, 142, 213), // Purple
    RGBColor(119, 119, 119), // Grey
];
const POINT_COLOR: RGBColor = RGBColor(52, 138, 189);

/// Quarter labels shown on the x axis at most.
const MAX_CATEGORY_LABELS: usize = 24;

fn drawing_error(e: impl std::fmt::Display) -> PlotError {
    PlotError::Drawing(e.to_string())
}

/// PNG renderer backed by plotters.
pub struct PlottersRenderer {
    /// 12x6 inches at 100 DPI
    pub line_size: (u32, u32),
    /// 12x8 inches at 100 DPI
    pub scatter_size: (u32, u32),
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self {
            line_size: (1200, 600),
            scatter_size: (1200, 800),
        }
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render_lines(&mut self, chart: &LineChart, path: &Path) -> Result<(), PlotError> {
        if chart.categories.is_empty() {
            return Err(PlotError::InvalidData("no categories to plot".to_string()));
        }
        let (y_min, y_max) = padded_range(
            chart
                .series
                .iter()
                .flat_map(|s| s.values.iter().flatten().copied()),
            0.05,
        )
        .ok_or_else(|| PlotError::InvalidData(format!("'{}' has no values", chart.title)))?;

        let root = BitMapBackend::new(path, self.line_size).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        let n = chart.categories.len();
        let x_max = (n.max(2) - 1) as f64;
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(90)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        let categories = &chart.categories;
        let category_label = |x: &f64| {
            let i = x.round();
            if (x - i).abs() < 1e-6 && i >= 0.0 {
                categories.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };

        ctx.configure_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_labels(n.min(MAX_CATEGORY_LABELS))
            .x_label_formatter(&category_label)
            .x_label_style(
                ("sans-serif", 12)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .draw()
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        for (idx, series) in chart.series.iter().enumerate() {
            let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
            for (segment_idx, segment) in contiguous_segments(&series.values)
                .into_iter()
                .enumerate()
            {
                let drawn = ctx
                    .draw_series(LineSeries::new(segment, color.stroke_width(2)))
                    .map_err(drawing_error)?;
                // One legend entry per series
                if segment_idx == 0 {
                    drawn.label(series.label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                }
            }
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
        info!(path = %path.display(), series = chart.series.len(), "wrote line chart");
        Ok(())
    }

    fn render_scatter(&mut self, chart: &ScatterChart, path: &Path) -> Result<(), PlotError> {
        let all_points = || chart.points.iter().chain(chart.trend.iter());
        let (x_min, x_max) = padded_range(all_points().map(|p| p.0), 0.05)
            .ok_or_else(|| PlotError::InvalidData("no points to plot".to_string()))?;
        let (y_min, y_max) = padded_range(all_points().map(|p| p.1), 0.05)
            .ok_or_else(|| PlotError::InvalidData("no points to plot".to_string()))?;

        let root = BitMapBackend::new(path, self.scatter_size).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        ctx.configure_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .draw()
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        // Trend line below the points
        if !chart.trend.is_empty() {
            ctx.draw_series(DashedLineSeries::new(
                chart.trend.iter().copied(),
                10,
                6,
                RED.stroke_width(2),
            ))
            .map_err(drawing_error)?
            .label(chart.trend_label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        }

        ctx.draw_series(
            chart
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 8, POINT_COLOR.mix(0.7).filled())),
        )
        .map_err(drawing_error)?;
        ctx.draw_series(
            chart
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 8, BLACK.stroke_width(1))),
        )
        .map_err(drawing_error)?;

        let label_style = ("sans-serif", 14).into_font().color(&BLACK);
        ctx.draw_series(chart.annotations.iter().map(|note| {
            EmptyElement::at((note.x, note.y))
                + Text::new(note.text.clone(), (8, 4), label_style.clone())
        }))
        .map_err(drawing_error)?;

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
        info!(
            path = %path.display(),
            points = chart.points.len(),
            annotations = chart.annotations.len(),
            "wrote scatter chart"
        );
        Ok(())
    }
}
