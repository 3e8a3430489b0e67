//! Charts module - chart descriptions and PNG rendering

mod plotter;
mod renderer;

pub use plotter::{
    select_annotations, ChartRenderer, LineChart, PlotError, ScatterChart, Series,
};
pub use renderer::PlottersRenderer;
