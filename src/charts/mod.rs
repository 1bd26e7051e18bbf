//! Charts module - Chart rendering

mod plotter;
mod renderer;
pub mod scale;

pub use plotter::ChartPlotter;
pub use renderer::{
    RenderError, StaticChartRenderer, AGGREGATES_FILE, CATEGORIES_FILE, MAP_FILE, STATES_FILE,
    TREND_FILE,
};
