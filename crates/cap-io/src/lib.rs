//! Input and output boundaries of the planner: where the series comes from
//! and where the figures go.

pub mod loader;
pub mod pipeline;
pub mod render;

pub use loader::{
    open_source, parse_resource, parse_table, parse_workbook, FileLoader, HttpLoader, Loader,
};
pub use pipeline::plan_with;
pub use render::{
    render_fit_svg, render_taylor_svg, render_threshold_svg, FigureConfig, NullRenderer,
    PlotScene, Renderer, SvgRenderer,
};
