//! litscope-charts — PNG charts for the two litscope pipelines.
//! - Publications per year as a categorical bar chart
//! - Project schedule as a Gantt chart

pub mod bar;
pub mod error;
pub mod fonts;
pub mod gantt;
pub mod palette;

pub use bar::{render_year_counts, BarChartStyle};
pub use error::ChartError;
pub use gantt::{render_gantt, GanttStyle};
