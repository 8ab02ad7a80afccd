//! Chart rendering and report composition.
//!
//! `plots` turns columns and aggregate views into [`ChartArtifact`]s built on
//! `plotly::Plot`; `report` places artifacts, prose and tables side by side
//! in a single HTML document rendered with `maud`.
pub mod artifact;
pub mod plots;
pub mod report;

pub use artifact::{ChartArtifact, ChartData, ChartLabels};
pub use plots::{ChartRenderer, Overlay};
pub use report::{Report, ReportSection};
