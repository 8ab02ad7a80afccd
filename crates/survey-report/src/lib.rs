//! survey-report: descriptive statistics and chart reports over a passenger
//! manifest.
//!
//! The crate loads the manifest once into an immutable [`Dataset`], derives
//! summaries and grouped counts from it, renders charts as explicit
//! [`ChartArtifact`] values, and saves them or composes them into an HTML
//! report. [`ReportingPipeline`] runs the whole sequence.
//!
//! Static image export goes through Kaleido and sits behind the `kaleido`
//! feature; HTML output is always available.
pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod summary;

pub use aggregate::{group_by, mean_by, AggregateView, Category, CrossTab};
pub use config::{ChartStyle, PipelineConfig};
pub use dataset::{Dataset, Field, Passenger};
pub use error::{ReportError, Result};
pub use export::{save, ExportOptions, ImageFormat};
pub use pipeline::{PipelineOutcome, ReportingPipeline, Step};
pub use report::{ChartArtifact, ChartLabels, ChartRenderer, Overlay, Report, ReportSection};
pub use summary::{describe, Summary};
