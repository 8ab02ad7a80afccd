use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the reporting pipeline.
///
/// Every operation fails at the point of the problem and hands the error
/// back to the caller; nothing here is retried.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Input file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {} (line {}): {message}", .path.display(), .line.map_or("?".to_string(), |l| l.to_string()))]
    Format {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    #[error("Series lengths differ: {left} ({left_len}) vs {right} ({right_len})")]
    Alignment {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported output format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Exporting {0} images requires the `kaleido` feature")]
    ExportUnavailable(String),

    #[error("Image export to {} failed: {message}", .path.display())]
    Export { path: PathBuf, message: String },

    #[error("Column {0:?} is not present in the dataset")]
    UnknownColumn(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
