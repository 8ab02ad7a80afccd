//! Persisting chart artifacts.
//!
//! HTML output is written directly from the plotly figure. Static images
//! (PNG, JPEG, WebP, SVG, PDF) go through the Kaleido engine and are only
//! available when the crate is built with the `kaleido` feature.
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::report::artifact::ChartArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Svg,
    Pdf,
    Html,
}

/// `png` when the image engine is compiled in, `html` otherwise.
impl Default for ImageFormat {
    #[cfg(feature = "kaleido")]
    fn default() -> Self {
        ImageFormat::Png
    }

    #[cfg(not(feature = "kaleido"))]
    fn default() -> Self {
        ImageFormat::Html
    }
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Html => "html",
        }
    }

    /// Formats rendered by the static image engine.
    pub fn needs_image_engine(&self) -> bool {
        !matches!(self, ImageFormat::Html)
    }

    /// Infer the format from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "webp" => Ok(ImageFormat::Webp),
            "svg" => Ok(ImageFormat::Svg),
            "pdf" => Ok(ImageFormat::Pdf),
            "html" | "htm" => Ok(ImageFormat::Html),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Pixel size and scale of exported images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub width: usize,
    pub height: usize,
    pub scale: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            width: 800,
            height: 500,
            scale: 1.0,
        }
    }
}

/// Write `artifact` to `path` in `format`. The path's extension is replaced
/// by the format's. Returns the path actually written.
pub fn save<P: AsRef<Path>>(
    artifact: &ChartArtifact,
    path: P,
    format: ImageFormat,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let path = path.as_ref().with_extension(format.extension());
    let written = match format {
        ImageFormat::Html => {
            write_html(artifact, &path)?;
            path
        }
        _ => export_image(artifact, &path, format, options)?,
    };
    log::info!("Saved {:?} to {}", artifact.title(), written.display());
    Ok(written)
}

/// Like [`save`], with the format named by a string such as `"png"`.
pub fn save_as<P: AsRef<Path>>(
    artifact: &ChartArtifact,
    path: P,
    format: &str,
    options: &ExportOptions,
) -> Result<PathBuf> {
    save(artifact, path, format.parse()?, options)
}

fn write_html(artifact: &ChartArtifact, path: &Path) -> Result<()> {
    fs::write(path, artifact.plot().to_html()).map_err(|e| ReportError::io(path, e))
}

#[cfg(feature = "kaleido")]
fn export_image(
    artifact: &ChartArtifact,
    path: &Path,
    format: ImageFormat,
    options: &ExportOptions,
) -> Result<PathBuf> {
    // Fail on a missing target directory before handing off to the engine.
    // The target itself is only created by a successful export.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(ReportError::io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("directory {} does not exist", dir.display()),
            ),
        ));
    }

    let figure = serde_json::to_value(artifact.plot()).map_err(|e| ReportError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    // Kaleido::new panics when the engine binary is missing.
    let kaleido = std::panic::catch_unwind(plotly_kaleido::Kaleido::new).map_err(|_| {
        ReportError::Export {
            path: path.to_path_buf(),
            message: "Kaleido executable not found".to_string(),
        }
    })?;
    kaleido
        .save(
            path,
            &figure,
            format.extension(),
            options.width,
            options.height,
            options.scale,
        )
        .map_err(|e| ReportError::Export {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(path.to_path_buf())
}

#[cfg(not(feature = "kaleido"))]
fn export_image(
    _artifact: &ChartArtifact,
    _path: &Path,
    format: ImageFormat,
    _options: &ExportOptions,
) -> Result<PathBuf> {
    Err(ReportError::ExportUnavailable(format.to_string()))
}

impl ChartArtifact {
    /// Save into `dir` as `<name>.<ext>`.
    pub fn save_in<P: AsRef<Path>>(
        &self,
        dir: P,
        format: ImageFormat,
        options: &ExportOptions,
    ) -> Result<PathBuf> {
        let path = dir
            .as_ref()
            .join(format!("{}.{}", self.name(), format.extension()));
        save(self, path, format, options)
    }
}
