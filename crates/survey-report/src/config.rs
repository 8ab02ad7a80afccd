use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ReportError, Result};
use crate::export::ImageFormat;

/// Visual settings handed to the chart renderer at construction.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChartStyle {
    pub style_name: String,
    pub text_color: String,
    pub highlight_color: String,
    pub background_color: String,
    pub plot_background_color: String,
    pub title_font_size: usize,
    pub label_font_size: usize,
    pub tick_font_size: usize,
    /// Series colors, cycled when a chart has more series than entries.
    pub palette: Vec<String>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            style_name: "default".to_string(),
            text_color: "#333333".to_string(),
            highlight_color: "#d62728".to_string(),
            background_color: "#ffffff".to_string(),
            plot_background_color: "#f5f5f5".to_string(),
            title_font_size: 18,
            label_font_size: 14,
            tick_font_size: 12,
            palette: vec![
                "#1f77b4".to_string(),
                "#ff7f0e".to_string(),
                "#2ca02c".to_string(),
                "#9467bd".to_string(),
                "#8c564b".to_string(),
            ],
        }
    }
}

impl ChartStyle {
    /// Color for the `index`-th series.
    pub fn series_color(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return self.highlight_color.clone();
        }
        self.palette[index % self.palette.len()].clone()
    }
}

impl FromStr for ChartStyle {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "default" => Ok(ChartStyle::default()),
            "dark" => Ok(ChartStyle {
                style_name: "dark".to_string(),
                text_color: "#e6e6e6".to_string(),
                highlight_color: "#ffbf00".to_string(),
                background_color: "#111111".to_string(),
                plot_background_color: "#1e1e1e".to_string(),
                palette: vec![
                    "#8dd3c7".to_string(),
                    "#feffb3".to_string(),
                    "#bfbbd9".to_string(),
                    "#fa8174".to_string(),
                    "#81b1d2".to_string(),
                ],
                ..ChartStyle::default()
            }),
            "minimal" => Ok(ChartStyle {
                style_name: "minimal".to_string(),
                text_color: "#000000".to_string(),
                highlight_color: "#000000".to_string(),
                plot_background_color: "#ffffff".to_string(),
                title_font_size: 16,
                label_font_size: 12,
                tick_font_size: 10,
                palette: vec!["#4d4d4d".to_string(), "#a6a6a6".to_string()],
                ..ChartStyle::default()
            }),
            _ => Err(ReportError::Config(format!(
                "Unknown style: {}. Expected one of: default, dark, minimal",
                s
            ))),
        }
    }
}

/// Settings for a full pipeline run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub format: ImageFormat,
    pub width: usize,
    pub height: usize,
    pub scale: f64,
    pub histogram_bins: usize,
    pub write_report: bool,
    pub report_title: String,
    pub style: ChartStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_path: PathBuf::from("data/titanic.csv"),
            output_dir: PathBuf::from("charts"),
            format: ImageFormat::default(),
            width: 800,
            height: 500,
            scale: 1.0,
            histogram_bins: 20,
            write_report: true,
            report_title: "Titanic Passenger Manifest".to_string(),
            style: ChartStyle::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReportError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        let config: PipelineConfig = serde_json::from_str(&content).map_err(|e| {
            ReportError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            return Err(ReportError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ReportError::Config(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(ReportError::Config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}
