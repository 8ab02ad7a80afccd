use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;

use survey_report::{ChartStyle, ImageFormat, PipelineConfig, PipelineOutcome, ReportingPipeline};

use crate::util::validate_tsv_or_csv_file;

/// Build the pipeline configuration from an optional JSON file and the
/// `run` subcommand's overrides.
pub fn config_from_arguments(
    config_path: Option<&PathBuf>,
    matches: &ArgMatches,
) -> Result<PipelineConfig> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => PipelineConfig::default(),
    };

    if let Some(data) = matches.get_one::<PathBuf>("data") {
        config.data_path = data.clone();
    }
    validate_tsv_or_csv_file(&config.data_path)?;

    if let Some(output_dir) = matches.get_one::<PathBuf>("output_dir") {
        config.output_dir = output_dir.clone();
    }

    if let Some(format) = matches.get_one::<String>("format") {
        config.format = ImageFormat::from_str(format)?;
    }

    if let Some(bins) = matches.get_one::<usize>("bins") {
        config.histogram_bins = *bins;
    }

    if let Some(style) = matches.get_one::<String>("style") {
        config.style = ChartStyle::from_str(style)?;
    }

    if matches.get_flag("no_report") {
        config.write_report = false;
    }

    config.validate()?;
    Ok(config)
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let pipeline = ReportingPipeline::new(config.clone())?;
    let outcome = pipeline
        .run()
        .with_context(|| format!("Report run over {:?} failed", config.data_path))?;
    Ok(outcome)
}
