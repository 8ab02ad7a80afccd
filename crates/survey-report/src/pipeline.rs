//! The fixed sequence of statistics and charts produced for a manifest.
//!
//! Each chart is rendered and saved before the next one starts, so a
//! failure halts the run while everything written so far stays on disk.
use std::fs;
use std::path::PathBuf;

use crate::aggregate::{group_by, mean_by};
use crate::config::PipelineConfig;
use crate::dataset::{Dataset, Field};
use crate::error::{ReportError, Result};
use crate::export::ExportOptions;
use crate::report::artifact::{ChartArtifact, ChartLabels};
use crate::report::plots::{ChartRenderer, Overlay};
use crate::report::report::{Report, ReportSection};
use crate::summary::{describe, Summary};

/// Charts produced by a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SurvivalCounts,
    SurvivalByClass,
    SurvivalShareByClass,
    SurvivalBySex,
    AgeDistribution,
    FareDistribution,
    AgeVsFare,
    AgeByClass,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::SurvivalCounts,
        Step::SurvivalByClass,
        Step::SurvivalShareByClass,
        Step::SurvivalBySex,
        Step::AgeDistribution,
        Step::FareDistribution,
        Step::AgeVsFare,
        Step::AgeByClass,
    ];

    /// File-name stem of the chart.
    pub fn name(&self) -> &'static str {
        match self {
            Step::SurvivalCounts => "survival_counts",
            Step::SurvivalByClass => "survival_by_class",
            Step::SurvivalShareByClass => "survival_share_by_class",
            Step::SurvivalBySex => "survival_by_sex",
            Step::AgeDistribution => "age_distribution",
            Step::FareDistribution => "fare_distribution",
            Step::AgeVsFare => "age_vs_fare",
            Step::AgeByClass => "age_by_class",
        }
    }
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub summary: Summary,
    pub charts: Vec<PathBuf>,
    pub report: Option<PathBuf>,
}

pub struct ReportingPipeline {
    config: PipelineConfig,
    renderer: ChartRenderer,
}

impl ReportingPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let renderer = ChartRenderer::new(config.style.clone());
        Ok(ReportingPipeline { config, renderer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions {
            width: self.config.width,
            height: self.config.height,
            scale: self.config.scale,
        }
    }

    /// Render one chart of the sequence.
    pub fn render_step(&self, step: Step, dataset: &Dataset) -> Result<ChartArtifact> {
        let bins = self.config.histogram_bins;
        let artifact = match step {
            Step::SurvivalCounts => {
                let view = group_by(dataset, &[Field::Survived])?;
                self.renderer.render_bar_chart(
                    &view,
                    false,
                    false,
                    ChartLabels::new("Survival Counts")
                        .x("Survived (0 = no, 1 = yes)")
                        .y("Passengers"),
                )?
            }
            Step::SurvivalByClass => {
                let view = group_by(dataset, &[Field::Pclass, Field::Survived])?;
                self.renderer.render_bar_chart(
                    &view,
                    true,
                    false,
                    ChartLabels::new("Survival by Ticket Class")
                        .x("Ticket class")
                        .y("Passengers"),
                )?
            }
            Step::SurvivalShareByClass => {
                let view = group_by(dataset, &[Field::Pclass, Field::Survived])?;
                self.renderer.render_bar_chart(
                    &view,
                    true,
                    true,
                    ChartLabels::new("Survival Share by Ticket Class")
                        .x("Ticket class")
                        .y("Percent of class"),
                )?
            }
            Step::SurvivalBySex => {
                let view = group_by(dataset, &[Field::Sex, Field::Survived])?;
                self.renderer.render_bar_chart(
                    &view,
                    false,
                    false,
                    ChartLabels::new("Survival by Sex").x("Sex").y("Passengers"),
                )?
            }
            Step::AgeDistribution => self.renderer.render_histogram(
                &dataset.numeric_values(Field::Age)?,
                bins,
                Overlay::both(),
                ChartLabels::new("Age Distribution").x("Age").y("Passengers"),
            )?,
            Step::FareDistribution => self.renderer.render_histogram(
                &dataset.numeric_values(Field::Fare)?,
                bins,
                Overlay::mean(),
                ChartLabels::new("Fare Distribution").x("Fare").y("Passengers"),
            )?,
            Step::AgeVsFare => {
                let colors = dataset.categories(Field::Survived)?;
                self.renderer.render_scatter(
                    &dataset.numeric_values(Field::Age)?,
                    &dataset.numeric_values(Field::Fare)?,
                    Some(colors.as_slice()),
                    ChartLabels::new("Age vs Fare").x("Age").y("Fare"),
                )?
            }
            Step::AgeByClass => self.renderer.render_box_plot(
                &dataset.numeric_values(Field::Age)?,
                &dataset.categories(Field::Pclass)?,
                ChartLabels::new("Age by Ticket Class")
                    .x("Ticket class")
                    .y("Age"),
            )?,
        };
        Ok(artifact.with_name(step.name()))
    }

    /// Load the manifest, summarize it, save every chart, and write the
    /// HTML report when enabled.
    pub fn run(&self) -> Result<PipelineOutcome> {
        let dataset = Dataset::load(&self.config.data_path)?;
        self.run_with(&dataset)
    }

    /// Like [`ReportingPipeline::run`] over a dataset already in memory.
    pub fn run_with(&self, dataset: &Dataset) -> Result<PipelineOutcome> {
        let summary = describe(dataset);
        log::info!("Dataset summary:\n{}", summary);

        let out_dir = &self.config.output_dir;
        fs::create_dir_all(out_dir).map_err(|e| ReportError::io(out_dir, e))?;

        let options = self.export_options();
        let mut charts = Vec::with_capacity(Step::ALL.len());
        let mut artifacts = Vec::with_capacity(Step::ALL.len());
        for step in Step::ALL {
            log::info!("Rendering {}", step.name());
            let artifact = self.render_step(step, dataset)?;
            charts.push(artifact.save_in(out_dir, self.config.format, &options)?);
            artifacts.push(artifact);
        }

        let report = if self.config.write_report {
            let path = out_dir.join("report.html");
            self.compose_report(dataset, &summary, artifacts)?
                .save_to_file(&path)?;
            Some(path)
        } else {
            None
        };

        Ok(PipelineOutcome {
            summary,
            charts,
            report,
        })
    }

    /// Lay out the artifacts (in [`Step::ALL`] order) into report sections.
    pub fn compose_report(
        &self,
        dataset: &Dataset,
        summary: &Summary,
        artifacts: Vec<ChartArtifact>,
    ) -> Result<Report> {
        if artifacts.len() != Step::ALL.len() {
            return Err(ReportError::InvalidArgument(format!(
                "expected {} charts for the report, got {}",
                Step::ALL.len(),
                artifacts.len()
            )));
        }
        let mut charts = artifacts.into_iter();
        let mut next = || charts.next().into_iter().collect::<Vec<_>>();

        let source = dataset
            .source()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "in-memory records".to_string());
        let mut report = Report::new(&self.config.report_title)
            .with_subtitle(&format!("{} passengers from {}", dataset.len(), source));

        let mut overview = ReportSection::new("Overview");
        overview.add_content(
            "Descriptive statistics for every known column. Numeric columns list \
             quartiles; categorical columns list their most frequent value.",
        );
        overview.add_summary(summary);
        report.add_section(overview);

        let mut survival = ReportSection::new("Survival");
        let counts = next();
        let by_class = next();
        let share_by_class = next();
        let by_sex = next();
        survival.add_row([counts, by_sex].concat());
        survival.add_row([by_class, share_by_class].concat());
        let rates = mean_by(dataset, Field::Pclass, Field::Survived)?
            .into_iter()
            .map(|(class, rate)| (format!("Class {}", class), format!("{:.1}%", rate * 100.0)))
            .collect();
        survival.add_pairs("Survival rate by ticket class", rates);
        survival.add_table(
            "Survival by sex (% of each sex)",
            group_by(dataset, &[Field::Sex, Field::Survived])?.normalized(),
        );
        report.add_section(survival);

        let mut age_fare = ReportSection::new("Age and Fare");
        age_fare.add_content(
            "Passengers without a recorded age are left out of the age charts.",
        );
        age_fare.add_row([next(), next()].concat());
        age_fare.add_row([next(), next()].concat());
        report.add_section(age_fare);

        Ok(report)
    }
}
