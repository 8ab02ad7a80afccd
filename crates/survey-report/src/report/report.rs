use std::fs;
use std::path::Path;

use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::aggregate::CrossTab;
use crate::error::{ReportError, Result};
use crate::report::artifact::ChartArtifact;
use crate::summary::Summary;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const REPORT_CSS: &str = r#"
body { font-family: system-ui, -apple-system, sans-serif; margin: 0 auto; max-width: 1400px; padding: 24px; color: #222; }
header { border-bottom: 1px solid #ddd; margin-bottom: 24px; }
header .meta { color: #777; font-size: 13px; }
section { margin-bottom: 40px; }
.row { display: flex; flex-wrap: wrap; gap: 16px; }
.row > .chart { flex: 1 1 0; min-width: 420px; }
table { border-collapse: collapse; font-size: 13px; margin: 12px 0; }
th, td { border: 1px solid #ddd; padding: 4px 10px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
caption { caption-side: top; text-align: left; font-weight: 600; padding-bottom: 6px; }
"#;

enum Block {
    Text(String),
    Charts(Vec<ChartArtifact>),
    Summary(Summary),
    Table { caption: String, table: CrossTab },
    Pairs { caption: String, rows: Vec<(String, String)> },
}

/// A titled group of prose, charts and tables.
pub struct ReportSection {
    title: String,
    blocks: Vec<Block>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn add_content(&mut self, text: &str) {
        self.blocks.push(Block::Text(text.to_string()));
    }

    pub fn add_plot(&mut self, artifact: ChartArtifact) {
        self.blocks.push(Block::Charts(vec![artifact]));
    }

    /// Place several charts side by side.
    pub fn add_row(&mut self, artifacts: Vec<ChartArtifact>) {
        if !artifacts.is_empty() {
            self.blocks.push(Block::Charts(artifacts));
        }
    }

    pub fn add_summary(&mut self, summary: &Summary) {
        self.blocks.push(Block::Summary(summary.clone()));
    }

    pub fn add_table(&mut self, caption: &str, table: CrossTab) {
        self.blocks.push(Block::Table {
            caption: caption.to_string(),
            table,
        });
    }

    pub fn add_pairs(&mut self, caption: &str, rows: Vec<(String, String)>) {
        self.blocks.push(Block::Pairs {
            caption: caption.to_string(),
            rows,
        });
    }

    pub fn chart_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|b| match b {
                Block::Charts(charts) => charts.len(),
                _ => 0,
            })
            .sum()
    }

    fn render(&self, index: usize) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for (j, block) in self.blocks.iter().enumerate() {
                    @match block {
                        Block::Text(text) => { p { (text) } },
                        Block::Charts(charts) => {
                            div class="row" {
                                @for (k, chart) in charts.iter().enumerate() {
                                    @let div_id = format!("plot-{}-{}-{}", index, j, k);
                                    div class="chart" {
                                        (PreEscaped(chart.plot().to_inline_html(Some(div_id.as_str()))))
                                    }
                                }
                            }
                        },
                        Block::Summary(summary) => { (render_summary(summary)) },
                        Block::Table { caption, table } => { (render_crosstab(caption, table)) },
                        Block::Pairs { caption, rows } => {
                            table {
                                caption { (caption) }
                                @for (key, value) in rows {
                                    tr { td { (key) } td { (value) } }
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}

/// A standalone HTML document composed of sections.
pub struct Report {
    title: String,
    subtitle: Option<String>,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str) -> Self {
        Report {
            title: title.to_string(),
            subtitle: None,
            sections: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> usize {
        self.sections.len()
    }

    pub fn render(&self) -> Markup {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_JS) {}
                    style { (PreEscaped(REPORT_CSS)) }
                }
                body {
                    header {
                        h1 { (self.title) }
                        @if let Some(subtitle) = &self.subtitle {
                            p { (subtitle) }
                        }
                        p class="meta" { "Generated " (generated) }
                    }
                    @for (i, section) in self.sections.iter().enumerate() {
                        (section.render(i))
                    }
                }
            }
        }
    }

    pub fn to_html(&self) -> String {
        self.render().into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_html()).map_err(|e| ReportError::io(path, e))?;
        log::info!("Report written to {}", path.display());
        Ok(())
    }
}

fn fmt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

fn render_summary(summary: &Summary) -> Markup {
    html! {
        table {
            caption { (summary.row_count) " rows x " (summary.column_count) " columns" }
            tr {
                th { "column" } th { "kind" } th { "count" } th { "missing" }
                th { "mean" } th { "std" } th { "min" } th { "25%" } th { "50%" } th { "75%" } th { "max" }
                th { "unique" } th { "top" } th { "freq" }
            }
            @for column in &summary.columns {
                tr {
                    td { (column.field.header()) }
                    td { (column.kind.to_string()) }
                    td { (column.non_missing) }
                    td { (column.missing) }
                    @match &column.numeric {
                        Some(s) => {
                            td { (fmt_num(Some(s.mean))) }
                            td { (fmt_num(s.std)) }
                            td { (fmt_num(Some(s.min))) }
                            td { (fmt_num(Some(s.q1))) }
                            td { (fmt_num(Some(s.median))) }
                            td { (fmt_num(Some(s.q3))) }
                            td { (fmt_num(Some(s.max))) }
                        },
                        None => {
                            @for _ in 0..7 { td { "-" } }
                        },
                    }
                    @match &column.categorical {
                        Some(c) => {
                            td { (c.unique) }
                            td { (c.top) }
                            td { (c.freq) }
                        },
                        None => {
                            @for _ in 0..3 { td { "-" } }
                        },
                    }
                }
            }
        }
    }
}

fn render_crosstab(caption: &str, table: &CrossTab) -> Markup {
    html! {
        table {
            caption { (caption) }
            tr {
                th {}
                @for column in &table.columns { th { (column.as_str()) } }
            }
            @for (row, values) in table.rows.iter().zip(table.values.iter()) {
                tr {
                    td { (row.as_str()) }
                    @for v in values { td { (format!("{:.1}", v)) } }
                }
            }
        }
    }
}
