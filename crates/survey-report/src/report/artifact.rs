use std::fmt;

use plotly::Plot;
use serde::Serialize;

use crate::stats::NumericStats;

/// Title and axis labels of a chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl ChartLabels {
    pub fn new(title: impl Into<String>) -> Self {
        ChartLabels {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn x(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn y(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }
}

/// One histogram interval. Intervals are half-open except the last, which
/// also includes its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl Bucket {
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramData {
    pub buckets: Vec<Bucket>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Entries dropped because they were missing.
    pub excluded: usize,
}

impl HistogramData {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Lower edge of the first bucket and upper edge of the last.
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.buckets.first()?.lower, self.buckets.last()?.upper))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarData {
    /// One bar (or bar group) per primary category.
    pub categories: Vec<String>,
    /// One segment per secondary category, aligned with `categories`.
    pub series: Vec<BarSeries>,
    pub stacked: bool,
    pub normalized: bool,
    pub excluded: usize,
}

impl BarData {
    /// Sum of all segments of the bar at `index`.
    pub fn bar_total(&self, index: usize) -> f64 {
        self.series.iter().filter_map(|s| s.values.get(index)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGroup {
    /// Category the points were colored by, `None` when uncolored.
    pub label: Option<String>,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub groups: Vec<PointGroup>,
    pub excluded: usize,
}

impl ScatterData {
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.xs.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub label: String,
    pub stats: NumericStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxData {
    pub groups: Vec<BoxGroup>,
    pub excluded: usize,
}

/// Data a chart was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Histogram(HistogramData),
    Bar(BarData),
    Scatter(ScatterData),
    Box(BoxData),
}

/// A rendered chart, ready to be saved or placed in a report.
#[derive(Clone)]
pub struct ChartArtifact {
    name: String,
    labels: ChartLabels,
    data: ChartData,
    plot: Plot,
}

impl ChartArtifact {
    pub fn new(labels: ChartLabels, data: ChartData, plot: Plot) -> Self {
        ChartArtifact {
            name: slugify(&labels.title),
            labels,
            data,
            plot,
        }
    }

    /// Replace the file-name stem used when saving.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.labels.title
    }

    pub fn labels(&self) -> &ChartLabels {
        &self.labels
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn plot(&self) -> &Plot {
        &self.plot
    }

    pub fn histogram(&self) -> Option<&HistogramData> {
        match &self.data {
            ChartData::Histogram(h) => Some(h),
            _ => None,
        }
    }

    pub fn bars(&self) -> Option<&BarData> {
        match &self.data {
            ChartData::Bar(b) => Some(b),
            _ => None,
        }
    }

    pub fn scatter(&self) -> Option<&ScatterData> {
        match &self.data {
            ChartData::Scatter(s) => Some(s),
            _ => None,
        }
    }

    pub fn boxes(&self) -> Option<&BoxData> {
        match &self.data {
            ChartData::Box(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Debug for ChartArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartArtifact")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Lowercase alphanumeric stem with `_` separators.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        "chart".to_string()
    } else {
        slug
    }
}
