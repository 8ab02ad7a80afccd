use std::collections::BTreeMap;

use itertools_num::linspace;
use plotly::common::{DashType, Font, Line, Marker, Mode, Title};
use plotly::layout::{Axis, BarMode, Layout};
use plotly::{Bar, BoxPlot, Plot, Scatter};

use crate::aggregate::{AggregateView, Category};
use crate::config::ChartStyle;
use crate::error::{ReportError, Result};
use crate::report::artifact::{
    BarData, BarSeries, BoxData, BoxGroup, Bucket, ChartArtifact, ChartData, ChartLabels,
    HistogramData, PointGroup, ScatterData,
};
use crate::stats::{self, NumericStats};

/// Reference lines drawn over a histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlay {
    pub mean: bool,
    pub median: bool,
}

impl Overlay {
    pub fn none() -> Self {
        Overlay::default()
    }

    pub fn mean() -> Self {
        Overlay {
            mean: true,
            median: false,
        }
    }

    pub fn both() -> Self {
        Overlay {
            mean: true,
            median: true,
        }
    }
}

/// Builds chart artifacts with a fixed [`ChartStyle`].
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    style: ChartStyle,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle) -> Self {
        ChartRenderer { style }
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    fn font(&self, size: usize) -> Font {
        Font::new().size(size).color(self.style.text_color.clone())
    }

    fn layout(&self, labels: &ChartLabels) -> Layout {
        let tick_font = self.font(self.style.tick_font_size);
        Layout::new()
            .title(
                Title::with_text(labels.title.as_str()).font(self.font(self.style.title_font_size)),
            )
            .font(self.font(self.style.label_font_size))
            .paper_background_color(self.style.background_color.clone())
            .plot_background_color(self.style.plot_background_color.clone())
            .x_axis(
                Axis::new()
                    .title(
                        Title::with_text(labels.x_label.as_str())
                            .font(self.font(self.style.label_font_size)),
                    )
                    .tick_font(tick_font.clone()),
            )
            .y_axis(
                Axis::new()
                    .title(
                        Title::with_text(labels.y_label.as_str())
                            .font(self.font(self.style.label_font_size)),
                    )
                    .tick_font(tick_font),
            )
    }

    /// Bin the present values into `bins` equal-width buckets spanning the
    /// observed minimum and maximum, with optional mean/median markers.
    pub fn render_histogram(
        &self,
        values: &[Option<f64>],
        bins: usize,
        overlay: Overlay,
        labels: ChartLabels,
    ) -> Result<ChartArtifact> {
        if bins == 0 {
            return Err(ReportError::InvalidArgument(
                "histogram needs at least one bin".to_string(),
            ));
        }
        let present = stats::present(values);
        if present.is_empty() {
            return Err(ReportError::InvalidArgument(format!(
                "no values to plot for {:?}",
                labels.title
            )));
        }
        let excluded = values.len() - present.len();
        if excluded > 0 {
            log::warn!(
                "{}: excluded {} missing values from the histogram",
                labels.title,
                excluded
            );
        }

        let buckets = bucketize(&present, bins);
        let mean = if overlay.mean { stats::mean(&present) } else { None };
        let median = if overlay.median { stats::median(&present) } else { None };

        let centers: Vec<f64> = buckets.iter().map(Bucket::center).collect();
        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        let peak = counts.iter().copied().max().unwrap_or(0) as f64;

        let mut plot = Plot::new();
        plot.add_trace(
            Bar::new(centers, counts)
                .name(labels.x_label.as_str())
                .marker(Marker::new().color(self.style.series_color(0))),
        );
        if let Some(m) = mean {
            plot.add_trace(
                Scatter::new(vec![m, m], vec![0.0, peak])
                    .mode(Mode::Lines)
                    .name(&format!("Mean: {:.2}", m))
                    .line(
                        Line::new()
                            .color(self.style.highlight_color.clone())
                            .dash(DashType::Dash)
                            .width(2.0),
                    ),
            );
        }
        if let Some(m) = median {
            plot.add_trace(
                Scatter::new(vec![m, m], vec![0.0, peak])
                    .mode(Mode::Lines)
                    .name(&format!("Median: {:.2}", m))
                    .line(
                        Line::new()
                            .color(self.style.text_color.clone())
                            .dash(DashType::Dot)
                            .width(2.0),
                    ),
            );
        }
        plot.set_layout(self.layout(&labels).bar_gap(0.0));

        let data = HistogramData {
            buckets,
            mean,
            median,
            excluded,
        };
        Ok(ChartArtifact::new(labels, ChartData::Histogram(data), plot))
    }

    /// One bar per primary category of `view`. A second key becomes one
    /// segment per category, stacked or grouped. When `normalized`, each
    /// bar's segments are rescaled to total 100.
    pub fn render_bar_chart(
        &self,
        view: &AggregateView,
        stacked: bool,
        normalized: bool,
        labels: ChartLabels,
    ) -> Result<ChartArtifact> {
        let table = if normalized {
            view.normalized()
        } else {
            view.unstack()
        };
        if table.rows.is_empty() {
            return Err(ReportError::InvalidArgument(format!(
                "no groups to plot for {:?}",
                labels.title
            )));
        }

        let categories: Vec<String> = table.rows.iter().map(|c| c.to_string()).collect();
        let single = view.keys().len() == 1;
        let series: Vec<BarSeries> = table
            .columns
            .iter()
            .enumerate()
            .map(|(j, column)| BarSeries {
                name: if single {
                    (if normalized { "percent" } else { "count" }).to_string()
                } else {
                    format!("{} = {}", secondary_name(view), column)
                },
                values: table.values.iter().map(|row| row[j]).collect(),
            })
            .collect();

        let mut plot = Plot::new();
        for (i, s) in series.iter().enumerate() {
            plot.add_trace(
                Bar::new(categories.clone(), s.values.clone())
                    .name(s.name.as_str())
                    .marker(Marker::new().color(self.style.series_color(i))),
            );
        }
        let mode = if stacked { BarMode::Stack } else { BarMode::Group };
        plot.set_layout(self.layout(&labels).bar_mode(mode));

        let data = BarData {
            categories,
            series,
            stacked,
            normalized,
            excluded: view.excluded(),
        };
        Ok(ChartArtifact::new(labels, ChartData::Bar(data), plot))
    }

    /// Plot `(x, y)` pairs, dropping any pair with a missing coordinate.
    /// With `color_by`, points are grouped per category and pairs with a
    /// missing category are dropped as well.
    pub fn render_scatter(
        &self,
        xs: &[Option<f64>],
        ys: &[Option<f64>],
        color_by: Option<&[Option<String>]>,
        labels: ChartLabels,
    ) -> Result<ChartArtifact> {
        check_aligned("xs", xs.len(), "ys", ys.len())?;
        if let Some(colors) = color_by {
            check_aligned("xs", xs.len(), "color_by", colors.len())?;
        }

        let mut grouped: BTreeMap<Option<Category>, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        let mut excluded = 0;
        for i in 0..xs.len() {
            let label = match color_by {
                Some(colors) => match &colors[i] {
                    Some(c) => Some(Category::new(c.as_str())),
                    None => {
                        excluded += 1;
                        continue;
                    }
                },
                None => None,
            };
            match (xs[i], ys[i]) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                    let entry = grouped.entry(label).or_default();
                    entry.0.push(x);
                    entry.1.push(y);
                }
                _ => excluded += 1,
            }
        }
        if excluded > 0 {
            log::warn!(
                "{}: excluded {} incomplete points from the scatter plot",
                labels.title,
                excluded
            );
        }

        let groups: Vec<PointGroup> = grouped
            .into_iter()
            .map(|(label, (xs, ys))| PointGroup {
                label: label.map(|c| c.to_string()),
                xs,
                ys,
            })
            .collect();

        let mut plot = Plot::new();
        for (i, group) in groups.iter().enumerate() {
            let name = group
                .label
                .clone()
                .unwrap_or_else(|| labels.y_label.clone());
            plot.add_trace(
                Scatter::new(group.xs.clone(), group.ys.clone())
                    .mode(Mode::Markers)
                    .name(name.as_str())
                    .marker(
                        Marker::new()
                            .color(self.style.series_color(i))
                            .size(8)
                            .opacity(0.7),
                    ),
            );
        }
        plot.set_layout(self.layout(&labels));

        let data = ScatterData { groups, excluded };
        Ok(ChartArtifact::new(labels, ChartData::Scatter(data), plot))
    }

    /// Distribution of `values` per category of `groups`.
    pub fn render_box_plot(
        &self,
        values: &[Option<f64>],
        groups: &[Option<String>],
        labels: ChartLabels,
    ) -> Result<ChartArtifact> {
        check_aligned("values", values.len(), "groups", groups.len())?;

        let mut grouped: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
        let mut excluded = 0;
        for (value, group) in values.iter().zip(groups.iter()) {
            match (value, group) {
                (Some(v), Some(g)) if v.is_finite() => {
                    grouped.entry(Category::new(g.as_str())).or_default().push(*v)
                }
                _ => excluded += 1,
            }
        }
        if grouped.is_empty() {
            return Err(ReportError::InvalidArgument(format!(
                "no values to plot for {:?}",
                labels.title
            )));
        }

        let mut plot = Plot::new();
        let mut box_groups = Vec::with_capacity(grouped.len());
        for (i, (label, vals)) in grouped.into_iter().enumerate() {
            let present: Vec<Option<f64>> = vals.iter().copied().map(Some).collect();
            let Some(stats) = NumericStats::from_values(&present) else {
                continue;
            };
            plot.add_trace(
                BoxPlot::<f64, f64>::new(vals)
                    .name(label.as_str())
                    .marker(Marker::new().color(self.style.series_color(i))),
            );
            box_groups.push(BoxGroup {
                label: label.to_string(),
                stats,
            });
        }
        plot.set_layout(self.layout(&labels));

        let data = BoxData {
            groups: box_groups,
            excluded,
        };
        Ok(ChartArtifact::new(labels, ChartData::Box(data), plot))
    }
}

fn secondary_name(view: &AggregateView) -> String {
    view.keys()[1..]
        .iter()
        .map(|f| f.header())
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_aligned(left: &'static str, left_len: usize, right: &'static str, right_len: usize) -> Result<()> {
    if left_len != right_len {
        return Err(ReportError::Alignment {
            left,
            left_len,
            right,
            right_len,
        });
    }
    Ok(())
}

/// Split `values` (non-empty, finite) into `bins` equal-width buckets.
/// A constant series is widened to `[v - 0.5, v + 0.5]`.
fn bucketize(values: &[f64], bins: usize) -> Vec<Bucket> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };

    let mut edges: Vec<f64> = linspace(lo, hi, bins + 1).collect();
    edges[0] = lo;
    edges[bins] = hi;
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        // Snap to the edges actually reported, guarding rounding drift.
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bucket {
            lower: edges[i],
            upper: edges[i + 1],
            count,
        })
        .collect()
}
