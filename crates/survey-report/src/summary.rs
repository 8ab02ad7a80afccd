//! Descriptive summary of a dataset, the equivalent of a `describe()` call.
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::dataset::{Column, ColumnKind, Dataset, Field};
use crate::stats::NumericStats;

/// Frequency summary for non-numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalStats {
    pub unique: usize,
    pub top: String,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub field: Field,
    pub kind: ColumnKind,
    pub non_missing: usize,
    pub missing: usize,
    pub numeric: Option<NumericStats>,
    pub categorical: Option<CategoricalStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnSummary>,
}

/// Summarize every known column of the dataset.
pub fn describe(dataset: &Dataset) -> Summary {
    let columns = dataset
        .columns()
        .iter()
        .filter_map(|&field| dataset.column(field).ok().map(|c| summarize(field, &c)))
        .collect::<Vec<_>>();

    Summary {
        row_count: dataset.len(),
        column_count: columns.len(),
        columns,
    }
}

fn summarize(field: Field, column: &Column) -> ColumnSummary {
    let missing = column.missing();
    let (numeric, categorical) = match column {
        Column::Numeric(values) => (NumericStats::from_values(values), None),
        Column::Categorical(values) => (None, frequencies(values)),
    };

    ColumnSummary {
        field,
        kind: field.kind(),
        non_missing: column.len() - missing,
        missing,
        numeric,
        categorical,
    }
}

fn frequencies(values: &[Option<String>]) -> Option<CategoricalStats> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    // Ties resolve to the lexically smallest label so output is stable.
    let (top, freq) = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))?;

    Some(CategoricalStats {
        unique: counts.len(),
        top: top.to_string(),
        freq: *freq,
    })
}

impl Summary {
    pub fn column(&self, field: Field) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} rows x {} columns", self.row_count, self.column_count)?;
        writeln!(
            f,
            "{:<12} {:<12} {:>7} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "column", "kind", "count", "missing", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for column in &self.columns {
            match &column.numeric {
                Some(stats) => writeln!(
                    f,
                    "{:<12} {:<12} {:>7} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                    column.field.header(),
                    column.kind.to_string(),
                    column.non_missing,
                    column.missing,
                    fmt_opt(Some(stats.mean)),
                    fmt_opt(stats.std),
                    fmt_opt(Some(stats.min)),
                    fmt_opt(Some(stats.q1)),
                    fmt_opt(Some(stats.median)),
                    fmt_opt(Some(stats.q3)),
                    fmt_opt(Some(stats.max)),
                )?,
                None => {
                    let detail = column.categorical.as_ref().map_or_else(
                        || "-".to_string(),
                        |c| format!("unique={} top={} freq={}", c.unique, c.top, c.freq),
                    );
                    writeln!(
                        f,
                        "{:<12} {:<12} {:>7} {:>7} {}",
                        column.field.header(),
                        column.kind.to_string(),
                        column.non_missing,
                        column.missing,
                        detail
                    )?
                }
            }
        }
        Ok(())
    }
}
