//! Grouped counts over categorical keys.
//!
//! An [`AggregateView`] partitions the dataset by the cross-product of one or
//! more fields. Rows with a missing value in any key are left out of the
//! partitions and counted in [`AggregateView::excluded`], so that the
//! partition counts plus the excluded count always equal the row count.
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::dataset::{Dataset, Field};
use crate::error::{ReportError, Result};

/// A category label. Numeric labels sort first, by value, and the rest
/// follow in lexical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Category(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<f64>(), other.0.parse::<f64>()) {
            (Ok(a), Ok(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Category::new(label)
    }
}

/// Counts per partition of one or more categorical keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    keys: Vec<Field>,
    counts: BTreeMap<Vec<Category>, usize>,
    excluded: usize,
}

/// Unstacked form of an aggregate view: rows are the primary key, columns
/// the secondary key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub rows: Vec<Category>,
    pub columns: Vec<Category>,
    pub values: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn row_total(&self, row: usize) -> f64 {
        self.values[row].iter().sum()
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|c| c.as_str() == row)?;
        let c = self.columns.iter().position(|c| c.as_str() == column)?;
        Some(self.values[r][c])
    }
}

/// Partition the dataset by the cross-product of `keys`.
pub fn group_by(dataset: &Dataset, keys: &[Field]) -> Result<AggregateView> {
    if keys.is_empty() {
        return Err(ReportError::InvalidArgument(
            "group_by needs at least one key".to_string(),
        ));
    }
    let columns = keys
        .iter()
        .map(|&field| dataset.categories(field))
        .collect::<Result<Vec<_>>>()?;

    let mut counts: BTreeMap<Vec<Category>, usize> = BTreeMap::new();
    let mut excluded = 0;
    for row in 0..dataset.len() {
        let key: Option<Vec<Category>> = columns
            .iter()
            .map(|column| column[row].as_deref().map(Category::new))
            .collect();
        match key {
            Some(key) => *counts.entry(key).or_default() += 1,
            None => excluded += 1,
        }
    }

    if excluded > 0 {
        log::warn!(
            "group_by {:?}: {} rows excluded for missing key values",
            keys,
            excluded
        );
    }
    log::debug!("group_by {:?}: {} partitions", keys, counts.len());

    Ok(AggregateView {
        keys: keys.to_vec(),
        counts,
        excluded,
    })
}

impl AggregateView {
    pub fn keys(&self) -> &[Field] {
        &self.keys
    }

    pub fn counts(&self) -> &BTreeMap<Vec<Category>, usize> {
        &self.counts
    }

    /// Count for one partition, zero when the partition is empty.
    pub fn count(&self, categories: &[&str]) -> usize {
        let key: Vec<Category> = categories.iter().map(|&c| Category::new(c)).collect();
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Rows that fell into some partition.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Rows left out because a key value was missing.
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn primary_categories(&self) -> Vec<Category> {
        self.split_keys()
            .map(|(primary, _)| primary)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Categories of the remaining keys, joined with `", "` when more than
    /// one. Empty for a single-key view.
    pub fn secondary_categories(&self) -> Vec<Category> {
        self.split_keys()
            .filter_map(|(_, secondary)| secondary)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn split_keys(&self) -> impl Iterator<Item = (Category, Option<Category>)> + '_ {
        self.counts.keys().map(|key| split_key(key))
    }

    /// Counts as a table. A single-key view has one `count` column.
    pub fn unstack(&self) -> CrossTab {
        let rows = self.primary_categories();
        let mut columns = self.secondary_categories();
        if columns.is_empty() {
            columns.push(Category::new("count"));
        }

        let row_index: BTreeMap<&Category, usize> =
            rows.iter().enumerate().map(|(i, c)| (c, i)).collect();
        let column_index: BTreeMap<&Category, usize> =
            columns.iter().enumerate().map(|(i, c)| (c, i)).collect();

        let mut values = vec![vec![0.0; columns.len()]; rows.len()];
        for (key, &count) in &self.counts {
            let (primary, secondary) = split_key(key);
            let r = row_index.get(&primary).copied();
            let c = match &secondary {
                Some(secondary) => column_index.get(secondary).copied(),
                None => Some(0),
            };
            // Rows and columns are collected from these same keys.
            if let (Some(r), Some(c)) = (r, c) {
                values[r][c] += count as f64;
            }
        }

        CrossTab {
            rows,
            columns,
            values,
        }
    }

    /// Like [`AggregateView::unstack`], with each row rescaled to sum to 100.
    pub fn normalized(&self) -> CrossTab {
        let mut table = self.unstack();
        for row in table.values.iter_mut() {
            let total: f64 = row.iter().sum();
            for v in row.iter_mut() {
                *v = if total > 0.0 { *v * 100.0 / total } else { 0.0 };
            }
        }
        table
    }

    /// Like [`AggregateView::unstack`], with every cell rescaled to its
    /// percentage of [`AggregateView::total`].
    pub fn shares(&self) -> CrossTab {
        let mut table = self.unstack();
        let total = self.total() as f64;
        for v in table.values.iter_mut().flatten() {
            *v = if total > 0.0 { *v * 100.0 / total } else { 0.0 };
        }
        table
    }
}

fn split_key(key: &[Category]) -> (Category, Option<Category>) {
    let secondary = match key.len() {
        0 | 1 => None,
        2 => Some(key[1].clone()),
        _ => Some(Category::new(
            key[1..]
                .iter()
                .map(Category::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )),
    };
    (key[0].clone(), secondary)
}

/// Mean of a numeric field per category of `key`, e.g. the survival rate by
/// ticket class. Rows missing either value are skipped.
pub fn mean_by(dataset: &Dataset, key: Field, value: Field) -> Result<BTreeMap<Category, f64>> {
    let keys = dataset.categories(key)?;
    let values = dataset.numeric_values(value)?;

    let mut sums: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
    for (k, v) in keys.iter().zip(values.iter()) {
        if let (Some(k), Some(v)) = (k, v) {
            let entry = sums.entry(Category::new(k.as_str())).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    Ok(sums
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_total() {
        let mut labels: Vec<Category> = ["1a", "10", "B28", "9", "2.5"]
            .iter()
            .map(|&l| Category::new(l))
            .collect();
        labels.sort();
        let sorted: Vec<&str> = labels.iter().map(Category::as_str).collect();
        assert_eq!(sorted, vec!["2.5", "9", "10", "1a", "B28"]);

        let (a, b, c) = (Category::new("9"), Category::new("10"), Category::new("1a"));
        assert!(a < b && b < c && a < c);
    }
}
