use std::fmt::Write;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use survey_report::{describe, group_by, Dataset, Field};

use crate::util::validate_tsv_or_csv_file;

/// Summary of the manifest at `path`, as a text table or JSON.
pub fn describe_file(path: &Path, json: bool) -> Result<String> {
    validate_tsv_or_csv_file(path)?;
    let dataset = Dataset::load(path)?;
    let summary = describe(&dataset);
    if json {
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")
    } else {
        Ok(summary.to_string())
    }
}

/// Grouped counts of the manifest at `path` as a text table. The first key
/// forms the rows, any further keys the columns.
pub fn group_file(path: &Path, keys: &[String], normalize: bool) -> Result<String> {
    validate_tsv_or_csv_file(path)?;
    let fields = keys
        .iter()
        .map(|k| Field::from_str(k))
        .collect::<Result<Vec<_>, _>>()?;

    let dataset = Dataset::load(path)?;
    let view = group_by(&dataset, &fields)?;
    let table = if normalize {
        view.normalized()
    } else {
        view.unstack()
    };

    let mut out = String::new();
    write!(out, "{:<12}", fields[0].header())?;
    for column in &table.columns {
        write!(out, " {:>10}", column.as_str())?;
    }
    writeln!(out)?;
    for (row, values) in table.rows.iter().zip(table.values.iter()) {
        write!(out, "{:<12}", row.as_str())?;
        for v in values {
            if normalize {
                write!(out, " {:>10.1}", v)?;
            } else {
                write!(out, " {:>10}", *v as usize)?;
            }
        }
        writeln!(out)?;
    }
    write!(
        out,
        "total={} excluded={}",
        view.total(),
        view.excluded()
    )?;
    Ok(out)
}
