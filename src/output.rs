//! Output formatting and persistence for classification results and trial summaries.
//!
//! Supports JSON logging and files, CSV append, and the per-region category tables.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::TrialSummary;
use crate::config::CategoryConfig;
use crate::query::{Flag, Region};
use csv::WriterBuilder;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, creating parent directories.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, record: &impl Serialize) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

/// Category totals of every suite for one flag and region.
///
/// The first row holds the update cutoff hours of each suite after an empty
/// corner cell, then one row per category and a final `total` row.
pub fn category_table(
    summary: &TrialSummary,
    categories: &[CategoryConfig],
    flag: Flag,
    region: Region,
) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(categories.len() + 2);

    let mut header = vec![String::new()];
    header.extend(summary.update_hours().iter().map(|h| h.to_string()));
    rows.push(header);

    let mut totals = vec![0.0; summary.suites.len()];
    for cat in categories {
        let mut row = vec![cat.name.clone()];
        for (i, suite) in summary.suites.iter().enumerate() {
            let value = suite
                .region(flag, region)
                .and_then(|r| r.category_total(&cat.name))
                .unwrap_or(0.0);
            totals[i] += value;
            row.push(value.to_string());
        }
        rows.push(row);
    }

    let mut total_row = vec!["total".to_string()];
    total_row.extend(totals.iter().map(|t| t.to_string()));
    rows.push(total_row);

    rows
}

/// Writes `<dir>/<region>/<flag>_mean_total_obs.csv` for every flag and region.
pub fn write_category_tables(
    summary: &TrialSummary,
    categories: &[CategoryConfig],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for region in Region::ALL {
        let region_dir = dir.join(region.as_str());
        fs::create_dir_all(&region_dir)
            .with_context(|| format!("creating {}", region_dir.display()))?;

        for flag in Flag::ALL {
            let path = region_dir.join(format!("{}_mean_total_obs.csv", flag));
            let mut writer = WriterBuilder::new().has_headers(false).from_path(&path)?;
            for row in category_table(summary, categories, flag, region) {
                writer.write_record(&row)?;
            }
            writer.flush()?;
            written.push(path);
        }
    }

    Ok(written)
}
