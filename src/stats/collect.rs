use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::store::StatsStore;
use super::types::CycleRecord;
use crate::archive::{ArchiveStore, FileLocator, RunType, gunzip};
use crate::error::FileError;
use crate::query::{self, Flag, QueryTool, Region};
use crate::timestamp::cycle_label;

/// Totals over a collection run.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct CollectSummary {
    pub cycles_written: usize,
    pub cycles_skipped: usize,
    pub cycles_failed: usize,
    pub files_processed: usize,
    pub files_failed: usize,
}

/// Sequentially pulls archive files through the query tool and stores the counts.
pub struct Collector<'a> {
    pub archive: &'a dyn ArchiveStore,
    pub tool: &'a dyn QueryTool,
    pub store: &'a StatsStore,
    pub run_type: RunType,
    /// Where files are downloaded and decompressed; emptied file by file.
    pub scratch_dir: PathBuf,
    /// Plain-text list of archive files that could not be processed.
    pub failed_log: PathBuf,
}

impl Collector<'_> {
    /// Processes every suite and cycle. Cycles that already have a record are
    /// skipped unless `overwrite` is set; a cycle that cannot be listed or
    /// has no files yet is logged and abandoned without a record.
    #[tracing::instrument(skip_all, fields(suites = suite_ids.len(), cycles = cycles.len(), overwrite = overwrite))]
    pub async fn collect_trial(
        &self,
        suite_ids: &[String],
        cycles: &[NaiveDateTime],
        overwrite: bool,
    ) -> Result<CollectSummary> {
        fs::create_dir_all(&self.scratch_dir)
            .with_context(|| format!("creating {}", self.scratch_dir.display()))?;

        let mut summary = CollectSummary::default();

        for suite_id in suite_ids {
            for &cycle in cycles {
                if !overwrite && self.store.exists(suite_id, cycle) {
                    debug!(suite_id = %suite_id, cycle = %cycle_label(cycle), "Cycle already collected");
                    summary.cycles_skipped += 1;
                    continue;
                }

                match self.collect_cycle(suite_id, cycle).await {
                    Ok(record) => {
                        summary.files_processed += record.meta.files_processed;
                        summary.files_failed += record.meta.failed_files.len();
                        self.store.save(&record)?;
                        summary.cycles_written += 1;
                    }
                    Err(e) => {
                        error!(suite_id = %suite_id, cycle = %cycle_label(cycle), error = %e, "Cycle abandoned");
                        summary.cycles_failed += 1;
                    }
                }
            }
        }

        info!(
            written = summary.cycles_written,
            skipped = summary.cycles_skipped,
            failed = summary.cycles_failed,
            files_failed = summary.files_failed,
            "Collection finished"
        );
        Ok(summary)
    }

    /// Collects the counts of one suite's cycle. Listing failures and empty
    /// listings are returned as errors; failing files are recorded in the
    /// metadata.
    #[tracing::instrument(skip(self, cycle), fields(cycle = %cycle_label(cycle)))]
    pub async fn collect_cycle(&self, suite_id: &str, cycle: NaiveDateTime) -> Result<CycleRecord> {
        let locators = self.archive.list(suite_id, cycle, self.run_type).await?;
        if locators.is_empty() {
            // not archived yet; leave the cycle unrecorded so a later run retries it
            bail!("no archive files for {suite_id} at {}", cycle_label(cycle));
        }

        let mut record = CycleRecord::new(suite_id, cycle);
        record.meta.files_found = locators.len();

        for locator in &locators {
            match self.process_file(locator).await {
                Ok(counts) => {
                    record.extend_instrument(&locator.instrument, counts);
                    record.meta.files_processed += 1;
                    debug!(instrument = %locator.instrument, "File processed");
                }
                Err(e) => {
                    warn!(file = %locator, error = %e, "Skipping file");
                    self.log_failure(locator)?;
                    record.meta.failed_files.push(locator.location.clone());
                }
            }
        }

        info!(
            found = record.meta.files_found,
            processed = record.meta.files_processed,
            "Cycle collected"
        );
        Ok(record)
    }

    /// Fetches, decompresses and queries a single file. Either every flag and
    /// region is counted or the whole file fails.
    async fn process_file(&self, locator: &FileLocator) -> Result<Vec<(Flag, Region, f64)>, FileError> {
        let fetched = self.archive.fetch(locator, &self.scratch_dir).await?;
        let odb = self.scratch_dir.join(format!("{}.odb", locator.instrument));

        let result = self.count_all(&fetched, &odb).await;

        remove_quietly(&fetched);
        remove_quietly(&odb);
        result
    }

    async fn count_all(&self, gz: &Path, odb: &Path) -> Result<Vec<(Flag, Region, f64)>, FileError> {
        gunzip(gz, odb)?;

        let mut counts = Vec::with_capacity(Flag::ALL.len() * Region::ALL.len());
        for flag in Flag::ALL {
            for region in Region::ALL {
                let value = query::count(self.tool, odb, flag, region).await?;
                counts.push((flag, region, value));
            }
        }
        Ok(counts)
    }

    fn log_failure(&self, locator: &FileLocator) -> Result<()> {
        if let Some(parent) = self.failed_log.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.failed_log)
            .with_context(|| format!("opening {}", self.failed_log.display()))?;
        writeln!(file, "{}", locator.location)?;
        Ok(())
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "Scratch file not removed");
    }
}
