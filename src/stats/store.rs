use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::CycleRecord;
use crate::timestamp::cycle_label;

/// JSON cycle records stored as `<root>/<suite>/<cycle>_<suite>_stats.json`.
pub struct StatsStore {
    root: PathBuf,
}

impl StatsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, suite_id: &str, cycle: NaiveDateTime) -> PathBuf {
        self.root
            .join(suite_id)
            .join(format!("{}_{}_stats.json", cycle_label(cycle), suite_id))
    }

    pub fn exists(&self, suite_id: &str, cycle: NaiveDateTime) -> bool {
        self.path(suite_id, cycle).exists()
    }

    pub fn save(&self, record: &CycleRecord) -> Result<PathBuf> {
        let path = self.path(&record.suite_id, record.cycle);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let body = serde_json::to_vec_pretty(record)?;
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;

        debug!(path = %path.display(), "Cycle record saved");
        Ok(path)
    }

    pub fn load(&self, suite_id: &str, cycle: NaiveDateTime) -> Result<CycleRecord> {
        let path = self.path(suite_id, cycle);
        let content = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let record = serde_json::from_slice(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(record)
    }
}
