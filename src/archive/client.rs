use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use super::locator::{FileLocator, RunType};
use crate::error::FileError;

/// A store of archived observation files, one set per suite and cycle.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Lists the observation files archived for a suite's cycle.
    async fn list(
        &self,
        suite_id: &str,
        cycle: NaiveDateTime,
        run_type: RunType,
    ) -> anyhow::Result<Vec<FileLocator>>;

    /// Copies one archived file into `dest_dir`, returning its local path.
    async fn fetch(&self, locator: &FileLocator, dest_dir: &Path) -> Result<PathBuf, FileError>;
}
