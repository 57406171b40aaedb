use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::client::ArchiveStore;
use super::locator::{FileLocator, RunType};
use crate::error::FileError;
use crate::timestamp::cycle_label;

/// Archive laid out on a local filesystem as `<root>/<suite>/<cycle>_<run>_<instrument>_odb2.gz`.
///
/// Useful for reprocessing files that were already retrieved from mass storage.
pub struct LocalArchive {
    root: PathBuf,
}

impl LocalArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArchiveStore for LocalArchive {
    async fn list(
        &self,
        suite_id: &str,
        cycle: NaiveDateTime,
        run_type: RunType,
    ) -> anyhow::Result<Vec<FileLocator>> {
        let dir = self.root.join(suite_id);
        let prefix = format!("{}_{}", cycle_label(cycle), run_type);

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("reading {}", dir.display()))?;

        let mut locators = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(&prefix) || !name.ends_with("_odb2.gz") {
                continue;
            }
            match FileLocator::parse(&entry.path().to_string_lossy()) {
                Ok(locator) => locators.push(locator),
                Err(e) => warn!(file = name, error = %e, "Ignoring unexpected archive entry"),
            }
        }

        locators.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(locators)
    }

    async fn fetch(&self, locator: &FileLocator, dest_dir: &Path) -> Result<PathBuf, FileError> {
        let dest = dest_dir.join(locator.file_name());
        tokio::fs::copy(&locator.location, &dest)
            .await
            .map_err(|e| FileError::Fetch {
                locator: locator.to_string(),
                reason: e.to_string(),
            })?;
        Ok(dest)
    }
}
