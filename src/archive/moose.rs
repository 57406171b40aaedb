use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use super::client::ArchiveStore;
use super::locator::{FileLocator, RunType};
use crate::error::FileError;
use crate::timestamp::cycle_label;

/// Mass storage archive driven through the `moo` command line client.
///
/// Files live at `<root>/<suite>/adhoc.file/<cycle>_<run>_<instrument>_odb2.gz`.
pub struct MooseArchive {
    root: String,
    program: String,
}

impl MooseArchive {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            program: "moo".to_string(),
        }
    }

    /// Uses a different `moo` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn listing_pattern(&self, suite_id: &str, cycle: NaiveDateTime, run_type: RunType) -> String {
        format!(
            "{}/{}/adhoc.file/{}_{}*_odb2.gz",
            self.root.trim_end_matches('/'),
            suite_id,
            cycle_label(cycle),
            run_type
        )
    }
}

#[async_trait]
impl ArchiveStore for MooseArchive {
    #[tracing::instrument(skip(self, cycle), fields(cycle = %cycle_label(cycle)))]
    async fn list(
        &self,
        suite_id: &str,
        cycle: NaiveDateTime,
        run_type: RunType,
    ) -> anyhow::Result<Vec<FileLocator>> {
        let pattern = self.listing_pattern(suite_id, cycle, run_type);
        let output = Command::new(&self.program)
            .arg("ls")
            .arg(&pattern)
            .output()
            .await
            .with_context(|| format!("failed to run {} ls", self.program))?;

        if !output.status.success() {
            bail!(
                "{} ls {} exited with {}: {}",
                self.program,
                pattern,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut locators = Vec::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            match FileLocator::parse(line) {
                Ok(locator) => locators.push(locator),
                Err(e) => warn!(line, error = %e, "Ignoring unexpected archive entry"),
            }
        }

        debug!(count = locators.len(), "Archive listing complete");
        Ok(locators)
    }

    async fn fetch(&self, locator: &FileLocator, dest_dir: &Path) -> Result<PathBuf, FileError> {
        let output = Command::new(&self.program)
            .arg("get")
            .arg(&locator.location)
            .arg(dest_dir)
            .output()
            .await
            .map_err(|e| FileError::Fetch {
                locator: locator.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(FileError::Fetch {
                locator: locator.to_string(),
                reason: format!(
                    "{} get exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(dest_dir.join(locator.file_name()))
    }
}
