use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::error::FileError;

/// An external tool that answers SQL-like queries against an ODB file.
#[async_trait]
pub trait QueryTool: Send + Sync {
    /// Runs `query` against `file` and returns the raw text output.
    async fn run(&self, query: &str, file: &Path) -> Result<String, FileError>;
}

/// The `odb sql '<query>' -i <file>` command line tool.
pub struct OdbSql {
    program: String,
}

impl OdbSql {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for OdbSql {
    fn default() -> Self {
        Self::new("odb")
    }
}

#[async_trait]
impl QueryTool for OdbSql {
    async fn run(&self, query: &str, file: &Path) -> Result<String, FileError> {
        let output = Command::new(&self.program)
            .arg("sql")
            .arg(query)
            .arg("-i")
            .arg(file)
            .output()
            .await
            .map_err(|source| FileError::QueryLaunch {
                path: file.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(FileError::QueryFailed {
                path: file.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let tool = OdbSql::new("definitely-not-odb-xyz");
        let result = tool.run("select count(*)", Path::new("surface.odb")).await;
        assert!(matches!(result, Err(FileError::QueryLaunch { .. })));
    }
}
