//! Per-flag, per-region observation counts from ODB files.
//!
//! Queries are built as text, handed to a [`QueryTool`] and the tool's
//! tabular output is parsed back into numbers.

mod builder;
mod filters;
mod parser;
mod tool;

pub use builder::build_count_query;
pub use filters::{Bounds, Flag, Region};
pub use parser::{QueryTable, parse_output};
pub use tool::{OdbSql, QueryTool};

use std::path::Path;

use crate::error::FileError;

/// Runs a count query for `flag` within `region` and returns the count.
pub async fn count<T: QueryTool + ?Sized>(
    tool: &T,
    file: &Path,
    flag: Flag,
    region: Region,
) -> Result<f64, FileError> {
    let query = build_count_query(flag, region);
    let text = tool.run(&query, file).await?;
    parse_output(&text)?.count()
}
