//! Trial-wide aggregation of per-cycle observation counts.
//!
//! This module loads every suite's cycle records into a dense table,
//! computes sampling statistics across cycles with missing cycles left out,
//! rolls instrument means up into region and category totals, and hands the
//! result to the table and plot writers.

pub mod aggregate;
pub mod analyzer;
pub mod table;
pub mod types;
pub mod utility;
