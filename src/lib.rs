pub mod analyzers;
pub mod archive;
pub mod config;
pub mod cutoff;
pub mod error;
pub mod observations;
pub mod output;
pub mod plot;
pub mod query;
pub mod stats;
pub mod timestamp;
