//! Collection and persistence of per-cycle observation counts.

mod collect;
mod store;
mod types;

pub use collect::{CollectSummary, Collector};
pub use store::StatsStore;
pub use types::{CountEntry, CycleMeta, CycleRecord};
