//! Data types produced by the aggregation pipeline.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::query::{Flag, Region};

/// Sampling statistics of one instrument's counts across cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub stdev: Option<f64>,
    pub iqr: Option<f64>,
    pub total: f64,
    /// Number of cycles with a value.
    pub samples: usize,
}

/// Totals over all instruments of one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionSummary {
    /// Sum of instrument means.
    pub total: f64,
    /// Spread of instrument means.
    pub stdev: Option<f64>,
    /// Sum of instrument means per category, in configured category order.
    pub category_totals: Vec<(String, f64)>,
}

impl RegionSummary {
    pub fn category_total(&self, category: &str) -> Option<f64> {
        self.category_totals
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, v)| *v)
    }
}

/// Aggregates of a single suite.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteSummary {
    pub suite_id: String,
    pub cutoff_hours: f64,
    pub instruments: BTreeMap<Flag, BTreeMap<Region, BTreeMap<String, SummaryStats>>>,
    pub regions: BTreeMap<Flag, BTreeMap<Region, RegionSummary>>,
    /// Files processed per cycle; `None` where the cycle has no record.
    pub files_processed: Vec<Option<usize>>,
}

impl SuiteSummary {
    pub fn region(&self, flag: Flag, region: Region) -> Option<&RegionSummary> {
        self.regions.get(&flag)?.get(&region)
    }

    pub fn instrument(&self, flag: Flag, region: Region, instrument: &str) -> Option<&SummaryStats> {
        self.instruments.get(&flag)?.get(&region)?.get(instrument)
    }
}

/// Summary of the whole trial, suites in configured order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrialSummary {
    pub cycles: Vec<NaiveDateTime>,
    pub control_suite: String,
    pub suites: Vec<SuiteSummary>,
}

impl TrialSummary {
    pub fn suite(&self, suite_id: &str) -> Option<&SuiteSummary> {
        self.suites.iter().find(|s| s.suite_id == suite_id)
    }

    pub fn control(&self) -> Option<&SuiteSummary> {
        self.suite(&self.control_suite)
    }

    pub fn update_hours(&self) -> Vec<f64> {
        self.suites.iter().map(|s| s.cutoff_hours).collect()
    }
}
