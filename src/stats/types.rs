//! Per-cycle observation count records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::query::{Flag, Region};

/// Number of observations of one instrument with one flag inside one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountEntry {
    pub flag: Flag,
    pub region: Region,
    pub instrument: String,
    pub count: f64,
}

/// What happened to the archive files of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleMeta {
    pub files_found: usize,
    pub files_processed: usize,
    pub failed_files: Vec<String>,
}

/// All counts collected for one suite's cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub suite_id: String,
    pub cycle: NaiveDateTime,
    pub meta: CycleMeta,
    pub counts: Vec<CountEntry>,
}

impl CycleRecord {
    pub fn new(suite_id: &str, cycle: NaiveDateTime) -> Self {
        CycleRecord {
            suite_id: suite_id.to_string(),
            cycle,
            meta: CycleMeta::default(),
            counts: Vec::new(),
        }
    }

    pub fn get(&self, flag: Flag, region: Region, instrument: &str) -> Option<f64> {
        self.counts
            .iter()
            .find(|e| e.flag == flag && e.region == region && e.instrument == instrument)
            .map(|e| e.count)
    }

    /// Adds the complete flag × region table of one instrument.
    pub fn extend_instrument(&mut self, instrument: &str, counts: Vec<(Flag, Region, f64)>) {
        self.counts
            .extend(counts.into_iter().map(|(flag, region, count)| CountEntry {
                flag,
                region,
                instrument: instrument.to_string(),
                count,
            }));
    }

    pub fn instruments(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.counts.iter().map(|e| e.instrument.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_cycle_label;

    #[test]
    fn test_get_and_instruments() {
        let cycle = parse_cycle_label("20190615T0600Z").unwrap();
        let mut record = CycleRecord::new("u-bo796", cycle);
        record.extend_instrument(
            "sonde",
            vec![(Flag::Active, Region::Global, 10.0), (Flag::Active, Region::Nh, 7.0)],
        );
        record.extend_instrument("aircraft", vec![(Flag::Active, Region::Global, 3.0)]);

        assert_eq!(record.get(Flag::Active, Region::Nh, "sonde"), Some(7.0));
        assert_eq!(record.get(Flag::Rejected, Region::Nh, "sonde"), None);
        assert_eq!(record.get(Flag::Active, Region::Global, "iasi"), None);
        assert_eq!(record.instruments(), vec!["aircraft", "sonde"]);
    }
}
