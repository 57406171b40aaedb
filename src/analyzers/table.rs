//! Dense count table over every suite, cycle, flag, region and instrument.

use chrono::NaiveDateTime;

use crate::query::{Flag, Region};
use crate::stats::{CycleMeta, CycleRecord};

/// Counts for the whole trial. Cells without data are `None`.
#[derive(Debug, Clone)]
pub struct CountTable {
    suites: Vec<String>,
    cycles: Vec<NaiveDateTime>,
    instruments: Vec<String>,
    values: Vec<Option<f64>>,
    meta: Vec<Option<CycleMeta>>,
}

impl CountTable {
    pub fn new(suites: Vec<String>, cycles: Vec<NaiveDateTime>, instruments: Vec<String>) -> Self {
        let len = suites.len() * cycles.len() * Flag::ALL.len() * Region::ALL.len() * instruments.len();
        let meta_len = suites.len() * cycles.len();
        CountTable {
            suites,
            cycles,
            instruments,
            values: vec![None; len],
            meta: vec![None; meta_len],
        }
    }

    pub fn suites(&self) -> &[String] {
        &self.suites
    }

    pub fn cycles(&self) -> &[NaiveDateTime] {
        &self.cycles
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    fn suite_index(&self, suite_id: &str) -> Option<usize> {
        self.suites.iter().position(|s| s == suite_id)
    }

    fn cycle_index(&self, cycle: NaiveDateTime) -> Option<usize> {
        self.cycles.iter().position(|c| *c == cycle)
    }

    fn instrument_index(&self, instrument: &str) -> Option<usize> {
        self.instruments.iter().position(|i| i == instrument)
    }

    fn offset(&self, suite: usize, cycle: usize, flag: Flag, region: Region, instrument: usize) -> usize {
        let n_flags = Flag::ALL.len();
        let n_regions = Region::ALL.len();
        let n_instruments = self.instruments.len();

        (((suite * self.cycles.len() + cycle) * n_flags + flag.index()) * n_regions + region.index())
            * n_instruments
            + instrument
    }

    /// Fills the cells of one record. Instruments outside the table are
    /// ignored and returned.
    pub fn insert_record(&mut self, record: &CycleRecord) -> Vec<String> {
        let (Some(s), Some(c)) = (self.suite_index(&record.suite_id), self.cycle_index(record.cycle)) else {
            return Vec::new();
        };

        let mut ignored = Vec::new();
        for entry in &record.counts {
            match self.instrument_index(&entry.instrument) {
                Some(i) => {
                    let at = self.offset(s, c, entry.flag, entry.region, i);
                    self.values[at] = Some(entry.count);
                }
                None => {
                    if !ignored.contains(&entry.instrument) {
                        ignored.push(entry.instrument.clone());
                    }
                }
            }
        }

        self.meta[s * self.cycles.len() + c] = Some(record.meta.clone());
        ignored
    }

    pub fn get(
        &self,
        suite_id: &str,
        cycle: NaiveDateTime,
        flag: Flag,
        region: Region,
        instrument: &str,
    ) -> Option<f64> {
        let s = self.suite_index(suite_id)?;
        let c = self.cycle_index(cycle)?;
        let i = self.instrument_index(instrument)?;
        self.values[self.offset(s, c, flag, region, i)]
    }

    /// Values of one instrument across all cycles, in cycle order.
    pub fn series(&self, suite_id: &str, flag: Flag, region: Region, instrument: &str) -> Vec<Option<f64>> {
        let (Some(s), Some(i)) = (self.suite_index(suite_id), self.instrument_index(instrument)) else {
            return vec![None; self.cycles.len()];
        };

        (0..self.cycles.len())
            .map(|c| self.values[self.offset(s, c, flag, region, i)])
            .collect()
    }

    /// Metadata of one suite across all cycles; `None` where no record was loaded.
    pub fn meta_series(&self, suite_id: &str) -> Vec<Option<&CycleMeta>> {
        let Some(s) = self.suite_index(suite_id) else {
            return vec![None; self.cycles.len()];
        };
        (0..self.cycles.len())
            .map(|c| self.meta[s * self.cycles.len() + c].as_ref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_cycle_label;

    fn table() -> CountTable {
        let cycles = vec![
            parse_cycle_label("20190615T0600Z").unwrap(),
            parse_cycle_label("20190615T1200Z").unwrap(),
        ];
        CountTable::new(
            vec!["u-a".to_string(), "u-b".to_string()],
            cycles,
            vec!["sonde".to_string(), "surface".to_string()],
        )
    }

    #[test]
    fn test_empty_table_is_all_missing() {
        let t = table();
        assert_eq!(t.series("u-a", Flag::Active, Region::Global, "sonde"), vec![None, None]);
        assert_eq!(t.meta_series("u-b"), vec![None, None]);
    }

    #[test]
    fn test_insert_record_fills_cells() {
        let mut t = table();
        let cycle = t.cycles()[1];
        let mut record = CycleRecord::new("u-b", cycle);
        record.meta.files_found = 3;
        record.extend_instrument(
            "surface",
            vec![(Flag::Rejected, Region::Eur, 5.0), (Flag::Active, Region::Eur, 9.0)],
        );
        record.extend_instrument("radar", vec![(Flag::Active, Region::Eur, 1.0)]);

        let ignored = t.insert_record(&record);

        assert_eq!(ignored, vec!["radar"]);
        assert_eq!(t.get("u-b", cycle, Flag::Rejected, Region::Eur, "surface"), Some(5.0));
        assert_eq!(t.get("u-b", cycle, Flag::Active, Region::Eur, "surface"), Some(9.0));
        assert_eq!(t.get("u-a", cycle, Flag::Active, Region::Eur, "surface"), None);
        assert_eq!(t.series("u-b", Flag::Active, Region::Eur, "surface"), vec![None, Some(9.0)]);
        assert_eq!(t.meta_series("u-b")[1].map(|m| m.files_found), Some(3));
    }

    #[test]
    fn test_unknown_suite_record_is_ignored() {
        let mut t = table();
        let record = CycleRecord::new("u-zz", t.cycles()[0]);
        assert!(t.insert_record(&record).is_empty());
        assert_eq!(t.meta_series("u-zz"), vec![None, None]);
    }
}
