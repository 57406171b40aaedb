//! Observation receipt-delay analysis.
//!
//! Reads observation records exported from the observation database, with the
//! database element names as CSV headers, and classifies each one against the
//! assimilation cutoff.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

use crate::analyzers::utility::{nan_mean, nan_median};
use crate::cutoff::classify;
use crate::timestamp::from_fields;

/// One row of an observation export.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationRecord {
    #[serde(rename = "WMO_BLCK_NMBR")]
    pub block: f64,
    #[serde(rename = "WMO_STTN_NMBR")]
    pub station: f64,
    #[serde(rename = "YEAR")]
    pub year: f64,
    #[serde(rename = "MNTH")]
    pub month: f64,
    #[serde(rename = "DAY")]
    pub day: f64,
    #[serde(rename = "HOUR")]
    pub hour: f64,
    #[serde(rename = "MINT")]
    pub minute: f64,
    #[serde(rename = "RCPT_YEAR")]
    pub rcpt_year: f64,
    #[serde(rename = "RCPT_MNTH")]
    pub rcpt_month: f64,
    #[serde(rename = "RCPT_DAY")]
    pub rcpt_day: f64,
    #[serde(rename = "RCPT_HOUR")]
    pub rcpt_hour: f64,
    #[serde(rename = "RCPT_MINT")]
    pub rcpt_minute: f64,
    #[serde(rename = "LTTD", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "LNGD", default)]
    pub longitude: Option<f64>,
}

impl ObservationRecord {
    /// WMO station identifier: block number * 1000 + station number.
    pub fn station_id(&self) -> i64 {
        self.block as i64 * 1000 + self.station as i64
    }

    pub fn ob_time(&self) -> Result<NaiveDateTime> {
        from_fields([self.year, self.month, self.day, self.hour, self.minute, 0.0])
    }

    pub fn rcpt_time(&self) -> Result<NaiveDateTime> {
        from_fields([
            self.rcpt_year,
            self.rcpt_month,
            self.rcpt_day,
            self.rcpt_hour,
            self.rcpt_minute,
            0.0,
        ])
    }
}

/// An observation after classification against the cutoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedObservation {
    pub station_id: i64,
    pub ob_time: NaiveDateTime,
    pub rcpt_time: NaiveDateTime,
    pub window_reference: NaiveDateTime,
    pub delay_seconds: i64,
    pub admitted: bool,
}

/// Counts and delay statistics over a batch of observations.
#[derive(Debug, Default, Serialize)]
pub struct DelaySummary {
    pub total: usize,
    pub received_in_time: usize,
    pub skipped: usize,
    pub mean_delay_seconds: Option<f64>,
    pub median_delay_seconds: Option<f64>,
}

impl DelaySummary {
    pub fn from_classified(classified: &[ClassifiedObservation], skipped: usize) -> Self {
        let delays: Vec<Option<f64>> = classified
            .iter()
            .map(|c| Some(c.delay_seconds as f64))
            .collect();

        DelaySummary {
            total: classified.len(),
            received_in_time: classified.iter().filter(|c| c.admitted).count(),
            skipped,
            mean_delay_seconds: nan_mean(&delays),
            median_delay_seconds: nan_median(&delays),
        }
    }

    pub fn in_time_line(&self) -> String {
        format!("{} / {} received in time", self.received_in_time, self.total)
    }
}

/// Loads observation records from a CSV export.
pub fn load_observations(path: &Path) -> Result<Vec<ObservationRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: ObservationRecord = result?;
        records.push(record);
    }

    debug!(path = %path.display(), count = records.len(), "Observations loaded");
    Ok(records)
}

/// Classifies every record. Records whose times cannot be built are skipped
/// and counted in the second element of the result.
pub fn classify_records(
    records: &[ObservationRecord],
    cycle_length: i64,
    cut_off: i64,
) -> Result<(Vec<ClassifiedObservation>, usize)> {
    let mut classified = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        let times = record.ob_time().and_then(|ob| Ok((ob, record.rcpt_time()?)));
        let (ob_time, rcpt_time) = match times {
            Ok(t) => t,
            Err(e) => {
                warn!(station_id = record.station_id(), error = %e, "Skipping observation");
                skipped += 1;
                continue;
            }
        };

        let c = classify(ob_time, rcpt_time, cycle_length, cut_off)?;
        classified.push(ClassifiedObservation {
            station_id: record.station_id(),
            ob_time,
            rcpt_time,
            window_reference: c.window_reference,
            delay_seconds: (rcpt_time - ob_time).num_seconds(),
            admitted: c.admitted,
        });
    }

    Ok((classified, skipped))
}
