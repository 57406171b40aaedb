//! Trial configuration.
//!
//! Describes which suites are compared, which cycles they ran, and how
//! instruments group into categories. Stored as a JSON file:
//! ```json
//! {
//!   "project_dir": "/data/R2O_projects/update_cutoff",
//!   "start": "2019-06-15T06:00:00",
//!   "end": "2019-09-15T18:00:00",
//!   "control_suite": "u-bo796",
//!   "suites": [{ "id": "u-bo796", "cutoff_hours": 6.25, "colour": "black" }]
//! }
//! ```
//! Missing keys fall back to the built-in trial.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::archive::RunType;
use crate::timestamp::cycle_range;

/// Project directory relative to `$DATADIR`.
pub const PROJECT_SUBDIR: &str = "R2O_projects/update_cutoff";

/// One experiment suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub id: String,
    /// Update run cutoff length in hours.
    pub cutoff_hours: f64,
    pub colour: String,
}

/// A named group of instruments reported together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub project_dir: PathBuf,
    pub archive_root: String,
    pub run_type: RunType,
    pub odb_program: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub cycle_hours: i64,
    pub control_suite: String,
    /// Ordered by ascending cutoff.
    pub suites: Vec<SuiteConfig>,
    pub instruments: Vec<String>,
    pub categories: Vec<CategoryConfig>,
}

fn suite(id: &str, cutoff_hours: f64, colour: &str) -> SuiteConfig {
    SuiteConfig {
        id: id.to_string(),
        cutoff_hours,
        colour: colour.to_string(),
    }
}

fn category(name: &str, instruments: &[&str]) -> CategoryConfig {
    CategoryConfig {
        name: name.to_string(),
        instruments: instruments.iter().map(|s| s.to_string()).collect(),
    }
}

fn cycle_at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .unwrap_or_default()
}

impl Default for TrialConfig {
    fn default() -> Self {
        let instruments = [
            "goesimclr", "ssmis", "mwri", "surface", "gmihigh", "iasi", "cris", "sonde", "ahiclr",
            "atovs", "airs", "gmilow", "gpsro", "amsr", "aod", "abiclr", "scatwind", "mwsfy3b",
            "mwsfy3", "atms", "aircraft", "groundgps", "seviriclr", "saphir", "satwind",
        ];

        TrialConfig {
            project_dir: PathBuf::from(PROJECT_SUBDIR),
            archive_root: "moose:/devfc".to_string(),
            run_type: RunType::Glu,
            odb_program: "odb".to_string(),
            start: cycle_at(2019, 6, 15, 6),
            end: cycle_at(2019, 9, 15, 18),
            cycle_hours: 6,
            control_suite: "u-bo796".to_string(),
            suites: vec![
                suite("u-bo862", 3.0, "green"),
                suite("u-bo798", 4.0, "blue"),
                suite("u-bo895", 5.0, "red"),
                suite("u-bo796", 6.25, "black"),
                suite("u-bp725", 7.25, "purple"),
            ],
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
            categories: vec![
                category("hyperspectral_IR", &["airs", "cris", "iasi"]),
                category(
                    "MW_sounder_imager",
                    &[
                        "ssmis", "atovs", "atms", "saphir", "amsr", "gmihigh", "gmilow", "mwsfy3b",
                        "mwsfy3", "mwri",
                    ],
                ),
                category("amvs", &["satwind"]),
                category("aircraft", &["aircraft"]),
                category("surface", &["surface"]),
                category("sonde", &["sonde"]),
                category("scatwind", &["scatwind"]),
                category("gnssro", &["gpsro"]),
                category("geo_csr", &["seviriclr", "abiclr", "ahiclr", "goesimclr"]),
                category("ground_gnss", &["groundgps"]),
                category("aod", &["aod"]),
            ],
        }
    }
}

impl TrialConfig {
    /// Loads a config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: TrialConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Places the project under `<data_dir>/R2O_projects/update_cutoff`.
    pub fn with_data_dir(mut self, data_dir: &Path) -> Self {
        self.project_dir = data_dir.join(PROJECT_SUBDIR);
        self
    }

    /// Checks the cross references between suites, instruments and categories.
    pub fn validate(&self) -> Result<()> {
        if self.cycle_hours <= 0 {
            bail!("cycle_hours must be positive, got {}", self.cycle_hours);
        }
        if self.start > self.end {
            bail!("start {} is after end {}", self.start, self.end);
        }
        if self.suites.is_empty() {
            bail!("no suites configured");
        }
        if self.suite(&self.control_suite).is_none() {
            bail!("control suite '{}' is not one of the configured suites", self.control_suite);
        }

        let known: HashSet<&str> = self.instruments.iter().map(String::as_str).collect();
        for cat in &self.categories {
            for instrument in &cat.instruments {
                if !known.contains(instrument.as_str()) {
                    bail!("category '{}' lists unknown instrument '{}'", cat.name, instrument);
                }
            }
        }
        Ok(())
    }

    pub fn suite(&self, id: &str) -> Option<&SuiteConfig> {
        self.suites.iter().find(|s| s.id == id)
    }

    pub fn suite_ids(&self) -> Vec<String> {
        self.suites.iter().map(|s| s.id.clone()).collect()
    }

    /// Update cutoff lengths in suite order.
    pub fn update_hours(&self) -> Vec<f64> {
        self.suites.iter().map(|s| s.cutoff_hours).collect()
    }

    pub fn cycles(&self) -> Vec<NaiveDateTime> {
        cycle_range(self.start, self.end, self.cycle_hours)
    }

    pub fn stats_dir(&self) -> PathBuf {
        self.project_dir.join("data").join("cycle_sql_stats")
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.project_dir.join("data").join("category_tables")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.project_dir.join("data").join("scratch")
    }

    pub fn failed_log(&self) -> PathBuf {
        self.project_dir.join("data").join("failed_files.log")
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.project_dir.join("figures")
    }
}
