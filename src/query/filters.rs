use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Observation status flags that counts are broken down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Active,
    Rejected,
    Thinned,
    ThinnedButActive,
}

impl Flag {
    pub const ALL: [Flag; 4] = [
        Flag::Active,
        Flag::Rejected,
        Flag::Thinned,
        Flag::ThinnedButActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Active => "active",
            Flag::Rejected => "rejected",
            Flag::Thinned => "thinned",
            Flag::ThinnedButActive => "thinned_but_active",
        }
    }

    /// Boolean expression over the ODB status bitfields.
    pub fn predicate(&self) -> &'static str {
        match self {
            Flag::Active => "datum_status.active",
            Flag::Rejected => "datum_status.rejected",
            Flag::Thinned => "datum_event1.thinned",
            Flag::ThinnedButActive => "datum_event1.thinned and datum_status.active",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Flag::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| anyhow!("unknown flag '{s}'"))
    }
}

/// Latitude/longitude box, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Geographic regions that counts are broken down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Sh,
    Nh,
    Tr,
    Aus,
    Eur,
    Global,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Sh,
        Region::Nh,
        Region::Tr,
        Region::Aus,
        Region::Eur,
        Region::Global,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Sh => "SH",
            Region::Nh => "NH",
            Region::Tr => "TR",
            Region::Aus => "AUS",
            Region::Eur => "EUR",
            Region::Global => "GLOBAL",
        }
    }

    /// `None` for the whole globe.
    pub fn bounds(&self) -> Option<Bounds> {
        let (lat_min, lat_max, lon_min, lon_max) = match self {
            Region::Sh => (-90.0, -20.0, -180.0, 180.0),
            Region::Nh => (20.0, 90.0, -180.0, 180.0),
            Region::Tr => (-20.0, 20.0, -180.0, 180.0),
            Region::Aus => (-50.0, -10.0, 110.0, 180.0),
            Region::Eur => (25.0, 75.0, -30.0, 45.0),
            Region::Global => return None,
        };
        Some(Bounds {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("unknown region '{s}'"))
    }
}
