use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which model run the archived observation files belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    /// Global update run.
    Glu,
    /// Global main run.
    Glm,
}

impl RunType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunType::Glu => "glu",
            RunType::Glm => "glm",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "glu" => Ok(RunType::Glu),
            "glm" => Ok(RunType::Glm),
            other => Err(anyhow!("run type set as '{other}', must be 'glu' or 'glm'")),
        }
    }
}

/// A reference to one archived observation file.
///
/// File names follow `<cycle>_<run-type>_<instrument>_<format>.gz`, e.g.
/// `20190615T0600Z_glu_groundgps_odb2.gz`, optionally behind an archive path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocator {
    /// Full locator as understood by the archive (path or URI).
    pub location: String,
    pub cycle: String,
    pub run_type: String,
    pub instrument: String,
    pub format: String,
}

impl FileLocator {
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        let file_name = location.rsplit('/').next().unwrap_or(location);
        let Some(stem) = file_name.strip_suffix(".gz") else {
            bail!("archive file '{location}' is not gzipped");
        };

        let tokens: Vec<&str> = stem.split('_').collect();
        if tokens.len() < 4 {
            bail!("archive file '{location}' does not match <cycle>_<run>_<instrument>_<format>.gz");
        }

        // Instrument names never contain underscores, so count from the end.
        let n = tokens.len();
        Ok(FileLocator {
            location: location.to_string(),
            cycle: tokens[0].to_string(),
            run_type: tokens[1..n - 2].join("_"),
            instrument: tokens[n - 2].to_string(),
            format: tokens[n - 1].to_string(),
        })
    }

    /// File name portion of the locator.
    pub fn file_name(&self) -> &str {
        self.location.rsplit('/').next().unwrap_or(&self.location)
    }
}

impl fmt::Display for FileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// Instrument names of a cycle's archive listing, in listing order.
pub fn instruments(locators: &[FileLocator]) -> Vec<String> {
    locators.iter().map(|l| l.instrument.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moose_locator() {
        let l = FileLocator::parse("moose:/devfc/u-bo798/adhoc.file/20190615T0600Z_glu_groundgps_odb2.gz")
            .unwrap();
        assert_eq!(l.cycle, "20190615T0600Z");
        assert_eq!(l.run_type, "glu");
        assert_eq!(l.instrument, "groundgps");
        assert_eq!(l.format, "odb2");
        assert_eq!(l.file_name(), "20190615T0600Z_glu_groundgps_odb2.gz");
    }

    #[test]
    fn test_instrument_is_second_to_last_token() {
        let l = FileLocator::parse("20190615T0600Z_glu_extra_satwind_odb2.gz").unwrap();
        assert_eq!(l.instrument, "satwind");
        assert_eq!(l.run_type, "glu_extra");
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        assert!(FileLocator::parse("20190615T0600Z_glu_surface_odb2").is_err());
        assert!(FileLocator::parse("20190615T0600Z_surface.gz").is_err());
    }

    #[test]
    fn test_instruments() {
        let locators = vec![
            FileLocator::parse("a/20190615T0600Z_glu_surface_odb2.gz").unwrap(),
            FileLocator::parse("a/20190615T0600Z_glu_sonde_odb2.gz").unwrap(),
        ];
        assert_eq!(instruments(&locators), vec!["surface", "sonde"]);
    }

    #[test]
    fn test_run_type_from_str() {
        assert_eq!("glu".parse::<RunType>().unwrap(), RunType::Glu);
        assert_eq!("glm".parse::<RunType>().unwrap(), RunType::Glm);
        assert!("gla".parse::<RunType>().is_err());
    }
}
