//! Retrieval of archived observation-database files.
//!
//! [`ArchiveStore`] abstracts over where the gzipped ODB2 files live.
//! [`MooseArchive`] shells out to the mass storage client, [`LocalArchive`]
//! reads an already-retrieved copy from disk.

mod client;
mod local;
mod locator;
mod moose;

pub use client::ArchiveStore;
pub use local::LocalArchive;
pub use locator::{FileLocator, RunType, instruments};
pub use moose::MooseArchive;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::FileError;

/// Decompresses a gzipped file to `dest`.
pub fn gunzip(path: &Path, dest: &Path) -> Result<(), FileError> {
    let decompress = || -> io::Result<()> {
        let mut decoder = GzDecoder::new(File::open(path)?);
        let mut out = File::create(dest)?;
        io::copy(&mut decoder, &mut out)?;
        Ok(())
    };

    decompress().map_err(|source| FileError::Decompress {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn test_gunzip_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("surface_odb2.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"odb payload").unwrap();
        encoder.finish().unwrap();

        let out = dir.path().join("surface.odb");
        gunzip(&gz, &out).unwrap();
        assert_eq!(std::fs::read(out).unwrap(), b"odb payload");
    }

    #[test]
    fn test_gunzip_corrupt_input() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("bad.gz");
        std::fs::write(&gz, b"not gzip at all").unwrap();

        let result = gunzip(&gz, &dir.path().join("bad.odb"));
        assert!(matches!(result, Err(FileError::Decompress { .. })));
    }
}
