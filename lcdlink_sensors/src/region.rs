//! Read-only mapping of the producer's named shared-memory region.
//!
//! The mapping is opened per snapshot and dropped immediately after — no
//! lock is held between ticks, so a producer crash is self-healing: the
//! next open simply fails with `RegionUnavailable`.

use crate::error::{SensorError, SensorResult};
use crate::layout::RegionHeader;
use crate::reader;
use crate::snapshot::SensorSnapshot;
use memmap2::{Mmap, MmapOptions};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory where named regions live on Linux.
pub const SHM_DIR: &str = "/dev/shm";

/// A read-only view of one mapped sensor region.
#[derive(Debug)]
pub struct SensorRegion {
    name: String,
    map: Mmap,
}

impl SensorRegion {
    /// Open the named region under [`SHM_DIR`].
    ///
    /// # Errors
    /// `RegionUnavailable` when the file does not exist or cannot be read
    /// (producer offline or insufficient permission).
    pub fn open(name: &str) -> SensorResult<Self> {
        Self::open_at(Path::new(SHM_DIR).join(name), name)
    }

    /// Open a region backing file at an explicit path.
    ///
    /// Used by tests to point at synthetic region files.
    pub fn open_at(path: impl Into<PathBuf>, name: &str) -> SensorResult<Self> {
        let path = path.into();
        let file = OpenOptions::new().read(true).open(&path).map_err(|e| {
            match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    SensorError::RegionUnavailable {
                        name: name.to_string(),
                    }
                }
                _ => SensorError::Io { source: e },
            }
        })?;

        // SAFETY: mapping is read-only; the producer may rewrite contents
        // concurrently, which can tear a snapshot but never violates memory
        // safety. Torn data is caught by header/record validation.
        let map = unsafe { MmapOptions::new().map(&file)? };

        Ok(Self {
            name: name.to_string(),
            map,
        })
    }

    /// Region name this mapping was opened under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full mapped bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    /// Mapped byte length.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Decode and validate the region header.
    pub fn read_header(&self) -> SensorResult<RegionHeader> {
        reader::read_header(self.bytes())
    }

    /// Capture one snapshot of all readings against a fresh header read.
    pub fn read_snapshot(&self) -> SensorResult<SensorSnapshot> {
        let header = self.read_header()?;
        reader::read_snapshot(self.bytes(), &header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{record_bytes, region_bytes};
    use std::io::Write;

    #[test]
    fn open_missing_region_is_unavailable() {
        let err = SensorRegion::open("lcdlink_no_such_region").unwrap_err();
        assert!(matches!(err, SensorError::RegionUnavailable { name } if name.contains("no_such")));
    }

    #[test]
    fn open_at_reads_backing_file() {
        let region = region_bytes(&[record_bytes(7, "Total CPU Usage", "%", 73.0)]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&region).unwrap();
        file.flush().unwrap();

        let mapped = SensorRegion::open_at(file.path(), "test_region").unwrap();
        assert_eq!(mapped.name(), "test_region");
        assert_eq!(mapped.len(), region.len());

        let snapshot = mapped.read_snapshot().unwrap();
        assert_eq!(snapshot.readings.len(), 1);
        assert_eq!(snapshot.readings[0].label_orig, "Total CPU Usage");
    }
}
