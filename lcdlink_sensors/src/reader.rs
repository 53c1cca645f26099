//! Snapshot capture over a mapped region.
//!
//! Each call is one best-effort attempt with no retries: repeated calls
//! produce independent snapshots. Every element is read at
//! `reading_offset + index * element_size`, bounded to exactly
//! `element_size` bytes, which defends against a producer whose layout
//! version differs from the compiled one.

use crate::error::{SensorError, SensorResult};
use crate::layout::{READING_SIZE, Reading, RegionHeader};
use crate::snapshot::SensorSnapshot;
use tracing::debug;

/// Decode and validate the region header from the mapped bytes.
pub fn read_header(region: &[u8]) -> SensorResult<RegionHeader> {
    RegionHeader::decode(region)
}

/// Decode all reading records described by a validated header.
///
/// # Errors
/// `LayoutMismatch` when the advertised element size differs from the
/// compiled [`READING_SIZE`] — decoding would misalign every field, so
/// no element read is attempted.
pub fn read_snapshot(region: &[u8], header: &RegionHeader) -> SensorResult<SensorSnapshot> {
    let section = header.reading_section;

    if section.element_count > 0 && section.element_size != READING_SIZE as u32 {
        return Err(SensorError::LayoutMismatch {
            expected: READING_SIZE as u32,
            actual: section.element_size,
        });
    }

    let mut readings = Vec::with_capacity(section.element_count as usize);
    for index in 0..section.element_count {
        // In bounds by header validation: offset + count * size <= len.
        let start = section.offset as usize + index as usize * section.element_size as usize;
        let end = start + section.element_size as usize;
        readings.push(Reading::decode(&region[start..end])?);
    }

    debug!(
        count = readings.len(),
        poll_time = header.poll_time,
        "captured sensor snapshot"
    );

    Ok(SensorSnapshot {
        poll_time: header.poll_time,
        readings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{HEADER_SIZE, ReadingType};
    use crate::testutil::{header_bytes, record_bytes, region_bytes};

    #[test]
    fn snapshot_has_exactly_count_records() {
        let region = region_bytes(&[
            record_bytes(7, "Total CPU Usage", "%", 73.0),
            record_bytes(1, "CPU Package", "°C", 55.0),
            record_bytes(3, "CPU1", "RPM", 880.0),
        ]);
        let header = read_header(&region).unwrap();
        let snapshot = read_snapshot(&region, &header).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.poll_time, 1_700_000_000);
        assert_eq!(snapshot.readings[0].reading_type, ReadingType::Usage);
        assert_eq!(snapshot.readings[2].label_orig, "CPU1");
    }

    #[test]
    fn zero_elements_yields_empty_snapshot() {
        let region = header_bytes(HEADER_SIZE as u32, READING_SIZE as u32, 0);
        let header = read_header(&region).unwrap();
        let snapshot = read_snapshot(&region, &header).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn element_size_mismatch_is_layout_mismatch() {
        // Header advertises 320-byte elements; region is sized to match so
        // the header itself validates, but decoding must refuse.
        let mut region = header_bytes(HEADER_SIZE as u32, 320, 1);
        region.resize(HEADER_SIZE + 320, 0);
        let header = read_header(&region).unwrap();
        let err = read_snapshot(&region, &header).unwrap_err();
        assert!(matches!(
            err,
            SensorError::LayoutMismatch {
                expected: 316,
                actual: 320
            }
        ));
    }

    #[test]
    fn zero_count_ignores_advertised_size() {
        // An empty section never decodes elements, so a foreign element
        // size is irrelevant.
        let region = header_bytes(HEADER_SIZE as u32, 9999, 0);
        let header = read_header(&region).unwrap();
        assert!(read_snapshot(&region, &header).unwrap().is_empty());
    }

    #[test]
    fn repeated_reads_are_independent_and_equal() {
        let region = region_bytes(&[record_bytes(2, "DRAM", "V", 1.35)]);
        let header = read_header(&region).unwrap();
        let a = read_snapshot(&region, &header).unwrap();
        let b = read_snapshot(&region, &header).unwrap();
        assert_eq!(a, b);
    }
}
