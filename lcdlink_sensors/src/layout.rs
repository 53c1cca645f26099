//! Binary layout of the producer's shared-memory region.
//!
//! The region is owned by an external monitoring application and is decoded
//! here field by field over bounds-checked byte slices — no struct casts,
//! no pointer arithmetic. All integers are little-endian; strings are
//! fixed-capacity NUL-padded byte buffers.

use crate::error::{SensorError, SensorResult};
use static_assertions::const_assert_eq;

/// Expected value of the header signature field ("HWiS" read little-endian).
pub const REGION_SIGNATURE: u32 = 0x5369_5748;

/// Capacity of the two label fields in a reading record.
pub const LABEL_LEN: usize = 128;

/// Capacity of the unit field in a reading record.
pub const UNIT_LEN: usize = 16;

/// Byte size of the region header.
pub const HEADER_SIZE: usize = 44;

/// Byte size of one reading record as compiled into this crate.
///
/// The producer publishes its own element size in the header; a mismatch
/// against this constant is a `LayoutMismatch`, never a misaligned read.
pub const READING_SIZE: usize = 4 + 4 + 4 + 2 * LABEL_LEN + UNIT_LEN + 4 * 8;

const_assert_eq!(READING_SIZE, 316);
const_assert_eq!(HEADER_SIZE, 4 + 4 + 4 + 8 + 2 * 12);

/// One (offset, element-size, element-count) triple from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDesc {
    /// Byte offset of the section from the start of the region.
    pub offset: u32,
    /// Byte size of one element in the section.
    pub element_size: u32,
    /// Number of elements in the section.
    pub element_count: u32,
}

impl SectionDesc {
    /// Total byte span of the section.
    pub fn byte_len(&self) -> u64 {
        u64::from(self.element_size) * u64::from(self.element_count)
    }

    fn decode(buf: &[u8], off: usize) -> Self {
        Self {
            offset: u32_at(buf, off),
            element_size: u32_at(buf, off + 4),
            element_count: u32_at(buf, off + 8),
        }
    }

    fn validate(&self, what: &str, region_len: usize) -> SensorResult<()> {
        let end = u64::from(self.offset) + self.byte_len();
        if end > region_len as u64 {
            return Err(SensorError::CorruptHeader {
                reason: format!(
                    "{what} section spans {}..{} but region is {} bytes",
                    self.offset, end, region_len
                ),
            });
        }
        Ok(())
    }
}

/// Decoded region header.
///
/// Invariants established by [`RegionHeader::decode`]: the signature
/// matched [`REGION_SIGNATURE`] and both sections lie entirely within the
/// mapped byte length that was decoded against.
#[derive(Debug, Clone, Copy)]
pub struct RegionHeader {
    /// Producer signature, equals [`REGION_SIGNATURE`] after decode.
    pub signature: u32,
    /// Producer layout version.
    pub version: u32,
    /// Producer layout revision.
    pub revision: u32,
    /// Wall-clock time of the producer's last poll (producer-defined epoch).
    pub poll_time: i64,
    /// Sensor (device) section descriptor.
    pub sensor_section: SectionDesc,
    /// Reading section descriptor.
    pub reading_section: SectionDesc,
}

impl RegionHeader {
    /// Decode and validate the header against the full mapped region.
    ///
    /// # Errors
    /// `CorruptHeader` when the region is shorter than a header, the
    /// signature does not match, or either section exceeds the region.
    pub fn decode(region: &[u8]) -> SensorResult<Self> {
        if region.len() < HEADER_SIZE {
            return Err(SensorError::CorruptHeader {
                reason: format!(
                    "region is {} bytes, header needs {HEADER_SIZE}",
                    region.len()
                ),
            });
        }

        let signature = u32_at(region, 0);
        if signature != REGION_SIGNATURE {
            return Err(SensorError::CorruptHeader {
                reason: format!("signature {signature:#010x} != {REGION_SIGNATURE:#010x}"),
            });
        }

        let header = Self {
            signature,
            version: u32_at(region, 4),
            revision: u32_at(region, 8),
            poll_time: i64_at(region, 12),
            sensor_section: SectionDesc::decode(region, 20),
            reading_section: SectionDesc::decode(region, 32),
        };

        header.sensor_section.validate("sensor", region.len())?;
        header.reading_section.validate("reading", region.len())?;

        Ok(header)
    }
}

/// Kind of quantity a reading reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ReadingType {
    /// No reading.
    None = 0,
    /// Temperature [°C].
    Temperature = 1,
    /// Voltage [V].
    Voltage = 2,
    /// Fan speed [RPM].
    Fan = 3,
    /// Current [A].
    Current = 4,
    /// Power [W].
    Power = 5,
    /// Clock frequency [MHz].
    Clock = 6,
    /// Utilization [%].
    Usage = 7,
    /// Anything else.
    Other = 8,
}

impl ReadingType {
    /// Map a raw tag to a type. Tags above the known range decode as `Other`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::Temperature,
            2 => Self::Voltage,
            3 => Self::Fan,
            4 => Self::Current,
            5 => Self::Power,
            6 => Self::Clock,
            7 => Self::Usage,
            _ => Self::Other,
        }
    }
}

/// One decoded sensor reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Kind of quantity.
    pub reading_type: ReadingType,
    /// Index of the owning sensor (device) in the sensor section.
    pub sensor_index: u32,
    /// Producer-assigned reading id.
    pub reading_id: u32,
    /// Original label as published by the producer.
    pub label_orig: String,
    /// User-renamed label (equals `label_orig` unless renamed).
    pub label_user: String,
    /// Unit string, e.g. `"RPM"` or `"°C"`.
    pub unit: String,
    /// Current value.
    pub value: f64,
    /// Session minimum.
    pub value_min: f64,
    /// Session maximum.
    pub value_max: f64,
    /// Session average.
    pub value_avg: f64,
}

impl Reading {
    /// Decode one record from exactly [`READING_SIZE`] bytes.
    ///
    /// # Errors
    /// `LayoutMismatch` if the slice length differs from the compiled
    /// record size.
    pub fn decode(record: &[u8]) -> SensorResult<Self> {
        if record.len() != READING_SIZE {
            return Err(SensorError::LayoutMismatch {
                expected: READING_SIZE as u32,
                actual: record.len() as u32,
            });
        }

        let mut off = 0usize;
        let reading_type = ReadingType::from_raw(u32_at(record, off));
        off += 4;
        let sensor_index = u32_at(record, off);
        off += 4;
        let reading_id = u32_at(record, off);
        off += 4;
        let label_orig = fixed_str(&record[off..off + LABEL_LEN]);
        off += LABEL_LEN;
        let label_user = fixed_str(&record[off..off + LABEL_LEN]);
        off += LABEL_LEN;
        let unit = fixed_str(&record[off..off + UNIT_LEN]);
        off += UNIT_LEN;
        let value = f64_at(record, off);
        let value_min = f64_at(record, off + 8);
        let value_max = f64_at(record, off + 16);
        let value_avg = f64_at(record, off + 24);

        Ok(Self {
            reading_type,
            sensor_index,
            reading_id,
            label_orig,
            label_user,
            unit,
            value,
            value_min,
            value_max,
            value_avg,
        })
    }
}

fn u32_at(buf: &[u8], off: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[off..off + 4]);
    u32::from_le_bytes(b)
}

fn i64_at(buf: &[u8], off: usize) -> i64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    i64::from_le_bytes(b)
}

fn f64_at(buf: &[u8], off: usize) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    f64::from_le_bytes(b)
}

/// Interpret a fixed-capacity NUL-padded buffer as text.
///
/// Truncates at the first NUL; the producer writes host code-page bytes,
/// which decode lossily (undecodable bytes become U+FFFD).
fn fixed_str(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{header_bytes, record_bytes};

    #[test]
    fn header_roundtrip() {
        let mut region = header_bytes(HEADER_SIZE as u32, READING_SIZE as u32, 1);
        region.extend_from_slice(&record_bytes(7, "Total CPU Usage", "%", 42.0));

        let header = RegionHeader::decode(&region).unwrap();
        assert_eq!(header.signature, REGION_SIGNATURE);
        assert_eq!(header.version, 2);
        assert_eq!(header.poll_time, 1_700_000_000);
        assert_eq!(header.reading_section.offset, HEADER_SIZE as u32);
        assert_eq!(header.reading_section.element_count, 1);
    }

    #[test]
    fn reject_bad_signature() {
        let mut region = header_bytes(HEADER_SIZE as u32, READING_SIZE as u32, 0);
        region[0] = 0xAA;
        let err = RegionHeader::decode(&region).unwrap_err();
        assert!(matches!(err, SensorError::CorruptHeader { .. }));
    }

    #[test]
    fn reject_short_region() {
        let err = RegionHeader::decode(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, SensorError::CorruptHeader { .. }));
    }

    #[test]
    fn reject_section_past_end() {
        // Header claims one record but the region stops at the header.
        let region = header_bytes(HEADER_SIZE as u32, READING_SIZE as u32, 1);
        let err = RegionHeader::decode(&region).unwrap_err();
        assert!(matches!(err, SensorError::CorruptHeader { .. }));
    }

    #[test]
    fn section_span_overflow_is_rejected() {
        // offset + size * count would overflow u32; the u64 math must
        // still catch it.
        let region = header_bytes(u32::MAX, u32::MAX, u32::MAX);
        let err = RegionHeader::decode(&region).unwrap_err();
        assert!(matches!(err, SensorError::CorruptHeader { .. }));
    }

    #[test]
    fn record_decode_basic() {
        let rec = record_bytes(1, "CPU Package", "°C", 55.5);
        let reading = Reading::decode(&rec).unwrap();
        assert_eq!(reading.reading_type, ReadingType::Temperature);
        assert_eq!(reading.label_orig, "CPU Package");
        assert_eq!(reading.label_user, "CPU Package");
        assert_eq!(reading.unit, "°C");
        assert_eq!(reading.value, 55.5);
        assert_eq!(reading.value_min, 54.5);
        assert_eq!(reading.value_max, 56.5);
        assert_eq!(reading.value_avg, 55.5);
    }

    #[test]
    fn record_decode_wrong_size() {
        let err = Reading::decode(&[0u8; 100]).unwrap_err();
        assert!(matches!(
            err,
            SensorError::LayoutMismatch {
                expected: 316,
                actual: 100
            }
        ));
    }

    #[test]
    fn string_truncates_at_first_nul() {
        let mut rec = record_bytes(3, "CPU1", "RPM", 900.0);
        // Garbage after the NUL terminator must be ignored.
        rec[12 + 10] = b'X';
        let reading = Reading::decode(&rec).unwrap();
        assert_eq!(reading.label_orig, "CPU1");
    }

    #[test]
    fn string_without_nul_uses_full_capacity() {
        let label = "L".repeat(LABEL_LEN);
        let rec = record_bytes(8, &label, "x", 0.0);
        let reading = Reading::decode(&rec).unwrap();
        assert_eq!(reading.label_orig.len(), LABEL_LEN);
    }

    #[test]
    fn unknown_reading_type_maps_to_other() {
        assert_eq!(ReadingType::from_raw(99), ReadingType::Other);
        assert_eq!(ReadingType::from_raw(7), ReadingType::Usage);
    }
}
