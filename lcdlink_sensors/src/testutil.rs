//! Builders for synthetic producer regions, shared across unit tests.

use crate::layout::{HEADER_SIZE, LABEL_LEN, READING_SIZE, REGION_SIGNATURE, UNIT_LEN};

fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Build a header advertising an empty sensor section and the given
/// reading section triple.
pub(crate) fn header_bytes(reading_offset: u32, reading_size: u32, reading_count: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    push_u32(&mut buf, REGION_SIGNATURE);
    push_u32(&mut buf, 2); // version
    push_u32(&mut buf, 1); // revision
    buf.extend_from_slice(&1_700_000_000i64.to_le_bytes());
    // sensor section: empty
    push_u32(&mut buf, HEADER_SIZE as u32);
    push_u32(&mut buf, 0);
    push_u32(&mut buf, 0);
    // reading section
    push_u32(&mut buf, reading_offset);
    push_u32(&mut buf, reading_size);
    push_u32(&mut buf, reading_count);
    buf
}

/// Build one reading record with min/max bracketing the value by 1.0.
pub(crate) fn record_bytes(reading_type: u32, label: &str, unit: &str, value: f64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(READING_SIZE);
    push_u32(&mut buf, reading_type);
    push_u32(&mut buf, 0); // sensor index
    push_u32(&mut buf, 7); // reading id
    let mut lbl = [0u8; LABEL_LEN];
    lbl[..label.len()].copy_from_slice(label.as_bytes());
    buf.extend_from_slice(&lbl);
    buf.extend_from_slice(&lbl); // user label == original
    let mut un = [0u8; UNIT_LEN];
    un[..unit.len()].copy_from_slice(unit.as_bytes());
    buf.extend_from_slice(&un);
    for v in [value, value - 1.0, value + 1.0, value] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

/// Build a full region: header plus `records` reading records.
pub(crate) fn region_bytes(records: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = header_bytes(HEADER_SIZE as u32, READING_SIZE as u32, records.len() as u32);
    for rec in records {
        buf.extend_from_slice(rec);
    }
    buf
}
