//! One atomically-captured set of readings.

use crate::layout::Reading;

/// All readings captured against a single header read.
///
/// Immutable once produced; consumers render it once and drop it. There
/// are no incremental updates — the next tick captures a fresh snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    /// Producer poll timestamp from the header (producer-defined epoch).
    pub poll_time: i64,
    /// Decoded readings in section order.
    pub readings: Vec<Reading>,
}

impl SensorSnapshot {
    /// Number of readings in the snapshot.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the snapshot holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
