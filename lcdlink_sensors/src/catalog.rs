//! Label-indexed view over one snapshot.
//!
//! A monitoring source may publish several readings under the same label
//! across different physical devices (two fan headers both named "CPU1");
//! unit equality is the tie-break. Lookup failure is not an error here —
//! the renderer substitutes a layout-defined fallback and records a
//! warning on the frame.

use crate::layout::Reading;
use crate::snapshot::SensorSnapshot;
use std::collections::HashMap;
use tracing::debug;

/// O(1) lookup index over the readings of one snapshot.
///
/// Owns its copy of the decoded records for the snapshot's lifetime.
pub struct Catalog {
    poll_time: i64,
    readings: Vec<Reading>,
    by_label: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Build the index from a captured snapshot.
    pub fn build(snapshot: SensorSnapshot) -> Self {
        let mut by_label: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, reading) in snapshot.readings.iter().enumerate() {
            by_label
                .entry(reading.label_orig.clone())
                .or_default()
                .push(idx);
        }

        let duplicates = by_label.values().filter(|v| v.len() > 1).count();
        if duplicates > 0 {
            debug!(duplicates, "catalog contains duplicate labels; unit tie-break applies");
        }

        Self {
            poll_time: snapshot.poll_time,
            readings: snapshot.readings,
            by_label,
        }
    }

    /// Find a reading by exact original label, optionally disambiguated
    /// by unit. With `unit == None` the first published match wins.
    pub fn find(&self, label: &str, unit: Option<&str>) -> Option<&Reading> {
        let indices = self.by_label.get(label)?;
        match unit {
            None => indices.first().map(|&i| &self.readings[i]),
            Some(u) => indices
                .iter()
                .map(|&i| &self.readings[i])
                .find(|r| r.unit == u),
        }
    }

    /// All readings matching a predicate, in section order.
    pub fn find_all<'a>(
        &'a self,
        predicate: impl Fn(&Reading) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Reading> {
        self.readings.iter().filter(move |r| predicate(r))
    }

    /// Producer poll timestamp this catalog was captured against.
    pub fn poll_time(&self) -> i64 {
        self.poll_time
    }

    /// Number of indexed readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the catalog holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Iterate all readings in section order.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }
}
