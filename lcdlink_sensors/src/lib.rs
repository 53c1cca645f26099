//! # Sensor Shared-Memory Feed
//!
//! Read-only consumer of the binary shared-memory region published by a
//! hardware-monitoring application. This crate owns the hard half of the
//! ingest path: validating a versioned header and decoding an
//! externally-owned, offset-addressed record layout into typed readings,
//! then indexing them for O(1) lookup by the renderer.
//!
//! ## Design
//!
//! - **Bounds-checked decode**: every field is read with explicit
//!   little-endian conversions over validated slices; there are no struct
//!   casts over foreign memory.
//! - **Open per read**: the mapping lives only for one snapshot, so a
//!   producer crash between ticks is self-healing — the next open fails
//!   with [`SensorError::RegionUnavailable`] and the caller treats it as
//!   "producer offline", not as a fatal condition.
//! - **Layout defense**: the producer advertises its element size in the
//!   header; if it differs from the compiled [`layout::READING_SIZE`],
//!   decoding refuses with [`SensorError::LayoutMismatch`] instead of
//!   silently misaligning fields.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lcdlink_sensors::{Catalog, SensorRegion};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let region = SensorRegion::open("HWiNFO_SENS_SM2")?;
//! let snapshot = region.read_snapshot()?;
//! let catalog = Catalog::build(snapshot);
//!
//! if let Some(usage) = catalog.find("Total CPU Usage", None) {
//!     println!("cpu: {:.0}%", usage.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, SensorError>`; every shared-memory
//! failure is transient and retried by the caller on its next tick.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod error;
pub mod layout;
pub mod platform;
pub mod reader;
pub mod region;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testutil;

pub use catalog::Catalog;
pub use error::{SensorError, SensorResult};
pub use layout::{Reading, ReadingType, RegionHeader, SectionDesc};
pub use platform::producer_running;
pub use reader::{read_header, read_snapshot};
pub use region::SensorRegion;
pub use snapshot::SensorSnapshot;
