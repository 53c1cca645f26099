//! # Frame Rendering & LCD Protocol Encoding
//!
//! The deterministic half of the display pipeline: a snapshot catalog and
//! a declarative layout go in, a fixed-geometry frame and a control-byte
//! stream come out. Nothing here talks to hardware or shared memory.
//!
//! ## Pipeline
//!
//! ```text
//! Catalog ──► RenderSession::render ──► RenderedFrame ──► encode ──► bytes
//!                   │                        │
//!              blink phase              warning list
//!              preview mirror          (missing sensors)
//! ```
//!
//! ## Determinism
//!
//! Rendering is a pure function of (catalog, layout, instant, blink
//! phase). The two pieces of process-wide state the pipeline needs — the
//! alternating colon flag and the rotating preview index — live in
//! [`RenderSession`] with explicit reset rules instead of ambient
//! globals: the blink phase resets on every reconnect, the preview
//! rotation only on process start.
//!
//! ## Usage
//!
//! ```rust
//! use lcdlink_display::{encode, Intents, LayoutFile, RenderSession};
//! use lcdlink_sensors::{Catalog, SensorSnapshot};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layouts = LayoutFile::from_toml(r#"
//! [[layout]]
//! name = "clock"
//! [[layout.line]]
//! segment = [{ kind = "clock" }]
//! "#)?;
//!
//! let catalog = Catalog::build(SensorSnapshot { poll_time: 0, readings: vec![] });
//! let mut session = RenderSession::new();
//! let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(12, 0, 0).unwrap();
//!
//! let frame = session.render(&catalog, layouts.get("clock")?, now);
//! let bytes = encode(&frame, Intents::CLEAR);
//! assert!(!bytes.is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod bar;
pub mod encode;
pub mod error;
pub mod frame;
pub mod layout;
pub mod preview;
pub mod render;

pub use bar::{BarLevel, BarPattern, percent_to_bar};
pub use encode::{Intents, connect_sequence, disconnect_sequence, encode};
pub use error::{DisplayError, DisplayResult};
pub use frame::{Cell, Line, RenderWarning, RenderedFrame};
pub use layout::{DisplayLayout, LayoutFile, LineSpec, SegmentSpec, SensorRef};
pub use preview::PreviewBuffer;
pub use render::{RenderSession, status_frame};
