//! # lcdlink Daemon Library
//!
//! Tick-driven bridge from a hardware monitor's shared-memory sensor
//! feed to a character LCD on a serial link. The daemon owns the
//! external-facing plumbing — configuration, the serial transport, the
//! connection state machine, and the 1 Hz tick pipeline — while the
//! decode and render cores live in `lcdlink_sensors` and
//! `lcdlink_display`.

#![warn(clippy::all)]

pub mod config;
pub mod link;
pub mod schedule;
pub mod service;
pub mod transport;
