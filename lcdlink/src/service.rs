//! Tick pipeline: probe → liveness → snapshot → render → encode → write.
//!
//! A single thread drives everything at the configured period, executing
//! the phases strictly in order; the next tick cannot start while a
//! write is outstanding because there is no other driver. Every failure
//! is caught at the tick boundary, turned into a one-line status, and
//! shown on the display as an error frame instead of stale data — none
//! of them terminate the process.

use crate::config::{ConfigError, DaemonConfig, LoadedConfig};
use crate::link::DisplayLink;
use crate::transport::{Transport, make_transport};
use chrono::NaiveDateTime;
use lcdlink_display::{DisplayLayout, Intents, RenderSession, encode, status_frame};
use lcdlink_sensors::{Catalog, SensorRegion, producer_running};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Message shown on the display when the producer process is down.
const PRODUCER_DOWN_MSG: &str = "Sensor App Error!";
/// Message shown on the display when the region cannot be read.
const SENSOR_ERROR_MSG: &str = "Sensor Read Error!";

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// One-line human-readable status.
    pub status: String,
    /// Whether any bytes reached the transport this tick.
    pub sent: bool,
}

impl TickReport {
    fn silent(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            sent: false,
        }
    }

    fn sent(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            sent: true,
        }
    }
}

/// The daemon's tick-driven core.
pub struct Service {
    config: DaemonConfig,
    layout: DisplayLayout,
    session: RenderSession,
    link: DisplayLink,
    last_status: String,
}

impl Service {
    /// Build the service with the transport its config selects.
    pub fn new(loaded: LoadedConfig) -> Result<Self, ConfigError> {
        let transport = make_transport(
            &loaded.daemon.port,
            Duration::from_millis(loaded.daemon.write_timeout_ms),
        );
        Self::with_transport(loaded, transport)
    }

    /// Build the service over an explicit transport (tests).
    pub fn with_transport(
        loaded: LoadedConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let layout = loaded.layouts.get(&loaded.daemon.active_layout)?.clone();
        Ok(Self {
            config: loaded.daemon,
            layout,
            session: RenderSession::new(),
            link: DisplayLink::new(transport),
            last_status: String::new(),
        })
    }

    /// The render session (blink phase, preview mirror).
    pub fn session(&self) -> &RenderSession {
        &self.session
    }

    /// Current link state.
    pub fn link(&self) -> &DisplayLink {
        &self.link
    }

    /// Execute one tick at the given instant.
    pub fn tick(&mut self, now: NaiveDateTime) -> TickReport {
        // Phase 0: auto-connect window.
        if !self.config.schedule.should_connect(now) {
            if self.link.is_connected() {
                self.link.disconnect();
            }
            return TickReport::silent("schedule: window closed, link down");
        }

        // Phase 1: reconnect probe. Never render against a closed sink.
        if !self.link.is_connected() {
            if let Err(e) = self.link.connect() {
                return TickReport::silent(format!(
                    "cannot open {}: {e}",
                    self.link.target()
                ));
            }
            // Closed → open: blink phase restarts; preview rotation does not.
            self.session.reset_blink();
        }

        // Phase 2: producer liveness. When the producer is down no region
        // open is attempted at all.
        if !producer_running(&self.config.producer_process) {
            return self.send_error_frame(
                PRODUCER_DOWN_MSG,
                format!("producer not running: {}", self.config.producer_process),
            );
        }

        // Phase 3: one best-effort snapshot.
        let catalog = match SensorRegion::open(&self.config.region_name)
            .and_then(|region| region.read_snapshot())
        {
            Ok(snapshot) => Catalog::build(snapshot),
            Err(e) => {
                return self.send_error_frame(SENSOR_ERROR_MSG, e.to_string());
            }
        };

        // Phases 4–6: render, encode, write.
        let frame = self.session.render(&catalog, &self.layout, now);
        let warnings = frame.warnings.len();
        let bytes = encode(&frame, Intents::empty());

        match self.link.send(&bytes) {
            Ok(()) => TickReport::sent(format!(
                "ok: {} readings, {} warnings",
                catalog.len(),
                warnings
            )),
            Err(e) => TickReport::silent(format!("transport error: {e}")),
        }
    }

    /// Render a status message to the display, best-effort.
    fn send_error_frame(&mut self, message: &str, status: String) -> TickReport {
        self.session.preview_mut().push_text(message);
        let frame = status_frame(message, self.layout.width, self.layout.rows);
        let bytes = encode(&frame, Intents::CLEAR | Intents::BACKLIGHT_ON);
        let sent = self.link.send(&bytes).is_ok();
        TickReport { status, sent }
    }

    /// Enter the tick loop until the shutdown flag is set, then release
    /// the display.
    ///
    /// Instant-paced: each iteration sleeps only the remainder of the
    /// tick period, so a slow write delays — never overlaps — the next
    /// tick.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        let period = Duration::from_millis(self.config.tick_interval_ms);
        info!(
            target = %self.link.target(),
            layout = %self.layout.name,
            period_ms = self.config.tick_interval_ms,
            "entering tick loop"
        );

        while !shutdown.load(Ordering::Relaxed) {
            let start = Instant::now();

            let now = chrono::Local::now().naive_local();
            let report = self.tick(now);

            if report.status != self.last_status {
                info!(status = %report.status, "tick status changed");
                self.last_status = report.status;
            } else {
                debug!(status = %report.status, sent = report.sent, "tick");
            }

            if let Some(remaining) = period.checked_sub(start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        info!("shutdown requested, releasing display");
        self.link.disconnect();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
