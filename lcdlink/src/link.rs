//! Connection lifecycle for the display link.
//!
//! `Disconnected → Connecting → Connected → Disconnected`. Opening the
//! port emits clear + open-backlight ahead of the first frame; closing
//! emits clear + close-backlight best-effort (a failure there is logged,
//! never escalated) and releases the port.

use crate::transport::{Transport, TransportError};
use lcdlink_display::{connect_sequence, disconnect_sequence};
use tracing::{info, warn};

/// Link lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No port held.
    #[default]
    Disconnected,
    /// Port open in progress.
    Connecting,
    /// Port open, display initialized.
    Connected,
}

/// The serial link plus its lifecycle state.
pub struct DisplayLink {
    transport: Box<dyn Transport>,
    state: LinkState,
}

impl DisplayLink {
    /// Wrap a transport; starts disconnected.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            state: LinkState::Disconnected,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether frames can be sent right now.
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Whether the underlying target is the loopback/test sink.
    pub fn is_loopback(&self) -> bool {
        self.transport.is_loopback()
    }

    /// Human-readable target name.
    pub fn target(&self) -> String {
        self.transport.describe()
    }

    /// Open the port and initialize the display.
    ///
    /// On success the display has been cleared and its backlight turned
    /// on; the caller must reset the render session's blink phase. Any
    /// failure lands back in `Disconnected`.
    pub fn connect(&mut self) -> Result<(), TransportError> {
        if self.is_connected() {
            return Ok(());
        }

        self.state = LinkState::Connecting;
        let result = self
            .transport
            .open()
            .and_then(|()| self.transport.write(&connect_sequence()));

        match result {
            Ok(()) => {
                self.state = LinkState::Connected;
                info!(target = %self.transport.describe(), "display link connected");
                Ok(())
            }
            Err(e) => {
                self.transport.close();
                self.state = LinkState::Disconnected;
                Err(e)
            }
        }
    }

    /// Send one encoded byte stream.
    ///
    /// A transport error triggers the `Connected → Disconnected`
    /// transition before propagating, so the next tick's probe attempts
    /// a reopen.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotOpen);
        }

        match self.transport.write(bytes) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "transport write failed, disconnecting");
                self.transport.close();
                self.state = LinkState::Disconnected;
                Err(e)
            }
        }
    }

    /// Shut the display down and release the port.
    pub fn disconnect(&mut self) {
        if self.transport.is_open() {
            if let Err(e) = self.transport.write(&disconnect_sequence()) {
                warn!(error = %e, "best-effort display shutdown write failed");
            }
            self.transport.close();
        }
        if self.state != LinkState::Disconnected {
            info!("display link disconnected");
        }
        self.state = LinkState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;
    use lcdlink_display::encode::{CLEAR, CLOSE_BACKLIGHT, OPEN_BACKLIGHT};
    use std::sync::{Arc, Mutex};

    fn loopback_link() -> (DisplayLink, Arc<Mutex<Vec<u8>>>) {
        let transport = LoopbackTransport::new();
        let tap = transport.tap();
        (DisplayLink::new(Box::new(transport)), tap)
    }

    #[test]
    fn connect_emits_clear_then_backlight_on() {
        let (mut link, tap) = loopback_link();
        assert_eq!(link.state(), LinkState::Disconnected);

        link.connect().unwrap();
        assert_eq!(link.state(), LinkState::Connected);
        assert_eq!(*tap.lock().unwrap(), vec![CLEAR, OPEN_BACKLIGHT]);
    }

    #[test]
    fn connect_is_idempotent() {
        let (mut link, tap) = loopback_link();
        link.connect().unwrap();
        link.connect().unwrap();
        assert_eq!(tap.lock().unwrap().len(), 2);
    }

    #[test]
    fn disconnect_emits_clear_then_backlight_off() {
        let (mut link, tap) = loopback_link();
        link.connect().unwrap();
        link.disconnect();

        assert_eq!(link.state(), LinkState::Disconnected);
        assert_eq!(
            *tap.lock().unwrap(),
            vec![CLEAR, OPEN_BACKLIGHT, CLEAR, CLOSE_BACKLIGHT]
        );
    }

    #[test]
    fn send_requires_connection() {
        let (mut link, _tap) = loopback_link();
        assert!(matches!(link.send(b"x"), Err(TransportError::NotOpen)));
    }

    #[test]
    fn connect_failure_lands_back_in_disconnected() {
        let mut failing = LoopbackTransport::new();
        failing.set_fail_writes(true);
        let mut link = DisplayLink::new(Box::new(failing));

        // The port opens but the init sequence write fails.
        assert!(link.connect().is_err());
        assert_eq!(link.state(), LinkState::Disconnected);
    }

    #[test]
    fn send_failure_transitions_to_disconnected() {
        let transport = LoopbackTransport::new();
        let fail = transport.fail_handle();
        let mut link = DisplayLink::new(Box::new(transport));
        link.connect().unwrap();

        fail.store(true, std::sync::atomic::Ordering::Relaxed);
        assert!(matches!(
            link.send(b"frame"),
            Err(TransportError::Write { .. })
        ));
        assert_eq!(link.state(), LinkState::Disconnected);
    }

    #[test]
    fn disconnect_when_never_connected_is_quiet() {
        let (mut link, tap) = loopback_link();
        link.disconnect();
        assert!(tap.lock().unwrap().is_empty());
        assert_eq!(link.state(), LinkState::Disconnected);
    }
}
