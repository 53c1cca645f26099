//! Serial sink for the display byte stream.
//!
//! The device is write-only: 9600 baud, 8 data bits, no parity, one stop
//! bit, no flow control except RTS held asserted. Writes are bounded by a
//! poll-based timeout so a wedged device surfaces as a transport error
//! (and a disconnect) instead of a stuck tick.

use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, AsRawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Port name that selects the in-process loopback sink.
pub const LOOPBACK_PORT: &str = "TEST";

/// Errors from the serial sink.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Opening or configuring the port failed
    #[error("cannot open port {port}: {source}")]
    Open {
        /// Port path
        port: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// A write failed outright
    #[error("write failed: {source}")]
    Write {
        /// Underlying error
        source: std::io::Error,
    },

    /// A write did not complete within the configured timeout
    #[error("write timed out after {ms} ms")]
    Timeout {
        /// Configured timeout in milliseconds
        ms: u64,
    },

    /// The port is not open
    #[error("port not open")]
    NotOpen,
}

/// A write-only byte sink with explicit open/close lifecycle.
pub trait Transport {
    /// Open and configure the underlying device.
    fn open(&mut self) -> Result<(), TransportError>;

    /// Whether the sink is currently open.
    fn is_open(&self) -> bool;

    /// Write all bytes, bounded by the transport's write timeout.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Release the underlying device. Idempotent.
    fn close(&mut self);

    /// Whether this is the loopback/test target (no reconnect probing).
    fn is_loopback(&self) -> bool {
        false
    }

    /// Human-readable target for status lines.
    fn describe(&self) -> String;
}

// ─── Serial ─────────────────────────────────────────────────────────

/// Termios-backed serial port.
pub struct SerialTransport {
    path: PathBuf,
    write_timeout: Duration,
    file: Option<File>,
}

impl SerialTransport {
    /// Create an unopened port handle.
    pub fn new(path: impl Into<PathBuf>, write_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            write_timeout,
            file: None,
        }
    }

    fn configure(&self, file: &File) -> nix::Result<()> {
        use nix::sys::termios::{
            BaudRate, ControlFlags, SetArg, cfmakeraw, cfsetispeed, cfsetospeed, tcgetattr,
            tcsetattr,
        };

        let mut tio = tcgetattr(file)?;
        cfmakeraw(&mut tio);
        tio.control_flags &= !(ControlFlags::PARENB | ControlFlags::CSTOPB | ControlFlags::CRTSCTS);
        tio.control_flags |= ControlFlags::CS8 | ControlFlags::CLOCAL;
        cfsetispeed(&mut tio, BaudRate::B9600)?;
        cfsetospeed(&mut tio, BaudRate::B9600)?;
        tcsetattr(file, SetArg::TCSANOW, &tio)?;

        // Assert RTS; nix has no modem-line wrapper, so ioctl directly.
        let bits: libc::c_int = libc::TIOCM_RTS;
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), libc::TIOCMBIS, &bits) };
        if rc == -1 {
            return Err(nix::Error::last());
        }

        Ok(())
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.file.is_some() {
            return Ok(());
        }

        let port = self.path.display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&self.path)
            .map_err(|source| TransportError::Open {
                port: port.clone(),
                source,
            })?;

        self.configure(&file).map_err(|e| TransportError::Open {
            port,
            source: nix_io(e),
        })?;

        debug!(port = %self.path.display(), "serial port configured 9600 8N1, RTS asserted");
        self.file = Some(file);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        use nix::errno::Errno;
        use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

        let Some(file) = self.file.as_ref() else {
            return Err(TransportError::NotOpen);
        };

        let timeout_ms = self.write_timeout.as_millis() as u64;
        let deadline = Instant::now() + self.write_timeout;
        let mut written = 0usize;

        while written < bytes.len() {
            let now = Instant::now();
            if now >= deadline {
                return Err(TransportError::Timeout { ms: timeout_ms });
            }
            let remaining = deadline - now;

            let remaining_ms = remaining.as_millis().min(u128::from(u16::MAX)) as u16;
            let mut fds = [PollFd::new(file.as_fd(), PollFlags::POLLOUT)];
            let ready = poll(&mut fds, PollTimeout::from(remaining_ms))
                .map_err(|e| TransportError::Write { source: nix_io(e) })?;

            if ready == 0 {
                return Err(TransportError::Timeout { ms: timeout_ms });
            }

            match nix::unistd::write(file.as_fd(), &bytes[written..]) {
                Ok(n) => written += n,
                Err(Errno::EAGAIN) => continue,
                Err(e) => return Err(TransportError::Write { source: nix_io(e) }),
            }
        }

        Ok(())
    }

    fn close(&mut self) {
        self.file = None;
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn nix_io(e: nix::Error) -> std::io::Error {
    std::io::Error::from_raw_os_error(e as i32)
}

// ─── Loopback ───────────────────────────────────────────────────────

/// In-process sink for the "TEST" target and for tests.
///
/// Captures everything written while open; a tap handle shares the
/// captured bytes with the test or status code that wants to look.
#[derive(Default)]
pub struct LoopbackTransport {
    open: bool,
    fail_writes: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl LoopbackTransport {
    /// New closed loopback sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the captured byte stream.
    pub fn tap(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.sent)
    }

    /// Make subsequent writes fail, to exercise disconnect paths.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Shared handle to the failure switch, usable after boxing.
    pub fn fail_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_writes)
    }
}

impl Transport for LoopbackTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(TransportError::Write {
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "loopback failure"),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_loopback(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        LOOPBACK_PORT.to_string()
    }
}

/// Build the transport a port name selects.
pub fn make_transport(port: &str, write_timeout: Duration) -> Box<dyn Transport> {
    if port == LOOPBACK_PORT {
        Box::new(LoopbackTransport::new())
    } else {
        Box::new(SerialTransport::new(port, write_timeout))
    }
}
