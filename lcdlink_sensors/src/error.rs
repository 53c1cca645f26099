//! Error types for sensor shared-memory operations

use thiserror::Error;

/// Errors that can occur while reading the sensor shared-memory region.
///
/// All variants except configuration-level misuse are transient: the
/// region is re-opened on every snapshot attempt, so a failure here is
/// "producer offline for this tick", never a process-fatal condition.
#[derive(Error, Debug)]
pub enum SensorError {
    /// The named region cannot be opened (producer offline or no permission)
    #[error("sensor region unavailable: {name}")]
    RegionUnavailable {
        /// Region name
        name: String,
    },

    /// The producer process is not running, no open was attempted
    #[error("sensor producer not running: {process}")]
    ProducerNotRunning {
        /// Producer process name
        process: String,
    },

    /// Header failed validation; element reads must not proceed
    #[error("corrupt region header: {reason}")]
    CorruptHeader {
        /// What failed to validate
        reason: String,
    },

    /// Published element size differs from the compiled record layout
    #[error("reading element size mismatch: region reports {actual} bytes, expected {expected}")]
    LayoutMismatch {
        /// Size of the compiled record layout
        expected: u32,
        /// Size the region header advertises
        actual: u32,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Nix system call error
    #[error("system call error: {source}")]
    Nix {
        /// Source nix error
        #[from]
        source: nix::Error,
    },
}

/// Result type for sensor shared-memory operations
pub type SensorResult<T> = Result<T, SensorError>;
