//! Error types for layout loading and validation.
//!
//! Render-time problems (a missing sensor, a reserved byte in literal
//! text) are deliberately NOT errors: they degrade to fallbacks and
//! warnings so a render pass always produces a frame. Only configuration
//! problems surface here, and those are fatal at startup.

use thiserror::Error;

/// Errors from loading or validating display layout configuration.
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Layout file could not be read
    #[error("layout config I/O: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Layout file is not valid TOML for the expected schema
    #[error("layout config parse: {0}")]
    Parse(String),

    /// Layout file parsed but violates a structural rule
    #[error("layout config validation: {0}")]
    Validation(String),

    /// A layout name was requested that the file does not define
    #[error("unknown layout: {0}")]
    UnknownLayout(String),
}

/// Result type for display configuration operations.
pub type DisplayResult<T> = Result<T, DisplayError>;
