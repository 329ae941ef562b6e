//! Common error types for iopin.
//!
//! This module provides a centralized Error enum using thiserror. Backends
//! return the same type, so a failure raised by hardware reaches the caller
//! unchanged through the pin layer.

use thiserror::Error;

/// Main error type for iopin operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An abstract pin id with no entry in the mapping table
    #[error("Requested pin is not mapped: {0}")]
    UnmappedPin(String),

    /// The hardware refuses a direction, type, PWM request or scope
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A value of the wrong shape for the requested mode
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Transient "resource busy" condition reported by a backend
    #[error("Resource busy: {0}")]
    Busy(String),

    /// No registered driver with this name, or not available here
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an `UnmappedPin` error from any abstract pin id.
    pub fn unmapped(pin: &impl std::fmt::Debug) -> Self {
        Self::UnmappedPin(format!("{pin:?}"))
    }

    /// Whether this is a transient busy condition worth retrying.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
