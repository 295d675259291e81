//! Error types for the Linux GPIO line controller

use thiserror::Error;

/// Linux GPIO specific errors
#[derive(Debug, Error)]
pub enum GpioLinesError {
    /// Failed to open the GPIO chip
    #[error("Failed to open GPIO chip '{path}': {source}")]
    ChipOpenFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// No GPIO chip specified
    #[error("No GPIO chip specified (e.g. gpiochip0 or /dev/gpiochip0)")]
    NoDevice,
}

/// Result type for Linux GPIO operations
pub type Result<T> = std::result::Result<T, GpioLinesError>;
