//! Error types for ccdbg-core
//!
//! Precondition failures never abort the process: every guarded operation
//! reports one of these kinds and leaves the hardware untouched.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Operation attempted while the session is deactivated
    NotActive,
    /// Operation requiring debug mode attempted outside of it
    NotDebugging,
    /// Ready handshake timed out - target disconnected or unresponsive
    NotWired,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotActive => write!(f, "debugger is not active"),
            Self::NotDebugging => write!(f, "target is not in debug mode"),
            Self::NotWired => write!(f, "target not responding (check wiring)"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
