//! Protocol timing windows
//!
//! The two-wire protocol is timing sensitive: every level or direction
//! change must dwell for a minimum window before the next transition, and
//! the debug-mode entry handshake is a fixed pulse train. The values here
//! were validated against the target silicon's documented timing windows
//! and are not tunable - one unit is one nanosecond, the platform's
//! minimum sleep granularity.
//!
//! Dwells are issued through [`LineController::delay`], so emulated
//! targets can record them instead of sleeping.
//!
//! [`LineController::delay`]: crate::lines::LineController::delay

use core::time::Duration;

/// Initial DC high pulse of the debug-mode entry handshake.
pub const ENTER_PULSE_LONG: Duration = Duration::from_nanos(200);

/// Short DC pulses of the entry handshake.
pub const ENTER_PULSE_SHORT: Duration = Duration::from_nanos(40);

/// Dwell before releasing RST during entry, and again after the release.
pub const ENTER_RESET_HOLD: Duration = Duration::from_nanos(85);

/// Minimum clock half-period while shifting a byte out (setup/hold per bit).
pub const WRITE_BIT_HOLD: Duration = Duration::from_nanos(20);

/// Minimum clock half-period while shifting a byte in.
pub const READ_BIT_HOLD: Duration = Duration::from_nanos(32);

/// Settle time after a DD direction change, t(dir_change).
pub const DIR_CHANGE_SETTLE: Duration = Duration::from_nanos(32);

/// Settle time before sampling the first result bit, t(sample_wait).
pub const SAMPLE_SETTLE: Duration = Duration::from_nanos(32);

/// Upper bound on the ready-handshake edge wait.
///
/// A target that has not released DD within this window is treated as
/// disconnected and the debug session is abandoned.
pub const READY_TIMEOUT: Duration = Duration::from_millis(200);
