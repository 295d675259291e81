//! ccdbg-linux-gpio - Linux GPIO line controller
//!
//! This crate drives the three debug lines (RST, DC, DD) through the
//! Linux character device GPIO interface using the gpiocdev crate, the
//! modern replacement for the deprecated sysfs interface.
//!
//! # Example
//!
//! ```no_run
//! use ccdbg_core::Debugger;
//! use ccdbg_linux_gpio::{GpioLines, GpioLinesConfig};
//!
//! let config = GpioLinesConfig::new("gpiochip0").with_rst(24).with_dc(27).with_dd(28);
//! let mut dbg = Debugger::new(GpioLines::open(&config)?);
//! dbg.enter()?;
//! println!("chip ID: {:04x}", dbg.chip_id()?);
//! dbg.exit()?;
//! dbg.set_active(false);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Wiring
//!
//! | Target pin | GPIO function | Description |
//! |------------|---------------|----------------------------------|
//! | RESET_N    | RST (output)  | Target reset, active low |
//! | DC         | DC (output)   | Debug clock |
//! | DD         | DD (bidir)    | Debug data |
//!
//! # System requirements
//!
//! - Linux kernel 5.5+ for the v2 GPIO uAPI (edge events on request)
//! - Access to `/dev/gpiochipN` (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{GpioLines, GpioLinesConfig, DEFAULT_DC, DEFAULT_DD, DEFAULT_RST};
pub use error::{GpioLinesError, Result};
