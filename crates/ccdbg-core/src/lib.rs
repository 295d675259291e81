//! ccdbg-core - Driver for the ChipCon two-wire debug interface
//!
//! This crate implements the proprietary in-circuit debug protocol used by
//! the CC111x/CC243x/CC253x/CC254x 8051 MCU family. The target is driven
//! over three digital lines: RST (reset), DC (debug clock) and DD (debug
//! data, bidirectional). All protocol logic lives here; actual pin access
//! is delegated to a [`LineController`] implementation, so the driver runs
//! unchanged against Linux GPIO hardware or an emulated target.
//!
//! # Features
//!
//! - `std` - Enable standard library support
//!
//! # Example
//!
//! ```ignore
//! use ccdbg_core::Debugger;
//!
//! let mut dbg = Debugger::new(lines);
//! dbg.enter()?;
//! println!("chip ID: {:04x}", dbg.chip_id()?);
//! dbg.exit()?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod debugger;
pub mod error;
pub mod instr;
pub mod lines;
pub mod timing;

pub use debugger::Debugger;
pub use error::{Error, Result};
pub use instr::{Instr, InstructionSet};
pub use lines::{Direction, LineController};
