//! Linux GPIO line controller implementation
//!
//! This module provides the `GpioLines` struct that implements the
//! `LineController` trait using Linux's GPIO character device interface
//! (gpiocdev).
//!
//! Each of the three debug lines is held as its own line request so that a
//! line that cannot be acquired degrades the session instead of aborting
//! it, and so the DD line can be reconfigured between input and output
//! without disturbing RST and DC. The ready handshake uses kernel edge
//! events on DD rather than level polling.

use std::time::Duration;

use gpiocdev::line::{EdgeDetection, Offset, Value};
use gpiocdev::request::{Config, Request};

use ccdbg_core::lines::{Direction, LineController};

use crate::error::{GpioLinesError, Result};

/// GPIO consumer label attached to every line request
const CONSUMER: &str = "cc-debugger";

/// Default RST line offset
pub const DEFAULT_RST: Offset = 24;
/// Default DC (debug clock) line offset
pub const DEFAULT_DC: Offset = 27;
/// Default DD (debug data) line offset
pub const DEFAULT_DD: Offset = 28;

/// Configuration for opening the debug lines
#[derive(Debug, Clone)]
pub struct GpioLinesConfig {
    /// GPIO chip name or device path (e.g. "gpiochip0" or "/dev/gpiochip0")
    pub device: String,
    /// RST line offset
    pub rst: Offset,
    /// DC (debug clock) line offset
    pub dc: Offset,
    /// DD (debug data) line offset
    pub dd: Offset,
}

impl Default for GpioLinesConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            rst: DEFAULT_RST,
            dc: DEFAULT_DC,
            dd: DEFAULT_DD,
        }
    }
}

impl GpioLinesConfig {
    /// Create a configuration for the given chip with default line offsets
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the RST line offset
    pub fn with_rst(mut self, offset: Offset) -> Self {
        self.rst = offset;
        self
    }

    /// Set the DC line offset
    pub fn with_dc(mut self, offset: Offset) -> Self {
        self.dc = offset;
        self
    }

    /// Set the DD line offset
    pub fn with_dd(mut self, offset: Offset) -> Self {
        self.dd = offset;
        self
    }
}

/// One held debug line
struct Line {
    name: &'static str,
    offset: Offset,
    request: Option<Request>,
}

impl Line {
    /// Request the line as an output driven low. Best effort: failure is
    /// logged and leaves the line unheld.
    fn request_output(path: &str, name: &'static str, offset: Offset) -> Self {
        let mut cfg = Config::default();
        cfg.with_line(offset).as_output(Value::Inactive);

        let request = match Request::from_config(cfg)
            .on_chip(path)
            .with_consumer(CONSUMER)
            .request()
        {
            Ok(request) => {
                log::debug!("requested {} line {} as output", name, offset);
                Some(request)
            }
            Err(e) => {
                log::warn!("failed to request {} line {}: {}", name, offset, e);
                None
            }
        };

        Self {
            name,
            offset,
            request,
        }
    }

    fn reconfigure(&self, cfg: &Config) {
        let Some(request) = &self.request else { return };
        if let Err(e) = request.reconfigure(cfg) {
            log::error!("failed to reconfigure {} line: {}", self.name, e);
        }
    }

    fn to_output(&self) {
        let mut cfg = Config::default();
        cfg.with_line(self.offset).as_output(Value::Inactive);
        self.reconfigure(&cfg);
    }

    fn to_input(&self) {
        let mut cfg = Config::default();
        cfg.with_line(self.offset).as_input();
        self.reconfigure(&cfg);
    }

    fn set(&self, high: bool) {
        let Some(request) = &self.request else { return };
        let value = if high { Value::Active } else { Value::Inactive };
        if let Err(e) = request.set_value(self.offset, value) {
            log::error!("failed to set {} line: {}", self.name, e);
        }
    }

    fn get(&self) -> bool {
        let Some(request) = &self.request else {
            return false;
        };
        match request.value(self.offset) {
            Ok(Value::Active) => true,
            Ok(Value::Inactive) => false,
            Err(e) => {
                log::error!("failed to get {} line: {}", self.name, e);
                false
            }
        }
    }
}

/// Debug line controller over the Linux GPIO character device
pub struct GpioLines {
    rst: Line,
    dc: Line,
    dd: Line,
}

impl GpioLines {
    /// Open the GPIO chip and acquire the three debug lines as outputs
    /// driven low.
    ///
    /// A line that cannot be requested is logged and skipped; the
    /// controller stays usable for whatever lines were acquired. Only a
    /// missing or unopenable chip is a hard error.
    pub fn open(config: &GpioLinesConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(GpioLinesError::NoDevice);
        }

        let path = if config.device.starts_with('/') {
            config.device.clone()
        } else {
            format!("/dev/{}", config.device)
        };

        let chip = gpiocdev::chip::Chip::from_path(&path).map_err(|source| {
            GpioLinesError::ChipOpenFailed {
                path: path.clone(),
                source,
            }
        })?;
        match chip.info() {
            Ok(info) => log::info!("using GPIO chip {} ({})", info.name, info.label),
            Err(e) => log::warn!("could not read GPIO chip info: {}", e),
        }
        drop(chip);

        log::info!(
            "requesting debug lines on {} (rst={}, dc={}, dd={})",
            path,
            config.rst,
            config.dc,
            config.dd
        );

        Ok(Self {
            rst: Line::request_output(&path, "rst", config.rst),
            dc: Line::request_output(&path, "dc", config.dc),
            dd: Line::request_output(&path, "dd", config.dd),
        })
    }
}

impl LineController for GpioLines {
    fn attach(&mut self) {
        self.rst.to_output();
        self.dc.to_output();
        self.dd.to_output();
    }

    fn release(&mut self) {
        self.rst.to_input();
        self.dc.to_input();
        self.dd.to_input();
    }

    fn set_reset(&mut self, high: bool) {
        self.rst.set(high);
    }

    fn set_clock(&mut self, high: bool) {
        self.dc.set(high);
    }

    fn set_data(&mut self, high: bool) {
        self.dd.set(high);
    }

    fn data(&mut self) -> bool {
        self.dd.get()
    }

    fn set_data_direction(&mut self, dir: Direction) {
        match dir {
            Direction::Output => self.dd.to_output(),
            Direction::Input => {
                // Edge detection armed here so the ready handshake can
                // catch the target's release of the line
                let mut cfg = Config::default();
                cfg.with_line(self.dd.offset)
                    .as_input()
                    .with_edge_detection(EdgeDetection::FallingEdge);
                self.dd.reconfigure(&cfg);
            }
        }
    }

    fn wait_data_falling(&mut self, timeout: Duration) -> bool {
        let Some(request) = &self.dd.request else {
            return false;
        };
        match request.wait_edge_event(timeout) {
            Ok(true) => {
                // Drain the event so the next wait starts clean
                if let Err(e) = request.read_edge_event() {
                    log::warn!("failed to read edge event: {}", e);
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                log::error!("edge wait on dd line failed: {}", e);
                false
            }
        }
    }

    fn delay(&mut self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}
