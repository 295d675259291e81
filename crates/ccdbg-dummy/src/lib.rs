//! ccdbg-dummy - Emulated debug target for testing
//!
//! This crate provides a [`DummyTarget`] that emulates a ChipCon-style
//! debug target behind the [`LineController`] trait. It's useful for
//! testing and development without real hardware: it records every line
//! transition the driver makes, shifts in command bytes on clock edges,
//! decodes them against an instruction table and serves the response back
//! through the ready handshake, including the 8-pulse busy window a real
//! target holds after signalling ready.

use std::collections::VecDeque;
use std::time::Duration;

use ccdbg_core::instr::{Instr, InstructionSet};
use ccdbg_core::lines::{Direction, LineController};

/// Configuration for the emulated target
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// 16-bit chip ID returned by GET_CHIP_ID
    pub chip_id: u16,
    /// 16-bit program counter returned by GET_PC
    pub pc: u16,
    /// Debug status byte returned by READ_STATUS and CHIP_ERASE
    pub status: u8,
    /// Accumulator byte returned by HALT/RESUME/STEP/DEBUG_INSTR
    pub accumulator: u8,
    /// Debug configuration byte returned by RD_CONFIG
    pub debug_config: u8,
    /// When false, the target never signals ready and every read
    /// turnaround times out
    pub wired: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            chip_id: 0x2541,
            pc: 0,
            status: 0x22,
            accumulator: 0,
            debug_config: 0,
            wired: true,
        }
    }
}

/// A line transition or dwell observed by the emulated target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// All lines re-requested as outputs low
    Attach,
    /// All lines released to inputs
    Release,
    /// RST driven to the given level
    Reset(bool),
    /// DC driven to the given level
    Clock(bool),
    /// DD driven to the given level
    Data(bool),
    /// DD re-requested in the given direction
    DirChange(Direction),
    /// Bounded wait for the ready edge
    EdgeWait,
    /// Dwell for the given window
    Delay(Duration),
}

/// Emulated debug target
///
/// Implements [`LineController`] so a `Debugger` drives it exactly like
/// real lines. Delays are recorded, not slept.
pub struct DummyTarget {
    config: DummyConfig,
    instr: InstructionSet,
    events: Vec<Event>,
    dir: Direction,
    clock: bool,
    /// Level the driver drives on DD
    drive: bool,
    /// Level the target drives on DD while the driver listens
    data_out: bool,
    reset_low: bool,
    shift: u8,
    nbits: u8,
    cmd: Vec<u8>,
    read_bits: VecDeque<bool>,
    commands: Vec<Vec<u8>>,
    written_bits: Vec<bool>,
    dir_changes: u32,
}

impl DummyTarget {
    /// Create an emulated target with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            instr: InstructionSet::default(),
            events: Vec::new(),
            dir: Direction::Input,
            clock: false,
            drive: false,
            data_out: true,
            reset_low: false,
            shift: 0,
            nbits: 0,
            cmd: Vec::new(),
            read_bits: VecDeque::new(),
            commands: Vec::new(),
            written_bits: Vec::new(),
            dir_changes: 0,
        }
    }

    /// Create an emulated target with the default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// All line events seen so far
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Forget recorded events and written bits (state machine keeps going)
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.written_bits.clear();
    }

    /// Complete command byte sequences decoded so far
    pub fn commands(&self) -> &[Vec<u8>] {
        &self.commands
    }

    /// DD levels sampled at each rising clock edge while the driver was
    /// writing, in wire order
    pub fn written_bits(&self) -> &[bool] {
        &self.written_bits
    }

    /// Number of DD direction re-requests issued by the driver
    pub fn reconfigure_count(&self) -> u32 {
        self.dir_changes
    }

    /// Queue raw response bytes, preceded by the 8-bit busy window, as if
    /// the target had finished an instruction
    pub fn queue_response(&mut self, bytes: &[u8]) {
        for _ in 0..8 {
            self.read_bits.push_back(false);
        }
        for &byte in bytes {
            for i in (0..8).rev() {
                self.read_bits.push_back((byte >> i) & 1 != 0);
            }
        }
    }

    /// Extra bytes that follow `op` before the instruction is complete
    fn payload_len(&self, op: u8) -> usize {
        if op == self.instr.get(Instr::WrConfig) || op == self.instr.get(Instr::DebugInstr1) {
            1
        } else if op == self.instr.get(Instr::DebugInstr2) {
            2
        } else if op == self.instr.get(Instr::DebugInstr3) {
            3
        } else {
            0
        }
    }

    fn try_decode(&mut self) {
        let Some(&op) = self.cmd.first() else {
            return;
        };
        if self.cmd.len() < 1 + self.payload_len(op) {
            return;
        }

        let cmd = std::mem::take(&mut self.cmd);
        log::trace!("dummy: decoded command {:02x?}", cmd);

        if op == self.instr.get(Instr::GetChipId) {
            let id = self.config.chip_id;
            self.queue_response(&[(id >> 8) as u8, id as u8]);
        } else if op == self.instr.get(Instr::GetPc) {
            let pc = self.config.pc;
            self.queue_response(&[(pc >> 8) as u8, pc as u8]);
        } else if op == self.instr.get(Instr::ReadStatus) || op == self.instr.get(Instr::ChipErase)
        {
            let status = self.config.status;
            self.queue_response(&[status]);
        } else if op == self.instr.get(Instr::RdConfig) {
            let config = self.config.debug_config;
            self.queue_response(&[config]);
        } else if op == self.instr.get(Instr::WrConfig) {
            // Config readback echoes what was written
            let echo = cmd[1];
            self.config.debug_config = echo;
            self.queue_response(&[echo]);
        } else {
            let acc = self.config.accumulator;
            self.queue_response(&[acc]);
        }

        self.commands.push(cmd);
    }

    fn rising_edge(&mut self) {
        // Clock pulses with RST asserted are the entry handshake, not data
        if self.reset_low {
            return;
        }
        match self.dir {
            Direction::Output => {
                // Driver is writing: latch the driven bit
                self.written_bits.push(self.drive);
                self.shift = self.shift << 1 | self.drive as u8;
                self.nbits += 1;
                if self.nbits == 8 {
                    self.nbits = 0;
                    let byte = self.shift;
                    self.cmd.push(byte);
                    self.try_decode();
                }
            }
            Direction::Input => {
                // Driver is clocking bits out of us
                self.data_out = self.read_bits.pop_front().unwrap_or(false);
            }
        }
    }
}

impl LineController for DummyTarget {
    fn attach(&mut self) {
        self.events.push(Event::Attach);
        self.dir = Direction::Output;
        self.clock = false;
        self.drive = false;
        // Activation drives all three lines low, RST included
        self.reset_low = true;
        self.nbits = 0;
    }

    fn release(&mut self) {
        self.events.push(Event::Release);
        self.dir = Direction::Input;
    }

    fn set_reset(&mut self, high: bool) {
        self.events.push(Event::Reset(high));
        self.reset_low = !high;
        // Either edge of RST realigns the bit stream
        self.shift = 0;
        self.nbits = 0;
        self.cmd.clear();
    }

    fn set_clock(&mut self, high: bool) {
        self.events.push(Event::Clock(high));
        let rising = high && !self.clock;
        self.clock = high;
        if rising {
            self.rising_edge();
        }
    }

    fn set_data(&mut self, high: bool) {
        self.events.push(Event::Data(high));
        self.drive = high;
    }

    fn data(&mut self) -> bool {
        match self.dir {
            Direction::Input => self.data_out,
            Direction::Output => self.drive,
        }
    }

    fn set_data_direction(&mut self, dir: Direction) {
        self.events.push(Event::DirChange(dir));
        self.dir_changes += 1;
        self.dir = dir;
        self.nbits = 0;
    }

    fn wait_data_falling(&mut self, _timeout: Duration) -> bool {
        self.events.push(Event::EdgeWait);
        self.config.wired && !self.read_bits.is_empty()
    }

    fn delay(&mut self, d: Duration) {
        self.events.push(Event::Delay(d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach_and_run(target: &mut DummyTarget) {
        target.attach();
        target.set_reset(true);
    }

    fn clock_byte_out(target: &mut DummyTarget, byte: u8) {
        for i in (0..8).rev() {
            target.set_data((byte >> i) & 1 != 0);
            target.set_clock(true);
            target.set_clock(false);
        }
    }

    #[test]
    fn assembles_bytes_msb_first() {
        let mut target = DummyTarget::new_default();
        attach_and_run(&mut target);
        clock_byte_out(&mut target, 0x30); // READ_STATUS
        assert_eq!(target.commands(), &[vec![0x30]]);
    }

    #[test]
    fn multi_byte_command_waits_for_payload() {
        let mut target = DummyTarget::new_default();
        attach_and_run(&mut target);
        clock_byte_out(&mut target, 0x53); // DEBUG_INSTR + 3 bytes
        assert!(target.commands().is_empty());
        clock_byte_out(&mut target, 0x02);
        clock_byte_out(&mut target, 0x12);
        clock_byte_out(&mut target, 0x34);
        assert_eq!(target.commands(), &[vec![0x53, 0x02, 0x12, 0x34]]);
    }

    #[test]
    fn ready_only_when_response_queued() {
        let mut target = DummyTarget::new_default();
        attach_and_run(&mut target);
        assert!(!target.wait_data_falling(Duration::from_millis(1)));
        clock_byte_out(&mut target, 0x30);
        target.set_data_direction(Direction::Input);
        assert!(target.wait_data_falling(Duration::from_millis(1)));
    }

    #[test]
    fn unwired_target_never_ready() {
        let mut target = DummyTarget::new(DummyConfig {
            wired: false,
            ..Default::default()
        });
        attach_and_run(&mut target);
        clock_byte_out(&mut target, 0x30);
        assert!(!target.wait_data_falling(Duration::from_millis(1)));
    }
}
