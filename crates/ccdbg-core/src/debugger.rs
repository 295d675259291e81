//! Debug session driver
//!
//! [`Debugger`] owns the line controller and all session state: the active
//! flag, the debug-mode flag, the DD direction and the instruction table.
//! It is a single-owner handle - the protocol has no notion of concurrent
//! callers, so every operation takes `&mut self` and runs to completion.
//!
//! The session moves through three states: inactive, active (lines driven,
//! no debug session) and debugging. Illegal transitions are reported
//! through [`Error`] values, never by aborting; the same error is mirrored
//! into a last-error slot for callers that prefer flag-style checking.

use core::time::Duration;

use crate::error::{Error, Result};
use crate::instr::{Instr, InstructionSet, TABLE_LEN};
use crate::lines::{Direction, LineController};
use crate::timing;

/// A debug session over three GPIO lines.
///
/// Created active: the constructor drives all three lines low, ready for
/// [`enter`](Self::enter). Dropping the handle does not release the lines;
/// call [`set_active`](Self::set_active)`(false)` to let the target run.
pub struct Debugger<C: LineController> {
    lines: C,
    active: bool,
    in_debug_mode: bool,
    data_dir: Direction,
    last_error: Option<Error>,
    instr: InstructionSet,
}

impl<C: LineController> Debugger<C> {
    /// Take ownership of the lines and start an active session.
    pub fn new(mut lines: C) -> Self {
        lines.attach();
        Self {
            lines,
            active: true,
            in_debug_mode: false,
            data_dir: Direction::Output,
            last_error: None,
            instr: InstructionSet::default(),
        }
    }

    /// Whether the session currently drives the lines.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the target is in debug mode.
    pub fn in_debug_mode(&self) -> bool {
        self.in_debug_mode
    }

    /// Error recorded by the most recent failed operation.
    ///
    /// Overwritten on every precondition failure and cleared by
    /// [`set_active`](Self::set_active) and [`enter`](Self::enter); kept
    /// for callers that poll a flag instead of checking each `Result`.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    /// The line controller, for inspection.
    pub fn controller(&self) -> &C {
        &self.lines
    }

    /// Mutable access to the line controller.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.lines
    }

    /// Consume the session and hand the lines back.
    pub fn into_controller(self) -> C {
        self.lines
    }

    /// Activate or deactivate the session.
    ///
    /// Activating re-requests all three lines as outputs driven low.
    /// Deactivating first exits debug mode if a session is open, then
    /// releases the lines to inputs so the target runs free. Either way
    /// the last-error slot is cleared; a no-op if the state is unchanged.
    pub fn set_active(&mut self, on: bool) {
        if on == self.active {
            self.last_error = None;
            return;
        }

        if on {
            self.active = true;
            self.lines.attach();
            self.data_dir = Direction::Output;
        } else {
            // Leave debug mode while the lines are still held
            if self.in_debug_mode {
                let _ = self.exit();
            }
            self.active = false;
            self.lines.release();
            self.data_dir = Direction::Input;
        }
        self.last_error = None;
    }

    fn guard_active(&mut self) -> Result<()> {
        if !self.active {
            self.last_error = Some(Error::NotActive);
            return Err(Error::NotActive);
        }
        Ok(())
    }

    fn guard_debugging(&mut self) -> Result<()> {
        self.guard_active()?;
        if !self.in_debug_mode {
            self.last_error = Some(Error::NotDebugging);
            return Err(Error::NotDebugging);
        }
        Ok(())
    }

    /// Idempotent DD direction switch.
    ///
    /// The line is held low around the re-request so the bus never sees a
    /// spurious high glitch.
    fn set_data_dir(&mut self, dir: Direction) {
        if self.data_dir == dir {
            return;
        }
        self.data_dir = dir;

        self.lines.set_data(false);
        self.lines.set_data_direction(dir);
        self.lines.set_data(false);
    }

    /// Enter debug mode.
    ///
    /// Holds RST low, pulses DC twice (the target latches the debug
    /// request on the second falling edge), then releases RST. The pulse
    /// train and its dwells are the protocol's electrical handshake; see
    /// the [`timing`] module.
    pub fn enter(&mut self) -> Result<()> {
        self.guard_active()?;
        self.last_error = None;

        log::debug!("entering debug mode");

        self.lines.set_reset(false);
        self.lines.set_clock(true);
        self.lines.delay(timing::ENTER_PULSE_LONG);
        self.lines.set_clock(false);
        self.lines.delay(timing::ENTER_PULSE_SHORT);
        self.lines.set_clock(true);
        self.lines.delay(timing::ENTER_PULSE_SHORT);
        self.lines.set_clock(false);
        self.lines.delay(timing::ENTER_RESET_HOLD);
        self.lines.set_reset(true);
        self.lines.delay(timing::ENTER_RESET_HOLD);

        self.in_debug_mode = true;
        Ok(())
    }

    /// Exit debug mode by resuming the target.
    ///
    /// Sends RESUME, consumes the status byte of the read turnaround and
    /// clears the debug-mode flag. Returns the status byte.
    pub fn exit(&mut self) -> Result<u8> {
        self.guard_debugging()?;

        let resume = self.instr.get(Instr::Resume);
        self.write_byte(resume)?;
        self.switch_read(timing::READY_TIMEOUT)?;
        let status = self.read_byte()?;
        self.switch_write();

        self.in_debug_mode = false;
        log::debug!("left debug mode, status {:#04x}", status);
        Ok(status)
    }

    /// Shift one byte out on DD, most-significant bit first.
    ///
    /// Framing is purely positional - there is no end-of-byte delimiter,
    /// so the caller must send exactly the bytes the current instruction
    /// expects.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.guard_debugging()?;

        self.set_data_dir(Direction::Output);

        let mut data = byte;
        for _ in 0..8 {
            self.lines.set_data(data & 0x80 != 0);
            self.lines.set_clock(true);
            data <<= 1;
            self.lines.delay(timing::WRITE_BIT_HOLD);
            self.lines.set_clock(false);
            self.lines.delay(timing::WRITE_BIT_HOLD);
        }

        Ok(())
    }

    /// Turn the bus around and wait for the target's ready handshake.
    ///
    /// The target drives DD low while it computes the result and releases
    /// it when done; the release is observed as a falling edge once the
    /// driver stops driving the line. On the edge, eight clock pulses
    /// consume the target's busy window. A timeout means the target is
    /// not wired (or hung): the debug session is abandoned and must be
    /// re-entered.
    pub fn switch_read(&mut self, max_wait: Duration) -> Result<()> {
        self.guard_debugging()?;

        self.set_data_dir(Direction::Input);
        self.lines.delay(timing::DIR_CHANGE_SETTLE);

        if !self.lines.wait_data_falling(max_wait) {
            log::warn!("ready handshake timed out, abandoning debug session");
            self.last_error = Some(Error::NotWired);
            self.in_debug_mode = false;
            return Err(Error::NotWired);
        }

        for _ in 0..8 {
            self.lines.set_clock(true);
            self.lines.delay(timing::READ_BIT_HOLD);
            self.lines.set_clock(false);
            self.lines.delay(timing::READ_BIT_HOLD);
        }
        self.lines.delay(timing::SAMPLE_SETTLE);

        Ok(())
    }

    /// Unconditionally force DD back to output.
    ///
    /// Called after every read phase to leave the bus in a known state for
    /// the next write.
    pub fn switch_write(&mut self) {
        self.set_data_dir(Direction::Output);
    }

    /// Shift one byte in from DD, most-significant bit first.
    ///
    /// Deliberately guards only on the active flag, not on debug mode:
    /// raw reads outside a debug session return whatever the lines carry
    /// and stay usable for line-level diagnostics.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.guard_active()?;

        self.set_data_dir(Direction::Input);

        let mut data = 0u8;
        for _ in 0..8 {
            self.lines.set_clock(true);
            self.lines.delay(timing::READ_BIT_HOLD);
            data <<= 1;
            if self.lines.data() {
                data |= 0x01;
            }
            self.lines.set_clock(false);
            self.lines.delay(timing::READ_BIT_HOLD);
        }

        Ok(data)
    }

    /// One write-then-read transaction: send `payload`, wait for ready,
    /// read a single result byte and turn the bus back around.
    fn transact(&mut self, payload: &[u8]) -> Result<u8> {
        self.guard_debugging()?;

        for &byte in payload {
            self.write_byte(byte)?;
        }
        self.switch_read(timing::READY_TIMEOUT)?;
        let ans = self.read_byte()?;
        self.switch_write();

        Ok(ans)
    }

    /// Like [`transact`](Self::transact) but reads a 16-bit result,
    /// high byte first.
    fn transact_u16(&mut self, opcode: u8) -> Result<u16> {
        self.guard_debugging()?;

        self.write_byte(opcode)?;
        self.switch_read(timing::READY_TIMEOUT)?;
        let high = self.read_byte()?;
        let low = self.read_byte()?;
        self.switch_write();

        Ok(u16::from(high) << 8 | u16::from(low))
    }

    /// Halt the CPU. Returns the accumulator.
    pub fn halt(&mut self) -> Result<u8> {
        let op = self.instr.get(Instr::Halt);
        self.transact(&[op])
    }

    /// Resume execution. Returns the accumulator.
    ///
    /// Unlike [`exit`](Self::exit) this keeps the debug session open.
    pub fn resume(&mut self) -> Result<u8> {
        let op = self.instr.get(Instr::Resume);
        self.transact(&[op])
    }

    /// Single-step one instruction. Returns the accumulator.
    pub fn step(&mut self) -> Result<u8> {
        let op = self.instr.get(Instr::StepInstr);
        self.transact(&[op])
    }

    /// Read the debug status byte.
    pub fn read_status(&mut self) -> Result<u8> {
        let op = self.instr.get(Instr::ReadStatus);
        self.transact(&[op])
    }

    /// Read the debug configuration byte.
    pub fn read_config(&mut self) -> Result<u8> {
        let op = self.instr.get(Instr::RdConfig);
        self.transact(&[op])
    }

    /// Write the debug configuration byte. Returns the config readback.
    pub fn write_config(&mut self, config: u8) -> Result<u8> {
        let op = self.instr.get(Instr::WrConfig);
        self.transact(&[op, config])
    }

    /// Execute a single-byte instruction on the target. Returns the
    /// accumulator.
    pub fn exec(&mut self, oc0: u8) -> Result<u8> {
        let op = self.instr.get(Instr::DebugInstr1);
        self.transact(&[op, oc0])
    }

    /// Execute a two-byte instruction. Returns the accumulator.
    pub fn exec2(&mut self, oc0: u8, oc1: u8) -> Result<u8> {
        let op = self.instr.get(Instr::DebugInstr2);
        self.transact(&[op, oc0, oc1])
    }

    /// Execute a three-byte instruction. Returns the accumulator.
    pub fn exec3(&mut self, oc0: u8, oc1: u8, oc2: u8) -> Result<u8> {
        let op = self.instr.get(Instr::DebugInstr3);
        self.transact(&[op, oc0, oc1, oc2])
    }

    /// Execute an instruction taking a 16-bit immediate, sent big-endian.
    /// Returns the accumulator.
    pub fn exec_imm(&mut self, oc0: u8, imm: u16) -> Result<u8> {
        let op = self.instr.get(Instr::DebugInstr3);
        self.transact(&[op, oc0, (imm >> 8) as u8, imm as u8])
    }

    /// Read the 16-bit chip ID.
    pub fn chip_id(&mut self) -> Result<u16> {
        let op = self.instr.get(Instr::GetChipId);
        self.transact_u16(op)
    }

    /// Read the 16-bit program counter.
    pub fn pc(&mut self) -> Result<u16> {
        let op = self.instr.get(Instr::GetPc);
        self.transact_u16(op)
    }

    /// Mass-erase flash, configuration and lock bits. Returns the debug
    /// status byte.
    pub fn chip_erase(&mut self) -> Result<u8> {
        let op = self.instr.get(Instr::ChipErase);
        self.transact(&[op])
    }

    /// The loaded instruction table.
    pub fn instruction_set(&self) -> &InstructionSet {
        &self.instr
    }

    /// Version tag of the loaded instruction table.
    pub fn instruction_table_version(&self) -> u8 {
        self.instr.version()
    }

    /// Replace the instruction table to target a protocol-compatible chip
    /// variant. Returns the new table's version tag.
    pub fn update_instruction_table(&mut self, table: [u8; TABLE_LEN]) -> u8 {
        let version = self.instr.replace(table);
        log::info!("instruction table replaced, version {}", version);
        version
    }
}
