//! Debug instruction table
//!
//! Every logical debug operation is mapped to its wire opcode through a
//! 16-entry table. The table is replaceable wholesale at runtime, which is
//! how protocol-compatible chip variants with different opcodes are
//! supported without touching any protocol logic. Slot 0 is not an opcode
//! but a version tag identifying the loaded table.

/// Number of slots in the instruction table. Always exactly 16; unused
/// slots are carried as opaque bytes.
pub const TABLE_LEN: usize = 16;

/// Symbolic slots of the instruction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Instr {
    /// Table version tag (not an opcode)
    Version = 0,
    /// Halt the CPU
    Halt = 1,
    /// Resume execution
    Resume = 2,
    /// Read the debug configuration byte
    RdConfig = 3,
    /// Write the debug configuration byte
    WrConfig = 4,
    /// Execute an instruction, 1 opcode byte follows
    DebugInstr1 = 5,
    /// Execute an instruction, 2 opcode bytes follow
    DebugInstr2 = 6,
    /// Execute an instruction, 3 opcode bytes follow
    DebugInstr3 = 7,
    /// Read the 16-bit chip ID
    GetChipId = 8,
    /// Read the 16-bit program counter
    GetPc = 9,
    /// Read the debug status byte
    ReadStatus = 10,
    /// Single-step one instruction
    StepInstr = 11,
    /// Mass-erase flash, configuration and lock bits
    ChipErase = 12,
    /// Set a hardware breakpoint (reserved, unused by this driver)
    SetHwBrkpnt = 13,
    /// Read the breakpoint mask (reserved)
    GetBm = 14,
    /// Burst write (reserved)
    BurstWrite = 15,
}

/// Replaceable mapping from logical debug operation to wire opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSet([u8; TABLE_LEN]);

impl InstructionSet {
    /// The CC254x instruction set, the default for this family.
    pub const CC254X: InstructionSet = InstructionSet([
        1,    // version
        0x40, // HALT
        0x48, // RESUME
        0x20, // RD_CONFIG
        0x18, // WR_CONFIG
        0x51, // DEBUG_INSTR + 1 byte
        0x52, // DEBUG_INSTR + 2 bytes
        0x53, // DEBUG_INSTR + 3 bytes
        0x68, // GET_CHIP_ID
        0x28, // GET_PC
        0x30, // READ_STATUS
        0x58, // STEP_INSTR
        0x10, // CHIP_ERASE
        0x00, 0x00, 0x00,
    ]);

    /// Wire opcode stored in the given slot.
    pub fn get(&self, slot: Instr) -> u8 {
        self.0[slot as usize]
    }

    /// Version tag of the loaded table (slot 0).
    pub fn version(&self) -> u8 {
        self.0[Instr::Version as usize]
    }

    /// Replace the whole table in one swap and return the new version tag.
    pub fn replace(&mut self, table: [u8; TABLE_LEN]) -> u8 {
        self.0 = table;
        self.version()
    }

    /// The raw table bytes.
    pub fn as_bytes(&self) -> &[u8; TABLE_LEN] {
        &self.0
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        Self::CC254X
    }
}

impl From<[u8; TABLE_LEN]> for InstructionSet {
    fn from(table: [u8; TABLE_LEN]) -> Self {
        Self(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_cc254x() {
        let set = InstructionSet::default();
        assert_eq!(set.version(), 1);
        assert_eq!(set.get(Instr::Halt), 0x40);
        assert_eq!(set.get(Instr::Resume), 0x48);
        assert_eq!(set.get(Instr::GetChipId), 0x68);
        assert_eq!(set.get(Instr::ChipErase), 0x10);
    }

    #[test]
    fn replace_returns_new_version() {
        let mut set = InstructionSet::default();
        let mut table = *set.as_bytes();
        table[Instr::Version as usize] = 7;
        assert_eq!(set.replace(table), 7);
        assert_eq!(set.version(), 7);
        // Untouched slots keep their opcodes
        assert_eq!(set.get(Instr::Halt), 0x40);
    }

    #[test]
    fn reserved_slots_are_opaque() {
        let mut table = [0u8; TABLE_LEN];
        table[Instr::SetHwBrkpnt as usize] = 0xAB;
        let set = InstructionSet::from(table);
        assert_eq!(set.get(Instr::SetHwBrkpnt), 0xAB);
        assert_eq!(set.as_bytes().len(), TABLE_LEN);
    }
}
