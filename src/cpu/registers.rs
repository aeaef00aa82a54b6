//! LS-8 CPU registers.
//!
//! The machine has 8 general-purpose 8-bit registers plus two control
//! registers kept outside the register file:
//! - R0-R4: general purpose
//! - R5/R6: reserved for an interrupt mask/status that is never
//!   implemented; no instruction treats them specially
//! - R7: stack pointer (SP), starts at the top of memory
//! - PC: program counter
//! - FL: comparison flags, 0b00000LGE

use crate::cpu::alu;
use crate::cpu::memory::MEMORY_SIZE;
use serde::{Serialize, Deserialize};

/// Number of general-purpose registers.
pub const NUM_REGISTERS: usize = 8;

/// Register index of the stack pointer.
pub const SP: u8 = 7;

/// Register index reserved as the interrupt mask (unused).
pub const IM: u8 = 5;

/// Register index reserved as the interrupt status (unused).
pub const IS: u8 = 6;

/// The comparison flags register.
///
/// Only the low three bits are ever set, and only by `CMP`:
/// bit 0 = Equal, bit 1 = Greater-than, bit 2 = Less-than.
/// After a comparison exactly one of the three is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags(u8);

impl Flags {
    pub const EQUAL: u8 = 0b001;
    pub const GREATER: u8 = 0b010;
    pub const LESS: u8 = 0b100;

    /// Create a cleared flags register.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Raw register value.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Is the Equal bit set?
    #[inline]
    pub const fn equal(self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    /// Is the Greater-than bit set?
    #[inline]
    pub const fn greater(self) -> bool {
        self.0 & Self::GREATER != 0
    }

    /// Is the Less-than bit set?
    #[inline]
    pub const fn less(self) -> bool {
        self.0 & Self::LESS != 0
    }

    /// Record an ALU comparison: clear the register, then set exactly
    /// one of Equal/Greater/Less.
    pub fn set_compare(&mut self, a: u8, b: u8) {
        use std::cmp::Ordering;
        self.0 = match alu::compare(a, b) {
            Ordering::Equal => Self::EQUAL,
            Ordering::Greater => Self::GREATER,
            Ordering::Less => Self::LESS,
        };
    }
}

impl std::fmt::Display for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.less() { 'L' } else { '-' },
            if self.greater() { 'G' } else { '-' },
            if self.equal() { 'E' } else { '-' },
        )
    }
}

/// The LS-8 register file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registers {
    /// General-purpose registers R0-R7.
    file: [u8; NUM_REGISTERS],

    /// Program counter.
    pub pc: u8,

    /// Comparison flags.
    pub fl: Flags,
}

impl Registers {
    /// Create a new register file: everything zero except the stack
    /// pointer, which starts at the top of memory.
    pub fn new() -> Self {
        let mut file = [0; NUM_REGISTERS];
        file[SP as usize] = MEMORY_SIZE as u8;
        Self {
            file,
            pc: 0,
            fl: Flags::new(),
        }
    }

    /// Reset all registers to their initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read general-purpose register `index` (masked to 0-7).
    #[inline]
    pub fn get(&self, index: u8) -> u8 {
        self.file[(index & 0b111) as usize]
    }

    /// Write general-purpose register `index` (masked to 0-7).
    #[inline]
    pub fn set(&mut self, index: u8, value: u8) {
        self.file[(index & 0b111) as usize] = value;
    }

    /// Current stack pointer value.
    #[inline]
    pub fn sp(&self) -> u8 {
        self.file[SP as usize]
    }

    /// Set the stack pointer.
    #[inline]
    pub fn set_sp(&mut self, value: u8) {
        self.file[SP as usize] = value;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let regs = Registers::new();

        for index in 0..SP {
            assert_eq!(regs.get(index), 0);
        }
        assert_eq!(regs.sp(), MEMORY_SIZE as u8);
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.fl.bits(), 0);
    }

    #[test]
    fn test_register_index_masked() {
        let mut regs = Registers::new();

        // Indices above 7 wrap into the file instead of panicking
        regs.set(8, 11);
        assert_eq!(regs.get(0), 11);
    }

    #[test]
    fn test_sp_is_r7() {
        let mut regs = Registers::new();

        regs.set(SP, 42);
        assert_eq!(regs.sp(), 42);
    }

    #[test]
    fn test_compare_sets_exactly_one_flag() {
        let mut fl = Flags::new();

        fl.set_compare(5, 5);
        assert_eq!(fl.bits(), Flags::EQUAL);

        fl.set_compare(7, 3);
        assert_eq!(fl.bits(), Flags::GREATER);

        fl.set_compare(3, 7);
        assert_eq!(fl.bits(), Flags::LESS);
    }

    #[test]
    fn test_compare_clears_previous_result() {
        let mut fl = Flags::new();

        fl.set_compare(1, 1);
        fl.set_compare(2, 1);

        assert!(fl.greater());
        assert!(!fl.equal());
        assert!(!fl.less());
    }

    #[test]
    fn test_flags_display() {
        let mut fl = Flags::new();
        assert_eq!(fl.to_string(), "---");

        fl.set_compare(0, 9);
        assert_eq!(fl.to_string(), "L--");
    }
}
