//! CPU emulation for the LS-8 machine.
//!
//! This module implements the complete architecture:
//! - 100 byte-wide memory cells, stack at the top
//! - 8 general-purpose registers (R7 is the stack pointer)
//! - PC and comparison-flags control registers
//! - 22-instruction set with byte-encoded operand counts

pub mod memory;
pub mod registers;
pub mod alu;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::{Registers, Flags};
pub use decode::{Instruction, Opcode, DecodeError};
pub use execute::{Cpu, CpuError, CpuState};
