//! LS-8 memory subsystem.
//!
//! A flat array of 8-bit cells. Programs load at address 0 and the
//! stack grows downward from the top.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells in the machine.
pub const MEMORY_SIZE: usize = 100;

/// LS-8 memory: a flat array of byte cells.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read the cell at `addr`.
    pub fn read(&self, addr: u8) -> Result<u8, MemoryError> {
        self.cells
            .get(addr as usize)
            .copied()
            .ok_or(MemoryError::AddressOutOfRange(addr))
    }

    /// Write `value` to the cell at `addr`.
    pub fn write(&mut self, addr: u8, value: u8) -> Result<(), MemoryError> {
        let cell = self
            .cells
            .get_mut(addr as usize)
            .ok_or(MemoryError::AddressOutOfRange(addr))?;
        *cell = value;
        Ok(())
    }

    /// Read by index, for display code that iterates over known-valid
    /// indices.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.cells[index]
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = 0;
        }
    }

    /// Load a program into memory starting at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        if program.len() > MEMORY_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available: MEMORY_SIZE,
            });
        }

        self.cells[..program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Dump a range of memory (for debugging).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, u8)> {
        let end = (start + count).min(MEMORY_SIZE);
        (start..end).map(|i| (i, self.cells[i])).collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory address {0} out of range (0-{})", MEMORY_SIZE - 1)]
    AddressOutOfRange(u8),

    #[error("program size {size} exceeds memory capacity {available}")]
    ProgramTooLarge { size: usize, available: usize },
}
