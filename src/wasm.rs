//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core
//! emulator.

use wasm_bindgen::prelude::*;
use crate::Cpu;
use crate::asm::assembler::assemble;
use crate::asm::disasm::{disassemble, disassemble_at};
use crate::asm::image::parse_image;
use crate::cpu::decode::encode;
use crate::cpu::MEMORY_SIZE;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    program: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            program: Vec::new(),
        }
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let bytes = assemble(source).map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(bytes)
    }

    /// Load a program from image text (binary literals, one per line).
    #[wasm_bindgen]
    pub fn load_image(&mut self, source: &str) -> Result<usize, JsError> {
        let image = parse_image(source).map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(image.bytes)
    }

    fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<usize, JsError> {
        let len = bytes.len();
        self.program = bytes;
        self.cpu = Cpu::new();
        self.cpu
            .load_program(&self.program)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(len)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new("CPU is stopped"));
        }

        let instr = self
            .cpu
            .step()
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        let (text, _) = disassemble_at(&encode(&instr), 0);
        Ok(text)
    }

    /// Run until halt or max cycles.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> u64 {
        let _ = self.cpu.run_limited(max_cycles as u64);
        self.cpu.cycles
    }

    /// Reset CPU to initial state with the loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        if !self.program.is_empty() {
            let _ = self.cpu.load_program(&self.program);
        }
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> u8 {
        self.cpu.regs.pc
    }

    /// Get stack pointer.
    #[wasm_bindgen]
    pub fn sp(&self) -> u8 {
        self.cpu.regs.sp()
    }

    /// Get a general-purpose register (index masked to 0-7).
    #[wasm_bindgen]
    pub fn register(&self, index: u8) -> u8 {
        self.cpu.regs.get(index)
    }

    /// Get the flags register rendered as "LGE" markers.
    #[wasm_bindgen]
    pub fn flags(&self) -> String {
        self.cpu.regs.fl.to_string()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Drain the lines printed by the program since the last call.
    #[wasm_bindgen]
    pub fn take_output(&mut self) -> Vec<String> {
        self.cpu.take_output()
    }

    /// Get memory cell value at an address.
    #[wasm_bindgen]
    pub fn memory_at(&self, addr: usize) -> u8 {
        if addr < MEMORY_SIZE {
            self.cpu.mem.get(addr)
        } else {
            0
        }
    }

    /// Get all memory as an array of values.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> Vec<u8> {
        (0..MEMORY_SIZE).map(|addr| self.cpu.mem.get(addr)).collect()
    }

    /// Get registers as a JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu.regs).map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the image byte count.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<usize, JsError> {
    let bytes = assemble(source).map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(bytes.len())
}

/// Disassemble image text to a readable listing.
#[wasm_bindgen]
pub fn wasm_disassemble(source: &str) -> Result<String, JsError> {
    let image = parse_image(source).map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(disassemble(&image.bytes))
}
