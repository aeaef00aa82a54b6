//! Simple assembler for LS-8 programs.
//!
//! Syntax:
//! ```text
//! ; Comment
//! LABEL:          ; Define a label
//!     LDI R0,8    ; Load immediate into register
//!     LDI R1,LOOP ; Labels resolve to their byte address
//!     MUL R0,R1
//!     PRN R0
//!     JMP R1      ; Jumps go through registers
//!     HLT
//!     DAT 42      ; Define a data byte
//! ```

use crate::cpu::decode::Opcode;
use std::collections::HashMap;
use thiserror::Error;

/// Assemble source code to program bytes.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// The assembler state.
struct Assembler {
    /// Symbol table (label -> byte address).
    symbols: HashMap<String, u8>,
    /// Unresolved label operands (output_index, label, source_line).
    pending: Vec<(usize, String, usize)>,
    /// Output bytes.
    output: Vec<u8>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            pending: Vec::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        // Pass 1: collect labels and generate code
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        // Pass 2: resolve forward references
        self.resolve_references()?;

        Ok(self.output.clone())
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with(';') {
            return Ok(());
        }

        // Remove inline comments
        let line = if let Some(idx) = line.find(';') {
            line[..idx].trim()
        } else {
            line
        };

        if line.is_empty() {
            return Ok(());
        }

        // Check for label definition
        if let Some(colon_idx) = line.find(':') {
            let label = line[..colon_idx].trim().to_uppercase();
            if !label.is_empty() {
                if self.output.len() > u8::MAX as usize {
                    return Err(AssemblerError::ProgramTooLarge { line: line_num });
                }
                self.symbols.insert(label, self.output.len() as u8);
            }

            // Process rest of line if any
            let rest = line[colon_idx + 1..].trim();
            if !rest.is_empty() {
                return self.process_instruction(rest, line_num);
            }
            return Ok(());
        }

        self.process_instruction(line, line_num)
    }

    fn process_instruction(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, rest)) => (m.to_uppercase(), rest.trim()),
            None => (line.to_uppercase(), ""),
        };

        let operands: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::trim).collect()
        };

        // Data directive
        if mnemonic == "DAT" || mnemonic == "DATA" {
            if operands.len() != 1 {
                return Err(AssemblerError::SyntaxError {
                    line: line_num,
                    message: "DAT takes one value".into(),
                });
            }
            let value = self.parse_value(operands[0], line_num)?;
            self.output.push(value);
            return Ok(());
        }

        let opcode = Opcode::from_mnemonic(&mnemonic).ok_or_else(|| {
            AssemblerError::UnknownMnemonic {
                line: line_num,
                mnemonic: mnemonic.clone(),
            }
        })?;

        if operands.len() != opcode.operand_count() as usize {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!(
                    "{} takes {} operand(s), found {}",
                    opcode.mnemonic(),
                    opcode.operand_count(),
                    operands.len()
                ),
            });
        }

        self.output.push(opcode.to_byte());

        match opcode {
            // reg, immediate-or-label
            Opcode::Ldi | Opcode::Addi => {
                let reg = parse_register(operands[0], line_num)?;
                self.output.push(reg);
                let value = self.parse_value(operands[1], line_num)?;
                self.output.push(value);
            }

            // reg, reg
            Opcode::Add
            | Opcode::Mul
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Shl
            | Opcode::Shr
            | Opcode::Mod
            | Opcode::Cmp => {
                for operand in &operands {
                    let reg = parse_register(operand, line_num)?;
                    self.output.push(reg);
                }
            }

            // reg
            Opcode::Prn
            | Opcode::Not
            | Opcode::Push
            | Opcode::Pop
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::Jeq
            | Opcode::Jne => {
                let reg = parse_register(operands[0], line_num)?;
                self.output.push(reg);
            }

            // no operands
            Opcode::Hello | Opcode::Ret | Opcode::Hlt => {}
        }

        Ok(())
    }

    /// Parse an immediate value: decimal, `0x` hex, `0b` binary, or a
    /// label reference resolved in pass 2.
    fn parse_value(&mut self, operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
        let operand = operand.trim();

        let parsed = if let Some(hex) = operand.strip_prefix("0x").or_else(|| operand.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok()
        } else if let Some(bin) = operand.strip_prefix("0b").or_else(|| operand.strip_prefix("0B")) {
            i64::from_str_radix(bin, 2).ok()
        } else {
            operand.parse::<i64>().ok()
        };

        if let Some(value) = parsed {
            return u8::try_from(value).map_err(|_| AssemblerError::ValueOutOfRange {
                line: line_num,
                value,
            });
        }

        if !is_label(operand) {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!("`{}` is not a value or label", operand),
            });
        }

        // Label reference: emit a placeholder, patch in pass 2
        let out_idx = self.output.len();
        self.pending.push((out_idx, operand.to_uppercase(), line_num));
        Ok(0)
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for (out_idx, label, line_num) in &self.pending {
            let addr = self.symbols.get(label).ok_or_else(|| {
                AssemblerError::UndefinedLabel {
                    line: *line_num,
                    label: label.clone(),
                }
            })?;

            self.output[*out_idx] = *addr;
        }
        Ok(())
    }
}

/// Parse a register operand `R0`-`R7`.
fn parse_register(operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
    let operand = operand.trim();

    operand
        .strip_prefix('R')
        .or_else(|| operand.strip_prefix('r'))
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|&n| n < 8)
        .ok_or_else(|| AssemblerError::SyntaxError {
            line: line_num,
            message: format!("`{}` is not a register (expected R0-R7)", operand),
        })
}

fn is_label(token: &str) -> bool {
    !token.is_empty()
        && token.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value} (expected 0-255)")]
    ValueOutOfRange { line: usize, value: i64 },

    #[error("program exceeds addressable memory at line {line}")]
    ProgramTooLarge { line: usize },
}
