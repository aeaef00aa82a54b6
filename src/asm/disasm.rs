//! Disassembler for LS-8 programs.
//!
//! Converts image bytes back to readable assembly. Instructions are
//! variable length, so the listing walks the bytes from address 0.

use crate::cpu::decode::{decode, Instruction, Opcode};

/// Disassemble the instruction starting at `addr`.
///
/// Returns the rendered text and the number of bytes consumed. Bytes
/// that do not decode render as data.
pub fn disassemble_at(bytes: &[u8], addr: usize) -> (String, usize) {
    let Some(&raw) = bytes.get(addr) else {
        return ("DAT 0b00000000".to_string(), 1);
    };

    if Opcode::from_byte(raw).is_none() {
        return (format!("DAT 0b{:08b}", raw), 1);
    }

    let a = bytes.get(addr + 1).copied().unwrap_or(0);
    let b = bytes.get(addr + 2).copied().unwrap_or(0);

    match decode(raw, a, b) {
        Ok(instr) => (format_instruction(&instr), instr.size() as usize),
        Err(_) => (format!("DAT 0b{:08b}", raw), 1),
    }
}

/// Disassemble a full image to a listing of (address, text) rows.
pub fn disassemble_listing(bytes: &[u8]) -> Vec<(usize, String)> {
    let mut rows = Vec::new();
    let mut addr = 0;

    while addr < bytes.len() {
        let (text, size) = disassemble_at(bytes, addr);
        rows.push((addr, text));
        addr += size;
    }

    rows
}

/// Disassemble a full image to text.
pub fn disassemble(bytes: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 disassembly\n");
    output.push_str("; ----------------\n\n");

    for (addr, text) in disassemble_listing(bytes) {
        output.push_str(&format!("{:02}: {}\n", addr, text));
    }

    output
}

/// Format a decoded instruction as assembly text.
fn format_instruction(instr: &Instruction) -> String {
    match *instr {
        Instruction::Hello => "HELLO".to_string(),
        Instruction::Ret => "RET".to_string(),
        Instruction::Hlt => "HLT".to_string(),

        Instruction::Ldi { reg, value } => format!("LDI R{},{}", reg, value),
        Instruction::Addi { reg, value } => format!("ADDI R{},{}", reg, value),

        Instruction::Prn { reg } => format!("PRN R{}", reg),
        Instruction::Not { reg } => format!("NOT R{}", reg),
        Instruction::Push { reg } => format!("PUSH R{}", reg),
        Instruction::Pop { reg } => format!("POP R{}", reg),
        Instruction::Call { reg } => format!("CALL R{}", reg),
        Instruction::Jmp { reg } => format!("JMP R{}", reg),
        Instruction::Jeq { reg } => format!("JEQ R{}", reg),
        Instruction::Jne { reg } => format!("JNE R{}", reg),

        Instruction::Add { a, b } => format!("ADD R{},R{}", a, b),
        Instruction::Mul { a, b } => format!("MUL R{},R{}", a, b),
        Instruction::And { a, b } => format!("AND R{},R{}", a, b),
        Instruction::Or { a, b } => format!("OR R{},R{}", a, b),
        Instruction::Xor { a, b } => format!("XOR R{},R{}", a, b),
        Instruction::Shl { a, b } => format!("SHL R{},R{}", a, b),
        Instruction::Shr { a, b } => format!("SHR R{},R{}", a, b),
        Instruction::Mod { a, b } => format!("MOD R{},R{}", a, b),
        Instruction::Cmp { a, b } => format!("CMP R{},R{}", a, b),
    }
}
