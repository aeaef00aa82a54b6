//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction
//! behaviors. Control flow is explicit: every instruction returns a
//! [`Flow`] value and only the cycle loop mutates the program counter.

use crate::cpu::{alu, Memory, Registers};
use crate::cpu::decode::{self, DecodeError, Instruction, Opcode};
use crate::cpu::memory::{MemoryError, MEMORY_SIZE};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Line printed by the greeting instruction.
pub const GREETING: &str = "Hello, LS-8!";

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT).
    Halted,
    /// CPU stopped on an unrecoverable fault.
    Error,
}

/// How the cycle loop updates the program counter after an instruction
/// executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Advance PC past the instruction and its operand bytes.
    Advance,
    /// The instruction chose the next PC.
    Jump(u8),
    /// Stop the machine.
    Halt,
}

/// The LS-8 machine: registers, memory, and the execution loop.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count (for profiling and cycle limits).
    pub cycles: u64,
    /// Lines emitted by PRN and the greeting instruction, drained by
    /// the frontend.
    pub output: Vec<String>,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed state (SP at the top of memory).
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Running,
            cycles: 0,
            output: Vec::new(),
            last_instr: None,
        }
    }

    /// Reset the CPU to initial state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.output.clear();
        self.last_instr = None;
    }

    /// Load a program into memory starting at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(program)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed. On a fault the state
    /// moves to [`CpuState::Error`] and the fault is returned.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        match self.cycle() {
            Ok(instr) => {
                self.cycles += 1;
                self.last_instr = Some(instr);
                Ok(instr)
            }
            Err(err) => {
                self.state = CpuState::Error;
                Err(err)
            }
        }
    }

    /// Run until halt or fault.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// One fetch-decode-execute cycle.
    fn cycle(&mut self) -> Result<Instruction, CpuError> {
        let instr = self.fetch()?;

        match self.execute(&instr)? {
            Flow::Advance => self.regs.pc += instr.size(),
            Flow::Jump(addr) => self.regs.pc = addr,
            Flow::Halt => self.state = CpuState::Halted,
        }

        Ok(instr)
    }

    /// Fetch the opcode at PC and exactly as many operand bytes as its
    /// encoding declares.
    fn fetch(&self) -> Result<Instruction, CpuError> {
        let pc = self.regs.pc;
        let raw = self.mem.read(pc)?;

        let opcode = Opcode::from_byte(raw)
            .ok_or(CpuError::UnknownOpcode { opcode: raw, addr: pc })?;

        let mut operands = [0u8; 2];
        for i in 0..opcode.operand_count() {
            operands[i as usize] = self.mem.read(pc + 1 + i)?;
        }

        decode::decode(raw, operands[0], operands[1]).map_err(|err| match err {
            DecodeError::UnknownOpcode(op) => CpuError::UnknownOpcode { opcode: op, addr: pc },
        })
    }

    /// Execute a decoded instruction and report the resulting control
    /// flow.
    fn execute(&mut self, instr: &Instruction) -> Result<Flow, CpuError> {
        match *instr {
            // ==================== Data Movement ====================

            Instruction::Ldi { reg, value } => {
                self.regs.set(reg, value);
            }

            Instruction::Prn { reg } => {
                self.output.push(self.regs.get(reg).to_string());
            }

            Instruction::Hello => {
                self.output.push(GREETING.to_string());
            }

            // ==================== ALU ====================

            Instruction::Add { a, b } => {
                let result = alu::add(self.regs.get(a), self.regs.get(b));
                self.regs.set(a, result);
            }

            Instruction::Mul { a, b } => {
                let result = alu::mul(self.regs.get(a), self.regs.get(b));
                self.regs.set(a, result);
            }

            Instruction::And { a, b } => {
                let result = alu::and(self.regs.get(a), self.regs.get(b));
                self.regs.set(a, result);
            }

            Instruction::Or { a, b } => {
                let result = alu::or(self.regs.get(a), self.regs.get(b));
                self.regs.set(a, result);
            }

            Instruction::Xor { a, b } => {
                let result = alu::xor(self.regs.get(a), self.regs.get(b));
                self.regs.set(a, result);
            }

            Instruction::Not { reg } => {
                let result = alu::not(self.regs.get(reg));
                self.regs.set(reg, result);
            }

            Instruction::Shl { a, b } => {
                let result = alu::shl(self.regs.get(a), self.regs.get(b));
                self.regs.set(a, result);
            }

            Instruction::Shr { a, b } => {
                let result = alu::shr(self.regs.get(a), self.regs.get(b));
                self.regs.set(a, result);
            }

            Instruction::Mod { a, b } => {
                let result = alu::modulo(self.regs.get(a), self.regs.get(b))
                    .ok_or(CpuError::ModuloByZero { addr: self.regs.pc })?;
                self.regs.set(a, result);
            }

            Instruction::Addi { reg, value } => {
                // Direct immediate add, bypasses the ALU register path
                let result = self.regs.get(reg).wrapping_add(value);
                self.regs.set(reg, result);
            }

            Instruction::Cmp { a, b } => {
                self.regs.fl.set_compare(self.regs.get(a), self.regs.get(b));
            }

            // ==================== Stack ====================

            Instruction::Push { reg } => {
                self.push_byte(self.regs.get(reg))?;
            }

            Instruction::Pop { reg } => {
                let value = self.pop_byte()?;
                self.regs.set(reg, value);
            }

            // ==================== Control Flow ====================

            Instruction::Call { reg } => {
                // Return address: the instruction after this 2-byte CALL
                let ret_addr = self.regs.pc + 2;
                self.push_byte(ret_addr)?;
                return Ok(Flow::Jump(self.regs.get(reg)));
            }

            Instruction::Ret => {
                let ret_addr = self.pop_byte()?;
                return Ok(Flow::Jump(ret_addr));
            }

            Instruction::Jmp { reg } => {
                return Ok(Flow::Jump(self.regs.get(reg)));
            }

            Instruction::Jeq { reg } => {
                if self.regs.fl.equal() {
                    return Ok(Flow::Jump(self.regs.get(reg)));
                }
            }

            Instruction::Jne { reg } => {
                if !self.regs.fl.equal() {
                    return Ok(Flow::Jump(self.regs.get(reg)));
                }
            }

            Instruction::Hlt => {
                return Ok(Flow::Halt);
            }
        }

        Ok(Flow::Advance)
    }

    /// Decrement SP and store `value` at the new top of the stack.
    fn push_byte(&mut self, value: u8) -> Result<(), CpuError> {
        let sp = self.regs.sp();
        let new_sp = sp
            .checked_sub(1)
            .ok_or(CpuError::StackOverflow { sp })?;
        self.mem.write(new_sp, value)?;
        self.regs.set_sp(new_sp);
        Ok(())
    }

    /// Read the top of the stack and increment SP.
    fn pop_byte(&mut self) -> Result<u8, CpuError> {
        let sp = self.regs.sp();
        if sp as usize >= MEMORY_SIZE {
            return Err(CpuError::StackUnderflow { sp });
        }
        let value = self.mem.read(sp)?;
        self.regs.set_sp(sp + 1);
        Ok(value)
    }

    /// Drain the lines emitted since the last drain.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
///
/// Every fault is unrecoverable: the machine moves to
/// [`CpuState::Error`] and stays there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("unknown opcode 0b{opcode:08b} at address {addr}")]
    UnknownOpcode { opcode: u8, addr: u8 },

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("stack overflow: push with SP={sp}")]
    StackOverflow { sp: u8 },

    #[error("stack underflow: pop with SP={sp}")]
    StackUnderflow { sp: u8 },

    #[error("modulo by zero at address {addr}")]
    ModuloByZero { addr: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::encode;
    use crate::cpu::registers::SP;
    use proptest::prelude::*;

    fn make_program(instructions: &[Instruction]) -> Vec<u8> {
        instructions.iter().flat_map(encode).collect()
    }

    fn run_program(instructions: &[Instruction]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(instructions)).unwrap();
        cpu.run().unwrap();
        cpu
    }

    #[test]
    fn test_cpu_halt() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[Instruction::Hlt])).unwrap();

        let executed = cpu.run().unwrap();

        assert_eq!(executed, 1);
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_cpu_ldi() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 8 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.regs.get(0), 8);
    }

    #[test]
    fn test_cpu_step_after_halt_refused() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[Instruction::Hlt])).unwrap();
        cpu.run().unwrap();

        assert_eq!(cpu.step(), Err(CpuError::NotRunning(CpuState::Halted)));
    }

    #[test]
    fn test_add_wraps() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 250 },
            Instruction::Ldi { reg: 1, value: 10 },
            Instruction::Add { a: 0, b: 1 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.regs.get(0), 4);
    }

    #[test]
    fn test_mul_wraps() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 200 },
            Instruction::Ldi { reg: 1, value: 2 },
            Instruction::Mul { a: 0, b: 1 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.regs.get(0), 144);
    }

    #[test]
    fn test_addi() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 2, value: 250 },
            Instruction::Addi { reg: 2, value: 10 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.regs.get(2), 4);
    }

    #[test]
    fn test_not_single_operand() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 0b0000_1111 },
            Instruction::Not { reg: 0 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.regs.get(0), 0b1111_0000);
    }

    #[test]
    fn test_cmp_flag_exclusivity() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 5 },
            Instruction::Ldi { reg: 1, value: 5 },
            Instruction::Cmp { a: 0, b: 1 },
            Instruction::Hlt,
        ]);
        assert_eq!(cpu.regs.fl.bits(), 0b001);

        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 7 },
            Instruction::Ldi { reg: 1, value: 3 },
            Instruction::Cmp { a: 0, b: 1 },
            Instruction::Hlt,
        ]);
        assert_eq!(cpu.regs.fl.bits(), 0b010);

        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 3 },
            Instruction::Ldi { reg: 1, value: 7 },
            Instruction::Cmp { a: 0, b: 1 },
            Instruction::Hlt,
        ]);
        assert_eq!(cpu.regs.fl.bits(), 0b100);
    }

    #[test]
    fn test_push_pop_round_trip() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 42 },
            Instruction::Push { reg: 0 },
            Instruction::Ldi { reg: 0, value: 0 },
            Instruction::Pop { reg: 0 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.regs.get(0), 42);
        assert_eq!(cpu.regs.sp(), MEMORY_SIZE as u8);
    }

    #[test]
    fn test_push_grows_down_from_top() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[
            Instruction::Ldi { reg: 0, value: 42 },
            Instruction::Push { reg: 0 },
            Instruction::Hlt,
        ]))
        .unwrap();
        cpu.run().unwrap();

        assert_eq!(cpu.regs.sp(), MEMORY_SIZE as u8 - 1);
        assert_eq!(cpu.mem.read(MEMORY_SIZE as u8 - 1).unwrap(), 42);
    }

    #[test]
    fn test_stack_underflow() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[Instruction::Pop { reg: 0 }]))
            .unwrap();

        let err = cpu.run().unwrap_err();
        assert_eq!(
            err,
            CpuError::StackUnderflow { sp: MEMORY_SIZE as u8 }
        );
        assert_eq!(cpu.state, CpuState::Error);
    }

    #[test]
    fn test_stack_overflow() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[
            Instruction::Ldi { reg: SP, value: 0 },
            Instruction::Push { reg: 0 },
        ]))
        .unwrap();

        let err = cpu.run().unwrap_err();
        assert_eq!(err, CpuError::StackOverflow { sp: 0 });
    }

    #[test]
    fn test_call_ret() {
        // 0: LDI R0,6   call target
        // 3: CALL R0    pushes return address 5
        // 5: HLT
        // 6: LDI R1,42  subroutine body
        // 9: RET
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[
            Instruction::Ldi { reg: 0, value: 6 },
            Instruction::Call { reg: 0 },
            Instruction::Hlt,
            Instruction::Ldi { reg: 1, value: 42 },
            Instruction::Ret,
        ]))
        .unwrap();

        cpu.run().unwrap();

        assert!(cpu.is_halted());
        assert_eq!(cpu.regs.get(1), 42);
        assert_eq!(cpu.regs.sp(), MEMORY_SIZE as u8);
    }

    #[test]
    fn test_call_records_return_address() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[
            Instruction::Ldi { reg: 0, value: 6 },
            Instruction::Call { reg: 0 },
            Instruction::Hlt,
            Instruction::Hlt,
        ]))
        .unwrap();

        // Step over LDI and CALL, then inspect the pushed address
        cpu.step().unwrap();
        cpu.step().unwrap();

        assert_eq!(cpu.regs.pc, 6);
        assert_eq!(cpu.regs.sp(), MEMORY_SIZE as u8 - 1);
        assert_eq!(cpu.mem.read(cpu.regs.sp()).unwrap(), 5);
    }

    #[test]
    fn test_jmp() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[
            Instruction::Ldi { reg: 0, value: 6 },
            Instruction::Jmp { reg: 0 },
            Instruction::Hlt,     // skipped
            Instruction::Ldi { reg: 1, value: 1 },
            Instruction::Hlt,
        ]))
        .unwrap();

        cpu.run().unwrap();
        assert_eq!(cpu.regs.get(1), 1);
    }

    #[test]
    fn test_jeq_taken_and_jne_falls_through() {
        // 0:  LDI R0,15
        // 3:  LDI R1,5
        // 6:  LDI R2,5
        // 9:  CMP R1,R2   sets Equal
        // 12: JEQ R0      taken -> 15
        // 14: HLT
        // 15: LDI R3,1
        // 18: HLT
        let program = |branch: Instruction| {
            make_program(&[
                Instruction::Ldi { reg: 0, value: 15 },
                Instruction::Ldi { reg: 1, value: 5 },
                Instruction::Ldi { reg: 2, value: 5 },
                Instruction::Cmp { a: 1, b: 2 },
                branch,
                Instruction::Hlt,
                Instruction::Ldi { reg: 3, value: 1 },
                Instruction::Hlt,
            ])
        };

        let mut cpu = Cpu::new();
        cpu.load_program(&program(Instruction::Jeq { reg: 0 })).unwrap();
        cpu.run().unwrap();
        assert_eq!(cpu.regs.get(3), 1, "JEQ should branch when Equal is set");

        let mut cpu = Cpu::new();
        cpu.load_program(&program(Instruction::Jne { reg: 0 })).unwrap();
        cpu.run().unwrap();
        assert_eq!(cpu.regs.get(3), 0, "JNE should skip its 2 bytes when Equal is set");
    }

    #[test]
    fn test_jne_taken_when_not_equal() {
        let program = make_program(&[
            Instruction::Ldi { reg: 0, value: 15 },
            Instruction::Ldi { reg: 1, value: 4 },
            Instruction::Ldi { reg: 2, value: 5 },
            Instruction::Cmp { a: 1, b: 2 },
            Instruction::Jne { reg: 0 },
            Instruction::Hlt,
            Instruction::Ldi { reg: 3, value: 1 },
            Instruction::Hlt,
        ]);

        let mut cpu = Cpu::new();
        cpu.load_program(&program).unwrap();
        cpu.run().unwrap();
        assert_eq!(cpu.regs.get(3), 1);
    }

    #[test]
    fn test_prn_output() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 8 },
            Instruction::Ldi { reg: 1, value: 9 },
            Instruction::Mul { a: 0, b: 1 },
            Instruction::Prn { reg: 0 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.output, vec!["72"]);
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_hello_output() {
        let cpu = run_program(&[Instruction::Hello, Instruction::Hlt]);

        assert_eq!(cpu.output, vec![GREETING]);
        assert_eq!(cpu.cycles, 2);
    }

    #[test]
    fn test_unknown_opcode_fault() {
        let mut cpu = Cpu::new();
        cpu.load_program(&[0b1111_1111]).unwrap();

        let err = cpu.run().unwrap_err();
        assert_eq!(
            err,
            CpuError::UnknownOpcode { opcode: 0b1111_1111, addr: 0 }
        );
        assert_eq!(cpu.state, CpuState::Error);
    }

    #[test]
    fn test_fetch_out_of_bounds_fault() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[
            Instruction::Ldi { reg: 0, value: 200 },
            Instruction::Jmp { reg: 0 },
        ]))
        .unwrap();

        let err = cpu.run().unwrap_err();
        assert_eq!(err, CpuError::Memory(MemoryError::AddressOutOfRange(200)));
    }

    #[test]
    fn test_modulo_by_zero_fault() {
        let mut cpu = Cpu::new();
        cpu.load_program(&make_program(&[
            Instruction::Ldi { reg: 0, value: 10 },
            Instruction::Ldi { reg: 1, value: 0 },
            Instruction::Mod { a: 0, b: 1 },
            Instruction::Hlt,
        ]))
        .unwrap();

        let err = cpu.run().unwrap_err();
        assert_eq!(err, CpuError::ModuloByZero { addr: 6 });
    }

    #[test]
    fn test_mod() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 10 },
            Instruction::Ldi { reg: 1, value: 3 },
            Instruction::Mod { a: 0, b: 1 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.regs.get(0), 1);
    }

    #[test]
    fn test_take_output_drains() {
        let mut cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 7 },
            Instruction::Prn { reg: 0 },
            Instruction::Hlt,
        ]);

        assert_eq!(cpu.take_output(), vec!["7"]);
        assert!(cpu.output.is_empty());
    }

    #[test]
    fn test_state_snapshot_round_trip() {
        let cpu = run_program(&[
            Instruction::Ldi { reg: 0, value: 8 },
            Instruction::Hlt,
        ]);

        let json = serde_json::to_string(&cpu).unwrap();
        let restored: Cpu = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.regs.get(0), 8);
        assert_eq!(restored.state, CpuState::Halted);
        assert_eq!(restored.cycles, cpu.cycles);
    }

    #[test]
    fn test_memory_above_stack_untouched_after_push_pop() {
        let mut cpu = Cpu::new();
        let program = make_program(&[
            Instruction::Ldi { reg: 0, value: 1 },
            Instruction::Ldi { reg: 1, value: 2 },
            Instruction::Push { reg: 0 },
            Instruction::Push { reg: 1 },
            Instruction::Pop { reg: 1 },
            Instruction::Pop { reg: 0 },
            Instruction::Hlt,
        ]);
        cpu.load_program(&program).unwrap();
        cpu.run().unwrap();

        assert_eq!(cpu.regs.sp(), MEMORY_SIZE as u8);
        // The region between the program and the stack never changed
        for addr in program.len() as u8..MEMORY_SIZE as u8 - 2 {
            assert_eq!(cpu.mem.read(addr).unwrap(), 0);
        }
    }

    proptest! {
        // Any LDI-then-HLT program leaves exactly the target register
        // set and everything else untouched. R7 is excluded: writing it
        // moves the stack pointer by definition.
        #[test]
        fn prop_ldi_touches_only_target(reg in 0u8..7, value: u8) {
            let program = make_program(&[
                Instruction::Ldi { reg, value },
                Instruction::Hlt,
            ]);

            let mut cpu = Cpu::new();
            cpu.load_program(&program).unwrap();
            cpu.run().unwrap();

            prop_assert_eq!(cpu.regs.get(reg), value);
            for other in 0..SP {
                if other != reg {
                    prop_assert_eq!(cpu.regs.get(other), 0);
                }
            }
            prop_assert_eq!(cpu.regs.sp(), MEMORY_SIZE as u8);
            for addr in program.len() as u8..MEMORY_SIZE as u8 {
                prop_assert_eq!(cpu.mem.read(addr).unwrap(), 0);
            }
        }

        // CMP always sets exactly one of the three flag bits.
        #[test]
        fn prop_cmp_sets_exactly_one_flag(a: u8, b: u8) {
            let mut cpu = Cpu::new();
            cpu.load_program(&make_program(&[
                Instruction::Ldi { reg: 0, value: a },
                Instruction::Ldi { reg: 1, value: b },
                Instruction::Cmp { a: 0, b: 1 },
                Instruction::Hlt,
            ])).unwrap();
            cpu.run().unwrap();

            prop_assert_eq!(cpu.regs.fl.bits().count_ones(), 1);
        }
    }
}
