//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8-emu run <program>` - Run an image or ASM file
//! - `ls8-emu debug <program>` - Interactive debugger
//! - `ls8-emu asm <source>` - Assemble to an image file
//! - `ls8-emu disasm <image>` - Disassemble an image
//! - `ls8-emu test` - Built-in self-test

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of the LS-8 educational 8-bit computer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the image or ASM file to execute
        program: String,
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the image or ASM file to debug
        program: String,
    },
    /// Assemble source to an image file
    Asm {
        /// Path to the source file
        source: String,
        /// Output image file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble an image to readable text
    Disasm {
        /// Path to the image file
        image: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace }) => {
            run_program(&program, max_cycles, trace);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { image }) => {
            disassemble_file(&image);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("LS-8 Emulator v0.1.0");
            println!("An 8-bit educational computer emulator");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_machine();
        }
    }
}

/// Read a program file, assembling it first when it is ASM source.
///
/// A missing file is a distinct error (exit code 2) from a file that
/// fails to parse (exit code 1).
fn load_program_file(path: &str) -> Vec<u8> {
    use ls8::{assemble, parse_image};

    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("❌ File not found: {}", path);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let bytes = if path.ends_with(".asm") {
        match assemble(&source) {
            Ok(bytes) => {
                println!("📝 Assembled {} bytes", bytes.len());
                bytes
            }
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match parse_image(&source) {
            Ok(image) => {
                println!("📂 Loaded {} bytes", image.len());
                image.bytes
            }
            Err(e) => {
                eprintln!("❌ Failed to load image: {}", e);
                std::process::exit(1);
            }
        }
    };

    if bytes.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    bytes
}

fn run_program(path: &str, max_cycles: u64, trace: bool) {
    use ls8::Cpu;
    use ls8::asm::disasm::disassemble_at;
    use ls8::cpu::decode::encode;

    println!("🔧 Running: {}", path);

    let bytes = load_program_file(path);

    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load_program(&bytes) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    println!();
    println!("━━━ Execution ━━━");

    let mut cycles = 0u64;
    while cpu.is_running() && cycles < max_cycles {
        let pc = cpu.regs.pc;

        match cpu.step() {
            Ok(instr) => {
                if trace {
                    let (text, _) = disassemble_at(&encode(&instr), 0);
                    println!("{:02}: {:<12} FL={} SP={:02}", pc, text, cpu.regs.fl, cpu.regs.sp());
                }
                for line in cpu.take_output() {
                    println!("{}", line);
                }
                cycles += 1;
            }
            Err(e) => {
                eprintln!("❌ CPU fault at PC={}: {}", pc, e);
                std::process::exit(1);
            }
        }
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cycles);
    println!("State: {:?}", cpu.state);
    for reg in 0..8u8 {
        let marker = if reg == ls8::cpu::registers::SP { " (SP)" } else { "" };
        println!("R{}: {:3} (0b{:08b}){}", reg, cpu.regs.get(reg), cpu.regs.get(reg), marker);
    }
    println!("PC: {}  FL: {}", cpu.regs.pc, cpu.regs.fl);

    if cycles >= max_cycles {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }
}

fn debug_program(path: &str) {
    println!("🔍 Loading: {}", path);

    let bytes = load_program_file(path);

    println!("🚀 Launching debugger...");
    println!();

    #[cfg(feature = "tui")]
    if let Err(e) = ls8::tui::run_debugger(bytes) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }

    #[cfg(not(feature = "tui"))]
    {
        let _ = bytes;
        eprintln!("❌ Built without the `tui` feature; `debug` is unavailable");
        std::process::exit(1);
    }
}

fn assemble_file(source_path: &str, output: Option<String>) {
    use ls8::{assemble, save_image, ProgramImage};

    let out_path = output.unwrap_or_else(|| source_path.replace(".asm", ".ls8"));

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("❌ File not found: {}", source_path);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let bytes = match assemble(&source) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Assembled {} bytes", bytes.len());

    let mut image = ProgramImage::new();
    for byte in &bytes {
        image.push(*byte, &format!("{:08b}", byte));
    }

    if let Err(e) = save_image(&out_path, &image) {
        eprintln!("❌ Failed to save image: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(image_path: &str) {
    use ls8::{disassemble, load_image};

    println!("📖 Disassembling: {}", image_path);
    println!();

    let image = match load_image(image_path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", disassemble(&image.bytes));
}

fn demo_machine() {
    use ls8::{assemble, Cpu};

    println!("━━━ Demo: multiply and print ━━━");
    println!();

    let source = "LDI R0,8\nLDI R1,9\nMUL R0,R1\nPRN R0\nHLT\n";
    let bytes = assemble(source).expect("demo program must assemble");

    for line in source.lines() {
        println!("    {}", line);
    }
    println!();

    let mut cpu = Cpu::new();
    cpu.load_program(&bytes).expect("demo program must fit");
    match cpu.run() {
        Ok(cycles) => {
            for line in cpu.take_output() {
                println!("Output: {}", line);
            }
            println!("Halted after {} cycles", cycles);
        }
        Err(e) => println!("Fault: {}", e),
    }
}

fn run_self_test() {
    use ls8::{assemble, Cpu, CpuError};

    println!("━━━ LS-8 Emulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool| {
        if ok {
            println!("{}... ✓", name);
            passed += 1;
        } else {
            println!("{}... ✗", name);
            failed += 1;
        }
    };

    // Test 1: wrapping addition
    let mut cpu = Cpu::new();
    cpu.load_program(&assemble("LDI R0,250\nLDI R1,10\nADD R0,R1\nHLT\n").unwrap())
        .unwrap();
    cpu.run().unwrap();
    check("Wrapping addition (250 + 10 = 4)", cpu.regs.get(0) == 4);

    // Test 2: wrapping multiplication
    let mut cpu = Cpu::new();
    cpu.load_program(&assemble("LDI R0,200\nLDI R1,2\nMUL R0,R1\nHLT\n").unwrap())
        .unwrap();
    cpu.run().unwrap();
    check("Wrapping multiplication (200 * 2 = 144)", cpu.regs.get(0) == 144);

    // Test 3: comparison flags are exclusive
    let mut cpu = Cpu::new();
    cpu.load_program(&assemble("LDI R0,5\nLDI R1,5\nCMP R0,R1\nHLT\n").unwrap())
        .unwrap();
    cpu.run().unwrap();
    check("CMP sets exactly the Equal flag", cpu.regs.fl.bits() == 0b001);

    // Test 4: stack round trip
    let mut cpu = Cpu::new();
    cpu.load_program(
        &assemble("LDI R0,42\nPUSH R0\nLDI R0,0\nPOP R1\nHLT\n").unwrap(),
    )
    .unwrap();
    cpu.run().unwrap();
    check(
        "Stack push/pop round trip",
        cpu.regs.get(1) == 42 && cpu.regs.sp() == ls8::cpu::MEMORY_SIZE as u8,
    );

    // Test 5: call and return
    let mut cpu = Cpu::new();
    cpu.load_program(
        &assemble("LDI R1,SUB\nCALL R1\nHLT\nSUB:\nLDI R2,7\nRET\n").unwrap(),
    )
    .unwrap();
    cpu.run().unwrap();
    check("CALL/RET", cpu.is_halted() && cpu.regs.get(2) == 7);

    // Test 6: end-to-end multiply program output
    let mut cpu = Cpu::new();
    cpu.load_program(&assemble("LDI R0,8\nLDI R1,9\nMUL R0,R1\nPRN R0\nHLT\n").unwrap())
        .unwrap();
    cpu.run().unwrap();
    check("End-to-end multiply prints 72", cpu.output == vec!["72"]);

    // Test 7: unknown opcode is a fault
    let mut cpu = Cpu::new();
    cpu.load_program(&[0b1111_1111]).unwrap();
    let fault = matches!(
        cpu.run(),
        Err(CpuError::UnknownOpcode { opcode: 0b1111_1111, addr: 0 })
    );
    check("Unknown opcode faults", fault);

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
