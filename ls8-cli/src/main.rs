//! # LS-8 CLI
//!
//! Command-line interface for the LS-8 emulator.
//!
//! Usage:
//!   ls8 <program.ls8>
//!   ls8 run <program.ls8> [--trace] [--max-steps N] [--dump-state]
//!   ls8 disasm <program.ls8>
//!   ls8 schema [--json]
//!
//! Examples:
//!   ls8 programs/mult.ls8
//!   ls8 --trace programs/call.ls8
//!   ls8 run programs/loop.ls8 --max-steps 100
//!
//! Exit status is 0 on HLT, otherwise the code of the error kind that
//! stopped the run (2 = program not found, 3 = illegal opcode, ...).

use clap::{Args, Parser, Subcommand};
use ls8_vm::{IsaSchema, Machine, MachineConfig, Program};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ls8")]
#[command(author, version, about = "LS-8 - an 8-bit virtual machine")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Program file to load and run (when not using subcommands)
    program: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Print a trace line to stderr before every instruction
    #[arg(short, long)]
    trace: bool,

    /// Abort if the program has not halted after this many instructions
    #[arg(short, long)]
    max_steps: Option<u64>,

    /// Print the final machine state as JSON to stderr
    #[arg(long)]
    dump_state: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and run a program
    Run {
        /// Path to the program file
        #[arg(required = true)]
        program: PathBuf,

        #[command(flatten)]
        args: RunArgs,
    },
    /// Print a disassembly listing of a program
    Disasm {
        /// Path to the program file
        #[arg(required = true)]
        program: PathBuf,
    },
    /// Show the instruction set
    Schema {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_program(path: &Path, args: &RunArgs) -> ls8_vm::Result<u64> {
    let program = Program::from_file(path)?;

    let mut config = MachineConfig::default().with_trace(args.trace);
    if let Some(max) = args.max_steps {
        config = config.with_max_steps(max);
    }

    let mut machine = Machine::new().with_config(config);
    if args.trace {
        machine = machine.with_trace_callback(|line| eprintln!("{}", line));
    }
    machine.load(&program)?;

    let result = machine.run();

    if args.dump_state {
        match serde_json::to_string_pretty(&machine.snapshot()) {
            Ok(json) => eprintln!("{}", json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize machine state"),
        }
    }

    result
}

/// Run a program and turn the outcome into a process exit status
fn execute(path: &Path, args: &RunArgs) -> i32 {
    match run_program(path, args) {
        Ok(steps) => {
            tracing::info!(path = %path.display(), steps, "program halted");
            0
        }
        Err(e) => {
            eprintln!("ls8: {}", e);
            tracing::debug!("{:?}", e);
            e.exit_code()
        }
    }
}

fn disassemble(path: &Path) -> i32 {
    match Program::from_file(path) {
        Ok(program) => {
            for line in program.disassemble() {
                println!("{}", line);
            }
            0
        }
        Err(e) => {
            eprintln!("ls8: {}", e);
            e.exit_code()
        }
    }
}

fn show_schema(json: bool) {
    let schema = IsaSchema::new();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&schema.to_json()).unwrap_or_default()
        );
    } else {
        print!("{}", schema.to_text());
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Some(Commands::Run { program, args }) => execute(&program, &args),
        Some(Commands::Disasm { program }) => disassemble(&program),
        Some(Commands::Schema { json }) => {
            show_schema(json);
            0
        }
        None => match cli.program {
            Some(program) => execute(&program, &cli.run),
            None => {
                eprintln!("Error: No program provided.");
                eprintln!("Usage: ls8 [OPTIONS] <PROGRAM>");
                eprintln!("       ls8 run <PROGRAM>");
                eprintln!("       ls8 disasm <PROGRAM>");
                eprintln!("       ls8 schema [--json]");
                eprintln!("\nExamples:");
                eprintln!("  ls8 programs/mult.ls8");
                eprintln!("  ls8 --trace programs/call.ls8");
                eprintln!("  ls8 --help");
                1
            }
        },
    };

    std::process::exit(code);
}
