use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use lc3_tutor::asm::disasm::disassemble;
use lc3_tutor::asm::encoding::{BinaryFormat, ObjFileFormat, TextFormat};
use lc3_tutor::asm::{assemble, ObjectFile};
use lc3_tutor::err::Error;
use lc3_tutor::sim::device::ChannelInput;
use lc3_tutor::sim::{RunOutcome, SimFlags, Simulator};

/// An LC-3 assembler and simulator for learning assembly programming.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a `.asm` file for errors without running it
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Assemble a `.asm` file into an object file
    Compile {
        /// `.asm` file to compile
        name: PathBuf,
        /// Destination of the object file
        dest: Option<PathBuf>,
        /// Write the object file as hex text instead of binary
        #[arg(long)]
        text: bool,
    },
    /// Run a `.asm` or `.obj` file and print its output
    Run {
        /// `.asm` or `.obj` file to run
        name: PathBuf,
        /// Feed this text as the program's input instead of reading the terminal
        #[arg(short, long)]
        input: Option<String>,
        /// Instruction budget before the program is considered stuck
        #[arg(long, default_value_t = SimFlags::default().max_steps)]
        max_steps: u64,
        /// Do not echo characters read by the IN trap
        #[arg(long)]
        no_echo: bool,
        /// Print execution statistics after the run
        #[arg(long)]
        stats: bool,
    },
    /// Print the instructions of a `.asm` or `.obj` file
    Disasm {
        /// `.asm` or `.obj` file to disassemble
        name: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Command::Check { name } => check(&name),
        Command::Compile { name, dest, text } => compile(&name, dest, text),
        Command::Run { name, input, max_steps, no_echo, stats } => {
            let flags = SimFlags { max_steps, echo_input: !no_echo, ..Default::default() };
            run(&name, input, flags, stats)
        },
        Command::Disasm { name } => disasm(&name),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            message(MsgColor::Red, "Failed", &msg);
            ExitCode::FAILURE
        }
    }
}

enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: &str) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}

fn read_source(name: &Path) -> Result<String, String> {
    fs::read_to_string(name).map_err(|e| format!("could not read {}: {e}", name.display()))
}

/// Assembles a source file, printing every error (with help) if it fails.
fn assemble_file(name: &Path) -> Result<ObjectFile, String> {
    let src = read_source(name)?;
    let errs = match assemble(&src).into_object() {
        Ok(obj) => return Ok(obj),
        Err(errs) => errs.into_vec(),
    };

    for err in &errs {
        message(MsgColor::Red, "Error", &format!("line {}: {err}", err.line));
        if let Some(text) = src.lines().nth(err.line.saturating_sub(1)) {
            eprintln!("{:>12} {}", "|", text.trim());
        }
        if let Some(help) = err.help() {
            message(MsgColor::Cyan, "Help", &help);
        }
    }
    Err(format!("{} error(s) found", errs.len()))
}

/// Loads a program, assembling it if it is not an object file.
fn load_program(name: &Path) -> Result<ObjectFile, String> {
    match name.extension().and_then(|e| e.to_str()) {
        Some("obj" | "lc3") => {
            let bytes = fs::read(name).map_err(|e| format!("could not read {}: {e}", name.display()))?;
            BinaryFormat::deserialize(&bytes)
                .or_else(|| std::str::from_utf8(&bytes).ok().and_then(TextFormat::deserialize))
                .ok_or_else(|| format!("{} is not a valid object file", name.display()))
        },
        _ => {
            file_message(MsgColor::Green, "Assembling", name);
            assemble_file(name)
        }
    }
}

fn check(name: &Path) -> Result<(), String> {
    file_message(MsgColor::Green, "Checking", name);
    assemble_file(name)?;
    message(MsgColor::Green, "Success", "no errors found!");
    Ok(())
}

fn compile(name: &Path, dest: Option<PathBuf>, text: bool) -> Result<(), String> {
    file_message(MsgColor::Green, "Assembling", name);
    let obj = assemble_file(name)?;

    let dest = dest.unwrap_or_else(|| name.with_extension("obj"));
    let contents = match text {
        true  => TextFormat::serialize(&obj).into_bytes(),
        false => BinaryFormat::serialize(&obj),
    };
    fs::write(&dest, contents).map_err(|e| format!("could not write {}: {e}", dest.display()))?;

    message(MsgColor::Green, "Finished", &format!("{} word(s) from x{:04X}", obj.words().len(), obj.origin()));
    file_message(MsgColor::Green, "Saved", &dest);
    Ok(())
}

fn run(name: &Path, input: Option<String>, flags: SimFlags, stats: bool) -> Result<(), String> {
    let obj = load_program(name)?;
    let mut sim = Simulator::new(flags);
    sim.load_obj_file(&obj);

    // Without given input, keystrokes come from stdin through a channel.
    // The simulator polls it, and blocks on it only when a trap is waiting.
    let stdin_rx = match input {
        Some(input) => {
            sim.push_input_str(&input);
            None
        },
        None => {
            let (tx, rx) = crossbeam_channel::unbounded();
            std::thread::spawn(move || {
                for byte in io::stdin().lock().bytes() {
                    let Ok(byte) = byte else { break };
                    if tx.send(byte).is_err() { break; }
                }
            });
            sim.set_input_supplier(ChannelInput::new(rx.clone()));
            Some(rx)
        }
    };

    file_message(MsgColor::Green, "Running", name);
    let mut remaining = flags.max_steps;
    let mut stdout = io::stdout();
    let mut line_open = false;
    let outcome = loop {
        let result = sim.run(remaining);
        remaining = remaining.saturating_sub(result.steps);

        let output = sim.take_output();
        if !output.is_empty() {
            line_open = !output.ends_with('\n');
            write_output(&mut stdout, &output)?;
        }

        match (result.outcome, &stdin_rx) {
            (RunOutcome::WaitingForInput, Some(rx)) => match rx.recv() {
                Ok(byte) => sim.push_input(byte),
                Err(_) => break RunOutcome::WaitingForInput,
            },
            (outcome, _) => break outcome,
        }
    };
    if line_open { write_output(&mut stdout, "\n")?; }

    if stats {
        let stats = sim.stats();
        message(MsgColor::Cyan, "Executed", &format!("{} instruction(s)", stats.instructions_executed));
        message(MsgColor::Cyan, "Memory", &format!("{} read(s), {} write(s)", stats.memory_reads, stats.memory_writes));
        message(MsgColor::Cyan, "Branches", &format!("{} taken, {} not taken", stats.branches_taken, stats.branches_not_taken));
    }

    match outcome {
        RunOutcome::Halted => {
            message(MsgColor::Green, "Finished", "program halted");
            Ok(())
        },
        RunOutcome::WaitingForInput => Err("program is waiting for input, but input ended".to_string()),
        outcome => Err(outcome.to_string()),
    }
}

/// Writes program output immediately, so prompts appear before input is read.
fn write_output(out: &mut impl Write, text: &str) -> Result<(), String> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| format!("could not write output: {e}"))
}

fn disasm(name: &Path) -> Result<(), String> {
    let obj = load_program(name)?;
    for (addr, word) in obj.iter() {
        println!("x{addr:04X}  x{word:04X}  {}", disassemble(word, addr));
    }
    Ok(())
}
