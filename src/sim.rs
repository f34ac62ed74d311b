//! Simulating and execution for LC-3 assembly.
//!
//! This module is focused on executing fully assembled code (i.e., [`ObjectFile`]).
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates assembled code.
//! - [`mem`]: The module handling memory and the register file.
//! - [`device`]: The module handling the keyboard and display behind memory-mapped IO.
//! - [`debug`]: The module handling types of breakpoints for the simulator.
//!
//! # Usage
//!
//! To simulate some code, instantiate a Simulator and load an object file into it:
//!
//! ```
//! use lc3_tutor::asm::assemble;
//! use lc3_tutor::sim::{Simulator, RunOutcome};
//!
//! let src = "
//!     .orig x3000
//!     LEA R0, HELLO
//!     PUTS
//!     HALT
//!     HELLO .stringz \"Hi\"
//!     .end
//! ";
//! let obj_file = assemble(src).into_object().unwrap();
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load_obj_file(&obj_file);
//! let result = sim.run(1000);
//!
//! assert_eq!(result.outcome, RunOutcome::Halted);
//! assert_eq!(sim.output(), "Hi");
//! ```
//!
//! ## Flags
//!
//! The simulator can be configured with [`SimFlags`]:
//!
//! ```
//! # use lc3_tutor::sim::{Simulator, SimFlags};
//! let simulator = Simulator::new(SimFlags { echo_input: false, ..Default::default() });
//! ```
//!
//! ## Execution
//!
//! Beyond the basic [`Simulator::run`] (which runs until halting or until a step budget runs out),
//! there are also:
//! - [`Simulator::step`]: manual step-by-step simulation
//! - [`Simulator::run_while`]: runs while a condition holds
//! - [`Simulator::run_default`]: runs with the budget configured in [`SimFlags::max_steps`]
//!
//! None of these return errors. Every run reports why it stopped with a [`RunResult`].
//!
//! ```
//! use lc3_tutor::asm::assemble;
//! use lc3_tutor::sim::Simulator;
//! use lc3_tutor::ast::reg_consts::R0;
//!
//! let src = "
//!     .orig x3000
//!     AND R0, R0, #0
//!     ADD R0, R0, #1
//!     ADD R0, R0, #-2
//!     HALT
//!     .end
//! ";
//! let obj_file = assemble(src).into_object().unwrap();
//!
//! let mut sim = Simulator::default();
//! sim.load_obj_file(&obj_file);
//!
//! sim.step();
//! assert_eq!(sim.reg_file[R0], 0);
//! sim.step();
//! assert_eq!(sim.reg_file[R0], 1);
//! sim.step();
//! assert_eq!(sim.reg_file[R0] as i16, -1);
//! assert!(sim.snapshot().n());
//! assert!(!sim.step()); // HALT
//! ```
//!
//! ## Input
//!
//! The input traps (`GETC`, `IN`) read from the keyboard.
//! If no character is available, the machine does not spin:
//! the trap is undone and the simulator enters the waiting-for-input state.
//! Supplying input (and running again) retries the trap.
//!
//! ```
//! use lc3_tutor::asm::assemble;
//! use lc3_tutor::sim::{Simulator, RunOutcome};
//! use lc3_tutor::ast::reg_consts::R0;
//!
//! let src = ".orig x3000\nGETC\nHALT\n.end";
//! let obj_file = assemble(src).into_object().unwrap();
//!
//! let mut sim = Simulator::default();
//! sim.load_obj_file(&obj_file);
//!
//! assert_eq!(sim.run(100).outcome, RunOutcome::WaitingForInput);
//! sim.push_input(b'A');
//! assert_eq!(sim.run(100).outcome, RunOutcome::Halted);
//! assert_eq!(sim.reg_file[R0], 0x41);
//! ```
//!
//! ## Debugging with breakpoints
//!
//! Breakpoints are accessible through the `breakpoints` field on [`Simulator`].
//!
//! ```
//! use lc3_tutor::asm::assemble;
//! use lc3_tutor::sim::{Simulator, RunOutcome};
//! use lc3_tutor::sim::debug::Breakpoint;
//!
//! let src = "
//!     .orig x3000
//!     ADD R0, R0, #0
//!     ADD R0, R0, #1
//!     ADD R0, R0, #2
//!     ADD R0, R0, #3
//!     HALT
//!     .end
//! ";
//! let obj_file = assemble(src).into_object().unwrap();
//!
//! let mut sim = Simulator::default();
//! sim.load_obj_file(&obj_file);
//! sim.breakpoints.insert(Breakpoint::PC(0x3002));
//!
//! assert_eq!(sim.run(100).outcome, RunOutcome::Breakpoint);
//! assert_eq!(sim.pc, 0x3002);
//! assert_eq!(sim.run(100).outcome, RunOutcome::Halted);
//! ```
pub mod mem;
pub mod debug;
pub mod device;

use std::collections::HashSet;

use crate::asm::ObjectFile;
use crate::ast::reg_consts::{R0, R7};
use crate::ast::sim::SimInstr;
use crate::ast::{trap_vects, CondCode, ImmOrReg};
use debug::Breakpoint;
use device::{DeviceHandler, InputSource};

use self::mem::{MemArray, RegFile};

/// The address a program is loaded at by default.
pub const USER_START: u16 = 0x3000;
const IO_START: u16 = 0xFE00;
/// The machine control register. Bit 15 is set while the machine runs.
pub const MCR_ADDR: u16 = 0xFFFE;

/// Configuration flags for [`Simulator`].
///
/// These can be modified after the `Simulator` is created with [`Simulator::new`]
/// and their effects should still apply. They are preserved by [`Simulator::reset`].
///
/// Read the field descriptions for more details.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SimFlags {
    /// The step budget used by [`Simulator::run_default`].
    ///
    /// By default, this flag is `50_000`.
    pub max_steps: u64,

    /// Whether the `IN` trap echoes the character it reads to the display.
    ///
    /// `GETC` never echoes.
    ///
    /// By default, this flag is `true`.
    pub echo_input: bool,

    /// Whether `PUTS` counts its reads in [`SimStats::memory_reads`]
    /// (one per character, plus one for the terminator).
    ///
    /// By default, this flag is `true`.
    pub count_stringout_reads: bool,
}

impl Default for SimFlags {
    fn default() -> Self {
        Self {
            max_steps: 50_000,
            echo_input: true,
            count_stringout_reads: true,
        }
    }
}

/// Counters accumulated while executing a program.
///
/// These only increase, and are cleared by [`Simulator::reset`].
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SimStats {
    /// The number of instructions executed.
    pub instructions_executed: u64,
    /// The number of data reads performed by instructions (instruction fetches are not counted).
    pub memory_reads: u64,
    /// The number of data writes performed by instructions.
    pub memory_writes: u64,
    /// The number of `BR` instructions which branched.
    pub branches_taken: u64,
    /// The number of `BR` instructions which fell through.
    pub branches_not_taken: u64,
}

/// Why a run stopped.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum RunOutcome {
    /// The program halted (via `HALT` or by clearing the MCR).
    Halted,
    /// An input trap is waiting for a character.
    WaitingForInput,
    /// The step budget ran out before the program halted.
    StepLimit,
    /// A breakpoint matched.
    Breakpoint,
}
impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Halted          => f.write_str("program halted"),
            RunOutcome::WaitingForInput => f.write_str("program is waiting for input"),
            RunOutcome::StepLimit       => f.write_str("program did not halt (possible infinite loop)"),
            RunOutcome::Breakpoint      => f.write_str("program hit a breakpoint"),
        }
    }
}

/// The result of a bounded run.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct RunResult {
    /// The number of instructions executed during this run.
    ///
    /// An input trap which was undone to wait for input is not counted.
    pub steps: u64,
    /// Why the run stopped.
    pub outcome: RunOutcome,
}
impl RunResult {
    /// Whether the program halted.
    pub fn completed(&self) -> bool {
        self.outcome == RunOutcome::Halted
    }
    /// Whether the program is paused on an input trap.
    pub fn waiting_for_input(&self) -> bool {
        self.outcome == RunOutcome::WaitingForInput
    }
}

/// A read-only view of the machine's state.
///
/// This is created with [`Simulator::snapshot`].
#[derive(Debug, Clone, Copy)]
pub struct SimState<'a> {
    /// The register values (`R0` first).
    pub regs: [u16; 8],
    /// The program counter.
    pub pc: u16,
    /// The condition code (exactly one of `n`, `z`, `p` is set).
    pub cc: CondCode,
    /// The memory.
    pub memory: &'a MemArray,
    /// Whether the machine has halted.
    pub halted: bool,
    /// Whether the machine is waiting for input.
    pub waiting_for_input: bool,
    /// Everything printed so far.
    pub output: &'a str,
    /// The execution statistics.
    pub stats: SimStats,
}
impl SimState<'_> {
    /// Whether the last value written to a register was negative.
    pub fn n(&self) -> bool {
        self.cc & 0b100 != 0
    }
    /// Whether the last value written to a register was zero.
    pub fn z(&self) -> bool {
        self.cc & 0b010 != 0
    }
    /// Whether the last value written to a register was positive.
    pub fn p(&self) -> bool {
        self.cc & 0b001 != 0
    }
}

/// Executes assembled code.
#[derive(Debug)]
pub struct Simulator {
    // ------------------ SIMULATION STATE ------------------
    // Calling [`Simulator::reset`] resets these values.

    /// The simulator's memory.
    ///
    /// Note that this is held in the heap, as it is too large for the stack.
    pub mem: MemArray,

    /// The simulator's register file.
    pub reg_file: RegFile,

    /// The program counter.
    pub pc: u16,

    /// The condition code.
    cc: CondCode,

    /// Whether the machine has halted.
    halted: bool,

    /// Whether an input trap is waiting on a character.
    waiting: bool,

    /// Execution statistics.
    stats: SimStats,

    // ------------------ CONFIG/DEBUG STATE ------------------
    // Calling [`Simulator::reset`] does not reset these values.

    /// Configuration settings for the simulator.
    ///
    /// See [`SimFlags`] for more details on what configuration
    /// settings are available.
    pub flags: SimFlags,

    /// Breakpoints for the simulator.
    pub breakpoints: HashSet<Breakpoint>,

    /// The keyboard and display.
    ///
    /// Resetting the simulator clears their buffers, but keeps the keyboard's input source.
    pub device_handler: DeviceHandler
}

impl Simulator {
    /// Creates a new simulator with zeroed memory and registers.
    pub fn new(flags: SimFlags) -> Self {
        Self {
            mem: MemArray::new(),
            reg_file: RegFile::new(),
            pc: USER_START,
            cc: 0b010,
            halted: false,
            waiting: false,
            stats: SimStats::default(),

            flags,
            breakpoints: Default::default(),
            device_handler: Default::default()
        }
    }

    /// Resets the simulator.
    ///
    /// This zeroes memory and registers, sets the PC to x3000, clears the
    /// halted and waiting states, the statistics, and the input and output buffers.
    ///
    /// Note that this function preserves:
    /// - Flags
    /// - Breakpoints
    /// - The keyboard's input source
    ///
    /// This also does not reload object files. Any object file data has to be reloaded into the Simulator.
    pub fn reset(&mut self) {
        self.mem.clear();
        self.reg_file = RegFile::new();
        self.pc = USER_START;
        self.cc = 0b010;
        self.halted = false;
        self.waiting = false;
        self.stats = SimStats::default();
        self.device_handler.io_reset();
    }

    /// Loads words into memory starting at `origin` and points the PC at `origin`.
    ///
    /// Addresses wrap around the end of memory.
    pub fn load(&mut self, origin: u16, words: &[u16]) {
        self.load_at(origin, words);
        self.pc = origin;
    }

    /// Loads words into memory starting at `origin`, without changing the PC.
    ///
    /// This is used to place several separately assembled programs in one memory image.
    pub fn load_at(&mut self, origin: u16, words: &[u16]) {
        self.mem.copy_block(origin, words);
    }

    /// Loads an object file into this simulator and points the PC at its origin.
    pub fn load_obj_file(&mut self, obj: &ObjectFile) {
        self.load(obj.origin(), obj.words());
    }

    /// Reads the word at the provided address, going through memory-mapped IO.
    ///
    /// Reading the keyboard data register consumes a character.
    /// If you would like to query the memory's state without side effects, use [`Simulator::read_mem_raw`].
    pub fn read_mem(&mut self, addr: u16) -> u16 {
        match addr {
            MCR_ADDR => u16::from(!self.halted) << 15,
            IO_START.. => match self.device_handler.io_read(addr) {
                Some(data) => data,
                None => self.mem[addr],
            },
            _ => self.mem[addr],
        }
    }

    /// Writes the word at the provided address, going through memory-mapped IO.
    ///
    /// Writing to the display data register prints a character (and does not store to memory).
    /// Writing a value with bit 15 clear to the MCR halts the machine.
    /// If you would like to edit the memory's state without side effects, use [`Simulator::write_mem_raw`].
    pub fn write_mem(&mut self, addr: u16, data: u16) {
        match addr {
            MCR_ADDR => {
                if data & 0x8000 == 0 {
                    self.halted = true;
                }
                self.mem[addr] = data;
            },
            IO_START.. => {
                if !self.device_handler.io_write(addr, data) {
                    self.mem[addr] = data;
                }
            },
            _ => self.mem[addr] = data,
        }
    }

    /// Reads memory directly, bypassing memory-mapped IO.
    pub fn read_mem_raw(&self, addr: u16) -> u16 {
        self.mem[addr]
    }

    /// Writes memory directly, bypassing memory-mapped IO.
    pub fn write_mem_raw(&mut self, addr: u16, data: u16) {
        self.mem[addr] = data;
    }

    /// Sets the condition codes using the provided result.
    fn set_cc(&mut self, result: u16) {
        self.cc = match (result as i16).cmp(&0) {
            std::cmp::Ordering::Less    => 0b100,
            std::cmp::Ordering::Equal   => 0b010,
            std::cmp::Ordering::Greater => 0b001,
        };
    }

    /// Writes a register and sets the condition codes from its new value.
    fn set_reg_cc(&mut self, dr: crate::ast::Reg, value: u16) {
        self.reg_file[dr] = value;
        self.set_cc(value);
    }

    /// Gets the current condition code (exactly one of `n`, `z`, `p` is set).
    pub fn cc(&self) -> CondCode {
        self.cc
    }

    /// Whether the machine has halted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether the machine is waiting for input.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Gets the execution statistics.
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Everything the program has printed so far.
    pub fn output(&self) -> &str {
        self.device_handler.display.output()
    }

    /// Takes everything the program has printed so far, leaving the output empty.
    pub fn take_output(&mut self) -> String {
        self.device_handler.display.take_output()
    }

    /// Appends a character to the keyboard's input buffer.
    ///
    /// This also leaves the waiting-for-input state.
    pub fn push_input(&mut self, byte: u8) {
        self.device_handler.keyboard.push(byte);
        self.waiting = false;
    }

    /// Appends every byte of a string to the keyboard's input buffer.
    ///
    /// This also leaves the waiting-for-input state (unless the string is empty).
    pub fn push_input_str(&mut self, s: &str) {
        self.device_handler.keyboard.push_str(s);
        self.waiting &= s.is_empty();
    }

    /// Sets the input source the keyboard pulls from when its buffer is empty.
    ///
    /// If the source has no character when an input trap runs,
    /// the machine waits for input as if there were no source.
    pub fn set_input_supplier(&mut self, source: impl InputSource + 'static) {
        self.device_handler.keyboard.set_source(source);
    }

    /// Creates a read-only view of the machine's state.
    pub fn snapshot(&self) -> SimState<'_> {
        SimState {
            regs: self.reg_file.values(),
            pc: self.pc,
            cc: self.cc,
            memory: &self.mem,
            halted: self.halted,
            waiting_for_input: self.waiting,
            output: self.output(),
            stats: self.stats,
        }
    }

    /// Runs until the tripwire condition returns false (or any of the typical breaks occur).
    ///
    /// The typical break conditions are:
    /// - the machine halts
    /// - an input trap has no character to read
    /// - a breakpoint matches (checked after each step)
    ///
    /// If the tripwire stops the run, the outcome is [`RunOutcome::StepLimit`].
    pub fn run_while(&mut self, mut tripwire: impl FnMut(&Simulator) -> bool) -> RunResult {
        let start = self.stats.instructions_executed;

        // event loop
        let outcome = loop {
            if self.halted {
                break RunOutcome::Halted;
            }
            if self.waiting && !self.device_handler.keyboard.ready() {
                break RunOutcome::WaitingForInput;
            }
            if !tripwire(self) {
                break RunOutcome::StepLimit;
            }

            // Run a step:
            if !self.step() {
                // halted or waiting, handled at the top of the loop
                continue;
            }

            // After executing, check that any breakpoints were hit.
            if self.breakpoints.iter().any(|bp| bp.check(self)) {
                break RunOutcome::Breakpoint;
            }
        };

        RunResult {
            steps: self.stats.instructions_executed - start,
            outcome
        }
    }

    /// Executes the program for at most `max_steps` instructions.
    ///
    /// This returns when the program halts, waits for input, hits a breakpoint,
    /// or exhausts the budget.
    pub fn run(&mut self, max_steps: u64) -> RunResult {
        let start = self.stats.instructions_executed;
        self.run_while(|sim| sim.stats.instructions_executed - start < max_steps)
    }

    /// Executes the program with the budget from [`SimFlags::max_steps`].
    pub fn run_default(&mut self) -> RunResult {
        self.run(self.flags.max_steps)
    }

    /// Simulate one step, executing one instruction.
    ///
    /// This returns whether the machine can keep running
    /// (false if it halted or is waiting for input).
    ///
    /// If the machine is waiting for input and a character has since become available,
    /// the input trap is retried.
    pub fn step(&mut self) -> bool {
        if self.halted {
            return false;
        }
        if self.waiting {
            if !self.device_handler.keyboard.ready() {
                return false;
            }
            self.waiting = false;
        }

        let word = self.mem[self.pc];
        self.pc = self.pc.wrapping_add(1);
        self.stats.instructions_executed += 1;

        self.execute(SimInstr::decode(word));
        !self.halted && !self.waiting
    }

    /// Executes an already fetched instruction (the PC already points past it).
    fn execute(&mut self, instr: SimInstr) {
        match instr {
            SimInstr::BR(cc, off) => {
                if cc & self.cc != 0 {
                    self.pc = self.pc.wrapping_add_signed(off.get());
                    self.stats.branches_taken += 1;
                } else {
                    self.stats.branches_not_taken += 1;
                }
            },
            SimInstr::ADD(dr, sr1, sr2) => {
                let val1 = self.reg_file[sr1];
                let val2 = match sr2 {
                    ImmOrReg::Imm(i2) => i2.get() as u16,
                    ImmOrReg::Reg(r2) => self.reg_file[r2],
                };
                self.set_reg_cc(dr, val1.wrapping_add(val2));
            },
            SimInstr::AND(dr, sr1, sr2) => {
                let val1 = self.reg_file[sr1];
                let val2 = match sr2 {
                    ImmOrReg::Imm(i2) => i2.get() as u16,
                    ImmOrReg::Reg(r2) => self.reg_file[r2],
                };
                self.set_reg_cc(dr, val1 & val2);
            },
            SimInstr::NOT(dr, sr) => {
                let val = !self.reg_file[sr];
                self.set_reg_cc(dr, val);
            },
            SimInstr::LD(dr, off) => {
                let ea = self.pc.wrapping_add_signed(off.get());
                let val = self.read_mem(ea);
                self.stats.memory_reads += 1;
                self.set_reg_cc(dr, val);
            },
            SimInstr::LDI(dr, off) => {
                let shifted_pc = self.pc.wrapping_add_signed(off.get());
                let ea = self.read_mem(shifted_pc);
                let val = self.read_mem(ea);
                self.stats.memory_reads += 2;
                self.set_reg_cc(dr, val);
            },
            SimInstr::LDR(dr, br, off) => {
                let ea = self.reg_file[br].wrapping_add_signed(off.get());
                let val = self.read_mem(ea);
                self.stats.memory_reads += 1;
                self.set_reg_cc(dr, val);
            },
            SimInstr::LEA(dr, off) => {
                let ea = self.pc.wrapping_add_signed(off.get());
                self.set_reg_cc(dr, ea);
            },
            SimInstr::ST(sr, off) => {
                let ea = self.pc.wrapping_add_signed(off.get());
                self.write_mem(ea, self.reg_file[sr]);
                self.stats.memory_writes += 1;
            },
            SimInstr::STI(sr, off) => {
                let shifted_pc = self.pc.wrapping_add_signed(off.get());
                let ea = self.read_mem(shifted_pc);
                self.write_mem(ea, self.reg_file[sr]);
                self.stats.memory_reads += 1;
                self.stats.memory_writes += 1;
            },
            SimInstr::STR(sr, br, off) => {
                let ea = self.reg_file[br].wrapping_add_signed(off.get());
                self.write_mem(ea, self.reg_file[sr]);
                self.stats.memory_writes += 1;
            },
            SimInstr::JMP(br) => {
                self.pc = self.reg_file[br];
            },
            SimInstr::JSR(op) => {
                // R7 is written first, so `JSRR R7` jumps to the return address.
                self.reg_file[R7] = self.pc;
                self.pc = match op {
                    ImmOrReg::Imm(off) => self.pc.wrapping_add_signed(off.get()),
                    ImmOrReg::Reg(br)  => self.reg_file[br],
                };
            },
            SimInstr::TRAP(vect) => self.trap(vect.get()),
            // user mode only, so these do nothing
            SimInstr::RTI | SimInstr::Reserved(_) => {},
        }
    }

    /// Runs one of the built-in trap routines.
    ///
    /// Unknown trap vectors do nothing.
    fn trap(&mut self, vect: u16) {
        match vect {
            trap_vects::GETC | trap_vects::IN => match self.device_handler.keyboard.pop_input() {
                Some(byte) => {
                    self.set_reg_cc(R0, u16::from(byte));
                    if vect == trap_vects::IN && self.flags.echo_input {
                        self.device_handler.display.send_output(byte);
                    }
                },
                None => {
                    // Undo the fetch, so the trap runs again once input arrives.
                    self.pc = self.pc.wrapping_sub(1);
                    self.stats.instructions_executed -= 1;
                    self.waiting = true;
                },
            },
            trap_vects::OUT => {
                let byte = self.reg_file[R0] as u8;
                self.device_handler.display.send_output(byte);
            },
            trap_vects::PUTS => {
                let start = self.reg_file[R0];
                for addr in (0..=u16::MAX).map(|i| start.wrapping_add(i)) {
                    let word = self.mem[addr];
                    if self.flags.count_stringout_reads {
                        self.stats.memory_reads += 1;
                    }
                    if word == 0 { break; }
                    self.device_handler.display.send_output(word as u8);
                }
            },
            trap_vects::PUTSP => {
                let start = self.reg_file[R0];
                for addr in (0..=u16::MAX).map(|i| start.wrapping_add(i)) {
                    let word = self.mem[addr];
                    if word == 0 { break; }
                    for byte in (word.to_le_bytes()).into_iter().filter(|&b| b != 0) {
                        self.device_handler.display.send_output(byte);
                    }
                }
            },
            trap_vects::HALT => self.halted = true,
            _ => {},
        }
    }
}
impl Default for Simulator {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::assemble;
    use crate::ast::reg_consts::*;

    use super::debug::{Breakpoint, Comparator};
    use super::device::{ChannelInput, DDR, KBDR, KBSR};
    use super::{RunOutcome, SimFlags, SimStats, Simulator, MCR_ADDR};

    fn load_src(src: &str) -> Simulator {
        load_src_with(src, SimFlags::default())
    }
    fn load_src_with(src: &str, flags: SimFlags) -> Simulator {
        let obj = assemble(src)
            .into_object()
            .unwrap_or_else(|e| panic!("failed to assemble:\n{e}"));

        let mut sim = Simulator::new(flags);
        sim.load_obj_file(&obj);
        sim
    }

    #[test]
    fn test_arith() {
        let mut sim = load_src("
            .orig x3000
            AND R0, R0, #0
            ADD R0, R0, #15
            ADD R1, R0, R0
            AND R2, R1, #-2
            NOT R3, R2
            ADD R4, R3, #1
            HALT
            .end
        ");
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(result.steps, 7);
        assert_eq!(sim.reg_file[R0], 15);
        assert_eq!(sim.reg_file[R1], 30);
        assert_eq!(sim.reg_file[R2], 30);
        assert_eq!(sim.reg_file[R3], !30);
        assert_eq!(sim.reg_file[R4] as i16, -30);
        assert!(sim.snapshot().n());
    }

    #[test]
    fn test_overflow_wraps() {
        let mut sim = load_src("
            .orig x3000
            LD R0, BIG
            ADD R0, R0, #1
            HALT
            BIG .fill x7FFF
            .end
        ");
        sim.run(100);
        assert_eq!(sim.reg_file[R0], 0x8000);
        assert_eq!(sim.cc(), 0b100);
    }

    #[test]
    fn test_cc_one_hot() {
        let mut sim = load_src("
            .orig x3000
            AND R0, R0, #0
            ADD R0, R0, #1
            ADD R0, R0, #-2
            LEA R1, #0
            HALT
            .end
        ");
        let mut seen = vec![];
        while sim.step() {
            seen.push(sim.cc());
        }
        assert_eq!(seen, [0b010, 0b001, 0b100, 0b001]);
    }

    #[test]
    fn test_branches() {
        let mut sim = load_src("
            .orig x3000
            AND R0, R0, #0
            ADD R0, R0, #3
            LOOP ADD R0, R0, #-1
            BRp LOOP
            BRn NEVER
            HALT
            NEVER ADD R5, R5, #1
            HALT
            .end
        ");
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(sim.reg_file[R5], 0);

        let stats = sim.stats();
        assert_eq!(stats.branches_taken, 2);
        assert_eq!(stats.branches_not_taken, 2);
    }

    #[test]
    fn test_nop_never_branches() {
        let mut sim = load_src(".orig x3000\nNOP\nHALT\n.end");
        sim.run(10);
        assert_eq!(sim.stats().branches_not_taken, 1);
        assert_eq!(sim.stats().branches_taken, 0);
    }

    #[test]
    fn test_memory_ops() {
        let mut sim = load_src("
            .orig x3000
            LD R0, VAL
            LDI R1, PTR
            LEA R2, VAL
            LDR R3, R2, #1
            ST R0, OUT1
            STI R0, PTR
            STR R0, R2, #3
            HALT
            VAL .fill #-5
            PTR .fill x4000
            OUT1 .blkw 1
            OUT2 .blkw 1
            .end
        ");
        sim.write_mem_raw(0x4000, 0x1234);
        let result = sim.run(100);
        assert!(result.completed());

        assert_eq!(sim.reg_file[R0] as i16, -5);
        assert_eq!(sim.reg_file[R1], 0x1234);
        assert_eq!(sim.reg_file[R2], 0x3008);
        assert_eq!(sim.reg_file[R3], 0x4000);
        assert_eq!(sim.read_mem_raw(0x300A) as i16, -5);
        assert_eq!(sim.read_mem_raw(0x4000) as i16, -5);
        assert_eq!(sim.read_mem_raw(0x300B) as i16, -5);

        assert_eq!(sim.stats(), SimStats {
            instructions_executed: 8,
            // LD + LDI (2) + LDR + STI
            memory_reads: 5,
            // ST + STI + STR
            memory_writes: 3,
            branches_taken: 0,
            branches_not_taken: 0,
        });
    }

    #[test]
    fn test_subroutines() {
        let mut sim = load_src("
            .orig x3000
            JSR SUB
            LEA R1, SUB2
            JSRR R1
            HALT
            SUB ADD R0, R0, #1
            RET
            SUB2 ADD R0, R0, #2
            RET
            .end
        ");
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(sim.reg_file[R0], 3);
        assert_eq!(sim.reg_file[R7], 0x3003);
    }

    #[test]
    fn test_jsrr_r7() {
        // JSRR R7 links before jumping, so it lands on the next instruction.
        let mut sim = load_src("
            .orig x3000
            LEA R7, TARGET
            JSRR R7
            ADD R1, R1, #1
            HALT
            TARGET ADD R0, R0, #7
            HALT
            .end
        ");
        assert!(sim.run(100).completed());
        assert_eq!(sim.reg_file[R0], 0);
        assert_eq!(sim.reg_file[R1], 1);
        assert_eq!(sim.reg_file[R7], 0x3002);
    }

    #[test]
    fn test_inert_opcodes() {
        let mut sim = Simulator::default();
        sim.load(0x3000, &[0x8000, 0xD123, 0xF025]);
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(result.steps, 3);
    }

    #[test]
    fn test_unknown_trap_is_noop() {
        let mut sim = Simulator::default();
        sim.load(0x3000, &[0xF0FF, 0xF025]);
        assert!(sim.run(100).completed());
        assert_eq!(sim.pc, 0x3002);
    }

    #[test]
    fn test_output_traps() {
        let mut sim = load_src("
            .orig x3000
            LD R0, CHAR
            OUT
            LEA R0, STR
            PUTS
            LEA R0, PACKED
            PUTSP
            HALT
            CHAR .fill x3E
            STR .stringz \"ab\\n\"
            PACKED .fill x6463
            .fill x0065
            .fill #0
            .end
        ");
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(sim.output(), ">ab\ncde");
        // LD + 3 chars + terminator
        assert_eq!(sim.stats().memory_reads, 5);

        assert_eq!(sim.take_output(), ">ab\ncde");
        assert_eq!(sim.output(), "");
    }

    #[test]
    fn test_puts_uncounted() {
        let flags = SimFlags { count_stringout_reads: false, ..Default::default() };
        let mut sim = load_src_with(".orig x3000\nLEA R0, S\nPUTS\nHALT\nS .stringz \"abc\"\n.end", flags);
        sim.run(100);
        assert_eq!(sim.output(), "abc");
        assert_eq!(sim.stats().memory_reads, 0);
    }

    #[test]
    fn test_getc_waits() {
        let mut sim = load_src("
            .orig x3000
            GETC
            ADD R1, R0, #0
            HALT
            .end
        ");
        let result = sim.run(100);
        assert!(result.waiting_for_input());
        assert_eq!(result.steps, 0);
        assert_eq!(sim.pc, 0x3000);
        assert_eq!(sim.stats().instructions_executed, 0);
        assert!(!sim.step());

        sim.push_input(b'A');
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(result.steps, 3);
        assert_eq!(sim.reg_file[R1], 0x41);
        assert_eq!(sim.output(), ""); // GETC does not echo
    }

    #[test]
    fn test_in_echoes() {
        let mut sim = load_src(".orig x3000\nIN\nIN\nHALT\n.end");
        sim.push_input_str("xy");
        assert!(sim.run(100).completed());
        assert_eq!(sim.output(), "xy");

        let flags = SimFlags { echo_input: false, ..Default::default() };
        let mut sim = load_src_with(".orig x3000\nIN\nHALT\n.end", flags);
        sim.push_input(b'x');
        assert!(sim.run(100).completed());
        assert_eq!(sim.output(), "");
        assert_eq!(sim.reg_file[R0], u16::from(b'x'));
    }

    #[test]
    fn test_supplier() {
        let mut sim = load_src(".orig x3000\nGETC\nGETC\nHALT\n.end");
        let (tx, input) = ChannelInput::pair();
        sim.set_input_supplier(input);

        tx.send(b'1').unwrap();
        let result = sim.run(100);
        assert!(result.waiting_for_input());
        assert_eq!(result.steps, 1);
        assert_eq!(sim.reg_file[R0], u16::from(b'1'));

        // The supplier is polled again when the run resumes.
        tx.send(b'2').unwrap();
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(sim.reg_file[R0], u16::from(b'2'));
    }

    #[test]
    fn test_empty_supplier_waits() {
        let mut sim = load_src(".orig x3000\nGETC\nHALT\n.end");
        sim.reg_file[R0] = 0x1234;
        sim.set_input_supplier(|| None);

        let result = sim.run(100);
        assert_eq!(result.outcome, RunOutcome::WaitingForInput);
        assert_eq!(result.steps, 0);
        assert_eq!(sim.pc, 0x3000);
        assert_eq!(sim.reg_file[R0], 0x1234);

        sim.push_input(b'k');
        assert!(sim.run(100).completed());
        assert_eq!(sim.reg_file[R0], u16::from(b'k'));
    }

    #[test]
    fn test_mmio_polling() {
        let mut sim = load_src("
            .orig x3000
            POLL LDI R1, KBSR_P
            BRzp POLL
            LDI R0, KBDR_P
            WAIT LDI R1, DSR_P
            BRzp WAIT
            STI R0, DDR_P
            HALT
            KBSR_P .fill xFE00
            KBDR_P .fill xFE02
            DSR_P  .fill xFE04
            DDR_P  .fill xFE06
            .end
        ");

        // Without input, this spins until the budget runs out.
        let result = sim.run(50);
        assert_eq!(result.outcome, RunOutcome::StepLimit);
        assert_eq!(result.steps, 50);

        sim.push_input(b'Z');
        assert!(sim.run(100).completed());
        assert_eq!(sim.output(), "Z");
        assert_eq!(sim.read_mem_raw(DDR), 0);
    }

    #[test]
    fn test_mmio_direct() {
        let mut sim = Simulator::default();
        assert_eq!(sim.read_mem(KBSR), 0);
        assert_eq!(sim.read_mem(KBDR), 0);
        sim.push_input(b'k');
        assert_eq!(sim.read_mem(KBSR), 0x8000);
        assert_eq!(sim.read_mem(KBDR), u16::from(b'k'));
        assert_eq!(sim.read_mem(KBSR), 0);

        sim.write_mem(0x4000, 5);
        assert_eq!(sim.read_mem(0x4000), 5);
        assert_eq!(sim.read_mem(0xFE10), 0);
    }

    #[test]
    fn test_mcr_halts() {
        let mut sim = load_src("
            .orig x3000
            AND R0, R0, #0
            STI R0, MCR_P
            ADD R1, R1, #1
            HALT
            MCR_P .fill xFFFE
            .end
        ");
        assert_eq!(sim.read_mem(MCR_ADDR), 0x8000);
        let result = sim.run(100);
        assert!(result.completed());
        assert_eq!(result.steps, 2);
        assert_eq!(sim.reg_file[R1], 0);
        assert_eq!(sim.read_mem(MCR_ADDR), 0);
    }

    #[test]
    fn test_step_limit() {
        let mut sim = load_src(".orig x3000\nLOOP BRnzp LOOP\n.end");
        let result = sim.run(1000);
        assert!(!result.completed());
        assert!(!result.waiting_for_input());
        assert_eq!(result.steps, 1000);
        assert_eq!(result.outcome.to_string(), "program did not halt (possible infinite loop)");

        let flags = SimFlags { max_steps: 10, ..Default::default() };
        let mut sim = load_src_with(".orig x3000\nLOOP BRnzp LOOP\n.end", flags);
        assert_eq!(sim.run_default().steps, 10);
    }

    #[test]
    fn test_halted_is_terminal() {
        let mut sim = load_src(".orig x3000\nHALT\n.end");
        assert!(sim.run(10).completed());
        assert!(!sim.step());
        let result = sim.run(10);
        assert!(result.completed());
        assert_eq!(result.steps, 0);
        assert!(sim.is_halted());
    }

    #[test]
    fn test_breakpoints() {
        let mut sim = load_src("
            .orig x3000
            AND R0, R0, #0
            LOOP ADD R0, R0, #1
            BRnzp LOOP
            .end
        ");
        sim.breakpoints.insert(Breakpoint::Reg { reg: R0, value: Comparator::Eq(5) });

        let result = sim.run(1000);
        assert_eq!(result.outcome, RunOutcome::Breakpoint);
        assert!(!result.completed());
        assert!(!result.waiting_for_input());
        assert_eq!(sim.reg_file[R0], 5);

        // Resuming makes progress past the breakpoint.
        sim.breakpoints.clear();
        sim.breakpoints.insert(Breakpoint::PC(0x3002));
        assert_eq!(sim.run(1000).outcome, RunOutcome::Breakpoint);
        assert_eq!(sim.pc, 0x3002);
        assert_eq!(sim.run(1000).outcome, RunOutcome::Breakpoint);
        assert_eq!(sim.reg_file[R0], 7);
    }

    #[test]
    fn test_load_at_keeps_pc() {
        let mut sim = Simulator::default();
        sim.load(0x3000, &[0x1021, 0xF025]);
        sim.load_at(0x4000, &[0xBEEF]);
        assert_eq!(sim.pc, 0x3000);
        assert_eq!(sim.read_mem_raw(0x3000), 0x1021);
        assert_eq!(sim.read_mem_raw(0x4000), 0xBEEF);
    }

    #[test]
    fn test_reset() {
        let mut sim = load_src(".orig x3000\nADD R0, R0, #1\nOUT\nGETC\n.end");
        sim.flags.echo_input = false;
        sim.breakpoints.insert(Breakpoint::PC(0x5000));
        sim.run(100);
        assert!(sim.is_waiting());

        sim.reset();
        let state = sim.snapshot();
        assert_eq!(state.regs, [0; 8]);
        assert_eq!(state.pc, 0x3000);
        assert!(state.z());
        assert!(!state.halted);
        assert!(!state.waiting_for_input);
        assert_eq!(state.output, "");
        assert_eq!(state.stats, SimStats::default());
        assert!(state.memory.as_slice().iter().all(|&w| w == 0));

        assert!(!sim.flags.echo_input);
        assert_eq!(sim.breakpoints.len(), 1);
    }

    #[test]
    fn test_reset_reproduces() {
        let src = "
            .orig x3000
            LD R0, N
            AND R1, R1, #0
            LOOP ADD R1, R1, R0
            ADD R0, R0, #-1
            BRp LOOP
            ST R1, N
            HALT
            N .fill #10
            .end
        ";
        let obj = assemble(src).into_object().unwrap();
        let mut sim = Simulator::default();

        let trace = |sim: &mut Simulator| {
            sim.reset();
            sim.load_obj_file(&obj);
            let mut pcs = vec![sim.pc];
            while sim.step() {
                pcs.push(sim.pc);
            }
            (pcs, sim.reg_file, sim.stats())
        };

        let first = trace(&mut sim);
        let second = trace(&mut sim);
        assert_eq!(first, second);
        assert_eq!(first.1[R1], 55);
    }
}
