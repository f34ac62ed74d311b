//! Checking a program against test cases.
//!
//! A [`TestCase`] describes one run of a program: the input it gets,
//! memory to set up beforehand, and what the output, memory and registers
//! should look like once it halts. [`grade`] assembles a program once,
//! runs it fresh for every case, and reports a [`TestReport`] per case.
//!
//! ```
//! use lc3_tutor::grade::{grade, TestCase};
//! use lc3_tutor::ast::reg_consts::R1;
//!
//! let src = "
//!     .orig x3000
//!     LDI R1, IN_P
//!     ADD R1, R1, R1
//!     STI R1, OUT_P
//!     HALT
//!     IN_P  .fill x6000
//!     OUT_P .fill x6001
//!     .end
//! ";
//! let cases = [
//!     TestCase::new("doubles 21")
//!         .preload(0x6000, 21)
//!         .check_mem(0x6001, 42)
//!         .check_reg(R1, 42),
//!     TestCase::new("doubles -4")
//!         .preload(0x6000, -4)
//!         .check_mem(0x6001, -8),
//! ];
//!
//! let reports = grade(src, &cases);
//! assert!(reports.iter().all(|r| r.passed));
//! ```

use std::fmt::Write;

use crate::asm::assemble;
use crate::ast::Reg;
use crate::sim::Simulator;

/// The step budget of each graded run.
pub const GRADE_STEPS: u64 = 100_000;

/// The error attached to a run which did not halt.
pub const DID_NOT_HALT: &str = "Program did not halt (possible infinite loop)";

/// One run of a program, and what it should produce.
///
/// Values given for memory and registers are masked to 16 bits,
/// so they may be written as negative numbers.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct TestCase {
    /// What this case checks.
    pub description: String,
    /// Characters available to the program's input traps.
    pub input: String,
    /// The expected console output.
    ///
    /// Leading and trailing whitespace is ignored.
    /// If empty, the output is not checked.
    pub expected_output: String,
    /// Memory values to write before running, as `(address, value)`.
    pub preload_memory: Vec<(u16, i32)>,
    /// Memory values to check after running, as `(address, value)`.
    pub check_memory: Vec<(u16, i32)>,
    /// Register values to check after running, as `(register, value)`.
    pub check_registers: Vec<(Reg, i32)>,
}

impl TestCase {
    /// Creates a test case which checks nothing but halting.
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Default::default() }
    }
    /// Sets the input.
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }
    /// Sets the expected output.
    pub fn expect_output(mut self, output: impl Into<String>) -> Self {
        self.expected_output = output.into();
        self
    }
    /// Adds a memory value to write before running.
    pub fn preload(mut self, addr: u16, value: i32) -> Self {
        self.preload_memory.push((addr, value));
        self
    }
    /// Adds a memory value to check after running.
    pub fn check_mem(mut self, addr: u16, value: i32) -> Self {
        self.check_memory.push((addr, value));
        self
    }
    /// Adds a register value to check after running.
    pub fn check_reg(mut self, reg: Reg, value: i32) -> Self {
        self.check_registers.push((reg, value));
        self
    }

    /// A summary of everything this case expects.
    ///
    /// ```
    /// # use lc3_tutor::grade::TestCase;
    /// # use lc3_tutor::ast::reg_consts::R0;
    /// let case = TestCase::new("").expect_output("ok").check_mem(0x6000, 5).check_reg(R0, -1);
    /// assert_eq!(case.expected_summary(), "ok | mem[x6000]=5 | R0=-1");
    /// ```
    pub fn expected_summary(&self) -> String {
        let mut parts = vec![];
        if !self.expected_output.is_empty() {
            parts.push(self.expected_output.clone());
        }
        if !self.check_memory.is_empty() {
            let mems: Vec<_> = self.check_memory.iter()
                .map(|(addr, value)| format!("mem[x{addr:04X}]={value}"))
                .collect();
            parts.push(mems.join(", "));
        }
        if !self.check_registers.is_empty() {
            let regs: Vec<_> = self.check_registers.iter()
                .map(|(reg, value)| format!("{reg}={value}"))
                .collect();
            parts.push(regs.join(", "));
        }
        parts.join(" | ")
    }
}

/// The outcome of one [`TestCase`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TestReport {
    /// The case's description.
    pub description: String,
    /// Whether the case passed.
    pub passed: bool,
    /// A summary of what was expected (see [`TestCase::expected_summary`]).
    pub expected: String,
    /// The program's output, followed by a note for each mismatched memory or register value.
    pub actual: String,
    /// Why the program could not be checked, if it couldn't
    /// (assembly errors, or not halting).
    pub error: Option<String>,
}

/// Grades a program against every test case.
///
/// If the program fails to assemble, every case fails with the assembly errors,
/// one `Line N: message` per line.
pub fn grade(src: &str, cases: &[TestCase]) -> Vec<TestReport> {
    let obj = match assemble(src).into_object() {
        Ok(obj) => obj,
        Err(errs) => {
            let error = errs.as_slice().iter()
                .map(|e| format!("Line {}: {e}", e.line))
                .collect::<Vec<_>>()
                .join("\n");

            return cases.iter()
                .map(|case| TestReport {
                    description: case.description.clone(),
                    passed: false,
                    expected: case.expected_summary(),
                    actual: String::new(),
                    error: Some(error.clone()),
                })
                .collect();
        }
    };

    cases.iter()
        .map(|case| {
            let mut sim = Simulator::default();
            sim.load_obj_file(&obj);
            for &(addr, value) in &case.preload_memory {
                sim.write_mem_raw(addr, value as u16);
            }
            sim.push_input_str(&case.input);

            let result = sim.run(GRADE_STEPS);
            let mut passed = result.completed();
            let mut actual = sim.output().to_string();

            if !case.expected_output.is_empty() && sim.output().trim() != case.expected_output.trim() {
                passed = false;
            }
            for &(addr, value) in &case.check_memory {
                let found = sim.read_mem_raw(addr);
                if found != value as u16 {
                    passed = false;
                    // writing to a String cannot fail
                    let _ = write!(actual, " (mem[x{addr:04X}] = {}, expected {value})", found as i16);
                }
            }
            for &(reg, value) in &case.check_registers {
                let found = sim.reg_file[reg];
                if found != value as u16 {
                    passed = false;
                    let _ = write!(actual, " ({reg} = {}, expected {value})", found as i16);
                }
            }

            TestReport {
                description: case.description.clone(),
                passed,
                expected: case.expected_summary(),
                actual: actual.trim().to_string(),
                error: (!result.completed()).then(|| DID_NOT_HALT.to_string()),
            }
        })
        .collect()
}
