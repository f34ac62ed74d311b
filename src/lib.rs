//! An LC-3 assembler and simulator, built for teaching.
//!
//! This crate takes LC-3 assembly from source text to a running machine:
//! the source is parsed and assembled into an object file,
//! which can then be loaded into the simulator and run.
//!
//! # Usage
//!
//! To convert LC-3 source code to an object file, it must be assembled:
//! ```
//! use lc3_tutor::asm::{assemble, ObjectFile};
//!
//! let code = "
//!     .orig x3000
//!     AND R0, R0, #0
//!     ADD R0, R0, #7
//!     HALT
//!     .end
//! ";
//! let assembly = assemble(code);
//! assert!(assembly.errors.is_empty());
//! assert_eq!(assembly.symbols.len(), 0);
//!
//! let obj_file: ObjectFile = assembly.into_object().unwrap();
//! assert_eq!(obj_file.origin(), 0x3000);
//! assert_eq!(obj_file.words(), [0x5020, 0x1027, 0xF025]);
//! ```
//!
//! Assembly does not stop at the first error.
//! Every error found is reported along with its line:
//! ```
//! use lc3_tutor::asm::assemble;
//!
//! let assembly = assemble(".orig x3000\nADD R0, R0, #99\nLD R1, NOWHERE\n.end");
//! let lines: Vec<_> = assembly.errors.iter().map(|e| e.line).collect();
//! assert_eq!(lines, [2, 3]);
//! ```
//!
//! Once an object file has been created, it can be executed with the simulator:
//! ```
//! # use lc3_tutor::asm::assemble;
//! # let obj_file = assemble(".orig x3000\nAND R0, R0, #0\nADD R0, R0, #7\nHALT\n.end").into_object().unwrap();
//! use lc3_tutor::sim::Simulator;
//! use lc3_tutor::ast::reg_consts::R0;
//!
//! let mut simulator = Simulator::new(Default::default());
//! simulator.load_obj_file(&obj_file);
//!
//! let result = simulator.run_default();
//! assert!(result.completed());
//! assert_eq!(simulator.reg_file[R0], 7);
//! ```
//!
//! If more granularity is needed for simulation, the simulator can be stepped one
//! instruction at a time, and breakpoints can pause a run.
//! See the [`sim`] module for more details.
//!
//! For checking a program against a set of expected results,
//! see the [`grade`] module.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod sim;
pub mod grade;
pub mod err;
