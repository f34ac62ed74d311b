//! Assembling LC-3 source code into machine words.
//!
//! Assembly happens in two passes over the [`ParsedLine`]s of a source:
//! 1. The first pass assigns an address to every line and builds the [`SymbolTable`].
//! 2. The second pass encodes every line into words, resolving label operands
//!     against the symbol table and recording a [`SourceMap`].
//!
//! The second pass only runs if the first pass (and parsing) raised no errors.
//! Within a pass, every line is processed, so that all of the mistakes in a source
//! are reported at once.
//!
//! The assembler module notably consists of:
//! - [`assemble`]: the main function, which produces an [`Assembly`]
//! - [`SymbolTable`]: the label-to-address mapping built by the first pass
//! - [`SourceMap`]: the address-to-line mapping built by the second pass
//! - [`ObjectFile`]: a successfully assembled program, which can be loaded into the simulator
//!
//! # Example
//! ```
//! use lc3_tutor::asm::assemble;
//!
//! let asm = assemble("
//!     .orig x3000
//!     LABEL: HALT
//!     .end
//! ");
//! assert!(asm.errors.is_empty());
//! assert_eq!(asm.symbols.lookup_label("label"), Some(0x3000));
//!
//! let obj = asm.into_object().unwrap();
//! assert_eq!(obj.origin(), 0x3000);
//! assert_eq!(obj.words(), [0xF025]);
//! ```

pub mod disasm;
pub mod encoding;

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::ast::reg_consts::R7;
use crate::ast::sim::SimInstr;
use crate::ast::{trap_vects, CondCode, IOffset, ImmOrReg, Reg, TrapVect8};
use crate::parse::lex::Opcode;
use crate::parse::{parse_lines, DirectiveKind, Op, Operand, ParseErr, ParseErrKind, ParsedLine};

/// The origin used when a source does not set one.
pub const DEFAULT_ORIGIN: u16 = 0x3000;

/// Assembles source code.
///
/// This never fails outright. Any errors are collected (ordered by line)
/// into [`Assembly::errors`]. Use [`Assembly::into_object`] to get an
/// [`ObjectFile`] only if assembly succeeded.
pub fn assemble(src: &str) -> Assembly {
    let (lines, parse_errs) = parse_lines(src);
    let mut errors: Vec<AsmErr> = parse_errs.into_iter().map(AsmErr::from).collect();

    let pass1 = first_pass(&lines, &mut errors);
    let (words, source_map) = match errors.is_empty() {
        true  => second_pass(&pass1, &mut errors),
        false => (vec![], SourceMap::default()),
    };
    errors.sort_by_key(|e| e.line);

    Assembly {
        origin: pass1.origin,
        words,
        symbols: pass1.sym,
        source_map,
        errors,
    }
}

/// Kinds of errors that can occur from assembling given assembly code.
///
/// See [`AsmErr`] for this error type with its line included.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum AsmErrKind {
    /// Line could not be parsed (pass 1).
    Parse(ParseErrKind),
    /// Label or instruction appeared before the `.ORIG` directive (pass 1).
    BeforeOrig,
    /// There was more than one `.ORIG` directive (pass 1).
    MultipleOrig,
    /// Directive does not exist (pass 1).
    UnknownDirective(String),
    /// Label was defined more than once (pass 1).
    DuplicateLabel(String),
    /// Label has the name of a mnemonic or register (pass 1).
    ReservedLabel(String),
    /// Program runs past the end of memory (pass 1).
    WrapsMemory,
    /// Mnemonic does not exist, optionally with a similarly spelled mnemonic (pass 2).
    UnknownInstr {
        /// The name as written.
        name: String,
        /// The closest valid mnemonic, if there is one close enough.
        suggestion: Option<&'static str>
    },
    /// Wrong number of operands for an instruction or directive.
    OperandCount {
        /// The instruction or directive.
        op: String,
        /// The expected number of operands.
        expected: usize,
        /// The number of operands given.
        found: usize
    },
    /// A register operand was expected but something else was given (pass 2).
    InvalidReg(String),
    /// An operand has the wrong type for its position.
    InvalidOperand {
        /// The instruction or directive.
        op: String,
        /// The offending operand.
        operand: String
    },
    /// Immediate value does not fit its field (pass 2).
    ImmTooBig {
        /// The value as written.
        value: i32,
        /// The field width.
        bits: u32
    },
    /// Literal offset does not fit its field (pass 2).
    OffsetTooBig {
        /// The value as written.
        value: i32,
        /// The field width.
        bits: u32
    },
    /// Label is too far from the instruction to be reached by its offset field (pass 2).
    LabelTooFar {
        /// The label.
        label: String,
        /// The offset from the incremented PC to the label.
        offset: i32,
        /// The field width.
        bits: u32
    },
    /// Trap vector does not fit in 8 bits (pass 2).
    TrapVectTooBig(i32),
    /// Label has no address (pass 2).
    UnknownLabel(String),
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e)            => e.fmt(f),
            Self::BeforeOrig          => f.write_str("instruction before .ORIG"),
            Self::MultipleOrig        => f.write_str("multiple .ORIG directives"),
            Self::UnknownDirective(d) => write!(f, "unknown directive: .{d}"),
            Self::DuplicateLabel(l)   => write!(f, "duplicate label: {l}"),
            Self::ReservedLabel(l)    => write!(f, "label '{l}' conflicts with a reserved name"),
            Self::WrapsMemory         => f.write_str("program runs past the end of memory"),
            Self::UnknownInstr { name, suggestion } => {
                write!(f, "unknown instruction: {name}")?;
                match suggestion {
                    Some(s) => write!(f, " (did you mean '{s}'?)"),
                    None => Ok(()),
                }
            },
            Self::OperandCount { op, expected, found } => write!(f, "expected {expected} operand(s) for {op}, found {found}"),
            Self::InvalidReg(op)      => write!(f, "invalid register in {op}"),
            Self::InvalidOperand { op, operand } => write!(f, "invalid operand for {op}: {operand}"),
            Self::ImmTooBig { value, bits } => write!(f, "immediate value {value} doesn't fit in {bits} bits"),
            Self::OffsetTooBig { value, bits } => write!(f, "offset {value} doesn't fit in {bits} bits"),
            Self::LabelTooFar { label, offset, bits } => write!(f, "label \"{label}\" is too far away (offset {offset} doesn't fit in {bits} bits)"),
            Self::TrapVectTooBig(v)   => write!(f, "trap vector {v} doesn't fit in 8 bits"),
            Self::UnknownLabel(l)     => write!(f, "unknown label: {l}"),
        }
    }
}

/// Error from assembling given assembly code.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct AsmErr {
    /// The 1-based source line of the error.
    pub line: usize,
    /// The kind of error.
    pub kind: AsmErrKind
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new(line: usize, kind: AsmErrKind) -> Self {
        AsmErr { line, kind }
    }
}
impl From<ParseErr> for AsmErr {
    fn from(value: ParseErr) -> Self {
        AsmErr::new(value.line, AsmErrKind::Parse(value.kind))
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
impl std::error::Error for AsmErr {}
impl crate::err::Error for AsmErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn help(&self) -> Option<Cow<str>> {
        match &self.kind {
            AsmErrKind::Parse(e)            => e.help(),
            AsmErrKind::BeforeOrig          => Some("start the program with a .ORIG directive (e.g., .ORIG x3000)".into()),
            AsmErrKind::MultipleOrig        => Some("a program has a single .ORIG; assemble other regions separately".into()),
            AsmErrKind::UnknownDirective(_) => Some("the directives are .ORIG, .END, .FILL, .BLKW, and .STRINGZ".into()),
            AsmErrKind::DuplicateLabel(_)   => Some("labels must be unique within a file (ignoring case), try renaming one of the labels".into()),
            AsmErrKind::ReservedLabel(_)    => Some("labels cannot be instruction names or registers".into()),
            AsmErrKind::WrapsMemory         => Some("user code typically starts at x3000 and is short enough to not wrap memory".into()),
            AsmErrKind::UnknownInstr { .. } => None,
            AsmErrKind::OperandCount { .. } => None,
            AsmErrKind::InvalidReg(_)       => Some("registers are R0-R7".into()),
            AsmErrKind::InvalidOperand { .. } => None,
            &AsmErrKind::ImmTooBig { bits, .. } | &AsmErrKind::OffsetTooBig { bits, .. } | &AsmErrKind::LabelTooFar { bits, .. } => {
                Some(format!("the range for a signed {bits}-bit integer is [{}, {}]", (-1) << (bits - 1), (1 << (bits - 1)) - 1).into())
            },
            AsmErrKind::TrapVectTooBig(_)   => Some("trap vectors are in the range [0, 255]".into()),
            AsmErrKind::UnknownLabel(_)     => Some("try adding this label before an instruction or directive".into()),
        }
    }
}

/// The errors from a failed assembly, ordered by line.
///
/// This is never empty.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AsmErrs(Vec<AsmErr>);
impl AsmErrs {
    /// Gets the errors.
    pub fn as_slice(&self) -> &[AsmErr] {
        &self.0
    }
    /// Gets the errors as a vector.
    pub fn into_vec(self) -> Vec<AsmErr> {
        self.0
    }
}
impl std::fmt::Display for AsmErrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i != 0 { writeln!(f)?; }
            write!(f, "line {}: {e}", e.line)?;
        }
        Ok(())
    }
}
impl std::error::Error for AsmErrs {}

/// The symbol table created in the first assembler pass,
/// mapping labels to memory addresses.
///
/// Labels are case-insensitive (`LOOP` and `loop` are the same label).
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct SymbolTable {
    /// A mapping from uppercase label to address.
    label_map: HashMap<String, u16>
}
impl SymbolTable {
    /// Adds a label, failing if it is already defined or is a reserved name.
    fn insert(&mut self, label: &str, addr: u16) -> Result<(), AsmErrKind> {
        match self.label_map.entry(label.to_uppercase()) {
            Entry::Occupied(_) => Err(AsmErrKind::DuplicateLabel(label.to_string())),
            Entry::Vacant(_) if is_reserved(label) => Err(AsmErrKind::ReservedLabel(label.to_string())),
            Entry::Vacant(e) => {
                e.insert(addr);
                Ok(())
            }
        }
    }

    /// Gets the memory address of a given label (if it exists).
    ///
    /// ## Example
    /// ```
    /// use lc3_tutor::asm::assemble;
    ///
    /// let src = "
    ///     .orig x3000
    ///     LOOP:
    ///         ADD R0, R0, #1
    ///         BR LOOP
    ///     LOOP2:
    ///         ADD R0, R0, #2
    ///         BR LOOP2
    ///     .end
    /// ";
    /// let sym = assemble(src).symbols;
    /// assert_eq!(sym.lookup_label("LOOP"), Some(0x3000));
    /// assert_eq!(sym.lookup_label("loop2"), Some(0x3002));
    /// assert_eq!(sym.lookup_label("LOOP_DE_LOOP"), None);
    /// ```
    pub fn lookup_label(&self, label: &str) -> Option<u16> {
        self.label_map.get(&label.to_uppercase()).copied()
    }

    /// Gets the label at a given memory address (if it exists).
    ///
    /// Labels are stored in uppercase. If multiple labels share the address,
    /// the alphabetically first is returned.
    pub fn rev_lookup_label(&self, addr: u16) -> Option<&str> {
        self.label_map.iter()
            .filter(|&(_, &a)| a == addr)
            .map(|(label, _)| label.as_str())
            .min()
    }

    /// Gets an iterable of the mapping from labels to addresses.
    pub fn label_iter(&self) -> impl Iterator<Item=(&str, u16)> + '_ {
        self.label_map.iter()
            .map(|(label, &addr)| (label.as_str(), addr))
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.label_map.len()
    }
    /// Whether there are no labels.
    pub fn is_empty(&self) -> bool {
        self.label_map.is_empty()
    }
}

fn is_reserved(label: &str) -> bool {
    Opcode::from_name(label).is_some()
        || matches!(label.as_bytes(), [b'R' | b'r', b'0'..=b'7'])
}

/// A mapping from memory addresses to the source lines that produced them.
///
/// Every word emitted by the assembler has an entry
/// (so a `.STRINGZ` line maps every character's address to the line).
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct SourceMap(BTreeMap<u16, usize>);
impl SourceMap {
    /// Gets the source line which produced the word at the given address.
    pub fn line_of(&self, addr: u16) -> Option<usize> {
        self.0.get(&addr).copied()
    }
    /// Gets the first address produced by the given source line.
    pub fn addr_of(&self, line: usize) -> Option<u16> {
        self.0.iter()
            .filter(|&(_, &l)| l == line)
            .map(|(&addr, _)| addr)
            .min()
    }
    /// Iterates over every `(address, line)` pair, in order of address.
    pub fn iter(&self) -> impl Iterator<Item=(u16, usize)> + '_ {
        self.0.iter().map(|(&addr, &line)| (addr, line))
    }
    /// The number of mapped addresses.
    pub fn len(&self) -> usize {
        self.0.len()
    }
    /// Whether no addresses are mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The full result of assembling a source.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Assembly {
    /// The address of the first word.
    pub origin: u16,
    /// The assembled words, placed contiguously from the origin.
    ///
    /// This is empty if the first pass failed. If the second pass failed,
    /// the words are present, but lines with errors are encoded as `0`.
    pub words: Vec<u16>,
    /// The labels defined by the source.
    pub symbols: SymbolTable,
    /// The source line of each emitted word.
    pub source_map: SourceMap,
    /// All errors raised, ordered by line.
    pub errors: Vec<AsmErr>
}
impl Assembly {
    /// Whether assembly succeeded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Gets the object file of this assembly, or the errors if assembly failed.
    pub fn into_object(self) -> Result<ObjectFile, AsmErrs> {
        match self.errors.is_empty() {
            true  => Ok(ObjectFile::new(self.origin, self.words)),
            false => Err(AsmErrs(self.errors)),
        }
    }
}

/// An object file.
///
/// This is the final product after assembly source code is fully assembled:
/// a run of words and the address they start at.
/// This can be loaded in the simulator to run the assembled code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ObjectFile {
    origin: u16,
    words: Vec<u16>
}
impl ObjectFile {
    /// Creates an object file from its origin and words.
    pub fn new(origin: u16, words: Vec<u16>) -> Self {
        ObjectFile { origin, words }
    }
    /// The address of the first word.
    pub fn origin(&self) -> u16 {
        self.origin
    }
    /// The words of this object file.
    pub fn words(&self) -> &[u16] {
        &self.words
    }
    /// Iterates over every `(address, word)` pair (addresses wrap at the end of memory).
    pub fn iter(&self) -> impl Iterator<Item=(u16, u16)> + '_ {
        (0..).map(|i: u16| self.origin.wrapping_add(i))
            .zip(self.words.iter().copied())
    }
}

/// The contents of a line after the first pass.
#[derive(Debug, Clone, Copy)]
enum Body<'a> {
    Instr(Opcode, &'a [Operand]),
    Unknown(&'a str),
    Fill(&'a [Operand]),
    Blkw(u16),
    Stringz(&'a str),
}
impl Body<'_> {
    /// How many words this line takes up in memory.
    fn word_len(&self) -> u32 {
        match self {
            Body::Instr(..) | Body::Unknown(_) | Body::Fill(_) => 1,
            Body::Blkw(n) => u32::from(*n),
            Body::Stringz(s) => s.chars().count() as u32 + 1,
        }
    }
}

/// A line which has been assigned an address.
#[derive(Debug)]
struct Placed<'a> {
    line_no: usize,
    addr: u16,
    body: Body<'a>
}

struct FirstPass<'a> {
    origin: u16,
    stmts: Vec<Placed<'a>>,
    sym: SymbolTable,
}

/// The first assembler pass.
///
/// This assigns an address to each line, binds labels,
/// and validates the operands that determine a line's size.
fn first_pass<'a>(lines: &'a [ParsedLine], errors: &mut Vec<AsmErr>) -> FirstPass<'a> {
    let mut origin = None;
    let mut sym = SymbolTable::default();
    let mut stmts = vec![];
    let mut pending: Vec<(usize, &str)> = vec![];
    // Kept wider than u16 to detect running off the end of memory.
    let mut lc = u32::from(DEFAULT_ORIGIN);
    let mut wrapped = false;

    for line in lines {
        let mut report = |kind: AsmErrKind| errors.push(AsmErr::new(line.line_no, kind));

        let body = match &line.op {
            Some(Op::Directive(DirectiveKind::End)) => break,
            Some(Op::Directive(DirectiveKind::Orig)) => {
                if origin.is_some() {
                    report(AsmErrKind::MultipleOrig);
                    continue;
                }

                let start = orig_addr(&line.operands).unwrap_or_else(|e| {
                    report(e);
                    DEFAULT_ORIGIN
                });
                origin = Some(start);
                lc = u32::from(start);
                if let Some(label) = &line.label {
                    sym.insert(label, start).unwrap_or_else(&mut report);
                }
                for (line_no, label) in pending.drain(..) {
                    if let Err(e) = sym.insert(label, start) {
                        errors.push(AsmErr::new(line_no, e));
                    }
                }
                continue;
            },
            // labels on their own before .ORIG name the origin
            None if origin.is_none() => {
                if let Some(label) = &line.label {
                    pending.push((line.line_no, label.as_str()));
                }
                continue;
            },
            _ if origin.is_none() => {
                report(AsmErrKind::BeforeOrig);
                continue;
            },
            None => None,
            Some(Op::UnknownDirective(name)) => {
                report(AsmErrKind::UnknownDirective(name.clone()));
                None
            },
            Some(Op::Instr(op)) => Some(Body::Instr(*op, &line.operands)),
            Some(Op::Unknown(name)) => Some(Body::Unknown(name)),
            Some(Op::Directive(DirectiveKind::Fill)) => Some(Body::Fill(&line.operands)),
            Some(Op::Directive(DirectiveKind::Blkw)) => blkw_len(&line.operands)
                .map(Body::Blkw)
                .map_err(&mut report)
                .ok(),
            Some(Op::Directive(DirectiveKind::Stringz)) => stringz_contents(&line.operands)
                .map(Body::Stringz)
                .map_err(&mut report)
                .ok(),
        };

        // lc is at most 0x10000 here (anything past that was already reported)
        let addr = lc as u16;
        if let Some(label) = &line.label {
            sym.insert(label, addr).unwrap_or_else(&mut report);
        }
        if let Some(body) = body {
            lc += body.word_len();
            if lc > 0x10000 && !wrapped {
                wrapped = true;
                report(AsmErrKind::WrapsMemory);
            }
            stmts.push(Placed { line_no: line.line_no, addr, body });
        }
    }

    FirstPass {
        origin: origin.unwrap_or(DEFAULT_ORIGIN),
        stmts,
        sym,
    }
}

fn single_operand<'a>(op: &str, operands: &'a [Operand]) -> Result<&'a Operand, AsmErrKind> {
    match operands {
        [operand] => Ok(operand),
        _ => Err(AsmErrKind::OperandCount { op: op.to_string(), expected: 1, found: operands.len() }),
    }
}
fn invalid_operand(op: impl std::fmt::Display, operand: &Operand) -> AsmErrKind {
    AsmErrKind::InvalidOperand { op: op.to_string(), operand: operand.to_string() }
}
fn orig_addr(operands: &[Operand]) -> Result<u16, AsmErrKind> {
    let operand = single_operand(".ORIG", operands)?;
    match operand {
        &Operand::Num(n) => u16::try_from(n).map_err(|_| invalid_operand(".ORIG", operand)),
        _ => Err(invalid_operand(".ORIG", operand)),
    }
}
fn blkw_len(operands: &[Operand]) -> Result<u16, AsmErrKind> {
    let operand = single_operand(".BLKW", operands)?;
    match operand {
        // .BLKW 0 still reserves a word
        &Operand::Num(n) => u16::try_from(n)
            .map(|n| n.max(1))
            .map_err(|_| invalid_operand(".BLKW", operand)),
        _ => Err(invalid_operand(".BLKW", operand)),
    }
}
fn stringz_contents(operands: &[Operand]) -> Result<&str, AsmErrKind> {
    let operand = single_operand(".STRINGZ", operands)?;
    match operand {
        Operand::Str(s) => Ok(s),
        _ => Err(invalid_operand(".STRINGZ", operand)),
    }
}

/// The second assembler pass.
///
/// This encodes every placed line into words.
/// Lines that fail to encode emit `0` for each of their words so that later addresses are unaffected.
fn second_pass(pass: &FirstPass<'_>, errors: &mut Vec<AsmErr>) -> (Vec<u16>, SourceMap) {
    let mut words = vec![];
    let mut source_map = SourceMap::default();

    for stmt in &pass.stmts {
        let mut report = |kind: AsmErrKind| errors.push(AsmErr::new(stmt.line_no, kind));
        let start = words.len();

        match stmt.body {
            Body::Instr(op, operands) => {
                let mut enc = InstrEncoder {
                    op,
                    operands,
                    pc: stmt.addr.wrapping_add(1),
                    sym: &pass.sym,
                    range_errs: vec![],
                };
                let result = enc.encode();
                enc.range_errs.into_iter().for_each(&mut report);

                let word = result.map(|instr| instr.encode())
                    .unwrap_or_else(|e| {
                        report(e);
                        0
                    });
                words.push(word);
            },
            Body::Unknown(name) => {
                report(AsmErrKind::UnknownInstr { name: name.to_string(), suggestion: suggest_mnemonic(name) });
                words.push(0);
            },
            Body::Fill(operands) => {
                let value = fill_value(operands, &pass.sym).unwrap_or_else(|e| {
                    report(e);
                    0
                });
                words.push(value);
            },
            Body::Blkw(n) => words.extend(std::iter::repeat(0).take(usize::from(n))),
            Body::Stringz(s) => {
                words.extend(s.chars().map(|c| c as u16));
                words.push(0);
            },
        }

        for (i, _) in words[start..].iter().enumerate() {
            source_map.0.insert(stmt.addr.wrapping_add(i as u16), stmt.line_no);
        }
    }

    (words, source_map)
}

fn fill_value(operands: &[Operand], sym: &SymbolTable) -> Result<u16, AsmErrKind> {
    let operand = single_operand(".FILL", operands)?;
    match operand {
        // numerals always fit in [-32768, 65535], so this just reinterprets negatives
        &Operand::Num(n) => Ok(n as u16),
        Operand::Label(label) => sym.lookup_label(label)
            .ok_or_else(|| AsmErrKind::UnknownLabel(label.clone())),
        _ => Err(invalid_operand(".FILL", operand)),
    }
}

/// Encodes the operands of a single instruction.
struct InstrEncoder<'a> {
    op: Opcode,
    operands: &'a [Operand],
    /// The PC after this instruction is fetched, which PC offsets are relative to.
    pc: u16,
    sym: &'a SymbolTable,
    /// Values that did not fit their fields.
    /// These are reported, but the value is truncated and encoding continues.
    range_errs: Vec<AsmErrKind>,
}
impl<'a> InstrEncoder<'a> {
    fn encode(&mut self) -> Result<SimInstr, AsmErrKind> {
        use Opcode as O;

        let instr = match self.op {
            O::ADD | O::AND => {
                self.expect_operands(3)?;
                let (dr, sr1) = (self.reg(0)?, self.reg(1)?);
                let sr2 = self.imm_or_reg(2)?;
                match self.op {
                    O::ADD => SimInstr::ADD(dr, sr1, sr2),
                    _      => SimInstr::AND(dr, sr1, sr2),
                }
            },
            O::NOT => {
                self.expect_operands(2)?;
                SimInstr::NOT(self.reg(0)?, self.reg(1)?)
            },
            O::BR | O::BRN | O::BRZ | O::BRP | O::BRNZ | O::BRNP | O::BRZP | O::BRNZP => {
                self.expect_operands(1)?;
                SimInstr::BR(br_cc(self.op), self.pc_offset(0)?)
            },
            O::NOP => {
                self.expect_operands(0)?;
                SimInstr::BR(0b000, IOffset::new_trunc(0))
            },
            O::JMP => {
                self.expect_operands(1)?;
                SimInstr::JMP(self.reg(0)?)
            },
            O::RET => {
                self.expect_operands(0)?;
                SimInstr::JMP(R7)
            },
            O::JSR => {
                self.expect_operands(1)?;
                SimInstr::JSR(ImmOrReg::Imm(self.pc_offset(0)?))
            },
            O::JSRR => {
                self.expect_operands(1)?;
                SimInstr::JSR(ImmOrReg::Reg(self.reg(0)?))
            },
            O::LD | O::LDI | O::LEA | O::ST | O::STI => {
                self.expect_operands(2)?;
                let r = self.reg(0)?;
                let off = self.pc_offset(1)?;
                match self.op {
                    O::LD  => SimInstr::LD(r, off),
                    O::LDI => SimInstr::LDI(r, off),
                    O::LEA => SimInstr::LEA(r, off),
                    O::ST  => SimInstr::ST(r, off),
                    _      => SimInstr::STI(r, off),
                }
            },
            O::LDR | O::STR => {
                self.expect_operands(3)?;
                let (r, br) = (self.reg(0)?, self.reg(1)?);
                let off = self.offset6(2)?;
                match self.op {
                    O::LDR => SimInstr::LDR(r, br, off),
                    _      => SimInstr::STR(r, br, off),
                }
            },
            O::RTI => {
                self.expect_operands(0)?;
                SimInstr::RTI
            },
            O::TRAP => {
                self.expect_operands(1)?;
                SimInstr::TRAP(self.trap_vect(0)?)
            },
            O::GETC | O::OUT | O::PUTS | O::IN | O::PUTSP | O::HALT => {
                self.expect_operands(0)?;
                let vect = match self.op {
                    O::GETC  => trap_vects::GETC,
                    O::OUT   => trap_vects::OUT,
                    O::PUTS  => trap_vects::PUTS,
                    O::IN    => trap_vects::IN,
                    O::PUTSP => trap_vects::PUTSP,
                    _        => trap_vects::HALT,
                };
                SimInstr::TRAP(TrapVect8::new_trunc(vect))
            },
        };

        Ok(instr)
    }

    fn expect_operands(&self, expected: usize) -> Result<(), AsmErrKind> {
        match self.operands.len() == expected {
            true  => Ok(()),
            false => Err(AsmErrKind::OperandCount { op: self.op.to_string(), expected, found: self.operands.len() }),
        }
    }

    fn operand(&self, i: usize) -> Result<&'a Operand, AsmErrKind> {
        self.operands.get(i)
            .ok_or_else(|| AsmErrKind::OperandCount { op: self.op.to_string(), expected: i + 1, found: self.operands.len() })
    }

    fn reg(&self, i: usize) -> Result<Reg, AsmErrKind> {
        match self.operand(i)? {
            &Operand::Reg(r) => Ok(r),
            _ => Err(AsmErrKind::InvalidReg(self.op.to_string())),
        }
    }

    /// Fits a value into a signed N-bit field, recording an error and truncating if it doesn't fit.
    fn fit_signed<const N: u32>(&mut self, value: i32, err: impl FnOnce() -> AsmErrKind) -> IOffset<N> {
        i16::try_from(value).ok()
            .and_then(|v| IOffset::new(v).ok())
            .unwrap_or_else(|| {
                self.range_errs.push(err());
                IOffset::new_trunc(value as i16)
            })
    }

    fn imm_or_reg<const N: u32>(&mut self, i: usize) -> Result<ImmOrReg<N>, AsmErrKind> {
        match self.operand(i)? {
            &Operand::Reg(r) => Ok(ImmOrReg::Reg(r)),
            &Operand::Num(value) => Ok(ImmOrReg::Imm(self.fit_signed(value, || AsmErrKind::ImmTooBig { value, bits: N }))),
            operand => Err(invalid_operand(self.op, operand)),
        }
    }

    fn offset6(&mut self, i: usize) -> Result<IOffset<6>, AsmErrKind> {
        match self.operand(i)? {
            &Operand::Num(value) => Ok(self.fit_signed(value, || AsmErrKind::OffsetTooBig { value, bits: 6 })),
            operand => Err(invalid_operand(self.op, operand)),
        }
    }

    /// Resolves a PC-relative operand, which is either a literal offset or a label.
    fn pc_offset<const N: u32>(&mut self, i: usize) -> Result<IOffset<N>, AsmErrKind> {
        match self.operand(i)? {
            &Operand::Num(value) => Ok(self.fit_signed(value, || AsmErrKind::OffsetTooBig { value, bits: N })),
            Operand::Label(label) => {
                let label = label.clone();
                let addr = self.sym.lookup_label(&label)
                    .ok_or_else(|| AsmErrKind::UnknownLabel(label.clone()))?;

                let offset = i32::from(addr.wrapping_sub(self.pc) as i16);
                Ok(self.fit_signed(offset, || AsmErrKind::LabelTooFar { label, offset, bits: N }))
            },
            operand => Err(invalid_operand(self.op, operand)),
        }
    }

    fn trap_vect(&mut self, i: usize) -> Result<TrapVect8, AsmErrKind> {
        match self.operand(i)? {
            &Operand::Num(value) => {
                let vect = u16::try_from(value).ok()
                    .and_then(|v| TrapVect8::new(v).ok())
                    .unwrap_or_else(|| {
                        self.range_errs.push(AsmErrKind::TrapVectTooBig(value));
                        TrapVect8::new_trunc(value as u16)
                    });
                Ok(vect)
            },
            operand => Err(invalid_operand(self.op, operand)),
        }
    }
}

/// The condition code of a `BR` variant.
fn br_cc(op: Opcode) -> CondCode {
    match op {
        Opcode::BRN  => 0b100,
        Opcode::BRZ  => 0b010,
        Opcode::BRP  => 0b001,
        Opcode::BRNZ => 0b110,
        Opcode::BRNP => 0b101,
        Opcode::BRZP => 0b011,
        _ => 0b111,
    }
}

/// Finds the mnemonic closest to a misspelled one (within an edit distance of 2).
fn suggest_mnemonic(name: &str) -> Option<&'static str> {
    let name = name.to_ascii_uppercase();
    Opcode::NAMES.iter()
        .map(|&mnemonic| (levenshtein(&name, mnemonic), mnemonic))
        .filter(|&(dist, _)| dist <= 2)
        .min_by_key(|&(dist, _)| dist)
        .map(|(_, mnemonic)| mnemonic)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut curr = Vec::with_capacity(b.len() + 1);
        curr.push(i + 1);
        for (j, &cb) in b.iter().enumerate() {
            let dist = match ca == cb {
                true  => prev[j],
                false => 1 + prev[j].min(prev[j + 1]).min(curr[j]),
            };
            curr.push(dist);
        }
        prev = curr;
    }

    prev[b.len()]
}
