//! Parsing assembly source code into per-line records.
//!
//! This module converts source text into [`ParsedLine`]s.
//! Each [`ParsedLine`] holds an optional label, an optional operation
//! (an instruction mnemonic or a directive), and the line's operands.
//! The lines are then consumed by the assembler ([`crate::asm`]).
//!
//! Parsing is tolerant: a bad token is reported as a [`ParseErr`] and dropped,
//! and the rest of its line is still parsed.
//!
//! ```
//! use lc3_tutor::parse::{parse_lines, Op, Operand};
//! use lc3_tutor::parse::lex::Opcode;
//!
//! let (lines, errs) = parse_lines("LOOP ADD R0, R0, #-1 ; decrement\n     BRp LOOP");
//! assert!(errs.is_empty());
//! assert_eq!(lines[0].label.as_deref(), Some("LOOP"));
//! assert_eq!(lines[0].op, Some(Op::Instr(Opcode::ADD)));
//! assert_eq!(lines[0].operands.len(), 3);
//! assert_eq!(lines[1].operands, [Operand::Label("LOOP".to_string())]);
//! ```
pub mod lex;

use std::borrow::Cow;

use logos::Logos;

use crate::ast::Reg;
use lex::{Ident, LexErr, Opcode, Token};

/// An assembler directive.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum DirectiveKind {
    /// `.ORIG addr`: sets the address of the following code.
    Orig,
    /// `.END`: ends the program. Later lines are ignored.
    End,
    /// `.FILL value`: one word holding a numeral or a label's address.
    Fill,
    /// `.BLKW n`: reserves `n` zeroed words.
    Blkw,
    /// `.STRINGZ "str"`: a null-terminated string, one character per word.
    Stringz,
}
impl DirectiveKind {
    /// Every directive, in the order they are listed in this enum.
    pub const ALL: [DirectiveKind; 5] = [Self::Orig, Self::End, Self::Fill, Self::Blkw, Self::Stringz];

    /// Looks up a directive by name, ignoring case (the leading dot must not be included).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// The name of this directive, without its leading dot.
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Orig    => "ORIG",
            DirectiveKind::End     => "END",
            DirectiveKind::Fill    => "FILL",
            DirectiveKind::Blkw    => "BLKW",
            DirectiveKind::Stringz => "STRINGZ",
        }
    }
}
impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".{}", self.name())
    }
}

/// The operation of a line.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Op {
    /// A known instruction mnemonic.
    Instr(Opcode),
    /// A known directive.
    Directive(DirectiveKind),
    /// A directive that doesn't exist (e.g., `.WORD`). The leading dot is not included.
    UnknownDirective(String),
    /// An identifier in mnemonic position which is not a known mnemonic (e.g., `ADDD R0, R0, #1`).
    Unknown(String),
}
impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Instr(op) => op.fmt(f),
            Op::Directive(d) => d.fmt(f),
            Op::UnknownDirective(d) => write!(f, ".{d}"),
            Op::Unknown(s) => f.write_str(s),
        }
    }
}

/// An operand of an instruction or directive.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operand {
    /// A register (`R0`-`R7`)
    Reg(Reg),
    /// A numeral. Unsigned literals span `0..=65535` and signed literals span `-32768..=32767`.
    Num(i32),
    /// A label reference, in its original casing.
    Label(String),
    /// A string literal, with escapes already applied.
    Str(String),
}
impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Reg(r) => r.fmt(f),
            Operand::Num(n) => write!(f, "#{n}"),
            Operand::Label(l) => f.write_str(l),
            Operand::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// One non-empty line of source code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParsedLine {
    /// The 1-based line number this line appears on.
    pub line_no: usize,
    /// The label defined on this line, if any.
    pub label: Option<String>,
    /// The operation of this line. This is `None` for label-only lines.
    pub op: Option<Op>,
    /// The operands of the operation.
    pub operands: Vec<Operand>,
}

/// Kinds of errors raised while parsing.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ParseErrKind {
    /// A token could not be lexed.
    Lex(LexErr),
    /// A line started with something that is neither a label nor an operation.
    ExpectedOp(String),
    /// A colon appeared somewhere other than after a label.
    UnexpectedColon,
}

impl ParseErrKind {
    /// A clarifying message to help fix this error.
    pub fn help(&self) -> Option<Cow<str>> {
        match self {
            ParseErrKind::Lex(e) => crate::err::Error::help(e),
            ParseErrKind::ExpectedOp(_) => Some("a line consists of an optional label, then an instruction or directive".into()),
            ParseErrKind::UnexpectedColon => Some("colons can only appear directly after a label".into()),
        }
    }
}
impl std::fmt::Display for ParseErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrKind::Lex(e) => e.fmt(f),
            ParseErrKind::ExpectedOp(tok) => write!(f, "expected instruction or directive, found {tok}"),
            ParseErrKind::UnexpectedColon => f.write_str("unexpected colon"),
        }
    }
}

/// An error raised while parsing, attributed to a source line.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ParseErr {
    /// The 1-based source line.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrKind,
}
impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
impl std::error::Error for ParseErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrKind::Lex(e) => Some(e),
            _ => None,
        }
    }
}
impl crate::err::Error for ParseErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn help(&self) -> Option<Cow<str>> {
        self.kind.help()
    }
}

/// Parses source code into lines.
///
/// Blank and comment-only lines are skipped.
/// All errors are collected, and lines with errors are still returned (without the bad tokens).
pub fn parse_lines(src: &str) -> (Vec<ParsedLine>, Vec<ParseErr>) {
    let mut lines = vec![];
    let mut errors = vec![];

    let mut line_no = 1;
    let mut tokens: Vec<(Token, &str)> = vec![];
    let mut lexer = Token::lexer(src);

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::NewLine) => {
                lines.extend(parse_line(line_no, &tokens, &mut errors));
                tokens.clear();
                line_no += 1;
            },
            Ok(Token::Comment) => {},
            Ok(token) => tokens.push((token, lexer.slice())),
            Err(e) => errors.push(ParseErr { line: line_no, kind: ParseErrKind::Lex(e) }),
        }
    }
    lines.extend(parse_line(line_no, &tokens, &mut errors));

    (lines, errors)
}

/// Parses the tokens of one line. Returns `None` if the line is empty.
fn parse_line(line_no: usize, tokens: &[(Token, &str)], errors: &mut Vec<ParseErr>) -> Option<ParsedLine> {
    let mut rest = tokens;
    let mut label = None;
    let mut op = None;

    match rest {
        [] => return None,
        // LABEL: ..., or a mnemonic used as a label (rejected later as reserved)
        [(Token::Ident(_) | Token::Reg(_), name), (Token::Colon, _), tail @ ..] => {
            label = Some(name.to_string());
            rest = tail;
        },
        [(first @ (Token::Ident(Ident::Label(_)) | Token::Reg(_)), name), tail @ ..] => match tail.first() {
            None | Some((Token::Ident(_) | Token::Directive(_), _)) => {
                label = Some(name.to_string());
                rest = tail;
            },
            // followed by an operand, so it must be a misspelled mnemonic
            Some(_) if matches!(first, Token::Ident(_)) => {
                op = Some(Op::Unknown(name.to_string()));
                rest = tail;
            },
            Some(_) => {},
        },
        _ => {},
    }

    if op.is_none() {
        match rest.split_first() {
            Some(((Token::Ident(Ident::Opcode(opcode)), _), tail)) => {
                op = Some(Op::Instr(*opcode));
                rest = tail;
            },
            Some(((Token::Ident(Ident::Label(name)), _), tail)) => {
                op = Some(Op::Unknown(name.clone()));
                rest = tail;
            },
            Some(((Token::Directive(name), _), tail)) => {
                op = Some(match DirectiveKind::from_name(name) {
                    Some(d) => Op::Directive(d),
                    None    => Op::UnknownDirective(name.clone()),
                });
                rest = tail;
            },
            Some(((_, slice), _)) => {
                errors.push(ParseErr { line: line_no, kind: ParseErrKind::ExpectedOp(slice.to_string()) });
                rest = &[];
            },
            None => {},
        }
    }

    let mut operands = vec![];
    for (token, _) in rest {
        let operand = match token {
            Token::Unsigned(n) => Operand::Num(i32::from(*n)),
            Token::Signed(n) => Operand::Num(i32::from(*n)),
            // Reg tokens are always 0-7, see lex_reg
            Token::Reg(r) => match Reg::new(*r) {
                Some(r) => Operand::Reg(r),
                None => continue,
            },
            Token::Ident(id) => Operand::Label(id.to_string()),
            Token::Directive(d) => Operand::Label(format!(".{d}")),
            Token::String(s) => Operand::Str(s.clone()),
            Token::Colon => {
                errors.push(ParseErr { line: line_no, kind: ParseErrKind::UnexpectedColon });
                continue;
            },
            Token::Comma | Token::Comment | Token::NewLine => continue,
        };
        operands.push(operand);
    }

    Some(ParsedLine { line_no, label, op, operands })
}
