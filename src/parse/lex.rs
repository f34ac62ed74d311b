//! Tokenizing LC-3 assembly.
//!
//! This module holds the tokens that characterize LC-3 assembly ([`Token`]).
//! The line parser ([`crate::parse`]) consumes these tokens and groups them
//! into per-line records.
//!
//! The module's key data structure is the [`Token`] enum,
//! which lists all of the tokens of LC-3 assembly.

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

/// A unit of information in LC3 source code.
#[derive(Debug, Logos, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t]+", error = LexErr)]
pub enum Token {
    // These regexes span over tokens that are technically invalid
    // (e.g., 23trst matches for unsigned even though it shouldn't).
    // The whole unit is collected and then validated by the callback,
    // so that `#12a` is one bad numeral instead of a numeral and a label.

    /// An unsigned numeric value (e.g., `9`, `#14`, `x7F`, `0x7F`, `b101`)
    #[regex(r"\d\w*", lex_unsigned_dec)]
    #[regex(r"#\d?\w*", lex_unsigned_dec)]
    #[regex(r"[Xx][\dA-Fa-f]\w*", lex_unsigned_hex)]
    #[regex(r"[Bb][01]\w*", lex_unsigned_bin)]
    Unsigned(u16),

    /// A signed numeric value (e.g., `-9`, `#-14`, `x-7F`)
    #[regex(r"-\w*", lex_signed_dec)]
    #[regex(r"#-\w*", lex_signed_dec)]
    #[regex(r"[Xx]-\w*", lex_signed_hex)]
    Signed(i16),

    /// A register value (i.e., `R0`-`R7`)
    #[regex(r"[Rr]\d+", lex_reg)]
    Reg(u8),

    /// An identifier.
    ///
    /// This can refer to either:
    /// - a label (e.g., `IF`, `WHILE`, `ENDIF`, `IF1`)
    /// - an instruction (e.g. `ADD`, `AND`, `NOT`)
    ///
    /// This token type is case-insensitive.
    #[regex(r"[A-Za-z_]\w*", lex_ident)]
    Ident(Ident),

    /// A directive (e.g., `.orig`, `.end`).
    ///
    /// The leading dot is not included.
    #[regex(r"\.[A-Za-z_]\w*", |lx| lx.slice()[1..].to_string())]
    Directive(String),

    /// A string literal (e.g., `"Hello!"`), with its escapes already applied.
    #[token(r#"""#, lex_str_literal)]
    String(String),

    /// A colon, which can optionally appear after labels
    #[token(":")]
    Colon,

    /// A comma, which delineate operands of an instruction
    #[token(",")]
    Comma,

    /// A comment, which starts with a semicolon and spans the remaining part of the line.
    #[regex(r";.*")]
    Comment,

    /// A new line
    #[regex(r"\r?\n")]
    NewLine
}

macro_rules! opcode_enum {
    ($($instr:ident),+) => {
        /// An instruction mnemonic.
        ///
        /// Mnemonics are matched case-insensitively (`add`, `Add` and `ADD` are all [`Opcode::ADD`]).
        /// This includes the trap aliases (`GETC`, `HALT`, etc.) and the `BR` variants.
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
        #[allow(clippy::upper_case_acronyms)]
        pub enum Opcode {
            $(
                #[allow(missing_docs)]
                $instr
            ),+
        }

        impl Opcode {
            /// The uppercase name of every mnemonic.
            pub const NAMES: &'static [&'static str] = &[$(stringify!($instr)),+];

            /// Looks up a mnemonic by name, ignoring case.
            pub fn from_name(s: &str) -> Option<Self> {
                match &*s.to_ascii_uppercase() {
                    $(stringify!($instr) => Some(Self::$instr),)+
                    _ => None
                }
            }

            /// The uppercase name of this mnemonic.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$instr => stringify!($instr)),+
                }
            }
        }

        impl std::fmt::Display for Opcode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
opcode_enum! {
    ADD, AND, NOT, BR, BRN, BRZ, BRP, BRNZ, BRNP, BRZP, BRNZP,
    LD, LDI, LDR, LEA, ST, STI, STR, JMP, JSR, JSRR, RET, RTI, NOP,
    TRAP, GETC, OUT, PUTS, IN, PUTSP, HALT
}

/// An identifier.
///
/// This is either a known instruction mnemonic or anything else
/// (which is presumed to be a label).
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Ident {
    /// A known mnemonic.
    Opcode(Opcode),
    /// Any other identifier. The original casing is kept.
    Label(String)
}
impl Ident {
    /// Classifies an identifier string.
    pub fn new(s: &str) -> Self {
        match Opcode::from_name(s) {
            Some(op) => Ident::Opcode(op),
            None     => Ident::Label(s.to_string()),
        }
    }
}
impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ident::Opcode(op) => op.fmt(f),
            Ident::Label(id)  => f.write_str(id),
        }
    }
}

/// Any errors raised in attempting to tokenize an input stream.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum LexErr {
    /// Numeric literal (unsigned dec, hex, and bin) cannot fit within the range of a u16
    DoesNotFitU16,
    /// Numeric literal (signed dec) cannot fit within the range of a i16
    DoesNotFitI16,
    /// Hex literal (starting with x) has invalid hex digits
    InvalidHex,
    /// Binary literal (starting with b) has invalid binary digits
    InvalidBin,
    /// Numeric literal could not be parsed as a decimal literal because it has invalid digits (i.e., not 0-9)
    InvalidNumeric,
    /// Hex literal (starting with x) doesn't have digits after it.
    InvalidHexEmpty,
    /// Numeric literal could not be parsed as a decimal literal because there are no digits in it (it's just # or #-)
    InvalidDecEmpty,
    /// Int parsing failed but the reason why is unknown
    UnknownIntErr,
    /// String literal is missing an end quotation mark.
    UnclosedStrLit,
    /// String literal is too long to be placed in memory.
    StrLitTooBig,
    /// Token had the format R\d, but \d isn't 0-7.
    InvalidReg,
    /// A symbol was used which is not allowed in LC3 assembly files
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::DoesNotFitU16   => f.write_str("numeric token does not fit 16-bit unsigned integer"),
            LexErr::DoesNotFitI16   => f.write_str("numeric token does not fit 16-bit signed integer"),
            LexErr::InvalidHex      => f.write_str("invalid hex literal"),
            LexErr::InvalidBin      => f.write_str("invalid binary literal"),
            LexErr::InvalidNumeric  => f.write_str("invalid decimal literal"),
            LexErr::InvalidHexEmpty => f.write_str("invalid hex literal"),
            LexErr::InvalidDecEmpty => f.write_str("invalid decimal literal"),
            LexErr::UnknownIntErr   => f.write_str("could not parse integer"),
            LexErr::UnclosedStrLit  => f.write_str("unclosed string literal"),
            LexErr::StrLitTooBig    => f.write_str("string literal is too large"),
            LexErr::InvalidReg      => f.write_str("invalid register"),
            LexErr::InvalidSymbol   => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::DoesNotFitU16    => Some(format!("the range for a 16-bit unsigned integer is [{}, {}]", u16::MIN, u16::MAX).into()),
            LexErr::DoesNotFitI16    => Some(format!("the range for a 16-bit signed integer is [{}, {}]", i16::MIN, i16::MAX).into()),
            LexErr::InvalidHex       => Some("a hex literal starts with 'x' and consists of 0-9, A-F".into()),
            LexErr::InvalidBin       => Some("a binary literal starts with 'b' and consists of 0 and 1".into()),
            LexErr::InvalidNumeric   => Some("a decimal literal only consists of digits 0-9".into()),
            LexErr::InvalidHexEmpty  => Some("there should be hex digits (0-9, A-F) here".into()),
            LexErr::InvalidDecEmpty  => Some("there should be digits (0-9) here".into()),
            LexErr::UnknownIntErr    => None,
            LexErr::UnclosedStrLit   => Some("add a quote to the end of the string literal".into()),
            LexErr::StrLitTooBig     => Some(format!("string literals are limited to at most {} characters", u16::MAX - 1).into()),
            LexErr::InvalidReg       => Some("this must be R0-R7".into()),
            LexErr::InvalidSymbol    => Some("this char does not occur in any token in LC-3 assembly".into()),
        }
    }
}
/// Helper that converts an int error kind to its corresponding LexErr, based on the provided inputs.
fn convert_int_error(
    e: &std::num::IntErrorKind,
    invalid_digits_err: LexErr,
    empty_err: LexErr,
    overflow_err: LexErr,
    src: &str
) -> LexErr {
    match e {
        IntErrorKind::Empty        => empty_err,
        IntErrorKind::InvalidDigit if src == "-" => empty_err,
        IntErrorKind::InvalidDigit => invalid_digits_err,
        IntErrorKind::PosOverflow  => overflow_err,
        IntErrorKind::NegOverflow  => overflow_err,
        _ => LexErr::UnknownIntErr,
    }
}
fn lex_unsigned_dec(lx: &Lexer<'_, Token>) -> Result<u16, LexErr> {
    let string = lx.slice().strip_prefix('#').unwrap_or(lx.slice());

    // C-style hex (0x3000) shares its leading digit with decimal literals.
    if let Some(hex) = string.strip_prefix("0x").or_else(|| string.strip_prefix("0X")) {
        return u16::from_str_radix(hex, 16)
            .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidHex, LexErr::InvalidHexEmpty, LexErr::DoesNotFitU16, hex));
    }

    string.parse::<u16>()
        .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidNumeric, LexErr::InvalidDecEmpty, LexErr::DoesNotFitU16, string))
}

fn lex_signed_dec(lx: &Lexer<'_, Token>) -> Result<i16, LexErr> {
    let string = lx.slice().strip_prefix('#').unwrap_or(lx.slice());

    string.parse::<i16>()
        .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidNumeric, LexErr::InvalidDecEmpty, LexErr::DoesNotFitI16, string))
}
fn lex_unsigned_hex(lx: &Lexer<'_, Token>) -> Result<u16, LexErr> {
    let hex = &lx.slice()[1..];

    u16::from_str_radix(hex, 16)
        .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidHex, LexErr::InvalidHexEmpty, LexErr::DoesNotFitU16, hex))
}
fn lex_signed_hex(lx: &Lexer<'_, Token>) -> Result<i16, LexErr> {
    let hex = &lx.slice()[1..];

    i16::from_str_radix(hex, 16)
        .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidHex, LexErr::InvalidHexEmpty, LexErr::DoesNotFitI16, hex))
}
fn lex_unsigned_bin(lx: &Lexer<'_, Token>) -> Result<u16, LexErr> {
    let bin = &lx.slice()[1..];

    u16::from_str_radix(bin, 2)
        .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidBin, LexErr::InvalidBin, LexErr::DoesNotFitU16, bin))
}
fn lex_reg(lx: &Lexer<'_, Token>) -> Result<u8, LexErr> {
    lx.slice()[1..].parse::<u8>().ok()
        .filter(|&r| r < 8)
        .ok_or(LexErr::InvalidReg)
}
fn lex_ident(lx: &Lexer<'_, Token>) -> Ident {
    Ident::new(lx.slice())
}
fn lex_str_literal(lx: &mut Lexer<'_, Token>) -> Result<String, LexErr> {
    let rem = lx.remainder();
    let mut buf = String::new();
    let mut chars = rem.char_indices();

    // Only a simple group of escapes are implemented.
    // Any other escape is kept as-is (backslash included).
    let closed_at = loop {
        match chars.next() {
            Some((i, '"')) => break Some(i),
            Some((_, '\r' | '\n')) | None => break None,
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n'))  => buf.push('\n'),
                Some((_, 't'))  => buf.push('\t'),
                Some((_, '\\')) => buf.push('\\'),
                Some((_, '"'))  => buf.push('"'),
                Some((_, '0'))  => buf.push('\0'),
                Some((_, '\r' | '\n')) | None => break None,
                Some((_, c)) => {
                    buf.push('\\');
                    buf.push(c);
                }
            },
            Some((_, c)) => buf.push(c),
        }
    };

    let Some(end) = closed_at else {
        // consume the rest of the line, but leave the line break for the next token
        let line_len = rem.find(['\r', '\n']).unwrap_or(rem.len());
        lx.bump(line_len);
        return Err(LexErr::UnclosedStrLit);
    };
    lx.bump(end + 1);

    match buf.chars().count() < usize::from(u16::MAX) {
        true  => Ok(buf),
        false => Err(LexErr::StrLitTooBig),
    }
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use super::{Ident, LexErr, Opcode, Token};

    fn label(s: &str) -> Token {
        Token::Ident(Ident::Label(s.to_string()))
    }
    fn directive(s: &str) -> Token {
        Token::Directive(s.to_string())
    }
    fn str_literal(s: &str) -> Token {
        Token::String(s.to_string())
    }

    #[test]
    fn test_numeric_dec_success() {
        let mut tokens = Token::lexer("0 123 456 789");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(123))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(456))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(789))));
        assert_eq!(tokens.next(), None);

        let mut tokens = Token::lexer("-123 #100 #-300");
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-123))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(100))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-300))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_hex_success() {
        let mut tokens = Token::lexer("x2110 xABCD X2110 Xabcd xA 0x3000 0XFE00");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0x2110))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0xABCD))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0x2110))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0xABCD))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0x000A))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0x3000))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0xFE00))));
        assert_eq!(tokens.next(), None);

        let mut tokens = Token::lexer("x-9 X-1234");
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-0x9))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-0x1234))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_bin() {
        let mut tokens = Token::lexer("b0 b101 B1111000011110000");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0b101))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0b1111000011110000))));
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("b102").next(), Some(Err(LexErr::InvalidBin)));
        assert_eq!(Token::lexer("b11110000111100001").next(), Some(Err(LexErr::DoesNotFitU16)));
        // not binary, just a label:
        assert_eq!(Token::lexer("BACK").next(), Some(Ok(label("BACK"))));
    }

    #[test]
    fn test_numeric_overflow() {
        let mut tokens = Token::lexer("32767 32768 -32768 65535 xFFFF x-8000");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(32767))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(32768))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-32768))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(65535))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0xFFFF))));
        assert_eq!(tokens.next(), Some(Ok(Token::Signed(-0x8000))));
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("65536").next(), Some(Err(LexErr::DoesNotFitU16)));
        assert_eq!(Token::lexer("-32769").next(), Some(Err(LexErr::DoesNotFitI16)));
        assert_eq!(Token::lexer("xABCDEF").next(), Some(Err(LexErr::DoesNotFitU16)));
        assert_eq!(Token::lexer("0x10000").next(), Some(Err(LexErr::DoesNotFitU16)));
        assert_eq!(Token::lexer("x-8001").next(), Some(Err(LexErr::DoesNotFitI16)));
    }

    #[test]
    fn test_numeric_invalid() {
        assert_eq!(Token::lexer("#Q").next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(Token::lexer("3Q").next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(Token::lexer("#12a").next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(Token::lexer("#").next(), Some(Err(LexErr::InvalidDecEmpty)));
        assert_eq!(Token::lexer("#-").next(), Some(Err(LexErr::InvalidDecEmpty)));
        assert_eq!(Token::lexer("x0Q").next(), Some(Err(LexErr::InvalidHex)));
        assert_eq!(Token::lexer("0xG1").next(), Some(Err(LexErr::InvalidHex)));
        assert_eq!(Token::lexer("x-").next(), Some(Err(LexErr::InvalidHexEmpty)));
    }

    #[test]
    fn test_regs() {
        let mut tokens = Token::lexer("R0 r1 R7");
        assert_eq!(tokens.next(), Some(Ok(Token::Reg(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Reg(1))));
        assert_eq!(tokens.next(), Some(Ok(Token::Reg(7))));
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("R8").next(), Some(Err(LexErr::InvalidReg)));
        assert_eq!(Token::lexer("R10").next(), Some(Err(LexErr::InvalidReg)));
        assert_eq!(Token::lexer("R1X").next(), Some(Ok(label("R1X"))));
    }

    #[test]
    fn test_str() {
        let mut tokens = Token::lexer(r#" " " "abc" "a;b" "" "#);
        assert_eq!(tokens.next(), Some(Ok(str_literal(" "))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("abc"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("a;b"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal(""))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_str_escape() {
        let mut tokens = Token::lexer(r#" "\n" "\t" "\\" "\"" "\0" "\e" "a\\" "#);
        assert_eq!(tokens.next(), Some(Ok(str_literal("\n"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\t"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\\"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\""))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\0"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\\e"))));
        assert_eq!(tokens.next(), Some(Ok(str_literal("a\\"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_str_big() {
        let large = "0".repeat(65534);
        assert_eq!(Token::lexer(&format!(r#""{large}""#)).next(), Some(Ok(str_literal(&large))));
        let large = "0".repeat(65535);
        assert_eq!(Token::lexer(&format!(r#""{large}""#)).next(), Some(Err(LexErr::StrLitTooBig)));
    }

    #[test]
    fn test_str_unclosed() {
        assert_eq!(Token::lexer(r#"""#).next(), Some(Err(LexErr::UnclosedStrLit)));

        // the line break after an unclosed string is still its own token
        let mut tokens = Token::lexer("\"abc\nHALT");
        assert_eq!(tokens.next(), Some(Err(LexErr::UnclosedStrLit)));
        assert_eq!(tokens.next(), Some(Ok(Token::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Token::Ident(Ident::Opcode(Opcode::HALT)))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_keywords_labels() {
        for &name in Opcode::NAMES {
            let token = Token::lexer(name).next();
            assert!(
                matches!(token, Some(Ok(Token::Ident(Ident::Opcode(_))))),
                "Expected {name} to be keyword"
            );
        }

        // Case insensitivity
        for token in Token::lexer("ADD ADd AdD Add aDD aDd adD add") {
            assert_eq!(token, Ok(Token::Ident(Ident::Opcode(Opcode::ADD))));
        }
        assert_eq!(Token::lexer("brNZ").next(), Some(Ok(Token::Ident(Ident::Opcode(Opcode::BRNZ)))));

        let mut tokens = Token::lexer("ARST gmneio _ x");
        assert_eq!(tokens.next(), Some(Ok(label("ARST"))));
        assert_eq!(tokens.next(), Some(Ok(label("gmneio"))));
        assert_eq!(tokens.next(), Some(Ok(label("_"))));
        assert_eq!(tokens.next(), Some(Ok(label("x"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_directive() {
        let mut tokens = Token::lexer(".fill .ORIG .stringz ._");
        assert_eq!(tokens.next(), Some(Ok(directive("fill"))));
        assert_eq!(tokens.next(), Some(Ok(directive("ORIG"))));
        assert_eq!(tokens.next(), Some(Ok(directive("stringz"))));
        assert_eq!(tokens.next(), Some(Ok(directive("_"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_punct() {
        let mut tokens = Token::lexer("0\r\n1,2:3 ;; abcdef \"not a string\"\n4");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(1))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(2))));
        assert_eq!(tokens.next(), Some(Ok(Token::Colon)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(3))));
        assert_eq!(tokens.next(), Some(Ok(Token::Comment)));
        assert_eq!(tokens.next(), Some(Ok(Token::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(4))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_invalid_symbol() {
        for c in ['!', '$', '%', '&', '(', ')', '*', '+', '/', '<', '=', '>', '?', '@', '[', ']', '^', '`', '{', '|', '}', '~'] {
            let string = c.to_string();
            assert_eq!(
                Token::lexer(&string).next(),
                Some(Err(LexErr::InvalidSymbol)),
                "Expected {string:?} to be an invalid symbol"
            );
        }
    }
}
