//! Error interface for this crate.
//!
//! Every diagnostic this crate raises ([`LexErr`], [`ParseErr`], [`AsmErr`], [`OffsetNewErr`])
//! implements [`Error`], which adds an optional source line and an optional help message
//! on top of [`std::error::Error`].

use std::borrow::Cow;

pub use crate::asm::{AsmErr, AsmErrKind, AsmErrs};
pub use crate::ast::OffsetNewErr;
pub use crate::parse::lex::LexErr;
pub use crate::parse::{ParseErr, ParseErrKind};

/// Unified error interface for all errors in this crate.
pub trait Error: std::error::Error {
    /// The 1-based source line this error was raised on, if it is tied to one.
    fn line(&self) -> Option<usize> {
        None
    }

    /// A clarifying message to help aid someone in how to fix the message.
    fn help(&self) -> Option<Cow<str>>;
}

/// Renders an error together with its help message (if any) in a multi-line form.
///
/// ```
/// # use lc3_tutor::err::{report, LexErr};
/// let msg = report(&LexErr::InvalidReg);
/// assert_eq!(msg, "invalid register\n  help: this must be R0-R7");
/// ```
pub fn report<E: Error + ?Sized>(err: &E) -> String {
    let mut out = match err.line() {
        Some(line) => format!("line {line}: {err}"),
        None => err.to_string(),
    };
    if let Some(help) = err.help() {
        out.push_str("\n  help: ");
        out.push_str(&help);
    }
    out
}
