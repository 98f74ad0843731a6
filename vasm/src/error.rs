//! Error kinds for the assembler, matching `spec.md` 7's error-kind table:
//! source syntax, semantic, immediate-out-of-range, macro, and import
//! errors are all fatal and abort the batch on the first one raised.

use crate::parser::Rule;
use pest::error::Error as PestError;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The parser rejected the input outright.
    Syntax(PestError<Rule>),
    /// Unknown mnemonic, bad operand arity/types, bad addressing mode,
    /// duplicate label, or unknown label.
    Semantic { line: u32, message: String },
    /// A `NUMBER` operand does not fit in 16 bits where one is required.
    ImmediateOutOfRange { line: u32, value: i64 },
    /// Unknown macro, arity mismatch, or a body node that isn't an
    /// instruction or data directive.
    Macro { line: u32, message: String },
    /// An imported file could not be read. Circular/duplicate imports are
    /// warnings, not errors (`spec.md` 4.2), so they never reach here.
    Import { message: String },
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(err) => write!(f, "{}", err),
            Error::Semantic { line, message } => write!(f, "line {}: {}", line, message),
            Error::ImmediateOutOfRange { line, value } => {
                write!(f, "line {}: immediate value {} does not fit in 16 bits", line, value)
            }
            Error::Macro { line, message } => write!(f, "line {}: {}", line, message),
            Error::Import { message } => write!(f, "{}", message),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<PestError<Rule>> for Error {
    fn from(err: PestError<Rule>) -> Error {
        Error::Syntax(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
