//! Assembler for the [vmcore](../vmcore/index.html) register machine.
//!
//! [`assemble_file`] reads a source file from disk and runs it through the
//! full pipeline `spec.md` 2 lays out: parse, build the IR, flatten
//! imports, expand macros, resolve labels, encode, and concatenate to a
//! flat byte stream. [`assemble`] runs the same pipeline over an in-memory
//! source string for callers (tests, the REPL's inline assembler) that
//! don't have a file on disk — imports are still resolved relative to the
//! directory `relative_to` names.
//!
//! # Assembly language
//!
//! A program is a sequence of statements, one per line, separated by
//! newlines; blank lines are allowed and `;` starts a comment that runs to
//! end of line.
//!
//! - **Label**: `NAME:` binds `NAME` to the word address of the following
//!   emittable node.
//! - **Instruction**: `MNEMONIC op1, op2` — see the opcode table in
//!   `vmcore::isa` for the full set and their operand forms.
//! - **Data**: `DATA item, item, ...` where each item is a number literal
//!   or a double-quoted string; each number becomes one word, each string
//!   character one word.
//! - **Import**: `IMPORT "path"` splices another file's statements in at
//!   that point. Importing the same file twice (directly or transitively)
//!   is a warning, not an error; the second occurrence is skipped.
//! - **Macro**: `MACRO name %a, %b ... END MACRO` defines a macro whose
//!   body is inlined, with `%a`/`%b` substituted by the actual operands,
//!   wherever `name op1, op2` is written afterward.
//!
//! Numbers are decimal (`123`), hex (`0x1F`), or binary (`b1010`).
//! Registers, mnemonics, and directive keywords are matched
//! case-insensitively. An operand in square brackets (`[A]`, `[0x8000]`)
//! marks an address rather than a value, as `GET`/`PUT` require.

mod binary;
mod encode;
mod error;
mod expr;
mod imports;
mod int_util;
mod ir;
mod labels;
mod macros;
mod parser;

#[cfg(test)]
mod test;

use parser::{Rule, VASMParser};
use pest::iterators::Pair;
use pest::{Parser, Span};
use std::path::Path;

pub use error::{Error, Result};

pub(crate) fn new_parser_error(span: Span, message: String) -> Error {
    Error::Syntax(pest::error::Error::new_from_span(
        pest::error::ErrorVariant::CustomError { message },
        span,
    ))
}

fn parse(input: &str) -> Result<Pair<Rule>> {
    Ok(VASMParser::parse(Rule::program, input)?.next().unwrap())
}

/// Runs the full pipeline over `source`, resolving any `IMPORT` directives
/// relative to `relative_to`'s parent directory.
pub fn assemble(source: &str, relative_to: &Path) -> Result<Vec<u8>> {
    let program = parse(source)?;
    let nodes = ir::build_nodes(program)?;
    let nodes = imports::flatten(relative_to, nodes)?;
    let nodes = macros::expand(nodes)?;
    let resolved = labels::resolve(nodes)?;
    let words = binary::assemble_words(&resolved.emittable, &resolved.labels)?;
    Ok(binary::words_to_bytes(&words))
}

/// Reads `path` and assembles it, as the `asm` binary does.
pub fn assemble_file(path: &Path) -> Result<Vec<u8>> {
    let source = std::fs::read_to_string(path)?;
    assemble(&source, path)
}
