//! Interactive debugger/emulator for the [vmcore](../vmcore/index.html)
//! register machine.
//!
//! Loads a flat little-endian word image (`spec.md` 6: no header, no
//! relocations, no symbol table) and executes it under a line-oriented
//! command prompt. [`debugger::Debugger`] holds the machine plus
//! breakpoints and owns every command's actual behaviour; [`repl`] is the
//! thin stdin/stdout loop wrapped around it.

pub mod debugger;
pub mod disasm;
pub mod repl;

#[cfg(test)]
mod test;

pub use debugger::{Command, Debugger, RunReport};
