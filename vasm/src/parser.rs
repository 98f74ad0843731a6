//! The pest-generated parser. Kept in its own module, as the teacher's
//! `vasm` does, so `lib.rs` only ever imports `Rule`/`VASMParser` from here.

use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct VASMParser;
