//! Numeric literal parsing: decimal, `0x` hex, and `b`-prefixed binary
//! (`spec.md` 3.3). Kept as its own module the way the teacher splits
//! literal-parsing helpers out of the main IR walk.

use crate::error::{Error, Result};
use crate::new_parser_error;
use crate::parser::Rule;
use pest::iterators::Pair;

/// Parses a `number` token into a signed 64-bit value (wide enough to hold
/// an intermediate result of a constant expression before it is narrowed
/// to 16 bits by the caller).
pub fn process_number(pair: Pair<Rule>) -> Result<i64> {
    let text = pair.as_str();
    let lower = text.to_ascii_lowercase();

    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix('b') {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    i64::from_str_radix(digits, radix)
        .map_err(|err| new_parser_error(pair.as_span(), format!("invalid number literal \"{}\": {}", text, err)))
}

/// Narrows a constant-expression result to an unsigned 16-bit word,
/// rejecting anything that doesn't fit (`spec.md` 7: "Immediate out of
/// range").
pub fn narrow_to_u16(line: u32, value: i64) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::ImmediateOutOfRange { line, value })
}
