//! Binary writer (`spec.md` 4.7): concatenates every emittable node's words
//! in program order and flattens them to little-endian bytes.

use crate::encode::{classify, emit};
use crate::error::Result;
use crate::int_util::narrow_to_u16;
use crate::ir::{DataItem, Node};
use crate::labels::LabelMap;

/// Emits one flat word stream from the resolved node list. Byte-ordering
/// (little-endian, low byte first) is applied by the caller when the words
/// are flushed to disk — this stage works in 16-bit words throughout, to
/// keep `spec.md` 9's "single conversion site" discipline for word vs.
/// byte addressing.
pub fn assemble_words(emittable: &[(Node, u16)], labels: &LabelMap) -> Result<Vec<u16>> {
    let mut words = Vec::new();
    for (node, _addr) in emittable {
        match node {
            Node::Instruction(instr) => {
                let classified = classify(instr)?;
                let (w0, w1) = emit(instr, classified, labels)?;
                words.push(w0);
                if let Some(w1) = w1 {
                    words.push(w1);
                }
            }
            Node::Data { line, items } => {
                for item in items {
                    match item {
                        DataItem::Number(n) => words.push(narrow_to_u16(*line, *n)?),
                        DataItem::String(s) => {
                            for ch in s.chars() {
                                words.push(ch as u16);
                            }
                        }
                    }
                }
            }
            _ => unreachable!("only Instruction and Data nodes survive label resolution"),
        }
    }
    Ok(words)
}

/// Flattens a word stream to little-endian bytes (`spec.md` 6: "a flat
/// stream of little-endian 16-bit words").
pub fn words_to_bytes(words: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 2);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}
