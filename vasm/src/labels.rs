//! Label resolution (`spec.md` 4.4): a single forward pass over the fully
//! expanded node list, assigning each label a word address and recording
//! each node's own `pc`. Safe in one pass because instruction size depends
//! only on addressing mode, which depends only on operand kind — never on
//! a label's value (`spec.md` 9, "forward label references").

use crate::encode::{classify, size_in_words};
use crate::error::{Error, Result};
use crate::ir::{DataItem, Node};
use std::collections::HashMap;

pub type LabelMap = HashMap<String, u16>;

pub struct Resolved {
    pub labels: LabelMap,
    /// Parallel to the input node list with `Node::Label` entries removed
    /// (they carry no bytes); each remaining node is paired with its
    /// assigned word address.
    pub emittable: Vec<(Node, u16)>,
}

pub fn resolve(nodes: Vec<Node>) -> Result<Resolved> {
    let mut labels = LabelMap::new();
    let mut emittable = Vec::with_capacity(nodes.len());
    let mut pc: u32 = 0;

    for node in nodes {
        match &node {
            Node::Label { line, name } => {
                let key = name.to_uppercase();
                if labels.contains_key(&key) {
                    return Err(Error::Semantic {
                        line: *line,
                        message: format!("duplicate label \"{}\"", name),
                    });
                }
                let addr = u16::try_from(pc).map_err(|_| Error::Semantic {
                    line: *line,
                    message: "program exceeds the addressable word space".to_string(),
                })?;
                labels.insert(key, addr);
            }
            Node::Instruction(instr) => {
                let classified = classify(instr)?;
                let addr = u16::try_from(pc).map_err(|_| Error::Semantic {
                    line: instr.line,
                    message: "program exceeds the addressable word space".to_string(),
                })?;
                let size = size_in_words(&classified);
                emittable.push((node, addr));
                pc += size;
            }
            Node::Data { line, items } => {
                let addr = u16::try_from(pc).map_err(|_| Error::Semantic {
                    line: *line,
                    message: "program exceeds the addressable word space".to_string(),
                })?;
                let size = items.iter().map(item_word_count).sum::<u32>();
                emittable.push((node, addr));
                pc += size;
            }
            Node::Import { .. } | Node::MacroDef(_) | Node::MacroCall(_) => {
                unreachable!("import flattening and macro expansion must run before label resolution")
            }
        }
    }

    Ok(Resolved { labels, emittable })
}

fn item_word_count(item: &DataItem) -> u32 {
    match item {
        DataItem::Number(_) => 1,
        DataItem::String(s) => s.chars().count() as u32,
    }
}
