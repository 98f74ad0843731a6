//! Macro expansion (`spec.md` 4.1/4.3): macro definitions are pulled out of
//! the node stream into a registry keyed by name, then every `MacroCall` is
//! replaced in-place by a clone of its definition's body with formal
//! parameters substituted for actual operands. Iteration runs in reverse so
//! splicing a call's expansion never invalidates the index of an
//! as-yet-unprocessed call earlier in the stream.

use crate::error::{Error, Result};
use crate::ir::{InstructionNode, MacroCall, MacroDef, Node, Operand};
use std::collections::HashMap;

pub fn expand(nodes: Vec<Node>) -> Result<Vec<Node>> {
    let mut registry: HashMap<String, MacroDef> = HashMap::new();
    let mut stream: Vec<Node> = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Node::MacroDef(def) => {
                let key = def.name.to_uppercase();
                if registry.contains_key(&key) {
                    log::warn!(
                        "macro \"{}\" redefined at line {}, keeping the first definition",
                        def.name, def.line
                    );
                } else {
                    validate_body(&def)?;
                    registry.insert(key, def);
                }
            }
            other => stream.push(other),
        }
    }

    let mut i = stream.len();
    while i > 0 {
        i -= 1;
        if matches!(stream[i], Node::MacroCall(_)) {
            let call = match &stream[i] {
                Node::MacroCall(call) => call.clone(),
                _ => unreachable!(),
            };
            let body = expand_call(&call, &registry)?;
            stream.splice(i..=i, body);
        }
    }

    Ok(stream)
}

fn validate_body(def: &MacroDef) -> Result<()> {
    for node in &def.body {
        match node {
            Node::Instruction(_) | Node::Data { .. } => {}
            Node::MacroCall(call) => {
                return Err(Error::Macro {
                    line: call.line,
                    message: format!("macro \"{}\" calls another macro; nested calls are rejected", def.name),
                })
            }
            _ => {
                return Err(Error::Macro {
                    line: node.line(),
                    message: format!("macro \"{}\" body may only contain instructions and data", def.name),
                })
            }
        }
    }
    Ok(())
}

fn expand_call(call: &MacroCall, registry: &HashMap<String, MacroDef>) -> Result<Vec<Node>> {
    let key = call.name.to_uppercase();
    let def = registry.get(&key).ok_or_else(|| Error::Macro {
        line: call.line,
        message: format!("unknown macro \"{}\"", call.name),
    })?;

    if def.params.len() != call.args.len() {
        return Err(Error::Macro {
            line: call.line,
            message: format!(
                "macro \"{}\" takes {} argument(s), got {}",
                call.name, def.params.len(), call.args.len()
            ),
        });
    }

    let substitution: HashMap<&str, &Operand> =
        def.params.iter().map(|p| p.as_str()).zip(call.args.iter()).collect();

    def.body
        .iter()
        .map(|node| substitute_node(node, &substitution, call.line))
        .collect()
}

fn substitute_node(node: &Node, substitution: &HashMap<&str, &Operand>, call_line: u32) -> Result<Node> {
    match node {
        Node::Instruction(instr) => {
            let operands = instr
                .operands
                .iter()
                .map(|op| substitute_operand(op, substitution, call_line))
                .collect::<Result<Vec<_>>>()?;
            Ok(Node::Instruction(InstructionNode {
                line: instr.line,
                mnemonic: instr.mnemonic.clone(),
                operands,
            }))
        }
        Node::Data { line, items } => Ok(Node::Data { line: *line, items: items.clone() }),
        _ => unreachable!("validate_body already rejected non-instruction/data bodies"),
    }
}

fn substitute_operand(
    operand: &Operand,
    substitution: &HashMap<&str, &Operand>,
    call_line: u32,
) -> Result<Operand> {
    match operand {
        Operand::MacroArg(name) => substitution
            .get(name.as_str())
            .map(|op| (*op).clone())
            .ok_or_else(|| Error::Macro {
                line: call_line,
                message: format!("unknown macro parameter \"%{}\"", name),
            }),
        other => Ok(other.clone()),
    }
}
