//! Classifies each `InstructionNode` into a concrete `(opcode, mode)` pair
//! and, after label resolution, emits its final words through
//! `vmcore::isa::encode` — the single encoding table the emulator's
//! decoder also consults (`spec.md` 9).
//!
//! Classification happens in two phases because of a deliberate ordering
//! constraint: addressing mode depends only on operand *kind* (register vs.
//! number vs. label), never on a label's resolved value, so
//! [`classify`] can run during label resolution (to learn instruction
//! sizes) before any label has an address, and again during emission.

use crate::error::{Error, Result};
use crate::ir::{InstructionNode, Operand};
use crate::labels::LabelMap;
use vmcore::isa::{self, AddressingMode as Mode, Instruction as WireInstruction};
use vmcore::{Opcode, RegisterId};

/// What supplies the 16-bit immediate word, if any — a literal value or a
/// label awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImmSource {
    Number(i64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub opcode: Opcode,
    pub mode: Mode,
    pub ra: u8,
    pub rb: u8,
    pub imm: Option<ImmSource>,
}

fn semantic(line: u32, message: impl Into<String>) -> Error {
    Error::Semantic { line, message: message.into() }
}

fn mnemonic(instr: &InstructionNode) -> Result<Opcode> {
    Opcode::parse(&instr.mnemonic)
        .map_err(|_| semantic(instr.line, format!("unknown mnemonic \"{}\"", instr.mnemonic)))
}

fn arity(instr: &InstructionNode, n: usize) -> Result<()> {
    if instr.operands.len() != n {
        Err(semantic(
            instr.line,
            format!("{} requires {} operand(s), got {}", instr.mnemonic, n, instr.operands.len()),
        ))
    } else {
        Ok(())
    }
}

fn as_register(instr: &InstructionNode, op: &Operand) -> Result<RegisterId> {
    match op {
        Operand::Register(r) => Ok(*r),
        _ => Err(semantic(instr.line, format!("{} expects a register operand", instr.mnemonic))),
    }
}

fn as_value(instr: &InstructionNode, op: &Operand) -> Result<(bool, u8, Option<ImmSource>)> {
    match op {
        Operand::Register(r) => Ok((true, r.index(), None)),
        Operand::Number(n) => Ok((false, 0, Some(ImmSource::Number(*n)))),
        Operand::Label(l) => Ok((false, 0, Some(ImmSource::Label(l.clone())))),
        _ => Err(semantic(
            instr.line,
            format!("{} expects a register, number, or label operand", instr.mnemonic),
        )),
    }
}

fn as_bracketed(instr: &InstructionNode, op: &Operand) -> Result<(bool, u8, Option<ImmSource>)> {
    match op {
        Operand::BracketRegister(r) => Ok((true, r.index(), None)),
        Operand::BracketNumber(n) => Ok((false, 0, Some(ImmSource::Number(*n)))),
        Operand::BracketLabel(l) => Ok((false, 0, Some(ImmSource::Label(l.clone())))),
        _ => Err(semantic(
            instr.line,
            format!("{} expects a bracketed address operand, e.g. [A] or [0x8000]", instr.mnemonic),
        )),
    }
}

/// Classifies an instruction into its concrete `(opcode, mode)` and raw
/// field values. Valid both before and after label resolution: label
/// operands surface as `ImmSource::Label` either way.
pub fn classify(instr: &InstructionNode) -> Result<Classified> {
    use Opcode::*;

    let opcode = mnemonic(instr)?;

    match opcode {
        HALT | RET | IRET | NOP => {
            arity(instr, 0)?;
            Ok(Classified { opcode, mode: Mode::Null, ra: 0, rb: 0, imm: None })
        }

        POP | INC | DEC | NOT => {
            arity(instr, 1)?;
            let reg = as_register(instr, &instr.operands[0])?;
            Ok(Classified { opcode, mode: Mode::Reg, ra: reg.index(), rb: 0, imm: None })
        }

        JMP | JZ | JNZ | JC | JNC | CALL => {
            arity(instr, 1)?;
            let (is_reg, index, imm) = as_value(instr, &instr.operands[0])?;
            if is_reg {
                Ok(Classified { opcode, mode: Mode::MemIndirect, ra: index, rb: 0, imm: None })
            } else {
                Ok(Classified { opcode, mode: Mode::MemDirect, ra: 0, rb: 0, imm })
            }
        }

        INT | PUSH => {
            arity(instr, 1)?;
            let (is_reg, index, imm) = as_value(instr, &instr.operands[0])?;
            if is_reg {
                Ok(Classified { opcode, mode: Mode::Reg, ra: index, rb: 0, imm: None })
            } else {
                Ok(Classified { opcode, mode: Mode::Imm, ra: 0, rb: 0, imm })
            }
        }

        MOV | ADD | ADC | SUB | SBC | LSH | RSH | AND | OR | NOR | XOR | CMP | INB => {
            arity(instr, 2)?;
            let dest = as_register(instr, &instr.operands[0])?;
            let (is_reg, index, imm) = as_value(instr, &instr.operands[1])?;
            if is_reg {
                Ok(Classified { opcode, mode: Mode::Reg, ra: dest.index(), rb: index, imm: None })
            } else {
                Ok(Classified { opcode, mode: Mode::Imm, ra: dest.index(), rb: 0, imm })
            }
        }

        GET => {
            arity(instr, 2)?;
            let dest = as_register(instr, &instr.operands[0])?;
            let (is_reg, index, imm) = as_bracketed(instr, &instr.operands[1])?;
            if is_reg {
                Ok(Classified { opcode, mode: Mode::MemIndirect, ra: dest.index(), rb: index, imm: None })
            } else {
                Ok(Classified { opcode, mode: Mode::MemDirect, ra: dest.index(), rb: 0, imm })
            }
        }

        PUT => {
            arity(instr, 2)?;
            let (is_reg, index, imm) = as_bracketed(instr, &instr.operands[0])?;
            let src = as_register(instr, &instr.operands[1])?;
            if is_reg {
                Ok(Classified { opcode, mode: Mode::MemIndirect, ra: index, rb: src.index(), imm: None })
            } else {
                Ok(Classified { opcode, mode: Mode::MemDirect, ra: 0, rb: src.index(), imm })
            }
        }

        OUTB => {
            arity(instr, 2)?;
            let (is_reg, index, imm) = as_value(instr, &instr.operands[0])?;
            let value_reg = as_register(instr, &instr.operands[1])?;
            if is_reg {
                Ok(Classified { opcode, mode: Mode::Reg, ra: index, rb: value_reg.index(), imm: None })
            } else {
                Ok(Classified { opcode, mode: Mode::Imm, ra: 0, rb: value_reg.index(), imm })
            }
        }
    }
}

/// Word-size of an already-classified instruction, per the shared encoding
/// table (`spec.md` 4.5). Used by the label resolver before any label has
/// an address.
pub fn size_in_words(classified: &Classified) -> u32 {
    isa::instruction_size(classified.opcode, classified.mode)
        .expect("classify() only ever produces an admitted (opcode, mode) pair")
}

/// Resolves a `Classified` instruction's immediate source against the
/// label map and emits its final wire words.
pub fn emit(instr: &InstructionNode, classified: Classified, labels: &LabelMap) -> Result<(u16, Option<u16>)> {
    let imm16 = match classified.imm {
        None => None,
        Some(ImmSource::Number(n)) => Some(crate::ir::narrow(instr.line, n)?),
        Some(ImmSource::Label(name)) => {
            let addr = labels.get(&name.to_uppercase()).copied().ok_or_else(|| {
                semantic(instr.line, format!("unknown label \"{}\"", name))
            })?;
            Some(addr)
        }
    };

    let wire = WireInstruction {
        opcode: classified.opcode,
        mode: classified.mode,
        ra: classified.ra,
        rb: classified.rb,
        imm16,
    };
    Ok(isa::encode(&wire))
}
