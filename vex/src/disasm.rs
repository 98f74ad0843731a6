//! Disassembly: inverts the encoder (`spec.md` 4.10: "decode at the given
//! word address, consult the encoding table for which fields are live, and
//! format as `MNEMONIC [RA] [RB] [IMM16]` using hex for immediates").

use vmcore::isa::{self, RegisterId};
use vmcore::MainMemory;

/// One disassembled instruction: its mnemonic text and the number of words
/// it occupied, so the caller can advance past it.
pub struct Disassembled {
    pub text: String,
    pub words: u32,
}

/// Disassembles the instruction at `addr` in bank `mb`. A bad encoding is
/// rendered as a single-word `??? <hex>` line rather than propagated as an
/// error — disassembly is read-only tooling, not an execution path, so
/// `spec.md` 7's runtime-bad-encoding policy doesn't apply here.
pub fn disassemble_at(memory: &MainMemory, addr: u16, mb: u16) -> Disassembled {
    let word0 = memory.read(addr, mb);

    let header = match isa::decode_header(word0) {
        Ok(header) => header,
        Err(_) => return Disassembled { text: format!("??? {:#06x}", word0), words: 1 },
    };

    let imm16 = if header.row.imm16 { Some(memory.read(addr.wrapping_add(1), mb)) } else { None };

    let mut parts = vec![format!("{:?}", header.opcode)];
    if header.row.ra {
        parts.push(format_register(header.ra));
    }
    if header.row.rb {
        parts.push(format_register(header.rb));
    }
    if let Some(imm) = imm16 {
        parts.push(format!("{:#06x}", imm));
    }

    Disassembled { text: parts.join(" "), words: if header.row.imm16 { 2 } else { 1 } }
}

fn format_register(index: u8) -> String {
    match RegisterId::from_index(index) {
        Some(id) => format!("{:?}", id),
        None => format!("r{}", index),
    }
}
