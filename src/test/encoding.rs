//! Round-trip tests for `isa::encode`/`isa::decode`: `spec.md` 8,
//! "decode(encode(instr)) = instr" for every `(opcode, mode)` pair listed
//! in the encoding table.

use crate::isa::{self, AddressingMode as Mode, Instruction, Opcode, RegisterId};

fn round_trip(i: Instruction) {
    let (w0, w1) = isa::encode(&i);
    let decoded = isa::decode(w0, w1).unwrap_or_else(|e| panic!("failed to decode {:?}: {:?}", i, e));
    assert_eq!(decoded, i, "round trip mismatch for {:?}", i);
}

#[test]
fn no_operand_opcodes_round_trip() {
    for opcode in [Opcode::HALT, Opcode::RET, Opcode::IRET, Opcode::NOP] {
        round_trip(Instruction { opcode, mode: Mode::Null, ra: 0, rb: 0, imm16: None });
    }
}

#[test]
fn single_register_opcodes_round_trip() {
    for opcode in [Opcode::POP, Opcode::INC, Opcode::DEC, Opcode::NOT, Opcode::PUSH] {
        for reg in [RegisterId::A, RegisterId::Y, RegisterId::MB] {
            round_trip(Instruction { opcode, mode: Mode::Reg, ra: reg.index(), rb: 0, imm16: None });
        }
    }
}

#[test]
fn two_register_alu_opcodes_round_trip() {
    let opcodes = [
        Opcode::ADD, Opcode::ADC, Opcode::SUB, Opcode::SBC, Opcode::LSH, Opcode::RSH,
        Opcode::AND, Opcode::OR, Opcode::NOR, Opcode::XOR, Opcode::CMP, Opcode::INB, Opcode::MOV,
    ];
    for opcode in opcodes {
        for ra in [RegisterId::A, RegisterId::D] {
            for rb in [RegisterId::B, RegisterId::Y] {
                round_trip(Instruction { opcode, mode: Mode::Reg, ra: ra.index(), rb: rb.index(), imm16: None });
            }
        }
    }
}

#[test]
fn register_immediate_alu_opcodes_round_trip() {
    let opcodes = [
        Opcode::ADD, Opcode::ADC, Opcode::SUB, Opcode::SBC, Opcode::LSH, Opcode::RSH,
        Opcode::AND, Opcode::OR, Opcode::NOR, Opcode::XOR, Opcode::CMP, Opcode::INB, Opcode::MOV,
    ];
    for opcode in opcodes {
        for imm in [0u16, 1, 0x1234, 0xFFFF] {
            round_trip(Instruction { opcode, mode: Mode::Imm, ra: RegisterId::A.index(), rb: 0, imm16: Some(imm) });
        }
    }
}

#[test]
fn push_immediate_round_trips_with_no_register_operand() {
    for imm in [0u16, 1, 0x1234, 0xFFFF] {
        round_trip(Instruction { opcode: Opcode::PUSH, mode: Mode::Imm, ra: 0, rb: 0, imm16: Some(imm) });
    }
}

#[test]
fn get_put_memory_forms_round_trip() {
    round_trip(Instruction { opcode: Opcode::GET, mode: Mode::MemIndirect, ra: RegisterId::A.index(), rb: RegisterId::B.index(), imm16: None });
    round_trip(Instruction { opcode: Opcode::GET, mode: Mode::MemDirect, ra: RegisterId::A.index(), rb: 0, imm16: Some(0x8000) });
    round_trip(Instruction { opcode: Opcode::PUT, mode: Mode::MemIndirect, ra: RegisterId::A.index(), rb: RegisterId::B.index(), imm16: None });
    round_trip(Instruction { opcode: Opcode::PUT, mode: Mode::MemDirect, ra: 0, rb: RegisterId::B.index(), imm16: Some(0x8000) });
}

#[test]
fn outb_forms_round_trip() {
    round_trip(Instruction { opcode: Opcode::OUTB, mode: Mode::Reg, ra: RegisterId::A.index(), rb: RegisterId::B.index(), imm16: None });
    round_trip(Instruction { opcode: Opcode::OUTB, mode: Mode::Imm, ra: 0, rb: RegisterId::B.index(), imm16: Some(0) });
}

#[test]
fn control_transfer_forms_round_trip() {
    for opcode in [Opcode::JMP, Opcode::JZ, Opcode::JNZ, Opcode::JC, Opcode::JNC, Opcode::CALL] {
        round_trip(Instruction { opcode, mode: Mode::MemDirect, ra: 0, rb: 0, imm16: Some(0x1000) });
        round_trip(Instruction { opcode, mode: Mode::MemIndirect, ra: RegisterId::A.index(), rb: 0, imm16: None });
    }
}

#[test]
fn int_register_and_immediate_forms_round_trip() {
    round_trip(Instruction { opcode: Opcode::INT, mode: Mode::Reg, ra: RegisterId::A.index(), rb: 0, imm16: None });
    round_trip(Instruction { opcode: Opcode::INT, mode: Mode::Imm, ra: 0, rb: 0, imm16: Some(3) });
}

#[test]
fn unused_fields_are_forced_to_zero_on_encode() {
    // HALT carries stray nonzero ra/rb; encode() must still emit a clean word.
    let dirty = Instruction { opcode: Opcode::HALT, mode: Mode::Null, ra: 7, rb: 9, imm16: None };
    let (w0, w1) = isa::encode(&dirty);
    assert_eq!(w0 & 0x00FF, 0);
    assert_eq!(w1, None);
}

#[test]
fn unknown_opcode_is_rejected() {
    // Opcode 63 (top of the 6-bit field) has no mnemonic assigned.
    let word0 = (63u16 << 10) | 0b00;
    assert!(isa::decode(word0, None).is_err());
}

#[test]
fn unadmitted_mode_is_rejected() {
    // GET has no pure REGISTER-mode row (only MEM_DIRECT/MEM_INDIRECT).
    let opcode_bits = Opcode::GET.index() as u16;
    let word0 = (opcode_bits << 10) | 0b00; // mode 00
    assert!(isa::decode(word0, None).is_err());
}
