//! Opcode dispatch: the actual semantics of every mnemonic in `spec.md`
//! 4.6. Kept separate from `cpu.rs` so the fetch/decode loop and the
//! execute step can be read (and tested) independently.

use crate::cpu::{Cpu, RuntimeError};
use crate::isa::{AddressingMode as Mode, Instruction, Opcode, RegisterId};
use crate::registers::Flag;

/// What happened as a result of executing one instruction.
pub enum TickOutcome {
    Continue,
    /// A write to the console port (port 0) happened; carries the
    /// character to print (`spec.md` 6).
    ConsoleWrite(char),
    Halt,
}

fn register(raw: u8) -> Result<RegisterId, RuntimeError> {
    RegisterId::from_index(raw).ok_or(RuntimeError::InvalidRegister(raw))
}

/// `spec.md` 9: "C = bit shifted out of the MSB for LSH, LSB for RSH";
/// `O` is left at whatever it was before the shift (`SPEC_FULL.md` 9:
/// explicitly undefined, not cleared).
fn shift_left(value: u16, amount: u16) -> (u16, bool) {
    let amount = amount & 0xF;
    if amount == 0 {
        (value, false)
    } else if amount >= 16 {
        (0, (value & 1) != 0 && amount == 16)
    } else {
        let carry = (value >> (16 - amount)) & 1 != 0;
        (value << amount, carry)
    }
}

fn shift_right(value: u16, amount: u16) -> (u16, bool) {
    let amount = amount & 0xF;
    if amount == 0 {
        (value, false)
    } else if amount >= 16 {
        (0, false)
    } else {
        let carry = (value >> (amount - 1)) & 1 != 0;
        (value >> amount, carry)
    }
}

/// 16-bit add with carry-in. Returns `(result, carry-out, signed overflow)`.
fn add16(a: u16, b: u16, carry_in: bool) -> (u16, bool, bool) {
    let full = a as u32 + b as u32 + carry_in as u32;
    let result = full as u16;
    let carry = full > 0xFFFF;
    let overflow = ((a ^ b) & 0x8000 == 0) && ((a ^ result) & 0x8000 != 0);
    (result, carry, overflow)
}

/// 16-bit subtract with borrow-in. `carry` follows `spec.md` 4.6's
/// "unsigned non-borrow of sub" convention: `true` means no borrow was
/// needed.
fn sub16(a: u16, b: u16, borrow_in: bool) -> (u16, bool, bool) {
    let full = a as i32 - b as i32 - borrow_in as i32;
    let result = full as u16;
    let carry = (a as i64) >= (b as i64) + (borrow_in as i64);
    let overflow = ((a ^ b) & 0x8000 != 0) && ((a ^ result) & 0x8000 != 0);
    (result, carry, overflow)
}

fn set_arith_flags(cpu: &mut Cpu, result: u16, carry: bool, overflow: bool) {
    let regs = cpu.registers_mut();
    regs.set_flag(Flag::Zero, result == 0);
    regs.set_flag(Flag::Carry, carry);
    regs.set_flag(Flag::Negative, result & 0x8000 != 0);
    regs.set_flag(Flag::Overflow, overflow);
}

fn push(cpu: &mut Cpu, value: u16) {
    let sp = cpu.registers().sp().wrapping_sub(1);
    cpu.registers_mut().set_sp(sp);
    cpu.write_memory(sp, value);
}

fn pop(cpu: &mut Cpu) -> u16 {
    let sp = cpu.registers().sp();
    let value = cpu.read_memory(sp);
    cpu.registers_mut().set_sp(sp.wrapping_add(1));
    value
}

/// Resolves the "RA or imm16" second operand common to the ALU family.
fn src_value(cpu: &Cpu, instr: &Instruction) -> Result<u16, RuntimeError> {
    match instr.mode {
        Mode::Imm => Ok(instr.imm16.unwrap_or(0)),
        Mode::Reg => Ok(cpu.registers().get(register(instr.rb)?)),
        _ => unreachable!("ALU-family opcodes only ever decode to Imm or Reg"),
    }
}

pub fn execute(cpu: &mut Cpu, instr: Instruction) -> Result<TickOutcome, RuntimeError> {
    match instr.opcode {
        Opcode::HALT => return Ok(TickOutcome::Halt),
        Opcode::NOP => {}

        Opcode::GET => {
            let dest = register(instr.ra)?;
            let addr = match instr.mode {
                Mode::MemDirect => instr.imm16.unwrap_or(0),
                Mode::MemIndirect => cpu.registers().get(register(instr.rb)?),
                _ => unreachable!(),
            };
            let value = cpu.read_memory(addr);
            cpu.registers_mut().set(dest, value);
        }

        Opcode::PUT => {
            let (addr, src) = match instr.mode {
                Mode::MemIndirect => (cpu.registers().get(register(instr.ra)?), register(instr.rb)?),
                Mode::MemDirect => (instr.imm16.unwrap_or(0), register(instr.rb)?),
                _ => unreachable!(),
            };
            let value = cpu.registers().get(src);
            cpu.write_memory(addr, value);
        }

        Opcode::MOV => {
            let dest = register(instr.ra)?;
            let value = src_value(cpu, &instr)?;
            cpu.registers_mut().set(dest, value);
        }

        Opcode::PUSH => {
            let value = match instr.mode {
                Mode::Imm => instr.imm16.unwrap_or(0),
                Mode::Reg => cpu.registers().get(register(instr.ra)?),
                _ => unreachable!(),
            };
            push(cpu, value);
        }

        Opcode::POP => {
            let dest = register(instr.ra)?;
            let value = pop(cpu);
            cpu.registers_mut().set(dest, value);
            cpu.registers_mut().set_flag(Flag::Zero, value == 0);
        }

        Opcode::ADD | Opcode::ADC => {
            let dest = register(instr.ra)?;
            let a = cpu.registers().get(dest);
            let b = src_value(cpu, &instr)?;
            let carry_in = instr.opcode == Opcode::ADC && cpu.registers().flag(Flag::Carry);
            let (result, carry, overflow) = add16(a, b, carry_in);
            cpu.registers_mut().set(dest, result);
            set_arith_flags(cpu, result, carry, overflow);
        }

        Opcode::SUB | Opcode::SBC => {
            let dest = register(instr.ra)?;
            let a = cpu.registers().get(dest);
            let b = src_value(cpu, &instr)?;
            let borrow_in = instr.opcode == Opcode::SBC && !cpu.registers().flag(Flag::Carry);
            let (result, carry, overflow) = sub16(a, b, borrow_in);
            cpu.registers_mut().set(dest, result);
            set_arith_flags(cpu, result, carry, overflow);
        }

        Opcode::INC => {
            let dest = register(instr.ra)?;
            let a = cpu.registers().get(dest);
            let (result, carry, overflow) = add16(a, 1, false);
            cpu.registers_mut().set(dest, result);
            set_arith_flags(cpu, result, carry, overflow);
        }

        Opcode::DEC => {
            let dest = register(instr.ra)?;
            let a = cpu.registers().get(dest);
            let (result, carry, overflow) = sub16(a, 1, false);
            cpu.registers_mut().set(dest, result);
            set_arith_flags(cpu, result, carry, overflow);
        }

        Opcode::LSH => {
            let dest = register(instr.ra)?;
            let a = cpu.registers().get(dest);
            let amount = src_value(cpu, &instr)?;
            let (result, carry) = shift_left(a, amount);
            cpu.registers_mut().set(dest, result);
            let regs = cpu.registers_mut();
            regs.set_flag(Flag::Zero, result == 0);
            regs.set_flag(Flag::Carry, carry);
            regs.set_flag(Flag::Negative, result & 0x8000 != 0);
        }

        Opcode::RSH => {
            let dest = register(instr.ra)?;
            let a = cpu.registers().get(dest);
            let amount = src_value(cpu, &instr)?;
            let (result, carry) = shift_right(a, amount);
            cpu.registers_mut().set(dest, result);
            let regs = cpu.registers_mut();
            regs.set_flag(Flag::Zero, result == 0);
            regs.set_flag(Flag::Carry, carry);
            regs.set_flag(Flag::Negative, result & 0x8000 != 0);
        }

        Opcode::AND | Opcode::OR | Opcode::NOR | Opcode::XOR => {
            let dest = register(instr.ra)?;
            let a = cpu.registers().get(dest);
            let b = src_value(cpu, &instr)?;
            let result = match instr.opcode {
                Opcode::AND => a & b,
                Opcode::OR => a | b,
                Opcode::NOR => !(a | b),
                Opcode::XOR => a ^ b,
                _ => unreachable!(),
            };
            cpu.registers_mut().set(dest, result);
            let regs = cpu.registers_mut();
            regs.set_flag(Flag::Zero, result == 0);
            regs.set_flag(Flag::Carry, false);
            regs.set_flag(Flag::Overflow, false);
        }

        Opcode::NOT => {
            let dest = register(instr.ra)?;
            let result = !cpu.registers().get(dest);
            cpu.registers_mut().set(dest, result);
            let regs = cpu.registers_mut();
            regs.set_flag(Flag::Zero, result == 0);
            regs.set_flag(Flag::Carry, false);
            regs.set_flag(Flag::Overflow, false);
        }

        Opcode::INB => {
            let dest = register(instr.ra)?;
            let port = src_value(cpu, &instr)? as u8;
            let value = cpu.ports().read(port);
            cpu.registers_mut().set(dest, value);
            cpu.registers_mut().set_flag(Flag::Zero, value == 0);
        }

        Opcode::OUTB => {
            let (port, value_reg) = match instr.mode {
                Mode::Reg => (cpu.registers().get(register(instr.ra)?) as u8, register(instr.rb)?),
                Mode::Imm => (instr.imm16.unwrap_or(0) as u8, register(instr.rb)?),
                _ => unreachable!(),
            };
            let value = cpu.registers().get(value_reg);
            let printed = cpu.ports_mut().write(port, value);
            if let Some(c) = printed {
                return Ok(TickOutcome::ConsoleWrite(c));
            }
        }

        Opcode::CMP => {
            let a = cpu.registers().get(register(instr.ra)?);
            let b = src_value(cpu, &instr)?;
            let (result, carry, overflow) = sub16(a, b, false);
            set_arith_flags(cpu, result, carry, overflow);
        }

        Opcode::JMP | Opcode::JZ | Opcode::JNZ | Opcode::JC | Opcode::JNC => {
            let taken = match instr.opcode {
                Opcode::JMP => true,
                Opcode::JZ => cpu.registers().flag(Flag::Zero),
                Opcode::JNZ => !cpu.registers().flag(Flag::Zero),
                Opcode::JC => cpu.registers().flag(Flag::Carry),
                Opcode::JNC => !cpu.registers().flag(Flag::Carry),
                _ => unreachable!(),
            };
            if taken {
                let target = jump_target(cpu, &instr)?;
                cpu.registers_mut().set_pc(target);
            }
        }

        Opcode::CALL => {
            let target = jump_target(cpu, &instr)?;
            let return_addr = cpu.registers().pc();
            push(cpu, return_addr);
            cpu.registers_mut().set_pc(target);
        }

        Opcode::RET => {
            let target = pop(cpu);
            cpu.registers_mut().set_pc(target);
        }

        Opcode::INT => {
            if cpu.registers().flag(Flag::InterruptEnable) {
                let handler = match instr.mode {
                    Mode::Imm => instr.imm16.unwrap_or(0),
                    Mode::Reg => cpu.registers().get(register(instr.ra)?),
                    _ => unreachable!(),
                };
                let return_addr = cpu.registers().pc();
                push(cpu, return_addr);
                push(cpu, cpu.registers().flags());
                cpu.registers_mut().set_flag(Flag::InterruptEnable, false);
                let vector_addr = 0xFFFFu16.wrapping_sub(handler);
                let target = cpu.read_memory(vector_addr);
                cpu.registers_mut().set_pc(target);
            }
        }

        Opcode::IRET => {
            let flags = pop(cpu);
            let target = pop(cpu);
            cpu.registers_mut().set_flags(flags);
            cpu.registers_mut().set_pc(target);
        }
    }

    Ok(TickOutcome::Continue)
}

fn jump_target(cpu: &Cpu, instr: &Instruction) -> Result<u16, RuntimeError> {
    match instr.mode {
        Mode::MemDirect => Ok(instr.imm16.unwrap_or(0)),
        Mode::MemIndirect => Ok(cpu.registers().get(register(instr.ra)?)),
        _ => unreachable!("control-transfer opcodes only ever decode to MemDirect or MemIndirect"),
    }
}
