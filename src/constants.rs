//! Bit-layout and machine-geometry constants shared by the encoder and the
//! decoder. Keeping these in one place is what makes encode/decode
//! desynchronisation a compile error rather than a runtime surprise.

use std::mem;

pub const BYTE_BYTES: u32 = mem::size_of::<u8>() as u32;
pub const BYTE_WIDTH: u32 = 8;

pub const WORD_BYTES: u32 = mem::size_of::<u16>() as u32;
pub const WORD_WIDTH: u32 = WORD_BYTES * BYTE_WIDTH;

/// Width, in bits, of the opcode field of `op_byte`.
pub const OPCODE_WIDTH: u32 = 6;
/// Width, in bits, of the addressing-mode field of `op_byte`.
pub const MODE_WIDTH: u32 = 2;
/// Width, in bits, of each register field of `reg_byte`.
pub const REG_FIELD_WIDTH: u32 = 4;

pub const MODE_MASK: u8 = 0b0000_0011;
pub const OPCODE_SHIFT: u8 = MODE_WIDTH as u8;

pub const RB_MASK: u8 = 0b0000_1111;
pub const RA_SHIFT: u8 = REG_FIELD_WIDTH as u8;

/// Number of addressable registers: `A,B,C,D,E,X,Y,Z,PC,SP,F,MB`.
pub const REGISTER_COUNT: usize = 12;

/// Initial value of `SP` on reset.
pub const STACK_POINTER_INIT: u16 = 0xFEFF;

/// Total word capacity of main memory (`0x20000` words).
pub const MAIN_MEMORY_WORDS: usize = 0x20000;
/// Addresses below this boundary reject writes (ROM).
pub const ROM_BOUNDARY: u16 = 0x8000;
/// Start of the bank redirect window.
pub const BANK_WINDOW_START: u16 = 0x8000;
/// End (exclusive) of the bank redirect window.
pub const BANK_WINDOW_END: u16 = 0xC000;
/// Number of auxiliary banks (`MB` selects `1..=31`; `MB == 0` means "no bank").
pub const BANK_COUNT: usize = 31;
/// Word capacity of a single bank (`16 KiW`).
pub const BANK_WORDS: usize = 0x4000;

/// Number of independent I/O ports.
pub const PORT_COUNT: usize = 256;
/// The magic console port.
pub const CONSOLE_PORT: u8 = 0;

/// Default video bank geometry (characters).
pub const VIDEO_WIDTH: usize = 80;
pub const VIDEO_HEIGHT: usize = 25;
