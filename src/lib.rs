//! Shared core of the machine toolchain: the instruction-set encoding
//! table, the register file, the word-addressed memory subsystem, and the
//! CPU execution core. `vasm` (the assembler) and `vex` (the emulator)
//! both depend on this crate so that their views of the wire format can
//! never drift apart — see [`isa::encoding_row`].

pub mod constants;
pub mod cpu;
pub mod isa;
pub mod memory;
pub mod registers;

pub use cpu::{Cpu, Error, ExitCode, RuntimeError, StepOutcome};
pub use isa::{AddressingMode, DecodeError, Instruction, Opcode, RegisterId};
pub use memory::{MainMemory, Ports, VideoBank, WriteOutcome};
pub use registers::{Flag, RegisterFile};
