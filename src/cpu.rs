//! The fetch/decode/execute core.

pub mod logic;

use log::warn;

use crate::constants::WORD_BYTES;
use crate::isa::{self, DecodeError, Instruction};
use crate::memory::{MainMemory, Ports};
use crate::registers::RegisterFile;

/// Why a `run`/`step` loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// `HALT` was executed.
    Halted,
    /// The fetch address was in the breakpoint set, checked before fetch
    /// (`spec.md` 4.10).
    Breakpoint(u16),
    /// Console `^C` during `run` (`spec.md` 5).
    UserInterrupt,
}

/// An execution-time fault that returns control to the debugger prompt
/// without terminating the process (`spec.md` 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeError {
    /// `decode` rejected the word(s) at `pc`.
    BadEncoding { pc: u16, cause: DecodeError },
    /// A register field held a 4-bit value with no corresponding
    /// [`crate::isa::RegisterId`] (12..=15).
    InvalidRegister(u8),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RuntimeError::BadEncoding { pc, cause } => {
                write!(f, "bad encoding at pc={:#06x}: {:?}", pc, cause)
            }
            RuntimeError::InvalidRegister(id) => write!(f, "invalid register index {}", id),
        }
    }
}

/// A hard, process-level failure — as opposed to [`RuntimeError`], which
/// the debugger recovers from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The image handed to `load_image`/`load_instructions` was not a
    /// whole number of 16-bit words.
    OddSizedImage(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::OddSizedImage(len) => {
                write!(f, "image size {} is not a multiple of {}", len, WORD_BYTES)
            }
        }
    }
}

impl std::error::Error for Error {}

/// The result of a single `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// `HALT` was executed.
    Halted,
}

/// The machine: registers, memory, ports, and the instruction-retirement
/// counter the debugger and tests use to verify execution properties.
pub struct Cpu {
    registers: RegisterFile,
    memory: MainMemory,
    ports: Ports,
    retired: u64,
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu {
            registers: RegisterFile::new(),
            memory: MainMemory::new(),
            ports: Ports::new(),
            retired: 0,
        }
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu::default()
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn memory(&self) -> &MainMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MainMemory {
        &mut self.memory
    }

    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut Ports {
        &mut self.ports
    }

    pub fn retired(&self) -> u64 {
        self.retired
    }

    /// Loads a flat little-endian word image at word address `start`
    /// (`spec.md` 6).
    pub fn load_words(&mut self, image: &[u16], start: u16) {
        self.memory.load_image(image, start);
    }

    /// Fetches, decodes, and executes exactly one instruction. Returns the
    /// character written to the console port, if any, alongside the step
    /// outcome — callers (the debugger's `run`/`step` commands) are
    /// responsible for printing it.
    pub fn step(&mut self) -> Result<(StepOutcome, Option<char>), RuntimeError> {
        let pc = self.registers.pc();
        let word0 = self.memory.read(pc, self.registers.mb());
        self.registers.set_pc(pc.wrapping_add(1));

        let header = isa::decode_header(word0).map_err(|cause| RuntimeError::BadEncoding { pc, cause })?;

        let imm16 = if header.row.imm16 {
            let at = self.registers.pc();
            let word1 = self.memory.read(at, self.registers.mb());
            self.registers.set_pc(at.wrapping_add(1));
            Some(word1)
        } else {
            None
        };

        let instr = Instruction {
            opcode: header.opcode,
            mode: header.mode,
            ra: if header.row.ra { header.ra } else { 0 },
            rb: if header.row.rb { header.rb } else { 0 },
            imm16,
        };

        let outcome = logic::execute(self, instr)?;
        self.retired += 1;

        match outcome {
            logic::TickOutcome::Continue => Ok((StepOutcome::Continue, None)),
            logic::TickOutcome::ConsoleWrite(c) => Ok((StepOutcome::Continue, Some(c))),
            logic::TickOutcome::Halt => Ok((StepOutcome::Halted, None)),
        }
    }

    /// Rejects a write below the ROM boundary with a warning, exactly as
    /// `spec.md` 7 prescribes ("Warn; write is silently dropped").
    pub(crate) fn write_memory(&mut self, addr: u16, value: u16) {
        use crate::memory::WriteOutcome;
        match self.memory.write(addr, self.registers.mb(), value) {
            WriteOutcome::Written => {}
            WriteOutcome::RomRejected => {
                warn!("rejected write to ROM address {:#06x}", addr);
            }
        }
    }

    pub(crate) fn read_memory(&self, addr: u16) -> u16 {
        self.memory.read(addr, self.registers.mb())
    }
}
