//! The debugger core: machine state plus every REPL command's logic
//! (`spec.md` 4.10), kept free of any actual stdin/stdout so it can be
//! exercised directly from tests. [`crate::repl`] is the thin stdin loop
//! wrapped around this.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use vmcore::constants::{VIDEO_HEIGHT, VIDEO_WIDTH};
use vmcore::cpu::{ExitCode, RuntimeError, StepOutcome};
use vmcore::isa::RegisterId;
use vmcore::{Cpu, VideoBank};

use crate::disasm;

/// One parsed REPL command (`spec.md` 6's token list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load { path: String, addr: u16 },
    DevGraphics,
    Run,
    Step,
    Break { addr: u16 },
    BList,
    BClear,
    Regs,
    Flags,
    Set { reg: String, value: u16 },
    SetM { addr: u16, value: u16 },
    Mem { addr: MemAddr, words: u16 },
    Disasm { addr: Option<u16> },
    Ports,
    Vram,
    Clear,
    Help,
    Quit,
}

/// `mem`/`disasm`'s address argument accepts the literal token `pc` in
/// place of a hex address (`spec.md` 6: "`mem|m <addr|pc> [words]`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAddr {
    Absolute(u16),
    Pc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError(pub String);

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn parse_u16(token: &str) -> Result<u16, CommandError> {
    let token = token.trim();
    let (digits, radix) = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(rest) => (rest, 16),
        None => (token, 10),
    };
    u16::from_str_radix(digits, radix)
        .map_err(|_| CommandError(format!("invalid numeric argument \"{}\"", token)))
}

/// Parses one whitespace-separated REPL command line (`spec.md` 6). An
/// empty line parses to nothing the caller should act on; the REPL loop
/// filters those out before calling this.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (command, args) = tokens.split_first().ok_or_else(|| CommandError("empty command".into()))?;

    match command.to_ascii_lowercase().as_str() {
        "load" => {
            let path = args.first().ok_or_else(|| CommandError("load requires a path".into()))?;
            let addr = match args.get(1) {
                Some(tok) => parse_u16(tok)?,
                None => 0,
            };
            Ok(Command::Load { path: path.to_string(), addr })
        }
        "dev" => match args.first().copied() {
            Some("graphics") => Ok(Command::DevGraphics),
            Some(other) => Err(CommandError(format!("unknown device \"{}\" (expected: graphics)", other))),
            None => Err(CommandError("dev requires a device name".into())),
        },
        "run" => Ok(Command::Run),
        "step" | "s" => Ok(Command::Step),
        "break" | "b" => {
            let addr = args.first().ok_or_else(|| CommandError("break requires an address".into()))?;
            Ok(Command::Break { addr: parse_u16(addr)? })
        }
        "blist" | "bl" => Ok(Command::BList),
        "bclear" | "bc" => Ok(Command::BClear),
        "regs" | "r" => Ok(Command::Regs),
        "flags" | "f" => Ok(Command::Flags),
        "set" => {
            let reg = args.first().ok_or_else(|| CommandError("set requires a register and value".into()))?;
            let value = args.get(1).ok_or_else(|| CommandError("set requires a register and value".into()))?;
            Ok(Command::Set { reg: reg.to_string(), value: parse_u16(value)? })
        }
        "setm" => {
            let addr = args.first().ok_or_else(|| CommandError("setm requires an address and value".into()))?;
            let value = args.get(1).ok_or_else(|| CommandError("setm requires an address and value".into()))?;
            Ok(Command::SetM { addr: parse_u16(addr)?, value: parse_u16(value)? })
        }
        "mem" | "m" => {
            let addr_tok = args.first().ok_or_else(|| CommandError("mem requires an address".into()))?;
            let addr = if addr_tok.eq_ignore_ascii_case("pc") {
                MemAddr::Pc
            } else {
                MemAddr::Absolute(parse_u16(addr_tok)?)
            };
            let words = match args.get(1) {
                Some(tok) => parse_u16(tok)?,
                None => 16,
            };
            Ok(Command::Mem { addr, words })
        }
        "disasm" | "d" => {
            let addr = match args.first() {
                Some(tok) => Some(parse_u16(tok)?),
                None => None,
            };
            Ok(Command::Disasm { addr })
        }
        "ports" => Ok(Command::Ports),
        "vram" => Ok(Command::Vram),
        "clear" => Ok(Command::Clear),
        "help" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError(format!("unknown command \"{}\" (type 'help' for a list)", other))),
    }
}

/// Why [`Debugger::run`] stopped, folding in the runtime-error case
/// `ExitCode` itself doesn't carry (`spec.md` 7: a runtime error halts the
/// run loop, not the process).
#[derive(Debug)]
pub enum RunReport {
    Exit(ExitCode),
    Error(RuntimeError),
}

pub struct Debugger {
    cpu: Cpu,
    breakpoints: BTreeSet<u16>,
    graphics_attached: bool,
}

impl Default for Debugger {
    fn default() -> Debugger {
        Debugger { cpu: Cpu::new(), breakpoints: BTreeSet::new(), graphics_attached: false }
    }
}

impl Debugger {
    pub fn new() -> Debugger {
        Debugger::default()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Loads a flat little-endian word image from `path` at word address
    /// `addr` (`spec.md` 6). Returns the number of bytes loaded.
    pub fn load(&mut self, path: &Path, addr: u16) -> io::Result<usize> {
        let bytes = fs::read(path)?;
        let words: Vec<u16> =
            bytes.chunks(2).map(|pair| u16::from_le_bytes([pair[0], *pair.get(1).unwrap_or(&0)])).collect();
        self.cpu.load_words(&words, addr);
        Ok(bytes.len())
    }

    pub fn attach_graphics(&mut self) {
        self.graphics_attached = true;
    }

    pub fn graphics_attached(&self) -> bool {
        self.graphics_attached
    }

    /// Executes exactly one instruction, printing any console character via
    /// the returned report rather than to stdout directly, so callers can
    /// test output without capturing stdio.
    pub fn step(&mut self) -> Result<(StepOutcome, Option<char>), RuntimeError> {
        self.cpu.step()
    }

    /// Runs until `HALT`, a breakpoint (checked before fetch, per
    /// `spec.md` 4.10), or a runtime error. Printed console output is
    /// collected into the returned string rather than written directly.
    pub fn run(&mut self) -> (RunReport, String) {
        let mut printed = String::new();
        loop {
            let pc = self.cpu.registers().pc();
            if self.breakpoints.contains(&pc) {
                return (RunReport::Exit(ExitCode::Breakpoint(pc)), printed);
            }
            match self.cpu.step() {
                Ok((StepOutcome::Halted, c)) => {
                    if let Some(c) = c {
                        printed.push(c);
                    }
                    return (RunReport::Exit(ExitCode::Halted), printed);
                }
                Ok((StepOutcome::Continue, c)) => {
                    if let Some(c) = c {
                        printed.push(c);
                    }
                }
                Err(err) => return (RunReport::Error(err), printed),
            }
        }
    }

    pub fn add_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr);
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    /// Clears all breakpoints, returning how many were removed.
    pub fn clear_breakpoints(&mut self) -> usize {
        let count = self.breakpoints.len();
        self.breakpoints.clear();
        count
    }

    pub fn format_regs(&self) -> String {
        let regs = self.cpu.registers();
        let general = [RegisterId::A, RegisterId::B, RegisterId::C, RegisterId::D, RegisterId::E, RegisterId::X, RegisterId::Y, RegisterId::Z];
        let mut line1 = String::new();
        for (i, id) in general.iter().enumerate() {
            if i > 0 {
                line1.push_str("  ");
            }
            write!(line1, "{:?}: {:#06x}", id, regs.get(*id)).unwrap();
        }
        format!(
            "{}\nPC: {:#06x}  SP: {:#06x}  MB: {:#06x}",
            line1,
            regs.pc(),
            regs.sp(),
            regs.mb()
        )
    }

    pub fn format_flags(&self) -> String {
        use vmcore::registers::Flag;
        let regs = self.cpu.registers();
        format!(
            "C: {}  Z: {}  N: {}  O: {}  I: {}",
            regs.flag(Flag::Carry) as u8,
            regs.flag(Flag::Zero) as u8,
            regs.flag(Flag::Negative) as u8,
            regs.flag(Flag::Overflow) as u8,
            regs.flag(Flag::InterruptEnable) as u8,
        )
    }

    pub fn set_register(&mut self, name: &str, value: u16) -> Result<(), CommandError> {
        let id = RegisterId::parse(name).map_err(|_| CommandError(format!("invalid register \"{}\"", name)))?;
        self.cpu.registers_mut().set(id, value);
        Ok(())
    }

    pub fn set_memory(&mut self, addr: u16, value: u16) {
        let mb = self.cpu.registers().mb();
        self.cpu.memory_mut().write(addr, mb, value);
    }

    fn resolve(&self, addr: MemAddr) -> u16 {
        match addr {
            MemAddr::Absolute(addr) => addr,
            MemAddr::Pc => self.cpu.registers().pc(),
        }
    }

    /// Hex-dumps `words` words of memory starting at `addr` (or `pc`), in
    /// rows of 8, with an ASCII-ish gutter.
    pub fn format_mem(&self, addr: MemAddr, words: u16) -> String {
        let start = self.resolve(addr);
        let mb = self.cpu.registers().mb();
        let mut out = String::new();
        for row_start in (0..words).step_by(8) {
            let row_addr = start.wrapping_add(row_start);
            let mut hex = String::new();
            let mut text = String::new();
            for col in 0..8u16 {
                if row_start + col >= words {
                    break;
                }
                let value = self.cpu.memory().read(row_addr.wrapping_add(col), mb);
                write!(hex, "{:04x} ", value).unwrap();
                let lo = (value & 0xFF) as u8;
                text.push(if (0x20..=0x7E).contains(&lo) { lo as char } else { '.' });
            }
            writeln!(out, "{:#06x} | {:<39}| {}", row_addr, hex, text).unwrap();
        }
        out.trim_end().to_string()
    }

    pub fn disassemble(&self, addr: Option<u16>) -> String {
        let addr = addr.unwrap_or_else(|| self.cpu.registers().pc());
        let mb = self.cpu.registers().mb();
        disasm::disassemble_at(self.cpu.memory(), addr, mb).text
    }

    pub fn format_ports(&self) -> String {
        let nonzero: Vec<(u8, u16)> = self.cpu.ports().nonzero().collect();
        if nonzero.is_empty() {
            return "no non-zero ports.".to_string();
        }
        let mut out = String::new();
        for (port, value) in nonzero {
            writeln!(out, "port {}: {:#06x}", port, value).unwrap();
        }
        out.trim_end().to_string()
    }

    /// Dumps the video bank's visible window as glyph/attribute pairs
    /// (`spec.md` 5/6) — no actual rendering, since that's out of scope.
    pub fn format_vram(&self) -> String {
        let bank = VideoBank::new(self.cpu.memory());
        let mut out = String::new();
        writeln!(out, "hash: {:#018x}", bank.changed_hash()).unwrap();
        for row in 0..VIDEO_HEIGHT.min(4) {
            let mut line = String::new();
            for col in 0..VIDEO_WIDTH {
                let cell = bank.cell(row, col);
                let glyph = (cell & 0xFF) as u8;
                line.push(if (0x20..=0x7E).contains(&glyph) { glyph as char } else { ' ' });
            }
            writeln!(out, "{}", line).unwrap();
        }
        out.trim_end().to_string()
    }

    pub fn help_text() -> &'static str {
        "commands:\n\
         load <path> [addr]      load a binary file into memory\n\
         dev graphics            attach the video device\n\
         run                     execute until a breakpoint or halt\n\
         step|s                  execute one instruction\n\
         break|b <addr>          set a breakpoint\n\
         blist|bl                list breakpoints\n\
         bclear|bc               clear all breakpoints\n\
         regs|r                  display register values\n\
         flags|f                 display flag values\n\
         set <reg> <value>       set a register\n\
         setm <addr> <value>     set a memory word\n\
         mem|m <addr|pc> [words] display memory\n\
         disasm|d [addr]         disassemble one instruction\n\
         ports                   display non-zero ports\n\
         vram                    dump the video bank\n\
         clear                   clear the screen\n\
         help                    show this message\n\
         quit|q|exit             exit the emulator"
    }
}
