//! Word-addressed memory subsystem: main memory with its ROM boundary, the
//! bank redirect window, the port file, and the video bank's polling
//! contract (`spec.md` 3.1, 4.9, 5).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::constants::{
    BANK_COUNT, BANK_WINDOW_END, BANK_WINDOW_START, BANK_WORDS, CONSOLE_PORT, MAIN_MEMORY_WORDS,
    PORT_COUNT, ROM_BOUNDARY, VIDEO_HEIGHT, VIDEO_WIDTH,
};

/// Outcome of a [`MainMemory::write`] — callers (`Cpu::write_memory`)
/// decide how to report a rejected ROM write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    RomRejected,
}

/// Main memory plus its 31 banks. `spec.md` 4.9: a write/read at an address
/// in `[0x8000, 0xC000)` is redirected into `banks[mb - 1]` whenever
/// `mb != 0`; everything else (and bank 0 itself) always goes to `words`.
pub struct MainMemory {
    words: Vec<u16>,
    banks: Vec<Vec<u16>>,
}

impl MainMemory {
    pub fn new() -> MainMemory {
        MainMemory {
            words: vec![0u16; MAIN_MEMORY_WORDS],
            banks: (0..BANK_COUNT).map(|_| vec![0u16; BANK_WORDS]).collect(),
        }
    }

    /// Loads a flat little-endian word image at word address `start`,
    /// bypassing the ROM boundary and bank redirect entirely (`spec.md` 6:
    /// "loaded starting at word address 0").
    pub fn load_image(&mut self, image: &[u16], start: u16) {
        let start = start as usize;
        for (offset, word) in image.iter().enumerate() {
            let addr = start + offset;
            if addr < self.words.len() {
                self.words[addr] = *word;
            }
        }
    }

    fn bank_redirect(&self, addr: u16, mb: u16) -> Option<usize> {
        let bank = (mb as usize) % (BANK_COUNT + 1);
        if bank != 0 && addr >= BANK_WINDOW_START && addr < BANK_WINDOW_END {
            Some(bank - 1)
        } else {
            None
        }
    }

    /// Reads through the bank redirect, as `spec.md` 4.9 specifies.
    pub fn read(&self, addr: u16, mb: u16) -> u16 {
        match self.bank_redirect(addr, mb) {
            Some(bank) => self.banks[bank][(addr - BANK_WINDOW_START) as usize],
            None => self.words[addr as usize],
        }
    }

    /// Reads the physical word at `addr`, ignoring any bank selection —
    /// used by the debugger's `vram`/`mem` commands and tests that need to
    /// observe bank 0 (the video buffer) directly.
    pub fn raw(&self, addr: u16) -> u16 {
        self.words[addr as usize]
    }

    /// Writes through the bank redirect. Writes to main memory below
    /// [`ROM_BOUNDARY`] are rejected without changing state (`spec.md` 4.9,
    /// 7: "Warn; write is silently dropped").
    pub fn write(&mut self, addr: u16, mb: u16, value: u16) -> WriteOutcome {
        match self.bank_redirect(addr, mb) {
            Some(bank) => {
                self.banks[bank][(addr - BANK_WINDOW_START) as usize] = value;
                WriteOutcome::Written
            }
            None => {
                if addr < ROM_BOUNDARY {
                    WriteOutcome::RomRejected
                } else {
                    self.words[addr as usize] = value;
                    WriteOutcome::Written
                }
            }
        }
    }
}

impl Default for MainMemory {
    fn default() -> MainMemory {
        MainMemory::new()
    }
}

/// The 256 independent I/O ports. Port 0 is the magic console: writing to
/// it produces a character for the caller to print instead of being stored
/// (`spec.md` 3.1, 6).
pub struct Ports {
    values: [u16; PORT_COUNT],
}

impl Ports {
    pub fn new() -> Ports {
        Ports { values: [0u16; PORT_COUNT] }
    }

    pub fn read(&self, port: u8) -> u16 {
        self.values[port as usize]
    }

    /// Writes `value` to `port`. Returns the character to print when `port`
    /// is the console port; the value is not retained for port 0, matching
    /// `spec.md` 6 ("writing a value prints ... to stdout" — there is no
    /// readback of what was printed).
    pub fn write(&mut self, port: u8, value: u16) -> Option<char> {
        if port == CONSOLE_PORT {
            std::char::from_u32(value as u32 & 0xFFFF)
        } else {
            self.values[port as usize] = value;
            None
        }
    }

    /// Non-zero ports, for the debugger's `ports` command.
    pub fn nonzero(&self) -> impl Iterator<Item = (u8, u16)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(p, v)| (p as u8, *v))
    }
}

impl Default for Ports {
    fn default() -> Ports {
        Ports::new()
    }
}

/// A read-only, hash-polling view onto bank 0 (`spec.md` 5): the CPU is the
/// sole writer, this is an observer that only needs to know "did anything
/// change since the last tick".
pub struct VideoBank<'m> {
    memory: &'m MainMemory,
}

impl<'m> VideoBank<'m> {
    pub fn new(memory: &'m MainMemory) -> VideoBank<'m> {
        VideoBank { memory }
    }

    pub fn cell(&self, row: usize, col: usize) -> u16 {
        self.memory.raw((row * VIDEO_WIDTH + col) as u16)
    }

    /// Hashes the visible `WIDTH * HEIGHT` window of bank 0. Two calls that
    /// return the same value mean the frame has not changed; a torn read
    /// during a mid-frame CPU write just delays the redraw by one tick, as
    /// `spec.md` 5 allows.
    pub fn changed_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for row in 0..VIDEO_HEIGHT {
            for col in 0..VIDEO_WIDTH {
                self.cell(row, col).hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}
