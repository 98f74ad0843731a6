use crate::debugger::{Command, Debugger, MemAddr, RunReport};
use vmcore::cpu::ExitCode;
use vmcore::isa::RegisterId;

fn load_words(debugger: &mut Debugger, words: &[u16]) {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    let dir = std::env::temp_dir().join(format!("vex_test_{}_{}", std::process::id(), words.len()));
    std::fs::write(&dir, &bytes).unwrap();
    debugger.load(&dir, 0).unwrap();
    let _ = std::fs::remove_file(&dir);
}

fn encode(opcode: vmcore::isa::Opcode, mode: vmcore::isa::AddressingMode, ra: u8, rb: u8, imm16: Option<u16>) -> Vec<u16> {
    let instr = vmcore::isa::Instruction { opcode, mode, ra, rb, imm16 };
    let (w0, w1) = vmcore::isa::encode(&instr);
    let mut words = vec![w0];
    if let Some(w1) = w1 {
        words.push(w1);
    }
    words
}

#[test]
fn parses_every_command_shape() {
    assert_eq!(parse_ok("load a.bin 0x100"), Command::Load { path: "a.bin".into(), addr: 0x100 });
    assert_eq!(parse_ok("load a.bin"), Command::Load { path: "a.bin".into(), addr: 0 });
    assert_eq!(parse_ok("dev graphics"), Command::DevGraphics);
    assert_eq!(parse_ok("run"), Command::Run);
    assert_eq!(parse_ok("s"), Command::Step);
    assert_eq!(parse_ok("b 0x10"), Command::Break { addr: 0x10 });
    assert_eq!(parse_ok("bl"), Command::BList);
    assert_eq!(parse_ok("bc"), Command::BClear);
    assert_eq!(parse_ok("r"), Command::Regs);
    assert_eq!(parse_ok("f"), Command::Flags);
    assert_eq!(parse_ok("set A 0x5"), Command::Set { reg: "A".into(), value: 5 });
    assert_eq!(parse_ok("setm 0x10 0x5"), Command::SetM { addr: 0x10, value: 5 });
    assert_eq!(parse_ok("m pc 4"), Command::Mem { addr: MemAddr::Pc, words: 4 });
    assert_eq!(parse_ok("m 0x10"), Command::Mem { addr: MemAddr::Absolute(0x10), words: 16 });
    assert_eq!(parse_ok("d"), Command::Disasm { addr: None });
    assert_eq!(parse_ok("ports"), Command::Ports);
    assert_eq!(parse_ok("vram"), Command::Vram);
    assert_eq!(parse_ok("clear"), Command::Clear);
    assert_eq!(parse_ok("help"), Command::Help);
    assert_eq!(parse_ok("quit"), Command::Quit);
}

fn parse_ok(line: &str) -> Command {
    crate::debugger::parse_command(line).unwrap_or_else(|err| panic!("{}", err))
}

#[test]
fn unknown_command_is_an_error() {
    assert!(crate::debugger::parse_command("frobnicate").is_err());
}

#[test]
fn run_halts_on_the_halt_opcode() {
    use vmcore::isa::{AddressingMode, Opcode};
    let mut debugger = Debugger::new();
    let mut words = encode(Opcode::MOV, AddressingMode::Imm, RegisterId::A.index(), 0, Some(7));
    words.extend(encode(Opcode::HALT, AddressingMode::Null, 0, 0, None));
    load_words(&mut debugger, &words);

    let (report, _) = debugger.run();
    assert!(matches!(report, RunReport::Exit(ExitCode::Halted)));
    assert_eq!(debugger.cpu().registers().get(RegisterId::A), 7);
}

#[test]
fn run_stops_at_a_breakpoint_before_executing_it() {
    use vmcore::isa::{AddressingMode, Opcode};
    let mut debugger = Debugger::new();
    let mut words = encode(Opcode::MOV, AddressingMode::Imm, RegisterId::A.index(), 0, Some(1));
    words.extend(encode(Opcode::MOV, AddressingMode::Imm, RegisterId::B.index(), 0, Some(2)));
    words.extend(encode(Opcode::HALT, AddressingMode::Null, 0, 0, None));
    load_words(&mut debugger, &words);

    debugger.add_breakpoint(2); // word address of the second MOV
    let (report, _) = debugger.run();
    assert!(matches!(report, RunReport::Exit(ExitCode::Breakpoint(2))));
    assert_eq!(debugger.cpu().registers().get(RegisterId::A), 1);
    assert_eq!(debugger.cpu().registers().get(RegisterId::B), 0, "breakpointed instruction must not have run");
}

#[test]
fn set_register_and_set_memory_mutate_state() {
    let mut debugger = Debugger::new();
    debugger.set_register("a", 0x1234).unwrap();
    assert_eq!(debugger.cpu().registers().get(RegisterId::A), 0x1234);

    debugger.set_memory(0x8100, 0xBEEF);
    assert_eq!(debugger.cpu().memory().raw(0x8100), 0xBEEF);
}

#[test]
fn set_register_rejects_an_unknown_name() {
    let mut debugger = Debugger::new();
    assert!(debugger.set_register("nope", 1).is_err());
}

#[test]
fn breakpoint_list_and_clear_round_trip() {
    let mut debugger = Debugger::new();
    debugger.add_breakpoint(0x10);
    debugger.add_breakpoint(0x20);
    assert_eq!(debugger.breakpoints().count(), 2);
    assert_eq!(debugger.clear_breakpoints(), 2);
    assert_eq!(debugger.breakpoints().count(), 0);
}

#[test]
fn disassemble_renders_mnemonic_and_operands() {
    use vmcore::isa::{AddressingMode, Opcode};
    let mut debugger = Debugger::new();
    let words = encode(Opcode::MOV, AddressingMode::Imm, RegisterId::A.index(), 0, Some(0x42));
    load_words(&mut debugger, &words);

    let text = debugger.disassemble(Some(0));
    assert!(text.contains("MOV"));
    assert!(text.contains("A"));
    assert!(text.contains("0x0042"));
}

#[test]
fn mem_dump_at_pc_reflects_loaded_bytes() {
    use vmcore::isa::{AddressingMode, Opcode};
    let mut debugger = Debugger::new();
    let words = encode(Opcode::HALT, AddressingMode::Null, 0, 0, None);
    load_words(&mut debugger, &words);

    let dump = debugger.format_mem(MemAddr::Pc, 1);
    assert!(dump.contains("0x0000"));
}

#[test]
fn ports_report_is_empty_until_a_port_is_written() {
    let debugger = Debugger::new();
    assert_eq!(debugger.format_ports(), "no non-zero ports.");
}
