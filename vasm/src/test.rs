use crate::*;
use std::path::Path;
use vmcore::cpu::{Cpu, StepOutcome};
use vmcore::isa;
use vmcore::registers::Flag;
use vmcore::RegisterId;

fn assemble_str(source: &str) -> Vec<u8> {
    assemble(source, Path::new("test.jasm")).unwrap_or_else(|err| panic!("assembly failed: {}", err))
}

fn bytes_to_words(bytes: &[u8]) -> Vec<u16> {
    bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect()
}

fn run_to_halt(words: &[u16]) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.load_words(words, 0);
    loop {
        let (outcome, _) = cpu.step().unwrap();
        if outcome == StepOutcome::Halted {
            return cpu;
        }
    }
}

#[test]
fn hello_byte_scenario_assembles_and_runs() {
    let words = bytes_to_words(&assemble_str("MOV A, 0x48\nOUTB 0, A\nHALT\n"));
    let mut cpu = Cpu::new();
    cpu.load_words(&words, 0);
    let mut printed = String::new();
    loop {
        let (outcome, c) = cpu.step().unwrap();
        if let Some(c) = c {
            printed.push(c);
        }
        if outcome == StepOutcome::Halted {
            break;
        }
    }
    assert_eq!(printed, "H");
    assert_eq!(cpu.registers().get(RegisterId::A), 0x48);
}

#[test]
fn loop_counter_scenario_resolves_the_backward_label() {
    let source = "MOV A, 5\nL: DEC A\nJNZ L\nHALT\n";
    let words = bytes_to_words(&assemble_str(source));
    let cpu = run_to_halt(&words);
    assert_eq!(cpu.registers().get(RegisterId::A), 0);
    assert!(cpu.registers().flag(Flag::Zero));
}

#[test]
fn stack_round_trip_scenario() {
    let source = "MOV A, 0xBEEF\nPUSH A\nMOV A, 0\nPOP A\nHALT\n";
    let words = bytes_to_words(&assemble_str(source));
    let cpu = run_to_halt(&words);
    assert_eq!(cpu.registers().get(RegisterId::A), 0xBEEF);
    assert_eq!(cpu.registers().sp(), 0xFEFF);
}

#[test]
fn conditional_branch_scenario_resolves_the_forward_label() {
    let source = "MOV A, 1\nCMP A, 1\nJZ SKIP\nMOV B, 0xDEAD\nSKIP: HALT\n";
    let words = bytes_to_words(&assemble_str(source));
    let cpu = run_to_halt(&words);
    assert_eq!(cpu.registers().get(RegisterId::B), 0);
    assert!(cpu.registers().flag(Flag::Zero));
}

#[test]
fn rom_write_scenario_is_rejected_but_still_assembles() {
    let source = "MOV A, 0xFFFF\nPUT [0x0010], A\nHALT\n";
    let words = bytes_to_words(&assemble_str(source));
    let cpu = run_to_halt(&words);
    assert_eq!(cpu.memory().raw(0x0010), 0);
}

#[test]
fn macro_expansion_scenario_doubles_a_register() {
    let source = "MACRO dbl %r\nADD %r, %r\nEND MACRO\nMOV A, 3\ndbl A\nHALT\n";
    let bytes = assemble_str(source);
    // 1 (MOV imm) + 2 (ADD reg) + 2 (MOV imm is 2, ADD reg is 1)... sizes:
    // MOV A,3 -> 2 words, ADD A,A -> 1 word, HALT -> 1 word = 4 words = 8 bytes.
    assert_eq!(bytes.len(), 8);
    let words = bytes_to_words(&bytes);
    let cpu = run_to_halt(&words);
    assert_eq!(cpu.registers().get(RegisterId::A), 6);
}

#[test]
fn data_directive_emits_one_word_per_number_and_character() {
    let words = bytes_to_words(&assemble_str("DATA 1, 2, \"hi\"\nHALT\n"));
    assert_eq!(&words[0..4], &[1, 2, 'h' as u16, 'i' as u16]);
}

#[test]
fn get_put_bracket_syntax_selects_memory_direct_or_indirect_mode() {
    let source = "MOV B, 0x9000\nPUT [B], A\nGET A, [0x9000]\nHALT\n";
    let words = bytes_to_words(&assemble_str(source));
    // MOV B,0x9000 (2 words), PUT [B],A indirect (1 word), GET A,[imm] direct (2 words), HALT (1 word).
    assert_eq!(words.len(), 6);
    let put_word = isa::decode(words[2], None).unwrap();
    assert_eq!(put_word.opcode, isa::Opcode::PUT);
    assert_eq!(put_word.mode, isa::AddressingMode::MemIndirect);
    let get_word = isa::decode(words[3], Some(words[4])).unwrap();
    assert_eq!(get_word.opcode, isa::Opcode::GET);
    assert_eq!(get_word.mode, isa::AddressingMode::MemDirect);
}

#[test]
fn duplicate_label_is_a_fatal_semantic_error() {
    let err = assemble("L: HALT\nL: NOP\n", Path::new("test.jasm")).unwrap_err();
    assert!(matches!(err, Error::Semantic { .. }));
}

#[test]
fn unknown_label_reference_is_a_fatal_semantic_error() {
    let err = assemble("JMP nowhere\nHALT\n", Path::new("test.jasm")).unwrap_err();
    assert!(matches!(err, Error::Semantic { .. }));
}

#[test]
fn data_number_out_of_word_range_is_a_fatal_error() {
    let err = assemble("DATA 0x10000\nHALT\n", Path::new("test.jasm")).unwrap_err();
    assert!(matches!(err, Error::ImmediateOutOfRange { .. }));
}

#[test]
fn macro_arity_mismatch_is_a_fatal_macro_error() {
    let source = "MACRO dbl %r\nADD %r, %r\nEND MACRO\ndbl A, B\nHALT\n";
    let err = assemble(source, Path::new("test.jasm")).unwrap_err();
    assert!(matches!(err, Error::Macro { .. }));
}

#[test]
fn macro_redefinition_keeps_the_first_definition() {
    let source = "MACRO dbl %r\nADD %r, %r\nEND MACRO\nMACRO dbl %r\nSUB %r, %r\nEND MACRO\nMOV A, 3\ndbl A\nHALT\n";
    let words = bytes_to_words(&assemble_str(source));
    let cpu = run_to_halt(&words);
    assert_eq!(cpu.registers().get(RegisterId::A), 6, "the second (SUB) definition must be ignored");
}

#[test]
fn import_splices_the_imported_files_nodes_in_place() {
    let dir = std::env::temp_dir().join(format!("vasm_test_import_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let lib_path = dir.join("lib.jasm");
    std::fs::write(&lib_path, "MOV B, 1\n").unwrap();

    let main_path = dir.join("main.jasm");
    let source = "IMPORT \"lib.jasm\"\nADD A, B\nHALT\n";
    std::fs::write(&main_path, source).unwrap();

    let bytes = assemble(source, &main_path).unwrap();
    let words = bytes_to_words(&bytes);
    let cpu = run_to_halt(&words);
    assert_eq!(cpu.registers().get(RegisterId::A), 1);

    let _ = std::fs::remove_dir_all(&dir);
}
