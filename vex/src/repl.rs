//! The interactive stdin loop around [`Debugger`]. This is the one part of
//! the crate that talks directly to stdio — every command's actual logic
//! lives in `debugger.rs` where it can be tested without a terminal.

use std::io::{self, Write};
use std::path::Path;

use log::error;

use crate::debugger::{Command, Debugger, RunReport};

pub fn run(mut debugger: Debugger) {
    println!("vex emulator shell");
    println!("type 'help' for a list of commands.");

    let stdin = io::stdin();
    loop {
        print!("vex> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            println!("bye!");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match crate::debugger::parse_command(&line) {
            Ok(Command::Quit) => {
                println!("bye!");
                break;
            }
            Ok(command) => dispatch(&mut debugger, command),
            Err(err) => error!("{}", err),
        }
    }
}

fn dispatch(debugger: &mut Debugger, command: Command) {
    match command {
        Command::Load { path, addr } => match debugger.load(Path::new(&path), addr) {
            Ok(bytes) => println!("loaded {} bytes at {:#06x}.", bytes, addr),
            Err(err) => error!("{}: {}", path, err),
        },
        Command::DevGraphics => {
            debugger.attach_graphics();
            println!("graphics device attached.");
        }
        Command::Run => report_run(debugger.run()),
        Command::Step => match debugger.step() {
            Ok((outcome, Some(c))) => {
                print!("{}", c);
                let _ = io::stdout().flush();
                if outcome == vmcore::StepOutcome::Halted {
                    println!("halted.");
                }
            }
            Ok((vmcore::StepOutcome::Halted, None)) => println!("halted."),
            Ok((vmcore::StepOutcome::Continue, None)) => {}
            Err(err) => error!("{}", err),
        },
        Command::Break { addr } => {
            debugger.add_breakpoint(addr);
            println!("breakpoint set at {:#06x}.", addr);
        }
        Command::BList => {
            let points: Vec<u16> = debugger.breakpoints().collect();
            println!("{} breakpoint{}{}", points.len(), if points.len() == 1 { "" } else { "s" }, if points.is_empty() { "." } else { ":" });
            for addr in points {
                println!("{:#06x}: {}", addr, debugger.disassemble(Some(addr)));
            }
        }
        Command::BClear => {
            let removed = debugger.clear_breakpoints();
            println!("removed {} breakpoint{}.", removed, if removed == 1 { "" } else { "s" });
        }
        Command::Regs => println!("{}", debugger.format_regs()),
        Command::Flags => println!("{}", debugger.format_flags()),
        Command::Set { reg, value } => match debugger.set_register(&reg, value) {
            Ok(()) => println!("set {} to {:#06x}.", reg.to_uppercase(), value),
            Err(err) => error!("{}", err),
        },
        Command::SetM { addr, value } => {
            debugger.set_memory(addr, value);
            println!("set memory at {:#06x} to {:#06x}.", addr, value);
        }
        Command::Mem { addr, words } => println!("{}", debugger.format_mem(addr, words)),
        Command::Disasm { addr } => println!("{}", debugger.disassemble(addr)),
        Command::Ports => println!("{}", debugger.format_ports()),
        Command::Vram => println!("{}", debugger.format_vram()),
        Command::Clear => {
            print!("\x1B[2J\x1B[1;1H");
            let _ = io::stdout().flush();
        }
        Command::Help => println!("{}", Debugger::help_text()),
        Command::Quit => unreachable!("handled by the caller before dispatch"),
    }
}

fn report_run(result: (RunReport, String)) {
    let (report, printed) = result;
    if !printed.is_empty() {
        print!("{}", printed);
        let _ = io::stdout().flush();
    }
    match report {
        RunReport::Exit(vmcore::ExitCode::Halted) => println!("halted."),
        RunReport::Exit(vmcore::ExitCode::Breakpoint(addr)) => println!("hit breakpoint at {:#06x}.", addr),
        RunReport::Exit(vmcore::ExitCode::UserInterrupt) => println!("interrupted."),
        RunReport::Error(err) => error!("{}", err),
    }
}
