#[macro_use]
extern crate clap;

use clap::Arg;
use std::path::Path;
use std::process;

use log::error;
use vex::Debugger;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("BINARY")
                .help("Flat binary image to load at word address 0 (.bin)")
                .index(1),
        )
        .arg(
            Arg::with_name("run")
                .short("r")
                .long("run")
                .help("Run immediately after loading, before showing the prompt"),
        )
        .arg(
            Arg::with_name("graphics")
                .short("g")
                .long("graphics")
                .help("Auto-attach the video device on startup"),
        )
        .get_matches();

    env_logger::init();

    let mut debugger = Debugger::new();

    if let Some(path) = matches.value_of("BINARY") {
        match debugger.load(Path::new(path), 0) {
            Ok(bytes) => println!("loaded {} bytes from {}.", bytes, path),
            Err(err) => {
                error!("{}: {}", path, err);
                process::exit(1);
            }
        }
    }

    if matches.is_present("graphics") {
        debugger.attach_graphics();
    }

    if matches.is_present("run") {
        let (report, printed) = debugger.run();
        if !printed.is_empty() {
            print!("{}", printed);
        }
        match report {
            vex::RunReport::Exit(vmcore::ExitCode::Halted) => println!("halted."),
            vex::RunReport::Exit(vmcore::ExitCode::Breakpoint(addr)) => {
                println!("hit breakpoint at {:#06x}.", addr)
            }
            vex::RunReport::Exit(vmcore::ExitCode::UserInterrupt) => println!("interrupted."),
            vex::RunReport::Error(err) => error!("{}", err),
        }
    }

    vex::repl::run(debugger);
}
