#[macro_use]
extern crate clap;

use clap::Arg;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Assembly source file (.jasm)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Path to write the assembled binary image (default a.bin)"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .long("verbose")
                .takes_value(true)
                .value_name("0..3")
                .help("Log verbosity: 0=error, 1=warn, 2=info, 3=debug"),
        )
        .arg(
            Arg::with_name("no_warnings")
                .long("nw")
                .help("Suppress warning diagnostics (duplicate imports, macro redefinitions)"),
        )
        .get_matches();

    let level = match matches.value_of("verbosity").unwrap_or("1") {
        "0" => log::LevelFilter::Error,
        "1" => log::LevelFilter::Warn,
        "2" => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let level = if matches.is_present("no_warnings") && level == log::LevelFilter::Warn {
        log::LevelFilter::Error
    } else {
        level
    };
    env_logger::Builder::new().filter_level(level).init();

    let input_path = Path::new(matches.value_of("INPUT").unwrap());
    let output_path: PathBuf =
        matches.value_of("output").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("a.bin"));

    process::exit(match run(input_path, &output_path) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}: {}", input_path.display(), err);
            1
        }
    });
}

fn run(input_path: &Path, output_path: &Path) -> vasm::Result<()> {
    let bytes = vasm::assemble_file(input_path)?;
    std::fs::write(output_path, bytes)?;
    Ok(())
}
