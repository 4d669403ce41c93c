
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod assembler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tListing: {}\n\tOutfile: {}\n\tInfile: {}",
        args.occurrences_of("verbose"),
        args.is_present("print-debug"),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap()
    );

    let ipath = Path::new(args.value_of("INPUT").unwrap()).to_path_buf();

    // Open the path in read-only mode and pull every source line into
    // memory; the core consumes lines, not a reader.
    let ifile = match File::open(&ipath) {
        Err(err) => {
            error!("fatal: unable to open input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    let lines = match BufReader::new(ifile).lines().collect::<Result<Vec<String>, _>>() {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(lines) => lines,
    };

    let program = match assembler::parser::pass1(&lines) {
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        },
        Ok(program) => program,
    };

    let image = match assembler::emit::emit(&program) {
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        },
        Ok(image) => image,
    };

    if args.is_present("print-debug") {
        print_listing(&program, &image);
    }

    let opath = if let Some(filename) = args.value_of("output") {
        PathBuf::from(filename)
    } else {
        ipath.with_extension("bin")
    };

    // The output file is only created once assembly has fully
    // succeeded, and the image is written in a single call.
    let mut ofile = match File::create(&opath) {
        Err(err) => {
            error!("fatal: unable to open output file `{}`: {}", opath.display(), err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    if let Err(err) = ofile.write_all(&image) {
        error!("fatal: unable to write to output file `{}`: {}", opath.display(), err);
        std::process::exit(1);
    }

    info!("wrote `{}` ({} bytes)", opath.display(), image.len());
}

/// Prints the assembly listing: each instruction's PC, source form and
/// encoded bytes, aligned in a grid.
fn print_listing(program: &assembler::ast::Program, image: &[u8]) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for ins in program.instrs.iter() {
        let start = 4 + ins.pc as usize;
        let bytes = image[start..start + ins.op.size() as usize]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<String>>()
            .join(" ");

        grid.add(Cell::from(format!("0x{:04X}:", ins.pc)));
        grid.add(Cell::from(format!("{}", ins)));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(bytes));
    }

    println!("{}", grid.fit_into_columns(4));
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write output to an outfile (default: INPUT with a .bin extension)"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints the assembly listing alongside the binary to STDOUT"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stdout())
        .apply().ok();
}
