//! CLI command implementations.

use std::fs;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

use ippcode_common::Program;
use ippcode_vm::{LineSource, Outcome, Streams, WriterSink};
use tracing::debug;

/// Cannot open the program or input file.
const EXIT_OPEN: i32 = 11;
/// The program file is not a well-formed record list.
const EXIT_FORMAT: i32 = 31;

/// Execute a program, with READ fed from `input` or stdin.
pub fn run(program_path: &Path, input: Option<&Path>) -> Result<(), i32> {
    let program = load(program_path)?;

    let reader: Box<dyn BufRead> = match input {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                eprintln!("error: cannot open '{}': {e}", path.display());
                EXIT_OPEN
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let mut stdout = WriterSink::new(BufWriter::new(io::stdout().lock()));
    let mut stderr = WriterSink::new(io::stderr());
    let mut source = LineSource::new(reader);

    let result = ippcode_vm::run(
        &program,
        Streams {
            stdout: &mut stdout,
            stderr: &mut stderr,
            input: &mut source,
        },
    );

    match result {
        Ok(Outcome::Finished) | Ok(Outcome::Exited(0)) => Ok(()),
        Ok(outcome) => Err(outcome.exit_code()),
        Err(fault) => {
            eprintln!("runtime error: {fault}");
            Err(fault.exit_code())
        }
    }
}

/// Print the program in execution order, one record per line.
pub fn list(program_path: &Path) -> Result<(), i32> {
    let program = load(program_path)?;
    for record in program.records() {
        println!("{:>4}  {record}", record.order);
    }
    Ok(())
}

fn load(path: &Path) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        EXIT_OPEN
    })?;

    let program = ippcode_cli::parse_program(&text).map_err(|e| {
        eprintln!("error: '{}' is not a valid record list: {e}", path.display());
        EXIT_FORMAT
    })?;

    debug!(path = %path.display(), records = program.len(), "program loaded");
    Ok(program)
}
