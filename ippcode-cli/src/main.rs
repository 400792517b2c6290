//! IPPcode CLI: list and execute programs of instruction records.
//!
//! Exit codes:
//! - 0: Success (or `EXIT 0`)
//! - 1-9: `EXIT n`
//! - 11: Cannot open the program or input file
//! - 31: Program file is not a valid record list
//! - 52-58: Runtime error, by category
//! - 99: Output stream failure

mod commands;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Interpreter for IPPcode programs.
#[derive(Parser)]
#[command(name = "ippcode", version, about)]
struct Cli {
    /// Log interpreter activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a program
    Run {
        /// JSON record list
        program: PathBuf,

        /// File READ takes its lines from (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the program as one instruction per line, in execution order
    List {
        /// JSON record list
        program: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("IPPCODE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let result = match &cli.command {
        Command::Run { program, input } => commands::run(program, input.as_deref()),
        Command::List { program } => commands::list(program),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
