//! IPPcode interpreter: executes order-sorted instruction records.
//!
//! The machine has:
//! - a global frame, a stack of local frames, and an optional temporary frame
//! - a data stack for PUSHS/POPS
//! - a call stack of return positions
//!
//! Records are decoded as they are fetched, so a malformed record only
//! faults when the program actually reaches it.
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{ArgKind, InstructionRecord, Program, RawArg};
//! use ippcode_vm::{run, LineSource, Outcome, Streams, WriterSink};
//!
//! let program = Program::new(vec![
//!     InstructionRecord::new("WRITE", 1, vec![RawArg::new(ArgKind::String, "hi\\010")]),
//! ]);
//!
//! let mut stdout = WriterSink::new(Vec::new());
//! let mut stderr = WriterSink::new(Vec::new());
//! let mut input = LineSource::new(&b""[..]);
//! let outcome = run(
//!     &program,
//!     Streams { stdout: &mut stdout, stderr: &mut stderr, input: &mut input },
//! )
//! .unwrap();
//!
//! assert_eq!(outcome, Outcome::Finished);
//! assert_eq!(stdout.into_inner(), b"hi\n");
//! ```

pub mod control;
pub mod error;
pub mod execute;
pub mod io;
pub mod machine;
pub mod memory;

pub use error::{ErrorKind, Fault, RuntimeError};
pub use io::{InputSource, LineSource, OutputSink, WriterSink};
pub use machine::{Interpreter, InterpreterConfig, Outcome, Streams};
pub use memory::{Frame, FrameTag, Memory, Slot};

use ippcode_common::Program;

/// Execute a program with the default configuration.
///
/// # Errors
///
/// Returns a [`Fault`] naming the instruction that failed. Its
/// [`Fault::exit_code`] is the process status for the failure.
pub fn run<'a>(program: &'a Program, io: Streams<'a>) -> Result<Outcome, Fault> {
    Interpreter::new(program, io).execute()
}
