//! Program loading for the `ippcode` command line.
//!
//! Programs are JSON arrays of instruction records:
//!
//! ```json
//! [
//!   {"opcode": "DEFVAR", "order": 1, "args": [{"kind": "var", "text": "GF@x"}]},
//!   {"opcode": "WRITE", "order": 2, "args": [{"kind": "var", "text": "GF@x"}]}
//! ]
//! ```

use ippcode_common::{InstructionRecord, Program};

/// Parse a JSON record list into a program sorted by `order`.
///
/// Only the record shape is checked here. Opcodes and argument text are
/// decoded when the interpreter reaches each record.
pub fn parse_program(text: &str) -> Result<Program, serde_json::Error> {
    let records: Vec<InstructionRecord> = serde_json::from_str(text)?;
    Ok(Program::new(records))
}
