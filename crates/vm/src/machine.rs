//! Interpreter state and the fetch-decode-execute loop.

use ippcode_common::{Argument, Instruction, InstructionRecord, Opcode, Program, Value};
use tracing::{debug, trace, warn};

use crate::control::ControlUnit;
use crate::error::{Fault, RuntimeError};
use crate::execute::Flow;
use crate::io::{InputSource, OutputSink};
use crate::memory::Memory;

/// The streams an interpreter talks to.
pub struct Streams<'a> {
    /// WRITE output.
    pub stdout: &'a mut dyn OutputSink,
    /// DPRINT and BREAK output.
    pub stderr: &'a mut dyn OutputSink,
    /// READ input.
    pub input: &'a mut dyn InputSource,
}

/// Interpreter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Text BREAK writes to the debug sink.
    pub break_marker: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            break_marker: "BREAK\n".to_string(),
        }
    }
}

/// How a run ended without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Execution ran past the last instruction.
    Finished,
    /// `EXIT` ran with this code.
    Exited(u8),
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Finished => 0,
            Outcome::Exited(code) => i32::from(*code),
        }
    }
}

/// The IPPcode interpreter.
pub struct Interpreter<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Frames and the data stack.
    pub(crate) memory: Memory,
    /// Labels, program counter, and call stack.
    pub(crate) control: ControlUnit,
    pub(crate) io: Streams<'a>,
    pub(crate) config: InterpreterConfig,
    /// Instructions executed so far.
    pub(crate) executed: u64,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter for the given program.
    pub fn new(program: &'a Program, io: Streams<'a>) -> Self {
        Self::with_config(program, io, InterpreterConfig::default())
    }

    pub fn with_config(program: &'a Program, io: Streams<'a>, config: InterpreterConfig) -> Self {
        Self {
            program,
            memory: Memory::new(),
            control: ControlUnit::default(),
            io,
            config,
            executed: 0,
        }
    }

    /// Frames and data stack, for inspection after a run.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Number of instructions executed so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Run the program until it falls off the end, hits EXIT, or faults.
    ///
    /// Both sinks are flushed before returning, whatever the outcome.
    pub fn execute(&mut self) -> Result<Outcome, Fault> {
        let result = self.run_loop();

        let flushed = self
            .io
            .stdout
            .flush()
            .and_then(|()| self.io.stderr.flush());

        match (&result, flushed) {
            (Err(fault), _) => {
                warn!(
                    order = fault.order,
                    opcode = %fault.opcode,
                    code = fault.exit_code(),
                    "run aborted: {}",
                    fault.error
                );
            }
            (Ok(outcome), Err(e)) => {
                // Report the lost output against the last executed record.
                let position = self.control.pc().min(self.program.len().saturating_sub(1));
                if let Some(record) = self.program.get(position) {
                    return Err(Fault::new(position, record, e.into()));
                }
                debug!(?outcome, "output flush failed: {e}");
            }
            (Ok(outcome), Ok(())) => {
                debug!(?outcome, executed = self.executed, "run finished");
            }
        }

        result
    }

    fn run_loop(&mut self) -> Result<Outcome, Fault> {
        let program = self.program;
        self.control = ControlUnit::scan(program)?;
        debug!(instructions = program.len(), "starting run");

        while let Some(record) = program.get(self.control.pc()) {
            let position = self.control.pc();
            trace!(position, order = record.order, opcode = %record.opcode, "execute");
            self.executed += 1;

            match self.step(record) {
                Ok(Flow::Continue) => self.control.advance(),
                Ok(Flow::Exit(code)) => return Ok(Outcome::Exited(code)),
                Err(error) => return Err(Fault::new(position, record, error)),
            }
        }

        Ok(Outcome::Finished)
    }

    fn step(&mut self, record: &InstructionRecord) -> Result<Flow, RuntimeError> {
        let instr = Instruction::decode(record)?;
        self.dispatch(&instr)
    }

    // ---- Operand helpers ----

    /// Resolve an argument to a value: variables through the frames,
    /// literals as-is. Label and type arguments are not values.
    pub(crate) fn value(&self, opcode: Opcode, arg: &Argument) -> Result<Value, RuntimeError> {
        match arg {
            Argument::Var(raw) => Ok(self.memory.read(raw)?.to_value()),
            Argument::Const(value) => Ok(value.clone()),
            Argument::Label(_) | Argument::Type(_) => Err(RuntimeError::TypeMismatch {
                opcode: opcode.mnemonic(),
                expected: "a value",
                found: arg.describe(),
            }),
        }
    }

    /// The variable an instruction writes its result to.
    pub(crate) fn target<'i>(&self, opcode: Opcode, arg: &'i Argument) -> Result<&'i str, RuntimeError> {
        match arg {
            Argument::Var(raw) => Ok(raw),
            _ => Err(RuntimeError::TypeMismatch {
                opcode: opcode.mnemonic(),
                expected: "a variable",
                found: arg.describe(),
            }),
        }
    }

    /// Store a result into the variable named by `arg`.
    pub(crate) fn store(&mut self, opcode: Opcode, arg: &Argument, value: Value) -> Result<(), RuntimeError> {
        let raw = self.target(opcode, arg)?;
        self.memory.write(raw, value)
    }

    /// Label name of a jump/call argument. A variable or string literal
    /// holding text also names a label.
    pub(crate) fn label_name(&self, opcode: Opcode, arg: &Argument) -> Result<String, RuntimeError> {
        let found = match arg {
            Argument::Label(name) => return Ok(name.clone()),
            Argument::Var(raw) => self.memory.read(raw)?.to_value(),
            Argument::Const(value) => value.clone(),
            Argument::Type(_) => {
                return Err(RuntimeError::TypeMismatch {
                    opcode: opcode.mnemonic(),
                    expected: "a label",
                    found: arg.describe(),
                })
            }
        };

        match found {
            Value::Str(name) => Ok(name),
            other => Err(RuntimeError::TypeMismatch {
                opcode: opcode.mnemonic(),
                expected: "a label",
                found: other.kind().name().to_string(),
            }),
        }
    }
}
