//! Runtime errors for the IPPcode interpreter.
//!
//! Every failure belongs to one [`ErrorKind`], and every kind has a fixed
//! process exit code. The interpreter stops at the first error and reports
//! it as a [`Fault`] pointing at the instruction that raised it.

use std::fmt;
use std::io;

use ippcode_common::{DecodeError, InstructionRecord};
use thiserror::Error;

/// Error categories, each with its own exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Semantic error in the program: labels, redefinitions, frame selectors,
    /// unknown opcodes. Exit code 52.
    Semantic,
    /// Operand of the wrong kind. Exit code 53.
    WrongType,
    /// Write to a variable that was never defined. Exit code 54.
    MissingVariable,
    /// Frame does not exist. Exit code 55.
    Frame,
    /// Missing value on the data stack or call stack. Exit code 56.
    MissingValue,
    /// Bad operand value. Exit code 57.
    WrongValue,
    /// Bad string operation. Exit code 58.
    String,
    /// Output or input stream failure. Exit code 99.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Semantic => 52,
            ErrorKind::WrongType => 53,
            ErrorKind::MissingVariable => 54,
            ErrorKind::Frame => 55,
            ErrorKind::MissingValue => 56,
            ErrorKind::WrongValue => 57,
            ErrorKind::String => 58,
            ErrorKind::Io => 99,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Semantic => "semantic error",
            ErrorKind::WrongType => "wrong operand type",
            ErrorKind::MissingVariable => "missing variable",
            ErrorKind::Frame => "frame error",
            ErrorKind::MissingValue => "missing value",
            ErrorKind::WrongValue => "wrong operand value",
            ErrorKind::String => "string error",
            ErrorKind::Io => "i/o error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that occur while executing one instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    // ---- Semantic (52) ----
    #[error("label '{label}' is defined more than once")]
    DuplicateLabel { label: String },

    #[error("undefined label '{label}'")]
    UndefinedLabel { label: String },

    #[error("variable {var} is already defined")]
    Redefinition { var: String },

    /// Frame selector that is not GF/LF/TF, or a TF definition with no
    /// temporary frame.
    #[error("frame '{frame}' cannot be used here")]
    InvalidFrame { frame: String },

    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),

    #[error("{opcode} takes {expected} argument(s), found {found}")]
    ArityMismatch {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    // ---- Wrong type (53) ----
    #[error("{opcode} expects {expected}, found {found}")]
    TypeMismatch {
        opcode: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("malformed variable '{0}' (expected FRAME@name)")]
    MalformedVariable(String),

    // ---- Missing variable (54) ----
    #[error("variable {var} is not defined")]
    UndefinedVariable { var: String },

    // ---- Frame (55) ----
    #[error("frame {frame} does not exist")]
    MissingFrame { frame: String },

    #[error("variable {var} does not exist")]
    UnknownVariable { var: String },

    #[error("no temporary frame to push")]
    NoTemporaryFrame,

    #[error("frame stack is empty")]
    EmptyFrameStack,

    // ---- Missing value (56) ----
    #[error("data stack is empty")]
    EmptyDataStack,

    #[error("call stack is empty")]
    EmptyCallStack,

    // ---- Wrong value (57) ----
    #[error("division by zero")]
    DivisionByZero,

    #[error("exit code {0} out of range 0..=9")]
    InvalidExitCode(i64),

    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),

    // ---- String (58) ----
    #[error("index {index} out of range for string of length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    #[error("{0} is not a valid character code")]
    InvalidCodePoint(i64),

    #[error("replacement string is empty")]
    EmptyReplacement,

    // ---- I/O (99) ----
    #[error("stream failure: {0}")]
    Io(String),
}

impl RuntimeError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::DuplicateLabel { .. }
            | RuntimeError::UndefinedLabel { .. }
            | RuntimeError::Redefinition { .. }
            | RuntimeError::InvalidFrame { .. }
            | RuntimeError::UnknownOpcode(_)
            | RuntimeError::ArityMismatch { .. } => ErrorKind::Semantic,

            RuntimeError::TypeMismatch { .. } | RuntimeError::MalformedVariable(_) => {
                ErrorKind::WrongType
            }

            RuntimeError::UndefinedVariable { .. } => ErrorKind::MissingVariable,

            RuntimeError::MissingFrame { .. }
            | RuntimeError::UnknownVariable { .. }
            | RuntimeError::NoTemporaryFrame
            | RuntimeError::EmptyFrameStack => ErrorKind::Frame,

            RuntimeError::EmptyDataStack | RuntimeError::EmptyCallStack => {
                ErrorKind::MissingValue
            }

            RuntimeError::DivisionByZero
            | RuntimeError::InvalidExitCode(_)
            | RuntimeError::InvalidInteger(_) => ErrorKind::WrongValue,

            RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::InvalidCodePoint(_)
            | RuntimeError::EmptyReplacement => ErrorKind::String,

            RuntimeError::Io(_) => ErrorKind::Io,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

impl From<DecodeError> for RuntimeError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownOpcode(token) => RuntimeError::UnknownOpcode(token),
            DecodeError::ArityMismatch {
                opcode,
                expected,
                found,
            } => RuntimeError::ArityMismatch {
                opcode,
                expected,
                found,
            },
            DecodeError::InvalidInteger(text) => RuntimeError::InvalidInteger(text),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(err: io::Error) -> Self {
        RuntimeError::Io(err.to_string())
    }
}

/// A runtime error together with the instruction that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error} (instruction {order}, {opcode})")]
pub struct Fault {
    /// Position in the sorted program.
    pub position: usize,
    /// The record's `order` value.
    pub order: i64,
    /// Opcode token as written in the record.
    pub opcode: String,
    #[source]
    pub error: RuntimeError,
}

impl Fault {
    pub fn new(position: usize, record: &InstructionRecord, error: RuntimeError) -> Self {
        Self {
            position,
            order: record.order,
            opcode: record.opcode.clone(),
            error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Process exit status for this fault.
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}
