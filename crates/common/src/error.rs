//! Decode errors for IPPcode instruction records.

use thiserror::Error;

/// Errors that occur while turning an instruction record into an
/// executable [`Instruction`](crate::Instruction).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The opcode token does not name any instruction.
    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),

    /// The record carries the wrong number of arguments for its opcode.
    #[error("{opcode} takes {expected} argument(s), found {found}")]
    ArityMismatch {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// An `int` argument whose text is not a signed decimal literal.
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),
}
