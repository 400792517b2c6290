//! Opcode definitions for the IPPcode instruction set.

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// Opcode tokens in instruction records are matched case-insensitively;
/// [`Opcode::mnemonic`] gives the canonical upper-case spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames & variables
    /// Copy a value into a variable.
    Move,
    /// Replace the temporary frame with a fresh empty one.
    CreateFrame,
    /// Move the temporary frame onto the frame stack.
    PushFrame,
    /// Move the top of the frame stack back into the temporary frame.
    PopFrame,
    /// Define a variable in a frame.
    DefVar,

    // Calls
    /// Save the position and jump to a label.
    Call,
    /// Jump back to the last saved position.
    Return,

    // Data stack
    /// Push a value onto the data stack.
    Pushs,
    /// Pop the data stack into a variable.
    Pops,

    // Arithmetic
    Add,
    Sub,
    Mul,
    /// Integer division. Division by zero is a runtime error.
    Idiv,

    // Relational
    Lt,
    Gt,
    Eq,

    // Logic
    And,
    Or,
    Not,

    // Conversions
    /// Code point to a one-character string.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,

    // I/O
    /// Read one value of a named kind from the input source.
    Read,
    /// Write a value to the output sink.
    Write,

    // Strings
    Concat,
    Strlen,
    GetChar,
    SetChar,

    // Types
    /// Store the kind name of a value.
    Type,

    // Control flow
    /// Mark a position. No runtime effect.
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    /// Stop the program with an exit code in `0..=9`.
    Exit,

    // Debugging
    /// Write a value to the debug sink.
    Dprint,
    /// Write a diagnostic marker to the debug sink.
    Break,
}

/// All opcodes, in definition order.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Idiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::Dprint,
    Opcode::Break,
];

impl Opcode {
    /// Returns the canonical upper-case mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Idiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::Dprint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Number of arguments the instruction takes.
    pub fn arity(&self) -> usize {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => 0,

            Opcode::DefVar
            | Opcode::Call
            | Opcode::Pushs
            | Opcode::Pops
            | Opcode::Write
            | Opcode::Label
            | Opcode::Jump
            | Opcode::Exit
            | Opcode::Dprint => 1,

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Read
            | Opcode::Strlen
            | Opcode::Type => 2,

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Idiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar
            | Opcode::JumpIfEq
            | Opcode::JumpIfNeq => 3,
        }
    }
}

impl FromStr for Opcode {
    type Err = DecodeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        ALL_OPCODES
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(token))
            .ok_or_else(|| DecodeError::UnknownOpcode(token.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 35);
    }

    #[test]
    fn mnemonics_are_unique() {
        let names: HashSet<_> = ALL_OPCODES.iter().map(|op| op.mnemonic()).collect();
        assert_eq!(names.len(), ALL_OPCODES.len());
    }

    #[test]
    fn parse_roundtrip_all_opcodes() {
        for &op in &ALL_OPCODES {
            let parsed: Opcode = op.mnemonic().parse().unwrap();
            assert_eq!(parsed, op, "roundtrip failed for {op:?}");
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("move".parse::<Opcode>(), Ok(Opcode::Move));
        assert_eq!("JumpIfNeq".parse::<Opcode>(), Ok(Opcode::JumpIfNeq));
        assert_eq!("int2char".parse::<Opcode>(), Ok(Opcode::Int2Char));
    }

    #[test]
    fn parse_unknown_opcode() {
        assert_eq!(
            "HALT".parse::<Opcode>(),
            Err(DecodeError::UnknownOpcode("HALT".into()))
        );
        assert_eq!(
            " MOVE".parse::<Opcode>(),
            Err(DecodeError::UnknownOpcode(" MOVE".into()))
        );
    }

    #[test]
    fn arities() {
        assert_eq!(Opcode::CreateFrame.arity(), 0);
        assert_eq!(Opcode::Break.arity(), 0);
        assert_eq!(Opcode::DefVar.arity(), 1);
        assert_eq!(Opcode::Exit.arity(), 1);
        assert_eq!(Opcode::Move.arity(), 2);
        assert_eq!(Opcode::Read.arity(), 2);
        assert_eq!(Opcode::Idiv.arity(), 3);
        assert_eq!(Opcode::JumpIfEq.arity(), 3);
        assert_eq!(Opcode::SetChar.arity(), 3);
    }
}
