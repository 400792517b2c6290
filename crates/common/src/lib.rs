//! IPPcode common types.
//!
//! This crate provides the data structures shared by the interpreter and
//! its front ends:
//!
//! - [`Opcode`]: the 35 IPPcode instructions
//! - [`Kind`]: runtime type tags
//! - [`Value`]: runtime values held in variables and on the data stack
//! - [`InstructionRecord`] / [`Instruction`]: instructions as supplied by a
//!   program source, and their decoded form
//! - [`Program`]: an order-sorted sequence of records
//! - [`DecodeError`]: errors from decoding records

pub mod error;
pub mod escape;
pub mod instruction;
pub mod kind;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use escape::decode_escapes;
pub use instruction::{ArgKind, Argument, Instruction, InstructionRecord, RawArg};
pub use kind::Kind;
pub use opcode::Opcode;
pub use program::Program;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy that generates a random opcode.
    fn arb_opcode() -> impl Strategy<Value = Opcode> {
        prop::sample::select(&opcode::ALL_OPCODES[..])
    }

    proptest! {
        /// Opcode tokens decode regardless of letter case.
        #[test]
        fn opcode_case_insensitive(op in arb_opcode(), mask in any::<u64>()) {
            let token: String = op
                .mnemonic()
                .chars()
                .enumerate()
                .map(|(i, c)| if mask >> (i % 64) & 1 == 1 { c.to_ascii_lowercase() } else { c })
                .collect();
            prop_assert_eq!(token.parse::<Opcode>(), Ok(op));
        }

        /// Every i64 written in decimal decodes to itself as an `int` argument.
        #[test]
        fn int_literals_decode(n in any::<i64>()) {
            prop_assert_eq!(
                Argument::new(&n.to_string(), ArgKind::Int),
                Ok(Argument::Const(Value::Int(n)))
            );
        }

        /// Text that is not a decimal integer never decodes as `int`.
        #[test]
        fn non_numeric_int_rejected(s in "[a-zA-Z_.]{1,12}") {
            prop_assert_eq!(
                Argument::new(&s, ArgKind::Int),
                Err(DecodeError::InvalidInteger(s.clone()))
            );
        }

        /// Any record with the wrong number of arguments fails to decode.
        #[test]
        fn arity_enforced(op in arb_opcode(), extra in 1usize..3) {
            let args = vec![RawArg::new(ArgKind::Nil, "nil"); op.arity() + extra];
            let record = InstructionRecord::new(op.mnemonic(), 1, args);
            let is_arity_error = matches!(
                Instruction::decode(&record),
                Err(DecodeError::ArityMismatch { .. })
            );
            prop_assert!(is_arity_error);
        }
    }
}
