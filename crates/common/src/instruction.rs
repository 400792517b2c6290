//! Instruction records and their decoded form.
//!
//! A program source hands the interpreter [`InstructionRecord`]s: an opcode
//! token, an `order` index, and up to three `(text, kind)` argument pairs.
//! The interpreter decodes each record into an [`Instruction`] right before
//! executing it, so a malformed record is only an error if it is reached.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::opcode::Opcode;
use crate::value::Value;

/// Declared kind of an instruction argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// A `FRAME@name` variable reference.
    Var,
    Int,
    Bool,
    String,
    Nil,
    /// A label name.
    Label,
    /// A kind name, as used by `READ`.
    Type,
}

impl ArgKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArgKind::Var => "var",
            ArgKind::Int => "int",
            ArgKind::Bool => "bool",
            ArgKind::String => "string",
            ArgKind::Nil => "nil",
            ArgKind::Label => "label",
            ArgKind::Type => "type",
        }
    }
}

/// One argument of an instruction record, exactly as the source provided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArg {
    pub kind: ArgKind,
    #[serde(default)]
    pub text: String,
}

impl RawArg {
    pub fn new(kind: ArgKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// An instruction as produced by a program source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRecord {
    /// Opcode token, any letter case.
    pub opcode: String,
    /// Position key. Records execute in ascending `order`.
    pub order: i64,
    #[serde(default)]
    pub args: Vec<RawArg>,
}

impl InstructionRecord {
    pub fn new(opcode: impl Into<String>, order: i64, args: Vec<RawArg>) -> Self {
        Self {
            opcode: opcode.into(),
            order,
            args,
        }
    }

    /// Returns true if this record is a `LABEL`, in any letter case.
    pub fn is_label(&self) -> bool {
        self.opcode.eq_ignore_ascii_case(Opcode::Label.mnemonic())
    }
}

/// Renders the record as one line of IPPcode listing, e.g.
/// `MOVE GF@x int@5`.
impl fmt::Display for InstructionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opcode.to_ascii_uppercase())?;
        for arg in &self.args {
            match arg.kind {
                ArgKind::Var | ArgKind::Label | ArgKind::Type => write!(f, " {}", arg.text)?,
                ArgKind::Nil => f.write_str(" nil@nil")?,
                kind => write!(f, " {}@{}", kind.name(), arg.text)?,
            }
        }
        Ok(())
    }
}

/// A decoded instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Variable reference, resolved against the frames at execution time.
    Var(String),
    /// A literal value.
    Const(Value),
    /// A label name.
    Label(String),
    /// A kind name.
    Type(String),
}

impl Argument {
    /// Builds an argument from raw text and its declared kind.
    ///
    /// `int` text must be a signed decimal literal (surrounding whitespace is
    /// ignored). `bool` is true only for `true` in any letter case. `nil`
    /// ignores its text. Other kinds keep the text verbatim.
    pub fn new(text: &str, kind: ArgKind) -> Result<Self, DecodeError> {
        let arg = match kind {
            ArgKind::Int => {
                let n = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| DecodeError::InvalidInteger(text.to_string()))?;
                Argument::Const(Value::Int(n))
            }
            ArgKind::Bool => Argument::Const(Value::Bool(text.trim().eq_ignore_ascii_case("true"))),
            ArgKind::String => Argument::Const(Value::Str(text.to_string())),
            ArgKind::Nil => Argument::Const(Value::Nil),
            ArgKind::Var => Argument::Var(text.to_string()),
            ArgKind::Label => Argument::Label(text.to_string()),
            ArgKind::Type => Argument::Type(text.to_string()),
        };
        Ok(arg)
    }

    /// Short description of what the argument is, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Argument::Var(name) => format!("variable {name}"),
            Argument::Const(value) => value.kind().name().to_string(),
            Argument::Label(_) => "label".to_string(),
            Argument::Type(_) => "type".to_string(),
        }
    }
}

/// A decoded, executable instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub order: i64,
    /// Exactly `opcode.arity()` arguments.
    pub args: Vec<Argument>,
}

impl Instruction {
    /// Decode a record: resolve the opcode token, check the argument count,
    /// and build each argument.
    pub fn decode(record: &InstructionRecord) -> Result<Self, DecodeError> {
        let opcode: Opcode = record.opcode.parse()?;

        if record.args.len() != opcode.arity() {
            return Err(DecodeError::ArityMismatch {
                opcode: opcode.mnemonic(),
                expected: opcode.arity(),
                found: record.args.len(),
            });
        }

        let args = record
            .args
            .iter()
            .map(|arg| Argument::new(&arg.text, arg.kind))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            opcode,
            order: record.order,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(opcode: &str, args: Vec<RawArg>) -> InstructionRecord {
        InstructionRecord::new(opcode, 1, args)
    }

    // --- Argument construction ---

    #[test]
    fn int_argument() {
        assert_eq!(
            Argument::new("-42", ArgKind::Int),
            Ok(Argument::Const(Value::Int(-42)))
        );
        assert_eq!(
            Argument::new("+7", ArgKind::Int),
            Ok(Argument::Const(Value::Int(7)))
        );
        assert_eq!(
            Argument::new(" 10 ", ArgKind::Int),
            Ok(Argument::Const(Value::Int(10)))
        );
    }

    #[test]
    fn int_argument_rejects_non_numeric() {
        for text in ["", "abc", "1.5", "12a", "0x10", "99999999999999999999"] {
            assert_eq!(
                Argument::new(text, ArgKind::Int),
                Err(DecodeError::InvalidInteger(text.into())),
                "'{text}' should be rejected"
            );
        }
    }

    #[test]
    fn bool_argument_is_permissive() {
        assert_eq!(
            Argument::new("true", ArgKind::Bool),
            Ok(Argument::Const(Value::Bool(true)))
        );
        assert_eq!(
            Argument::new("TRUE", ArgKind::Bool),
            Ok(Argument::Const(Value::Bool(true)))
        );
        for text in ["false", "", "1", "yes", "tru"] {
            assert_eq!(
                Argument::new(text, ArgKind::Bool),
                Ok(Argument::Const(Value::Bool(false)))
            );
        }
    }

    #[test]
    fn string_argument_keeps_text() {
        assert_eq!(
            Argument::new("a\\032b", ArgKind::String),
            Ok(Argument::Const(Value::Str("a\\032b".into())))
        );
        assert_eq!(
            Argument::new("", ArgKind::String),
            Ok(Argument::Const(Value::Str(String::new())))
        );
    }

    #[test]
    fn nil_argument_ignores_text() {
        assert_eq!(
            Argument::new("whatever", ArgKind::Nil),
            Ok(Argument::Const(Value::Nil))
        );
    }

    #[test]
    fn deferred_arguments_pass_through() {
        assert_eq!(
            Argument::new("GF@x", ArgKind::Var),
            Ok(Argument::Var("GF@x".into()))
        );
        assert_eq!(
            Argument::new("loop", ArgKind::Label),
            Ok(Argument::Label("loop".into()))
        );
        assert_eq!(
            Argument::new("int", ArgKind::Type),
            Ok(Argument::Type("int".into()))
        );
    }

    // --- Decoding ---

    #[test]
    fn decode_lowercase_opcode() {
        let rec = record(
            "move",
            vec![
                RawArg::new(ArgKind::Var, "GF@x"),
                RawArg::new(ArgKind::Int, "5"),
            ],
        );
        let instr = Instruction::decode(&rec).unwrap();
        assert_eq!(instr.opcode, Opcode::Move);
        assert_eq!(
            instr.args,
            vec![
                Argument::Var("GF@x".into()),
                Argument::Const(Value::Int(5))
            ]
        );
    }

    #[test]
    fn decode_unknown_opcode() {
        let rec = record("NOP", vec![]);
        assert_eq!(
            Instruction::decode(&rec),
            Err(DecodeError::UnknownOpcode("NOP".into()))
        );
    }

    #[test]
    fn decode_wrong_arity() {
        let rec = record("DEFVAR", vec![]);
        assert_eq!(
            Instruction::decode(&rec),
            Err(DecodeError::ArityMismatch {
                opcode: "DEFVAR",
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn decode_bad_int_argument() {
        let rec = record("WRITE", vec![RawArg::new(ArgKind::Int, "ten")]);
        assert_eq!(
            Instruction::decode(&rec),
            Err(DecodeError::InvalidInteger("ten".into()))
        );
    }

    #[test]
    fn is_label_any_case() {
        assert!(record("LABEL", vec![]).is_label());
        assert!(record("label", vec![]).is_label());
        assert!(!record("JUMP", vec![]).is_label());
    }

    // --- Listing ---

    #[test]
    fn display_listing_line() {
        let rec = record(
            "jumpifeq",
            vec![
                RawArg::new(ArgKind::Label, "end"),
                RawArg::new(ArgKind::Var, "LF@n"),
                RawArg::new(ArgKind::Nil, "nil"),
            ],
        );
        assert_eq!(rec.to_string(), "JUMPIFEQ end LF@n nil@nil");

        let rec = record(
            "READ",
            vec![
                RawArg::new(ArgKind::Var, "GF@s"),
                RawArg::new(ArgKind::Type, "string"),
            ],
        );
        assert_eq!(rec.to_string(), "READ GF@s string");

        let rec = record("WRITE", vec![RawArg::new(ArgKind::String, "hi\\032there")]);
        assert_eq!(rec.to_string(), "WRITE string@hi\\032there");
    }

    // --- Serde ---

    #[test]
    fn deserialize_record() {
        let json = r#"{"opcode":"MOVE","order":3,"args":[
            {"kind":"var","text":"GF@x"},{"kind":"bool","text":"true"}]}"#;
        let rec: InstructionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.order, 3);
        assert_eq!(rec.args[1], RawArg::new(ArgKind::Bool, "true"));
    }

    #[test]
    fn deserialize_defaults() {
        let rec: InstructionRecord =
            serde_json::from_str(r#"{"opcode":"CREATEFRAME","order":1}"#).unwrap();
        assert!(rec.args.is_empty());

        let arg: RawArg = serde_json::from_str(r#"{"kind":"string"}"#).unwrap();
        assert_eq!(arg.text, "");
    }

    #[test]
    fn deserialize_rejects_unknown_kind() {
        let result = serde_json::from_str::<RawArg>(r#"{"kind":"float","text":"1.0"}"#);
        assert!(result.is_err());
    }
}
