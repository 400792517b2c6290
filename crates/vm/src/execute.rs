//! Opcode dispatch and instruction semantics.

use std::cmp::Ordering;

use ippcode_common::{decode_escapes, Argument, Instruction, Kind, Opcode, Value};
use tracing::debug;

use crate::error::RuntimeError;
use crate::io::OutputSink;
use crate::machine::Interpreter;

/// What the run loop does after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit(u8),
}

/// Which sink a value is printed to.
#[derive(Debug, Clone, Copy)]
enum Sink {
    Stdout,
    Stderr,
}

fn mismatch(opcode: Opcode, expected: &'static str, found: &[&Value]) -> RuntimeError {
    let found = found
        .iter()
        .map(|v| v.kind().name())
        .collect::<Vec<_>>()
        .join(" and ");
    RuntimeError::TypeMismatch {
        opcode: opcode.mnemonic(),
        expected,
        found,
    }
}

/// Equality as used by EQ and JUMPIFEQ: nil compares with anything,
/// otherwise the kinds must match.
fn loose_equals(opcode: Opcode, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    match (a, b) {
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Nil, _) | (_, Value::Nil) => Ok(false),
        _ if a.kind() == b.kind() => Ok(a == b),
        _ => Err(mismatch(opcode, "operands of the same kind", &[a, b])),
    }
}

/// Integer division truncating toward zero.
fn idiv(a: i64, b: i64) -> Result<i64, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(a.wrapping_div(b))
}

/// Checks `0 <= index < length` in characters and returns the position.
fn char_index(s: &str, index: i64) -> Result<usize, RuntimeError> {
    let length = s.chars().count();
    usize::try_from(index)
        .ok()
        .filter(|&i| i < length)
        .ok_or(RuntimeError::IndexOutOfRange { index, length })
}

/// Character at `index`, counted in characters.
fn char_at(s: &str, index: i64) -> Result<char, RuntimeError> {
    let pos = char_index(s, index)?;
    s.chars().nth(pos).ok_or(RuntimeError::IndexOutOfRange {
        index,
        length: s.chars().count(),
    })
}

impl<'a> Interpreter<'a> {
    /// Execute one decoded instruction.
    pub(crate) fn dispatch(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match instr.opcode {
            // Frames & variables
            Opcode::Move => self.exec_move(instr)?,
            Opcode::CreateFrame => self.memory.create_frame(),
            Opcode::PushFrame => self.memory.push_frame()?,
            Opcode::PopFrame => self.memory.pop_frame()?,
            Opcode::DefVar => self.exec_defvar(instr)?,

            // Calls
            Opcode::Call => self.exec_call(instr)?,
            Opcode::Return => self.control.ret()?,

            // Data stack
            Opcode::Pushs => self.exec_pushs(instr)?,
            Opcode::Pops => self.exec_pops(instr)?,

            // Arithmetic
            Opcode::Add => self.exec_arith(instr, |a, b| Ok(a.wrapping_add(b)))?,
            Opcode::Sub => self.exec_arith(instr, |a, b| Ok(a.wrapping_sub(b)))?,
            Opcode::Mul => self.exec_arith(instr, |a, b| Ok(a.wrapping_mul(b)))?,
            Opcode::Idiv => self.exec_arith(instr, idiv)?,

            // Relational
            Opcode::Lt => self.exec_relational(instr, Ordering::is_lt)?,
            Opcode::Gt => self.exec_relational(instr, Ordering::is_gt)?,
            Opcode::Eq => self.exec_eq(instr)?,

            // Logic
            Opcode::And => self.exec_logic(instr, |a, b| a && b)?,
            Opcode::Or => self.exec_logic(instr, |a, b| a || b)?,
            Opcode::Not => self.exec_not(instr)?,

            // Conversions
            Opcode::Int2Char => self.exec_int2char(instr)?,
            Opcode::Stri2Int => self.exec_stri2int(instr)?,

            // I/O
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => self.exec_print(instr, Sink::Stdout)?,

            // Strings
            Opcode::Concat => self.exec_concat(instr)?,
            Opcode::Strlen => self.exec_strlen(instr)?,
            Opcode::GetChar => self.exec_getchar(instr)?,
            Opcode::SetChar => self.exec_setchar(instr)?,

            // Types
            Opcode::Type => self.exec_type(instr)?,

            // Control flow
            Opcode::Label => {} // Resolved before the run starts.
            Opcode::Jump => self.exec_jump(instr)?,
            Opcode::JumpIfEq => self.exec_jump_if_eq(instr)?,
            Opcode::JumpIfNeq => self.exec_jump_if_neq(instr)?,
            Opcode::Exit => return self.exec_exit(instr),

            // Debugging
            Opcode::Dprint => self.exec_print(instr, Sink::Stderr)?,
            Opcode::Break => self.exec_break()?,
        }

        Ok(Flow::Continue)
    }

    // ---- Frames & variables ----

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.value(instr.opcode, &instr.args[1])?;
        self.store(instr.opcode, &instr.args[0], value)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let raw = self.target(instr.opcode, &instr.args[0])?;
        self.memory.define(raw)
    }

    // ---- Calls & jumps ----

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let label = self.label_name(instr.opcode, &instr.args[0])?;
        self.control.call(&label)
    }

    fn exec_jump(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let label = self.label_name(instr.opcode, &instr.args[0])?;
        self.control.jump(&label)
    }

    /// Nil may be compared with any kind; a nil/non-nil pair is unequal.
    fn exec_jump_if_eq(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.value(instr.opcode, &instr.args[1])?;
        let b = self.value(instr.opcode, &instr.args[2])?;
        let equal = loose_equals(instr.opcode, &a, &b)?;
        let label = self.label_name(instr.opcode, &instr.args[0])?;
        if equal {
            self.control.jump(&label)?;
        }
        Ok(())
    }

    /// Unlike JUMPIFEQ, both operands must have the same kind, nil included.
    fn exec_jump_if_neq(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.value(instr.opcode, &instr.args[1])?;
        let b = self.value(instr.opcode, &instr.args[2])?;
        if a.kind() != b.kind() {
            return Err(mismatch(instr.opcode, "operands of the same kind", &[&a, &b]));
        }
        let label = self.label_name(instr.opcode, &instr.args[0])?;
        if a != b {
            self.control.jump(&label)?;
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match self.value(instr.opcode, &instr.args[0])? {
            Value::Int(code @ 0..=9) => Ok(Flow::Exit(code as u8)),
            Value::Int(code) => Err(RuntimeError::InvalidExitCode(code)),
            other => Err(mismatch(instr.opcode, "an int exit code", &[&other])),
        }
    }

    // ---- Data stack ----

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.value(instr.opcode, &instr.args[0])?;
        self.memory.push(value);
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.memory.pop()?;
        self.store(instr.opcode, &instr.args[0], value)
    }

    // ---- Arithmetic ----

    /// Binary integer arithmetic: both operands int, result int.
    fn exec_arith(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> Result<i64, RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let a = self.value(instr.opcode, &instr.args[1])?;
        let b = self.value(instr.opcode, &instr.args[2])?;

        let result = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => op(*x, *y)?,
            _ => return Err(mismatch(instr.opcode, "int operands", &[&a, &b])),
        };

        self.store(instr.opcode, &instr.args[0], Value::Int(result))
    }

    // ---- Relational ----

    /// LT/GT: same non-nil kind on both sides, result bool.
    fn exec_relational(
        &mut self,
        instr: &Instruction,
        test: fn(Ordering) -> bool,
    ) -> Result<(), RuntimeError> {
        let a = self.value(instr.opcode, &instr.args[1])?;
        let b = self.value(instr.opcode, &instr.args[2])?;

        let ordering = a
            .compare(&b)
            .ok_or_else(|| mismatch(instr.opcode, "non-nil operands of the same kind", &[&a, &b]))?;

        self.store(instr.opcode, &instr.args[0], Value::Bool(test(ordering)))
    }

    fn exec_eq(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.value(instr.opcode, &instr.args[1])?;
        let b = self.value(instr.opcode, &instr.args[2])?;
        let equal = loose_equals(instr.opcode, &a, &b)?;
        self.store(instr.opcode, &instr.args[0], Value::Bool(equal))
    }

    // ---- Logic ----

    fn exec_logic(&mut self, instr: &Instruction, op: fn(bool, bool) -> bool) -> Result<(), RuntimeError> {
        let a = self.value(instr.opcode, &instr.args[1])?;
        let b = self.value(instr.opcode, &instr.args[2])?;

        let result = match (&a, &b) {
            (Value::Bool(x), Value::Bool(y)) => op(*x, *y),
            _ => return Err(mismatch(instr.opcode, "bool operands", &[&a, &b])),
        };

        self.store(instr.opcode, &instr.args[0], Value::Bool(result))
    }

    fn exec_not(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        match self.value(instr.opcode, &instr.args[1])? {
            Value::Bool(x) => self.store(instr.opcode, &instr.args[0], Value::Bool(!x)),
            other => Err(mismatch(instr.opcode, "a bool operand", &[&other])),
        }
    }

    // ---- Conversions ----

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let code = match self.value(instr.opcode, &instr.args[1])? {
            Value::Int(n) => n,
            other => return Err(mismatch(instr.opcode, "an int code point", &[&other])),
        };

        let c = u8::try_from(code)
            .map(char::from)
            .map_err(|_| RuntimeError::InvalidCodePoint(code))?;

        self.store(instr.opcode, &instr.args[0], Value::Str(c.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.value(instr.opcode, &instr.args[1])?;
        let index = self.value(instr.opcode, &instr.args[2])?;

        let c = match (&s, &index) {
            (Value::Str(s), Value::Int(i)) => char_at(s, *i)?,
            _ => return Err(mismatch(instr.opcode, "string and int operands", &[&s, &index])),
        };

        self.store(instr.opcode, &instr.args[0], Value::Int(i64::from(u32::from(c))))
    }

    // ---- I/O ----

    /// READ: the kind to read is named literally by the second argument.
    /// End of input or a parse failure stores nil.
    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let kind = match &instr.args[1] {
            Argument::Type(name) => Kind::from_name(name),
            _ => None,
        }
        .ok_or_else(|| RuntimeError::TypeMismatch {
            opcode: instr.opcode.mnemonic(),
            expected: "int, bool, string or nil",
            found: match &instr.args[1] {
                Argument::Type(name) => format!("type '{name}'"),
                other => other.describe(),
            },
        })?;

        let input = &mut *self.io.input;
        let value = match kind {
            Kind::Int => input.read_int().map(Value::Int),
            Kind::Bool => input.read_bool().map(Value::Bool),
            Kind::String => input.read_string().map(Value::Str),
            Kind::Nil => None,
        }
        .unwrap_or(Value::Nil);

        self.store(instr.opcode, &instr.args[0], value)
    }

    /// WRITE / DPRINT. Escapes in strings are decoded; nil prints nothing.
    fn exec_print(&mut self, instr: &Instruction, sink: Sink) -> Result<(), RuntimeError> {
        let value = self.value(instr.opcode, &instr.args[0])?;
        let out: &mut (dyn OutputSink + 'a) = match sink {
            Sink::Stdout => &mut *self.io.stdout,
            Sink::Stderr => &mut *self.io.stderr,
        };

        match value {
            Value::Int(n) => out.write_int(n)?,
            Value::Bool(b) => out.write_bool(b)?,
            Value::Str(s) => out.write_bytes(&decode_escapes(&s))?,
            Value::Nil => out.write_string("")?,
        }
        Ok(())
    }

    /// BREAK: a fixed marker on the debug sink; state goes to the log.
    fn exec_break(&mut self) -> Result<(), RuntimeError> {
        self.io.stderr.write_string(&self.config.break_marker)?;

        let globals = self.memory.global().names().join(", ");
        debug!(
            pc = self.control.pc(),
            executed = self.executed,
            frame_depth = self.memory.frame_depth(),
            temporary = self.memory.temporary().is_some(),
            data_depth = self.memory.data_stack().len(),
            call_depth = self.control.call_depth(),
            globals = %globals,
            "BREAK"
        );
        Ok(())
    }

    // ---- Strings ----

    fn exec_concat(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.value(instr.opcode, &instr.args[1])?;
        let b = self.value(instr.opcode, &instr.args[2])?;

        let joined = match (&a, &b) {
            (Value::Str(x), Value::Str(y)) => format!("{x}{y}"),
            _ => return Err(mismatch(instr.opcode, "string operands", &[&a, &b])),
        };

        self.store(instr.opcode, &instr.args[0], Value::Str(joined))
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let len = match self.value(instr.opcode, &instr.args[1])? {
            Value::Str(s) => i64::try_from(s.chars().count()).unwrap_or(i64::MAX),
            other => return Err(mismatch(instr.opcode, "a string operand", &[&other])),
        };
        self.store(instr.opcode, &instr.args[0], Value::Int(len))
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.value(instr.opcode, &instr.args[1])?;
        let index = self.value(instr.opcode, &instr.args[2])?;

        let c = match (&s, &index) {
            (Value::Str(s), Value::Int(i)) => char_at(s, *i)?,
            _ => return Err(mismatch(instr.opcode, "string and int operands", &[&s, &index])),
        };

        self.store(instr.opcode, &instr.args[0], Value::Str(c.to_string()))
    }

    /// SETCHAR: replace one character of the string held by the target
    /// variable with the first character of the third operand.
    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.value(instr.opcode, &instr.args[0])?;
        let index = self.value(instr.opcode, &instr.args[1])?;
        let replacement = self.value(instr.opcode, &instr.args[2])?;

        let (s, i, r) = match (&target, &index, &replacement) {
            (Value::Str(s), Value::Int(i), Value::Str(r)) => (s, *i, r),
            _ => {
                return Err(mismatch(
                    instr.opcode,
                    "string, int and string operands",
                    &[&target, &index, &replacement],
                ))
            }
        };

        let pos = char_index(s, i)?;
        let new_char = r.chars().next().ok_or(RuntimeError::EmptyReplacement)?;

        let updated: String = s
            .chars()
            .enumerate()
            .map(|(n, c)| if n == pos { new_char } else { c })
            .collect();

        self.store(instr.opcode, &instr.args[0], Value::Str(updated))
    }

    // ---- Types ----

    /// TYPE: a variable of kind nil, unset or holding nil, leaves the
    /// target untouched.
    fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let kind = match &instr.args[1] {
            Argument::Var(raw) => {
                let kind = self.memory.read(raw)?.kind();
                if kind == Kind::Nil {
                    return Ok(());
                }
                kind
            }
            other => self.value(instr.opcode, other)?.kind(),
        };

        self.store(instr.opcode, &instr.args[0], Value::Str(kind.name().to_string()))
    }
}
