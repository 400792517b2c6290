//! Control unit: label table, program counter, call stack.

use std::collections::HashMap;

use ippcode_common::Program;
use tracing::debug;

use crate::error::{Fault, RuntimeError};

/// Program counter and everything that moves it.
///
/// Jump targets are the position of the `LABEL` record itself. The run loop
/// always advances by one after an instruction, so execution resumes right
/// after the label, and `RETURN` resumes right after the `CALL`.
#[derive(Debug, Clone, Default)]
pub struct ControlUnit {
    labels: HashMap<String, usize>,
    pc: usize,
    call_stack: Vec<usize>,
}

impl ControlUnit {
    /// Build the label table from every `LABEL` record in the program.
    ///
    /// A `LABEL` record without arguments is skipped here; it fails when
    /// executed.
    pub fn scan(program: &Program) -> Result<Self, Fault> {
        let mut labels = HashMap::new();

        for (position, record) in program.records().iter().enumerate() {
            if !record.is_label() {
                continue;
            }
            let Some(arg) = record.args.first() else {
                continue;
            };
            if labels.insert(arg.text.clone(), position).is_some() {
                return Err(Fault::new(
                    position,
                    record,
                    RuntimeError::DuplicateLabel {
                        label: arg.text.clone(),
                    },
                ));
            }
        }

        debug!(labels = labels.len(), "label table built");
        Ok(Self {
            labels,
            pc: 0,
            call_stack: Vec::new(),
        })
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Move to the next instruction.
    pub fn advance(&mut self) {
        self.pc += 1;
    }

    /// Position of a label, if defined.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn jump(&mut self, label: &str) -> Result<(), RuntimeError> {
        self.pc = self.label(label).ok_or_else(|| RuntimeError::UndefinedLabel {
            label: label.to_string(),
        })?;
        Ok(())
    }

    /// Save the current position and jump.
    ///
    /// An unknown label leaves the call stack untouched.
    pub fn call(&mut self, label: &str) -> Result<(), RuntimeError> {
        let return_pc = self.pc;
        self.jump(label)?;
        self.call_stack.push(return_pc);
        Ok(())
    }

    pub fn ret(&mut self) -> Result<(), RuntimeError> {
        self.pc = self.call_stack.pop().ok_or(RuntimeError::EmptyCallStack)?;
        Ok(())
    }

    /// Number of pending returns.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippcode_common::{ArgKind, InstructionRecord, RawArg};

    fn label(name: &str, order: i64) -> InstructionRecord {
        InstructionRecord::new("LABEL", order, vec![RawArg::new(ArgKind::Label, name)])
    }

    fn other(order: i64) -> InstructionRecord {
        InstructionRecord::new("CREATEFRAME", order, vec![])
    }

    #[test]
    fn labels_map_to_sorted_positions() {
        // Orders are sparse and unsorted; positions follow the sorted sequence.
        let program = Program::new(vec![label("end", 90), other(10), label("start", 20)]);
        let cu = ControlUnit::scan(&program).unwrap();
        assert_eq!(cu.label("start"), Some(1));
        assert_eq!(cu.label("end"), Some(2));
        assert_eq!(cu.label("missing"), None);
    }

    #[test]
    fn lowercase_label_opcode_is_registered() {
        let program = Program::new(vec![InstructionRecord::new(
            "label",
            1,
            vec![RawArg::new(ArgKind::Label, "x")],
        )]);
        let cu = ControlUnit::scan(&program).unwrap();
        assert_eq!(cu.label("x"), Some(0));
    }

    #[test]
    fn duplicate_label_is_fault() {
        let program = Program::new(vec![label("a", 1), other(2), label("a", 3)]);
        let fault = ControlUnit::scan(&program).unwrap_err();
        assert_eq!(fault.position, 2);
        assert_eq!(fault.order, 3);
        assert_eq!(fault.exit_code(), 52);
    }

    #[test]
    fn jump_sets_pc() {
        let program = Program::new(vec![other(1), other(2), label("here", 3)]);
        let mut cu = ControlUnit::scan(&program).unwrap();
        cu.jump("here").unwrap();
        assert_eq!(cu.pc(), 2);
    }

    #[test]
    fn jump_unknown_label() {
        let mut cu = ControlUnit::scan(&Program::default()).unwrap();
        assert_eq!(
            cu.jump("nowhere"),
            Err(RuntimeError::UndefinedLabel {
                label: "nowhere".into()
            })
        );
    }

    #[test]
    fn call_and_return() {
        let program = Program::new(vec![other(1), other(2), label("fn", 3)]);
        let mut cu = ControlUnit::scan(&program).unwrap();
        cu.advance();
        cu.call("fn").unwrap();
        assert_eq!(cu.pc(), 2);
        assert_eq!(cu.call_depth(), 1);
        cu.ret().unwrap();
        assert_eq!(cu.pc(), 1);
        assert_eq!(cu.call_depth(), 0);
    }

    #[test]
    fn failed_call_does_not_push() {
        let mut cu = ControlUnit::scan(&Program::default()).unwrap();
        assert!(cu.call("nowhere").is_err());
        assert_eq!(cu.call_depth(), 0);
    }

    #[test]
    fn return_with_empty_call_stack() {
        let mut cu = ControlUnit::scan(&Program::default()).unwrap();
        assert_eq!(cu.ret(), Err(RuntimeError::EmptyCallStack));
    }
}
