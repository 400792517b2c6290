//! Memory model: frames, variables, and the data stack.
//!
//! There is always exactly one global frame. `CREATEFRAME` stages a
//! temporary frame, `PUSHFRAME` moves it onto the frame stack where it
//! becomes the local frame, and `POPFRAME` moves the top of the frame stack
//! back into the temporary slot. The local frame is always the top of the
//! frame stack, so the two can never disagree.

use std::collections::HashMap;

use ippcode_common::{Kind, Value};
use tracing::debug;

use crate::error::RuntimeError;

/// Frame selector of a variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTag {
    Global,
    Local,
    Temporary,
}

impl FrameTag {
    /// Parse `GF`, `LF` or `TF`. Case-sensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "GF" => Some(FrameTag::Global),
            "LF" => Some(FrameTag::Local),
            "TF" => Some(FrameTag::Temporary),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FrameTag::Global => "GF",
            FrameTag::Local => "LF",
            FrameTag::Temporary => "TF",
        }
    }
}

/// A `FRAME@name` reference split into its two parts.
///
/// The frame part is kept as text: whether an unknown selector is a
/// semantic error or a frame error depends on the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarRef<'a> {
    pub frame: &'a str,
    pub name: &'a str,
}

impl<'a> VarRef<'a> {
    /// Split `raw` at its single `@`. Anything that is not exactly two
    /// non-empty parts is malformed.
    pub fn parse(raw: &'a str) -> Result<Self, RuntimeError> {
        let mut parts = raw.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(frame), Some(name), None) if !frame.is_empty() && !name.is_empty() => {
                Ok(Self { frame, name })
            }
            _ => Err(RuntimeError::MalformedVariable(raw.to_string())),
        }
    }
}

/// A variable slot. Freshly defined slots hold no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    value: Option<Value>,
}

impl Slot {
    /// The stored value, or `None` if the variable was never written.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Kind of the stored value; an unset slot reports nil.
    pub fn kind(&self) -> Kind {
        self.value.as_ref().map_or(Kind::Nil, Value::kind)
    }

    /// The stored value, with an unset slot reading as nil.
    pub fn to_value(&self) -> Value {
        self.value.clone().unwrap_or(Value::Nil)
    }
}

/// A mapping from variable name to slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    slots: HashMap<String, Slot>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Variable names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn define(&mut self, name: &str) {
        self.slots.insert(name.to_string(), Slot::default());
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.get_mut(name)
    }
}

/// All frames plus the data stack.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    global: Frame,
    temporary: Option<Frame>,
    /// Previously pushed frames. The last one is the local frame.
    frames: Vec<Frame>,
    data: Vec<Value>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Frame lifecycle ----

    /// Replace the temporary frame with a fresh one, discarding any frame
    /// that was staged but never pushed.
    pub fn create_frame(&mut self) {
        self.temporary = Some(Frame::new());
    }

    pub fn push_frame(&mut self) -> Result<(), RuntimeError> {
        let frame = self.temporary.take().ok_or(RuntimeError::NoTemporaryFrame)?;
        self.frames.push(frame);
        debug!(depth = self.frames.len(), "frame pushed");
        Ok(())
    }

    pub fn pop_frame(&mut self) -> Result<(), RuntimeError> {
        let frame = self.frames.pop().ok_or(RuntimeError::EmptyFrameStack)?;
        self.temporary = Some(frame);
        debug!(depth = self.frames.len(), "frame popped");
        Ok(())
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// The local frame: the top of the frame stack.
    pub fn local(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// Number of frames on the frame stack.
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, tag: FrameTag) -> Option<&Frame> {
        match tag {
            FrameTag::Global => Some(&self.global),
            FrameTag::Local => self.frames.last(),
            FrameTag::Temporary => self.temporary.as_ref(),
        }
    }

    fn frame_mut(&mut self, tag: FrameTag) -> Option<&mut Frame> {
        match tag {
            FrameTag::Global => Some(&mut self.global),
            FrameTag::Local => self.frames.last_mut(),
            FrameTag::Temporary => self.temporary.as_mut(),
        }
    }

    // ---- Variables ----

    /// Define `raw` (`FRAME@name`) as an unset variable.
    ///
    /// Redefinition and unknown selectors are semantic errors, as is a TF
    /// definition with no temporary frame. An LF definition with no local
    /// frame is a frame error.
    pub fn define(&mut self, raw: &str) -> Result<(), RuntimeError> {
        let var = VarRef::parse(raw)?;
        let tag = FrameTag::parse(var.frame).ok_or_else(|| RuntimeError::InvalidFrame {
            frame: var.frame.to_string(),
        })?;

        let frame = match self.frame_mut(tag) {
            Some(frame) => frame,
            None if tag == FrameTag::Temporary => {
                return Err(RuntimeError::InvalidFrame {
                    frame: tag.name().to_string(),
                })
            }
            None => {
                return Err(RuntimeError::MissingFrame {
                    frame: tag.name().to_string(),
                })
            }
        };

        if frame.contains(var.name) {
            return Err(RuntimeError::Redefinition {
                var: raw.to_string(),
            });
        }
        frame.define(var.name);
        Ok(())
    }

    /// Look up the slot of `raw`.
    ///
    /// A missing frame, an unknown selector, and a name absent from an
    /// existing frame are all frame errors.
    pub fn read(&self, raw: &str) -> Result<&Slot, RuntimeError> {
        let var = VarRef::parse(raw)?;
        let frame = FrameTag::parse(var.frame)
            .and_then(|tag| self.frame(tag))
            .ok_or_else(|| RuntimeError::MissingFrame {
                frame: var.frame.to_string(),
            })?;

        frame.get(var.name).ok_or_else(|| RuntimeError::UnknownVariable {
            var: raw.to_string(),
        })
    }

    /// Store `value` into the already-defined variable `raw`.
    ///
    /// An unknown selector is a semantic error, a missing frame is a frame
    /// error, and a name absent from an existing frame is a missing-variable
    /// error.
    pub fn write(&mut self, raw: &str, value: Value) -> Result<(), RuntimeError> {
        let var = VarRef::parse(raw)?;
        let tag = FrameTag::parse(var.frame).ok_or_else(|| RuntimeError::InvalidFrame {
            frame: var.frame.to_string(),
        })?;
        let frame = self
            .frame_mut(tag)
            .ok_or_else(|| RuntimeError::MissingFrame {
                frame: tag.name().to_string(),
            })?;

        let slot = frame
            .get_mut(var.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                var: raw.to_string(),
            })?;
        slot.value = Some(value);
        Ok(())
    }

    // ---- Data stack ----

    pub fn push(&mut self, value: Value) {
        self.data.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.data.pop().ok_or(RuntimeError::EmptyDataStack)
    }

    /// Data stack contents, bottom first.
    pub fn data_stack(&self) -> &[Value] {
        &self.data
    }
}
