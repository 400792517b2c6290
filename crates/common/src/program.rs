//! Program representation: an order-sorted sequence of instruction records.

use crate::instruction::InstructionRecord;

/// An IPPcode program.
///
/// Records are sorted by `order` on construction (stable, so records with
/// equal `order` keep their source order). Positions used by labels and
/// jumps index this sorted sequence, not the raw `order` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    records: Vec<InstructionRecord>,
}

impl Program {
    /// Create a program from records in any order.
    pub fn new(mut records: Vec<InstructionRecord>) -> Self {
        records.sort_by_key(|r| r.order);
        Self { records }
    }

    /// The sorted records.
    pub fn records(&self) -> &[InstructionRecord] {
        &self.records
    }

    /// Record at a position in the sorted sequence.
    pub fn get(&self, position: usize) -> Option<&InstructionRecord> {
        self.records.get(position)
    }

    /// Number of records in the program.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the program has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<InstructionRecord> for Program {
    fn from_iter<I: IntoIterator<Item = InstructionRecord>>(iter: I) -> Self {
        Program::new(iter.into_iter().collect())
    }
}
