//! Runtime type tags for IPPcode values.

use std::fmt;

/// The runtime type of a value.
///
/// Every value held in a variable or on the data stack has exactly one
/// kind. Variables that were defined but never written have no value at
/// all and report [`Kind::Nil`] when read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Signed 64-bit integer.
    Int,
    /// Boolean.
    Bool,
    /// Unicode text.
    String,
    /// The single `nil@nil` value.
    Nil,
}

/// All kinds, in definition order.
pub const ALL_KINDS: [Kind; 4] = [Kind::Int, Kind::Bool, Kind::String, Kind::Nil];

impl Kind {
    /// Returns the name used for this kind in programs and by `TYPE`.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Nil => "nil",
        }
    }

    /// Looks a kind up by its program-level name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Kind> {
        ALL_KINDS.iter().copied().find(|k| k.name() == name)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for &kind in &ALL_KINDS {
            assert_eq!(Kind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn unknown_names() {
        assert_eq!(Kind::from_name("INT"), None);
        assert_eq!(Kind::from_name("float"), None);
        assert_eq!(Kind::from_name("label"), None);
        assert_eq!(Kind::from_name(""), None);
    }
}
