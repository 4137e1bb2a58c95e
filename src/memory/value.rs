//! Runtime value representation
//!
//! [`Value`] is what the execution stack holds: integers for move distances,
//! single glyphs read from or written to the tape, and booleans produced by
//! comparisons.
//!
//! Equality and ordering look at the payload only when both sides are the same
//! variant. Mixed variants are never equal and have no ordering; the parser's
//! type checks keep them from meeting at run time.

use crate::parser::ast::ValueType;
use std::cmp::Ordering;
use std::fmt;

/// Runtime values on the execution stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Numeric(i64),
    Character(char),
    Boolean(bool),
}

impl Value {
    /// Static type this value belongs to
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Numeric(_) => ValueType::Number,
            Value::Character(_) => ValueType::Character,
            Value::Boolean(_) => ValueType::Boolean,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Character(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Numeric(a), Value::Numeric(b)) => a.partial_cmp(b),
            (Value::Character(a), Value::Character(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(n) => write!(f, "{}", n),
            Value::Character(c) => write!(f, "'{}'", c),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_variant_compares_payload() {
        assert!(Value::Numeric(2) < Value::Numeric(3));
        assert!(Value::Character('b') > Value::Character('a'));
        assert!(Value::Boolean(false) < Value::Boolean(true));
        assert_eq!(Value::Character('0'), Value::Character('0'));
    }

    #[test]
    fn test_mixed_variants_are_unrelated() {
        assert_ne!(Value::Numeric(48), Value::Character('0'));
        assert_eq!(Value::Numeric(1).partial_cmp(&Value::Boolean(true)), None);
        assert!(!(Value::Numeric(1) < Value::Boolean(true)));
        assert!(!(Value::Numeric(1) >= Value::Boolean(true)));
    }

    #[test]
    fn test_value_type() {
        assert_eq!(Value::Numeric(0).value_type(), ValueType::Number);
        assert_eq!(Value::Character('x').value_type(), ValueType::Character);
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Character('x').as_number(), None);
    }
}
