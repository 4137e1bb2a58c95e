//! Machine faults
//!
//! A compiled program that got past the parser's checks can never produce
//! one of these, so the engine does not return them: it panics with the
//! fault's message. They exist to give that panic a precise description.

use crate::compiler::Instruction;
use crate::memory::tape::TapeError;
use crate::parser::ast::ValueType;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum MachineFault {
    /// An instruction needed more operands than the stack held
    StackUnderflow { instruction: Instruction, ip: usize },

    /// An operand of the wrong type reached an instruction
    TypeConfusion {
        instruction: Instruction,
        expected: ValueType,
        found: ValueType,
    },

    /// `Call` named a label with no compiled body
    UnknownLabel(String),

    /// A jump left the instruction sequence on the low side
    JumpOutOfRange { ip: usize, offset: i32 },

    /// The cursor handed to `step` cannot touch the tape
    Cursor(TapeError),
}

impl fmt::Display for MachineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineFault::StackUnderflow { instruction, ip } => {
                write!(f, "Stack underflow executing '{}' at {}", instruction, ip)
            }
            MachineFault::TypeConfusion {
                instruction,
                expected,
                found,
            } => write!(
                f,
                "'{}' expected a {} operand but found a {}",
                instruction, expected, found
            ),
            MachineFault::UnknownLabel(name) => write!(f, "Call to unknown label '{}'", name),
            MachineFault::JumpOutOfRange { ip, offset } => {
                write!(f, "Jump {:+} at {} leaves the instruction sequence", offset, ip)
            }
            MachineFault::Cursor(err) => write!(f, "Cursor fault: {}", err),
        }
    }
}

impl std::error::Error for MachineFault {}

impl From<TapeError> for MachineFault {
    fn from(err: TapeError) -> Self {
        MachineFault::Cursor(err)
    }
}
