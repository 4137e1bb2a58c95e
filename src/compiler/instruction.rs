use crate::memory::value::Value;
use crate::parser::ast::{BinaryOp, Direction};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// INSTRUCTION - one compiled operation
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Pop a number and move that many cells, one cell per step
    Move(Direction),
    /// Push the character under the cursor
    Read,
    /// Pop a character and store it under the cursor
    Write,

    /// Relative jump. Offset 0 falls through, `k > 0` skips `k` instructions,
    /// `-k` resumes `k` instructions back from this one.
    Jump(i32),
    /// Pop a boolean and jump like [`Instruction::Jump`] when it is true
    ConditionalJump(i32),
    /// Continue in the named label body. Control never comes back.
    Call(String),
    Halt,

    PushValue(Value),
    Compare(CompareOp),
    StackDuplicate,
}

impl Instruction {
    /// Jump offset, for either kind of jump
    pub fn jump_offset(&self) -> Option<i32> {
        match self {
            Instruction::Jump(offset) | Instruction::ConditionalJump(offset) => Some(*offset),
            _ => None,
        }
    }
}

/// Index of the instruction that runs after a taken jump at `ip`
pub fn jump_target(ip: usize, offset: i32) -> Option<usize> {
    if offset >= 0 {
        Some(ip + 1 + offset as usize)
    } else {
        ip.checked_sub(offset.unsigned_abs() as usize)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Move(Direction::Left) => write!(f, "MOVE_LEFT"),
            Instruction::Move(Direction::Right) => write!(f, "MOVE_RIGHT"),
            Instruction::Read => write!(f, "READ"),
            Instruction::Write => write!(f, "WRITE"),
            Instruction::Jump(offset) => write!(f, "JUMP        {:+}", offset),
            Instruction::ConditionalJump(offset) => write!(f, "JUMP_IF     {:+}", offset),
            Instruction::Call(label) => write!(f, "CALL        {}", label),
            Instruction::Halt => write!(f, "HALT"),
            Instruction::PushValue(value) => write!(f, "PUSH        {}", value),
            Instruction::Compare(op) => write!(f, "CMP         {}", op.symbol()),
            Instruction::StackDuplicate => write!(f, "DUP"),
        }
    }
}

// =============================================================================
// COMPARISONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
    Not,
}

impl CompareOp {
    /// Operands popped from the stack
    pub fn arity(self) -> usize {
        match self {
            CompareOp::Not => 1,
            _ => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Less => "<",
            CompareOp::Greater => ">",
            CompareOp::LessEq => "<=",
            CompareOp::GreaterEq => ">=",
            CompareOp::And => "&",
            CompareOp::Or => "|",
            CompareOp::Not => "!",
        }
    }

    /// Apply to operands in push order (`lhs` first).
    ///
    /// `!`, `&` and `|` need booleans; any other operand comes back as the
    /// error. Panics if the operand count differs from [`CompareOp::arity`].
    pub fn evaluate(self, operands: &[Value]) -> Result<bool, Value> {
        assert_eq!(
            operands.len(),
            self.arity(),
            "{} takes {} operand(s)",
            self.symbol(),
            self.arity()
        );

        let boolean = |v: &Value| v.as_bool().ok_or(*v);
        Ok(match self {
            CompareOp::Not => !boolean(&operands[0])?,
            CompareOp::And => boolean(&operands[0])? & boolean(&operands[1])?,
            CompareOp::Or => boolean(&operands[0])? | boolean(&operands[1])?,
            CompareOp::Eq => operands[0] == operands[1],
            CompareOp::NotEq => operands[0] != operands[1],
            CompareOp::Less => operands[0] < operands[1],
            CompareOp::Greater => operands[0] > operands[1],
            CompareOp::LessEq => operands[0] <= operands[1],
            CompareOp::GreaterEq => operands[0] >= operands[1],
        })
    }
}

impl From<BinaryOp> for CompareOp {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Eq => CompareOp::Eq,
            BinaryOp::NotEq => CompareOp::NotEq,
            BinaryOp::Less => CompareOp::Less,
            BinaryOp::Greater => CompareOp::Greater,
            BinaryOp::LessEq => CompareOp::LessEq,
            BinaryOp::GreaterEq => CompareOp::GreaterEq,
            BinaryOp::And => CompareOp::And,
            BinaryOp::Or => CompareOp::Or,
        }
    }
}

// =============================================================================
// COMPILED PROGRAM
// =============================================================================

/// Which instruction sequence is running
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Routine {
    Main,
    Label(String),
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Routine::Main => write!(f, "main"),
            Routine::Label(name) => write!(f, "{}:", name),
        }
    }
}

/// Main instruction sequence plus every label body, looked up by name when a
/// `Call` runs.
#[derive(Debug, Clone, Default)]
pub struct CompiledProgram {
    pub main: Rc<[Instruction]>,
    pub labels: FxHashMap<String, Rc<[Instruction]>>,
    /// Source line of each instruction, per sequence
    pub lines: FxHashMap<Routine, Rc<[usize]>>,
}

impl CompiledProgram {
    pub fn sequence(&self, routine: &Routine) -> Option<Rc<[Instruction]>> {
        match routine {
            Routine::Main => Some(Rc::clone(&self.main)),
            Routine::Label(name) => self.label(name),
        }
    }

    /// Line of the statement that produced instruction `ip` of `routine`
    pub fn source_line(&self, routine: &Routine, ip: usize) -> Option<usize> {
        self.lines.get(routine)?.get(ip).copied()
    }

    pub fn label(&self, name: &str) -> Option<Rc<[Instruction]>> {
        self.labels.get(name).cloned()
    }

    /// Label names, sorted
    pub fn label_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.labels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
