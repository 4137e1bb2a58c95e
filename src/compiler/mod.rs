//! AST to instruction compiler
//!
//! - [`instruction`]: the closed [`Instruction`] set and [`CompiledProgram`]
//! - [`compile`](mod@compile): lowering of statements and expressions
//! - [`disasm`]: human-readable listings
//!
//! Jump offsets count instructions and are relative to the jump itself: a
//! forward `k` continues at `ip + 1 + k`, a backward `-k` at `ip - k`.

pub mod compile;
pub mod disasm;
pub mod instruction;

pub use compile::compile;
pub use instruction::{CompareOp, CompiledProgram, Instruction, Routine};
