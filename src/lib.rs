//! # Introduction
//!
//! tapestep compiles a small imperative language into a flat instruction
//! sequence and executes it one observable step at a time against a growable
//! tape. Several cursors can share one tape; each step's effect can be
//! watched through a terminal UI built with [ratatui](https://docs.rs/ratatui)
//! or streamed as JSON snapshots.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Buffer → Lexer → Parser → AST → Compiler → Instructions → Interpreter → Tape
//! ```
//!
//! 1. [`parser`]: character buffer with checkpoints, lexer with scoped
//!    backtracking, and a recursive descent parser that type-checks as it goes.
//! 2. [`compiler`]: lowers the AST to [`compiler::Instruction`]s with
//!    relative jump offsets.
//! 3. [`interpreter`]: a stack machine with one unit of effect per
//!    [`step`](interpreter::Interpreter::step).
//! 4. [`memory`]: tagged [`memory::Value`]s, the shared [`memory::Tape`] and
//!    the [`memory::Cursor`]s that move over it.
//! 5. [`snapshot`]: serialisable observations of the tape plus a
//!    bounded step history.
//! 6. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Language
//!
//! Statements: `left n;`/`<< n;`, `right n;`/`>> n;`, `write e;`, `goto label;`,
//! `if (c) { } else { }`, `while (c) { }`, `halt;` and the empty `;`.
//! Expressions are prefix: `= read 'a'`, `! c`, `& a b`, `(e)`.
//! Labels are defined at top level as `name: { ... }`.

pub mod compiler;
pub mod constants;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;
pub mod ui;

use compiler::{compile, CompiledProgram};
use parser::ast::Program;
use parser::buffer::Buffer;
use parser::lexer::Lexer;
use parser::parser::{ParseError, Parser};
use parser::token::TokenTable;

/// Parse everything `buffer` holds with the standard token table
pub fn parse_buffer(buffer: Buffer) -> Result<Program, ParseError> {
    let table = TokenTable::standard();
    let mut parser = Parser::new(Lexer::new(buffer, &table));
    parser.build_tree()
}

/// Parse and compile a program held in a string
pub fn build(source: &str) -> Result<CompiledProgram, ParseError> {
    let program = parse_buffer(Buffer::new(source))?;
    Ok(compile(&program))
}
