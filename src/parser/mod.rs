//! Tape language front end
//!
//! This module transforms source text into a typed Abstract Syntax Tree (AST):
//! - [`buffer`]: character source with checkpoint and rewind
//! - [`token`]: token categories and the matcher table
//! - [`lexer`]: Tokenization (source text → lexemes), with scoped backtracking
//! - [`parser`]: Parsing (lexemes → AST)
//! - [`environment`]: scoped label table used while parsing
//! - [`ast`]: AST node definitions
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser. Expressions are prefix-notation so
//! there is no precedence climbing; alternatives are tried in order and
//! backtracked through the lexer. No external parser generator dependencies.

pub mod ast;
pub mod buffer;
mod declarations;
pub mod environment;
mod expressions;
pub mod lexer;
pub mod parser;
mod statements;
pub mod token;
