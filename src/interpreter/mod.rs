//! Tape machine execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Single-step stack machine over compiled instructions
//! - [`errors`]: Machine faults
//!
//! # Execution Model
//!
//! The interpreter keeps a flat instruction sequence and an instruction
//! pointer. A driver calls [`Interpreter::step`](engine::Interpreter::step)
//! while [`has_more_work`](engine::Interpreter::has_more_work) holds and can
//! observe the tape between any two steps.
//!
//! `goto` compiles to a `Call` that switches to the label's body for good;
//! the run ends when that body runs out.

pub mod engine;
pub mod errors;

pub use engine::Interpreter;
