//! Memory model for the tape machine
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (Numeric, Character, Boolean)
//! - [`tape`]: Growable cell array with per-cursor position slots
//! - [`cursor`]: A machine's handle on a shared tape
//!
//! # Sharing
//!
//! Cursors share one tape through `Rc<RefCell<Tape>>`. Everything runs on one
//! thread, and every mutation goes through a cursor id, so two machines never
//! hold the tape borrowed at the same time.

pub mod cursor;
pub mod tape;
pub mod value;

pub use cursor::{Cursor, SharedTape};
pub use tape::{CursorId, Tape, TapeError};
pub use value::Value;

use std::cell::RefCell;
use std::rc::Rc;

/// Fresh shared tape holding `initial` plus one fill cell
pub fn shared_tape(initial: &str, fill: char) -> SharedTape {
    let mut tape = Tape::with_fill(fill);
    tape.initialize(initial);
    Rc::new(RefCell::new(tape))
}
