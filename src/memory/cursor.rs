//! A machine's handle on a shared tape

use super::tape::{CursorId, Tape, TapeError};
use crate::snapshot::CursorSnapshot;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared tape handle
pub type SharedTape = Rc<RefCell<Tape>>;

/// One registered position on a [`Tape`]
#[derive(Debug, Clone)]
pub struct Cursor {
    tape: SharedTape,
    id: CursorId,
}

impl Cursor {
    /// Register a new cursor on `tape`, `start` cells from the left edge
    pub fn new(tape: SharedTape, start: i64) -> Self {
        let id = tape.borrow_mut().register_cursor(start);
        Cursor { tape, id }
    }

    pub fn id(&self) -> CursorId {
        self.id
    }

    pub fn tape(&self) -> &SharedTape {
        &self.tape
    }

    pub fn position(&self) -> Result<usize, TapeError> {
        self.tape.borrow().position(self.id)
    }

    pub fn read(&self) -> Result<char, TapeError> {
        self.tape.borrow().read(self.id)
    }

    pub fn write(&mut self, c: char) -> Result<(), TapeError> {
        self.tape.borrow_mut().write(self.id, c)
    }

    pub fn move_by(&mut self, n: usize, rightward: bool) -> Result<(), TapeError> {
        self.tape.borrow_mut().move_cursor(self.id, n, rightward)
    }

    pub fn is_alive(&self) -> bool {
        self.tape.borrow().is_alive(self.id)
    }

    pub fn unregister(&mut self) {
        self.tape.borrow_mut().unregister_cursor(self.id);
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            identifier: self.id,
            tape: self.tape.borrow().snapshot(),
            last: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(initial: &str) -> SharedTape {
        let mut tape = Tape::new();
        tape.initialize(initial);
        Rc::new(RefCell::new(tape))
    }

    #[test]
    fn test_cursors_share_cells() {
        let tape = shared("ab");
        let mut first = Cursor::new(Rc::clone(&tape), 0);
        let second = Cursor::new(Rc::clone(&tape), 1);

        first.move_by(1, true).unwrap();
        first.write('x').unwrap();
        assert_eq!(second.read(), Ok('x'));
        assert_eq!(second.id(), 1);
    }

    #[test]
    fn test_left_growth_through_cursor() {
        let tape = shared("abc");
        let mut mover = Cursor::new(Rc::clone(&tape), 0);
        let watcher = Cursor::new(Rc::clone(&tape), 1);

        mover.move_by(2, false).unwrap();
        assert_eq!(mover.position(), Ok(0));
        assert_eq!(watcher.position(), Ok(3));
        assert_eq!(watcher.read(), Ok('b'));
    }

    #[test]
    fn test_unregister() {
        let tape = shared("");
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        cursor.unregister();
        assert!(!cursor.is_alive());
        assert_eq!(cursor.read(), Err(TapeError::DeadCursor(0)));
    }

    #[test]
    fn test_snapshot_carries_identifier() {
        let tape = shared("1");
        let _first = Cursor::new(Rc::clone(&tape), 0);
        let second = Cursor::new(Rc::clone(&tape), 1);
        let snap = second.snapshot();
        assert_eq!(snap.identifier, 1);
        assert_eq!(snap.tape.pointers, vec![0, 1]);
        assert_eq!(snap.last, None);
    }
}
