//! Growable tape shared by any number of cursors
//!
//! The tape is a row of single-character cells plus one position slot per
//! registered cursor. Slots are never reclaimed: unregistering only marks a
//! cursor dead, so ids stay valid for the life of the tape.
//!
//! # Growth
//!
//! Moving past the right edge appends fill cells up to and including the new
//! position. Moving past the left edge prepends the deficit and shifts every
//! stored position right by the same amount, so every cursor stays on the
//! cell it was on.

use crate::constants::DEFAULT_FILL;
use crate::snapshot::TapeSnapshot;
use std::fmt;

/// Index of a cursor's position slot
pub type CursorId = usize;

/// Cursor-id misuse by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapeError {
    UnknownCursor(CursorId),
    DeadCursor(CursorId),
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapeError::UnknownCursor(id) => write!(f, "Cursor {} was never registered", id),
            TapeError::DeadCursor(id) => write!(f, "Cursor {} has been unregistered", id),
        }
    }
}

impl std::error::Error for TapeError {}

#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<char>,
    positions: Vec<usize>,
    alive: Vec<bool>,
    fill: char,
    initial: String,
}

impl Tape {
    /// Empty tape: one fill cell, no cursors
    pub fn new() -> Self {
        Self::with_fill(DEFAULT_FILL)
    }

    pub fn with_fill(fill: char) -> Self {
        let mut tape = Tape {
            cells: Vec::new(),
            positions: Vec::new(),
            alive: Vec::new(),
            fill,
            initial: String::new(),
        };
        tape.reset(false);
        tape
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    pub fn contents(&self) -> String {
        self.cells.iter().collect()
    }

    /// Number of slots ever allocated, dead ones included
    pub fn cursor_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, id: CursorId) -> Result<usize, TapeError> {
        self.check(id)?;
        Ok(self.positions[id])
    }

    pub fn is_alive(&self, id: CursorId) -> bool {
        self.alive.get(id).copied().unwrap_or(false)
    }

    fn check(&self, id: CursorId) -> Result<(), TapeError> {
        match self.alive.get(id) {
            None => Err(TapeError::UnknownCursor(id)),
            Some(false) => Err(TapeError::DeadCursor(id)),
            Some(true) => Ok(()),
        }
    }

    /// Allocate a cursor at zero, then walk it `|start|` cells (rightward when
    /// positive).
    pub fn register_cursor(&mut self, start: i64) -> CursorId {
        let id = self.positions.len();
        self.positions.push(0);
        self.alive.push(true);
        if start != 0 {
            self.shift(id, start.unsigned_abs() as usize, start > 0);
        }
        id
    }

    /// Mark the cursor dead. Its slot stays allocated.
    pub fn unregister_cursor(&mut self, id: CursorId) {
        if let Some(alive) = self.alive.get_mut(id) {
            *alive = false;
        }
    }

    pub fn move_cursor(&mut self, id: CursorId, n: usize, rightward: bool) -> Result<(), TapeError> {
        self.check(id)?;
        self.shift(id, n, rightward);
        Ok(())
    }

    fn shift(&mut self, id: CursorId, n: usize, rightward: bool) {
        let position = self.positions[id];
        if rightward {
            let target = position + n;
            if target >= self.cells.len() {
                self.cells.resize(target + 1, self.fill);
            }
            self.positions[id] = target;
        } else if n <= position {
            self.positions[id] = position - n;
        } else {
            let deficit = n - position;
            self.cells
                .splice(0..0, std::iter::repeat(self.fill).take(deficit));
            for other in self.positions.iter_mut() {
                *other += deficit;
            }
            self.positions[id] = 0;
        }
    }

    pub fn read(&self, id: CursorId) -> Result<char, TapeError> {
        self.check(id)?;
        Ok(self.cells[self.positions[id]])
    }

    pub fn write(&mut self, id: CursorId, c: char) -> Result<(), TapeError> {
        self.check(id)?;
        let position = self.positions[id];
        self.cells[position] = c;
        Ok(())
    }

    /// Remember `initial` as the starting contents and reset the cells to it.
    /// Cursor positions are kept.
    pub fn initialize(&mut self, initial: &str) {
        self.initial = initial.to_string();
        self.reset(false);
    }

    /// Rebuild the cells from the initial string plus one fill cell.
    ///
    /// With `reset_cursors` every position goes back to zero. Otherwise the
    /// tape is padded until every position is on it again.
    pub fn reset(&mut self, reset_cursors: bool) {
        self.cells = self.initial.chars().collect();
        self.cells.push(self.fill);

        if reset_cursors {
            self.positions.iter_mut().for_each(|p| *p = 0);
        } else if let Some(&furthest) = self.positions.iter().max() {
            if furthest >= self.cells.len() {
                self.cells.resize(furthest + 1, self.fill);
            }
        }
    }

    pub fn snapshot(&self) -> TapeSnapshot {
        TapeSnapshot {
            memory: self.cells.iter().map(|c| c.to_string()).collect(),
            pointers: self.positions.clone(),
            alive: self.alive.clone(),
        }
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Tape {
    /// Cursor markers over the cells
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut markers = vec![' '; self.cells.len()];
        for (id, &position) in self.positions.iter().enumerate() {
            if self.alive[id] {
                markers[position] = 'v';
            }
        }
        let markers: String = markers.into_iter().collect();
        writeln!(f, "{}", markers.trim_end())?;
        write!(f, "{}", self.contents())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tape_has_one_fill_cell() {
        let tape = Tape::new();
        assert_eq!(tape.contents(), "_");
        assert_eq!(Tape::with_fill('0').contents(), "0");
    }

    #[test]
    fn test_register_walks_to_start() {
        let mut tape = Tape::new();
        tape.initialize("abc");
        let right = tape.register_cursor(5);
        assert_eq!(tape.position(right), Ok(5));
        assert_eq!(tape.len(), 6);

        let left = tape.register_cursor(-2);
        assert_eq!(tape.position(left), Ok(0));
        assert_eq!(tape.position(right), Ok(7));
        assert_eq!(tape.contents(), "__abc___");
    }

    #[test]
    fn test_leftward_growth_keeps_cursors_on_their_cells() {
        let mut tape = Tape::new();
        tape.initialize("xyz");
        let a = tape.register_cursor(0);
        let b = tape.register_cursor(2);
        assert_eq!(tape.read(b), Ok('z'));

        tape.move_cursor(a, 3, false).unwrap();
        assert_eq!(tape.position(a), Ok(0));
        assert_eq!(tape.position(b), Ok(5));
        assert_eq!(tape.read(b), Ok('z'));
        assert_eq!(tape.read(a), Ok('_'));
        assert_eq!(tape.contents(), "___xyz_");
    }

    #[test]
    fn test_rightward_growth() {
        let mut tape = Tape::new();
        let id = tape.register_cursor(0);
        tape.move_cursor(id, 3, true).unwrap();
        assert_eq!(tape.len(), 4);
        tape.write(id, 'q').unwrap();
        assert_eq!(tape.contents(), "___q");
    }

    #[test]
    fn test_dead_and_unknown_cursors() {
        let mut tape = Tape::new();
        let id = tape.register_cursor(0);
        tape.unregister_cursor(id);
        assert_eq!(tape.read(id), Err(TapeError::DeadCursor(id)));
        assert_eq!(tape.write(7, 'a'), Err(TapeError::UnknownCursor(7)));
        assert_eq!(tape.cursor_count(), 1);

        let next = tape.register_cursor(0);
        assert_eq!(next, 1);
    }

    #[test]
    fn test_reset_keeps_or_zeroes_cursors() {
        let mut tape = Tape::new();
        tape.initialize("ab");
        let id = tape.register_cursor(4);
        tape.write(id, 'z').unwrap();

        tape.reset(false);
        assert_eq!(tape.position(id), Ok(4));
        assert_eq!(tape.contents(), "ab___");

        tape.reset(true);
        assert_eq!(tape.position(id), Ok(0));
        assert_eq!(tape.contents(), "ab_");
    }

    #[test]
    fn test_snapshot_shape() {
        let mut tape = Tape::new();
        tape.initialize("01");
        tape.register_cursor(1);
        let dead = tape.register_cursor(0);
        tape.unregister_cursor(dead);

        let snap = tape.snapshot();
        assert_eq!(snap.memory, vec!["0", "1", "_"]);
        assert_eq!(snap.pointers, vec![1, 0]);
        assert_eq!(snap.alive, vec![true, false]);
    }

    #[test]
    fn test_display_marks_live_cursors() {
        let mut tape = Tape::new();
        tape.initialize("abc");
        tape.register_cursor(2);
        assert_eq!(tape.to_string(), "  v\nabc_");
    }
}
