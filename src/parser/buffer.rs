//! Character source with checkpoint/rewind
//!
//! The lexer tries token matchers speculatively: it sets a checkpoint, reads
//! ahead, and rewinds when the attempt fails. [`Buffer`] makes that rollback exact.
//! Rewinding restores the unread content, the line counter and the line-start
//! flag to what they were at the checkpoint.
//!
//! # Insertions
//!
//! [`Buffer::push_str`] puts text back at the read position. A *tracked*
//! insertion is speculative and is cut out again by [`Buffer::rewind`]. An
//! *untracked* push of characters that were just read un-consumes them. This is
//! how identifier and integer matchers give back the one character they over-read.
//!
//! # Sources
//!
//! A string-backed buffer holds its whole input up front. A reader-backed buffer
//! streams from any [`Read`] in chunks and refills whenever fewer than
//! `refill_threshold` characters remain buffered.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::rc::Rc;

/// Source identity reported for string-backed buffers
pub const STRING_SOURCE_NAME: &str = "String";

#[derive(Debug, Clone, Copy)]
struct Slot {
    ch: char,
    inserted: bool,
}

/// Streams chunks of UTF-8 from a reader, carrying split sequences across reads
struct ChunkReader {
    source: Box<dyn Read>,
    chunk_size: usize,
    refill_threshold: usize,
    carry: Vec<u8>,
    exhausted: bool,
}

impl ChunkReader {
    /// Pull one chunk and decode it. Returns an empty string once the source is drained.
    fn next_chunk(&mut self) -> String {
        if self.exhausted {
            return String::new();
        }

        let mut bytes = vec![0u8; self.chunk_size.max(1)];
        let read = loop {
            match self.source.read(&mut bytes) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // A failing reader ends the input like EOF does
                Err(_) => break 0,
            }
        };

        if read == 0 {
            self.exhausted = true;
            let tail = String::from_utf8_lossy(&self.carry).into_owned();
            self.carry.clear();
            return tail;
        }

        self.carry.extend_from_slice(&bytes[..read]);
        self.decode_carry()
    }

    fn decode_carry(&mut self) -> String {
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(text) => {
                    out.push_str(text);
                    self.carry.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.carry[..valid]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        // Incomplete sequence at the end, wait for the next chunk
                        None => {
                            self.carry.drain(..valid);
                            return out;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.carry.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }
}

/// Input buffer with exact checkpoint/rewind
pub struct Buffer {
    pending: VecDeque<Slot>,
    /// Characters consumed since the last checkpoint, tracked insertions excluded
    log: Vec<char>,
    inserted_pending: usize,
    line: usize,
    line_start: bool,
    last_consumed: Option<char>,
    checkpoint_line: usize,
    /// Character consumed just before the checkpoint (`None` at the initial position)
    checkpoint_anchor: Option<char>,
    reader: Option<ChunkReader>,
    name: Rc<str>,
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\x0c'
}

fn starts_line(c: char) -> bool {
    c == '\n' || c == '\r'
}

impl Buffer {
    /// String-backed buffer. The whole input counts as buffered.
    pub fn new(source: &str) -> Self {
        let mut buffer = Self::empty(Rc::from(STRING_SOURCE_NAME), None);
        buffer.pending.extend(source.chars().map(|ch| Slot { ch, inserted: false }));
        buffer
    }

    /// Reader-backed buffer that streams `chunk_size` bytes at a time.
    pub fn from_reader<R: Read + 'static>(
        reader: R,
        name: &str,
        chunk_size: usize,
        refill_threshold: usize,
    ) -> Self {
        let reader = ChunkReader {
            source: Box::new(reader),
            chunk_size,
            refill_threshold,
            carry: Vec::new(),
            exhausted: false,
        };
        Self::empty(Rc::from(name), Some(reader))
    }

    fn empty(name: Rc<str>, reader: Option<ChunkReader>) -> Self {
        Buffer {
            pending: VecDeque::new(),
            log: Vec::new(),
            inserted_pending: 0,
            line: 1,
            line_start: true,
            last_consumed: None,
            checkpoint_line: 1,
            checkpoint_anchor: None,
            reader,
            name,
        }
    }

    /// Source identity: `"String"` or the file path
    pub fn name(&self) -> Rc<str> {
        Rc::clone(&self.name)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn at_line_start(&self) -> bool {
        self.line_start
    }

    /// Refill from the reader until at least `wanted` characters are buffered
    /// (or the reader runs dry).
    fn fill_to(&mut self, wanted: usize) {
        let Some(reader) = self.reader.as_mut() else {
            return;
        };
        let wanted = wanted.max(reader.refill_threshold);
        while self.pending.len() < wanted && !reader.exhausted {
            let chunk = reader.next_chunk();
            self.pending
                .extend(chunk.chars().map(|ch| Slot { ch, inserted: false }));
        }
    }

    /// Number of buffered, unread characters
    pub fn len(&mut self) -> usize {
        self.fill_to(0);
        self.pending.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Look `offset` characters ahead without consuming anything.
    pub fn peek(&mut self, offset: usize) -> Option<char> {
        self.fill_to(offset + 1);
        self.pending.get(offset).map(|slot| slot.ch)
    }

    /// Consume one character. Returns `None` at end of input.
    pub fn read_char(&mut self) -> Option<char> {
        self.fill_to(1);
        let slot = self.pending.pop_front()?;

        if slot.inserted {
            self.inserted_pending -= 1;
        } else {
            self.log.push(slot.ch);
        }

        if is_line_break(slot.ch) {
            self.line += 1;
        }
        self.line_start = starts_line(slot.ch);
        self.last_consumed = Some(slot.ch);

        Some(slot.ch)
    }

    /// Insert `text` at the read position so that it is read next.
    ///
    /// With `track` set the text is a speculative insertion that the next
    /// [`rewind`](Self::rewind) removes again. Without it, characters matching
    /// the tail of the checkpoint log are un-consumed; anything else becomes
    /// ordinary content. `fold` rewinds straight after inserting.
    pub fn push_str(&mut self, text: &str, track: bool, fold: bool) {
        for ch in text.chars().rev() {
            if track {
                self.inserted_pending += 1;
            } else if self.log.last() == Some(&ch) {
                self.log.pop();
                self.unconsume(ch);
            }
            self.pending.push_front(Slot { ch, inserted: track });
        }

        if fold {
            self.rewind();
        }
    }

    fn unconsume(&mut self, ch: char) {
        if is_line_break(ch) {
            self.line -= 1;
        }
        self.last_consumed = self.log.last().copied().or(self.checkpoint_anchor);
        self.line_start = self.last_consumed.map_or(true, starts_line);
    }

    /// Mark the current position as the rollback target.
    ///
    /// Tracked insertions that are still unread become ordinary content.
    pub fn set_checkpoint(&mut self) {
        self.log.clear();
        self.checkpoint_line = self.line;
        self.checkpoint_anchor = self.last_consumed;

        if self.inserted_pending > 0 {
            for slot in self.pending.iter_mut() {
                slot.inserted = false;
            }
            self.inserted_pending = 0;
        }
    }

    /// Return to the last checkpoint: replay consumed characters, drop tracked
    /// insertions and restore the line state.
    pub fn rewind(&mut self) {
        if self.inserted_pending > 0 {
            self.pending.retain(|slot| !slot.inserted);
            self.inserted_pending = 0;
        }

        for &ch in self.log.iter().rev() {
            self.pending.push_front(Slot { ch, inserted: false });
        }
        self.log.clear();

        // Inserted line breaks were counted on read but never logged
        self.line = self.checkpoint_line;
        self.last_consumed = self.checkpoint_anchor;
        self.line_start = self.checkpoint_anchor.map_or(true, starts_line);
    }

    /// All content that has not been read yet. Drains a reader-backed source.
    pub fn remaining(&mut self) -> String {
        self.fill_to(usize::MAX);
        self.pending.iter().map(|slot| slot.ch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn state(buffer: &mut Buffer) -> (String, usize, bool) {
        (buffer.remaining(), buffer.line(), buffer.at_line_start())
    }

    #[test]
    fn test_read_tracks_lines() {
        let mut buffer = Buffer::new("a\nb\x0cc\rd");
        let mut read = String::new();
        while let Some(c) = buffer.read_char() {
            read.push(c);
        }
        assert_eq!(read, "a\nb\x0cc\rd");
        assert_eq!(buffer.line(), 3);
        assert!(!buffer.at_line_start());
        assert_eq!(buffer.read_char(), None);
    }

    #[test]
    fn test_carriage_return_sets_line_start_only() {
        let mut buffer = Buffer::new("x\ry");
        buffer.read_char();
        assert!(!buffer.at_line_start());
        buffer.read_char();
        assert!(buffer.at_line_start());
        assert_eq!(buffer.line(), 1);
    }

    #[test]
    fn test_rewind_restores_everything() {
        let mut buffer = Buffer::new("ab\ncd\nef");
        buffer.read_char();
        buffer.read_char();
        buffer.read_char();
        buffer.set_checkpoint();
        let before = state(&mut buffer);

        for _ in 0..4 {
            buffer.read_char();
        }
        assert_eq!(buffer.line(), 3);
        buffer.rewind();

        assert_eq!(state(&mut buffer), before);
        assert!(buffer.at_line_start());
    }

    #[test]
    fn test_rewind_removes_tracked_insertions() {
        let mut buffer = Buffer::new("hello");
        buffer.set_checkpoint();
        let before = state(&mut buffer);

        buffer.read_char();
        buffer.push_str("XY\n", true, false);
        assert_eq!(buffer.read_char(), Some('X'));
        buffer.read_char();
        buffer.read_char();
        buffer.read_char();
        buffer.push_str("Z", true, false);
        buffer.rewind();

        assert_eq!(state(&mut buffer), before);
    }

    #[test]
    fn test_untracked_push_unconsumes() {
        let mut buffer = Buffer::new("ab\nc");
        buffer.set_checkpoint();
        buffer.read_char();
        buffer.read_char();
        buffer.read_char();
        assert_eq!(buffer.line(), 2);

        buffer.push_str("\n", false, false);
        assert_eq!(buffer.line(), 1);
        assert!(!buffer.at_line_start());
        assert_eq!(buffer.peek(0), Some('\n'));

        // Nothing is duplicated on rewind
        buffer.rewind();
        assert_eq!(buffer.remaining(), "ab\nc");
    }

    #[test]
    fn test_interleavings_rewind_to_checkpoint() {
        let source = "if(= read '0'){\n write 'x';\r\n}\x0c";
        for skip in 0..source.chars().count() {
            for reads in 0..6 {
                let mut buffer = Buffer::new(source);
                for _ in 0..skip {
                    buffer.read_char();
                }
                buffer.set_checkpoint();
                let before = state(&mut buffer);

                for i in 0..reads {
                    let c = buffer.read_char();
                    match (i, c) {
                        (0, Some(c)) => {
                            buffer.push_str(&c.to_string(), false, false);
                            buffer.read_char();
                        }
                        (1, _) | (4, _) => buffer.push_str("~\n", true, false),
                        _ => {}
                    }
                }
                buffer.rewind();

                assert_eq!(state(&mut buffer), before, "skip {} reads {}", skip, reads);
            }
        }
    }

    #[test]
    fn test_fold_rewinds_immediately() {
        let mut buffer = Buffer::new("abc");
        buffer.set_checkpoint();
        buffer.read_char();
        buffer.push_str("Q", false, true);
        assert_eq!(buffer.remaining(), "aQbc");
    }

    #[test]
    fn test_checkpoint_commits_insertions() {
        let mut buffer = Buffer::new("b");
        buffer.push_str("a", true, false);
        buffer.set_checkpoint();
        buffer.read_char();
        buffer.rewind();
        assert_eq!(buffer.remaining(), "ab");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buffer = Buffer::new("xyz");
        assert_eq!(buffer.peek(0), Some('x'));
        assert_eq!(buffer.peek(2), Some('z'));
        assert_eq!(buffer.peek(3), None);
        assert_eq!(buffer.read_char(), Some('x'));
    }

    #[test]
    fn test_reader_streams_in_chunks() {
        let text = "write 'é';\nright 12;\n";
        let mut buffer = Buffer::from_reader(Cursor::new(text.as_bytes().to_vec()), "mem.tape", 3, 2);
        assert_eq!(&*buffer.name(), "mem.tape");

        let mut read = String::new();
        while let Some(c) = buffer.read_char() {
            read.push(c);
        }
        assert_eq!(read, text);
        assert_eq!(buffer.line(), 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_reader_rewind() {
        let mut buffer = Buffer::from_reader(Cursor::new(b"abcdef".to_vec()), "f", 2, 1);
        buffer.read_char();
        buffer.set_checkpoint();
        buffer.read_char();
        buffer.read_char();
        buffer.read_char();
        buffer.rewind();
        assert_eq!(buffer.remaining(), "bcdef");
    }
}
