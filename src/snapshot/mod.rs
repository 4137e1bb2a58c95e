// Observable machine state and step history for reverse stepping

use crate::compiler::instruction::Routine;
use crate::memory::value::Value;
use serde::{Deserialize, Serialize};

/// Tape contents and cursor slots, in wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeSnapshot {
    /// One single-character string per cell
    pub memory: Vec<String>,
    pub pointers: Vec<usize>,
    pub alive: Vec<bool>,
}

impl TapeSnapshot {
    pub fn contents(&self) -> String {
        self.memory.concat()
    }
}

/// What one machine observes: its id and the whole tape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub identifier: usize,
    pub tape: TapeSnapshot,
    /// Set by streaming drivers on the final message of a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<bool>,
}

impl CursorSnapshot {
    pub fn with_last(mut self, last: bool) -> Self {
        self.last = Some(last);
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Position of the observing cursor
    pub fn position(&self) -> Option<usize> {
        self.tape.pointers.get(self.identifier).copied()
    }
}

/// Snapshot of execution state after one step
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub view: CursorSnapshot,
    /// The running sequence, main or a label
    pub routine: Routine,
    pub instruction_pointer: Option<usize>,
    pub stack: Vec<Value>,
    pub pending_move: usize,
    pub steps: u64,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        // Cells are short strings: count a small heap allocation for each
        let tape = self.view.tape.memory.len() * (std::mem::size_of::<String>() + 4);
        let slots = self.view.tape.pointers.len()
            * (std::mem::size_of::<usize>() + std::mem::size_of::<bool>());
        let stack = self.stack.len() * std::mem::size_of::<Value>();

        let name = match &self.routine {
            Routine::Main => 0,
            Routine::Label(name) => name.len(),
        };

        std::mem::size_of::<Self>() + name + tape + slots + stack
    }
}

/// Manages execution history for reverse stepping
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), String> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(format!(
                "Snapshot memory limit exceeded: {} + {} > {}",
                self.current_memory, snapshot_size, self.max_memory
            ));
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}
