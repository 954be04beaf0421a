//! # Undo/Redo Stack
//!
//! Records executed operations so they can be undone and redone.
//!
//! ## Design
//!
//! - Each entry is a batch of operations undone/redone as one step
//! - Undo applies the `undo` steps in reverse order and moves the batch to
//!   the redo stack
//! - Redo reapplies the `do` steps in order
//! - New entries clear the redo stack
//! - Entries beyond `max_levels` are dropped from the bottom
//!
//! The stack only records; [`crate::Editor`] applies the steps.

use serde::{Deserialize, Serialize};

use crate::operations::Operation;

/// Operations undone/redone together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationBatch {
    /// Operations in application order
    pub operations: Vec<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OperationBatch {
    pub fn single(operation: Operation) -> Self {
        Self {
            operations: vec![operation],
            description: None,
        }
    }

    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[derive(Debug)]
pub struct UndoStack {
    /// Executed batches (most recent last)
    undo_stack: Vec<OperationBatch>,

    /// Undone batches (most recent last)
    redo_stack: Vec<OperationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Batch being built between `begin_batch` and `end_batch`
    current_batch: Option<OperationBatch>,
}

impl UndoStack {
    pub const DEFAULT_MAX_LEVELS: usize = 100;

    pub fn new() -> Self {
        Self::with_max_levels(Self::DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record an executed operation, joining the open batch if any
    ///
    /// The redo history is dropped right away, even while a batch is open.
    pub fn record(&mut self, operation: Operation) {
        match &mut self.current_batch {
            Some(batch) => {
                batch.operations.push(operation);
                self.redo_stack.clear();
            }
            None => self.push(OperationBatch::single(operation)),
        }
    }

    /// Record executed operations as one entry, joining the open batch if any
    pub fn record_all(&mut self, operations: Vec<Operation>) {
        if operations.is_empty() {
            return;
        }
        match &mut self.current_batch {
            Some(batch) => {
                batch.operations.extend(operations);
                self.redo_stack.clear();
            }
            None => self.push(OperationBatch::from_operations(operations)),
        }
    }

    /// Start grouping recorded operations into one entry
    pub fn begin_batch(&mut self) {
        if self.current_batch.is_none() {
            self.current_batch = Some(OperationBatch::from_operations(Vec::new()));
        }
    }

    /// Close the open batch and push it if non-empty
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.is_empty() {
                self.push(batch);
            }
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push(&mut self, batch: OperationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New edits invalidate the redo history
        self.redo_stack.clear();
    }

    /// Take the most recent batch to undo
    pub fn pop_undo(&mut self) -> Option<OperationBatch> {
        self.undo_stack.pop()
    }

    /// Take the most recently undone batch to redo
    pub fn pop_redo(&mut self) -> Option<OperationBatch> {
        self.redo_stack.pop()
    }

    /// Store an undone batch; does not touch the undo stack
    pub fn push_redo(&mut self, batch: OperationBatch) {
        self.redo_stack.push(batch);
    }

    /// Store a redone (or restored) batch; does not clear the redo stack
    pub fn push_undo(&mut self, batch: OperationBatch) {
        self.undo_stack.push(batch);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_entries(&self) -> &[OperationBatch] {
        &self.undo_stack
    }

    pub fn redo_entries(&self) -> &[OperationBatch] {
        &self.redo_stack
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
