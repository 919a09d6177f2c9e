//! Linear undo/redo history.
//!
//! The log is a single vector of applied events plus a pointer marking the redo boundary:
//! everything before the pointer can be undone, everything after it can be redone. Undo
//! never pushes the inverse event; the original stays in place so redo can replay it. Recording
//! a fresh edit while the pointer is behind the end discards the redo branch.

use crate::event::BufferEvent;

/// Undo stack with a redo pointer.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    events: Vec<BufferEvent>,
    pointer: usize,
    max_len: Option<usize>,
}

impl UndoLog {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `max_len` events, evicting the oldest.
    pub fn with_limit(max_len: Option<usize>) -> Self {
        Self {
            max_len,
            ..Self::default()
        }
    }

    /// Number of recorded events (undoable and redoable).
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Redo boundary.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Recorded events in application order.
    pub fn events(&self) -> &[BufferEvent] {
        &self.events
    }

    /// Can undo.
    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    /// Can redo.
    pub fn can_redo(&self) -> bool {
        self.pointer < self.events.len()
    }

    /// Append an already applied event, truncating any redo branch.
    pub fn record(&mut self, event: BufferEvent) {
        if self.pointer < self.events.len() {
            tracing::trace!(
                discarded = self.events.len() - self.pointer,
                "truncating redo branch"
            );
            self.events.truncate(self.pointer);
        }
        self.events.push(event);

        if let Some(max_len) = self.max_len
            && self.events.len() > max_len
        {
            let excess = self.events.len() - max_len;
            self.events.drain(..excess);
        }
        self.pointer = self.events.len();
    }

    /// Step back and return the inverse of the event to undo.
    pub fn undo(&mut self) -> Option<BufferEvent> {
        if self.pointer == 0 {
            return None;
        }
        self.pointer -= 1;
        self.events[self.pointer].revert()
    }

    /// Step forward and return the event to re-apply.
    pub fn redo(&mut self) -> Option<BufferEvent> {
        let event = self.events.get(self.pointer)?.clone();
        self.pointer += 1;
        Some(event)
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.events.clear();
        self.pointer = 0;
    }
}
