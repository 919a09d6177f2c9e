//! Buffer events.
//!
//! Every change to a [`Buffer`](crate::Buffer) is described by a [`BufferEvent`] before it is
//! applied. Content events carry enough data to build their exact inverse, which is how undo
//! works: undoing an insert applies a delete of the same text at the same position, and so on.
//! The same events are handed to listeners, so a language client can forward them as
//! document changes without diffing.

use std::fmt;
use std::path::{Path, PathBuf};

/// Logical line/column coordinate (character columns, zero based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Line index.
    pub line: usize,
    /// Column in characters.
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Pre-edit span of an event, for display and language-server purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    /// Start of the affected span.
    pub start: Position,
    /// End of the affected span.
    pub end: Position,
}

impl TextRange {
    /// Create a range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at `at`.
    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }
}

/// What an event does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `text` was inserted at the event position.
    Insert(String),
    /// `text` was removed from the event position.
    Delete(String),
    /// `overwritten` at the event position was replaced by `replacement`.
    Replace {
        /// Text that was there before.
        overwritten: String,
        /// Text written in its place.
        replacement: String,
    },
    /// Content written to disk; `filename` is set for save-as.
    Save {
        /// New file name, if the buffer is being renamed.
        filename: Option<PathBuf>,
    },
    /// Content loaded from disk.
    Open {
        /// File that was loaded.
        filename: Option<PathBuf>,
    },
    /// Buffer is being closed.
    Close,
    /// The token index was rebuilt and is current.
    Indexed,
}

impl EventKind {
    /// Short tag for logs.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Insert(_) => "insert",
            EventKind::Delete(_) => "delete",
            EventKind::Replace { .. } => "replace",
            EventKind::Save { .. } => "save",
            EventKind::Open { .. } => "open",
            EventKind::Close => "close",
            EventKind::Indexed => "indexed",
        }
    }
}

/// One buffer mutation or lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEvent {
    /// Character offset the event applies at.
    pub position: usize,
    /// Line/column span computed before the event was applied.
    pub range: TextRange,
    /// Payload.
    pub kind: EventKind,
}

impl BufferEvent {
    fn new(range: TextRange, position: usize, kind: EventKind) -> Self {
        Self {
            position,
            range,
            kind,
        }
    }

    /// Insertion of `text` at `position`.
    pub fn make_insert(range: TextRange, position: usize, text: impl Into<String>) -> Self {
        Self::new(range, position, EventKind::Insert(text.into()))
    }

    /// Deletion of `text` found at `position`.
    pub fn make_delete(range: TextRange, position: usize, text: impl Into<String>) -> Self {
        Self::new(range, position, EventKind::Delete(text.into()))
    }

    /// Replacement of `overwritten` at `position` by `replacement`.
    pub fn make_replacement(
        range: TextRange,
        position: usize,
        overwritten: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self::new(
            range,
            position,
            EventKind::Replace {
                overwritten: overwritten.into(),
                replacement: replacement.into(),
            },
        )
    }

    /// Save under the current name.
    pub fn make_save() -> Self {
        Self::new(TextRange::default(), 0, EventKind::Save { filename: None })
    }

    /// Save under `name`, renaming the buffer.
    pub fn make_save_as(name: impl Into<PathBuf>) -> Self {
        Self::new(
            TextRange::default(),
            0,
            EventKind::Save {
                filename: Some(name.into()),
            },
        )
    }

    /// Load from `name`.
    pub fn make_open(name: impl Into<PathBuf>) -> Self {
        Self::new(
            TextRange::default(),
            0,
            EventKind::Open {
                filename: Some(name.into()),
            },
        )
    }

    /// Close the buffer.
    pub fn make_close() -> Self {
        Self::new(TextRange::default(), 0, EventKind::Close)
    }

    /// Index rebuilt.
    pub fn make_indexed() -> Self {
        Self::new(TextRange::default(), 0, EventKind::Indexed)
    }

    /// Structural inverse. Lifecycle events have none and return `None`.
    pub fn revert(&self) -> Option<BufferEvent> {
        let kind = match &self.kind {
            EventKind::Insert(text) => EventKind::Delete(text.clone()),
            EventKind::Delete(text) => EventKind::Insert(text.clone()),
            EventKind::Replace {
                overwritten,
                replacement,
            } => EventKind::Replace {
                overwritten: replacement.clone(),
                replacement: overwritten.clone(),
            },
            EventKind::Save { .. }
            | EventKind::Open { .. }
            | EventKind::Close
            | EventKind::Indexed => return None,
        };
        Some(Self::new(self.range, self.position, kind))
    }

    /// Returns `true` for Insert, Delete and Replace.
    pub fn is_content_change(&self) -> bool {
        matches!(
            self.kind,
            EventKind::Insert(_) | EventKind::Delete(_) | EventKind::Replace { .. }
        )
    }

    /// Inserted text.
    ///
    /// # Panics
    ///
    /// Panics if this is not an insert event.
    pub fn insert(&self) -> &str {
        match &self.kind {
            EventKind::Insert(text) => text,
            other => panic!("insert() called on {} event", other.name()),
        }
    }

    /// Deleted text.
    ///
    /// # Panics
    ///
    /// Panics if this is not a delete event.
    pub fn deletion(&self) -> &str {
        match &self.kind {
            EventKind::Delete(text) => text,
            other => panic!("deletion() called on {} event", other.name()),
        }
    }

    /// `(overwritten, replacement)`.
    ///
    /// # Panics
    ///
    /// Panics if this is not a replace event.
    pub fn replacement(&self) -> (&str, &str) {
        match &self.kind {
            EventKind::Replace {
                overwritten,
                replacement,
            } => (overwritten, replacement),
            other => panic!("replacement() called on {} event", other.name()),
        }
    }

    /// File name carried by a save or open event.
    ///
    /// # Panics
    ///
    /// Panics if this is neither a save nor an open event.
    pub fn filename(&self) -> Option<&Path> {
        match &self.kind {
            EventKind::Save { filename } | EventKind::Open { filename } => filename.as_deref(),
            other => panic!("filename() called on {} event", other.name()),
        }
    }
}
