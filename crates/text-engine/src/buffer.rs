//! The buffer: storage, versioning, undo, token index and listeners in one place.
//!
//! # Overview
//!
//! [`Buffer::insert`], [`Buffer::del`] and [`Buffer::replace`] are the only public ways to
//! change content. Each one clamps its arguments, records the pre-edit line/column range,
//! builds a [`BufferEvent`] and routes it through [`Buffer::apply`], which mutates the
//! [`TextStore`], bumps the content version and notifies listeners. The event is then
//! pushed onto the undo log.
//!
//! The token index is derived data. It is rebuilt by [`Buffer::lex`] only when the content
//! version has moved past the version the index was built from.
//!
//! # Example
//!
//! ```rust
//! use text_engine::{Buffer, Position};
//!
//! let mut buffer = Buffer::from_text("abc");
//! buffer.insert(1, "X");
//! assert_eq!(buffer.text(), "aXbc");
//! assert_eq!(buffer.version(), 1);
//!
//! buffer.undo();
//! assert_eq!(buffer.text(), "abc");
//!
//! assert_eq!(buffer.index_to_position(2, None), Position::new(0, 2));
//! ```

use crate::annotations::MatchReport;
use crate::config::BufferConfig;
use crate::error::{BufferError, Result};
use crate::event::{BufferEvent, EventKind, Position, TextRange};
use crate::line_index::{Line, LineTable, SharedLineTable};
use crate::persistence::{FileSystem, LocalFileSystem};
use crate::storage::TextStore;
use crate::undo::UndoLog;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use text_engine_lang::{BoxedLexer, PlainTextLexer};

/// Callback invoked synchronously for every applied event.
pub type BufferListener = Box<dyn FnMut(&Buffer, &BufferEvent) + Send>;

/// An open document.
pub struct Buffer {
    store: TextStore,
    version: u64,
    saved_version: u64,
    indexed_version: u64,
    index: SharedLineTable,
    undo: UndoLog,
    listeners: Vec<BufferListener>,
    name: Option<PathBuf>,
    lexer: BoxedLexer,
    fs: Arc<dyn FileSystem>,
    config: BufferConfig,
}

impl Buffer {
    /// Empty buffer with default configuration and the plain-text lexer.
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Empty buffer with `config`.
    ///
    /// The configuration is taken as is; run [`BufferConfig::validate`] first when it comes from
    /// user input. [`BufferConfig::from_json`], [`Buffer::open_path`] and
    /// [`Session::with_config`](crate::Session::with_config) validate for you.
    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            store: TextStore::new(config.gap),
            version: 0,
            saved_version: 0,
            indexed_version: 0,
            index: SharedLineTable::default(),
            undo: UndoLog::with_limit(config.max_undo),
            listeners: Vec::new(),
            name: None,
            lexer: Box::new(PlainTextLexer::new()),
            fs: Arc::new(LocalFileSystem),
            config,
        }
    }

    /// Unnamed buffer holding `text`.
    pub fn from_text(text: &str) -> Self {
        Self::from_text_with_config(text, BufferConfig::default())
    }

    /// Unnamed buffer holding `text`, sized and bounded by `config` (not validated, see
    /// [`with_config`](Self::with_config)).
    pub fn from_text_with_config(text: &str, config: BufferConfig) -> Self {
        let mut buffer = Self::with_config(config);
        buffer.store = TextStore::from_text(text, config.gap);
        buffer
    }

    /// Load `path` through `fs` into a new buffer and index it.
    pub fn open_path(
        path: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        lexer: BoxedLexer,
        config: BufferConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut buffer = Self::with_config(config).with_file_system(fs).with_lexer(lexer);
        buffer.open(path)?;
        Ok(buffer)
    }

    /// Use `lexer` for indexing.
    pub fn with_lexer(mut self, lexer: BoxedLexer) -> Self {
        self.set_lexer(lexer);
        self
    }

    /// Use `fs` for open and save.
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Swap the lexer; the index is rebuilt on the next query.
    pub fn set_lexer(&mut self, lexer: BoxedLexer) {
        self.lexer = lexer;
        *self.index.lock() = LineTable::default();
    }

    /// Register a listener. Listeners run in registration order.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&Buffer, &BufferEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Whole content.
    pub fn text(&self) -> String {
        self.store.text()
    }

    /// Up to `len` characters starting at `pos`, clamped to the content.
    pub fn substr(&self, pos: usize, len: usize) -> String {
        let pos = pos.min(self.store.len());
        let len = len.min(self.store.len() - pos);
        self.store.substr(pos, len)
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Content version, bumped once per content mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Version as of the last successful save or load.
    pub fn saved_version(&self) -> u64 {
        self.saved_version
    }

    /// Version the token index was last built from.
    pub fn indexed_version(&self) -> u64 {
        self.indexed_version
    }

    /// Returns `true` if there are unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.version != self.saved_version
    }

    /// Associated file, if any.
    pub fn name(&self) -> Option<&Path> {
        self.name.as_deref()
    }

    /// Configuration in use.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Underlying storage.
    pub fn store(&self) -> &TextStore {
        &self.store
    }

    /// Undo history.
    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    /// Can undo.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Can redo.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Number of edits that can currently be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo.pointer()
    }

    /// Handle to the token index for readers on other threads. It is not refreshed by this
    /// call; use [`lex`](Self::lex) first if the caller needs it current.
    pub fn lines(&self) -> SharedLineTable {
        self.index.clone()
    }

    /// Number of lines, re-indexing first if needed.
    pub fn line_count(&mut self) -> usize {
        match self.lex() {
            Ok(()) => self.index.lock().len(),
            Err(err) => {
                tracing::warn!(%err, "token index unavailable; counting newlines");
                self.store.scan_position(self.store.len()).0 + 1
            }
        }
    }

    /// Copy of line `index`, re-indexing first if needed.
    pub fn line(&mut self, index: usize) -> Option<Line> {
        self.lex().ok()?;
        self.index.lock().line(index).cloned()
    }

    /// Text of line `index` without its terminator.
    pub fn line_text(&mut self, index: usize) -> Option<String> {
        let line = self.line(index)?;
        Some(self.store.substr(line.begin(), line.content_len()))
    }

    // ---------------------------------------------------------------------
    // Coordinate mapping
    // ---------------------------------------------------------------------

    /// Line/column of `offset` (clamped to the content).
    pub fn index_to_position(&mut self, offset: usize, hint: Option<usize>) -> Position {
        let offset = offset.min(self.store.len());
        match self.lex() {
            Ok(()) => self.index.lock().index_to_position(offset, hint),
            Err(err) => {
                tracing::warn!(%err, "token index unavailable; scanning text");
                let (line, column) = self.store.scan_position(offset);
                Position::new(line, column)
            }
        }
    }

    /// Offset of `line`/`column`, clamped like [`LineTable::position_to_index`].
    pub fn position_to_index(&mut self, line: usize, column: usize) -> usize {
        match self.lex() {
            Ok(()) => self.index.lock().position_to_index(line, column),
            Err(err) => {
                tracing::warn!(%err, "token index unavailable; scanning text");
                self.scan_index(line, column)
            }
        }
    }

    fn scan_index(&self, line: usize, column: usize) -> usize {
        let chars = self.store.chars();
        let mut start = 0;
        for _ in 0..line {
            match chars[start..].iter().position(|&ch| ch == '\n') {
                Some(newline) => start += newline + 1,
                None => return chars.len(),
            }
        }
        let line_len = chars[start..]
            .iter()
            .position(|&ch| ch == '\n')
            .unwrap_or(chars.len() - start);
        start + column.min(line_len)
    }

    // ---------------------------------------------------------------------
    // Edit surface
    // ---------------------------------------------------------------------

    /// Insert `text` at `pos` (clamped). Empty text is ignored.
    pub fn insert(&mut self, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let pos = pos.min(self.store.len());
        let range = TextRange::point(self.edit_position(pos));
        self.record_edit(BufferEvent::make_insert(range, pos, text));
    }

    /// Delete up to `count` characters at `pos` (both clamped).
    pub fn del(&mut self, pos: usize, count: usize) {
        let pos = pos.min(self.store.len());
        let count = count.min(self.store.len() - pos);
        if count == 0 {
            return;
        }
        let start = self.edit_position(pos);
        let deleted = self.store.substr(pos, count);
        let end = position_after(start, &deleted);
        self.record_edit(BufferEvent::make_delete(
            TextRange::new(start, end),
            pos,
            deleted,
        ));
    }

    /// Replace up to `count` characters at `pos` with `text`, as one undoable step.
    pub fn replace(&mut self, pos: usize, count: usize, text: &str) {
        let pos = pos.min(self.store.len());
        let count = count.min(self.store.len() - pos);
        if count == 0 && text.is_empty() {
            return;
        }
        let start = self.edit_position(pos);
        let overwritten = self.store.substr(pos, count);
        let end = position_after(start, &overwritten);
        self.record_edit(BufferEvent::make_replacement(
            TextRange::new(start, end),
            pos,
            overwritten,
            text,
        ));
    }

    /// Pre-edit position of `offset` for an event range. Reads the token index only when it is
    /// current and never rebuilds it, so typing does not re-lex.
    fn edit_position(&self, offset: usize) -> Position {
        {
            let table = self.index.lock();
            if self.indexed_version == self.version && !table.is_empty() {
                return table.index_to_position(offset, None);
            }
        }
        let (line, column) = self.store.scan_position(offset);
        Position::new(line, column)
    }

    /// Apply `event` and, for content changes, record it for undo.
    pub fn edit(&mut self, event: BufferEvent) -> Result<()> {
        self.apply(&event)?;
        if event.is_content_change() {
            self.undo.record(event);
        }
        Ok(())
    }

    fn record_edit(&mut self, event: BufferEvent) {
        self.apply_content(&event);
        self.undo.record(event);
    }

    /// Revert the last recorded edit. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.undo() {
            Some(inverse) => {
                tracing::trace!(kind = inverse.kind.name(), position = inverse.position, "undo");
                self.apply_content(&inverse);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone edit. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some(event) => {
                tracing::trace!(kind = event.kind.name(), position = event.position, "redo");
                self.apply_content(&event);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Event application
    // ---------------------------------------------------------------------

    /// Apply one event and notify listeners.
    ///
    /// Content events cannot fail. Save and Open return I/O errors and leave the buffer
    /// untouched when they do. A save with nothing new to write is a silent no-op.
    ///
    /// # Panics
    ///
    /// Panics if a content event refers to text outside the buffer.
    pub fn apply(&mut self, event: &BufferEvent) -> Result<()> {
        match &event.kind {
            EventKind::Insert(_) | EventKind::Delete(_) | EventKind::Replace { .. } => {
                self.apply_content(event);
                return Ok(());
            }
            EventKind::Save { filename } => {
                if !self.write_out(filename.as_deref())? {
                    return Ok(());
                }
            }
            EventKind::Open { filename } => self.load(filename.as_deref())?,
            EventKind::Close => {
                self.notify(event);
                self.reset();
                return Ok(());
            }
            EventKind::Indexed => {}
        }
        self.notify(event);
        Ok(())
    }

    fn apply_content(&mut self, event: &BufferEvent) {
        let pos = event.position;
        match &event.kind {
            EventKind::Insert(text) => self.put(pos, text),
            EventKind::Delete(text) => self.store.delete(pos, text.chars().count()),
            EventKind::Replace {
                overwritten,
                replacement,
            } => {
                self.store.delete(pos, overwritten.chars().count());
                self.put(pos, replacement);
            }
            _ => unreachable!("apply_content called with {} event", event.kind.name()),
        }
        // Replace is a single version step; listeners never see the half-applied state.
        self.version += 1;
        self.notify(event);
    }

    fn put(&mut self, pos: usize, text: &str) {
        if pos < self.store.len() {
            self.store.insert_str(pos, text);
        } else {
            self.store.append(text);
        }
    }

    fn notify(&mut self, event: &BufferEvent) {
        let listeners = std::mem::take(&mut self.listeners);
        let mut guard = ListenerGuard {
            buffer: self,
            listeners,
        };
        let ListenerGuard { buffer, listeners } = &mut guard;
        for listener in listeners.iter_mut() {
            listener(&**buffer, event);
        }
    }

    fn reset(&mut self) {
        self.store.clear();
        self.undo.clear();
        *self.index.lock() = LineTable::default();
        self.version = 0;
        self.saved_version = 0;
        self.indexed_version = 0;
        self.name = None;
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Write the content to the associated file.
    pub fn save(&mut self) -> Result<()> {
        self.apply(&BufferEvent::make_save())
    }

    /// Write the content to `name` and associate the buffer with it.
    pub fn save_as(&mut self, name: impl Into<PathBuf>) -> Result<()> {
        self.apply(&BufferEvent::make_save_as(name))
    }

    /// Replace the content with the file at `path` and index it.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.apply(&BufferEvent::make_open(path))?;
        if let Err(err) = self.lex() {
            tracing::warn!(%err, "initial indexing failed; will retry on next query");
        }
        Ok(())
    }

    /// Notify listeners and reset to an empty, unnamed buffer. Listeners stay registered.
    pub fn close(&mut self) {
        // Close has no failure path.
        let _ = self.apply(&BufferEvent::make_close());
    }

    /// Returns `Ok(false)` when the save is a no-op.
    fn write_out(&mut self, filename: Option<&Path>) -> Result<bool> {
        let target = match filename {
            Some(path) => path.to_path_buf(),
            None => self.name.clone().ok_or(BufferError::NoFileName)?,
        };
        let renaming = self.name.as_deref() != Some(target.as_path());
        if !renaming && self.saved_version == self.version {
            tracing::trace!(path = %target.display(), "save skipped; no changes");
            return Ok(false);
        }

        let content = self.store.text();
        let written = self
            .fs
            .write_file(&target, content.as_bytes())
            .map_err(|err| BufferError::io(&target, err))?;
        tracing::debug!(path = %target.display(), bytes = written, version = self.version, "buffer saved");

        self.saved_version = self.version;
        self.name = Some(target);
        Ok(true)
    }

    fn load(&mut self, filename: Option<&Path>) -> Result<()> {
        let path = match filename {
            Some(path) => path.to_path_buf(),
            None => self.name.clone().ok_or(BufferError::NoFileName)?,
        };
        let bytes = self
            .fs
            .read_file(&path)
            .map_err(|err| BufferError::io(&path, err))?;
        let text = String::from_utf8(bytes).map_err(|_| BufferError::Encoding {
            path: path.clone(),
        })?;
        tracing::debug!(path = %path.display(), chars = text.chars().count(), "buffer loaded");

        self.reset();
        self.store = TextStore::from_text(&text, self.config.gap);
        self.name = Some(path);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Indexing
    // ---------------------------------------------------------------------

    /// Rebuild the token index if the content changed since it was last built.
    ///
    /// The rebuild happens under the index lock and is published only once the lexer has
    /// produced a complete table. On failure the previous table and `indexed_version` stay as
    /// they were, so the next query retries.
    pub fn lex(&mut self) -> Result<()> {
        {
            let mut table = self.index.lock();
            if self.indexed_version == self.version && !table.is_empty() {
                return Ok(());
            }
            let rebuilt = LineTable::build(&mut self.lexer, self.store.chars(), self.version)?;
            tracing::debug!(
                version = self.version,
                lines = rebuilt.len(),
                lexer = self.lexer.name(),
                "token index rebuilt"
            );
            *table = rebuilt;
            self.indexed_version = self.version;
        }
        self.notify(&BufferEvent::make_indexed());
        Ok(())
    }

    /// Attach semantic annotations to the current index. Mismatches are skipped, not errors.
    pub fn apply_semantic_tokens(&self, data: &[u32]) -> MatchReport {
        self.index.apply_semantic_tokens(data)
    }
}

/// Hands the listener list back to the buffer, also when a listener panics.
struct ListenerGuard<'a> {
    buffer: &'a mut Buffer,
    listeners: Vec<BufferListener>,
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        self.buffer.listeners = std::mem::take(&mut self.listeners);
    }
}

/// End of `text` when it starts at `start`.
fn position_after(start: Position, text: &str) -> Position {
    match text.rfind('\n') {
        Some(last) => Position::new(
            start.line + text.matches('\n').count(),
            text[last + 1..].chars().count(),
        ),
        None => Position::new(start.line, start.column + text.chars().count()),
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("len", &self.store.len())
            .field("version", &self.version)
            .field("saved_version", &self.saved_version)
            .field("indexed_version", &self.indexed_version)
            .field("undo", &self.undo.len())
            .field("listeners", &self.listeners.len())
            .field("lexer", &self.lexer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryFileSystem;
    use std::sync::Mutex;

    fn memory_buffer(path: &str, content: &str) -> (Buffer, Arc<MemoryFileSystem>) {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert(path, content);
        let buffer = Buffer::open_path(
            path,
            fs.clone(),
            Box::new(PlainTextLexer::new()),
            BufferConfig::default(),
        )
        .unwrap();
        (buffer, fs)
    }

    #[test]
    fn test_basic_insert() {
        let mut buffer = Buffer::from_text("abc");
        buffer.insert(1, "X");
        assert_eq!(buffer.text(), "aXbc");
        assert_eq!(buffer.version(), 1);
        assert_eq!(buffer.undo_log().len(), 1);
        assert_eq!(buffer.undo_log().events()[0].insert(), "X");
    }

    #[test]
    fn test_insert_clamps_and_appends() {
        let mut buffer = Buffer::from_text("ab");
        buffer.insert(99, "c");
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.undo_log().events()[0].position, 2);
    }

    #[test]
    fn test_empty_edits_are_ignored() {
        let mut buffer = Buffer::from_text("ab");
        buffer.insert(0, "");
        buffer.del(1, 0);
        buffer.del(2, 5);
        buffer.replace(0, 0, "");
        assert_eq!(buffer.version(), 0);
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_delete_records_range_and_text() {
        let mut buffer = Buffer::from_text("ab\ncd");
        buffer.del(1, 3);
        assert_eq!(buffer.text(), "ad");
        let event = &buffer.undo_log().events()[0];
        assert_eq!(event.deletion(), "b\nc");
        assert_eq!(
            event.range,
            TextRange::new(Position::new(0, 1), Position::new(1, 1))
        );
    }

    #[test]
    fn test_replace_is_single_version_step() {
        let mut buffer = Buffer::from_text("foobar");
        buffer.replace(0, 3, "baz");
        assert_eq!(buffer.text(), "bazbar");
        assert_eq!(buffer.version(), 1);
        assert_eq!(buffer.undo_log().events()[0].replacement(), ("foo", "baz"));
        buffer.undo();
        assert_eq!(buffer.text(), "foobar");
    }

    #[test]
    fn test_lex_is_lazy() {
        let mut buffer = Buffer::from_text("a\nb");
        assert_eq!(buffer.indexed_version(), 0);
        assert_eq!(buffer.line_count(), 2);
        buffer.insert(0, "x\n");
        assert_eq!(buffer.indexed_version(), 0);
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.indexed_version(), buffer.version());
        assert_eq!(buffer.line_text(0).as_deref(), Some("x"));
        assert_eq!(buffer.line_text(2).as_deref(), Some("b"));
    }

    #[test]
    fn test_save_and_modified_flag() {
        let (mut buffer, fs) = memory_buffer("a.txt", "one");
        assert!(!buffer.is_modified());
        buffer.insert(3, " two");
        assert!(buffer.is_modified());
        buffer.save().unwrap();
        assert!(!buffer.is_modified());
        assert_eq!(fs.contents("a.txt").unwrap(), b"one two");
    }

    #[test]
    fn test_save_without_name_fails() {
        let mut buffer = Buffer::from_text("x");
        assert!(matches!(buffer.save(), Err(BufferError::NoFileName)));
    }

    #[test]
    fn test_open_missing_file_keeps_state() {
        let fs = Arc::new(MemoryFileSystem::new());
        let mut buffer = Buffer::from_text("keep").with_file_system(fs);
        let err = buffer.open("missing.txt").unwrap_err();
        assert!(matches!(err, BufferError::Io { .. }));
        assert_eq!(buffer.text(), "keep");
        assert_eq!(buffer.name(), None);
    }

    #[test]
    fn test_open_rejects_invalid_utf8() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("bin", vec![0xff, 0xfe]);
        let mut buffer = Buffer::new().with_file_system(fs);
        assert!(matches!(
            buffer.open("bin"),
            Err(BufferError::Encoding { .. })
        ));
    }

    #[test]
    fn test_listener_sees_buffer_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut buffer = Buffer::from_text("ab");
        buffer.add_listener(move |buffer, event| {
            sink.lock()
                .unwrap()
                .push((event.kind.name(), buffer.text(), buffer.version()));
        });
        buffer.lex().unwrap();
        buffer.insert(2, "c");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("indexed", "ab".to_string(), 0), ("insert", "abc".to_string(), 1)]
        );
    }

    #[test]
    fn test_debug_output() {
        let buffer = Buffer::from_text("abc");
        let debug = format!("{buffer:?}");
        assert!(debug.contains("len: 3"));
        assert!(debug.contains("lexer: \"plain\""));
    }

    #[test]
    fn test_edit_ranges_without_index() {
        let mut buffer = Buffer::from_text("one\ntwo\nthree");
        buffer.del(2, 7);
        buffer.replace(0, 2, "a\nb");
        assert_eq!(buffer.indexed_version(), 0);
        assert!(buffer.lines().lock().is_empty());

        let events = buffer.undo_log().events();
        assert_eq!(
            events[0].range,
            TextRange::new(Position::new(0, 2), Position::new(2, 1))
        );
        assert_eq!(
            events[1].range,
            TextRange::new(Position::new(0, 0), Position::new(0, 2))
        );
    }

    #[test]
    fn test_position_after() {
        let start = Position::new(3, 4);
        assert_eq!(position_after(start, ""), start);
        assert_eq!(position_after(start, "ab"), Position::new(3, 6));
        assert_eq!(position_after(start, "ab\ncdé"), Position::new(4, 3));
        assert_eq!(position_after(start, "x\n"), Position::new(4, 0));
    }

    #[test]
    fn test_panicking_listener_keeps_registrations() {
        use std::panic::{AssertUnwindSafe, catch_unwind};
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let armed = Arc::new(AtomicBool::new(true));
        let trigger = armed.clone();

        let mut buffer = Buffer::from_text("ab");
        buffer.add_listener(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        buffer.add_listener(move |_, _| {
            if trigger.swap(false, Ordering::SeqCst) {
                panic!("listener failure");
            }
        });

        let result = catch_unwind(AssertUnwindSafe(|| buffer.insert(2, "c")));
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        buffer.insert(3, "d");
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(format!("{buffer:?}").contains("listeners: 2"));
    }

    #[test]
    fn test_from_text_with_config() {
        let config = BufferConfig {
            max_undo: Some(1),
            ..BufferConfig::default()
        };
        let mut buffer = Buffer::from_text_with_config("x", config);
        buffer.insert(1, "y");
        buffer.insert(2, "z");
        assert_eq!(buffer.text(), "xyz");
        assert_eq!(buffer.undo_log().len(), 1);
        assert_eq!(buffer.config().max_undo, Some(1));
    }

    #[test]
    fn test_open_path_rejects_invalid_config() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("a.txt", "a");
        let config = BufferConfig {
            max_undo: Some(0),
            ..BufferConfig::default()
        };
        let err = Buffer::open_path("a.txt", fs, Box::new(PlainTextLexer::new()), config)
            .unwrap_err();
        assert!(matches!(err, BufferError::Config(_)));
    }
}
