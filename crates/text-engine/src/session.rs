//! Editing session: the set of open buffers.
//!
//! A [`Session`] is an explicit handle owned by the host. It carries the shared configuration,
//! the language registry used to pick a lexer per file and the file system every buffer reads
//! and writes through. Buffers are addressed by opaque [`BufferId`]s; one of them may be active.

use crate::buffer::Buffer;
use crate::config::BufferConfig;
use crate::error::{BufferError, Result};
use crate::persistence::{FileSystem, LocalFileSystem};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use text_engine_lang::LanguageRegistry;
use thiserror::Error;

/// Opaque identifier for a buffer in a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(u64);

impl BufferId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error)]
/// Session-level errors.
pub enum SessionError {
    #[error("no buffer {0}")]
    /// A buffer id was not found.
    BufferNotFound(BufferId),

    #[error(transparent)]
    /// The buffer itself failed.
    Buffer(#[from] BufferError),
}

/// Open buffers plus the collaborators they share.
pub struct Session {
    config: BufferConfig,
    languages: LanguageRegistry,
    fs: Arc<dyn FileSystem>,
    buffers: BTreeMap<BufferId, Buffer>,
    active: Option<BufferId>,
    next_id: u64,
}

impl Session {
    /// Session on the local disk with default configuration and the built-in languages.
    pub fn new() -> Self {
        Self {
            config: BufferConfig::default(),
            languages: LanguageRegistry::with_defaults(),
            fs: Arc::new(LocalFileSystem),
            buffers: BTreeMap::new(),
            active: None,
            next_id: 1,
        }
    }

    /// Use `fs` for every buffer opened from now on.
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Use `config` for every buffer created from now on.
    pub fn with_config(mut self, config: BufferConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Use `languages` to pick lexers.
    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = languages;
        self
    }

    /// Language registry.
    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Number of open buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Returns `true` if no buffer is open.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    fn allocate_id(&mut self) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create an empty, unnamed buffer and make it active.
    pub fn new_buffer(&mut self) -> BufferId {
        let id = self.allocate_id();
        let buffer = Buffer::with_config(self.config).with_file_system(self.fs.clone());
        self.buffers.insert(id, buffer);
        self.active = Some(id);
        tracing::debug!(%id, "buffer created");
        id
    }

    /// Open `path` and make it active. A buffer already holding `path` is reused as is.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<BufferId> {
        let path = path.into();
        if let Some(id) = self.find_by_path(&path) {
            self.active = Some(id);
            return Ok(id);
        }

        let lexer = self
            .languages
            .lexer_for_path(&path)
            .map_err(|err| BufferError::Config(format!("language rules: {err}")))?;
        let buffer = Buffer::open_path(&path, self.fs.clone(), lexer, self.config)?;
        let id = self.allocate_id();
        tracing::debug!(%id, path = %path.display(), "buffer opened");
        self.buffers.insert(id, buffer);
        self.active = Some(id);
        Ok(id)
    }

    /// Buffer by id.
    pub fn buffer(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(&id)
    }

    /// Mutable buffer by id.
    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.buffers.get_mut(&id)
    }

    /// Active buffer id.
    pub fn active(&self) -> Option<BufferId> {
        self.active
    }

    /// Active buffer.
    pub fn active_buffer_mut(&mut self) -> Option<&mut Buffer> {
        let id = self.active?;
        self.buffers.get_mut(&id)
    }

    /// Make `id` the active buffer.
    pub fn set_active(&mut self, id: BufferId) -> Result<(), SessionError> {
        if !self.buffers.contains_key(&id) {
            return Err(SessionError::BufferNotFound(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Close `id`: listeners get the Close event, then the buffer is dropped. If it was active,
    /// the buffer with the highest remaining id becomes active.
    pub fn close(&mut self, id: BufferId) -> Result<(), SessionError> {
        let mut buffer = self
            .buffers
            .remove(&id)
            .ok_or(SessionError::BufferNotFound(id))?;
        buffer.close();
        if self.active == Some(id) {
            self.active = self.buffers.keys().next_back().copied();
        }
        tracing::debug!(%id, "buffer closed");
        Ok(())
    }

    /// Open buffer ids in creation order.
    pub fn buffer_ids(&self) -> Vec<BufferId> {
        self.buffers.keys().copied().collect()
    }

    /// Buffer associated with `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<BufferId> {
        self.buffers
            .iter()
            .find(|(_, buffer)| buffer.name() == Some(path))
            .map(|(id, _)| *id)
    }

    /// Buffers with unsaved changes.
    pub fn modified_buffers(&self) -> Vec<BufferId> {
        self.buffers
            .iter()
            .filter(|(_, buffer)| buffer.is_modified())
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("buffers", &self.buffers)
            .field("active", &self.active)
            .field("fs", &self.fs)
            .finish()
    }
}
