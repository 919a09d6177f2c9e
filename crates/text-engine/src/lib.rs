#![warn(missing_docs)]
//! Text Engine - gap-buffer text storage with undo, token index and change notification
//!
//! # Overview
//!
//! `text-engine` is the storage core of an editor. A [`Buffer`] keeps its content in a gap
//! buffer, routes every change through a [`BufferEvent`], records those events for undo/redo,
//! tracks a content version, and maintains a lazily rebuilt lexical index of lines and tokens.
//! Rendering, input handling and language analysis live elsewhere and talk to the buffer through
//! listeners, the shared token table, and [`Buffer::apply_semantic_tokens`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session (open buffers, active buffer)      │  ← Host API
//! ├─────────────────────────────────────────────┤
//! │  Buffer (edits, events, listeners, files)   │  ← Edit surface
//! ├─────────────────────────────────────────────┤
//! │  Undo Log            │  Token Index          │  ← Derived state
//! ├─────────────────────────────────────────────┤
//! │  Gap Buffer Storage                         │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use text_engine::Buffer;
//!
//! let mut buffer = Buffer::from_text("hello");
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let sink = log.clone();
//! buffer.add_listener(move |_, event| sink.lock().unwrap().push(event.kind.name()));
//!
//! buffer.del(0, 2);
//! assert_eq!(buffer.text(), "llo");
//!
//! buffer.undo();
//! assert_eq!(buffer.text(), "hello");
//! assert!(log.lock().unwrap().ends_with(&["delete", "insert"]));
//! ```
//!
//! # Module Description
//!
//! - [`storage`] - Gap buffer text storage
//! - [`event`] - Edit and lifecycle events
//! - [`undo`] - Linear undo/redo log
//! - [`line_index`] - Lines of tokens and coordinate mapping
//! - [`annotations`] - Semantic token matching
//! - [`buffer`] - The buffer itself
//! - [`persistence`] - Whole-file read/write backends
//! - [`session`] - Open buffers

pub mod annotations;
pub mod buffer;
pub mod config;
pub mod error;
pub mod event;
pub mod line_index;
pub mod persistence;
pub mod session;
pub mod storage;
pub mod undo;

pub use annotations::{MatchAbort, MatchReport, SemanticLegend};
pub use buffer::{Buffer, BufferListener};
pub use config::{BufferConfig, GapConfig};
pub use error::{BufferError, Result};
pub use event::{BufferEvent, EventKind, Position, TextRange};
pub use line_index::{Line, LineTable, SemanticAnnotation, SharedLineTable, Token};
pub use persistence::{FileSystem, LocalFileSystem, MemoryFileSystem};
pub use session::{BufferId, Session, SessionError};
pub use storage::TextStore;
pub use undo::UndoLog;

pub use text_engine_lang::{BoxedLexer, LexError, Lexeme, Lexer, TokenKind};
