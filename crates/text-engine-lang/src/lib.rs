#![warn(missing_docs)]
//! `text-engine-lang` - pluggable tokenization for `text-engine`.
//!
//! This crate stays independent of the buffer engine. It defines the [`Lexer`] capability the
//! engine consumes once per index rebuild, a couple of built-in lexers, and a small data-driven
//! [`LanguageRegistry`] that picks a lexer from a file name.
//!
//! ```rust
//! use text_engine_lang::{LanguageRegistry, Lexer, TokenKind};
//!
//! let registry = LanguageRegistry::with_defaults();
//! let mut lexer = registry.lexer_for_path("main.rs".as_ref()).unwrap();
//! lexer.reset("fn main() {}".chars().collect());
//!
//! let first = lexer.next_token().unwrap();
//! assert_eq!(first.kind, TokenKind::Keyword);
//! assert_eq!((first.index, first.length), (0, 2));
//! ```

pub mod config;
pub mod lexer;
pub mod plain;
pub mod regex_lexer;
pub mod registry;

pub use config::{CommentConfig, LanguageConfig};
pub use lexer::{BoxedLexer, LexError, Lexeme, Lexer, TokenKind};
pub use plain::PlainTextLexer;
pub use regex_lexer::{LexRule, RegexLexer};
pub use registry::LanguageRegistry;
