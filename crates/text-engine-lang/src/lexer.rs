//! The lexer plugin interface.
//!
//! The engine resets a lexer over the full document text and then pulls [`Lexeme`]s until it
//! sees [`TokenKind::EndOfFile`]. Lines are delimited by [`TokenKind::EndOfLine`] lexemes, which
//! cover the `'\n'` character itself. All offsets are character offsets.

use thiserror::Error;

/// Classification of a lexeme, used later to pick a rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Spaces, tabs and carriage returns.
    Whitespace,
    /// A name that is not a keyword.
    Identifier,
    /// A reserved word of the language.
    Keyword,
    /// A numeric literal.
    Number,
    /// A string or character literal.
    String,
    /// A line or block comment (one lexeme per line for block comments).
    Comment,
    /// Operators, punctuation and anything else.
    Symbol,
    /// The `'\n'` terminating a line.
    EndOfLine,
    /// Zero-length marker at the end of the text.
    EndOfFile,
}

impl TokenKind {
    /// Returns `true` for the kinds that terminate a line.
    pub fn is_terminator(self) -> bool {
        matches!(self, TokenKind::EndOfLine | TokenKind::EndOfFile)
    }

    /// Scope name for theme lookup.
    pub fn scope(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Number => "constant.numeric",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Symbol => "punctuation",
            TokenKind::EndOfLine | TokenKind::EndOfFile => "text",
        }
    }
}

/// One lexeme reported by a [`Lexer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    /// Start character offset in the text passed to [`Lexer::reset`].
    pub index: usize,
    /// Length in characters.
    pub length: usize,
    /// Classification.
    pub kind: TokenKind,
}

impl Lexeme {
    /// Create a lexeme.
    pub fn new(index: usize, length: usize, kind: TokenKind) -> Self {
        Self {
            index,
            length,
            kind,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// Errors reported by lexers, or by the engine when a lexer breaks the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("lexer stalled at offset {index}")]
    /// A non-terminal lexeme had zero length.
    Stalled {
        /// Offset where no progress was made.
        index: usize,
    },

    #[error("lexeme {index}+{length} runs past the end of the text ({text_len})")]
    /// A lexeme extends beyond the text.
    OutOfBounds {
        /// Lexeme start.
        index: usize,
        /// Lexeme length.
        length: usize,
        /// Text length in characters.
        text_len: usize,
    },

    #[error("lexeme at {index} does not continue from {expected}")]
    /// A lexeme skipped or overlapped text.
    Overlap {
        /// Lexeme start.
        index: usize,
        /// Offset the lexeme should have started at.
        expected: usize,
    },

    #[error("lexer failed: {0}")]
    /// Implementation-specific failure.
    Custom(String),
}

/// A per-language tokenizer.
///
/// Implementations are stateful cursors: [`reset`](Lexer::reset) hands over the full text and
/// [`next_token`](Lexer::next_token) yields consecutive lexemes covering it without gaps. After
/// the end of the text every call returns an [`TokenKind::EndOfFile`] lexeme.
pub trait Lexer {
    /// Restart tokenization over `text`.
    fn reset(&mut self, text: Vec<char>);

    /// Produce the next lexeme.
    fn next_token(&mut self) -> Result<Lexeme, LexError>;

    /// Language name, for diagnostics.
    fn name(&self) -> &str {
        "plain"
    }
}

/// Owned, thread-transferable lexer as stored by a buffer.
pub type BoxedLexer = Box<dyn Lexer + Send>;

impl<L: Lexer + ?Sized> Lexer for Box<L> {
    fn reset(&mut self, text: Vec<char>) {
        (**self).reset(text);
    }

    fn next_token(&mut self) -> Result<Lexeme, LexError> {
        (**self).next_token()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
