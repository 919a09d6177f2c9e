//! Lexical index: lines of tokens, plus offset/position mapping.
//!
//! The table is rebuilt from scratch by running a [`Lexer`] over the full text; there is no
//! per-line patching. Every line ends with an [`TokenKind::EndOfLine`] or
//! [`TokenKind::EndOfFile`] token, so every line has at least one token and its start offset
//! is the index of its first token.
//!
//! The table lives behind a [`SharedLineTable`] so that readers on other threads (a renderer,
//! an annotation matcher fed by a language server) never observe a half-built table: a rebuild
//! is assembled off to the side and swapped in under the lock.

use crate::event::Position;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use text_engine_lang::{LexError, Lexer, TokenKind};

/// Semantic classification attached to a token by an external analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemanticAnnotation {
    /// Index into the analyzer's token type legend.
    pub token_type: u32,
    /// Bit set of modifiers from the analyzer's legend.
    pub modifiers: u32,
}

/// One token of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Start character offset in the document.
    pub index: usize,
    /// Column of `index` within its line.
    pub column: usize,
    /// Length in characters.
    pub length: usize,
    /// Lexical classification.
    pub kind: TokenKind,
    /// Semantic classification, if an analyzer supplied one since the last rebuild.
    pub semantic: Option<SemanticAnnotation>,
}

impl Token {
    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// The tokens of one line, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    tokens: Vec<Token>,
}

impl Line {
    /// Start offset of the line.
    pub fn begin(&self) -> usize {
        self.tokens[0].index
    }

    /// Exclusive end offset, including the terminator.
    pub fn end(&self) -> usize {
        self.terminator().end()
    }

    /// Length of the line content, excluding the terminator.
    pub fn content_len(&self) -> usize {
        self.terminator().index - self.begin()
    }

    /// The EndOfLine or EndOfFile token closing the line.
    pub fn terminator(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    /// All tokens of the line.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// Token covering `offset`; the terminator for offsets at or past the line end.
    fn token_at(&self, offset: usize) -> &Token {
        self.tokens
            .iter()
            .find(|token| offset < token.end())
            .unwrap_or_else(|| self.terminator())
    }
}

/// Lines of tokens built from one version of the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTable {
    lines: Vec<Line>,
    version: u64,
}

impl LineTable {
    /// Run `lexer` over `text` and collect its output into lines.
    ///
    /// Protocol violations (gaps, overlaps, empty non-terminal tokens, tokens past the end)
    /// are reported as [`LexError`]s instead of producing a malformed table.
    pub fn build<L>(lexer: &mut L, text: Vec<char>, version: u64) -> Result<Self, LexError>
    where
        L: Lexer + ?Sized,
    {
        let text_len = text.len();
        lexer.reset(text);

        let mut lines = Vec::new();
        let mut current = Vec::new();
        let mut expected = 0;
        let mut line_begin = 0;
        let mut produced = 0;

        loop {
            let lexeme = lexer.next_token()?;
            produced += 1;
            if produced > text_len + 1 {
                return Err(LexError::Stalled { index: expected });
            }
            if lexeme.index != expected {
                return Err(LexError::Overlap {
                    index: lexeme.index,
                    expected,
                });
            }
            if lexeme.end() > text_len {
                return Err(LexError::OutOfBounds {
                    index: lexeme.index,
                    length: lexeme.length,
                    text_len,
                });
            }
            match lexeme.kind {
                TokenKind::EndOfFile if lexeme.index != text_len => {
                    return Err(LexError::Custom(format!(
                        "end of file reported at {} before end of text {text_len}",
                        lexeme.index
                    )));
                }
                TokenKind::EndOfFile => {}
                _ if lexeme.length == 0 => {
                    return Err(LexError::Stalled {
                        index: lexeme.index,
                    });
                }
                _ => {}
            }

            current.push(Token {
                index: lexeme.index,
                column: lexeme.index - line_begin,
                length: lexeme.length,
                kind: lexeme.kind,
                semantic: None,
            });
            expected = lexeme.end();

            match lexeme.kind {
                TokenKind::EndOfLine => {
                    lines.push(Line {
                        tokens: std::mem::take(&mut current),
                    });
                    line_begin = expected;
                }
                TokenKind::EndOfFile => {
                    lines.push(Line { tokens: current });
                    break;
                }
                _ => {}
            }
        }

        Ok(Self { lines, version })
    }

    /// Buffer version this table was built from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` before the first successful build.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// One line.
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    /// Offset just past the text (the end-of-file token's index).
    pub fn end_offset(&self) -> usize {
        self.lines.last().map_or(0, |line| line.terminator().index)
    }

    fn contains(&self, line: usize, offset: usize) -> bool {
        self.lines[line].begin() <= offset
            && self
                .lines
                .get(line + 1)
                .is_none_or(|next| offset < next.begin())
    }

    /// Line containing `offset`.
    ///
    /// `hint` is a line known to be close to the answer (the previous cursor line); it and its
    /// neighbours are probed before falling back to binary search. Offsets past the start of the
    /// last line map to the last line.
    pub fn line_for_index(&self, offset: usize, hint: Option<usize>) -> usize {
        if offset == 0 || self.lines.is_empty() {
            return 0;
        }

        if let Some(hint) = hint {
            let candidates = [Some(hint), hint.checked_sub(1), hint.checked_add(1)];
            for line in candidates.into_iter().flatten() {
                if line < self.lines.len() && self.contains(line, offset) {
                    return line;
                }
            }
        }

        self.lines
            .partition_point(|line| line.begin() <= offset)
            .saturating_sub(1)
    }

    /// Convert a character offset to a line/column position.
    pub fn index_to_position(&self, offset: usize, hint: Option<usize>) -> Position {
        if offset == 0 || self.lines.is_empty() {
            return Position::new(0, 0);
        }
        let offset = offset.min(self.end_offset());
        let line = self.line_for_index(offset, hint);
        let token = self.lines[line].token_at(offset);
        Position::new(line, token.column + (offset - token.index))
    }

    /// Convert a line/column position to a character offset.
    ///
    /// Lines past the end clamp to the end of the text; columns past the end of a line clamp to
    /// the line terminator.
    pub fn position_to_index(&self, line: usize, column: usize) -> usize {
        let Some(l) = self.lines.get(line) else {
            return self.end_offset();
        };
        match l
            .tokens
            .iter()
            .find(|token| column < token.column + token.length)
        {
            Some(token) => token.index + (column - token.column),
            None => l.terminator().index,
        }
    }
}

/// Thread-shareable handle to a buffer's [`LineTable`].
#[derive(Debug, Clone, Default)]
pub struct SharedLineTable(Arc<Mutex<LineTable>>);

impl SharedLineTable {
    /// Wrap a table.
    pub fn new(table: LineTable) -> Self {
        Self(Arc::new(Mutex::new(table)))
    }

    /// Lock the table. A poisoned lock is recovered: tables are replaced wholesale, so a panic
    /// while the lock was held cannot leave one half-built.
    pub fn lock(&self) -> MutexGuard<'_, LineTable> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the current table.
    pub fn snapshot(&self) -> LineTable {
        self.lock().clone()
    }

    /// Version of the current table.
    pub fn version(&self) -> u64 {
        self.lock().version
    }
}
