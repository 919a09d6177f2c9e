//! Fallback lexer for files without a known language.

use crate::lexer::{LexError, Lexeme, Lexer, TokenKind};

/// Splits text into words, whitespace runs and single symbols.
#[derive(Debug, Clone, Default)]
pub struct PlainTextLexer {
    text: Vec<char>,
    pos: usize,
}

impl PlainTextLexer {
    /// Create a lexer with no text.
    pub fn new() -> Self {
        Self::default()
    }

    fn run_while(&self, pred: impl Fn(char) -> bool) -> usize {
        self.text[self.pos..]
            .iter()
            .take_while(|&&ch| pred(ch))
            .count()
    }
}

fn is_inline_space(ch: char) -> bool {
    ch != '\n' && ch.is_whitespace()
}

impl Lexer for PlainTextLexer {
    fn reset(&mut self, text: Vec<char>) {
        self.text = text;
        self.pos = 0;
    }

    fn next_token(&mut self) -> Result<Lexeme, LexError> {
        let Some(&ch) = self.text.get(self.pos) else {
            return Ok(Lexeme::new(self.text.len(), 0, TokenKind::EndOfFile));
        };

        let (length, kind) = if ch == '\n' {
            (1, TokenKind::EndOfLine)
        } else if is_inline_space(ch) {
            (self.run_while(is_inline_space), TokenKind::Whitespace)
        } else if ch.is_alphanumeric() || ch == '_' {
            (
                self.run_while(|c| c.is_alphanumeric() || c == '_'),
                TokenKind::Identifier,
            )
        } else {
            (1, TokenKind::Symbol)
        };

        let lexeme = Lexeme::new(self.pos, length, kind);
        self.pos += length;
        Ok(lexeme)
    }
}
