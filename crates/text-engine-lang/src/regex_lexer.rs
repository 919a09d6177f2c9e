//! Rule-based lexer driven by a [`LanguageConfig`].
//!
//! Rules are anchored regexes tried in order against the rest of the current line; the first
//! non-empty match wins. Identifiers found in the keyword table become keywords. Block comments
//! are tracked across lines and reported as one [`TokenKind::Comment`] lexeme per line.

use crate::config::LanguageConfig;
use crate::lexer::{LexError, Lexeme, Lexer, TokenKind};
use regex::Regex;
use std::collections::HashSet;

const WHITESPACE: &str = r"[^\S\n]+";
const NUMBER: &str =
    r"0[xX][0-9a-fA-F_]+|[0-9][0-9_]*(?:\.[0-9][0-9_]*)?(?:[eE][+-]?[0-9]+)?";
const IDENTIFIER: &str = r"[\p{L}_][\p{L}\p{N}_]*";

/// A single anchored lexing rule.
#[derive(Debug, Clone)]
pub struct LexRule {
    regex: Regex,
    kind: TokenKind,
}

impl LexRule {
    /// Compile `pattern`; it is anchored at the current position automatically.
    pub fn new(pattern: &str, kind: TokenKind) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&format!("^(?:{pattern})"))?,
            kind,
        })
    }

    /// The kind reported for matches of this rule.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Byte length of a non-empty match at the start of `line`.
    fn match_len(&self, line: &str) -> Option<usize> {
        self.regex.find(line).map(|m| m.end()).filter(|&len| len > 0)
    }
}

/// A regex-driven lexer.
#[derive(Debug, Clone)]
pub struct RegexLexer {
    name: String,
    rules: Vec<LexRule>,
    keywords: HashSet<String>,
    block_comment: Option<(String, String)>,
    text: String,
    byte_pos: usize,
    char_pos: usize,
    char_len: usize,
    in_block_comment: bool,
}

impl RegexLexer {
    /// Build a lexer from explicit rules.
    pub fn new(name: impl Into<String>, rules: Vec<LexRule>) -> Self {
        Self {
            name: name.into(),
            rules,
            keywords: HashSet::new(),
            block_comment: None,
            text: String::new(),
            byte_pos: 0,
            char_pos: 0,
            char_len: 0,
            in_block_comment: false,
        }
    }

    /// Build the standard rule set for a language.
    pub fn from_config(config: &LanguageConfig) -> Result<Self, regex::Error> {
        let mut rules = vec![LexRule::new(WHITESPACE, TokenKind::Whitespace)?];
        if let Some(token) = config.comments.line_token() {
            rules.push(LexRule::new(
                &format!("{}.*", regex::escape(token)),
                TokenKind::Comment,
            )?);
        }
        for &delim in &config.string_delimiters {
            let d = regex::escape(&delim.to_string());
            rules.push(LexRule::new(
                &format!(r"{d}(?:\\.|[^{d}\\])*{d}?"),
                TokenKind::String,
            )?);
        }
        rules.push(LexRule::new(NUMBER, TokenKind::Number)?);
        rules.push(LexRule::new(IDENTIFIER, TokenKind::Identifier)?);

        let mut lexer = Self::new(config.name.clone(), rules);
        lexer.keywords = config.keywords.iter().cloned().collect();
        lexer.block_comment = config
            .comments
            .block_tokens()
            .map(|(start, end)| (start.to_string(), end.to_string()));
        Ok(lexer)
    }

    /// Add keywords to the table.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// The rules in match order.
    pub fn rules(&self) -> &[LexRule] {
        &self.rules
    }

    /// Returns `(byte_len, kind)` for the lexeme at the start of `line` (never empty).
    fn scan_line(&mut self, line: &str) -> (usize, TokenKind) {
        if let Some((start, end)) = &self.block_comment {
            if self.in_block_comment {
                return match line.find(end.as_str()) {
                    Some(at) => {
                        self.in_block_comment = false;
                        (at + end.len(), TokenKind::Comment)
                    }
                    None => (line.len(), TokenKind::Comment),
                };
            }
            if line.starts_with(start.as_str()) {
                let body = &line[start.len()..];
                return match body.find(end.as_str()) {
                    Some(at) => (start.len() + at + end.len(), TokenKind::Comment),
                    None => {
                        self.in_block_comment = true;
                        (line.len(), TokenKind::Comment)
                    }
                };
            }
        }

        for rule in &self.rules {
            if let Some(len) = rule.match_len(line) {
                let kind = if rule.kind == TokenKind::Identifier
                    && self.keywords.contains(&line[..len])
                {
                    TokenKind::Keyword
                } else {
                    rule.kind
                };
                return (len, kind);
            }
        }

        let first = line.chars().next().map_or(1, char::len_utf8);
        (first, TokenKind::Symbol)
    }
}

impl Lexer for RegexLexer {
    fn reset(&mut self, text: Vec<char>) {
        self.char_len = text.len();
        self.text = text.into_iter().collect();
        self.byte_pos = 0;
        self.char_pos = 0;
        self.in_block_comment = false;
    }

    fn next_token(&mut self) -> Result<Lexeme, LexError> {
        if self.byte_pos >= self.text.len() {
            return Ok(Lexeme::new(self.char_len, 0, TokenKind::EndOfFile));
        }

        let rest = &self.text[self.byte_pos..];
        if rest.starts_with('\n') {
            let lexeme = Lexeme::new(self.char_pos, 1, TokenKind::EndOfLine);
            self.byte_pos += 1;
            self.char_pos += 1;
            return Ok(lexeme);
        }

        let line_end = rest.find('\n').unwrap_or(rest.len());
        // Owned copy so `scan_line` can update the block-comment state.
        let line = rest[..line_end].to_string();
        let (byte_len, kind) = self.scan_line(&line);
        let char_len = line[..byte_len].chars().count();

        let lexeme = Lexeme::new(self.char_pos, char_len, kind);
        self.byte_pos += byte_len;
        self.char_pos += char_len;
        Ok(lexeme)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
