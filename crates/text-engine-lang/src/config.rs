//! Data-driven language descriptions.
//!
//! A [`LanguageConfig`] carries everything the built-in [`RegexLexer`](crate::RegexLexer) needs
//! to tokenize a language: comment tokens, string delimiters and a keyword table.

/// Comment tokens for a given language.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Line comments only.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns the line comment token if one is configured and non-empty.
    pub fn line_token(&self) -> Option<&str> {
        self.line.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns `(start, end)` if both block comment tokens are configured and non-empty.
    pub fn block_tokens(&self) -> Option<(&str, &str)> {
        let start = self.block_start.as_deref().filter(|s| !s.is_empty())?;
        let end = self.block_end.as_deref().filter(|s| !s.is_empty())?;
        Some((start, end))
    }
}

/// Description of one language: how to recognise its files and how to tokenize them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguageConfig {
    /// Display name (e.g. `"rust"`).
    pub name: String,
    /// File extensions without the leading dot, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Comment tokens.
    pub comments: CommentConfig,
    /// Characters that open and close a single-line string literal.
    pub string_delimiters: Vec<char>,
    /// Reserved words, reported as [`TokenKind::Keyword`](crate::TokenKind::Keyword).
    pub keywords: Vec<String>,
}

impl LanguageConfig {
    /// Create a config with a name and no other settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the recognised file extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the comment tokens.
    pub fn with_comments(mut self, comments: CommentConfig) -> Self {
        self.comments = comments;
        self
    }

    /// Set the string delimiters.
    pub fn with_string_delimiters(mut self, delimiters: &[char]) -> Self {
        self.string_delimiters = delimiters.to_vec();
        self
    }

    /// Set the keyword table.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if `extension` (without dot) belongs to this language.
    pub fn matches_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Rust.
    pub fn rust() -> Self {
        Self::new("rust")
            .with_extensions(["rs"])
            .with_comments(CommentConfig::line_and_block("//", "/*", "*/"))
            .with_string_delimiters(&['"'])
            .with_keywords([
                "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
                "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop",
                "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static",
                "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
            ])
    }

    /// C and C++.
    pub fn c_family() -> Self {
        Self::new("c")
            .with_extensions(["c", "h", "cc", "cpp", "cxx", "hpp", "hh"])
            .with_comments(CommentConfig::line_and_block("//", "/*", "*/"))
            .with_string_delimiters(&['"', '\''])
            .with_keywords([
                "auto", "bool", "break", "case", "char", "class", "const", "continue", "default",
                "delete", "do", "double", "else", "enum", "extern", "false", "float", "for",
                "if", "inline", "int", "long", "namespace", "new", "nullptr", "private",
                "protected", "public", "return", "short", "signed", "sizeof", "static",
                "struct", "switch", "template", "this", "true", "typedef", "union", "unsigned",
                "using", "virtual", "void", "volatile", "while",
            ])
    }

    /// Python.
    pub fn python() -> Self {
        Self::new("python")
            .with_extensions(["py", "pyi"])
            .with_comments(CommentConfig::line("#"))
            .with_string_delimiters(&['"', '\''])
            .with_keywords([
                "False", "None", "True", "and", "as", "assert", "async", "await", "break",
                "class", "continue", "def", "del", "elif", "else", "except", "finally", "for",
                "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or",
                "pass", "raise", "return", "try", "while", "with", "yield",
            ])
    }

    /// JSON.
    pub fn json() -> Self {
        Self::new("json")
            .with_extensions(["json"])
            .with_string_delimiters(&['"'])
            .with_keywords(["true", "false", "null"])
    }
}
