//! Lexer selection by file name.

use crate::config::LanguageConfig;
use crate::lexer::BoxedLexer;
use crate::plain::PlainTextLexer;
use crate::regex_lexer::RegexLexer;
use std::path::Path;

/// Known languages, looked up by file extension.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

impl LanguageRegistry {
    /// An empty registry; every file gets the plain-text lexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with Rust, C/C++, Python and JSON.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(LanguageConfig::rust());
        registry.register(LanguageConfig::c_family());
        registry.register(LanguageConfig::python());
        registry.register(LanguageConfig::json());
        registry
    }

    /// Add a language. Later registrations take precedence for shared extensions.
    pub fn register(&mut self, config: LanguageConfig) {
        self.languages.insert(0, config);
    }

    /// Registered languages, most recent first.
    pub fn languages(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Find the language for `path` by extension.
    pub fn config_for_path(&self, path: &Path) -> Option<&LanguageConfig> {
        let extension = path.extension()?.to_str()?;
        self.languages
            .iter()
            .find(|config| config.matches_extension(extension))
    }

    /// Build a lexer for `path`, falling back to [`PlainTextLexer`] for unknown files.
    pub fn lexer_for_path(&self, path: &Path) -> Result<BoxedLexer, regex::Error> {
        match self.config_for_path(path) {
            Some(config) => Ok(Box::new(RegexLexer::from_config(config)?)),
            None => Ok(Box::new(PlainTextLexer::new())),
        }
    }
}
