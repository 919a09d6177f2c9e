//! Semantic token annotations delivered asynchronously by an external analyzer.
//!
//! Analyzers (typically a language server running on another thread) describe tokens as a flat
//! array of 5-tuples `(delta_line, delta_start, length, token_type, modifiers)`, relative to the
//! previous tuple. Columns and lengths are in characters, matching the token index.
//!
//! Results refer to the text as it was when they were requested. They are matched structurally
//! against the *current* token table: the first tuple that does not line up with a token of
//! exactly the same column and length stops the walk. That is the expected outcome of a race
//! with an edit, so it is logged and reported, never treated as an error.

use crate::line_index::{LineTable, SemanticAnnotation, SharedLineTable};

/// Token type names, indexed by the `token_type` field of the tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticLegend {
    /// Token type names.
    pub token_types: Vec<String>,
    /// Token modifier names, indexed by bit position.
    pub token_modifiers: Vec<String>,
}

impl SemanticLegend {
    /// Create a legend.
    pub fn new(token_types: Vec<String>, token_modifiers: Vec<String>) -> Self {
        Self {
            token_types,
            token_modifiers,
        }
    }

    /// Name of a token type.
    pub fn type_name(&self, annotation: &SemanticAnnotation) -> Option<&str> {
        self.token_types
            .get(annotation.token_type as usize)
            .map(String::as_str)
    }

    /// Names of the modifier bits set on `annotation`.
    pub fn modifier_names(&self, annotation: &SemanticAnnotation) -> Vec<&str> {
        self.token_modifiers
            .iter()
            .enumerate()
            .filter(|(bit, _)| *bit < 32 && annotation.modifiers & (1 << bit) != 0)
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

/// Why matching stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAbort {
    /// The array length is not a multiple of 5.
    MalformedData(usize),
    /// A tuple points past the last line.
    LineOutOfRange {
        /// Line the tuple resolved to.
        line: usize,
    },
    /// No token on the line has the tuple's exact column and length.
    NoMatchingToken {
        /// Line the tuple resolved to.
        line: usize,
        /// Column the tuple resolved to.
        column: usize,
        /// Length carried by the tuple.
        length: usize,
    },
}

/// Outcome of [`LineTable::apply_semantic_tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchReport {
    /// Tuples attached to tokens.
    pub matched: usize,
    /// Set when the walk stopped before the end of the data.
    pub aborted: Option<MatchAbort>,
}

impl MatchReport {
    /// Returns `true` if every tuple was attached.
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

impl LineTable {
    /// Attach decoded annotations to the tokens they describe.
    ///
    /// Walks the table in lockstep with the tuples. Tokens before the first mismatch keep their
    /// new annotation; the rest of the data is dropped.
    pub fn apply_semantic_tokens(&mut self, data: &[u32]) -> MatchReport {
        let mut report = MatchReport::default();
        if !data.len().is_multiple_of(5) {
            report.aborted = Some(MatchAbort::MalformedData(data.len()));
            tracing::warn!(len = data.len(), "semantic token data is not a multiple of 5");
            return report;
        }

        let version = self.version();
        let lines = self.lines_mut();
        let mut line = 0usize;
        let mut column = 0usize;
        // Next token to inspect on the current line; tuples arrive in increasing order.
        let mut cursor = 0usize;

        for chunk in data.chunks_exact(5) {
            let (delta_line, delta_start, length) =
                (chunk[0] as usize, chunk[1] as usize, chunk[2] as usize);
            if delta_line > 0 {
                line += delta_line;
                column = delta_start;
                cursor = 0;
            } else {
                column += delta_start;
            }

            let Some(tokens) = lines.get_mut(line).map(|l| l.tokens_mut()) else {
                report.aborted = Some(MatchAbort::LineOutOfRange { line });
                break;
            };

            while cursor < tokens.len() && tokens[cursor].column < column {
                cursor += 1;
            }
            match tokens.get_mut(cursor) {
                Some(token)
                    if token.column == column
                        && token.length == length
                        && !token.kind.is_terminator() =>
                {
                    token.semantic = Some(SemanticAnnotation {
                        token_type: chunk[3],
                        modifiers: chunk[4],
                    });
                    report.matched += 1;
                }
                _ => {
                    report.aborted = Some(MatchAbort::NoMatchingToken {
                        line,
                        column,
                        length,
                    });
                    break;
                }
            }
        }

        if let Some(abort) = report.aborted {
            tracing::warn!(
                version,
                matched = report.matched,
                ?abort,
                "semantic tokens out of sync with token index; skipping the rest"
            );
        }
        report
    }

    /// Remove every semantic annotation.
    pub fn clear_semantic_tokens(&mut self) {
        for line in self.lines_mut() {
            for token in line.tokens_mut() {
                token.semantic = None;
            }
        }
    }
}

impl SharedLineTable {
    /// Lock the table and apply `data`. Safe to call from the analyzer's thread.
    pub fn apply_semantic_tokens(&self, data: &[u32]) -> MatchReport {
        self.lock().apply_semantic_tokens(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_engine_lang::{LanguageConfig, RegexLexer};

    fn rust_table(text: &str) -> LineTable {
        let mut lexer = RegexLexer::from_config(&LanguageConfig::rust()).unwrap();
        LineTable::build(&mut lexer, text.chars().collect(), 3).unwrap()
    }

    fn semantic_at(table: &LineTable, line: usize, column: usize) -> Option<SemanticAnnotation> {
        table
            .line(line)
            .unwrap()
            .tokens()
            .iter()
            .find(|t| t.column == column)
            .and_then(|t| t.semantic)
    }

    #[test]
    fn test_delta_decoding_attaches_types() {
        let mut table = rust_table("fn main() {\n    let x = 1;\n}");
        // `main` (0,3,4), `x` (1,8,1) relative to `main`, `1` (1,12,1) relative to `x`.
        let data = [0, 3, 4, 1, 0, 1, 8, 1, 2, 1, 0, 4, 1, 3, 0];
        let report = table.apply_semantic_tokens(&data);
        assert_eq!(report.matched, 3);
        assert!(report.is_complete());
        assert_eq!(
            semantic_at(&table, 0, 3),
            Some(SemanticAnnotation {
                token_type: 1,
                modifiers: 0
            })
        );
        assert_eq!(semantic_at(&table, 1, 8).unwrap().modifiers, 1);
        assert_eq!(semantic_at(&table, 1, 12).unwrap().token_type, 3);
        assert_eq!(semantic_at(&table, 0, 0), None);
    }

    #[test]
    fn test_mismatch_stops_walk_but_keeps_earlier_matches() {
        let mut table = rust_table("fn main() {}");
        // Second tuple claims a 3-char token at column 5 where `(` lives.
        let data = [0, 3, 4, 0, 0, 0, 2, 3, 0, 0, 0, 2, 1, 0, 0];
        let report = table.apply_semantic_tokens(&data);
        assert_eq!(report.matched, 1);
        assert_eq!(
            report.aborted,
            Some(MatchAbort::NoMatchingToken {
                line: 0,
                column: 5,
                length: 3
            })
        );
        assert!(semantic_at(&table, 0, 3).is_some());
    }

    #[test]
    fn test_line_out_of_range_aborts() {
        let mut table = rust_table("x");
        let report = table.apply_semantic_tokens(&[4, 0, 1, 0, 0]);
        assert_eq!(
            report.aborted,
            Some(MatchAbort::LineOutOfRange { line: 4 })
        );
        assert_eq!(report.matched, 0);
    }

    #[test]
    fn test_malformed_length_aborts_without_changes() {
        let mut table = rust_table("x");
        let report = table.apply_semantic_tokens(&[0, 0, 1, 0]);
        assert_eq!(report.aborted, Some(MatchAbort::MalformedData(4)));
        assert_eq!(semantic_at(&table, 0, 0), None);
    }

    #[test]
    fn test_clear_semantic_tokens() {
        let mut table = rust_table("main");
        table.apply_semantic_tokens(&[0, 0, 4, 2, 0]);
        assert!(semantic_at(&table, 0, 0).is_some());
        table.clear_semantic_tokens();
        assert!(semantic_at(&table, 0, 0).is_none());
    }

    #[test]
    fn test_legend_names() {
        let legend = SemanticLegend::new(
            vec!["namespace".into(), "function".into()],
            vec!["declaration".into(), "static".into()],
        );
        let annotation = SemanticAnnotation {
            token_type: 1,
            modifiers: 0b11,
        };
        assert_eq!(legend.type_name(&annotation), Some("function"));
        assert_eq!(
            legend.modifier_names(&annotation),
            vec!["declaration", "static"]
        );
    }
}
