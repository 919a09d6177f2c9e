use std::io;
use std::path::PathBuf;
use text_engine_lang::LexError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors surfaced by buffer persistence, indexing and configuration.
pub enum BufferError {
    #[error("I/O error on {}: {source}", .path.display())]
    /// Reading or writing the backing file failed.
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    #[error("buffer has no file name")]
    /// Save was requested for a buffer never associated with a file.
    NoFileName,

    #[error("{} is not valid UTF-8", .path.display())]
    /// The file content could not be decoded.
    Encoding {
        /// The file involved.
        path: PathBuf,
    },

    #[error("lexing failed: {0}")]
    /// The lexer failed; the previous index stays in place.
    Lex(#[from] LexError),

    #[error("invalid configuration: {0}")]
    /// A configuration value was rejected.
    Config(String),
}

impl BufferError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BufferError::Io {
            path: path.into(),
            source,
        }
    }

    /// OS error code for I/O failures, if the platform reported one.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            BufferError::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// Short text suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            BufferError::Io { path, source } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                match source.kind() {
                    io::ErrorKind::NotFound => format!("{name}: file not found"),
                    io::ErrorKind::PermissionDenied => format!("{name}: permission denied"),
                    _ => format!("{name}: {source}"),
                }
            }
            other => other.to_string(),
        }
    }
}

/// Result alias defaulting to [`BufferError`].
pub type Result<T, E = BufferError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_missing_file() {
        let err = BufferError::io(
            "/tmp/dir/missing.rs",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert_eq!(err.user_message(), "missing.rs: file not found");
    }

    #[test]
    fn test_os_error_code_passthrough() {
        let err = BufferError::io("x", io::Error::from_raw_os_error(13));
        assert_eq!(err.os_error_code(), Some(13));
        assert_eq!(BufferError::NoFileName.os_error_code(), None);
    }

    #[test]
    fn test_lex_error_converts() {
        let err: BufferError = LexError::Stalled { index: 4 }.into();
        assert_eq!(err.to_string(), "lexing failed: lexer stalled at offset 4");
    }
}
