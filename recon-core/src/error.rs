//! Error types for the recovery pipeline.
//!
//! Only discovery and parsing can fail. Everything downstream of a built graph
//! (metrics, pruning, collapsing) is total and absorbs gaps as zero defaults.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ReconError>;

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum ReconError {
    /// The discovery root does not exist.
    #[error("Path does not exist: {}", path.display())]
    RootNotFound { path: PathBuf },

    /// A directory under the root could not be traversed.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// A source file could not be read as UTF-8 text.
    #[error("Failed to read file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// A source file is not valid Python.
    #[error("Syntax error in {} at line {line}, column {column}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The tree-sitter grammar could not be loaded.
    #[error("Failed to load Python grammar: {0}")]
    Language(String),

    /// A noise pattern is not a valid regular expression.
    #[error("Invalid noise pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl ReconError {
    /// Create a Read error from a path and io::Error.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReconError::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a Syntax error.
    pub fn syntax(
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        ReconError::Syntax {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_names_file_and_position() {
        let err = ReconError::syntax("pkg/a.py", 3, 7, "unexpected token");
        assert_eq!(
            err.to_string(),
            "Syntax error in pkg/a.py at line 3, column 7: unexpected token"
        );
    }

    #[test]
    fn test_root_not_found_message() {
        let err = ReconError::RootNotFound {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.to_string(), "Path does not exist: /nope");
    }

    #[test]
    fn test_read_error_message() {
        let err = ReconError::read(
            "pkg/b.py",
            io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        );
        assert!(err.to_string().starts_with("Failed to read file pkg/b.py"));
    }
}
