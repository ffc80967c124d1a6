//! File parser boundary.
//!
//! The engine only depends on [`FileParser`]; [`CParser`] is the built-in
//! best-effort declaration scanner used by the language server.

mod c_parser;

use std::{fmt, path::Path, path::PathBuf};

pub use c_parser::CParser;

use crate::symbols::ParsedFile;

/// Turns one file's contents into global records plus per-function locals.
///
/// Implementations must be deterministic for identical input.
pub trait FileParser: Send + Sync {
    fn parse(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<ParsedFile, ParseError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub path: PathBuf,
    pub message: String,
}

impl ParseError {
    pub fn new(
        path: &Path,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ParseError {}
