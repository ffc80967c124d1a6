use std::{
    fmt::{Display, Formatter},
    io,
    path::PathBuf,
};

use crate::parser::ParseError;

/// Failure to produce a file's parse result.
#[derive(Debug)]
pub enum IndexError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse(ParseError),
    CacheCorrupt {
        path: PathBuf,
        reason: String,
    },
}

impl IndexError {
    pub fn io(
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for IndexError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Io {
                path,
                source,
            } => {
                write!(f, "cannot read {}: {source}", path.display())
            },
            Self::Parse(err) => write!(f, "{err}"),
            Self::CacheCorrupt {
                path,
                reason,
            } => {
                write!(f, "corrupt cache entry {}: {reason}", path.display())
            },
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io {
                source,
                ..
            } => Some(source),
            Self::Parse(err) => Some(err),
            Self::CacheCorrupt {
                ..
            } => None,
        }
    }
}

impl From<ParseError> for IndexError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

/// Misuse of a configuration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidCacheSize(usize),
    InvalidCacheDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::InvalidCacheSize(size) => write!(f, "cache size must be at least 1, got {size}"),
            Self::InvalidCacheDir(path) => write!(f, "cache directory {} is not usable", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {}
