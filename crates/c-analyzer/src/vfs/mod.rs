use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable identity of a source file: its normalized absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    pub fn from_path(path: &Path) -> Self {
        Self(normalized_path(path).display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Filesystem-safe key derived from the path, used for cache file names.
    pub fn cache_key(&self) -> String {
        stable_hash_hex(self.as_str())
    }
}

impl std::fmt::Display for FileId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn normalized_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// FNV-1a, stable across runs and platforms.
pub fn stable_hash_hex(input: &str) -> String {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{hash:016x}")
}
