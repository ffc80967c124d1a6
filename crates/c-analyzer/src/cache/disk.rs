use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{cache::Fingerprint, error::IndexError, symbols::ParsedFile, vfs::FileId};

const CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CachedParse {
    schema_version: u32,
    source_file: String,
    fingerprint: Fingerprint,
    parsed: ParsedFile,
}

/// One JSON file per source file, named by a stable hash of its path.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry for `file` if present and written for `fingerprint`.
    /// Unreadable, corrupt or stale entries are misses.
    pub fn load(
        &self,
        file: &FileId,
        fingerprint: &Fingerprint,
    ) -> Option<ParsedFile> {
        let payload = match self.read_entry(file) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                debug!("[symbol-cache] {err}");
                return None;
            },
        };

        let valid = payload.schema_version == CACHE_SCHEMA_VERSION
            && payload.source_file == file.as_str()
            && payload.fingerprint == *fingerprint;
        if !valid {
            debug!("[symbol-cache] stale {}", file);
            return None;
        }

        debug!("[symbol-cache] disk hit {}", file);
        Some(payload.parsed)
    }

    fn read_entry(
        &self,
        file: &FileId,
    ) -> Result<Option<CachedParse>, IndexError> {
        let cache_file = self.entry_path(file);
        let Ok(content) = fs::read_to_string(&cache_file) else {
            return Ok(None);
        };
        serde_json::from_str::<CachedParse>(&content).map(Some).map_err(|err| IndexError::CacheCorrupt {
            path: cache_file,
            reason: err.to_string(),
        })
    }

    pub fn save(
        &self,
        file: &FileId,
        fingerprint: &Fingerprint,
        parsed: &ParsedFile,
    ) {
        if let Err(err) = fs::create_dir_all(&self.root) {
            debug!("[symbol-cache] cannot create {}: {err}", self.root.display());
            return;
        }

        let payload = CachedParse {
            schema_version: CACHE_SCHEMA_VERSION,
            source_file: file.as_str().to_owned(),
            fingerprint: fingerprint.clone(),
            parsed: parsed.clone(),
        };
        let Ok(json) = serde_json::to_string(&payload) else {
            return;
        };
        if let Err(err) = fs::write(self.entry_path(file), json) {
            debug!("[symbol-cache] cannot write entry for {}: {err}", file);
        }
    }

    pub fn remove(
        &self,
        file: &FileId,
    ) {
        if let Err(err) = fs::remove_file(self.entry_path(file))
            && err.kind() != std::io::ErrorKind::NotFound
        {
            debug!("[symbol-cache] cannot remove entry for {}: {err}", file);
        }
    }

    /// Delete every persisted entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, IndexError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(IndexError::io(&self.root, err)),
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).map_err(|err| IndexError::io(&path, err))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn entry_path(
        &self,
        file: &FileId,
    ) -> PathBuf {
        self.root.join(format!("{}.json", file.cache_key()))
    }
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".c-analyzer").join("symbol-cache");
    }
    std::env::temp_dir().join("c-analyzer-symbol-cache")
}
