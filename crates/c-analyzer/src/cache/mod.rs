//! Per-file parse cache.
//!
//! Entries are validated by content fingerprint, bounded by an LRU capacity
//! that never evicts files of the active load, and mirrored to disk so a
//! restart does not re-parse unchanged files.

mod disk;
mod fingerprint;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

pub use disk::{DiskCache, default_cache_dir};
pub use fingerprint::Fingerprint;
use lru::LruCache;
use tracing::debug;

use crate::{
    error::{ConfigError, IndexError},
    parser::FileParser,
    symbols::ParsedFile,
    vfs::FileId,
};

pub const DEFAULT_CACHE_SIZE: usize = 500;

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: Fingerprint,
    parsed: ParsedFile,
}

pub struct TokenCache {
    parser: Arc<dyn FileParser>,
    entries: LruCache<FileId, CacheEntry>,
    capacity: usize,
    active: HashSet<FileId>,
    disk: Option<DiskCache>,
}

impl TokenCache {
    /// Memory-only cache.
    pub fn new(
        parser: Arc<dyn FileParser>,
        capacity: usize,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidCacheSize(capacity));
        }
        Ok(Self {
            parser,
            entries: LruCache::unbounded(),
            capacity,
            active: HashSet::new(),
            disk: None,
        })
    }

    pub fn with_default_capacity(parser: Arc<dyn FileParser>) -> Self {
        Self {
            parser,
            entries: LruCache::unbounded(),
            capacity: DEFAULT_CACHE_SIZE,
            active: HashSet::new(),
            disk: None,
        }
    }

    pub fn with_disk_cache(
        mut self,
        disk: DiskCache,
    ) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn disk_cache(&self) -> Option<&DiskCache> {
        self.disk.as_ref()
    }

    pub fn set_disk_cache(
        &mut self,
        disk: Option<DiskCache>,
    ) {
        self.disk = disk;
    }

    pub fn set_cache_size(
        &mut self,
        size: usize,
    ) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidCacheSize(size));
        }
        self.capacity = size;
        self.enforce_capacity();
        Ok(())
    }

    /// Configured size, raised to the active file count while a load holds
    /// more files than that.
    pub fn capacity(&self) -> usize {
        self.capacity.max(self.active.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(
        &self,
        file: &Path,
    ) -> bool {
        self.entries.contains(&FileId::from_path(file))
    }

    /// Protect `files` from LRU eviction until the next call.
    pub fn set_active(
        &mut self,
        files: &[PathBuf],
    ) {
        self.active = files.iter().map(|file| FileId::from_path(file)).collect();
    }

    /// Whether every file has an in-memory entry matching its current content.
    pub fn files_valid(
        &self,
        files: &[PathBuf],
    ) -> bool {
        files.iter().all(|file| {
            let id = FileId::from_path(file);
            let Some(entry) = self.entries.peek(&id) else {
                return false;
            };
            match std::fs::read(file) {
                Ok(content) => entry.fingerprint == Fingerprint::of(&content),
                Err(_) => false,
            }
        })
    }

    /// Parse result for `file`: memory, then disk, then the parser.
    pub fn scan_file(
        &mut self,
        file: &Path,
    ) -> Result<ParsedFile, IndexError> {
        let id = FileId::from_path(file);
        let path = id.to_path_buf();
        let content = std::fs::read(&path).map_err(|err| IndexError::io(&path, err))?;
        let fingerprint = Fingerprint::of(&content);

        if let Some(entry) = self.entries.get(&id)
            && entry.fingerprint == fingerprint
        {
            debug!("[symbol-cache] memory hit {}", id);
            return Ok(entry.parsed.clone());
        }

        if let Some(parsed) = self.disk.as_ref().and_then(|disk| disk.load(&id, &fingerprint)) {
            self.insert(id, fingerprint, parsed.clone());
            return Ok(parsed);
        }

        debug!("[symbol-cache] miss {}", id);
        let source = String::from_utf8_lossy(&content);
        let parsed = self.parser.parse(&path, &source)?;
        if let Some(disk) = &self.disk {
            disk.save(&id, &fingerprint, &parsed);
        }
        self.insert(id, fingerprint, parsed.clone());
        Ok(parsed)
    }

    /// Evict every entry whose file is not in `active`, from memory and disk.
    pub fn clean_cache(
        &mut self,
        active: &[PathBuf],
    ) -> usize {
        let keep: HashSet<FileId> = active.iter().map(|file| FileId::from_path(file)).collect();
        let stale: Vec<FileId> = self.entries.iter().map(|(id, _)| id).filter(|id| !keep.contains(*id)).cloned().collect();
        for id in &stale {
            self.entries.pop(id);
            if let Some(disk) = &self.disk {
                disk.remove(id);
            }
        }
        if !stale.is_empty() {
            debug!("[symbol-cache] cleaned {} entries", stale.len());
        }
        stale.len()
    }

    pub fn clear_cache(&mut self) {
        self.entries.clear();
    }

    pub fn clear_disk_cache(&self) -> Result<usize, IndexError> {
        match &self.disk {
            Some(disk) => disk.clear(),
            None => Ok(0),
        }
    }

    fn insert(
        &mut self,
        id: FileId,
        fingerprint: Fingerprint,
        parsed: ParsedFile,
    ) {
        self.entries.put(
            id,
            CacheEntry {
                fingerprint,
                parsed,
            },
        );
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        let capacity = self.capacity();
        while self.entries.len() > capacity {
            // `iter().rev()` walks least-recently-used first.
            let victim = self.entries.iter().rev().map(|(id, _)| id).find(|id| !self.active.contains(*id)).cloned();
            let Some(victim) = victim else {
                break;
            };
            debug!("[symbol-cache] evict {}", victim);
            self.entries.pop(&victim);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/cache/cache_tests.rs"]
mod tests;
