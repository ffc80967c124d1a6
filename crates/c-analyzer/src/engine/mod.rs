//! Load pipeline and queries over the published symbol store.
//!
//! A load scans the include closure of a root file, parses every file through
//! the [`TokenCache`], merges the results into a fresh [`SymbolStore`] and
//! swaps it in. Queries clone the current `Arc<SymbolStore>` and never observe
//! a half-built store.

pub mod chain;
mod resolve;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

pub use chain::extract_access_chain;
pub use resolve::Resolver;
use tracing::{debug, info, warn};

use crate::{
    cache::{DiskCache, TokenCache},
    error::{ConfigError, IndexError},
    include::IncludeScanner,
    parser::FileParser,
    symbols::{SymbolRecord, SymbolStore},
    vfs::normalized_path,
};

/// What to index: a root file, its search paths, and extra roots (e.g. the
/// matching header of a source file).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadRequest {
    pub root: PathBuf,
    pub base_paths: Vec<PathBuf>,
    pub sys_paths: Vec<PathBuf>,
    pub extra_files: Vec<PathBuf>,
}

impl LoadRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Include closure of the root followed by that of each extra file,
    /// deduplicated in discovery order.
    pub fn files(&self) -> Vec<PathBuf> {
        let scanner = IncludeScanner::new(self.base_paths.clone(), self.sys_paths.clone());
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();
        for root in std::iter::once(&self.root).chain(&self.extra_files) {
            for file in scanner.scan_recursive(root) {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        }
        files
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub root: PathBuf,
    pub files: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub symbols: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Scanned {
        files: usize,
    },
    Parsed {
        index: usize,
        total: usize,
        file: PathBuf,
    },
    Skipped {
        index: usize,
        total: usize,
        file: PathBuf,
        reason: String,
    },
    Finished(LoadSummary),
    /// A newer load started; this one stopped without publishing.
    Superseded,
}

pub struct Engine {
    cache: Mutex<TokenCache>,
    store: RwLock<Arc<SymbolStore>>,
    generation: AtomicU64,
    current: RwLock<Option<LoadRequest>>,
}

impl Engine {
    pub fn new(
        parser: Arc<dyn FileParser>,
        cache_size: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self::with_cache(TokenCache::new(parser, cache_size)?))
    }

    /// Engine over `parser` with the default cache size and no disk cache.
    pub fn with_parser(parser: Arc<dyn FileParser>) -> Self {
        Self::with_cache(TokenCache::with_default_capacity(parser))
    }

    pub fn with_cache(cache: TokenCache) -> Self {
        Self {
            cache: Mutex::new(cache),
            store: RwLock::new(Arc::new(SymbolStore::new())),
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    fn cache(&self) -> MutexGuard<'_, TokenCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The published store.
    pub fn store(&self) -> Arc<SymbolStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn current_request(&self) -> Option<LoadRequest> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn current_root(&self) -> Option<PathBuf> {
        self.current_request().map(|request| request.root)
    }

    /// Whether the published store was built for `request` and every file in
    /// its closure is unchanged since.
    pub fn is_valid(
        &self,
        request: &LoadRequest,
    ) -> bool {
        let Some(current) = self.current_request() else {
            return false;
        };
        if normalized_path(&current.root) != normalized_path(&request.root) {
            return false;
        }
        let files = request.files();
        let store = self.store();
        if files.len() != store.files().len() || !files.iter().all(|file| store.contains_file(file)) {
            return false;
        }
        self.cache().files_valid(&files)
    }

    /// Begin a load. Any older session stops at its next step.
    pub fn start_load(
        &self,
        request: LoadRequest,
    ) -> LoadSession<'_> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadSession {
            engine: self,
            request,
            generation,
            stage: Stage::Scan,
            started: Instant::now(),
        }
    }

    /// Drive a load to completion, reporting `(done, total)` after each file.
    /// Returns `None` when superseded.
    pub fn load(
        &self,
        request: &LoadRequest,
        mut progress: impl FnMut(usize, usize),
    ) -> Option<LoadSummary> {
        for event in self.start_load(request.clone()) {
            match event {
                LoadEvent::Parsed {
                    index,
                    total,
                    ..
                }
                | LoadEvent::Skipped {
                    index,
                    total,
                    ..
                } => progress(index, total),
                LoadEvent::Finished(summary) => return Some(summary),
                LoadEvent::Superseded => return None,
                LoadEvent::Scanned {
                    ..
                } => {},
            }
        }
        None
    }

    fn is_current(
        &self,
        generation: u64,
    ) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Swap in `store` unless a newer load started. The generation is checked
    /// under the store lock so a stale session cannot overwrite a newer one.
    fn publish(
        &self,
        generation: u64,
        request: LoadRequest,
        store: SymbolStore,
    ) -> bool {
        let mut published = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(generation) {
            return false;
        }
        *published = Arc::new(store);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(request);
        true
    }

    pub fn search_tokens(
        &self,
        prefix: &str,
    ) -> Vec<SymbolRecord> {
        self.store().search_tokens(prefix).into_iter().cloned().collect()
    }

    pub fn resolve_members(
        &self,
        file: &Path,
        function: Option<&str>,
        expression: &str,
        full_chain: bool,
    ) -> Vec<SymbolRecord> {
        let store = self.store();
        let file = normalized_path(file);
        Resolver::new(&store, &file, function).resolve_members(expression, full_chain).into_iter().cloned().collect()
    }

    pub fn complete(
        &self,
        file: &Path,
        function: Option<&str>,
        prefix: &str,
    ) -> Vec<SymbolRecord> {
        let store = self.store();
        let file = normalized_path(file);
        Resolver::new(&store, &file, function).complete(prefix).into_iter().cloned().collect()
    }

    pub fn symbol_at(
        &self,
        file: &Path,
        function: Option<&str>,
        line_prefix: &str,
        word: &str,
    ) -> Option<SymbolRecord> {
        let store = self.store();
        let file = normalized_path(file);
        Resolver::new(&store, &file, function).symbol_at(line_prefix, word).cloned()
    }

    /// Innermost function whose body contains `line` (1-based).
    pub fn function_at(
        &self,
        file: &Path,
        line: u32,
    ) -> Option<String> {
        self.store().function_at(&normalized_path(file), line).map(str::to_owned)
    }

    /// Parameters then locals of `function` in `file`.
    pub fn locals(
        &self,
        file: &Path,
        function: &str,
    ) -> Vec<SymbolRecord> {
        self.store().locals(&normalized_path(file), function).to_vec()
    }

    /// Locals of `function` followed by the globals defined in `file`.
    pub fn symbols_for(
        &self,
        file: &Path,
        function: Option<&str>,
    ) -> Vec<SymbolRecord> {
        let store = self.store();
        let file = normalized_path(file);
        let mut out: Vec<SymbolRecord> =
            function.map(|function| store.locals(&file, function).to_vec()).unwrap_or_default();
        out.extend(store.records_in(&file).into_iter().cloned());
        out
    }

    pub fn set_cache_size(
        &self,
        size: usize,
    ) -> Result<(), ConfigError> {
        self.cache().set_cache_size(size)
    }

    /// Point disk persistence at `dir`, or turn it off.
    pub fn set_cache_dir(
        &self,
        dir: Option<PathBuf>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = &dir
            && dir.exists()
            && !dir.is_dir()
        {
            return Err(ConfigError::InvalidCacheDir(dir.clone()));
        }
        self.cache().set_disk_cache(dir.map(DiskCache::new));
        Ok(())
    }

    pub fn clear_cache(&self) {
        self.cache().clear_cache();
        debug!("[engine] memory cache cleared");
    }

    pub fn clear_disk_cache(&self) -> Result<usize, IndexError> {
        let removed = self.cache().clear_disk_cache()?;
        debug!("[engine] removed {removed} disk cache entries");
        Ok(removed)
    }
}

enum Stage {
    Scan,
    Parse {
        files: Vec<PathBuf>,
        next: usize,
        store: SymbolStore,
        parsed: usize,
        skipped: usize,
    },
    Done,
}

/// One load, consumed as a finite stream of [`LoadEvent`]s.
///
/// Dropping the session abandons the load; entries it already committed to
/// the cache stay valid.
pub struct LoadSession<'a> {
    engine: &'a Engine,
    request: LoadRequest,
    generation: u64,
    stage: Stage,
    started: Instant,
}

impl LoadSession<'_> {
    pub fn request(&self) -> &LoadRequest {
        &self.request
    }

    fn scan(&mut self) -> LoadEvent {
        let files = self.request.files();
        debug!("[engine] {} files reachable from {}", files.len(), self.request.root.display());
        self.engine.cache().set_active(&files);
        let count = files.len();
        self.stage = Stage::Parse {
            files,
            next: 0,
            store: SymbolStore::new(),
            parsed: 0,
            skipped: 0,
        };
        LoadEvent::Scanned {
            files: count,
        }
    }

    fn finish(
        &mut self,
        files: Vec<PathBuf>,
        mut store: SymbolStore,
        parsed: usize,
        skipped: usize,
    ) -> LoadEvent {
        store.finish();
        let engine = self.engine;
        let evicted = {
            let mut cache = engine.cache();
            // A newer load may have marked its own files active meanwhile.
            if !engine.is_current(self.generation) {
                return self.superseded();
            }
            cache.clean_cache(&files)
        };
        let summary = LoadSummary {
            root: self.request.root.clone(),
            files: files.len(),
            parsed,
            skipped,
            symbols: store.len(),
            elapsed: self.started.elapsed(),
        };
        if !self.engine.publish(self.generation, self.request.clone(), store) {
            return self.superseded();
        }
        info!(
            "[engine] loaded {} ({} files, {} skipped, {} symbols, {} evicted) in {:?}",
            summary.root.display(),
            summary.files,
            summary.skipped,
            summary.symbols,
            evicted,
            summary.elapsed
        );
        LoadEvent::Finished(summary)
    }

    fn superseded(&mut self) -> LoadEvent {
        debug!("[engine] load of {} superseded", self.request.root.display());
        self.stage = Stage::Done;
        LoadEvent::Superseded
    }
}

impl Iterator for LoadSession<'_> {
    type Item = LoadEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.stage, Stage::Done) {
            return None;
        }
        if !self.engine.is_current(self.generation) {
            return Some(self.superseded());
        }

        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::Scan => Some(self.scan()),
            Stage::Parse {
                files,
                next,
                mut store,
                mut parsed,
                mut skipped,
            } => {
                let total = files.len();
                let Some(file) = files.get(next).cloned() else {
                    return Some(self.finish(files, store, parsed, skipped));
                };

                let result = self.engine.cache().scan_file(&file);
                let event = match result {
                    Ok(parsed_file) => {
                        store.add_file(&file, &parsed_file.records, parsed_file.locals);
                        store.add_records(parsed_file.records);
                        parsed += 1;
                        LoadEvent::Parsed {
                            index: next + 1,
                            total,
                            file,
                        }
                    },
                    Err(err) => {
                        warn!("[engine] skipping {}: {err}", file.display());
                        skipped += 1;
                        LoadEvent::Skipped {
                            index: next + 1,
                            total,
                            file,
                            reason: err.to_string(),
                        }
                    },
                };
                self.stage = Stage::Parse {
                    files,
                    next: next + 1,
                    store,
                    parsed,
                    skipped,
                };
                Some(event)
            },
            Stage::Done => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/engine/engine_tests.rs"]
mod tests;
