use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;

use crate::cache::DEFAULT_CACHE_SIZE;

pub const MIN_CACHE_SIZE: usize = 1;
pub const MAX_CACHE_SIZE: usize = 100_000;
pub const DEFAULT_EXTENSIONS: &[&str] = &["c", "cpp", "cxx", "cc", "h", "hpp", "hxx"];

#[derive(Debug, Clone, PartialEq)]
pub struct IndexingSettings {
    pub cache_size: usize,
    pub extensions: Vec<String>,
    pub load_matching: bool,
    pub cache_directory: Option<PathBuf>,
}

impl Default for IndexingSettings {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            load_matching: true,
            cache_directory: None,
        }
    }
}

impl IndexingSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: IndexingSettingsPatch,
    ) {
        if let Some(v) = patch.cache_size {
            self.cache_size = v;
        }
        if let Some(v) = patch.extensions {
            self.extensions = v;
        }
        if let Some(v) = patch.load_matching {
            self.load_matching = v;
        }
        if let Some(v) = patch.cache_directory {
            let trimmed = v.trim();
            self.cache_directory = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.cache_size = self.cache_size.clamp(MIN_CACHE_SIZE, MAX_CACHE_SIZE);
        let mut seen = HashSet::new();
        self.extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .filter(|ext| seen.insert(ext.clone()))
            .collect();
    }

    /// Whether `path` has one of the indexed extensions.
    pub fn is_indexed(
        &self,
        path: &Path,
    ) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct IndexingSettingsPatch {
    pub(crate) cache_size: Option<usize>,
    pub(crate) extensions: Option<Vec<String>>,
    pub(crate) load_matching: Option<bool>,
    pub(crate) cache_directory: Option<String>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
