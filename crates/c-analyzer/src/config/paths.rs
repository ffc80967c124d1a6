use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
};

use serde::Deserialize;
use serde_json::Value;

/// Include search paths. Quoted includes try `base_paths` after the
/// includer's directory; angle includes try `system_paths` first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSettings {
    pub base_paths: Vec<PathBuf>,
    pub system_paths: Vec<PathBuf>,
}

impl PathSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: PathSettingsPatch,
    ) {
        if let Some(v) = patch.base_paths {
            self.base_paths = v.into_iter().map(PathBuf::from).collect();
        }
        if let Some(v) = patch.system_paths {
            self.system_paths = v.into_iter().map(PathBuf::from).collect();
        }
    }

    pub(crate) fn normalize(&mut self) {
        dedup_paths(&mut self.base_paths);
        dedup_paths(&mut self.system_paths);
    }

    /// Append paths not already listed, keeping order.
    pub fn extend(
        &mut self,
        base_paths: impl IntoIterator<Item = PathBuf>,
        system_paths: impl IntoIterator<Item = PathBuf>,
    ) {
        self.base_paths.extend(base_paths);
        self.system_paths.extend(system_paths);
        self.normalize();
    }
}

fn dedup_paths(paths: &mut Vec<PathBuf>) {
    let mut seen = HashSet::new();
    paths.retain(|path| !path.as_os_str().is_empty() && seen.insert(path.clone()));
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PathSettingsPatch {
    pub(crate) base_paths: Option<Vec<String>>,
    pub(crate) system_paths: Option<Vec<String>>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
