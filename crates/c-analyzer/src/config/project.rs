//! `c-analyzer.toml` project files.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

pub const PROJECT_FILENAME: &str = "c-analyzer.toml";

/// Search paths declared next to the sources, relative to the project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectFile {
    pub base_paths: Vec<PathBuf>,
    pub system_paths: Vec<PathBuf>,
}

impl ProjectFile {
    /// Nearest project file above `start`, with its paths made absolute.
    pub fn discover(start: &Path) -> Option<Self> {
        let path = find_project_file(start)?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let project: ProjectFile = match toml::from_str(&content) {
            Ok(project) => project,
            Err(err) => {
                debug!("[config] ignoring {}: {err}", path.display());
                return None;
            },
        };
        let root = path.parent()?;
        Some(project.anchored_at(root))
    }

    fn anchored_at(
        self,
        root: &Path,
    ) -> Self {
        let anchor = |paths: Vec<PathBuf>| -> Vec<PathBuf> {
            paths
                .into_iter()
                .map(|path| if path.is_absolute() { path } else { root.join(path) })
                .collect()
        };
        Self {
            base_paths: anchor(self.base_paths),
            system_paths: anchor(self.system_paths),
        }
    }
}

/// Walks parent directories from `start` looking for `c-analyzer.toml`.
pub fn find_project_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(PROJECT_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}
