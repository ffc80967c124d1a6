//! Include-closure discovery.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::vfs::normalized_path;

static INCLUDE_DIRECTIVE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"^\s*#\s*include\s*([<"])([^>"]+)[>"]"#).ok());

/// One `#include` line: the spelled path and whether it used `<...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub path: String,
    pub is_system: bool,
}

/// Resolves `#include` directives against the includer's directory and
/// configured search paths.
#[derive(Debug, Clone, Default)]
pub struct IncludeScanner {
    base_paths: Vec<PathBuf>,
    sys_paths: Vec<PathBuf>,
}

impl IncludeScanner {
    pub fn new(
        base_paths: Vec<PathBuf>,
        sys_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            base_paths,
            sys_paths,
        }
    }

    /// Every file reachable from `root` through includes, root first, in
    /// depth-first discovery order. Each file appears once.
    pub fn scan_recursive(
        &self,
        root: &Path,
    ) -> Vec<PathBuf> {
        if !root.is_file() {
            debug!("[include] root {} does not exist", root.display());
            return Vec::new();
        }

        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut ordered = Vec::new();
        let mut stack = vec![normalized_path(root)];

        while let Some(file) = stack.pop() {
            if !visited.insert(file.clone()) {
                continue;
            }
            ordered.push(file.clone());

            let source = match std::fs::read_to_string(&file) {
                Ok(source) => source,
                Err(err) => {
                    debug!("[include] cannot read {}: {err}", file.display());
                    continue;
                },
            };

            let children: Vec<PathBuf> = parse_include_directives(&source)
                .into_iter()
                .filter_map(|directive| {
                    let resolved = self.resolve(&file, &directive);
                    if resolved.is_none() {
                        debug!("[include] unresolved {} from {}", directive.path, file.display());
                    }
                    resolved
                })
                .filter(|path| !visited.contains(path))
                .collect();
            // Reverse so the first include is explored first.
            stack.extend(children.into_iter().rev());
        }

        ordered
    }

    /// Resolve one directive relative to `owner`.
    pub fn resolve(
        &self,
        owner: &Path,
        directive: &IncludeDirective,
    ) -> Option<PathBuf> {
        let include = Path::new(&directive.path);
        if include.is_absolute() {
            return include.is_file().then(|| normalized_path(include));
        }

        let owner_dir = if directive.is_system {
            None
        } else {
            owner.parent()
        };
        let search_dirs: Vec<&Path> = if directive.is_system {
            self.sys_paths.iter().chain(&self.base_paths).map(PathBuf::as_path).collect()
        } else {
            owner_dir
                .into_iter()
                .chain(self.base_paths.iter().map(PathBuf::as_path))
                .chain(self.sys_paths.iter().map(PathBuf::as_path))
                .collect()
        };

        search_dirs
            .into_iter()
            .map(|dir| dir.join(include))
            .find(|candidate| candidate.is_file())
            .map(|candidate| normalized_path(&candidate))
    }
}

pub fn parse_include_directives(source: &str) -> Vec<IncludeDirective> {
    let Some(re) = INCLUDE_DIRECTIVE.as_ref() else {
        return Vec::new();
    };
    source
        .lines()
        .filter_map(|line| re.captures(line))
        .map(|caps| IncludeDirective {
            is_system: &caps[1] == "<",
            path: caps[2].trim().to_owned(),
        })
        .collect()
}

/// Existing files next to `file` sharing its stem with another of `extensions`
/// (`foo.c` -> `foo.h`).
pub fn matching_siblings(
    file: &Path,
    extensions: &[String],
) -> Vec<PathBuf> {
    let current = file.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    extensions
        .iter()
        .filter(|ext| !ext.eq_ignore_ascii_case(current))
        .map(|ext| file.with_extension(ext))
        .filter(|candidate| candidate.is_file())
        .map(|candidate| normalized_path(&candidate))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src/include/include_tests.rs"]
mod tests;
