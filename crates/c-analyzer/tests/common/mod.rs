#![allow(dead_code)]

use std::path::{Path, PathBuf};

use c_analyzer::vfs::normalized_path;
use tower_lsp::lsp_types::{Position, Url};

/// A throwaway source tree on disk.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp workspace"),
        }
    }

    pub fn root(&self) -> PathBuf {
        normalized_path(self.dir.path())
    }

    /// Write `contents` at `relative_path`, creating parent directories, and
    /// return the normalized absolute path.
    pub fn write(
        &self,
        relative_path: &str,
        contents: &str,
    ) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directories");
        }
        std::fs::write(&path, contents).expect("write workspace file");
        normalized_path(&path)
    }

    pub fn path(
        &self,
        relative_path: &str,
    ) -> PathBuf {
        normalized_path(&self.dir.path().join(relative_path))
    }

    pub fn uri(
        &self,
        relative_path: &str,
    ) -> Url {
        file_uri(&self.path(relative_path))
    }
}

pub fn file_uri(path: &Path) -> Url {
    Url::from_file_path(path).expect("absolute path converts to file:// URI")
}

pub fn position_of(
    source: &str,
    needle: &str,
) -> Position {
    position_of_nth(source, needle, 0)
}

pub fn position_of_nth(
    source: &str,
    needle: &str,
    nth: usize,
) -> Position {
    assert!(!needle.is_empty(), "needle must not be empty");
    let mut from = 0usize;
    let mut current = 0usize;

    loop {
        let Some(idx) = source[from..].find(needle) else {
            panic!("needle not found: {needle}");
        };
        let absolute = from + idx;
        if current == nth {
            let before = &source[..absolute];
            let line = before.as_bytes().iter().filter(|&&b| b == b'\n').count() as u32;
            let col = before
                .rsplit_once('\n')
                .map(|(_, tail)| tail.chars().count() as u32)
                .unwrap_or_else(|| before.chars().count() as u32);
            return Position::new(line, col);
        }
        current += 1;
        from = absolute + needle.len();
    }
}

/// Position just past the first occurrence of `needle`.
pub fn position_after(
    source: &str,
    needle: &str,
) -> Position {
    let start = position_of(source, needle);
    Position::new(start.line, start.character + needle.chars().count() as u32)
}
