use std::{fs, path::PathBuf};

use serde_json::json;

use super::*;

#[test]
fn parses_namespaced_payload() {
    let payload = json!({
        "c-analyzer": {
            "indexing": {
                "cacheSize": 64,
                "extensions": ["c", "h"],
                "loadMatching": false,
                "cacheDirectory": "/tmp/c-analyzer-cache"
            },
            "paths": {
                "basePaths": ["/work/include"],
                "systemPaths": ["/usr/include"]
            },
            "logging": {
                "level": "debug"
            }
        }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.indexing.cache_size, 64);
    assert_eq!(settings.indexing.extensions, vec!["c", "h"]);
    assert!(!settings.indexing.load_matching);
    assert_eq!(settings.indexing.cache_directory, Some(PathBuf::from("/tmp/c-analyzer-cache")));
    assert_eq!(settings.paths.base_paths, vec![PathBuf::from("/work/include")]);
    assert_eq!(settings.paths.system_paths, vec![PathBuf::from("/usr/include")]);
    assert_eq!(settings.logging.level, LogLevel::Debug);
}

#[test]
fn parses_direct_payload() {
    let payload = json!({
        "indexing": { "loadMatching": false }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert!(!settings.indexing.load_matching);
    assert_eq!(settings.indexing.cache_size, 500);
}

#[test]
fn defaults_without_payload() {
    let settings = ServerSettings::from_lsp_payload(None);
    assert_eq!(settings, ServerSettings::default());
    assert_eq!(settings.indexing.extensions.len(), DEFAULT_EXTENSIONS.len());
    assert!(settings.indexing.load_matching);
    assert!(settings.indexing.cache_directory.is_none());
}

#[test]
fn clamps_cache_size() {
    let low = ServerSettings::from_lsp_payload(Some(&json!({ "indexing": { "cacheSize": 0 } })));
    assert_eq!(low.indexing.cache_size, MIN_CACHE_SIZE);

    let high = ServerSettings::from_lsp_payload(Some(&json!({ "indexing": { "cacheSize": 10_000_000 } })));
    assert_eq!(high.indexing.cache_size, MAX_CACHE_SIZE);
}

#[test]
fn normalizes_extensions() {
    let payload = json!({ "indexing": { "extensions": [" .C ", "h", "", "c"] } });
    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.indexing.extensions, vec!["c", "h"]);
    assert!(settings.indexing.is_indexed(std::path::Path::new("/src/main.C")));
    assert!(!settings.indexing.is_indexed(std::path::Path::new("/src/notes.txt")));
}

#[test]
fn merge_keeps_unpatched_categories() {
    let base = ServerSettings::from_lsp_payload(Some(&json!({ "paths": { "basePaths": ["/a"] } })));
    let merged = base.merged_with_payload(&json!({ "logging": { "level": "trace" } }));
    assert_eq!(merged.paths.base_paths, vec![PathBuf::from("/a")]);
    assert_eq!(merged.logging.level, LogLevel::Trace);
}

#[test]
fn empty_cache_directory_resets_override() {
    let base = ServerSettings::from_lsp_payload(Some(&json!({ "indexing": { "cacheDirectory": "/tmp/x" } })));
    let merged = base.merged_with_payload(&json!({ "indexing": { "cacheDirectory": "  " } }));
    assert!(merged.indexing.cache_directory.is_none());
}

#[test]
fn ignores_malformed_categories() {
    let payload = json!({ "indexing": { "cacheSize": "many" }, "logging": { "level": "warn" } });
    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.indexing.cache_size, 500);
}

#[test]
fn deduplicates_paths() {
    let payload = json!({ "paths": { "basePaths": ["/a", "/b", "/a", ""] } });
    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.paths.base_paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
}

#[test]
fn project_file_discovered_in_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join(PROJECT_FILENAME), "base_paths = [\"include\"]\nsystem_paths = [\"/opt/sdk/include\"]\n")
        .unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    let source = root.join("src/main.c");
    fs::write(&source, "int main(void) { return 0; }\n").unwrap();

    assert_eq!(find_project_file(&source), Some(root.join(PROJECT_FILENAME)));
    let project = ProjectFile::discover(&source).unwrap();
    assert_eq!(project.base_paths, vec![root.join("include")]);
    assert_eq!(project.system_paths, vec![PathBuf::from("/opt/sdk/include")]);
}

#[test]
fn project_paths_append_to_settings() {
    let settings = ServerSettings::from_lsp_payload(Some(&json!({ "paths": { "basePaths": ["/a"] } })));
    let project = ProjectFile {
        base_paths: vec![PathBuf::from("/b"), PathBuf::from("/a")],
        system_paths: vec![PathBuf::from("/sys")],
    };
    let merged = settings.with_project(Some(project));
    assert_eq!(merged.paths.base_paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    assert_eq!(merged.paths.system_paths, vec![PathBuf::from("/sys")]);
}

#[test]
fn malformed_project_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(PROJECT_FILENAME);
    fs::write(&path, "base_paths = 3\n").unwrap();
    assert!(ProjectFile::load(&path).is_none());
}

#[test]
fn schema_covers_every_category() {
    let properties = generate_package_json_properties();
    let object = properties.as_object().unwrap();
    assert!(object.contains_key("c-analyzer.indexing.cacheSize"));
    assert!(object.contains_key("c-analyzer.paths.systemPaths"));
    assert_eq!(object["c-analyzer.indexing.cacheSize"]["maximum"], json!(MAX_CACHE_SIZE));

    let markdown = generate_configuration_markdown();
    assert!(markdown.contains("## Indexing"));
    assert!(markdown.contains("## Paths"));
    assert!(markdown.contains("`c-analyzer.logging.level`"));
}
