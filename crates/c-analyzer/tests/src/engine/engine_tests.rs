use std::{
    fs,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::{
    parser::{CParser, ParseError},
    symbols::ParsedFile,
    vfs::FileId,
};

/// Delegates to `CParser`, counting calls and failing on files named `broken.h`.
#[derive(Default)]
struct TestParser {
    calls: AtomicUsize,
}

impl FileParser for TestParser {
    fn parse(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<ParsedFile, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if path.file_name().is_some_and(|name| name == "broken.h") {
            return Err(ParseError::new(path, "refused"));
        }
        CParser.parse(path, source)
    }
}

fn write(
    dir: &Path,
    name: &str,
    contents: &str,
) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    normalized_path(&path)
}

fn project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "point.h", "struct Point {\n    int x;\n    int y;\n};\n");
    write(dir.path(), "shape.h", "#include \"point.h\"\nstruct Shape {\n    struct Point origin;\n};\n");
    let main = write(dir.path(), "main.c", "#include \"shape.h\"\nstruct Shape shape;\n");
    (dir, main)
}

fn engine_with(parser: &Arc<TestParser>) -> Engine {
    Engine::new(parser.clone(), 16).expect("engine")
}

#[test]
fn load_emits_one_event_per_file_then_finishes() {
    let (_dir, main) = project();
    let parser = Arc::new(TestParser::default());
    let engine = engine_with(&parser);

    let events: Vec<LoadEvent> = engine.start_load(LoadRequest::new(&main)).collect();
    assert_eq!(
        events[0],
        LoadEvent::Scanned {
            files: 3
        }
    );
    let parsed: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|event| match event {
            LoadEvent::Parsed {
                index,
                total,
                ..
            } => Some((*index, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(parsed, vec![(1, 3), (2, 3), (3, 3)]);

    let Some(LoadEvent::Finished(summary)) = events.last() else {
        panic!("load should finish, got {events:?}");
    };
    assert_eq!(summary.files, 3);
    assert_eq!(summary.parsed, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.symbols, engine.store().len());
    assert_eq!(engine.current_root(), Some(main.clone()));
    assert!(engine.store().get("shape").is_some());
}

#[test]
fn progress_callback_sees_every_file() {
    let (_dir, main) = project();
    let engine = engine_with(&Arc::new(TestParser::default()));

    let mut seen = Vec::new();
    let summary = engine.load(&LoadRequest::new(&main), |done, total| seen.push((done, total)));
    assert!(summary.is_some());
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn newer_load_supersedes_an_older_session() {
    let (_dir, main) = project();
    let engine = engine_with(&Arc::new(TestParser::default()));

    let mut first = engine.start_load(LoadRequest::new(&main));
    assert!(matches!(first.next(), Some(LoadEvent::Scanned { .. })));

    let second = engine.start_load(LoadRequest::new(&main));
    assert_eq!(first.next(), Some(LoadEvent::Superseded));
    assert_eq!(first.next(), None);

    let last = second.last();
    assert!(matches!(last, Some(LoadEvent::Finished(_))));
}

#[test]
fn superseded_load_does_not_publish() {
    let (dir, main) = project();
    let other = write(dir.path(), "other.c", "int lonely;\n");
    let engine = engine_with(&Arc::new(TestParser::default()));
    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("first load");

    let mut stale = engine.start_load(LoadRequest::new(&other));
    stale.next();
    let _newer = engine.start_load(LoadRequest::new(&other));
    assert_eq!(stale.last(), Some(LoadEvent::Superseded));

    assert_eq!(engine.current_root(), Some(main));
    assert!(engine.store().get("lonely").is_none());
}

#[test]
fn failing_file_is_skipped_and_the_rest_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "broken.h", "int never;\n");
    let main = write(dir.path(), "main.c", "#include \"broken.h\"\nint kept;\n");
    let engine = engine_with(&Arc::new(TestParser::default()));

    let events: Vec<LoadEvent> = engine.start_load(LoadRequest::new(&main)).collect();
    assert!(events.iter().any(|event| matches!(event, LoadEvent::Skipped { file, .. } if file.ends_with("broken.h"))));

    let Some(LoadEvent::Finished(summary)) = events.last() else {
        panic!("load should finish, got {events:?}");
    };
    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.skipped, 1);
    assert!(engine.store().get("kept").is_some());
    assert!(engine.store().get("never").is_none());
}

#[test]
fn validity_tracks_root_and_content() {
    let (dir, main) = project();
    let engine = engine_with(&Arc::new(TestParser::default()));
    let request = LoadRequest::new(&main);
    assert!(!engine.is_valid(&request), "nothing loaded yet");

    engine.load(&request, |_, _| {}).expect("load");
    assert!(engine.is_valid(&request));

    let other = write(dir.path(), "other.c", "int lonely;\n");
    assert!(!engine.is_valid(&LoadRequest::new(&other)));

    write(dir.path(), "point.h", "struct Point {\n    int x;\n};\n");
    assert!(!engine.is_valid(&request), "header changed");

    engine.load(&request, |_, _| {}).expect("reload");
    assert!(engine.is_valid(&request));
}

#[test]
fn validity_notices_a_new_include() {
    let (dir, main) = project();
    let engine = engine_with(&Arc::new(TestParser::default()));
    let request = LoadRequest::new(&main);
    engine.load(&request, |_, _| {}).expect("load");

    write(dir.path(), "extra.h", "int extra;\n");
    write(dir.path(), "main.c", "#include \"shape.h\"\n#include \"extra.h\"\nstruct Shape shape;\n");
    assert!(!engine.is_valid(&request));
}

#[test]
fn reload_of_unchanged_files_hits_the_cache() {
    let (_dir, main) = project();
    let parser = Arc::new(TestParser::default());
    let engine = engine_with(&parser);

    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("load");
    assert_eq!(parser.calls.load(Ordering::SeqCst), 3);
    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("reload");
    assert_eq!(parser.calls.load(Ordering::SeqCst), 3);

    engine.clear_cache();
    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("reload after clear");
    assert_eq!(parser.calls.load(Ordering::SeqCst), 6);
}

#[test]
fn corrupt_disk_entry_is_reparsed() {
    let (_dir, main) = project();
    let cache_dir = tempfile::tempdir().expect("cache dir");
    let parser = Arc::new(TestParser::default());
    let engine = engine_with(&parser);
    engine.set_cache_dir(Some(cache_dir.path().to_path_buf())).expect("cache dir");

    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("load");
    assert_eq!(parser.calls.load(Ordering::SeqCst), 3);

    let entry = DiskCache::new(cache_dir.path()).entry_path(&FileId::from_path(&main));
    assert!(entry.exists());
    fs::write(&entry, "{ not json").expect("corrupt entry");

    engine.clear_cache();
    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("reload");
    assert_eq!(parser.calls.load(Ordering::SeqCst), 4, "only the corrupt entry is reparsed");
    assert!(engine.store().get("shape").is_some());

    assert_eq!(engine.clear_disk_cache().expect("clear"), 3);
    assert_eq!(engine.clear_disk_cache().expect("clear again"), 0);
}

#[test]
fn cache_configuration_errors() {
    let engine = engine_with(&Arc::new(TestParser::default()));
    assert_eq!(engine.set_cache_size(0), Err(ConfigError::InvalidCacheSize(0)));
    assert_eq!(engine.set_cache_size(1), Ok(()));

    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(dir.path(), "not_a_dir", "");
    assert_eq!(engine.set_cache_dir(Some(file.clone())), Err(ConfigError::InvalidCacheDir(file)));
    assert_eq!(engine.set_cache_dir(Some(dir.path().join("fresh"))), Ok(()));
    assert_eq!(engine.set_cache_dir(None), Ok(()));
    assert!(matches!(Engine::new(Arc::new(CParser), 0), Err(ConfigError::InvalidCacheSize(0))));
}

#[test]
fn queries_run_against_the_published_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "point.h", "struct Point {\n    int x;\n    int y;\n};\n");
    let main = write(
        dir.path(),
        "main.c",
        "#include \"point.h\"\nint main(void) {\n    struct Point here;\n    here.x = 1;\n    return 0;\n}\n",
    );
    let engine = engine_with(&Arc::new(TestParser::default()));
    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("load");

    assert_eq!(engine.function_at(&main, 4).as_deref(), Some("main"));
    assert_eq!(engine.function_at(&main, 1), None);

    let members: Vec<String> =
        engine.resolve_members(&main, Some("main"), "    here.", false).iter().map(|r| r.name.to_string()).collect();
    assert_eq!(members, vec!["Point::x", "Point::y"]);

    let local: Vec<String> = engine.locals(&main, "main").iter().map(|r| r.name.to_string()).collect();
    assert_eq!(local, vec!["here"]);

    let found = engine.symbol_at(&main, Some("main"), "    here.", "x").expect("member x");
    assert_eq!(found.name.to_string(), "Point::x");

    assert!(engine.search_tokens("Poi").iter().any(|r| r.name.to_string() == "Point"));
}

#[test]
fn stale_generation_cannot_publish() {
    let (_dir, main) = project();
    let engine = engine_with(&Arc::new(TestParser::default()));
    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("load");

    let stale = engine.generation.load(Ordering::SeqCst);
    let _newer = engine.start_load(LoadRequest::new(&main));
    assert!(!engine.publish(stale, LoadRequest::new("/elsewhere.c"), SymbolStore::new()));
    assert_eq!(engine.current_root(), Some(main.clone()));
    assert!(engine.store().get("shape").is_some());

    let current = engine.generation.load(Ordering::SeqCst);
    assert!(engine.publish(current, LoadRequest::new("/elsewhere.c"), SymbolStore::new()));
    assert_eq!(engine.current_root(), Some(PathBuf::from("/elsewhere.c")));
    assert!(engine.store().is_empty());
}

#[test]
fn load_publishes_through_a_poisoned_store_lock() {
    let (_dir, main) = project();
    let engine = engine_with(&Arc::new(TestParser::default()));
    std::thread::scope(|scope| {
        let poisoned = scope
            .spawn(|| {
                let _guard = engine.store.write();
                panic!("poison the store lock");
            })
            .join();
        assert!(poisoned.is_err());
    });
    assert!(engine.store.is_poisoned());

    let summary = engine.load(&LoadRequest::new(&main), |_, _| {}).expect("load finishes");
    assert_eq!(summary.symbols, engine.store().len());
    assert!(engine.store().get("shape").is_some());
    assert_eq!(engine.current_root(), Some(main));
}
